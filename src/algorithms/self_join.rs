use tracing::debug;

use crate::algorithms::common::{
    apply_exclusion_zone, multi_sliding_dot_product, qt_to_distance_profile,
    update_dot_products, windowed_sum_squares, Convolution,
};
use crate::core::matrix_profile::{JoinConfig, MatrixProfile};
use crate::core::sequence::FeatureSequence;
use crate::error::Result;

/// Compute the self-join matrix profile with the incremental QT recurrence.
///
/// One sliding dot product seeds the recurrence; every later row is derived
/// from the previous one in O(n * ndim):
/// `QT[i][t] = QT[i-1][t-1] - <S[:, i-1], S[:, t-1]> + <S[:, i-1+L], S[:, t-1+L]>`.
///
/// Because the join is symmetric, the first row doubles as the seed table for
/// `QT[i][0] = QT[0][i]`, the only entry per row with no diagonal predecessor.
///
/// Target offsets in `[i - zone + 1, i + zone)` with `zone = ceil(L/2)` are
/// excluded so a window never matches itself or its trivial neighbors.
///
/// # Errors
/// [`SimpleError::InvalidWindowLength`](crate::SimpleError::InvalidWindowLength)
/// if `L` is zero or exceeds the sequence length.
#[tracing::instrument(
    skip_all,
    fields(ndim = seq.ndim(), len = seq.len(), subseq_len = config.subseq_len)
)]
pub fn self_join_fast(seq: &FeatureSequence, config: &JoinConfig) -> Result<MatrixProfile> {
    let n_subs = config.validate_self(seq)?;
    let m = config.subseq_len;
    let zone = config.exclusion_zone();

    let ss = windowed_sum_squares(seq, m);
    let seeds = multi_sliding_dot_product(Convolution::Auto, seq, 0, m, seq);
    debug!(n_subs, zone, "seeded dot products");

    // Rolling buffers, owned by this call and overwritten every row
    let mut qt = seeds.clone();
    let mut dist_profile = vec![0.0; n_subs];
    let mut mp = MatrixProfile::with_capacity(n_subs, m, zone);

    for i in 0..n_subs {
        if i > 0 {
            update_dot_products(&mut qt, seeds[i], seq, i, seq, m);
        }
        qt_to_distance_profile(&mut dist_profile, &ss, ss[i], &qt);
        apply_exclusion_zone(&mut dist_profile, i, zone);
        mp.push_reduced(&dist_profile);
    }

    debug!(n_subs, "self-join complete");
    Ok(mp)
}

/// Reference self-join: recomputes a direct cross-correlation for every row.
///
/// O(n^2 * L * ndim). Kept to validate [`self_join_fast`]; results agree within
/// floating-point tolerance.
#[tracing::instrument(
    skip_all,
    fields(ndim = seq.ndim(), len = seq.len(), subseq_len = config.subseq_len)
)]
pub fn self_join(seq: &FeatureSequence, config: &JoinConfig) -> Result<MatrixProfile> {
    let n_subs = config.validate_self(seq)?;
    let m = config.subseq_len;
    let zone = config.exclusion_zone();

    let ss = windowed_sum_squares(seq, m);
    let mut dist_profile = vec![0.0; n_subs];
    let mut mp = MatrixProfile::with_capacity(n_subs, m, zone);

    for i in 0..n_subs {
        let qt = multi_sliding_dot_product(Convolution::Direct, seq, i, m, seq);
        qt_to_distance_profile(&mut dist_profile, &ss, ss[i], &qt);
        apply_exclusion_zone(&mut dist_profile, i, zone);
        mp.push_reduced(&dist_profile);
    }

    debug!(n_subs, "reference self-join complete");
    Ok(mp)
}
