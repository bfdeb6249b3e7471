use tracing::{debug, trace};

use crate::algorithms::ab_join::ab_join_fast;
use crate::align::align_transposition;
use crate::core::matrix_profile::{JoinConfig, MatrixProfile};
use crate::core::sequence::FeatureSequence;
use crate::error::{Result, SimpleError};

/// SiMPle distance between two pieces: the median of an AB-join profile.
///
/// Only finite entries take part; the mean of the two middle values is used
/// for an even count. Returns `+inf` when no entry is finite.
pub fn simple_distance(mp: &MatrixProfile) -> f64 {
    let mut values: Vec<f64> = mp.finite_values().collect();
    let n = values.len();
    if n == 0 {
        return f64::INFINITY;
    }

    let mid = n / 2;
    let (lower, &mut upper, _) = values.select_nth_unstable_by(mid, f64::total_cmp);
    if n % 2 == 1 {
        upper
    } else {
        // The largest of the lower half is the other middle value
        let below = lower.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        0.5 * (below + upper)
    }
}

/// SiMPle distance from `query` to `target`, optionally after transposing
/// `target` onto `query`.
pub fn pair_distance(
    query: &FeatureSequence,
    target: &FeatureSequence,
    config: &JoinConfig,
    align: bool,
) -> Result<f64> {
    let mp = if align {
        let alignment = align_transposition(query, target)?;
        trace!(shift = alignment.shift, "aligned target");
        ab_join_fast(query, &alignment.sequence, config)?
    } else {
        ab_join_fast(query, target, config)?
    };
    Ok(simple_distance(&mp))
}

/// Distance matrix between every query and every target.
///
/// Entry `[q][t]` is [`pair_distance`] of `queries[q]` against `targets[t]`.
/// Every pair runs an independent join with its own buffers. With the
/// `parallel` feature, query rows are computed concurrently on the rayon pool.
///
/// # Errors
/// [`SimpleError::EmptyInput`] if either list is empty; otherwise the first
/// join or alignment error encountered.
#[tracing::instrument(
    skip_all,
    fields(n_queries = queries.len(), n_targets = targets.len(), align = align)
)]
pub fn distance_matrix(
    queries: &[FeatureSequence],
    targets: &[FeatureSequence],
    config: &JoinConfig,
    align: bool,
) -> Result<Vec<Vec<f64>>> {
    if queries.is_empty() || targets.is_empty() {
        return Err(SimpleError::EmptyInput);
    }

    let row = |query: &FeatureSequence| -> Result<Vec<f64>> {
        targets
            .iter()
            .map(|target| pair_distance(query, target, config, align))
            .collect()
    };

    #[cfg(feature = "parallel")]
    let matrix = {
        use rayon::prelude::*;
        queries.par_iter().map(row).collect::<Result<Vec<_>>>()?
    };
    #[cfg(not(feature = "parallel"))]
    let matrix = queries.iter().map(row).collect::<Result<Vec<_>>>()?;

    debug!("distance matrix complete");
    Ok(matrix)
}
