use tracing::debug;

use crate::algorithms::common::{
    multi_sliding_dot_product, qt_to_distance_profile, update_dot_products,
    windowed_sum_squares, Convolution, FftCorrelator,
};
use crate::core::matrix_profile::{JoinConfig, MatrixProfile};
use crate::core::sequence::FeatureSequence;
use crate::error::Result;

/// Compute the AB-join matrix profile with the incremental QT recurrence.
///
/// For every length-`L` window of `query`, finds the nearest length-`L` window
/// of `target` (squared Euclidean distance, no exclusion zone). Indices in the
/// result are offsets into `target`.
///
/// Two sliding dot products seed the computation:
/// - `QT[0][t] = <query[:, 0..L], target[:, t..t+L]>`, the first row;
/// - `seed[i] = <target[:, 0..L], query[:, i..i+L]>`, the column `QT[i][0]`
///   that the recurrence cannot reach.
///
/// Every later row costs O(lenB * ndim). The result is not symmetric:
/// `ab_join_fast(a, b)` and `ab_join_fast(b, a)` generally differ.
///
/// # Errors
/// - [`SimpleError::DimensionMismatch`](crate::SimpleError::DimensionMismatch)
///   if the sequences have different `ndim`.
/// - [`SimpleError::InvalidWindowLength`](crate::SimpleError::InvalidWindowLength)
///   if `L` is zero or exceeds the shorter sequence.
#[tracing::instrument(
    skip_all,
    fields(
        ndim = query.ndim(),
        len_a = query.len(),
        len_b = target.len(),
        subseq_len = config.subseq_len
    )
)]
pub fn ab_join_fast(
    query: &FeatureSequence,
    target: &FeatureSequence,
    config: &JoinConfig,
) -> Result<MatrixProfile> {
    let (n_a, n_b) = config.validate_ab(query, target)?;
    let m = config.subseq_len;

    let query_ss = windowed_sum_squares(query, m);
    let target_ss = windowed_sum_squares(target, m);
    let seeds = multi_sliding_dot_product(Convolution::Auto, target, 0, m, query);
    let mut qt = multi_sliding_dot_product(Convolution::Auto, query, 0, m, target);
    debug!(n_a, n_b, "seeded dot products");

    let mut dist_profile = vec![0.0; n_b];
    let mut mp = MatrixProfile::with_capacity(n_a, m, 0);

    for i in 0..n_a {
        if i > 0 {
            update_dot_products(&mut qt, seeds[i], query, i, target, m);
        }
        qt_to_distance_profile(&mut dist_profile, &target_ss, query_ss[i], &qt);
        mp.push_reduced(&dist_profile);
    }

    debug!(n_a, "AB-join complete");
    Ok(mp)
}

/// Reference AB-join: one frequency-domain cross-correlation per query window.
///
/// Target spectra are computed once; each row still costs a full FFT
/// correlation. Kept to validate [`ab_join_fast`].
#[tracing::instrument(
    skip_all,
    fields(
        ndim = query.ndim(),
        len_a = query.len(),
        len_b = target.len(),
        subseq_len = config.subseq_len
    )
)]
pub fn ab_join(
    query: &FeatureSequence,
    target: &FeatureSequence,
    config: &JoinConfig,
) -> Result<MatrixProfile> {
    let (n_a, n_b) = config.validate_ab(query, target)?;
    let m = config.subseq_len;

    let query_ss = windowed_sum_squares(query, m);
    let target_ss = windowed_sum_squares(target, m);
    let correlator = FftCorrelator::new(target, m);

    let mut dist_profile = vec![0.0; n_b];
    let mut mp = MatrixProfile::with_capacity(n_a, m, 0);

    for (i, &ss) in query_ss.iter().enumerate() {
        let qt = correlator.correlate(query, i);
        qt_to_distance_profile(&mut dist_profile, &target_ss, ss, &qt);
        mp.push_reduced(&dist_profile);
    }

    debug!(n_a, "reference AB-join complete");
    Ok(mp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimpleError;

    fn wave(ndim: usize, n: usize, freq: f64, phase: f64) -> FeatureSequence {
        let rows: Vec<Vec<f64>> = (0..ndim)
            .map(|d| {
                (0..n)
                    .map(|t| (t as f64 * freq + phase + d as f64 * 0.4).sin())
                    .collect()
            })
            .collect();
        FeatureSequence::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_ab_join_identical_series() {
        // No exclusion zone: every window matches itself
        let seq = wave(3, 50, 0.2, 0.0);
        let mp = ab_join_fast(&seq, &seq, &JoinConfig::new(8)).unwrap();
        assert_eq!(mp.exclusion_zone, 0);
        for (i, &d) in mp.profile.iter().enumerate() {
            assert!(d < 1e-9, "AB-join of identical series: d[{i}] should be ~0, got {d}");
        }
    }

    #[test]
    fn test_ab_join_hand_computed() {
        // A windows: [0,1], [1,2]; B windows: [5,1], [1,2], [2,0]
        let a = FeatureSequence::from_series(&[0.0, 1.0, 2.0]);
        let b = FeatureSequence::from_series(&[5.0, 1.0, 2.0, 0.0]);
        let mp = ab_join_fast(&a, &b, &JoinConfig::new(2)).unwrap();
        assert_eq!(mp.len(), 2);
        // [0,1]: d to [5,1] = 25, to [1,2] = 2, to [2,0] = 5
        assert!((mp.profile[0] - 2.0).abs() < 1e-12);
        assert_eq!(mp.profile_index[0], 1);
        // [1,2]: exact match at 1
        assert!(mp.profile[1].abs() < 1e-12);
        assert_eq!(mp.profile_index[1], 1);
    }

    #[test]
    fn test_ab_join_different_lengths() {
        let a = wave(2, 30, 0.3, 0.0);
        let b = wave(2, 50, 0.3, 0.0);
        let m = 6;
        let mp = ab_join_fast(&a, &b, &JoinConfig::new(m)).unwrap();
        assert_eq!(mp.len(), a.len() - m + 1);

        // B contains A as a prefix
        for (i, (&d, &j)) in mp.profile.iter().zip(&mp.profile_index).enumerate() {
            assert!(d < 1e-9, "d[{i}] should be ~0, got {d}");
            assert!(j < b.len() - m + 1);
        }
    }

    #[test]
    fn test_fast_matches_reference_both_directions() {
        let a = wave(12, 70, 0.17, 0.3);
        let b = wave(12, 95, 0.23, 1.1);
        for m in [1, 5, 20] {
            let config = JoinConfig::new(m);
            for (q, t) in [(&a, &b), (&b, &a)] {
                let fast = ab_join_fast(q, t, &config).unwrap();
                let naive = ab_join(q, t, &config).unwrap();
                assert_eq!(fast.len(), q.len() - m + 1);
                for (i, (x, y)) in fast.profile.iter().zip(&naive.profile).enumerate() {
                    assert!((x - y).abs() < 1e-6, "m={m} i={i}: fast={x}, naive={y}");
                }
            }
        }
    }

    #[test]
    fn test_ab_join_all_finite_and_non_negative() {
        let a = wave(4, 40, 0.2, 0.0);
        let b = wave(4, 40, 0.3, 2.0);
        let mp = ab_join_fast(&a, &b, &JoinConfig::new(8)).unwrap();
        for (i, &d) in mp.profile.iter().enumerate() {
            assert!(d.is_finite() && d >= 0.0, "profile[{i}] = {d}");
        }
    }

    #[test]
    fn test_ab_join_dimension_mismatch() {
        let a = wave(12, 40, 0.2, 0.0);
        let b = wave(6, 40, 0.2, 0.0);
        for join in [ab_join_fast, ab_join] {
            assert_eq!(
                join(&a, &b, &JoinConfig::new(4)).unwrap_err(),
                SimpleError::DimensionMismatch { left: 12, right: 6 }
            );
        }
    }

    #[test]
    fn test_ab_join_window_longer_than_shorter_input() {
        let a = wave(2, 40, 0.2, 0.0);
        let b = wave(2, 10, 0.2, 0.0);
        let err = ab_join_fast(&a, &b, &JoinConfig::new(11)).unwrap_err();
        assert_eq!(
            err,
            SimpleError::InvalidWindowLength {
                subseq_len: 11,
                max: 10
            }
        );
    }

    #[test]
    fn test_long_series_fft_seeded() {
        // Both seed correlations exceed the FFT threshold
        let m = 50;
        let query = wave(1, 5500, 0.0173, 0.3);
        let target = wave(1, 6000, 0.0131, 1.1);
        assert!(query.len() * m > crate::algorithms::common::FFT_THRESHOLD);

        let mp = ab_join_fast(&query, &target, &JoinConfig::new(m)).unwrap();
        assert_eq!(mp.len(), query.len() - m + 1);

        let (q, t) = (query.dim(0), target.dim(0));
        let sq_dist = |i: usize, j: usize| -> f64 {
            q[i..i + m]
                .iter()
                .zip(&t[j..j + m])
                .map(|(a, b)| (a - b) * (a - b))
                .sum()
        };
        let positions = (0..mp.len()).step_by(389).chain([mp.len() - 1]);
        for i in positions {
            let expected = (0..=target.len() - m)
                .map(|j| sq_dist(i, j))
                .fold(f64::INFINITY, f64::min);
            let d = mp.profile[i];
            assert!((d - expected).abs() < 1e-7, "i={i}: fast={d}, brute={expected}");
            assert!((sq_dist(i, mp.profile_index[i]) - d).abs() < 1e-7, "i={i}");
        }
    }
}
