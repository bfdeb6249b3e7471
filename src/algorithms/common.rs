use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};

use crate::core::matrix_profile::qt_to_sq_distance;
use crate::core::sequence::FeatureSequence;

/// Size threshold (n * m) above which `Convolution::Auto` dispatches to the FFT path.
/// Below this, the direct O(n*m) loop wins due to lower constant overhead.
pub(crate) const FFT_THRESHOLD: usize = 256 * 1024;

/// How a cross-correlation (sliding dot product) is computed.
///
/// All variants produce the same values up to floating-point rounding; only
/// the asymptotic cost differs. Callers pick one without changing anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Convolution {
    /// Direct for small inputs, FFT above `FFT_THRESHOLD`.
    #[default]
    Auto,
    /// Direct O(n*m) summation.
    Direct,
    /// Frequency-domain O(n log n) convolution.
    Fft,
}

impl Convolution {
    /// Sliding dot product of `q` against every window of `ts`.
    ///
    /// Returns `ts.len() - q.len() + 1` values where element `t` is
    /// `dot(q, ts[t..t+m])`. Equivalent to convolving the time-reversed `q`
    /// with `ts` and trimming the padding at both ends.
    pub fn sliding_dot_product(self, q: &[f64], ts: &[f64]) -> Vec<f64> {
        let m = q.len();
        let n = ts.len();
        debug_assert!(m > 0 && n >= m, "Time series shorter than query");
        match self {
            Convolution::Direct => sliding_dot_product_naive(q, ts),
            Convolution::Fft => sliding_dot_product_fft(q, ts),
            Convolution::Auto if n * m > FFT_THRESHOLD => sliding_dot_product_fft(q, ts),
            Convolution::Auto => sliding_dot_product_naive(q, ts),
        }
    }
}

/// Naive O(n*m) sliding dot product.
pub fn sliding_dot_product_naive(q: &[f64], ts: &[f64]) -> Vec<f64> {
    ts.windows(q.len())
        .map(|w| q.iter().zip(w).map(|(a, b)| a * b).sum())
        .collect()
}

/// FFT-based O(n log n) sliding dot product.
///
/// A single-dimension [`FftCorrelator`]: the reversed query is convolved with
/// `ts` in the frequency domain.
pub fn sliding_dot_product_fft(q: &[f64], ts: &[f64]) -> Vec<f64> {
    FftCorrelator::plan(std::iter::once(ts), ts.len(), q.len())
        .correlate_windows(std::iter::once(q))
}

/// Multi-dimensional sliding dot product (the QT seed).
///
/// Correlates the window `query[:, start..start+m]` with `target` per dimension
/// and sums across dimensions, giving one value per target offset
/// `0..=target.len()-m`.
pub fn multi_sliding_dot_product(
    conv: Convolution,
    query: &FeatureSequence,
    start: usize,
    m: usize,
    target: &FeatureSequence,
) -> Vec<f64> {
    let n_subs = target.len() - m + 1;
    let mut qt = vec![0.0; n_subs];
    for (q_row, t_row) in query.dims().zip(target.dims()) {
        let dim_qt = conv.sliding_dot_product(&q_row[start..start + m], t_row);
        for (acc, v) in qt.iter_mut().zip(dim_qt) {
            *acc += v;
        }
    }
    qt
}

/// Frequency-domain correlator with a fixed target.
///
/// Plans the transforms and caches every target dimension's spectrum once, so
/// repeated queries against the same target cost one forward FFT per query
/// dimension plus a single inverse FFT. Spectra are summed across dimensions
/// before the inverse transform.
pub struct FftCorrelator {
    m: usize,
    n_subs: usize,
    fft_len: usize,
    forward: Arc<dyn RealToComplex<f64>>,
    inverse: Arc<dyn ComplexToReal<f64>>,
    target_spectra: Vec<Vec<Complex<f64>>>,
}

impl FftCorrelator {
    /// Plan a correlator for windows of length `m` against `target`.
    pub fn new(target: &FeatureSequence, m: usize) -> Self {
        Self::plan(target.dims(), target.len(), m)
    }

    /// Plan transforms for `n`-sample rows and cache the spectrum of each row.
    fn plan<'a>(rows: impl Iterator<Item = &'a [f64]>, n: usize, m: usize) -> Self {
        // Full linear convolution length, at least 2 for realfft
        let fft_len = (n + m - 1).next_power_of_two().max(2);
        let mut planner = RealFftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(fft_len);
        let inverse = planner.plan_fft_inverse(fft_len);

        let target_spectra = rows
            .map(|row| {
                let mut padded = vec![0.0; fft_len];
                padded[..n].copy_from_slice(row);
                let mut spectrum = forward.make_output_vec();
                forward
                    .process(&mut padded, &mut spectrum)
                    .expect("buffers sized by the plan");
                spectrum
            })
            .collect();

        Self {
            m,
            n_subs: n - m + 1,
            fft_len,
            forward,
            inverse,
            target_spectra,
        }
    }

    /// Dot products of `query[:, start..start+m]` with every target window,
    /// summed across dimensions.
    pub fn correlate(&self, query: &FeatureSequence, start: usize) -> Vec<f64> {
        let m = self.m;
        self.correlate_windows(query.dims().map(move |row| &row[start..start + m]))
    }

    /// Correlate one length-`m` window per target row and sum the results.
    fn correlate_windows<'a>(&self, windows: impl Iterator<Item = &'a [f64]>) -> Vec<f64> {
        let m = self.m;
        let mut summed = self.forward.make_output_vec();
        let mut q_spectrum = self.forward.make_output_vec();
        let mut q_padded = vec![0.0; self.fft_len];

        for (window, t_spectrum) in windows.zip(&self.target_spectra) {
            q_padded.fill(0.0);
            for (dst, &src) in q_padded.iter_mut().zip(window.iter().rev()) {
                *dst = src;
            }
            self.forward
                .process(&mut q_padded, &mut q_spectrum)
                .expect("buffers sized by the plan");
            for ((acc, q), t) in summed.iter_mut().zip(&q_spectrum).zip(t_spectrum) {
                *acc += q * t;
            }
        }

        let mut result = vec![0.0; self.fft_len];
        self.inverse
            .process(&mut summed, &mut result)
            .expect("buffers sized by the plan");

        // realfft inverse is unnormalized; valid lags start at m - 1
        let norm = 1.0 / self.fft_len as f64;
        result[m - 1..m - 1 + self.n_subs]
            .iter()
            .map(|&x| x * norm)
            .collect()
    }
}

/// Sum of squared samples over every length-`m` window, across all dimensions.
///
/// Returns `seq.len() - m + 1` values. Computed as differences of a prefix sum
/// of per-step squared column norms, accumulated in f64.
pub fn windowed_sum_squares(seq: &FeatureSequence, m: usize) -> Vec<f64> {
    let n = seq.len();
    let mut cumsum_sq = vec![0.0; n + 1];
    for t in 0..n {
        cumsum_sq[t + 1] = cumsum_sq[t] + seq.column_sq_norm(t);
    }
    (0..=n - m).map(|t| cumsum_sq[t + m] - cumsum_sq[t]).collect()
}

/// Advance the dot-product vector from query offset `i - 1` to `i`, in place.
///
/// `QT[t] = QT_prev[t-1] - <query[:, i-1], target[:, t-1]> + <query[:, i-1+m], target[:, t-1+m]>`
/// for `t >= 1`. Offset 0 has no predecessor on the diagonal and is set from
/// `seed`, the precomputed dot product of query window `i` with target window 0.
///
/// `qt` must hold `target.len() - m + 1` entries and `i` must be in
/// `1..=query.len()-m`.
pub fn update_dot_products(
    qt: &mut [f64],
    seed: f64,
    query: &FeatureSequence,
    i: usize,
    target: &FeatureSequence,
    m: usize,
) {
    let len = qt.len();
    debug_assert_eq!(len, target.len() - m + 1);
    debug_assert!(i >= 1 && i + m <= query.len());

    qt.copy_within(0..len - 1, 1);
    for (d, t_row) in target.dims().enumerate() {
        let leaving = query.get(d, i - 1);
        let entering = query.get(d, i - 1 + m);
        let old = &t_row[..len - 1];
        let new = &t_row[m..m + len - 1];
        for ((q, &o), &e) in qt[1..].iter_mut().zip(old).zip(new) {
            *q += entering * e - leaving * o;
        }
    }
    qt[0] = seed;
}

/// Form the squared-distance profile `target_ss + query_ss - 2*QT` into `dist`.
#[inline]
pub fn qt_to_distance_profile(dist: &mut [f64], target_ss: &[f64], query_ss: f64, qt: &[f64]) {
    for ((d, &ss), &q) in dist.iter_mut().zip(target_ss).zip(qt) {
        *d = qt_to_sq_distance(ss, query_ss, q);
    }
}

/// Apply the self-join exclusion zone around query offset `idx`.
///
/// Sets the half-open range `[idx - zone + 1, idx + zone)` (clamped to bounds)
/// to infinity. A zone of 0 excludes nothing.
#[inline]
pub fn apply_exclusion_zone(profile: &mut [f64], idx: usize, zone: usize) {
    if zone == 0 {
        return;
    }
    let start = (idx + 1).saturating_sub(zone);
    let end = (idx + zone).min(profile.len());
    if start < end {
        profile[start..end].fill(f64::INFINITY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chroma_like(ndim: usize, n: usize) -> FeatureSequence {
        let rows: Vec<Vec<f64>> = (0..ndim)
            .map(|d| {
                (0..n)
                    .map(|t| ((t as f64) * 0.37 + d as f64 * 1.3).sin().abs())
                    .collect()
            })
            .collect();
        FeatureSequence::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_sliding_dot_product_simple() {
        // q = [1, 2], ts = [1, 2, 3, 4]
        // dot([1,2], [1,2]) = 5
        // dot([1,2], [2,3]) = 8
        // dot([1,2], [3,4]) = 11
        let q = vec![1.0, 2.0];
        let ts = vec![1.0, 2.0, 3.0, 4.0];
        for conv in [Convolution::Auto, Convolution::Direct, Convolution::Fft] {
            let result = conv.sliding_dot_product(&q, &ts);
            assert_eq!(result.len(), 3);
            assert!((result[0] - 5.0).abs() < 1e-10, "{conv:?}");
            assert!((result[1] - 8.0).abs() < 1e-10, "{conv:?}");
            assert!((result[2] - 11.0).abs() < 1e-10, "{conv:?}");
        }
    }

    #[test]
    fn test_sliding_dot_product_single() {
        let q = vec![3.0, 4.0, 5.0];
        let ts = vec![3.0, 4.0, 5.0];
        for conv in [Convolution::Auto, Convolution::Direct, Convolution::Fft] {
            let result = conv.sliding_dot_product(&q, &ts);
            assert_eq!(result.len(), 1);
            assert!((result[0] - 50.0).abs() < 1e-10, "{conv:?}"); // 9 + 16 + 25
        }
    }

    #[test]
    fn test_fft_single_sample() {
        // n = m = 1 still plans a length-2 transform
        let result = sliding_dot_product_fft(&[3.0], &[4.0]);
        assert_eq!(result.len(), 1);
        assert!((result[0] - 12.0).abs() < 1e-10);
    }

    #[test]
    fn test_fft_vs_naive_equivalence() {
        for (n, m) in [(100, 10), (1000, 50), (5000, 100)] {
            let ts: Vec<f64> = (0..n).map(|i| (i as f64 * 0.1).sin()).collect();
            let q = &ts[0..m];
            let naive = sliding_dot_product_naive(q, &ts);
            let fft = sliding_dot_product_fft(q, &ts);
            assert_eq!(naive.len(), fft.len());
            for (i, (a, b)) in naive.iter().zip(fft.iter()).enumerate() {
                assert!(
                    (a - b).abs() < 1e-6,
                    "Mismatch at {i} (n={n}, m={m}): naive={a}, fft={b}"
                );
            }
        }
    }

    #[test]
    fn test_multi_sliding_dot_product_sums_dimensions() {
        // dims: [1,2,3] and [0,1,0]; window at 1 of length 2 -> [2,3] and [1,0]
        let seq = FeatureSequence::from_rows(&[vec![1.0, 2.0, 3.0], vec![0.0, 1.0, 0.0]]).unwrap();
        let qt = multi_sliding_dot_product(Convolution::Direct, &seq, 1, 2, &seq);
        assert_eq!(qt.len(), 2);
        // t=0: 2*1 + 3*2 + 1*0 + 0*1 = 8
        // t=1: 2*2 + 3*3 + 1*1 + 0*0 = 14
        assert!((qt[0] - 8.0).abs() < 1e-12);
        assert!((qt[1] - 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_fft_correlator_matches_direct() {
        let target = chroma_like(12, 90);
        let query = chroma_like(12, 40);
        let m = 7;
        let correlator = FftCorrelator::new(&target, m);
        for start in [0, 5, 33] {
            let direct = multi_sliding_dot_product(Convolution::Direct, &query, start, m, &target);
            let fft = correlator.correlate(&query, start);
            assert_eq!(direct.len(), fft.len());
            for (t, (a, b)) in direct.iter().zip(&fft).enumerate() {
                assert!((a - b).abs() < 1e-9, "start={start} t={t}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn test_windowed_sum_squares() {
        // dims [1,2,3,4] and [1,1,1,1], m=2
        // column norms: 2, 5, 10, 17 -> windows: 7, 15, 27
        let seq = FeatureSequence::from_rows(&[vec![1.0, 2.0, 3.0, 4.0], vec![1.0; 4]]).unwrap();
        let ss = windowed_sum_squares(&seq, 2);
        assert_eq!(ss.len(), 3);
        assert!((ss[0] - 7.0).abs() < 1e-12);
        assert!((ss[1] - 15.0).abs() < 1e-12);
        assert!((ss[2] - 27.0).abs() < 1e-12);
    }

    #[test]
    fn test_windowed_sum_squares_long_sequence_no_drift() {
        let seq = chroma_like(12, 5000);
        let m = 20;
        let ss = windowed_sum_squares(&seq, m);
        for t in [0, 1234, 4980] {
            let direct: f64 = (t..t + m).map(|u| seq.column_sq_norm(u)).sum();
            assert!((ss[t] - direct).abs() < 1e-9, "t={t}: {} vs {direct}", ss[t]);
        }
    }

    #[test]
    fn test_update_dot_products_matches_recompute() {
        let query = chroma_like(3, 30);
        let target = chroma_like(3, 45).rotate_dims(1);
        let m = 6;
        let seeds = multi_sliding_dot_product(Convolution::Direct, &target, 0, m, &query);
        let mut qt = multi_sliding_dot_product(Convolution::Direct, &query, 0, m, &target);
        for i in 1..=query.len() - m {
            update_dot_products(&mut qt, seeds[i], &query, i, &target, m);
            let expected = multi_sliding_dot_product(Convolution::Direct, &query, i, m, &target);
            for (t, (a, b)) in qt.iter().zip(&expected).enumerate() {
                assert!((a - b).abs() < 1e-9, "i={i} t={t}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn test_exclusion_zone_middle() {
        let mut profile = vec![1.0; 10];
        apply_exclusion_zone(&mut profile, 5, 2);
        // [4, 7) -> indices 4,5,6
        for (i, &val) in profile.iter().enumerate() {
            if (4..7).contains(&i) {
                assert!(val.is_infinite(), "index {i} should be excluded");
            } else {
                assert!((val - 1.0).abs() < 1e-10, "index {i} should be kept");
            }
        }
    }

    #[test]
    fn test_exclusion_zone_edges() {
        let mut profile = vec![1.0; 5];
        apply_exclusion_zone(&mut profile, 0, 3);
        assert!(profile[..3].iter().all(|v| v.is_infinite()));
        assert!(profile[3..].iter().all(|v| v.is_finite()));

        let mut profile = vec![1.0; 5];
        apply_exclusion_zone(&mut profile, 4, 2);
        assert!(profile[..3].iter().all(|v| v.is_finite()));
        assert!(profile[3..].iter().all(|v| v.is_infinite()));
    }

    #[test]
    fn test_exclusion_zone_one_is_self_only() {
        let mut profile = vec![1.0; 5];
        apply_exclusion_zone(&mut profile, 2, 1);
        for (i, &val) in profile.iter().enumerate() {
            assert_eq!(val.is_infinite(), i == 2);
        }
    }
}
