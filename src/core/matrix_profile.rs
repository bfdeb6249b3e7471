use crate::core::sequence::FeatureSequence;
use crate::error::{Result, SimpleError};

/// Squared distances below this are reported as exactly zero.
///
/// `ss_target + ss_query - 2*QT` cancels catastrophically for matching
/// windows, leaving residue of either sign around zero.
pub const ZERO_TOLERANCE: f64 = 1e-14;

/// Configuration for a join. The subsequence length is the only tunable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoinConfig {
    /// Subsequence (window) length `L`.
    pub subseq_len: usize,
}

impl JoinConfig {
    pub fn new(subseq_len: usize) -> Self {
        Self { subseq_len }
    }

    /// Self-join exclusion zone radius: `ceil(L / 2)`.
    pub fn exclusion_zone(&self) -> usize {
        self.subseq_len.div_ceil(2)
    }

    /// Check a self-join input and return the profile length `n - L + 1`.
    pub fn validate_self(&self, seq: &FeatureSequence) -> Result<usize> {
        self.check_window(seq.len())?;
        Ok(seq.len() - self.subseq_len + 1)
    }

    /// Check an AB-join input and return `(profile_len, dist_profile_len)`.
    ///
    /// Dimension agreement is checked first, then the window against the
    /// shorter of the two sequences.
    pub fn validate_ab(
        &self,
        query: &FeatureSequence,
        target: &FeatureSequence,
    ) -> Result<(usize, usize)> {
        if query.ndim() != target.ndim() {
            return Err(SimpleError::DimensionMismatch {
                left: query.ndim(),
                right: target.ndim(),
            });
        }
        self.check_window(query.len().min(target.len()))?;
        Ok((
            query.len() - self.subseq_len + 1,
            target.len() - self.subseq_len + 1,
        ))
    }

    fn check_window(&self, max: usize) -> Result<()> {
        if self.subseq_len == 0 || self.subseq_len > max {
            return Err(SimpleError::InvalidWindowLength {
                subseq_len: self.subseq_len,
                max,
            });
        }
        Ok(())
    }
}

/// The matrix profile result.
///
/// Distances are squared Euclidean distances between raw (not z-normalized)
/// multi-dimensional subsequences.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixProfile {
    /// Nearest-neighbor distance for each query subsequence.
    pub profile: Vec<f64>,
    /// Offset of the nearest neighbor in the target (or self) sequence.
    pub profile_index: Vec<usize>,
    /// Subsequence length used.
    pub subseq_len: usize,
    /// Exclusion zone radius used (0 for AB-joins).
    pub exclusion_zone: usize,
}

impl MatrixProfile {
    /// Create an empty profile with room for `n_subs` positions.
    pub(crate) fn with_capacity(n_subs: usize, subseq_len: usize, exclusion_zone: usize) -> Self {
        Self {
            profile: Vec::with_capacity(n_subs),
            profile_index: Vec::with_capacity(n_subs),
            subseq_len,
            exclusion_zone,
        }
    }

    /// Record the next query position. Positions are written once, in order.
    #[inline]
    pub(crate) fn push(&mut self, distance: f64, index: usize) {
        self.profile.push(distance);
        self.profile_index.push(index);
    }

    /// Reduce a distance profile and record it as the next query position.
    #[inline]
    pub(crate) fn push_reduced(&mut self, dist_profile: &[f64]) {
        let (d, j) = reduce_profile(dist_profile);
        self.push(d, j);
    }

    /// Number of query positions.
    pub fn len(&self) -> usize {
        self.profile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profile.is_empty()
    }

    /// The best-matching pair as `(query_pos, distance, match_pos)`.
    ///
    /// Lowest query position wins ties. `None` for an empty profile.
    pub fn best_match(&self) -> Option<(usize, f64, usize)> {
        let (i, &d) = self
            .profile
            .iter()
            .enumerate()
            .reduce(|best, cur| if cur.1 < best.1 { cur } else { best })?;
        Some((i, d, self.profile_index[i]))
    }

    /// Finite profile entries (drops positions where every candidate was excluded).
    pub fn finite_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.profile.iter().copied().filter(|d| d.is_finite())
    }
}

/// Squared Euclidean distance from window sums of squares and their dot product.
#[inline(always)]
pub(crate) fn qt_to_sq_distance(ss_target: f64, ss_query: f64, qt: f64) -> f64 {
    let d = ss_target + ss_query - 2.0 * qt;
    if d < ZERO_TOLERANCE {
        0.0
    } else {
        d
    }
}

/// Reduce a distance profile to `(min, argmin)`.
///
/// Left-to-right scan with strict `<`, so the lowest index wins ties. A profile
/// that is `+inf` everywhere reduces to `(inf, 0)`.
#[inline]
pub fn reduce_profile(dist_profile: &[f64]) -> (f64, usize) {
    let mut best = (f64::INFINITY, 0);
    for (j, &d) in dist_profile.iter().enumerate() {
        if d < best.0 {
            best = (d, j);
        }
    }
    best
}
