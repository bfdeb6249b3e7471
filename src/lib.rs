//! Similarity matrix profiles (SiMPle) for multi-dimensional feature sequences.
//!
//! For every length-`L` subsequence of a sequence, the matrix profile holds the
//! squared Euclidean distance to its nearest match, either elsewhere in the
//! same sequence (self-join) or in another sequence (AB-join), plus the offset
//! of that match. Sequences are `ndim × length` matrices such as chroma or
//! timbre frames extracted from audio.
//!
//! The fast engines seed one sliding dot product and then derive each row from
//! the previous one, so a join costs O(n_a * n_b * ndim) instead of one full
//! cross-correlation per row.

pub mod algorithms;
pub mod align;
pub mod core;
pub mod error;
pub mod evaluate;

pub use crate::algorithms::ab_join::{ab_join, ab_join_fast};
pub use crate::algorithms::batch::{distance_matrix, pair_distance, simple_distance};
pub use crate::algorithms::common::Convolution;
pub use crate::algorithms::self_join::{self_join, self_join_fast};
pub use crate::align::{align_transposition, Alignment, N_TRANSPOSITIONS};
pub use crate::core::matrix_profile::{JoinConfig, MatrixProfile, ZERO_TOLERANCE};
pub use crate::core::sequence::FeatureSequence;
pub use crate::error::{Result, SimpleError};
pub use crate::evaluate::{mean_average_precision, mean_first_rank};

/// High-level facade bundling a join configuration.
///
/// # Examples
///
/// ```
/// use simple_rs::{Engine, FeatureSequence, JoinConfig};
///
/// let seq = FeatureSequence::from_series(&[0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
/// let engine = Engine::new(JoinConfig::new(2));
/// let mp = engine.self_join(&seq).unwrap();
/// assert_eq!(mp.profile.len(), seq.len() - 2 + 1);
/// assert!(mp.profile.iter().all(|&d| d == 0.0));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Engine {
    config: JoinConfig,
}

impl Engine {
    /// Create a new engine with the given configuration.
    pub fn new(config: JoinConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &JoinConfig {
        &self.config
    }

    /// Self-join matrix profile (incremental engine).
    pub fn self_join(&self, seq: &FeatureSequence) -> Result<MatrixProfile> {
        self_join_fast(seq, &self.config)
    }

    /// AB-join matrix profile of `query` against `target` (incremental engine).
    ///
    /// Indices refer to offsets in `target`.
    pub fn ab_join(
        &self,
        query: &FeatureSequence,
        target: &FeatureSequence,
    ) -> Result<MatrixProfile> {
        ab_join_fast(query, target, &self.config)
    }

    /// Self-join via per-row cross-correlation, for validation.
    pub fn self_join_naive(&self, seq: &FeatureSequence) -> Result<MatrixProfile> {
        self_join(seq, &self.config)
    }

    /// AB-join via per-row cross-correlation, for validation.
    pub fn ab_join_naive(
        &self,
        query: &FeatureSequence,
        target: &FeatureSequence,
    ) -> Result<MatrixProfile> {
        ab_join(query, target, &self.config)
    }

    /// SiMPle distance matrix between every query and every target.
    ///
    /// With `align`, each target is first transposed onto its query.
    pub fn distance_matrix(
        &self,
        queries: &[FeatureSequence],
        targets: &[FeatureSequence],
        align: bool,
    ) -> Result<Vec<Vec<f64>>> {
        distance_matrix(queries, targets, &self.config, align)
    }
}
