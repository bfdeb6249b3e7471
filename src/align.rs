//! Transposition alignment between two chroma-like feature sequences.
//!
//! Two renditions of a piece can be in different keys. Before joining, the
//! feature axis of one sequence is circularly shifted by the optimal
//! transposition index (OTI): the shift whose global dimension profile best
//! agrees with the other sequence's.

use tracing::{debug, warn};

use crate::core::sequence::FeatureSequence;
use crate::error::{Result, SimpleError};

/// Number of circular shifts tried: one per pitch class.
pub const N_TRANSPOSITIONS: usize = 12;

/// Result of aligning one sequence onto another.
#[derive(Debug, Clone)]
pub struct Alignment {
    /// The shifted copy of the aligned sequence.
    pub sequence: FeatureSequence,
    /// The chosen shift (row `d` moved to `(d + shift) % ndim`).
    pub shift: usize,
    /// Agreement score of every candidate shift.
    pub scores: [f64; N_TRANSPOSITIONS],
}

/// Find the transposition of `other` that best matches `reference`.
///
/// Each sequence is summed over time into a per-dimension profile; shift `s`
/// is scored by `Σ_d ref[(d + s) % ndim] * other[d]`. The highest score wins,
/// the lowest shift on ties. The join itself never calls this; callers align
/// before joining.
///
/// # Errors
/// [`SimpleError::DimensionMismatch`] if the sequences have different `ndim`.
pub fn align_transposition(
    reference: &FeatureSequence,
    other: &FeatureSequence,
) -> Result<Alignment> {
    let ndim = reference.ndim();
    if ndim != other.ndim() {
        return Err(SimpleError::DimensionMismatch {
            left: ndim,
            right: other.ndim(),
        });
    }
    if ndim != N_TRANSPOSITIONS {
        warn!(ndim, "transposition alignment expects 12 pitch-class dimensions");
    }

    let profile_ref = reference.dim_totals();
    let profile_other = other.dim_totals();

    let mut scores = [0.0; N_TRANSPOSITIONS];
    for (shift, score) in scores.iter_mut().enumerate() {
        *score = profile_other
            .iter()
            .enumerate()
            .map(|(d, &v)| profile_ref[(d + shift) % ndim] * v)
            .sum();
    }

    let mut shift = 0;
    for (s, &score) in scores.iter().enumerate() {
        if score > scores[shift] {
            shift = s;
        }
    }
    debug!(shift, score = scores[shift], "selected transposition");

    Ok(Alignment {
        sequence: other.rotate_dims(shift),
        shift,
        scores,
    })
}
