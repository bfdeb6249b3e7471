use crate::error::{Result, SimpleError};

/// A multi-dimensional feature sequence, conceptually a `[dimension, time]` matrix.
///
/// Samples are stored row-major: dimension `d` occupies
/// `data[d * len .. (d + 1) * len]`, so every dimension is a contiguous slice
/// and can be fed directly to the sliding dot product. The dimension count is
/// fixed at construction, which lets joins reject mismatched inputs with a
/// typed error instead of broadcasting silently.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureSequence {
    ndim: usize,
    len: usize,
    data: Vec<f64>,
}

impl FeatureSequence {
    /// Build a sequence from row-major data holding `ndim` dimensions.
    ///
    /// Fails with [`SimpleError::InvalidShape`] if `ndim` is zero or the data
    /// length is not a multiple of `ndim`. A zero-length sequence is allowed
    /// here; joins reject it through their window-length check.
    pub fn new(ndim: usize, data: Vec<f64>) -> Result<Self> {
        if ndim == 0 {
            return Err(SimpleError::InvalidShape {
                reason: "a sequence needs at least one dimension".to_string(),
            });
        }
        if data.len() % ndim != 0 {
            return Err(SimpleError::InvalidShape {
                reason: format!(
                    "{} samples cannot be split into {ndim} dimensions",
                    data.len()
                ),
            });
        }
        let len = data.len() / ndim;
        Ok(Self { ndim, len, data })
    }

    /// Build a sequence from one row per dimension.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(SimpleError::InvalidShape {
                reason: "a sequence needs at least one dimension".to_string(),
            });
        };
        let len = first.len();
        if let Some((d, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != len) {
            return Err(SimpleError::InvalidShape {
                reason: format!("dimension {d} has length {}, expected {len}", row.len()),
            });
        }
        Self::new(rows.len(), rows.concat())
    }

    /// Build a one-dimensional sequence.
    pub fn from_series(series: &[f64]) -> Self {
        Self {
            ndim: 1,
            len: series.len(),
            data: series.to_vec(),
        }
    }

    /// Number of feature dimensions.
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All samples of dimension `d`, in time order.
    #[inline]
    pub fn dim(&self, d: usize) -> &[f64] {
        &self.data[d * self.len..(d + 1) * self.len]
    }

    /// Iterate over the dimensions as slices.
    pub fn dims(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.ndim).map(move |d| self.dim(d))
    }

    /// Sample at dimension `d`, time `t`.
    #[inline]
    pub fn get(&self, d: usize, t: usize) -> f64 {
        self.data[d * self.len + t]
    }

    /// Squared magnitude of the time column `t`, summed over dimensions.
    #[inline]
    pub fn column_sq_norm(&self, t: usize) -> f64 {
        (0..self.ndim)
            .map(|d| {
                let x = self.get(d, t);
                x * x
            })
            .sum()
    }

    /// Circularly shift the feature axis: row `d` moves to row `(d + shift) % ndim`.
    pub fn rotate_dims(&self, shift: usize) -> FeatureSequence {
        let shift = shift % self.ndim;
        let mut data = vec![0.0; self.data.len()];
        for (d, row) in self.dims().enumerate() {
            let to = (d + shift) % self.ndim;
            data[to * self.len..(to + 1) * self.len].copy_from_slice(row);
        }
        Self {
            ndim: self.ndim,
            len: self.len,
            data,
        }
    }

    /// Sum of every dimension over time, one value per dimension.
    pub fn dim_totals(&self) -> Vec<f64> {
        self.dims().map(|row| row.iter().sum()).collect()
    }
}
