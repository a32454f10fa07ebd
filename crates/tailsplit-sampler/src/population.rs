use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tailsplit_core::errors::ErrorInfo;
use tailsplit_core::SplitError;

/// `rows x dimension` matrix of particle coordinates stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    rows: usize,
    dimension: usize,
    values: Vec<f64>,
}

impl Population {
    /// Draws `rows * dimension` independent standard-normal coordinates.
    pub fn standard_normal<R: Rng + ?Sized>(rows: usize, dimension: usize, rng: &mut R) -> Self {
        let values = (0..rows * dimension)
            .map(|_| rng.sample::<f64, _>(StandardNormal))
            .collect();
        Self {
            rows,
            dimension,
            values,
        }
    }

    /// Builds a population from row-major values.
    pub fn from_values(
        rows: usize,
        dimension: usize,
        values: Vec<f64>,
    ) -> Result<Self, SplitError> {
        if dimension == 0 || values.len() != rows * dimension {
            return Err(SplitError::Parameter(
                ErrorInfo::new("population-shape", "values do not form a rows x dimension matrix")
                    .with_context("rows", rows)
                    .with_context("dimension", dimension)
                    .with_context("values", values.len()),
            ));
        }
        Ok(Self {
            rows,
            dimension,
            values,
        })
    }

    /// Number of particles.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of coordinates per particle.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Row-major coordinate storage.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Coordinates of a single particle.
    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.dimension;
        &self.values[start..start + self.dimension]
    }

    /// Iterates over particles.
    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.dimension)
    }

    /// Row-wise sums. Always recomputed from the coordinates.
    pub fn statistics(&self) -> Vec<f64> {
        self.iter_rows().map(row_sum).collect()
    }

    /// Builds a new population from the listed rows, repeats allowed.
    pub fn gather(&self, indices: &[usize]) -> Self {
        let mut values = Vec::with_capacity(indices.len() * self.dimension);
        for &index in indices {
            values.extend_from_slice(self.row(index));
        }
        Self {
            rows: indices.len(),
            dimension: self.dimension,
            values,
        }
    }

    /// SHA-256 over the shape and the little-endian coordinate bits.
    pub fn canonical_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.rows as u64).to_le_bytes());
        hasher.update((self.dimension as u64).to_le_bytes());
        for value in &self.values {
            hasher.update(value.to_bits().to_le_bytes());
        }
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect()
    }
}

/// Sum statistic of one particle, accumulated left to right.
pub fn row_sum(row: &[f64]) -> f64 {
    row.iter().sum()
}

/// Sum of `row` with coordinate `coordinate` replaced by `value`.
///
/// Accumulates in the same order as [`row_sum`], so accepting the proposal
/// leaves the row with exactly this statistic.
pub fn row_sum_with(row: &[f64], coordinate: usize, value: f64) -> f64 {
    row.iter()
        .enumerate()
        .map(|(idx, &x)| if idx == coordinate { value } else { x })
        .sum()
}
