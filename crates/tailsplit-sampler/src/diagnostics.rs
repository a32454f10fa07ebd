use serde::{Deserialize, Serialize};

use crate::kernel::RunResult;

/// Empirical threshold spacing per level is roughly `0.67 sqrt(n)`.
pub const SPACING_COEFFICIENT: f64 = 0.67;

/// Reference acceptance rate for a well-mixed sweep.
pub const REFERENCE_ACCEPTANCE: f64 = 0.5;

/// Plot-ready series derived from a run trace.
///
/// Holds the threshold trajectory, the per-level spacing against its
/// `sqrt(n)` scaling, the log-variance trend and the acceptance trend.
/// Rendering is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticSeries {
    /// Thresholds in level order.
    pub thresholds: Vec<f64>,
    /// Target sum `n * a`.
    pub target: f64,
    /// Threshold increments, the first measured from zero.
    pub increments: Vec<f64>,
    /// Expected increment `0.67 sqrt(n)`.
    pub expected_spacing: f64,
    /// `log10` of each finite variance of the median, in level order.
    pub log10_variances: Vec<f64>,
    /// Acceptance rates of completed levels.
    pub acceptance_rates: Vec<f64>,
    /// Reference acceptance rate.
    pub reference_acceptance: f64,
}

impl DiagnosticSeries {
    /// Extracts the series from a run of dimension `n`.
    pub fn from_result(result: &RunResult, dimension: usize) -> Self {
        let thresholds = result.thresholds();
        let increments = thresholds
            .iter()
            .scan(0.0, |previous, &value| {
                let step = value - *previous;
                *previous = value;
                Some(step)
            })
            .collect();
        let log10_variances = result
            .levels
            .iter()
            .map(|record| record.variance_of_median)
            .filter(|value| value.is_finite())
            .map(f64::log10)
            .collect();
        Self {
            thresholds,
            target: result.target,
            increments,
            expected_spacing: SPACING_COEFFICIENT * (dimension as f64).sqrt(),
            log10_variances,
            acceptance_rates: result.acceptance_rates(),
            reference_acceptance: REFERENCE_ACCEPTANCE,
        }
    }

    /// Mean threshold increment, excluding the first level.
    pub fn mean_spacing(&self) -> Option<f64> {
        let tail = self.increments.get(1..)?;
        if tail.is_empty() {
            return None;
        }
        Some(tail.iter().sum::<f64>() / tail.len() as f64)
    }
}
