use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tailsplit_core::errors::ErrorInfo;
use tailsplit_core::SplitError;

use crate::kernel::LevelRecord;

/// Aggregate view over a level trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    /// Levels that ran a rejuvenation sweep.
    pub completed_levels: usize,
    /// Mean acceptance rate over completed levels.
    pub mean_acceptance: f64,
    /// Lowest acceptance rate observed.
    pub min_acceptance: f64,
    /// Highest acceptance rate observed.
    pub max_acceptance: f64,
    /// Levels whose variance of the median was infinite.
    pub infinite_variance_levels: usize,
}

impl TraceSummary {
    /// Summarises the provided level records.
    pub fn from_levels(levels: &[LevelRecord]) -> Self {
        let rates: Vec<f64> = levels
            .iter()
            .filter_map(|record| record.acceptance_rate)
            .collect();
        let infinite_variance_levels = levels
            .iter()
            .filter(|record| record.variance_of_median.is_infinite())
            .count();
        if rates.is_empty() {
            return Self {
                completed_levels: 0,
                mean_acceptance: 0.0,
                min_acceptance: 0.0,
                max_acceptance: 0.0,
                infinite_variance_levels,
            };
        }
        Self {
            completed_levels: rates.len(),
            mean_acceptance: rates.iter().sum::<f64>() / rates.len() as f64,
            min_acceptance: rates.iter().copied().fold(f64::INFINITY, f64::min),
            max_acceptance: rates.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            infinite_variance_levels,
        }
    }
}

/// Writes the level trace as CSV; the converging level leaves the last two cells empty.
pub fn write_csv(levels: &[LevelRecord], path: &Path) -> Result<(), SplitError> {
    let io_err = |err: std::io::Error| {
        SplitError::Io(
            ErrorInfo::new("trace-write", err.to_string()).with_context("path", path.display()),
        )
    };
    let mut file = File::create(path).map_err(io_err)?;
    writeln!(
        file,
        "level,threshold,variance_of_median,acceptance_rate,survivors"
    )
    .map_err(io_err)?;
    for record in levels {
        let acceptance = record
            .acceptance_rate
            .map(|rate| format!("{rate:.6}"))
            .unwrap_or_default();
        let survivors = record
            .survivors
            .map(|count| count.to_string())
            .unwrap_or_default();
        writeln!(
            file,
            "{},{:.9},{:e},{},{}",
            record.level, record.threshold, record.variance_of_median, acceptance, survivors
        )
        .map_err(io_err)?;
    }
    Ok(())
}
