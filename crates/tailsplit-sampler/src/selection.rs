use rand::Rng;
use tailsplit_core::errors::ErrorInfo;
use tailsplit_core::SplitError;

use crate::population::Population;

/// Outcome of one selection step.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Regenerated population of the original size.
    pub population: Population,
    /// Number of distinct rows that cleared the threshold.
    pub survivors: usize,
}

/// Discards rows below `threshold` and refills the population by sampling
/// survivors uniformly with replacement.
///
/// `statistics` must be the row sums of `population`. The input population is
/// consumed; every returned row satisfies `statistic >= threshold`.
pub fn select_and_resample<R: Rng + ?Sized>(
    population: Population,
    statistics: &[f64],
    threshold: f64,
    rng: &mut R,
) -> Result<Selection, SplitError> {
    if statistics.len() != population.rows() {
        return Err(SplitError::Selection(
            ErrorInfo::new(
                "statistic-length-mismatch",
                "statistic vector does not match the population",
            )
            .with_context("rows", population.rows())
            .with_context("statistics", statistics.len()),
        ));
    }

    let survivors: Vec<usize> = statistics
        .iter()
        .enumerate()
        .filter(|(_, value)| **value >= threshold)
        .map(|(index, _)| index)
        .collect();
    if survivors.is_empty() {
        return Err(SplitError::Selection(
            ErrorInfo::new("empty-survivor-set", "no particle reached the threshold")
                .with_context("threshold", threshold)
                .with_context("rows", population.rows())
                .with_hint("the threshold must be an order statistic of the current population"),
        ));
    }

    let picks: Vec<usize> = (0..population.rows())
        .map(|_| survivors[rng.gen_range(0..survivors.len())])
        .collect();

    Ok(Selection {
        population: population.gather(&picks),
        survivors: survivors.len(),
    })
}
