use serde::{Deserialize, Serialize};
use tailsplit_core::errors::ErrorInfo;
use tailsplit_core::SplitError;

/// Median threshold of a statistic vector with its variance proxy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEstimate {
    /// Sample median of the statistics.
    pub threshold: f64,
    /// Estimated variance of the median; `+inf` when the upper quartile gap vanishes.
    pub variance_of_median: f64,
    /// Upper quartile used for the density proxy.
    pub upper_quartile: f64,
}

/// Computes the median threshold and the variance of the median.
///
/// The density at the median is approximated from the gap to the upper
/// quartile, `f(u) = (N/2) / (Q75 - Q50)`, giving `Var(u) = 1 / (4 N f(u)^2)`.
/// A non-positive gap yields `+inf` rather than an error. Quantiles use linear
/// interpolation between order statistics, so for even `N` the median is the
/// midpoint of the two central values.
pub fn estimate(statistics: &[f64]) -> Result<ThresholdEstimate, SplitError> {
    if statistics.len() < 2 {
        return Err(SplitError::Parameter(
            ErrorInfo::new("statistics-too-short", "median threshold needs at least two values")
                .with_context("len", statistics.len()),
        ));
    }
    if let Some(index) = statistics.iter().position(|value| !value.is_finite()) {
        return Err(SplitError::Parameter(
            ErrorInfo::new("statistic-non-finite", "statistic vector contains a non-finite value")
                .with_context("index", index),
        ));
    }

    let mut sorted = statistics.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    let count = sorted.len() as f64;
    let median = sorted_quantile(&sorted, 0.5);
    let upper = sorted_quantile(&sorted, 0.75);
    let variance_of_median = if upper > median {
        let density = (count / 2.0) / (upper - median);
        1.0 / (4.0 * count * density * density)
    } else {
        f64::INFINITY
    };

    Ok(ThresholdEstimate {
        threshold: median,
        variance_of_median,
        upper_quartile: upper,
    })
}

/// Linearly interpolated quantile of an ascending slice.
///
/// Position `p * (len - 1)` is split into the lower order statistic and a
/// fractional step towards the next one; the result never falls below the
/// lower order statistic.
pub fn sorted_quantile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    debug_assert!((0.0..=1.0).contains(&p));
    let position = p * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let fraction = position - lower as f64;
    let lo = sorted[lower];
    let hi = sorted[upper];
    if fraction == 0.0 || hi == lo {
        lo
    } else {
        lo + (hi - lo) * fraction
    }
}

/// Sample median of an unsorted slice using the same convention as [`estimate`].
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    Some(sorted_quantile(&sorted, 0.5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_length_median_averages_central_pair() {
        let estimate = estimate(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(estimate.threshold, 2.5);
        assert_eq!(estimate.upper_quartile, 3.25);
    }

    #[test]
    fn odd_length_median_is_central_value() {
        assert_eq!(median(&[5.0, -1.0, 2.0]), Some(2.0));
    }

    #[test]
    fn quartile_interpolates_between_order_statistics() {
        let sorted = [0.0, 10.0];
        assert_eq!(sorted_quantile(&sorted, 0.75), 7.5);
        assert_eq!(sorted_quantile(&sorted, 1.0), 10.0);
    }
}
