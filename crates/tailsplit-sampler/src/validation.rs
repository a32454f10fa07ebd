//! Offline check of the asymptotic normality of the sample median.
//!
//! For `m` standard normals the median is approximately
//! `N(0, 1 / (4 m phi(0)^2))`. The variance proxy recorded per level relies on
//! this, so the routine draws many independent medians and compares their
//! spread and shape with the limit.

use std::f64::consts::{PI, SQRT_2};

use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tailsplit_core::errors::ErrorInfo;
use tailsplit_core::{RngHandle, SplitError};

use crate::determinism;
use crate::threshold;

/// Outcome of a median CLT validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedianValidation {
    /// Number of independent samples.
    pub replications: usize,
    /// Size of each sample.
    pub sample_size: usize,
    /// Mean of the sample medians (theory: 0).
    pub empirical_mean: f64,
    /// Standard deviation of the sample medians.
    pub empirical_std: f64,
    /// Limit standard deviation `sqrt(1 / (4 m phi(0)^2))`.
    pub theoretical_std: f64,
    /// Kolmogorov-Smirnov distance of the standardized medians from N(0, 1).
    pub ks_statistic: f64,
    /// Asymptotic p-value of the KS statistic.
    pub ks_p_value: f64,
}

impl MedianValidation {
    /// True when normality is not rejected at level `alpha`.
    pub fn is_consistent(&self, alpha: f64) -> bool {
        self.ks_p_value > alpha
    }
}

/// Draws `replications` standard-normal samples of `sample_size` values and
/// tests their medians against the normal limit.
///
/// Replication `r` draws from the substream
/// [`determinism::replication_seed`]`(seed, r)`, so the result does not depend
/// on the rayon pool size.
pub fn validate_median_clt(
    replications: usize,
    sample_size: usize,
    seed: u64,
) -> Result<MedianValidation, SplitError> {
    if replications < 2 {
        return Err(SplitError::Parameter(
            ErrorInfo::new("replications-too-small", "need at least two replications")
                .with_context("replications", replications),
        ));
    }
    if sample_size < 1 {
        return Err(SplitError::Parameter(ErrorInfo::new(
            "sample-size-zero",
            "sample size must be positive",
        )));
    }

    let medians: Vec<f64> = (0..replications)
        .into_par_iter()
        .map(|replication| {
            let mut rng =
                RngHandle::from_seed(determinism::replication_seed(seed, replication));
            let sample: Vec<f64> = (0..sample_size)
                .map(|_| rng.sample::<f64, _>(StandardNormal))
                .collect();
            threshold::median(&sample).unwrap_or(0.0)
        })
        .collect();

    let count = medians.len() as f64;
    let empirical_mean = medians.iter().sum::<f64>() / count;
    let empirical_std = (medians
        .iter()
        .map(|value| (value - empirical_mean).powi(2))
        .sum::<f64>()
        / count)
        .sqrt();
    let density_at_zero = 1.0 / (2.0 * PI).sqrt();
    let theoretical_std =
        (1.0 / (4.0 * sample_size as f64 * density_at_zero * density_at_zero)).sqrt();

    let mut standardized: Vec<f64> = medians
        .iter()
        .map(|value| value / theoretical_std)
        .collect();
    standardized.sort_unstable_by(f64::total_cmp);
    let ks_statistic = ks_distance(&standardized);
    let ks_p_value = kolmogorov_p_value(ks_statistic, standardized.len());

    Ok(MedianValidation {
        replications,
        sample_size,
        empirical_mean,
        empirical_std,
        theoretical_std,
        ks_statistic,
        ks_p_value,
    })
}

fn normal_cdf(x: f64) -> f64 {
    0.5 * libm::erfc(-x / SQRT_2)
}

/// Two-sided KS distance of an ascending sample from N(0, 1).
fn ks_distance(sorted: &[f64]) -> f64 {
    let n = sorted.len() as f64;
    sorted
        .iter()
        .enumerate()
        .map(|(idx, &value)| {
            let cdf = normal_cdf(value);
            let above = (idx + 1) as f64 / n - cdf;
            let below = cdf - idx as f64 / n;
            above.max(below)
        })
        .fold(0.0, f64::max)
}

/// Asymptotic Kolmogorov tail `Q(lambda)` with the Stephens small-sample correction.
fn kolmogorov_p_value(statistic: f64, samples: usize) -> f64 {
    let root = (samples as f64).sqrt();
    let lambda = (root + 0.12 + 0.11 / root) * statistic;
    if lambda < 1e-3 {
        return 1.0;
    }
    let mut sum = 0.0;
    let mut sign = 1.0;
    for k in 1..=100 {
        let k = k as f64;
        let term = sign * (-2.0 * k * k * lambda * lambda).exp();
        sum += term;
        if term.abs() < 1e-12 {
            return (2.0 * sum).clamp(0.0, 1.0);
        }
        sign = -sign;
    }
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p_value_decreases_with_distance() {
        let near = kolmogorov_p_value(0.01, 500);
        let far = kolmogorov_p_value(0.2, 500);
        assert!(near > far);
        assert!(far < 1e-6);
        assert_eq!(kolmogorov_p_value(0.0, 10), 1.0);
    }

    #[test]
    fn ks_distance_of_single_point_at_zero_is_half() {
        assert!((ks_distance(&[0.0]) - 0.5).abs() < 1e-12);
    }
}
