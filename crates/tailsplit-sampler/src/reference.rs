//! Closed-form reference values for the Gaussian tail.
//!
//! The sum of `n` i.i.d. standard normals is `N(0, n)`, so
//! `P(mean >= a) = P(Z >= a sqrt(n))`. These helpers never feed back into
//! the level loop; they exist for post-run comparison.

use std::f64::consts::{PI, SQRT_2};

use serde::{Deserialize, Serialize};

/// Exact `P(mean(X_1..X_n) >= a)`, evaluated through `erfc` so it stays
/// accurate far into the tail.
pub fn exact_tail(mean_threshold: f64, dimension: usize) -> f64 {
    let z = mean_threshold * (dimension as f64).sqrt();
    0.5 * libm::erfc(z / SQRT_2)
}

/// Mills-ratio approximation `exp(-z^2 / 2) / (z sqrt(2 pi))` with `z = a sqrt(n)`.
///
/// Only meaningful for `z > 0`; returns NaN otherwise.
pub fn mills_approximation(mean_threshold: f64, dimension: usize) -> f64 {
    let z = mean_threshold * (dimension as f64).sqrt();
    if z <= 0.0 {
        return f64::NAN;
    }
    (-0.5 * z * z).exp() / (z * (2.0 * PI).sqrt())
}

/// Density of `N(0, n)` at `u`.
pub fn sum_density(u: f64, dimension: usize) -> f64 {
    let variance = dimension as f64;
    (-u * u / (2.0 * variance)).exp() / (2.0 * PI * variance).sqrt()
}

/// Side-by-side comparison of an estimate with the closed-form values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceComparison {
    /// Splitting estimate.
    pub estimate: f64,
    /// Exact tail probability.
    pub exact: f64,
    /// Mills-ratio approximation.
    pub mills: f64,
    /// `|estimate - exact|`.
    pub abs_error_exact: f64,
    /// `|estimate - mills|`.
    pub abs_error_mills: f64,
    /// `log10(estimate / exact)`.
    pub log10_ratio: f64,
}

impl ReferenceComparison {
    /// Compares `estimate` against the reference values for `(a, n)`.
    pub fn new(estimate: f64, mean_threshold: f64, dimension: usize) -> Self {
        let exact = exact_tail(mean_threshold, dimension);
        let mills = mills_approximation(mean_threshold, dimension);
        Self {
            estimate,
            exact,
            mills,
            abs_error_exact: (estimate - exact).abs(),
            abs_error_mills: (estimate - mills).abs(),
            log10_ratio: (estimate / exact).log10(),
        }
    }

    /// True when the estimate is within `orders` orders of magnitude of the exact value.
    pub fn within_orders_of_magnitude(&self, orders: f64) -> bool {
        self.log10_ratio.is_finite() && self.log10_ratio.abs() <= orders
    }
}
