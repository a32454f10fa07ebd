#![deny(missing_docs)]

//! Adaptive multilevel-splitting estimator for Gaussian sum tails.
//!
//! Estimates `P(X_1 + ... + X_n >= n a)` for i.i.d. standard normals far in
//! the tail. Each level raises the threshold to the population median, keeps
//! the upper half, resamples it back to `N` particles and restores diversity
//! with one constrained Gibbs sweep. After `K` levels the estimate is `2^-K`.

/// Run configuration schema and defaults.
pub mod config;
/// Deterministic substream seed derivation.
pub mod determinism;
/// Plot-ready diagnostic series.
pub mod diagnostics;
/// Level loop and public `run`/`estimate` entry points.
pub mod kernel;
/// Run manifest serialization helpers.
pub mod manifest;
/// Particle population storage and the sum statistic.
pub mod population;
/// Closed-form reference probabilities.
pub mod reference;
/// Constrained Gibbs rejuvenation sweep.
pub mod rejuvenate;
/// Survivor selection and bootstrap resampling.
pub mod selection;
/// Per-level reporting sinks.
pub mod sink;
/// Median threshold and variance-of-median estimation.
pub mod threshold;
/// Level trace export and summaries.
pub mod trace;
/// Median CLT validation routine.
pub mod validation;

pub use config::{OutputConfig, ParallelConfig, RunConfig, SeedPolicy};
pub use diagnostics::DiagnosticSeries;
pub use kernel::{estimate, run, run_with_sink, LevelRecord, RunArtifacts, RunResult};
pub use manifest::RunManifest;
pub use population::Population;
pub use reference::{exact_tail, mills_approximation, ReferenceComparison};
pub use rejuvenate::SweepReport;
pub use sink::{LevelSink, NullSink, TracingSink};
pub use threshold::ThresholdEstimate;
pub use trace::TraceSummary;
pub use validation::{validate_median_clt, MedianValidation};
