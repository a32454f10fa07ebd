use std::fs;
use std::path::{Path, PathBuf};

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tailsplit_core::errors::ErrorInfo;
use tailsplit_core::{RngHandle, SplitError};
use tracing::{debug, info, warn};

use crate::config::{ParallelConfig, RunConfig};
use crate::manifest::RunManifest;
use crate::population::Population;
use crate::rejuvenate;
use crate::selection;
use crate::sink::{LevelSink, NullSink, TracingSink};
use crate::threshold;
use crate::trace;

/// Diagnostics recorded for one level of the splitting loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    /// Zero-based level index.
    pub level: usize,
    /// Median threshold selected at this level.
    pub threshold: f64,
    /// Variance proxy of the median; may be `+inf`.
    pub variance_of_median: f64,
    /// Gibbs acceptance rate; absent for the converging level.
    pub acceptance_rate: Option<f64>,
    /// Distinct survivors before resampling; absent for the converging level.
    pub survivors: Option<usize>,
}

/// Paths of the artefacts written for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunArtifacts {
    /// Level trace CSV.
    pub trace_path: PathBuf,
    /// Final population JSON.
    pub population_path: PathBuf,
    /// Run manifest JSON.
    pub manifest_path: PathBuf,
}

/// Result of a converged run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Estimated tail probability `2^-K`.
    pub probability_estimate: f64,
    /// Number of completed selection and rejuvenation levels `K`.
    pub level_count: usize,
    /// One record per level, including the converging level.
    pub levels: Vec<LevelRecord>,
    /// Population at termination, owned by the result.
    pub final_population: Population,
    /// Master seed that drove every draw.
    pub seed: u64,
    /// Target value of the sum statistic, `n * a`.
    pub target: f64,
    /// Artefacts written to the run directory, if one was configured.
    pub artifacts: Option<RunArtifacts>,
}

impl RunResult {
    /// Thresholds in level order.
    pub fn thresholds(&self) -> Vec<f64> {
        self.levels.iter().map(|record| record.threshold).collect()
    }

    /// Acceptance rates of the completed levels.
    pub fn acceptance_rates(&self) -> Vec<f64> {
        self.levels
            .iter()
            .filter_map(|record| record.acceptance_rate)
            .collect()
    }
}

/// Estimates `P(X_1 + ... + X_n >= n a)` for i.i.d. standard normals.
///
/// Draws a seed from OS entropy when `seed` is `None`; the seed used is
/// reported in the result. Nothing is logged per level and nothing is written
/// to disk.
pub fn estimate(
    dimension: usize,
    mean_threshold: f64,
    population: usize,
    seed: Option<u64>,
) -> Result<RunResult, SplitError> {
    let config = RunConfig::for_problem(dimension, mean_threshold, population);
    let seed = seed.unwrap_or_else(rand::random);
    run_with_sink(&config, seed, &mut NullSink)
}

/// Runs the configured problem with the configured master seed.
///
/// Levels are reported through [`TracingSink`]. When
/// `config.output.run_directory` is set the trace, final population and
/// manifest are written there after convergence.
pub fn run(config: &RunConfig) -> Result<RunResult, SplitError> {
    let mut result = run_with_sink(config, config.seed_policy.master_seed, &mut TracingSink)?;
    if let Some(run_dir) = &config.output.run_directory {
        result.artifacts = Some(write_artifacts(config, &result, run_dir)?);
    }
    Ok(result)
}

/// Drives the level loop, reporting each level to `sink`.
///
/// Each level takes the median of the current sums as its threshold, stops if
/// it reaches the target, and otherwise keeps the survivors, resamples them
/// back to `N` rows and rejuvenates them with one constrained Gibbs sweep.
/// Fails with a convergence error once `config.max_levels` levels completed
/// without reaching the target.
pub fn run_with_sink(
    config: &RunConfig,
    seed: u64,
    sink: &mut dyn LevelSink,
) -> Result<RunResult, SplitError> {
    config.validate()?;
    let target = config.target();
    let pool = build_pool(&config.parallel)?;
    let mut rng = RngHandle::from_seed(seed);
    let mut population =
        Population::standard_normal(config.population, config.dimension, &mut rng);
    let mut levels: Vec<LevelRecord> = Vec::new();
    let mut completed = 0usize;

    loop {
        let statistics = population.statistics();
        let estimate = threshold::estimate(&statistics)?;
        let u = estimate.threshold;
        if estimate.variance_of_median.is_infinite() {
            warn!(
                level = completed,
                threshold = u,
                "degenerate quartile gap, variance of median is infinite"
            );
        }

        if u >= target {
            let record = LevelRecord {
                level: completed,
                threshold: u,
                variance_of_median: estimate.variance_of_median,
                acceptance_rate: None,
                survivors: None,
            };
            sink.on_level(&record);
            levels.push(record);
            break;
        }

        if completed >= config.max_levels {
            warn!(
                levels = completed,
                threshold = u,
                target_sum = target,
                "level cap exhausted"
            );
            return Err(SplitError::Convergence(
                ErrorInfo::new("level-cap-exhausted", "target not reached within the level cap")
                    .with_context("max_levels", config.max_levels)
                    .with_context("threshold", u)
                    .with_context("target", target)
                    .with_hint("raise max_levels or the population size"),
            ));
        }

        let selected = selection::select_and_resample(population, &statistics, u, &mut rng)?;
        population = selected.population;
        let sweep_seed = rng.next_u64();
        let chunk_rows = config.parallel.chunk_rows;
        let sweep =
            pool.install(|| rejuvenate::gibbs_sweep(&mut population, u, sweep_seed, chunk_rows));

        let record = LevelRecord {
            level: completed,
            threshold: u,
            variance_of_median: estimate.variance_of_median,
            acceptance_rate: Some(sweep.acceptance_rate()),
            survivors: Some(selected.survivors),
        };
        debug!(
            level = completed,
            threshold = u,
            survivors = selected.survivors,
            acceptance_rate = sweep.acceptance_rate(),
            "level advanced"
        );
        sink.on_level(&record);
        levels.push(record);
        completed += 1;
    }

    let probability_estimate = 0.5f64.powi(completed as i32);
    info!(
        levels = completed,
        probability_estimate,
        target_sum = target,
        "reached target"
    );

    Ok(RunResult {
        probability_estimate,
        level_count: completed,
        levels,
        final_population: population,
        seed,
        target,
        artifacts: None,
    })
}

fn build_pool(parallel: &ParallelConfig) -> Result<rayon::ThreadPool, SplitError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(parallel.threads)
        .build()
        .map_err(|err| {
            SplitError::Io(
                ErrorInfo::new("thread-pool", err.to_string())
                    .with_context("threads", parallel.threads),
            )
        })
}

fn write_artifacts(
    config: &RunConfig,
    result: &RunResult,
    run_dir: &Path,
) -> Result<RunArtifacts, SplitError> {
    fs::create_dir_all(run_dir).map_err(|err| {
        SplitError::Io(
            ErrorInfo::new("run-dir-create", err.to_string())
                .with_context("path", run_dir.display()),
        )
    })?;

    let trace_path = run_dir.join(&config.output.trace_file);
    trace::write_csv(&result.levels, &trace_path)?;

    let population_path = run_dir.join(&config.output.population_file);
    let population_json = serde_json::to_string(&result.final_population).map_err(|err| {
        SplitError::Serde(
            ErrorInfo::new("population-serialize", err.to_string())
                .with_context("path", population_path.display()),
        )
    })?;
    fs::write(&population_path, population_json).map_err(|err| {
        SplitError::Io(
            ErrorInfo::new("population-write", err.to_string())
                .with_context("path", population_path.display()),
        )
    })?;

    let manifest_path = run_dir.join(&config.output.manifest_file);
    let manifest = RunManifest::from_result(
        config,
        result,
        config.output.trace_file.clone(),
        config.output.population_file.clone(),
    );
    manifest.write(&manifest_path)?;

    Ok(RunArtifacts {
        trace_path,
        population_path,
        manifest_path,
    })
}
