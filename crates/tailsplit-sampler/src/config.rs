use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tailsplit_core::errors::ErrorInfo;
use tailsplit_core::SplitError;

/// Largest level cap accepted; keeps `2^-K` a positive normal double.
pub const MAX_LEVEL_CAP: usize = 1000;

/// YAML-configurable parameters governing a splitting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of i.i.d. standard-normal coordinates per particle (`n`).
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// Per-coordinate mean threshold `a`; the target sum is `n * a`.
    #[serde(default = "default_mean_threshold")]
    pub mean_threshold: f64,
    /// Number of particles per level (`N`).
    #[serde(default = "default_population")]
    pub population: usize,
    /// Maximum number of completed levels before reporting a convergence failure.
    #[serde(default = "default_max_levels")]
    pub max_levels: usize,
    /// Master seed policy.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Row partitioning used by the rejuvenation sweep.
    #[serde(default)]
    pub parallel: ParallelConfig,
    /// Output directory configuration.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_dimension() -> usize {
    10
}

fn default_mean_threshold() -> f64 {
    2.0
}

fn default_population() -> usize {
    1 << 16
}

fn default_max_levels() -> usize {
    512
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            mean_threshold: default_mean_threshold(),
            population: default_population(),
            max_levels: default_max_levels(),
            seed_policy: SeedPolicy::default(),
            parallel: ParallelConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl RunConfig {
    /// Builds a configuration for the given problem with every other field defaulted.
    pub fn for_problem(dimension: usize, mean_threshold: f64, population: usize) -> Self {
        Self {
            dimension,
            mean_threshold,
            population,
            ..Self::default()
        }
    }

    /// Target value of the sum statistic, `n * a`.
    pub fn target(&self) -> f64 {
        self.dimension as f64 * self.mean_threshold
    }

    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SplitError> {
        serde_yaml::from_str(yaml)
            .map_err(|err| SplitError::Serde(ErrorInfo::new("config-parse", err.to_string())))
    }

    /// Loads a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, SplitError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SplitError::Io(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Self::from_yaml_str(&contents).map_err(|err| match err {
            SplitError::Serde(info) => {
                SplitError::Serde(info.with_context("path", path.display()))
            }
            other => other,
        })
    }

    /// Rejects parameters the level loop cannot run with.
    pub fn validate(&self) -> Result<(), SplitError> {
        if self.population < 2 {
            return Err(SplitError::Parameter(
                ErrorInfo::new(
                    "population-too-small",
                    "population must hold at least two particles",
                )
                .with_context("population", self.population),
            ));
        }
        if self.dimension < 1 {
            return Err(SplitError::Parameter(ErrorInfo::new(
                "dimension-zero",
                "dimension must be at least one",
            )));
        }
        if !self.mean_threshold.is_finite() || !self.target().is_finite() {
            return Err(SplitError::Parameter(
                ErrorInfo::new("threshold-non-finite", "mean threshold must be finite")
                    .with_context("mean_threshold", self.mean_threshold),
            ));
        }
        if self.parallel.chunk_rows == 0 {
            return Err(SplitError::Parameter(ErrorInfo::new(
                "chunk-rows-zero",
                "parallel.chunk_rows must be positive",
            )));
        }
        if self.max_levels > MAX_LEVEL_CAP {
            return Err(SplitError::Parameter(
                ErrorInfo::new("level-cap-too-large", "max_levels exceeds the supported cap")
                    .with_context("max_levels", self.max_levels)
                    .with_context("cap", MAX_LEVEL_CAP),
            ));
        }
        Ok(())
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed used for the run.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label recorded in the manifest.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x05EE_D5EE_DD15_5EED_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

/// Row partitioning for the data-parallel rejuvenation sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Worker threads for the rayon pool (0 uses the rayon default).
    #[serde(default)]
    pub threads: usize,
    /// Rows per work unit. Each unit draws from its own substream, so results
    /// depend on this value but not on `threads`.
    #[serde(default = "default_chunk_rows")]
    pub chunk_rows: usize,
}

fn default_chunk_rows() -> usize {
    4096
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            chunk_rows: default_chunk_rows(),
        }
    }
}

/// Output directory layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for run artefacts. Nothing is written when unset.
    #[serde(default)]
    pub run_directory: Option<PathBuf>,
    /// Level trace filename relative to `run_directory`.
    #[serde(default = "default_trace_filename")]
    pub trace_file: PathBuf,
    /// Manifest filename relative to `run_directory`.
    #[serde(default = "default_manifest_filename")]
    pub manifest_file: PathBuf,
    /// Final population filename relative to `run_directory`.
    #[serde(default = "default_population_filename")]
    pub population_file: PathBuf,
}

fn default_trace_filename() -> PathBuf {
    PathBuf::from("trace.csv")
}

fn default_manifest_filename() -> PathBuf {
    PathBuf::from("manifest.json")
}

fn default_population_filename() -> PathBuf {
    PathBuf::from("population.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            run_directory: None,
            trace_file: default_trace_filename(),
            manifest_file: default_manifest_filename(),
            population_file: default_population_filename(),
        }
    }
}
