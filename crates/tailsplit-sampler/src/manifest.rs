use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tailsplit_core::errors::ErrorInfo;
use tailsplit_core::{RunProvenance, SchemaVersion, SplitError};

use crate::config::RunConfig;
use crate::kernel::RunResult;

/// Schema of the manifest payload.
pub const MANIFEST_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Structured manifest describing a converged run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Configuration used for the run.
    pub config: RunConfig,
    /// Optional seed label captured from the configuration.
    pub seed_label: Option<String>,
    /// Target value of the sum statistic.
    pub target: f64,
    /// Number of completed levels `K`.
    pub level_count: usize,
    /// Estimated probability `2^-K`.
    pub probability_estimate: f64,
    /// Canonical hash of the final population.
    pub population_hash: String,
    /// Level trace file (relative to the run directory).
    pub trace_file: PathBuf,
    /// Final population file (relative to the run directory).
    pub population_file: PathBuf,
    /// Seed, schema and tool provenance.
    pub provenance: RunProvenance,
}

impl RunManifest {
    /// Builds a manifest for a finished run.
    pub fn from_result(
        config: &RunConfig,
        result: &RunResult,
        trace_file: PathBuf,
        population_file: PathBuf,
    ) -> Self {
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert(
            env!("CARGO_PKG_NAME").to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        Self {
            config: config.clone(),
            seed_label: config.seed_policy.label.clone(),
            target: result.target,
            level_count: result.level_count,
            probability_estimate: result.probability_estimate,
            population_hash: result.final_population.canonical_hash(),
            trace_file,
            population_file,
            provenance: RunProvenance {
                schema_version: MANIFEST_SCHEMA,
                seed: result.seed,
                created_at: Utc::now().to_rfc3339(),
                tool_versions,
            },
        }
    }

    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), SplitError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                SplitError::Io(
                    ErrorInfo::new("manifest-mkdir", err.to_string())
                        .with_context("path", parent.display()),
                )
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            SplitError::Serde(
                ErrorInfo::new("manifest-serialize", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            SplitError::Io(
                ErrorInfo::new("manifest-write", err.to_string())
                    .with_context("path", path.display()),
            )
        })
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, SplitError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SplitError::Io(
                ErrorInfo::new("manifest-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            SplitError::Serde(
                ErrorInfo::new("manifest-parse", err.to_string())
                    .with_context("path", path.display()),
            )
        })
    }
}
