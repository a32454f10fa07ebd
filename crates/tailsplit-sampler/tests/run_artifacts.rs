use std::fs;

use tempfile::tempdir;

use tailsplit_sampler::{run, Population, RunConfig, RunManifest};

fn artifact_config(root: &std::path::Path) -> RunConfig {
    let mut config = RunConfig::for_problem(3, 1.5, 1024);
    config.seed_policy.master_seed = 888;
    config.seed_policy.label = Some("artifacts".into());
    config.parallel.chunk_rows = 128;
    config.output.run_directory = Some(root.join("run"));
    config
}

#[test]
fn run_writes_trace_population_and_manifest() {
    let dir = tempdir().unwrap();
    let config = artifact_config(dir.path());
    let result = run(&config).unwrap();
    let artifacts = result.artifacts.clone().expect("artifacts written");

    let trace = fs::read_to_string(&artifacts.trace_path).unwrap();
    let lines: Vec<&str> = trace.lines().collect();
    assert_eq!(
        lines[0],
        "level,threshold,variance_of_median,acceptance_rate,survivors"
    );
    assert_eq!(lines.len(), result.levels.len() + 1);
    assert!(lines.last().unwrap().ends_with(",,"));

    let population: Population =
        serde_json::from_str(&fs::read_to_string(&artifacts.population_path).unwrap()).unwrap();
    assert_eq!(population.rows(), result.final_population.rows());
    assert_eq!(population.dimension(), 3);

    let manifest = RunManifest::load(&artifacts.manifest_path).unwrap();
    assert_eq!(manifest.level_count, result.level_count);
    assert_eq!(manifest.probability_estimate, result.probability_estimate);
    assert_eq!(manifest.provenance.seed, 888);
    assert_eq!(manifest.seed_label.as_deref(), Some("artifacts"));
    assert_eq!(
        manifest.population_hash,
        result.final_population.canonical_hash()
    );
    assert_eq!(manifest.trace_file, config.output.trace_file);
    assert!(!manifest.provenance.created_at.is_empty());
}

#[test]
fn run_without_directory_writes_nothing() {
    let mut config = RunConfig::for_problem(2, 1.0, 256);
    config.output.run_directory = None;
    let result = run(&config).unwrap();
    assert!(result.artifacts.is_none());
}

#[test]
fn manifest_load_reports_missing_file() {
    let dir = tempdir().unwrap();
    let err = RunManifest::load(&dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.code(), "manifest-read");
}
