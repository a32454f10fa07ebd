use std::fs;
use std::path::PathBuf;

use tempfile::tempdir;

use tailsplit_sampler::config::MAX_LEVEL_CAP;
use tailsplit_sampler::RunConfig;

#[test]
fn partial_yaml_falls_back_to_defaults() {
    let config = RunConfig::from_yaml_str(
        "dimension: 1\nmean_threshold: 3.0\npopulation: 4096\nparallel:\n  threads: 2\n",
    )
    .unwrap();
    assert_eq!(config.dimension, 1);
    assert_eq!(config.population, 4096);
    assert_eq!(config.target(), 3.0);
    assert_eq!(config.parallel.threads, 2);
    assert_eq!(config.parallel.chunk_rows, 4096);
    assert_eq!(config.max_levels, RunConfig::default().max_levels);
    assert_eq!(config.output.trace_file, PathBuf::from("trace.csv"));
    assert!(config.output.run_directory.is_none());
    config.validate().unwrap();
}

#[test]
fn empty_mapping_is_the_default_problem() {
    let config = RunConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, RunConfig::default());
    assert_eq!(config.target(), 20.0);
}

#[test]
fn malformed_yaml_is_a_serde_error() {
    let err = RunConfig::from_yaml_str("dimension: [not, a, number]").unwrap_err();
    assert_eq!(err.code(), "config-parse");
}

#[test]
fn load_reads_yaml_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.yaml");
    fs::write(
        &path,
        "dimension: 10\nmean_threshold: 2.0\npopulation: 65536\nseed_policy:\n  master_seed: 7\n  label: paper\n",
    )
    .unwrap();
    let config = RunConfig::load(&path).unwrap();
    assert_eq!(config.seed_policy.master_seed, 7);
    assert_eq!(config.seed_policy.label.as_deref(), Some("paper"));

    let missing = RunConfig::load(&dir.path().join("missing.yaml")).unwrap_err();
    assert_eq!(missing.code(), "config-read");
}

#[test]
fn validate_rejects_unusable_parameters() {
    let mut config = RunConfig::default();
    config.parallel.chunk_rows = 0;
    assert_eq!(config.validate().unwrap_err().code(), "chunk-rows-zero");

    let mut config = RunConfig::default();
    config.max_levels = MAX_LEVEL_CAP + 1;
    assert_eq!(config.validate().unwrap_err().code(), "level-cap-too-large");

    let mut config = RunConfig::default();
    config.mean_threshold = f64::MAX;
    assert_eq!(config.validate().unwrap_err().code(), "threshold-non-finite");
}
