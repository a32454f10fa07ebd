use tailsplit_core::errors::{ErrorInfo, SplitError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("population", 2)
        .with_context("reason", "example")
}

#[test]
fn parameter_error_surface() {
    let err = SplitError::Parameter(sample_info("population-too-small", "N must be >= 2"));
    assert_eq!(err.code(), "population-too-small");
    assert_eq!(err.info().context.get("population").map(String::as_str), Some("2"));
}

#[test]
fn selection_error_surface() {
    let err = SplitError::Selection(sample_info("empty-survivor-set", "no survivors"));
    assert_eq!(err.info().code, "empty-survivor-set");
    assert!(err.info().context.contains_key("reason"));
}

#[test]
fn convergence_error_surface() {
    let err = SplitError::Convergence(sample_info("level-cap-exhausted", "cap reached"));
    assert_eq!(err.code(), "level-cap-exhausted");
}

#[test]
fn display_includes_context_and_hint() {
    let info = ErrorInfo::new("E001", "problem")
        .with_context("level", 3)
        .with_hint("raise max_levels");
    let rendered = SplitError::Convergence(info).to_string();
    assert!(rendered.starts_with("convergence failure: problem (code: E001)"));
    assert!(rendered.contains("level=3"));
    assert!(rendered.contains("hint: raise max_levels"));
}

#[test]
fn errors_round_trip_json() {
    let err = SplitError::Io(sample_info("trace-write", "disk full"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Io\""));
    let decoded: SplitError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}
