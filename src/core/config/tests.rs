use super::*;
use crate::core::errors::CommentaryError;

fn expect_validation_error<T: std::fmt::Debug>(result: Result<T>) -> CommentaryError {
    result.expect_err("expected validation failure")
}

#[test]
fn test_default_configs_validate_successfully() {
    CommentaryConfig::default()
        .validate()
        .expect("commentary default");
    AnalysisConfig::default()
        .validate()
        .expect("analysis default");
    ClassifierConfig::default()
        .validate()
        .expect("classifier default");
    DriftConfig::default().validate().expect("drift default");
}

#[test]
fn test_drift_thresholds_must_be_unit_range() {
    let mut config = DriftConfig::default();
    config.comment_similarity_threshold = 1.5;
    let err = expect_validation_error(config.validate());
    assert!(matches!(err, CommentaryError::Validation { .. }));

    let mut config = DriftConfig::default();
    config.max_bucket_size = 0;
    let err = expect_validation_error(config.validate());
    assert!(
        format!("{err}").contains("max_bucket_size"),
        "unexpected error message: {err}"
    );
}

#[test]
fn test_analysis_config_rejects_zero_limits() {
    let mut config = AnalysisConfig::default();
    config.max_concurrency = Some(0);
    expect_validation_error(config.validate());

    let mut config = AnalysisConfig::default();
    config.total_timeout_seconds = Some(0);
    expect_validation_error(config.validate());
}

#[test]
fn test_effective_concurrency_prefers_configured_value() {
    let mut config = AnalysisConfig::default();
    config.max_concurrency = Some(3);
    assert_eq!(config.effective_concurrency(), 3);

    config.max_concurrency = None;
    assert!(config.effective_concurrency() >= 1);
}

#[test]
fn test_yaml_round_trip_preserves_policy() {
    let mut config = CommentaryConfig::default();
    config.policy = Policy::aggressive();
    config.drift.max_bucket_size = 8;

    let yaml = serde_yaml::to_string(&config).expect("serialize");
    let parsed = CommentaryConfig::from_yaml_str(&yaml).expect("parse");
    assert_eq!(parsed, config);
}

#[test]
fn test_partial_yaml_uses_defaults() {
    let config = CommentaryConfig::from_yaml_str(
        r#"
policy:
  deleteFiller: true
drift:
  code_similarity_threshold: 0.9
"#,
    )
    .expect("parse");

    assert!(config.policy.delete_filler);
    assert!(config.policy.flag_misleading);
    assert_eq!(config.drift.code_similarity_threshold, 0.9);
    assert_eq!(config.drift.comment_similarity_threshold, 0.5);
    assert_eq!(config.classifier, ClassifierConfig::default());
}

#[test]
fn test_unknown_policy_key_fails_at_load() {
    let err = CommentaryConfig::from_yaml_str(
        r#"
policy:
  delete_filler: true
  rewrite_everything: true
"#,
    )
    .unwrap_err();
    assert!(matches!(err, CommentaryError::UnknownPolicyOption { .. }));
}

#[test]
fn test_empty_document_is_default_config() {
    let config = CommentaryConfig::from_yaml_str("").expect("parse");
    assert_eq!(config, CommentaryConfig::default());
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("commentary.yml");

    let mut config = CommentaryConfig::default();
    config.output.format = ReportFormat::Yaml;
    config.to_yaml_file(&path).expect("write");

    let loaded = CommentaryConfig::from_yaml_file(&path).expect("read");
    assert_eq!(loaded.output.format, ReportFormat::Yaml);
}
