use super::*;
use crate::core::config::Policy;
use crate::core::model::{Action, Category, DriftKind};
use tempfile::TempDir;

fn pipeline(policy: Policy) -> CommentPipeline {
    let mut config = CommentaryConfig::default();
    config.policy = policy;
    CommentPipeline::new(config).unwrap()
}

fn verify_sources() -> Vec<SourceFile> {
    vec![
        SourceFile::new(
            "a.js",
            "// validates the token signature before use\nconst ok = verify(token, key);\n",
            "js",
        ),
        SourceFile::new("b.js", "// XXX\nconst ok = verify(token, key);\n", "js"),
    ]
}

#[tokio::test]
async fn test_results_follow_input_order() {
    let files = vec![
        SourceFile::new("z.js", "// XXX\nrun();\n", "js"),
        SourceFile::new("a.py", "# XXX\nrun()\n", "py"),
        SourceFile::new("m.go", "// XXX\nrun()\n", "go"),
    ];
    let results = pipeline(Policy::default()).run(files).await.unwrap();

    let ids: Vec<&str> = results.files.iter().map(|f| f.file_id.as_str()).collect();
    assert_eq!(ids, vec!["z.js", "a.py", "m.go"]);
    assert!(!results.partial);
    for file in &results.files {
        assert_eq!(file.comments.len(), 1);
        assert_eq!(
            file.comments[0].classification.category,
            Category::Placeholder
        );
        assert!(file.plan.is_some());
    }
}

#[tokio::test]
async fn test_unsupported_file_fails_alone() {
    let files = vec![
        SourceFile::new("notes.txt", "just text", "txt"),
        SourceFile::new("ok.js", "// XXX\nrun();\n", "js"),
    ];
    let results = pipeline(Policy::default()).run(files).await.unwrap();

    assert_eq!(results.failure_count(), 1);
    assert!(results.files[0].is_failure());
    assert!(results.files[0].plan.is_none());
    assert!(!results.files[1].is_failure());
}

#[tokio::test]
async fn test_empty_comment_becomes_warning() {
    let files = vec![SourceFile::new("e.js", "//\nrun(); // XXX\n", "js")];
    let results = pipeline(Policy::default()).run(files).await.unwrap();

    let file = &results.files[0];
    assert!(!file.is_failure());
    assert_eq!(file.comments.len(), 1);
    assert_eq!(
        file.warnings,
        vec![AnalysisWarning::EmptyComment {
            file_id: "e.js".to_string(),
            start: 0,
            line: 1,
        }]
    );
}

#[tokio::test]
async fn test_drift_across_files_is_flagged() {
    let results = pipeline(Policy::aggressive())
        .run(verify_sources())
        .await
        .unwrap();

    assert_eq!(results.drift.findings.len(), 1);
    let finding = &results.drift.findings[0];
    assert_eq!(finding.kind, DriftKind::Stale);
    assert_eq!(finding.span_a.file_id, "a.js");
    assert_eq!(finding.span_b.file_id, "b.js");

    let plan_b = results.file("b.js").and_then(|f| f.plan.as_ref()).unwrap();
    assert_eq!(plan_b.actions.len(), 1);
    assert_eq!(plan_b.actions[0].action, Action::Flag);
    assert_eq!(plan_b.actions[0].reason, "drift");
}

#[tokio::test]
async fn test_runs_are_idempotent() {
    let pipeline = pipeline(Policy::aggressive());
    let first = pipeline.run(verify_sources()).await.unwrap();
    let second = pipeline.run(verify_sources()).await.unwrap();

    let plans = |results: &PipelineResults| {
        results
            .files
            .iter()
            .map(|f| serde_json::to_string(&f.plan).unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(plans(&first), plans(&second));
    assert_eq!(first.drift, second.drift);
}

#[tokio::test]
async fn test_zero_timeout_abandons_files() {
    let mut config = CommentaryConfig::default();
    config.analysis.max_concurrency = Some(1);
    let pipeline = CommentPipeline::new(config).unwrap();
    let pending = (0..200)
        .map(|i| {
            PendingFile::Loaded(Arc::new(SourceFile::new(
                format!("f{}.js", i),
                "// XXX\nrun();\n".repeat(200),
                "js",
            )))
        })
        .collect();

    let results = pipeline
        .execute(pending, Some(Duration::ZERO))
        .await
        .unwrap();

    assert!(results.partial);
    assert_eq!(results.files.len(), 200);
    assert!(results
        .files
        .iter()
        .filter(|f| f.is_failure())
        .all(|f| f.error.as_deref() == Some("abandoned: total timeout elapsed")));
    assert!(results.failure_count() > 0);
}

#[tokio::test]
async fn test_run_paths_reads_discovered_files() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("src")).unwrap();
    std::fs::write(temp.path().join("src/app.js"), "// XXX\nrun();\n").unwrap();
    std::fs::write(temp.path().join("src/util.py"), "# XXX\nrun()\n").unwrap();

    let pipeline = pipeline(Policy::aggressive());
    let (sources, results) = pipeline
        .run_paths(&[temp.path().to_path_buf()])
        .await
        .unwrap();

    let ids: Vec<&str> = sources.iter().map(|s| s.file_id.as_str()).collect();
    assert_eq!(ids, vec!["src/app.js", "src/util.py"]);
    assert_eq!(sources[1].language, "py");
    assert_eq!(results.files.len(), 2);
    assert_eq!(results.comment_count(), 2);
}

#[test]
fn test_invalid_config_is_rejected_up_front() {
    let mut config = CommentaryConfig::default();
    config.policy.preserve_informative = false;
    assert!(matches!(
        CommentPipeline::new(config),
        Err(CommentaryError::Config { .. })
    ));
}

#[test]
fn test_only_file_scoped_errors_fail_a_single_file() {
    let failed = isolate("a.js", CommentaryError::invalid_span("a.js", 4, 2)).unwrap();
    assert!(failed.is_failure());
    assert_eq!(failed.file_id, "a.js");
    assert_eq!(failed.error.as_deref(), Some("Invalid span in a.js: 4..2"));

    let err = isolate("a.js", CommentaryError::config("drift threshold out of range")).unwrap_err();
    assert!(matches!(err, CommentaryError::Config { .. }));
}
