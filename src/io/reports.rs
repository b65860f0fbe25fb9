//! Structured analysis report and its JSON, YAML and text renderings.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::config::ReportFormat;
use crate::core::errors::{CommentaryError, Result};
use crate::core::model::{Action, AnalysisWarning, DriftFinding, PatchAction};
use crate::core::pipeline::PipelineResults;

/// Report for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub file_id: String,
    /// Planned actions, ascending by offset
    pub actions: Vec<PatchAction>,
    /// Drift findings with at least one side in this file
    pub drift_findings: Vec<DriftFinding>,
    /// A drift bucket holding comments of this file was truncated
    pub truncated: bool,
    pub warnings: Vec<AnalysisWarning>,
    /// Why the file could not be analyzed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run-level counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub files_analyzed: usize,
    pub files_failed: usize,
    pub comments: usize,
    /// Comment count per category, in category order
    pub categories: IndexMap<String, usize>,
    /// Action count per kind
    pub actions: IndexMap<String, usize>,
    pub drift_findings: usize,
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,
    pub files: Vec<FileReport>,
    pub drift_findings: Vec<DriftFinding>,
    /// Run-level warnings such as drift truncation
    pub warnings: Vec<AnalysisWarning>,
    /// The run timed out and some files were abandoned
    pub partial: bool,
}

impl AnalysisReport {
    /// Build a report from pipeline results.
    ///
    /// `include_kept` controls whether `Keep` actions are listed.
    pub fn from_results(results: &PipelineResults, include_kept: bool) -> Self {
        let files: Vec<FileReport> = results
            .files
            .iter()
            .map(|file| FileReport {
                file_id: file.file_id.clone(),
                actions: file
                    .plan
                    .iter()
                    .flat_map(|plan| plan.actions.iter())
                    .filter(|action| include_kept || action.action != Action::Keep)
                    .cloned()
                    .collect(),
                drift_findings: results
                    .drift
                    .findings
                    .iter()
                    .filter(|finding| finding.touches_file(&file.file_id))
                    .cloned()
                    .collect(),
                truncated: results
                    .drift
                    .warnings
                    .iter()
                    .any(|warning| warning.concerns_file(&file.file_id)),
                warnings: file.warnings.clone(),
                error: file.error.clone(),
            })
            .collect();

        Self {
            run_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            summary: summarize(results),
            files,
            drift_findings: results.drift.findings.clone(),
            warnings: results.drift.warnings.clone(),
            partial: results.partial,
        }
    }

    /// Render in the requested format.
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            ReportFormat::Yaml => Ok(serde_yaml::to_string(self)?),
            ReportFormat::Text => Ok(self.render_text()),
        }
    }

    /// Render and write to `path`.
    pub fn write_to(&self, path: &Path, format: ReportFormat) -> Result<()> {
        let rendered = self.render(format)?;
        fs::write(path, rendered).map_err(|err| {
            CommentaryError::io(format!("Failed to write report to {}", path.display()), err)
        })
    }

    /// Plain-text summary, one line per action.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} files, {} comments, {} drift findings{}",
            self.summary.files_analyzed,
            self.summary.comments,
            self.summary.drift_findings,
            if self.partial { " (partial)" } else { "" }
        );

        for file in &self.files {
            if let Some(error) = &file.error {
                let _ = writeln!(out, "{}: error: {}", file.file_id, error);
                continue;
            }
            for action in &file.actions {
                let category = action
                    .category
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "mixed".to_string());
                let _ = writeln!(
                    out,
                    "{}:{}: {} {} ({})",
                    file.file_id, action.line, action.action, category, action.reason
                );
            }
            for warning in &file.warnings {
                let _ = writeln!(out, "{}: warning: {}", file.file_id, warning);
            }
        }

        for finding in &self.drift_findings {
            let _ = writeln!(
                out,
                "drift {:?}: {} <> {} (code {:.2}, comment {:.2})",
                finding.kind,
                finding.span_a,
                finding.span_b,
                finding.code_similarity,
                finding.comment_similarity
            );
        }
        for warning in &self.warnings {
            let _ = writeln!(out, "warning: {}", warning);
        }
        out
    }
}

fn summarize(results: &PipelineResults) -> ReportSummary {
    let mut summary = ReportSummary {
        files_analyzed: results.files.len(),
        files_failed: results.failure_count(),
        comments: results.comment_count(),
        drift_findings: results.drift.findings.len(),
        ..ReportSummary::default()
    };

    let mut categories: Vec<_> = results
        .files
        .iter()
        .flat_map(|file| file.comments.iter())
        .map(|comment| comment.classification.category)
        .collect();
    categories.sort();
    for category in categories {
        *summary.categories.entry(category.to_string()).or_insert(0) += 1;
    }

    for action in results
        .files
        .iter()
        .filter_map(|file| file.plan.as_ref())
        .flat_map(|plan| plan.actions.iter())
    {
        *summary.actions.entry(action.action.to_string()).or_insert(0) += 1;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{
        Category, Classification, ClassifiedComment, CommentKind, CommentSpan, DriftKind,
        RewritePlan, SpanRef,
    };
    use crate::core::pipeline::FileResult;
    use crate::detectors::drift::DriftReport;

    fn span_ref(file_id: &str, start: usize, end: usize) -> SpanRef {
        SpanRef {
            file_id: file_id.to_string(),
            start,
            end,
        }
    }

    fn action(file_id: &str, kind: Action, category: Category) -> PatchAction {
        PatchAction {
            span: span_ref(file_id, 0, 6),
            action: kind,
            replacement_text: None,
            category: Some(category),
            reason: "test".to_string(),
            line: 1,
        }
    }

    fn comment(file_id: &str, category: Category) -> ClassifiedComment {
        ClassifiedComment {
            span: CommentSpan {
                file_id: file_id.to_string(),
                start: 0,
                end: 6,
                line: 1,
                kind: CommentKind::Line,
                raw_text: "// XXX".to_string(),
                adjacent_code: "run();".to_string(),
                anchor_offset: 7,
                context_code: String::new(),
                context_offset: 0,
            },
            classification: Classification {
                category,
                confidence: 0.9,
                evidence: vec![],
                typos: vec![],
            },
        }
    }

    fn results() -> PipelineResults {
        PipelineResults {
            files: vec![
                FileResult {
                    file_id: "a.js".to_string(),
                    comments: vec![comment("a.js", Category::Placeholder)],
                    plan: Some(RewritePlan {
                        file_id: "a.js".to_string(),
                        actions: vec![action("a.js", Action::Delete, Category::Placeholder)],
                    }),
                    ..FileResult::default()
                },
                FileResult {
                    file_id: "b.js".to_string(),
                    comments: vec![comment("b.js", Category::Informative)],
                    plan: Some(RewritePlan {
                        file_id: "b.js".to_string(),
                        actions: vec![action("b.js", Action::Keep, Category::Informative)],
                    }),
                    ..FileResult::default()
                },
                FileResult {
                    file_id: "c.txt".to_string(),
                    error: Some("unsupported".to_string()),
                    ..FileResult::default()
                },
            ],
            drift: DriftReport {
                findings: vec![DriftFinding {
                    span_a: span_ref("a.js", 0, 6),
                    span_b: span_ref("b.js", 0, 6),
                    code_similarity: 1.0,
                    comment_similarity: 0.0,
                    kind: DriftKind::Stale,
                }],
                warnings: vec![AnalysisWarning::DriftDetectionTruncated {
                    bucket: "00ff".to_string(),
                    size: 80,
                    compared: 64,
                    files: vec!["b.js".to_string()],
                }],
            },
            partial: false,
        }
    }

    #[test]
    fn test_report_from_results() {
        let report = AnalysisReport::from_results(&results(), false);

        assert_eq!(report.files.len(), 3);
        assert_eq!(report.files[0].actions.len(), 1);
        assert!(report.files[1].actions.is_empty());
        assert_eq!(report.files[0].drift_findings.len(), 1);
        assert_eq!(report.files[1].drift_findings.len(), 1);
        assert!(!report.files[0].truncated);
        assert!(report.files[1].truncated);
        assert_eq!(report.files[2].error.as_deref(), Some("unsupported"));

        assert_eq!(report.summary.files_failed, 1);
        assert_eq!(report.summary.comments, 2);
        assert_eq!(report.summary.categories["placeholder"], 1);
        assert_eq!(report.summary.actions["keep"], 1);
        assert_eq!(report.summary.actions["delete"], 1);
    }

    #[test]
    fn test_include_kept() {
        let report = AnalysisReport::from_results(&results(), true);
        assert_eq!(report.files[1].actions.len(), 1);
    }

    #[test]
    fn test_renderings() {
        let report = AnalysisReport::from_results(&results(), false);

        let json = report.render(ReportFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["files"][0]["actions"][0]["action"], "delete");
        assert_eq!(parsed["drift_findings"][0]["kind"], "stale");
        assert_eq!(parsed["warnings"][0]["kind"], "drift_detection_truncated");

        let yaml = report.render(ReportFormat::Yaml).unwrap();
        let back: AnalysisReport = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.files, report.files);

        let text = report.render(ReportFormat::Text).unwrap();
        assert!(text.contains("a.js:1: delete placeholder (test)"));
        assert!(text.contains("c.txt: error: unsupported"));
        assert!(text.contains("drift Stale"));
    }

    #[test]
    fn test_write_to_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("report.json");
        let report = AnalysisReport::from_results(&results(), false);
        report.write_to(&path, ReportFormat::Json).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("\"run_id\""));
    }
}
