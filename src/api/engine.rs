//! Main analysis engine.

use std::path::PathBuf;

use tokio::fs;
use tracing::info;

use crate::core::config::CommentaryConfig;
use crate::core::errors::{CommentaryError, Result};
use crate::core::pipeline::{CommentPipeline, PipelineResults, SourceFile};
use crate::io::reports::AnalysisReport;
use crate::rewrite::apply;

/// Rewritten text for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenFile {
    pub file_id: String,
    /// On-disk location, when the source was read from a file
    pub path: Option<PathBuf>,
    pub text: String,
    /// Whether the text differs from the input
    pub changed: bool,
}

/// A completed analysis together with the sources it ran on.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub sources: Vec<SourceFile>,
    pub results: PipelineResults,
}

impl AnalysisOutcome {
    /// Structured report of the run.
    pub fn report(&self, include_kept: bool) -> AnalysisReport {
        AnalysisReport::from_results(&self.results, include_kept)
    }

    /// Apply every successful plan, in input order.
    ///
    /// Failed files are skipped; an applier error aborts.
    pub fn rewrite(&self) -> Result<Vec<RewrittenFile>> {
        let mut rewritten = Vec::new();
        for file in &self.results.files {
            let Some(plan) = &file.plan else { continue };
            let source = self
                .sources
                .iter()
                .find(|source| source.file_id == file.file_id)
                .ok_or_else(|| {
                    CommentaryError::internal(format!("no source text for {}", file.file_id))
                })?;
            let text = apply(&source.text, plan)?;
            rewritten.push(RewrittenFile {
                file_id: file.file_id.clone(),
                path: source.path.clone(),
                changed: text != source.text,
                text,
            });
        }
        Ok(rewritten)
    }
}

/// Main commentary engine
pub struct CommentaryEngine {
    pipeline: CommentPipeline,
}

impl CommentaryEngine {
    /// Create an engine. Configuration errors surface here, before any file is read.
    pub fn new(config: CommentaryConfig) -> Result<Self> {
        info!("Initializing commentary engine");
        Ok(Self {
            pipeline: CommentPipeline::new(config)?,
        })
    }

    pub fn config(&self) -> &CommentaryConfig {
        self.pipeline.config()
    }

    /// Analyze in-memory sources.
    pub async fn analyze_sources(&self, sources: Vec<SourceFile>) -> Result<AnalysisOutcome> {
        let results = self.pipeline.run(sources.clone()).await?;
        Ok(AnalysisOutcome { sources, results })
    }

    /// Discover and analyze files under the given paths.
    pub async fn analyze_paths(&self, paths: &[PathBuf]) -> Result<AnalysisOutcome> {
        info!("Starting analysis of {} paths", paths.len());
        let (sources, results) = self.pipeline.run_paths(paths).await?;
        Ok(AnalysisOutcome { sources, results })
    }

    /// Write the rewritten files of `outcome` back to disk.
    ///
    /// Only sources read from disk are written. Returns the number of files
    /// actually changed.
    pub async fn write_rewrites(&self, outcome: &AnalysisOutcome) -> Result<usize> {
        let mut written = 0;
        for file in outcome.rewrite()? {
            if !file.changed {
                continue;
            }
            let Some(path) = &file.path else { continue };
            fs::write(path, &file.text).await.map_err(|err| {
                CommentaryError::io(format!("Failed to write {}", path.display()), err)
            })?;
            info!("Rewrote {}", path.display());
            written += 1;
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Policy;
    use tempfile::TempDir;

    fn engine(policy: Policy) -> CommentaryEngine {
        let mut config = CommentaryConfig::default();
        config.policy = policy;
        CommentaryEngine::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_and_rewrite_sources() {
        let engine = engine(Policy::aggressive());
        let outcome = engine
            .analyze_sources(vec![SourceFile::new(
                "a.js",
                concat!(
                    "// XXX\nrun();\n",
                    "// retries twice because the upstream proxy drops the first request\n",
                    "fetch(url);\n",
                ),
                "js",
            )])
            .await
            .unwrap();

        let rewritten = outcome.rewrite().unwrap();
        assert_eq!(rewritten.len(), 1);
        assert!(rewritten[0].changed);
        assert!(!rewritten[0].text.contains("XXX"));
        assert!(rewritten[0].text.contains("upstream proxy"));
        assert!(rewritten[0].text.starts_with("run();\n"));
    }

    #[tokio::test]
    async fn test_write_rewrites_to_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.js");
        std::fs::write(&path, "run(); // XXX\n").unwrap();

        let engine = engine(Policy::aggressive());
        let outcome = engine
            .analyze_paths(&[temp.path().to_path_buf()])
            .await
            .unwrap();
        let written = engine.write_rewrites(&outcome).await.unwrap();

        assert_eq!(written, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "run();\n");
    }

    #[tokio::test]
    async fn test_default_policy_changes_nothing() {
        let engine = engine(Policy::default());
        let outcome = engine
            .analyze_sources(vec![SourceFile::new("a.py", "# XXX\nrun()\n", "py")])
            .await
            .unwrap();
        let rewritten = outcome.rewrite().unwrap();
        assert!(!rewritten[0].changed);
    }
}
