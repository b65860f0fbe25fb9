//! Pipeline executor: per-file stage, drift barrier, planning.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use rayon::prelude::*;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::core::config::CommentaryConfig;
use crate::core::errors::{CommentaryError, Result};
use crate::core::model::{AnalysisWarning, ClassifiedComment};
use crate::detectors::classifier::CommentClassifier;
use crate::detectors::drift::DriftDetector;
use crate::lang::extractor::CommentExtractor;
use crate::rewrite::RewritePlanner;

use super::file_discovery::{discover_files, file_id_for};
use super::pipeline_results::{FileResult, PipelineResults, SourceFile};

/// A file queued for the per-file stage.
#[derive(Debug)]
enum PendingFile {
    Loaded(Arc<SourceFile>),
    Unreadable { file_id: String, error: String },
}

impl PendingFile {
    fn file_id(&self) -> &str {
        match self {
            PendingFile::Loaded(file) => &file.file_id,
            PendingFile::Unreadable { file_id, .. } => file_id,
        }
    }

    fn source(&self) -> Option<&Arc<SourceFile>> {
        match self {
            PendingFile::Loaded(file) => Some(file),
            PendingFile::Unreadable { .. } => None,
        }
    }
}

/// Orchestrates a full analysis run.
///
/// Files are extracted and classified concurrently, drift detection runs
/// once every file has finished, and planning runs per file afterwards.
pub struct CommentPipeline {
    config: CommentaryConfig,
    extractor: CommentExtractor,
    classifier: Arc<CommentClassifier>,
    drift: DriftDetector,
    planner: RewritePlanner,
}

impl CommentPipeline {
    /// Build a pipeline, rejecting invalid configuration before any file is read.
    pub fn new(config: CommentaryConfig) -> Result<Self> {
        config.validate()?;
        let classifier = CommentClassifier::new(config.classifier.clone())?;
        let drift = DriftDetector::new(config.drift.clone(), classifier.dictionary().clone());
        let planner = RewritePlanner::new(config.policy.clone());

        Ok(Self {
            extractor: CommentExtractor::new(),
            classifier: Arc::new(classifier),
            drift,
            planner,
            config,
        })
    }

    pub fn config(&self) -> &CommentaryConfig {
        &self.config
    }

    pub fn planner(&self) -> &RewritePlanner {
        &self.planner
    }

    /// Analyze in-memory sources. Results follow the order of `files`.
    pub async fn run(&self, files: Vec<SourceFile>) -> Result<PipelineResults> {
        let pending = files
            .into_iter()
            .map(|file| PendingFile::Loaded(Arc::new(file)))
            .collect();
        let timeout = self.total_timeout();
        self.execute(pending, timeout).await
    }

    /// Discover and read files under `roots`, then analyze them.
    ///
    /// Returns the loaded sources alongside the results so callers can apply
    /// the plans. Files that cannot be read become failure entries.
    pub async fn run_paths(&self, roots: &[PathBuf]) -> Result<(Vec<SourceFile>, PipelineResults)> {
        let paths = discover_files(roots, &self.config.analysis)?;
        let mut pending = Vec::with_capacity(paths.len());
        for path in &paths {
            let file_id = file_id_for(path, roots);
            let loaded = match fs::read_to_string(path).await {
                Ok(text) => SourceFile::from_path_text(file_id.clone(), text)
                    .map(|file| file.with_path(path.clone())),
                Err(err) => Err(CommentaryError::io(
                    format!("Failed to read {}", path.display()),
                    err,
                )),
            };
            pending.push(match loaded {
                Ok(file) => PendingFile::Loaded(Arc::new(file)),
                Err(err) => {
                    warn!("Skipping {}: {}", file_id, err);
                    PendingFile::Unreadable {
                        file_id,
                        error: err.to_string(),
                    }
                }
            });
        }

        let sources = pending
            .iter()
            .filter_map(|file| file.source().map(|source| source.as_ref().clone()))
            .collect();
        let results = self.execute(pending, self.total_timeout()).await?;
        Ok((sources, results))
    }

    fn total_timeout(&self) -> Option<Duration> {
        self.config
            .analysis
            .total_timeout_seconds
            .map(Duration::from_secs)
    }

    async fn execute(
        &self,
        pending: Vec<PendingFile>,
        timeout: Option<Duration>,
    ) -> Result<PipelineResults> {
        let started = Instant::now();
        let total = pending.len();
        let concurrency = self.config.analysis.effective_concurrency();
        info!(
            "Starting comment analysis of {} files (concurrency {})",
            total, concurrency
        );

        let file_ids: Vec<String> = pending.iter().map(|f| f.file_id().to_string()).collect();
        let sources: Vec<Option<Arc<SourceFile>>> =
            pending.iter().map(|f| f.source().cloned()).collect();

        let mut stage = stream::iter(pending.into_iter().enumerate().map(|(index, file)| {
            let classifier = Arc::clone(&self.classifier);
            let extractor = self.extractor;
            async move {
                let result = match file {
                    PendingFile::Loaded(source) => {
                        let file_id = source.file_id.clone();
                        tokio::task::spawn_blocking(move || {
                            analyze_file(&extractor, &classifier, &source)
                        })
                        .await
                        .unwrap_or_else(|err| {
                            Ok(FileResult::failed(
                                file_id,
                                format!("analysis task failed: {}", err),
                            ))
                        })
                    }
                    PendingFile::Unreadable { file_id, error } => {
                        Ok(FileResult::failed(file_id, error))
                    }
                };
                (index, result)
            }
        }))
        .buffer_unordered(concurrency);

        let mut completed: Vec<(usize, FileResult)> = Vec::with_capacity(total);
        let collect = async {
            while let Some((index, result)) = stage.next().await {
                completed.push((index, result?));
            }
            Ok::<(), CommentaryError>(())
        };
        let partial = match timeout {
            Some(limit) => match tokio::time::timeout(limit, collect).await {
                Ok(outcome) => {
                    outcome?;
                    false
                }
                Err(_) => true,
            },
            None => {
                collect.await?;
                false
            }
        };
        drop(stage);
        let finished = completed.len();

        let mut slots: Vec<Option<FileResult>> = (0..total).map(|_| None).collect();
        for (index, result) in completed {
            slots[index] = Some(result);
        }
        let mut files: Vec<FileResult> = slots
            .into_iter()
            .zip(&file_ids)
            .map(|(slot, file_id)| {
                slot.unwrap_or_else(|| {
                    FileResult::failed(file_id.clone(), "abandoned: total timeout elapsed")
                })
            })
            .collect();
        if partial {
            warn!(
                "Total timeout elapsed; {} of {} files abandoned",
                total - finished,
                total
            );
        }

        // Barrier: every per-file stage has finished or been abandoned.
        let snapshot: Vec<ClassifiedComment> = files
            .iter()
            .filter(|f| !f.is_failure())
            .flat_map(|f| f.comments.iter().cloned())
            .collect();
        let drift = self.drift.find_drift(&snapshot);
        info!(
            "Drift detection found {} findings across {} comments",
            drift.findings.len(),
            snapshot.len()
        );

        files
            .par_iter_mut()
            .zip(sources.par_iter())
            .try_for_each(|(result, source)| -> Result<()> {
                let Some(source) = source else {
                    return Ok(());
                };
                if result.is_failure() {
                    return Ok(());
                }
                match self.planner.plan(
                    &result.file_id,
                    &source.text,
                    &result.comments,
                    &drift.findings,
                ) {
                    Ok(plan) => result.plan = Some(plan),
                    Err(err) if err.is_file_scoped() => {
                        warn!("Planning failed for {}: {}", result.file_id, err);
                        result.error = Some(err.to_string());
                    }
                    Err(err) => return Err(err),
                }
                Ok(())
            })?;

        let results = PipelineResults {
            files,
            drift,
            partial,
        };
        info!(
            "Comment analysis completed in {:.2}s: {} comments, {} failed files",
            started.elapsed().as_secs_f64(),
            results.comment_count(),
            results.failure_count()
        );
        Ok(results)
    }
}

/// Extract and classify the comments of one file.
///
/// Empty comments are skipped with a warning; other file-scoped errors fail
/// the file and anything else aborts the run.
fn analyze_file(
    extractor: &CommentExtractor,
    classifier: &CommentClassifier,
    source: &SourceFile,
) -> Result<FileResult> {
    let spans = match extractor.extract(&source.file_id, &source.text, &source.language) {
        Ok(spans) => spans,
        Err(err) => return isolate(&source.file_id, err),
    };

    let mut result = FileResult {
        file_id: source.file_id.clone(),
        ..FileResult::default()
    };
    for span in spans {
        match classifier.classify(&span) {
            Ok(classification) => result.comments.push(ClassifiedComment {
                span,
                classification,
            }),
            Err(CommentaryError::EmptyComment { .. }) => {
                result.warnings.push(AnalysisWarning::EmptyComment {
                    file_id: span.file_id.clone(),
                    start: span.start,
                    line: span.line,
                });
            }
            Err(err) => return isolate(&source.file_id, err),
        }
    }

    debug!(
        "Classified {} comments in {}",
        result.comments.len(),
        source.file_id
    );
    Ok(result)
}

/// Turn a file-scoped error into a failed file; other errors propagate.
fn isolate(file_id: &str, err: CommentaryError) -> Result<FileResult> {
    if !err.is_file_scoped() {
        return Err(err);
    }
    debug!("Analysis failed for {}: {}", file_id, err);
    Ok(FileResult::failed(file_id, err.to_string()))
}

#[cfg(test)]
#[path = "pipeline_executor_tests.rs"]
mod tests;
