//! Inputs and outputs of a pipeline run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{CommentaryError, Result};
use crate::core::model::{AnalysisWarning, ClassifiedComment, RewritePlan};
use crate::detectors::drift::DriftReport;
use crate::lang::registry::language_key_for_path;

/// A source file handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Logical identifier, usually the relative path
    pub file_id: String,
    /// Full file contents
    pub text: String,
    /// Registry key of the language (`js`, `py`, `rs`, ...)
    pub language: String,
    /// Where the text was read from, for files found on disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl SourceFile {
    pub fn new(
        file_id: impl Into<String>,
        text: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            text: text.into(),
            language: language.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Build a source file whose language is inferred from the extension of `file_id`.
    pub fn from_path_text(file_id: impl Into<String>, text: impl Into<String>) -> Result<Self> {
        let file_id = file_id.into();
        let language = language_key_for_path(Path::new(&file_id)).ok_or_else(|| {
            CommentaryError::unsupported(format!("no language registered for '{}'", file_id))
        })?;
        Ok(Self::new(file_id, text, language))
    }
}

/// Outcome of the per-file stage and planning for one file.
#[derive(Debug, Clone, Default)]
pub struct FileResult {
    pub file_id: String,
    /// Classified comments in source order
    pub comments: Vec<ClassifiedComment>,
    /// Plan, absent when the file failed
    pub plan: Option<RewritePlan>,
    /// Non-fatal conditions found in this file
    pub warnings: Vec<AnalysisWarning>,
    /// Failure message when the file could not be analyzed
    pub error: Option<String>,
}

impl FileResult {
    pub(crate) fn failed(file_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Everything a run produced, files in input order.
#[derive(Debug, Clone, Default)]
pub struct PipelineResults {
    pub files: Vec<FileResult>,
    /// Cross-file drift findings and truncation warnings
    pub drift: DriftReport,
    /// Set when the run timed out before every file was processed
    pub partial: bool,
}

impl PipelineResults {
    /// Number of comments classified across all files.
    pub fn comment_count(&self) -> usize {
        self.files.iter().map(|f| f.comments.len()).sum()
    }

    pub fn failure_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_failure()).count()
    }

    pub fn file(&self, file_id: &str) -> Option<&FileResult> {
        self.files.iter().find(|f| f.file_id == file_id)
    }
}
