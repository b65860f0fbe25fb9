//! Configuration types and management for commentary-rs.
//!
//! A single [`CommentaryConfig`] document drives a run. It is loaded once,
//! validated before any file is touched, and then passed explicitly to the
//! stages that need it.

pub mod policy;
pub mod validation;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::errors::{CommentaryError, Result};

pub use policy::{Policy, POLICY_OPTIONS};
pub use validation::{validate_optional_positive, validate_positive_usize, validate_unit_range};

/// Main configuration for the comment analysis engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CommentaryConfig {
    /// File discovery and scheduling
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Comment classifier tuning
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Drift detector tuning
    #[serde(default)]
    pub drift: DriftConfig,

    /// Rewrite policy
    #[serde(default)]
    pub policy: Policy,

    /// Report output settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl CommentaryConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            CommentaryError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        Self::from_yaml_str(&content)
    }

    /// Parse and validate configuration from YAML text.
    ///
    /// Unknown policy keys are reported as
    /// [`CommentaryError::UnknownPolicyOption`] rather than a generic
    /// deserialization failure.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        if let Some(policy) = value.get("policy") {
            Policy::check_keys(policy)?;
        }

        let config: Self = serde_yaml::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            CommentaryError::io(
                format!("Failed to write config file: {}", path.display()),
                e,
            )
        })
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        self.classifier.validate()?;
        self.drift.validate()?;
        self.policy.validate()?;
        Ok(())
    }
}

/// File discovery and scheduling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum number of files analyzed concurrently (None = available CPUs)
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// Abort queued files once the whole run exceeds this many seconds
    #[serde(default)]
    pub total_timeout_seconds: Option<u64>,

    /// Glob patterns excluded from discovery
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Directory names never descended into
    #[serde(default = "AnalysisConfig::default_ignored_dirs")]
    pub ignored_dirs: Vec<String>,

    /// Files larger than this are skipped during discovery (0 = unlimited)
    #[serde(default = "AnalysisConfig::default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_concurrency: None,
            total_timeout_seconds: None,
            exclude_patterns: vec!["**/*.min.js".to_string()],
            ignored_dirs: Self::default_ignored_dirs(),
            max_file_size_bytes: Self::default_max_file_size_bytes(),
        }
    }
}

impl AnalysisConfig {
    /// Default maximum file size: 500KB
    pub const fn default_max_file_size_bytes() -> u64 {
        500 * 1024
    }

    fn default_ignored_dirs() -> Vec<String> {
        [
            ".git",
            "node_modules",
            "__pycache__",
            ".venv",
            "venv",
            "dist",
            "build",
            ".next",
            "coverage",
            ".cache",
            "target",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    /// Concurrency limit resolved against the host.
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }

    /// Validate analysis configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(limit) = self.max_concurrency {
            validate_positive_usize(limit, "analysis.max_concurrency")?;
        }
        validate_optional_positive(self.total_timeout_seconds, "analysis.total_timeout_seconds")?;
        Ok(())
    }
}

/// Comment classifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Minimum comment/code token Jaccard for a comment to count as redundant
    #[serde(default = "ClassifierConfig::default_redundant_jaccard")]
    pub redundant_jaccard: f64,

    /// Novel technical terms a narrative comment may carry and still be filler
    #[serde(default = "ClassifierConfig::default_filler_max_novel_terms")]
    pub filler_max_novel_terms: usize,

    /// Project vocabulary that should never be reported as misspelled
    #[serde(default)]
    pub extra_words: Vec<String>,

    /// Additional narrative phrases (lower-case)
    #[serde(default)]
    pub extra_filler_phrases: Vec<String>,

    /// Additional stand-alone markers (lower-case)
    #[serde(default)]
    pub extra_placeholder_markers: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            redundant_jaccard: Self::default_redundant_jaccard(),
            filler_max_novel_terms: Self::default_filler_max_novel_terms(),
            extra_words: Vec::new(),
            extra_filler_phrases: Vec::new(),
            extra_placeholder_markers: Vec::new(),
        }
    }
}

impl ClassifierConfig {
    const fn default_redundant_jaccard() -> f64 {
        0.6
    }

    const fn default_filler_max_novel_terms() -> usize {
        2
    }

    /// Validate classifier configuration
    pub fn validate(&self) -> Result<()> {
        validate_unit_range(self.redundant_jaccard, "classifier.redundant_jaccard")?;
        Ok(())
    }
}

/// Drift detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftConfig {
    /// Run cross-file drift detection
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Minimum code similarity for two sites to be compared
    #[serde(default = "DriftConfig::default_code_similarity_threshold")]
    pub code_similarity_threshold: f64,

    /// Comment similarity below which a pair is reported
    #[serde(default = "DriftConfig::default_comment_similarity_threshold")]
    pub comment_similarity_threshold: f64,

    /// Candidates compared per bucket before truncating
    #[serde(default = "DriftConfig::default_max_bucket_size")]
    pub max_bucket_size: usize,
}

const fn default_enabled() -> bool {
    true
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            code_similarity_threshold: Self::default_code_similarity_threshold(),
            comment_similarity_threshold: Self::default_comment_similarity_threshold(),
            max_bucket_size: Self::default_max_bucket_size(),
        }
    }
}

impl DriftConfig {
    const fn default_code_similarity_threshold() -> f64 {
        0.85
    }

    const fn default_comment_similarity_threshold() -> f64 {
        0.5
    }

    const fn default_max_bucket_size() -> usize {
        64
    }

    /// Validate drift configuration
    pub fn validate(&self) -> Result<()> {
        validate_unit_range(
            self.code_similarity_threshold,
            "drift.code_similarity_threshold",
        )?;
        validate_unit_range(
            self.comment_similarity_threshold,
            "drift.comment_similarity_threshold",
        )?;
        validate_positive_usize(self.max_bucket_size, "drift.max_bucket_size")?;
        Ok(())
    }
}

/// Report output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Report format
    #[serde(default)]
    pub format: ReportFormat,

    /// Include `keep` actions in reports
    #[serde(default)]
    pub include_kept: bool,
}

/// Available report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// JSON format
    #[default]
    Json,
    /// YAML format
    Yaml,
    /// Human-readable text summary
    Text,
}

#[cfg(test)]
mod tests;
