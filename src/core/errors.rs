//! Error types for the commentary-rs library.
//!
//! Errors are grouped by the stage that raises them. Per-file errors
//! (invalid spans, overlapping plan actions, parse failures) are isolated to
//! the file they belong to by the pipeline; configuration errors abort a run
//! before any file is processed.

use std::io;

use thiserror::Error;

/// Main result type for commentary operations.
pub type Result<T> = std::result::Result<T, CommentaryError>;

/// Error type for all commentary operations.
#[derive(Error, Debug)]
pub enum CommentaryError {
    /// A comment had no text once delimiters and whitespace were removed
    #[error("Empty comment in {file_id} at offset {start}")]
    EmptyComment {
        /// File the comment belongs to
        file_id: String,
        /// Start offset of the comment
        start: usize,
    },

    /// Malformed extraction input (start >= end, or out of bounds)
    #[error("Invalid span in {file_id}: {start}..{end}")]
    InvalidSpan {
        /// File the span belongs to
        file_id: String,
        /// Start byte offset
        start: usize,
        /// End byte offset
        end: usize,
    },

    /// Two planned actions cover overlapping byte ranges
    #[error("Overlapping rewrite actions in {file_id}: {first_start}..{first_end} and {second_start}..{second_end}")]
    OverlappingAction {
        /// File whose plan is invalid
        file_id: String,
        /// Range of the earlier action
        first_start: usize,
        /// End of the earlier action
        first_end: usize,
        /// Start of the later action
        second_start: usize,
        /// End of the later action
        second_end: usize,
    },

    /// Policy configuration contained a key the planner does not know
    #[error("Unknown policy option '{option}' (expected one of: {expected})")]
    UnknownPolicyOption {
        /// The unrecognized key
        option: String,
        /// Comma separated list of accepted keys
        expected: String,
    },

    /// Applying a rewrite plan to source text failed
    #[error("Failed to apply plan to {file_id}: {message}")]
    Apply {
        /// File being rewritten
        file_id: String,
        /// Error description
        message: String,
    },

    /// I/O related errors
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// Parsing and comment extraction errors
    #[error("Parse error in {language}: {message}")]
    Parse {
        /// Language being parsed
        language: String,
        /// Error description
        message: String,
        /// File where the error occurred
        file_id: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data format being handled
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for input data
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field or input that failed validation
        field: Option<String>,
    },

    /// Git repository access errors
    #[error("Git error: {message}")]
    Git {
        /// Error description
        message: String,
        /// Underlying git2 error
        #[source]
        source: Option<git2::Error>,
    },

    /// Unsupported language or operation
    #[error("Unsupported: {message}")]
    Unsupported {
        /// Error description
        message: String,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error description
        message: String,
    },
}

impl CommentaryError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new parse error
    pub fn parse(language: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            language: language.into(),
            message: message.into(),
            file_id: None,
        }
    }

    /// Create a new parse error attributed to a file
    pub fn parse_in_file(
        language: impl Into<String>,
        message: impl Into<String>,
        file_id: impl Into<String>,
    ) -> Self {
        Self::Parse {
            language: language.into(),
            message: message.into(),
            file_id: Some(file_id.into()),
        }
    }

    /// Create an empty comment error
    pub fn empty_comment(file_id: impl Into<String>, start: usize) -> Self {
        Self::EmptyComment {
            file_id: file_id.into(),
            start,
        }
    }

    /// Create an invalid span error
    pub fn invalid_span(file_id: impl Into<String>, start: usize, end: usize) -> Self {
        Self::InvalidSpan {
            file_id: file_id.into(),
            start,
            end,
        }
    }

    /// Create an apply error
    pub fn apply(file_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Apply {
            file_id: file_id.into(),
            message: message.into(),
        }
    }

    /// Create a new validation error with field context
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new unsupported error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the error only invalidates the file it was raised for.
    ///
    /// Configuration and internal errors abort the whole run instead.
    pub fn is_file_scoped(&self) -> bool {
        matches!(
            self,
            Self::EmptyComment { .. }
                | Self::InvalidSpan { .. }
                | Self::OverlappingAction { .. }
                | Self::Apply { .. }
                | Self::Parse { .. }
                | Self::Unsupported { .. }
                | Self::Io { .. }
        )
    }
}

impl From<io::Error> for CommentaryError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for CommentaryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for CommentaryError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<git2::Error> for CommentaryError {
    fn from(err: git2::Error) -> Self {
        Self::Git {
            message: err.message().to_string(),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CommentaryError::config("Invalid configuration");
        assert!(matches!(err, CommentaryError::Config { .. }));

        let err = CommentaryError::parse("python", "Syntax error");
        assert!(matches!(err, CommentaryError::Parse { .. }));
    }

    #[test]
    fn test_invalid_span_display() {
        let err = CommentaryError::invalid_span("src/auth.js", 40, 12);
        assert_eq!(err.to_string(), "Invalid span in src/auth.js: 40..12");
        assert!(err.is_file_scoped());
    }

    #[test]
    fn test_unknown_policy_option_display() {
        let err = CommentaryError::UnknownPolicyOption {
            option: "delete_everything".to_string(),
            expected: "delete_filler, flag_drift".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("delete_everything"));
        assert!(display.contains("flag_drift"));
        assert!(!err.is_file_scoped());
    }

    #[test]
    fn test_overlapping_action_is_file_scoped() {
        let err = CommentaryError::OverlappingAction {
            file_id: "a.js".to_string(),
            first_start: 0,
            first_end: 10,
            second_start: 5,
            second_end: 12,
        };
        assert!(err.is_file_scoped());
        assert!(err.to_string().contains("0..10"));
    }

    #[test]
    fn test_config_field_error() {
        let err = CommentaryError::config_field("Invalid value", "drift.max_bucket_size");

        if let CommentaryError::Config { message, field } = err {
            assert_eq!(message, "Invalid value");
            assert_eq!(field, Some("drift.max_bucket_size".to_string()));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_run_level_errors_are_not_file_scoped() {
        assert!(!CommentaryError::config("bad threshold").is_file_scoped());
        assert!(!CommentaryError::internal("no source text").is_file_scoped());
        assert!(CommentaryError::unsupported("cobol").is_file_scoped());
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(CommentaryError::io("Failed to read a.js", io_err).is_file_scoped());
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<i32>("invalid: yaml: content").unwrap_err();
        let err: CommentaryError = yaml_err.into();

        if let CommentaryError::Serialization { data_type, .. } = err {
            assert_eq!(data_type, Some("YAML".to_string()));
        } else {
            panic!("Expected Serialization error");
        }
    }
}
