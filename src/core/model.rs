//! Value types shared by every analysis stage.
//!
//! All of these are created once per run and never mutated afterwards; later
//! stages produce new values rather than updating earlier ones.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::errors::{CommentaryError, Result};

/// Syntactic form of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    /// `// ...`, `# ...`
    Line,
    /// `/* ... */`, docstrings
    Block,
}

/// A located run of comment text together with the code it documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSpan {
    /// Logical identifier of the source file
    pub file_id: String,
    /// Byte offset of the first comment byte
    pub start: usize,
    /// Byte offset one past the last comment byte
    pub end: usize,
    /// 1-based line of `start`
    pub line: usize,
    /// Line or block comment
    pub kind: CommentKind,
    /// Exact source slice, delimiters included
    pub raw_text: String,
    /// The code line this comment documents, comments removed
    pub adjacent_code: String,
    /// Byte offset of the adjacent code line; identifies the code site
    pub anchor_offset: usize,
    /// The enclosing code block, comments removed
    #[serde(default)]
    pub context_code: String,
    /// Byte offset where the enclosing block starts
    #[serde(default)]
    pub context_offset: usize,
}

impl CommentSpan {
    /// Lightweight identity of this span.
    pub fn span_ref(&self) -> SpanRef {
        SpanRef {
            file_id: self.file_id.clone(),
            start: self.start,
            end: self.end,
        }
    }

    /// Enclosing block and its offset, or the adjacent line when the
    /// extractor found no block.
    pub fn context(&self) -> (&str, usize) {
        if self.context_code.is_empty() {
            (&self.adjacent_code, self.anchor_offset)
        } else {
            (&self.context_code, self.context_offset)
        }
    }

    /// Whether both comments sit in the same block of the same file.
    pub fn shares_block_with(&self, other: &CommentSpan) -> bool {
        self.file_id == other.file_id && self.context().1 == other.context().1
    }

    /// Reject spans whose offsets cannot describe a comment.
    pub fn validate(&self) -> Result<()> {
        if self.start >= self.end {
            return Err(CommentaryError::invalid_span(
                &self.file_id,
                self.start,
                self.end,
            ));
        }
        Ok(())
    }
}

/// Identity of a span inside a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpanRef {
    /// File the span belongs to
    pub file_id: String,
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl SpanRef {
    /// Whether two ranges in the same file share at least one byte.
    pub fn overlaps(&self, other: &SpanRef) -> bool {
        self.file_id == other.file_id && self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for SpanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}..{}", self.file_id, self.start, self.end)
    }
}

/// Informational value assigned to a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Stand-alone marker such as `XXX` or `TODO`
    Placeholder,
    /// Narrative or conversational framing with no technical content
    Filler,
    /// Restates the adjacent code
    Redundant,
    /// Asserts a guarantee the adjacent code does not visibly provide
    Misleading,
    /// Only notable for a misspelling
    TypoNoise,
    /// Carries information not present in the code
    Informative,
}

impl Category {
    /// Markers with no documentation value of their own.
    pub fn is_hollow(self) -> bool {
        matches!(self, Category::Placeholder)
    }

    /// Comments that say something about behavior.
    pub fn is_substantive(self) -> bool {
        matches!(self, Category::Informative | Category::Misleading)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Placeholder => "placeholder",
            Category::Filler => "filler",
            Category::Redundant => "redundant",
            Category::Misleading => "misleading",
            Category::TypoNoise => "typo_noise",
            Category::Informative => "informative",
        };
        f.write_str(label)
    }
}

/// A misspelled word and the dictionary word it is one edit away from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypoCorrection {
    /// Word as written
    pub found: String,
    /// Suggested replacement
    pub suggestion: String,
}

/// Result of classifying a single comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Winning category
    pub category: Category,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    /// Names of the rules that fired, in evaluation order
    pub evidence: Vec<String>,
    /// Misspellings found, retained whatever the category
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub typos: Vec<TypoCorrection>,
}

/// A span paired with its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedComment {
    /// The extracted comment
    pub span: CommentSpan,
    /// Its classification
    pub classification: Classification,
}

/// How two comments on equivalent code disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftKind {
    /// Both sides say something, and they say different things
    Inconsistent,
    /// One side lost its explanation (placeholder) while the other kept one
    Stale,
}

/// Divergent comments on structurally similar code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftFinding {
    /// First span (ordered before `span_b`)
    pub span_a: SpanRef,
    /// Second span
    pub span_b: SpanRef,
    /// Normalized token-sequence similarity of the adjacent code
    pub code_similarity: f64,
    /// Token-set Jaccard similarity of the comment text
    pub comment_similarity: f64,
    /// Kind of drift
    pub kind: DriftKind,
}

impl DriftFinding {
    /// Whether the finding refers to the given span.
    pub fn references(&self, span: &SpanRef) -> bool {
        &self.span_a == span || &self.span_b == span
    }

    /// Whether either side lives in the given file.
    pub fn touches_file(&self, file_id: &str) -> bool {
        self.span_a.file_id == file_id || self.span_b.file_id == file_id
    }
}

/// Non-fatal condition recorded in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// A drift bucket exceeded the comparison cap
    DriftDetectionTruncated {
        /// Hex structural hash of the bucket
        bucket: String,
        /// Candidates in the bucket
        size: usize,
        /// Candidates actually compared
        compared: usize,
        /// Files with comments in the bucket, sorted
        files: Vec<String>,
    },
    /// A comment with no text was skipped
    EmptyComment {
        /// File the comment belongs to
        file_id: String,
        /// Start byte offset
        start: usize,
        /// 1-based line
        line: usize,
    },
}

impl AnalysisWarning {
    /// Whether the warning concerns the given file.
    pub fn concerns_file(&self, file_id: &str) -> bool {
        match self {
            AnalysisWarning::DriftDetectionTruncated { files, .. } => {
                files.iter().any(|f| f == file_id)
            }
            AnalysisWarning::EmptyComment { file_id: f, .. } => f == file_id,
        }
    }
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisWarning::DriftDetectionTruncated {
                bucket,
                size,
                compared,
                ..
            } => write!(
                f,
                "drift detection truncated: bucket {} has {} candidates, compared {}",
                bucket, size, compared
            ),
            AnalysisWarning::EmptyComment {
                file_id,
                line,
                ..
            } => write!(f, "empty comment skipped at {}:{}", file_id, line),
        }
    }
}

/// Per-span decision of the rewrite planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Leave the comment alone
    Keep,
    /// Remove the comment
    Delete,
    /// Replace the comment with `replacement_text`
    Rewrite,
    /// Leave in place, surface for human review
    Flag,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Keep => "keep",
            Action::Delete => "delete",
            Action::Rewrite => "rewrite",
            Action::Flag => "flag",
        };
        f.write_str(label)
    }
}

/// A planned change to one comment (or to a merged run of deleted comments).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchAction {
    /// Byte range the action applies to
    pub span: SpanRef,
    /// What to do with the range
    pub action: Action,
    /// New text for `Rewrite`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement_text: Option<String>,
    /// Category of the comment (absent on merged deletions of mixed categories)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Rule that decided the action
    pub reason: String,
    /// 1-based line of the first comment covered
    pub line: usize,
}

/// Ordered, non-overlapping actions for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewritePlan {
    /// File the plan belongs to
    pub file_id: String,
    /// Actions ascending by start offset
    pub actions: Vec<PatchAction>,
}

impl RewritePlan {
    /// Number of actions with the given kind.
    pub fn count(&self, action: Action) -> usize {
        self.actions.iter().filter(|a| a.action == action).count()
    }

    /// Whether applying the plan would change the file.
    pub fn has_edits(&self) -> bool {
        self.actions
            .iter()
            .any(|a| matches!(a.action, Action::Delete | Action::Rewrite))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> CommentSpan {
        CommentSpan {
            file_id: "a.js".to_string(),
            start,
            end,
            line: 1,
            kind: CommentKind::Line,
            raw_text: "// x".to_string(),
            adjacent_code: String::new(),
            anchor_offset: end,
            context_code: String::new(),
            context_offset: 0,
        }
    }

    #[test]
    fn test_span_validation() {
        assert!(span(0, 4).validate().is_ok());
        assert!(matches!(
            span(4, 4).validate(),
            Err(CommentaryError::InvalidSpan { .. })
        ));
    }

    #[test]
    fn test_context_falls_back_to_adjacent_line() {
        let mut comment = span(0, 4);
        comment.adjacent_code = "run();".to_string();
        assert_eq!(comment.context(), ("run();", 4));

        comment.context_code = "{ run(); stop(); }".to_string();
        comment.context_offset = 1;
        assert_eq!(comment.context(), ("{ run(); stop(); }", 1));

        let mut sibling = comment.clone();
        sibling.anchor_offset = 30;
        assert!(comment.shares_block_with(&sibling));
        sibling.file_id = "b.js".to_string();
        assert!(!comment.shares_block_with(&sibling));
    }

    #[test]
    fn test_span_ref_overlap() {
        let a = span(0, 10).span_ref();
        let b = span(10, 20).span_ref();
        let c = span(5, 12).span_ref();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));

        let mut other_file = c.clone();
        other_file.file_id = "b.js".to_string();
        assert!(!a.overlaps(&other_file));
    }

    #[test]
    fn test_category_groups() {
        assert!(Category::Placeholder.is_hollow());
        assert!(Category::Informative.is_substantive());
        assert!(Category::Misleading.is_substantive());
        assert!(!Category::Filler.is_substantive());
        assert_eq!(Category::TypoNoise.to_string(), "typo_noise");
    }
}
