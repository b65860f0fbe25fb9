//! Policy-driven rewrite planning.
//!
//! The planner decides one action per comment and returns them as a
//! [`RewritePlan`]. It never touches the source; deletions are widened to
//! whole lines where the comment owns the line so applying the plan does not
//! leave blank lines behind.

use std::collections::HashSet;

use tracing::debug;

use crate::core::config::Policy;
use crate::core::errors::{CommentaryError, Result};
use crate::core::model::{
    Action, Category, ClassifiedComment, DriftFinding, PatchAction, RewritePlan, SpanRef,
    TypoCorrection,
};

/// Builds rewrite plans under a fixed policy.
#[derive(Debug, Clone)]
pub struct RewritePlanner {
    policy: Policy,
}

impl RewritePlanner {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Plan the actions for one file.
    ///
    /// `comments` are the classified comments of `file_id`, `drift` may
    /// contain findings for any file. Fails with
    /// [`CommentaryError::OverlappingAction`] when two comment spans overlap.
    pub fn plan(
        &self,
        file_id: &str,
        source: &str,
        comments: &[ClassifiedComment],
        drift: &[DriftFinding],
    ) -> Result<RewritePlan> {
        let drifted: HashSet<&SpanRef> = drift
            .iter()
            .filter(|finding| finding.touches_file(file_id))
            .flat_map(|finding| [&finding.span_a, &finding.span_b])
            .collect();

        let mut ordered: Vec<&ClassifiedComment> = comments
            .iter()
            .filter(|comment| comment.span.file_id == file_id)
            .collect();
        ordered.sort_by_key(|comment| (comment.span.start, comment.span.end));

        let mut decided: Vec<PatchAction> = Vec::with_capacity(ordered.len());
        for comment in ordered {
            let span = comment.span.span_ref();
            if span.end > source.len() {
                return Err(CommentaryError::invalid_span(file_id, span.start, span.end));
            }
            decided.push(self.decide(comment, drifted.contains(&span)));
        }
        ensure_disjoint(file_id, &decided)?;

        let widened: Vec<PatchAction> = decided
            .into_iter()
            .map(|action| match action.action {
                Action::Delete => widen_deletion(source, action),
                _ => action,
            })
            .collect();
        let actions = merge_deletions(source, widened);
        ensure_disjoint(file_id, &actions)?;

        debug!(
            file_id,
            actions = actions.len(),
            deletes = actions.iter().filter(|a| a.action == Action::Delete).count(),
            "Planned rewrites"
        );

        Ok(RewritePlan {
            file_id: file_id.to_string(),
            actions,
        })
    }

    fn decide(&self, comment: &ClassifiedComment, drifted: bool) -> PatchAction {
        let category = comment.classification.category;
        let (action, reason) = if drifted && self.policy.flag_drift {
            (Action::Flag, "drift")
        } else if category == Category::Misleading {
            (Action::Flag, "unverified_claim")
        } else if category == Category::Informative {
            (Action::Keep, "preserve_informative")
        } else {
            match category {
                Category::Filler if self.policy.delete_filler => (Action::Delete, "delete_filler"),
                Category::Redundant if self.policy.delete_redundant => {
                    (Action::Delete, "delete_redundant")
                }
                Category::Placeholder if self.policy.delete_placeholder => {
                    (Action::Delete, "delete_placeholder")
                }
                _ => (Action::Keep, "policy_keep"),
            }
        };

        let typos = &comment.classification.typos;
        let (action, reason, replacement_text) =
            if action == Action::Keep && self.policy.fix_typos && !typos.is_empty() {
                (
                    Action::Rewrite,
                    "fix_typos",
                    Some(correct_typos(&comment.span.raw_text, typos)),
                )
            } else {
                (action, reason, None)
            };

        PatchAction {
            span: comment.span.span_ref(),
            action,
            replacement_text,
            category: Some(category),
            reason: reason.to_string(),
            line: comment.span.line,
        }
    }
}

fn ensure_disjoint(file_id: &str, actions: &[PatchAction]) -> Result<()> {
    for pair in actions.windows(2) {
        let (first, second) = (&pair[0].span, &pair[1].span);
        if second.start < first.end {
            return Err(CommentaryError::OverlappingAction {
                file_id: file_id.to_string(),
                first_start: first.start,
                first_end: first.end,
                second_start: second.start,
                second_end: second.end,
            });
        }
    }
    Ok(())
}

/// Extend a deletion over its whole line when the comment is alone on it,
/// otherwise over the blanks separating it from preceding code.
fn widen_deletion(source: &str, mut action: PatchAction) -> PatchAction {
    let bytes = source.as_bytes();
    let is_blank = |b: u8| b == b' ' || b == b'\t';

    let mut start = action.span.start;
    while start > 0 && is_blank(bytes[start - 1]) {
        start -= 1;
    }
    let owns_line_start = start == 0 || bytes[start - 1] == b'\n';

    let mut end = action.span.end;
    while end < bytes.len() && (is_blank(bytes[end]) || bytes[end] == b'\r') {
        end += 1;
    }
    let owns_line_end = end == bytes.len() || bytes[end] == b'\n';

    if owns_line_start && owns_line_end {
        action.span.start = start;
        action.span.end = (end + 1).min(bytes.len());
    } else if owns_line_end {
        action.span.start = start;
    }
    action
}

/// Merge runs of deletions separated only by whitespace.
fn merge_deletions(source: &str, actions: Vec<PatchAction>) -> Vec<PatchAction> {
    let mut merged: Vec<PatchAction> = Vec::with_capacity(actions.len());
    for action in actions {
        if let Some(last) = merged.last_mut() {
            let joinable = last.action == Action::Delete
                && action.action == Action::Delete
                && source[last.span.end..action.span.start]
                    .chars()
                    .all(char::is_whitespace);
            if joinable {
                last.span.end = action.span.end;
                if last.category != action.category {
                    last.category = None;
                }
                if last.reason != action.reason {
                    last.reason = "merged_delete".to_string();
                }
                continue;
            }
        }
        merged.push(action);
    }
    merged
}

/// Replace misspelled words in `raw`, keeping their capitalization.
pub fn correct_typos(raw: &str, typos: &[TypoCorrection]) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut word_start: Option<usize> = None;

    let flush = |out: &mut String, word: &str| {
        let lower = word.to_lowercase();
        match typos.iter().find(|typo| typo.found == lower) {
            Some(typo) => out.push_str(&match_case(word, &typo.suggestion)),
            None => out.push_str(word),
        }
    };

    for (index, ch) in raw.char_indices() {
        if ch.is_alphabetic() {
            word_start.get_or_insert(index);
            continue;
        }
        if let Some(start) = word_start.take() {
            flush(&mut out, &raw[start..index]);
        }
        out.push(ch);
    }
    if let Some(start) = word_start {
        flush(&mut out, &raw[start..]);
    }
    out
}

fn match_case(original: &str, replacement: &str) -> String {
    if original.len() > 1 && original.chars().all(|c| !c.is_lowercase()) {
        return replacement.to_uppercase();
    }
    let mut chars = original.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let mut rest = replacement.chars();
            rest.next()
                .map(|c| c.to_uppercase().chain(rest).collect())
                .unwrap_or_default()
        }
        _ => replacement.to_string(),
    }
}
