//! Applies a [`RewritePlan`] to source text.

use crate::core::errors::{CommentaryError, Result};
use crate::core::model::{Action, RewritePlan};

/// Produce the rewritten text for `source`.
///
/// Deletions and rewrites are applied right to left so earlier offsets stay
/// valid; `Keep` and `Flag` actions leave the text untouched.
pub fn apply(source: &str, plan: &RewritePlan) -> Result<String> {
    let mut edits: Vec<(usize, usize, &str)> = Vec::new();
    for action in &plan.actions {
        let replacement = match action.action {
            Action::Delete => "",
            Action::Rewrite => action.replacement_text.as_deref().ok_or_else(|| {
                CommentaryError::apply(
                    &plan.file_id,
                    format!("rewrite at {} has no replacement text", action.span),
                )
            })?,
            Action::Keep | Action::Flag => continue,
        };

        let (start, end) = (action.span.start, action.span.end);
        if start > end {
            return Err(CommentaryError::apply(
                &plan.file_id,
                format!("inverted span {}..{}", start, end),
            ));
        }
        if end > source.len() {
            return Err(CommentaryError::apply(
                &plan.file_id,
                format!(
                    "span {}..{} exceeds source length {}",
                    start,
                    end,
                    source.len()
                ),
            ));
        }
        if !source.is_char_boundary(start) || !source.is_char_boundary(end) {
            return Err(CommentaryError::apply(
                &plan.file_id,
                format!("span {}..{} splits a character", start, end),
            ));
        }
        edits.push((start, end, replacement));
    }

    edits.sort_by_key(|&(start, end, _)| (start, end));
    for pair in edits.windows(2) {
        if pair[1].0 < pair[0].1 {
            return Err(CommentaryError::apply(
                &plan.file_id,
                format!(
                    "spans {}..{} and {}..{} overlap",
                    pair[0].0, pair[0].1, pair[1].0, pair[1].1
                ),
            ));
        }
    }

    let mut output = source.to_string();
    for &(start, end, replacement) in edits.iter().rev() {
        output.replace_range(start..end, replacement);
    }
    Ok(output)
}
