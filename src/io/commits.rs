//! Scan of recent git commit messages for narrative phrasing and emoji.

use std::path::Path;

use git2::{Repository, Sort};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::errors::Result;
use crate::core::text::prose_words;
use crate::detectors::classifier::phrases::FILLER_PHRASES;
use crate::detectors::classifier::PhraseMatcher;

/// Commits scanned when no count is given.
pub const DEFAULT_COMMIT_COUNT: usize = 20;

const SUBJECT_WIDTH: usize = 60;

/// Phrases that narrate the change instead of describing it.
const NARRATIVE_PHRASES: &[&str] = &[
    "this commit",
    "this change",
    "this update",
    "this patch",
    "here we",
    "this pr",
    "this pull request",
    "in this commit",
];

/// Footers added by generation tools.
const GENERATED_FOOTERS: &[&str] = &[
    "generated with",
    "co-authored-by: claude",
    "co-authored-by: chatgpt",
    "co-authored-by: copilot",
    "co-authored-by: gemini",
    "co-authored-by: gpt",
    "created by ai",
    "written by ai",
];

/// Gitmoji shortcodes.
const GITMOJI: &[&str] = &[
    ":sparkles:", ":bug:", ":memo:", ":rocket:", ":art:", ":fire:", ":zap:", ":lipstick:",
    ":tada:", ":white_check_mark:", ":lock:", ":bookmark:", ":rotating_light:",
    ":construction:", ":green_heart:", ":arrow_down:", ":arrow_up:", ":pushpin:", ":recycle:",
    ":heavy_plus_sign:", ":heavy_minus_sign:", ":wrench:", ":hammer:",
    ":globe_with_meridians:", ":pencil2:", ":poop:", ":rewind:",
    ":twisted_rightwards_arrows:", ":package:", ":truck:", ":page_facing_up:", ":boom:",
    ":bento:", ":wheelchair:", ":bulb:", ":beers:", ":speech_balloon:", ":card_file_box:",
    ":loud_sound:", ":mute:", ":busts_in_silhouette:",
];

/// A commit whose message looks generated or narrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitWarning {
    /// Abbreviated commit hash
    pub hash: String,
    /// Subject line, shortened for display
    pub subject: String,
    /// Everything that was found, in check order
    pub reasons: Vec<String>,
}

/// Checks a single commit message.
#[derive(Debug, Clone)]
pub struct CommitMessageScanner {
    narrative: PhraseMatcher,
}

impl CommitMessageScanner {
    pub fn new() -> Result<Self> {
        let conversational = FILLER_PHRASES
            .iter()
            .filter(|phrase| {
                phrase.starts_with("here")
                    || phrase.starts_with("let")
                    || phrase.starts_with("as you")
            })
            .map(|phrase| phrase.to_string());
        let narrative = PhraseMatcher::new(
            NARRATIVE_PHRASES
                .iter()
                .map(|phrase| phrase.to_string())
                .chain(conversational),
        )?;
        Ok(Self { narrative })
    }

    /// Reasons a message is suspicious; empty when it is fine.
    pub fn check_message(&self, message: &str) -> Vec<String> {
        let lower = message.to_lowercase();
        let mut reasons = Vec::new();

        if message.chars().any(is_emoji) {
            reasons.push("contains emoji".to_string());
        }
        if let Some(code) = GITMOJI.iter().find(|code| lower.contains(*code)) {
            reasons.push(format!("contains gitmoji ({})", code));
        }
        for footer in GENERATED_FOOTERS {
            if lower.contains(footer) {
                reasons.push(format!("contains generated footer: {}", footer));
            }
        }
        if let Some(hit) = self.narrative.find(&prose_words(message)).first() {
            reasons.push(format!("uses narrative phrasing: \"{}\"", hit.phrase));
        }
        reasons
    }
}

/// Scan the newest `count` commits reachable from HEAD of the repository at `path`.
///
/// A `count` of zero scans [`DEFAULT_COMMIT_COUNT`] commits.
pub fn scan_commits(path: &Path, count: usize) -> Result<Vec<CommitWarning>> {
    let count = if count == 0 { DEFAULT_COMMIT_COUNT } else { count };
    let repo = Repository::discover(path)?;
    let scanner = CommitMessageScanner::new()?;

    let mut walk = repo.revwalk()?;
    walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    walk.push_head()?;

    let mut warnings = Vec::new();
    for oid in walk.take(count) {
        let commit = repo.find_commit(oid?)?;
        let message = String::from_utf8_lossy(commit.message_bytes());
        let reasons = scanner.check_message(&message);
        if reasons.is_empty() {
            continue;
        }

        let hash = commit.id().to_string();
        let subject = message.lines().next().unwrap_or_default();
        warnings.push(CommitWarning {
            hash: hash.chars().take(7).collect(),
            subject: truncate(subject, SUBJECT_WIDTH),
            reasons,
        });
    }

    debug!("Flagged {} commits", warnings.len());
    Ok(warnings)
}

fn is_emoji(ch: char) -> bool {
    matches!(
        ch as u32,
        0x1F600..=0x1F64F
            | 0x1F300..=0x1F5FF
            | 0x1F680..=0x1F6FF
            | 0x1F1E0..=0x1F1FF
            | 0x2600..=0x26FF
            | 0x2700..=0x27BF
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width - 3).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Commit, Signature};
    use tempfile::TempDir;

    fn commit(repo: &Repository, message: &str) {
        let signature = Signature::now("Dev", "dev@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap();
    }

    #[test]
    fn test_check_message() {
        let scanner = CommitMessageScanner::new().unwrap();

        assert!(scanner.check_message("Fix off-by-one in span merge").is_empty());
        assert!(scanner.check_message("Speed up this process").is_empty());
        assert!(scanner.check_message("Let the cache expire on reload").is_empty());

        let reasons = scanner.check_message("In this commit we add caching");
        assert_eq!(reasons.len(), 1);
        assert!(reasons[0].starts_with("uses narrative phrasing"));
        assert!(reasons[0].contains("this commit"));

        let reasons = scanner.check_message("\u{2728} :sparkles: add parser");
        assert_eq!(reasons[0], "contains emoji");
        assert_eq!(reasons[1], "contains gitmoji (:sparkles:)");

        let reasons =
            scanner.check_message("Add cache\n\nCo-Authored-By: Copilot <bot@example.com>");
        assert_eq!(
            reasons,
            vec!["contains generated footer: co-authored-by: copilot".to_string()]
        );

        let reasons = scanner.check_message("Let's refactor the planner");
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0], "uses narrative phrasing: \"let's\"");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 60), "short");
        let long = "x".repeat(80);
        let short = truncate(&long, 60);
        assert_eq!(short.chars().count(), 60);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_scan_commits() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        commit(&repo, "Initial import");
        commit(&repo, "This change adds a cache\n\nGenerated with a tool");
        commit(&repo, "Tighten drift thresholds");

        let warnings = scan_commits(temp.path(), 10).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].hash.len(), 7);
        assert_eq!(warnings[0].subject, "This change adds a cache");
        assert_eq!(warnings[0].reasons.len(), 2);

        let newest_only = scan_commits(temp.path(), 1).unwrap();
        assert!(newest_only.is_empty());
    }

    #[test]
    fn test_scan_outside_repository_fails() {
        let temp = TempDir::new().unwrap();
        assert!(scan_commits(temp.path(), 5).is_err());
    }
}
