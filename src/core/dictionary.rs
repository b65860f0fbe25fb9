//! English word list used for misspelling detection and typo-tolerant
//! comment comparison.
//!
//! The built-in list is loaded once and shared read-only by every analysis;
//! callers that need extra vocabulary build their own [`Dictionary`] on top
//! of it with [`Dictionary::with_extra_words`].

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::core::text::osa_distance;

const BUILTIN_WORDS: &str = include_str!("words.txt");

/// Misspellings common enough to recognize even when they are more than one
/// edit away from the intended word, or too short for edit-distance lookup.
static KNOWN_MISSPELLINGS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("teh", "the"),
        ("taht", "that"),
        ("recieve", "receive"),
        ("seperate", "separate"),
        ("definately", "definitely"),
        ("occured", "occurred"),
        ("neccessary", "necessary"),
        ("untill", "until"),
        ("begining", "beginning"),
        ("beleive", "believe"),
        ("thier", "their"),
        ("wierd", "weird"),
        ("wich", "which"),
        ("becuase", "because"),
        ("successfull", "successful"),
        ("apparantly", "apparently"),
        ("immediatly", "immediately"),
        ("occurence", "occurrence"),
        ("reccomend", "recommend"),
        ("refrence", "reference"),
        ("calender", "calendar"),
        ("enviroment", "environment"),
        ("availble", "available"),
        ("developement", "development"),
        ("fucntion", "function"),
        ("retrun", "return"),
        ("vairable", "variable"),
        ("paramter", "parameter"),
        ("arguement", "argument"),
    ]
    .into_iter()
    .collect()
});

static BUILTIN: Lazy<Dictionary> = Lazy::new(|| {
    Dictionary::from_ranked_words(
        BUILTIN_WORDS
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#')),
    )
});

/// Shortest word length eligible for edit-distance correction.
const MIN_FUZZY_LENGTH: usize = 6;

/// A ranked word list. Lower rank means more common.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    ranks: HashMap<String, usize>,
    by_length: HashMap<usize, Vec<String>>,
}

impl Dictionary {
    /// The built-in dictionary.
    pub fn builtin() -> &'static Dictionary {
        &BUILTIN
    }

    /// Build a dictionary from words listed most-common first.
    pub fn from_ranked_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        let mut dictionary = Self::default();
        for word in words {
            dictionary.insert(word);
        }
        dictionary
    }

    /// Copy of this dictionary extended with extra words (ranked last).
    pub fn with_extra_words<S: AsRef<str>>(&self, extra: &[S]) -> Self {
        let mut dictionary = self.clone();
        for word in extra {
            dictionary.insert(word.as_ref());
        }
        dictionary
    }

    fn insert(&mut self, word: &str) {
        let word = word.to_lowercase();
        if self.ranks.contains_key(&word) {
            return;
        }
        let rank = self.ranks.len();
        self.by_length
            .entry(word.chars().count())
            .or_default()
            .push(word.clone());
        self.ranks.insert(word, rank);
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Whether the dictionary has no words.
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Exact membership (case-insensitive).
    pub fn contains(&self, word: &str) -> bool {
        self.ranks.contains_key(&word.to_lowercase())
    }

    /// Whether the word, or a regular inflection of it, is listed.
    pub fn is_known(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        self.ranks.contains_key(&lower)
            || inflection_bases(&lower)
                .iter()
                .any(|base| self.ranks.contains_key(base))
    }

    /// Suggested correction for a misspelled word, if there is one.
    ///
    /// Known misspellings are resolved from a fixed table; otherwise words of
    /// at least six letters are matched against listed words within one
    /// edit (insertion, deletion, substitution or adjacent transposition).
    /// Among several candidates the most common wins.
    pub fn correction(&self, word: &str) -> Option<String> {
        let lower = word.to_lowercase();
        if let Some(known) = KNOWN_MISSPELLINGS.get(lower.as_str()) {
            return Some((*known).to_string());
        }
        if !lower.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        let len = lower.chars().count();
        if len < MIN_FUZZY_LENGTH || self.is_known(&lower) {
            return None;
        }

        let mut best: Option<(&String, usize)> = None;
        for candidate_len in len - 1..=len + 1 {
            let Some(candidates) = self.by_length.get(&candidate_len) else {
                continue;
            };
            for candidate in candidates {
                if osa_distance(&lower, candidate) != 1 {
                    continue;
                }
                let rank = self.ranks[candidate];
                if best.map_or(true, |(_, best_rank)| rank < best_rank) {
                    best = Some((candidate, rank));
                }
            }
        }

        best.map(|(candidate, _)| candidate.clone())
    }

    /// Replace a word with its correction when one exists.
    pub fn normalize(&self, word: &str) -> String {
        self.correction(word).unwrap_or_else(|| word.to_lowercase())
    }
}

/// Candidate dictionary forms for a regularly inflected word.
fn inflection_bases(word: &str) -> Vec<String> {
    let mut bases = HashSet::new();

    if let Some(base) = word.strip_suffix("ies").or_else(|| word.strip_suffix("ied")) {
        bases.insert(format!("{base}y"));
    }
    if let Some(base) = word.strip_suffix("ily") {
        bases.insert(format!("{base}y"));
    }

    for suffix in ["s", "es", "ed", "ing", "ly", "er", "ers", "est"] {
        let Some(base) = word.strip_suffix(suffix) else {
            continue;
        };
        if base.len() < 2 {
            continue;
        }
        bases.insert(base.to_string());
        bases.insert(format!("{base}e"));
        let doubles = matches!(suffix, "ed" | "ing" | "er" | "ers" | "est");
        let bytes = base.as_bytes();
        if doubles && bytes.len() >= 2 && bytes[bytes.len() - 1] == bytes[bytes.len() - 2] {
            bases.insert(base[..base.len() - 1].to_string());
        }
    }

    bases.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_dictionary_loads() {
        let dictionary = Dictionary::builtin();
        assert!(dictionary.len() > 500);
        assert!(dictionary.contains("the"));
        let header = "# common english words in rough frequency order, one per line.";
        assert!(!dictionary.contains(header));
    }

    #[test]
    fn test_inflections_are_known() {
        let dictionary = Dictionary::builtin();
        for word in ["passwords", "verifies", "formatting", "handles", "dates", "iterations"] {
            assert!(dictionary.is_known(word), "{word} should be known");
        }
    }

    #[test]
    fn test_known_misspelling() {
        let dictionary = Dictionary::builtin();
        assert_eq!(dictionary.correction("teh"), Some("the".to_string()));
        assert_eq!(dictionary.correction("Recieve"), Some("receive".to_string()));
    }

    #[test]
    fn test_single_edit_correction() {
        let dictionary = Dictionary::builtin();
        assert_eq!(
            dictionary.correction("successfullly"),
            Some("successfully".to_string())
        );
        assert_eq!(dictionary.correction("successfully"), None);
    }

    #[test]
    fn test_short_or_unknown_words_are_left_alone() {
        let dictionary = Dictionary::builtin();
        assert_eq!(dictionary.correction("wtf"), None);
        assert_eq!(dictionary.correction("xyzzyplugh"), None);
        assert_eq!(dictionary.correction("v2"), None);
    }

    #[test]
    fn test_extra_words() {
        let dictionary = Dictionary::builtin().with_extra_words(&["kubernetes"]);
        assert!(dictionary.contains("kubernetes"));
        assert_eq!(
            dictionary.correction("kuberentes"),
            Some("kubernetes".to_string())
        );
    }

    #[test]
    fn test_normalize() {
        let dictionary = Dictionary::builtin();
        assert_eq!(dictionary.normalize("Teh"), "the");
        assert_eq!(dictionary.normalize("User"), "user");
    }
}
