//! Comment classification.
//!
//! [`CommentClassifier`] turns a [`CommentSpan`] into a [`Classification`] by
//! computing [`CommentFeatures`] once and running them through the ordered
//! [`RULES`] table.

pub mod phrases;
pub mod rules;

use std::collections::HashSet;

use aho_corasick::AhoCorasick;
use tracing::trace;

use crate::core::config::ClassifierConfig;
use crate::core::dictionary::Dictionary;
use crate::core::errors::{CommentaryError, Result};
use crate::core::model::{Category, Classification, CommentSpan, TypoCorrection};
use crate::core::text::{
    code_vocabulary, is_keyword, jaccard, lex_code, prose_words, restates, restates_identifier,
    split_identifier, strip_comment_delimiters, CodeToken,
};

pub use rules::{CommentFeatures, Rule, DEFAULT_INFORMATIVE, RULES};

use phrases::{
    AFFECTIVE_CLAIMS, CHECK_TOKENS, CLAIM_VERBS, FILLER_PHRASES, GENERIC_VOCABULARY,
    PLACEHOLDER_MARKERS, STOP_WORDS,
};

/// Rule-based comment classifier.
///
/// Construction compiles the phrase tables; classification itself is pure
/// and can be shared across threads.
#[derive(Debug, Clone)]
pub struct CommentClassifier {
    config: ClassifierConfig,
    dictionary: Dictionary,
    filler: PhraseMatcher,
    affective: PhraseMatcher,
    placeholder_markers: HashSet<String>,
}

impl CommentClassifier {
    /// Build a classifier from configuration.
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        let filler = PhraseMatcher::new(
            FILLER_PHRASES
                .iter()
                .map(|phrase| phrase.to_string())
                .chain(config.extra_filler_phrases.iter().cloned()),
        )?;
        let affective = PhraseMatcher::new(AFFECTIVE_CLAIMS.iter().map(|p| p.to_string()))?;
        let placeholder_markers = PLACEHOLDER_MARKERS
            .iter()
            .map(|marker| marker.to_string())
            .chain(config.extra_placeholder_markers.iter().cloned())
            .map(|marker| prose_words(&marker).join(" "))
            .filter(|marker| !marker.is_empty())
            .collect();
        let dictionary = Dictionary::builtin().with_extra_words(&config.extra_words);

        Ok(Self {
            config,
            dictionary,
            filler,
            affective,
            placeholder_markers,
        })
    }

    /// Dictionary used for misspelling detection.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Classify one comment.
    ///
    /// Fails only for malformed spans and comments with no text once the
    /// delimiters are removed.
    pub fn classify(&self, span: &CommentSpan) -> Result<Classification> {
        let features = self.features(span)?;

        let mut winner: Option<(Category, f64)> = None;
        let mut evidence = Vec::new();
        for rule in RULES {
            if let Some(confidence) = (rule.predicate)(&features, &self.config) {
                evidence.push(rule.name.to_string());
                if winner.is_none() {
                    winner = Some((rule.category, confidence));
                }
            }
        }

        let (category, confidence) = winner.unwrap_or_else(|| {
            evidence.push(DEFAULT_INFORMATIVE.to_string());
            (Category::Informative, 0.4)
        });

        trace!(
            file_id = %span.file_id,
            start = span.start,
            %category,
            "classified comment"
        );

        Ok(Classification {
            category,
            confidence: confidence.clamp(0.0, 1.0),
            evidence,
            typos: features.typos,
        })
    }

    /// Compute the rule inputs for one comment.
    pub fn features(&self, span: &CommentSpan) -> Result<CommentFeatures> {
        span.validate()?;
        let body = strip_comment_delimiters(&span.raw_text);
        if body.trim().is_empty() {
            return Err(CommentaryError::empty_comment(&span.file_id, span.start));
        }

        let words = prose_words(&body);
        let vocabulary = code_vocabulary(&span.adjacent_code);
        let code_parts: HashSet<String> = lex_code(&span.adjacent_code)
            .into_iter()
            .filter_map(|token| match token {
                CodeToken::Word(word) => Some(split_identifier(&word)),
                _ => None,
            })
            .flatten()
            .collect();

        let placeholder = words.is_empty() || self.placeholder_markers.contains(&words.join(" "));

        let filler_matches = self.filler.find(&words);
        let covered: HashSet<usize> = filler_matches
            .iter()
            .flat_map(|m| m.words.clone())
            .collect();
        let mut filler_hits: Vec<String> = Vec::new();
        for found in &filler_matches {
            if !filler_hits.contains(&found.phrase) {
                filler_hits.push(found.phrase.clone());
            }
        }

        let typos = self.find_typos(&words, &vocabulary);
        let corrected: Vec<String> = words
            .iter()
            .map(|word| {
                typos
                    .iter()
                    .find(|typo| &typo.found == word)
                    .map(|typo| typo.suggestion.clone())
                    .unwrap_or_else(|| word.clone())
            })
            .collect();

        let mut novel_terms: Vec<String> = Vec::new();
        for (index, (word, fixed)) in words.iter().zip(&corrected).enumerate() {
            if covered.contains(&index) || !is_content_word(fixed) {
                continue;
            }
            if GENERIC_VOCABULARY.contains(fixed.as_str()) || is_keyword(fixed) {
                continue;
            }
            if restates_identifier(fixed, &vocabulary) || restates_identifier(word, &vocabulary) {
                continue;
            }
            if !novel_terms.contains(fixed) {
                novel_terms.push(fixed.clone());
            }
        }

        let content: HashSet<String> = corrected
            .iter()
            .filter(|word| is_content_word(word))
            .map(|word| {
                code_parts
                    .iter()
                    .find(|part| restates(word, part))
                    .cloned()
                    .unwrap_or_else(|| word.clone())
            })
            .collect();
        let restatement = if content.is_empty() {
            0.0
        } else {
            jaccard(&content, &code_parts)
        };

        let mut claims: Vec<String> = corrected
            .iter()
            .filter(|word| CLAIM_VERBS.contains(&word.as_str()))
            .cloned()
            .collect();
        for found in self.affective.find(&corrected) {
            if !claims.contains(&found.phrase) {
                claims.push(found.phrase);
            }
        }
        let code_has_check = code_parts
            .iter()
            .any(|part| CHECK_TOKENS.contains(part.as_str()));

        Ok(CommentFeatures {
            body,
            filler_tokens: covered.len(),
            words,
            placeholder,
            filler_hits,
            novel_terms,
            restatement,
            claims,
            code_has_check,
            typos,
        })
    }

    fn find_typos(&self, words: &[String], vocabulary: &HashSet<String>) -> Vec<TypoCorrection> {
        let mut typos: Vec<TypoCorrection> = Vec::new();
        for word in words {
            if word.chars().count() < 3
                || !word.chars().all(|c| c.is_ascii_alphabetic())
                || vocabulary.contains(word)
                || typos.iter().any(|typo| &typo.found == word)
            {
                continue;
            }
            if let Some(suggestion) = self.dictionary.correction(word) {
                typos.push(TypoCorrection {
                    found: word.clone(),
                    suggestion,
                });
            }
        }
        typos
    }
}

/// Words of three or more letters that are not function words.
fn is_content_word(word: &str) -> bool {
    word.chars().count() >= 3
        && word.chars().all(char::is_alphabetic)
        && !STOP_WORDS.contains(word)
}

/// One phrase occurrence, aligned to word boundaries.
#[derive(Debug, Clone)]
pub struct PhraseMatch {
    /// Normalized phrase that matched
    pub phrase: String,
    /// Indices of the covered words
    pub words: Vec<usize>,
}

/// Whole-word phrase search over normalized comment words.
#[derive(Debug, Clone)]
pub struct PhraseMatcher {
    automaton: AhoCorasick,
    phrases: Vec<String>,
}

impl PhraseMatcher {
    pub fn new(phrases: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut normalized: Vec<String> = Vec::new();
        for phrase in phrases {
            let words = prose_words(&phrase).join(" ");
            if !words.is_empty() && !normalized.contains(&words) {
                normalized.push(words);
            }
        }

        let automaton = AhoCorasick::new(&normalized).map_err(|e| {
            CommentaryError::config(format!("Failed to compile phrase table: {}", e))
        })?;
        Ok(Self {
            automaton,
            phrases: normalized,
        })
    }

    /// Phrases occurring on word boundaries of `words`, overlaps included.
    pub fn find(&self, words: &[String]) -> Vec<PhraseMatch> {
        let haystack = words.join(" ");
        let mut word_starts = Vec::with_capacity(words.len());
        let mut offset = 0;
        for word in words {
            word_starts.push(offset);
            offset += word.len() + 1;
        }

        let bytes = haystack.as_bytes();
        self.automaton
            .find_overlapping_iter(&haystack)
            .filter(|m| {
                (m.start() == 0 || bytes[m.start() - 1] == b' ')
                    && (m.end() == bytes.len() || bytes[m.end()] == b' ')
            })
            .map(|m| PhraseMatch {
                phrase: self.phrases[m.pattern().as_usize()].clone(),
                words: word_starts
                    .iter()
                    .enumerate()
                    .filter(|(_, &start)| start >= m.start() && start < m.end())
                    .map(|(index, _)| index)
                    .collect(),
            })
            .collect()
    }
}
