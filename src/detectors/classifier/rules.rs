//! Ordered classification rules.
//!
//! Each rule is a plain predicate over precomputed [`CommentFeatures`]. The
//! table order is the priority order: the first rule that fires decides the
//! category, and every rule that fires is recorded as evidence.

use crate::core::config::ClassifierConfig;
use crate::core::model::{Category, TypoCorrection};

/// Evidence label used when no rule fired.
pub const DEFAULT_INFORMATIVE: &str = "default_informative";

/// Everything the rules need to know about one comment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentFeatures {
    /// Comment body with delimiters removed
    pub body: String,
    /// Lower-cased words of the body
    pub words: Vec<String>,
    /// Body is a stand-alone marker or only punctuation
    pub placeholder: bool,
    /// Narrative phrases found, in order of appearance
    pub filler_hits: Vec<String>,
    /// Number of body words covered by narrative phrases
    pub filler_tokens: usize,
    /// Content words that neither restate the code nor belong to generic vocabulary
    pub novel_terms: Vec<String>,
    /// Jaccard of comment content words against the adjacent code tokens
    pub restatement: f64,
    /// Claim verbs and affective claims found
    pub claims: Vec<String>,
    /// Adjacent code contains an assertion, validation or error path
    pub code_has_check: bool,
    /// Misspellings with their corrections
    pub typos: Vec<TypoCorrection>,
}

/// Returns the rule's confidence when it fires.
pub type Predicate = fn(&CommentFeatures, &ClassifierConfig) -> Option<f64>;

/// One row of the rule table.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Evidence label
    pub name: &'static str,
    /// Category assigned when this is the first rule to fire
    pub category: Category,
    /// Firing condition
    pub predicate: Predicate,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("category", &self.category)
            .finish()
    }
}

/// Rules in priority order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "placeholder_marker",
        category: Category::Placeholder,
        predicate: placeholder_marker,
    },
    Rule {
        name: "narrative_framing",
        category: Category::Filler,
        predicate: narrative_framing,
    },
    Rule {
        name: "restates_code",
        category: Category::Redundant,
        predicate: restates_code,
    },
    Rule {
        name: "unverified_claim",
        category: Category::Misleading,
        predicate: unverified_claim,
    },
    Rule {
        name: "misspelling",
        category: Category::TypoNoise,
        predicate: misspelling,
    },
    Rule {
        name: "novel_information",
        category: Category::Informative,
        predicate: novel_information,
    },
];

fn placeholder_marker(features: &CommentFeatures, _: &ClassifierConfig) -> Option<f64> {
    features.placeholder.then_some(0.95)
}

fn narrative_framing(features: &CommentFeatures, config: &ClassifierConfig) -> Option<f64> {
    if features.filler_hits.is_empty()
        || features.novel_terms.len() > config.filler_max_novel_terms
    {
        return None;
    }
    let total = features.words.len().max(1) as f64;
    let ratio = features.filler_tokens as f64 / total;
    Some((0.5 + 0.5 * ratio).min(0.95))
}

fn restates_code(features: &CommentFeatures, config: &ClassifierConfig) -> Option<f64> {
    (features.restatement >= config.redundant_jaccard)
        .then(|| features.restatement.clamp(0.6, 0.95))
}

fn unverified_claim(features: &CommentFeatures, _: &ClassifierConfig) -> Option<f64> {
    (!features.claims.is_empty() && !features.code_has_check).then_some(0.5)
}

fn misspelling(features: &CommentFeatures, _: &ClassifierConfig) -> Option<f64> {
    (!features.typos.is_empty()).then_some(0.8)
}

fn novel_information(features: &CommentFeatures, _: &ClassifierConfig) -> Option<f64> {
    (!features.novel_terms.is_empty()).then_some(0.7)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order_is_priority_order() {
        let categories: Vec<Category> = RULES.iter().map(|rule| rule.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::Placeholder,
                Category::Filler,
                Category::Redundant,
                Category::Misleading,
                Category::TypoNoise,
                Category::Informative,
            ]
        );
    }

    #[test]
    fn test_filler_confidence_scales_with_coverage() {
        let config = ClassifierConfig::default();
        let mut features = CommentFeatures {
            words: vec!["here".into(), "we".into(), "go".into(), "again".into()],
            filler_hits: vec!["here we".into()],
            filler_tokens: 2,
            ..CommentFeatures::default()
        };
        assert_eq!(narrative_framing(&features, &config), Some(0.75));

        features.filler_tokens = 4;
        assert_eq!(narrative_framing(&features, &config), Some(0.95));

        features.novel_terms = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(narrative_framing(&features, &config), None);
    }

    #[test]
    fn test_claim_with_check_is_not_misleading() {
        let config = ClassifierConfig::default();
        let features = CommentFeatures {
            claims: vec!["ensures".into()],
            code_has_check: true,
            ..CommentFeatures::default()
        };
        assert_eq!(unverified_claim(&features, &config), None);
    }
}
