//! Vocabulary tables used by the classifier rules.
//!
//! Phrases are written the way people type them; they are normalized with
//! the same word splitter as comment bodies before matching.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Conversational or narrative framing about the act of writing or reading code.
pub const FILLER_PHRASES: &[&str] = &[
    "this function",
    "this method",
    "this class",
    "this module",
    "this component",
    "this hook",
    "this utility",
    "this helper",
    "here's how we",
    "here's",
    "here we",
    "here is",
    "let's",
    "let us",
    "i will",
    "we will",
    "we need to",
    "we can",
    "this is where we",
    "the following",
    "below is",
    "above is",
    "as you can see",
    "note that",
    "notice that",
    "importantly",
    "essentially",
    "basically",
    "great",
    "awesome",
    "congratulations",
    "in order to",
    "it is important to",
    "it should be noted",
    "this allows us to",
    "this enables",
    "this provides",
    "this handles",
    "responsible for",
];

/// Terse stand-alone markers that carry no explanation of their own.
pub const PLACEHOLDER_MARKERS: &[&str] = &[
    "xxx",
    "todo",
    "fixme",
    "hack",
    "tbd",
    "wtf",
    "fix later",
    "works somehow",
    "don't touch",
    "legacy",
    "ugh",
    "temp",
    "cleanup needed",
    "why",
    "magic number",
    "sorry",
    "good enough",
    "needs refactor",
    "not ideal",
    "idk",
];

/// Verbs that assert a guarantee about runtime behavior.
pub const CLAIM_VERBS: &[&str] = &[
    "ensure",
    "ensures",
    "guarantee",
    "guarantees",
    "guaranteed",
    "validates",
    "verifies",
    "prevents",
    "protects",
];

/// Affective claims that assert safety or importance.
pub const AFFECTIVE_CLAIMS: &[&str] = &[
    "this ensures",
    "important security step",
    "always safe",
    "completely safe",
    "fully secure",
    "never fails",
    "cannot fail",
    "bulletproof",
];

/// Code tokens that count as a visible check backing a claim.
pub static CHECK_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "assert", "throw", "throws", "raise", "panic", "require", "expect", "validate",
        "verify", "check", "ensure", "guard", "bail", "unreachable",
    ]
    .into_iter()
    .collect()
});

/// Function words that never carry information on their own.
pub static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "the", "this", "that", "these", "those", "is", "are", "was", "were", "be",
        "been", "being", "has", "have", "had", "do", "does", "did", "we", "us", "our", "you",
        "your", "i", "it", "its", "they", "them", "their", "he", "she", "to", "of", "in", "on",
        "at", "by", "for", "with", "from", "as", "and", "or", "but", "if", "then", "so", "not",
        "no", "yes", "into", "onto", "out", "up", "down", "over", "under", "about", "before",
        "after", "while", "when", "where", "which", "who", "whom", "what", "why", "how", "here",
        "there", "all", "any", "each", "every", "some", "such", "only", "own", "same", "than",
        "too", "very", "can", "will", "just", "should", "would", "could", "may", "might",
        "must", "shall", "let", "lets", "also", "again", "more", "most", "other", "through",
        "because", "until", "between", "during", "without", "within", "whether", "both",
        "few", "many", "much", "one", "ones", "now", "first", "next", "finally", "ll", "ve",
        "re", "s", "t", "d", "m",
    ]
    .into_iter()
    .collect()
});

/// Words so common in code commentary that they add nothing on their own.
pub static GENERIC_VOCABULARY: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "handle", "handles", "handling", "process", "processes", "processing", "logic",
        "code", "function", "functions", "method", "methods", "data", "value", "values",
        "stuff", "thing", "things", "work", "works", "make", "makes", "need", "needs", "call",
        "calls", "use", "uses", "used", "using", "implementation", "implement", "implements",
        "functionality", "utilized", "utility", "helper", "simple", "basic", "actually",
        "really", "way", "part", "proper", "properly", "correct", "correctly", "create",
        "creates", "get", "gets", "set", "sets", "calculate", "calculates", "compute",
        "computes", "iterate", "iterates", "loop", "loops", "number", "numbers", "variable",
        "result", "results", "return", "returns", "step", "case", "cases",
    ]
    .into_iter()
    .collect()
});
