//! Text normalization and similarity primitives.
//!
//! Comment prose and code snippets are reduced to token sequences here so the
//! classifier and the drift detector compare the same normalized forms.

use std::collections::HashSet;
use std::hash::Hash;

use once_cell::sync::Lazy;
use unicode_segmentation::UnicodeSegmentation;

/// Placeholder emitted for string literals in normalized code.
pub const STRING_LITERAL: &str = "<str>";
/// Placeholder emitted for numeric literals in normalized code.
pub const NUMBER_LITERAL: &str = "<num>";
/// Placeholder emitted for boolean literals in normalized code.
pub const BOOL_LITERAL: &str = "<bool>";
/// Placeholder emitted for identifiers in shape-only code.
pub const IDENTIFIER: &str = "<id>";

/// Keywords shared by the supported languages. Kept verbatim in code shapes.
static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "if", "else", "elif", "for", "while", "do", "loop", "return", "function", "def",
        "class", "struct", "enum", "impl", "trait", "fn", "let", "const", "var", "mut", "pub",
        "static", "match", "switch", "case", "default", "break", "continue", "import", "from",
        "export", "package", "func", "go", "defer", "async", "await", "yield", "new", "delete",
        "this", "self", "super", "try", "catch", "finally", "throw", "raise", "except", "with",
        "as", "in", "not", "and", "or", "is", "lambda", "pass", "null", "nil", "none",
        "undefined", "typeof", "instanceof", "void", "interface", "type", "where", "use", "mod",
        "crate", "unsafe", "namespace", "template", "typename", "public", "private",
        "protected", "virtual", "override",
    ]
    .into_iter()
    .collect()
});

/// Remove comment delimiters and decoration, returning the comment body.
pub fn strip_comment_delimiters(raw: &str) -> String {
    let trimmed = raw.trim();

    for (open, close) in [("\"\"\"", "\"\"\""), ("'''", "'''")] {
        if trimmed.len() >= open.len() + close.len()
            && trimmed.starts_with(open)
            && trimmed.ends_with(close)
        {
            let inner = &trimmed[open.len()..trimmed.len() - close.len()];
            return join_lines(inner.lines().map(str::trim));
        }
    }

    if let Some(rest) = trimmed.strip_prefix("/*") {
        let inner = rest.strip_suffix("*/").unwrap_or(rest);
        let inner = inner.trim_start_matches(['*', '!']);
        return join_lines(inner.lines().map(|line| {
            let line = line.trim();
            line.strip_prefix('*').map(str::trim).unwrap_or(line)
        }));
    }

    join_lines(trimmed.lines().map(|line| {
        let line = line.trim();
        let body = if let Some(rest) = line.strip_prefix("//") {
            rest.trim_start_matches(['/', '!'])
        } else if let Some(rest) = line.strip_prefix('#') {
            rest.trim_start_matches(['#', '!'])
        } else {
            line
        };
        body.trim()
    }))
}

fn join_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    lines
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Words whose `'s` contracts "is" or "us" rather than marking a possessive.
const S_CONTRACTIONS: &[&str] = &[
    "here", "there", "where", "that", "what", "who", "how", "it", "he", "she", "let",
];

/// Lower-cased words of a prose fragment, punctuation removed.
///
/// `'s` contractions are kept whole so `let's` never reads as `let`.
/// Possessive `'s` is dropped and other apostrophes are removed, so
/// `user's` becomes `user` and `don't` becomes `dont`.
pub fn prose_words(text: &str) -> Vec<String> {
    text.unicode_words()
        .map(|word| {
            let lower = word.to_lowercase().replace('\u{2019}', "'");
            let contraction = lower
                .strip_suffix("'s")
                .is_some_and(|stem| S_CONTRACTIONS.contains(&stem));
            if contraction {
                return lower;
            }
            lower.strip_suffix("'s").unwrap_or(&lower).replace('\'', "")
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// Split an identifier on `_`, `-` and camelCase boundaries.
pub fn split_identifier(identifier: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in identifier.chars() {
        if ch == '_' || ch == '-' {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Identifier vocabulary of a code snippet: whole identifiers plus their parts.
pub fn code_vocabulary(code: &str) -> HashSet<String> {
    let mut vocabulary = HashSet::new();
    for token in lex_code(code) {
        if let CodeToken::Word(word) = token {
            let parts = split_identifier(&word);
            vocabulary.insert(word.to_lowercase());
            vocabulary.extend(parts);
        }
    }
    vocabulary
}

/// Raw lexical token of a code snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeToken {
    /// Identifier or keyword, original case
    Word(String),
    /// Numeric literal
    Number,
    /// String or template literal
    Str,
    /// Any other non-whitespace character
    Punct(char),
}

/// Minimal language-agnostic lexer for single code lines.
pub fn lex_code(code: &str) -> Vec<CodeToken> {
    let chars: Vec<char> = code.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch.is_whitespace() {
            i += 1;
        } else if ch == '"' || ch == '\'' || ch == '`' {
            i += 1;
            while i < chars.len() && chars[i] != ch {
                if chars[i] == '\\' {
                    i += 1;
                }
                i += 1;
            }
            i += 1;
            tokens.push(CodeToken::Str);
        } else if ch.is_ascii_digit() {
            while i < chars.len()
                && (chars[i].is_ascii_alphanumeric() || chars[i] == '.' || chars[i] == '_')
            {
                i += 1;
            }
            tokens.push(CodeToken::Number);
        } else if ch.is_alphabetic() || ch == '_' || ch == '$' {
            let start = i;
            while i < chars.len()
                && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
            {
                i += 1;
            }
            tokens.push(CodeToken::Word(chars[start..i].iter().collect()));
        } else {
            tokens.push(CodeToken::Punct(ch));
            i += 1;
        }
    }

    tokens
}

/// Whether a word is a keyword of one of the supported languages.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(word.to_lowercase().as_str())
}

fn is_bool_literal(word: &str) -> bool {
    matches!(word, "true" | "false" | "True" | "False")
}

/// Code tokens with literals generalized and identifiers kept (lower-cased).
pub fn normalized_code_tokens(code: &str) -> Vec<String> {
    lex_code(code)
        .into_iter()
        .map(|token| match token {
            CodeToken::Word(word) if is_bool_literal(&word) => BOOL_LITERAL.to_string(),
            CodeToken::Word(word) => word.to_lowercase(),
            CodeToken::Number => NUMBER_LITERAL.to_string(),
            CodeToken::Str => STRING_LITERAL.to_string(),
            CodeToken::Punct(ch) => ch.to_string(),
        })
        .collect()
}

/// Structural shape of normalized tokens: identifiers generalized, keywords kept.
pub fn code_shape(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .map(|token| {
            let is_word = token
                .chars()
                .next()
                .map(|c| c.is_alphabetic() || c == '_' || c == '$')
                .unwrap_or(false);
            if is_word && !is_keyword(token) {
                IDENTIFIER.to_string()
            } else {
                token.clone()
            }
        })
        .collect()
}

/// Jaccard index of two sets. Two empty sets are identical.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// `1 - levenshtein / max_len` over token sequences.
pub fn sequence_similarity<T: PartialEq>(a: &[T], b: &[T]) -> f64 {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    let distance = levenshtein(a, b);
    1.0 - distance as f64 / longest as f64
}

fn levenshtein<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, item_a) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, item_b) in b.iter().enumerate() {
            let cost = usize::from(item_a != item_b);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Optimal string alignment distance (Levenshtein plus adjacent transposition).
pub fn osa_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (n, m) = (a.len(), b.len());
    let mut table = vec![vec![0usize; m + 1]; n + 1];

    for (i, row) in table.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=m {
        table[0][j] = j;
    }

    for i in 1..=n {
        for j in 1..=m {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (table[i - 1][j] + 1)
                .min(table[i][j - 1] + 1)
                .min(table[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(table[i - 2][j - 2] + 1);
            }
            table[i][j] = best;
        }
    }

    table[n][m]
}

/// Crude suffix stripping used to compare prose against identifiers.
pub fn stem(word: &str) -> String {
    const SUFFIXES: [&str; 10] = [
        "ations", "ation", "ings", "ing", "edly", "ed", "es", "ly", "er", "s",
    ];
    for suffix in SUFFIXES {
        if let Some(base) = word.strip_suffix(suffix) {
            if base.chars().count() >= 3 {
                return base.to_string();
            }
        }
    }
    word.to_string()
}

/// Whether a prose word restates one of the identifiers in `vocabulary`.
pub fn restates_identifier(word: &str, vocabulary: &HashSet<String>) -> bool {
    vocabulary.contains(word) || vocabulary.iter().any(|identifier| restates(word, identifier))
}

/// Whether a prose word names the same thing as a single identifier part.
pub fn restates(word: &str, identifier: &str) -> bool {
    if word == identifier {
        return true;
    }
    let word_len = word.chars().count();
    let ident_len = identifier.chars().count();
    stem(identifier) == stem(word)
        || shared_prefix_len(word, identifier) >= 6
        || (ident_len >= 4 && word_len <= ident_len + 3 && word.starts_with(identifier))
}

fn shared_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}
