//! Languages comments can be extracted from.
//!
//! Each entry owns everything the extractor needs: how to build the grammar,
//! which node kinds hold comments and whether string docstrings count.

use std::path::Path;

use tree_sitter::{Language, Parser};

use crate::core::errors::{CommentaryError, Result};

/// Maturity of the extraction for a language, shown by `list-languages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageStability {
    Stable,
    Beta,
}

/// One supported language.
#[derive(Debug, Clone, Copy)]
pub struct LanguageInfo {
    /// Short key used in `SourceFile::language`, e.g. `"py"`.
    pub key: &'static str,
    pub name: &'static str,
    /// Other names accepted for `key`.
    pub aliases: &'static [&'static str],
    /// File extensions without the leading dot.
    pub extensions: &'static [&'static str],
    /// Grammar node kinds that hold comments.
    pub comment_kinds: &'static [&'static str],
    /// Leading string statements of definitions are docstrings.
    pub docstrings: bool,
    pub status: LanguageStability,
    /// Comment forms recognized, for display.
    pub notes: &'static str,
    grammar: fn() -> Language,
}

impl LanguageInfo {
    /// Parser configured for this language.
    pub fn parser(&self) -> Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&(self.grammar)()).map_err(|e| {
            CommentaryError::parse(self.key, format!("Failed to load grammar: {}", e))
        })?;
        Ok(parser)
    }

    fn answers_to(&self, name: &str) -> bool {
        self.key == name || self.aliases.contains(&name) || self.extensions.contains(&name)
    }
}

fn python() -> Language {
    tree_sitter_python::LANGUAGE.into()
}

fn typescript() -> Language {
    tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
}

fn javascript() -> Language {
    tree_sitter_javascript::LANGUAGE.into()
}

fn rust() -> Language {
    tree_sitter_rust::LANGUAGE.into()
}

fn go() -> Language {
    tree_sitter_go::LANGUAGE.into()
}

fn cpp() -> Language {
    tree_sitter_cpp::LANGUAGE.into()
}

static LANGUAGES: [LanguageInfo; 6] = [
    LanguageInfo {
        key: "py",
        name: "Python",
        aliases: &["python", "pyw"],
        extensions: &["py", "pyi"],
        comment_kinds: &["comment"],
        docstrings: true,
        status: LanguageStability::Stable,
        notes: "# comments, docstrings",
        grammar: python,
    },
    LanguageInfo {
        key: "ts",
        name: "TypeScript",
        aliases: &["typescript"],
        extensions: &["ts", "tsx", "cts", "mts"],
        comment_kinds: &["comment"],
        docstrings: false,
        status: LanguageStability::Stable,
        notes: "// and /* */ comments, JSDoc",
        grammar: typescript,
    },
    LanguageInfo {
        key: "js",
        name: "JavaScript",
        aliases: &["javascript", "node"],
        extensions: &["js", "jsx", "mjs", "cjs"],
        comment_kinds: &["comment"],
        docstrings: false,
        status: LanguageStability::Stable,
        notes: "// and /* */ comments, JSDoc",
        grammar: javascript,
    },
    LanguageInfo {
        key: "rs",
        name: "Rust",
        aliases: &["rust"],
        extensions: &["rs"],
        comment_kinds: &["line_comment", "block_comment"],
        docstrings: false,
        status: LanguageStability::Stable,
        notes: "//, /// and //! comments, /* */ blocks",
        grammar: rust,
    },
    LanguageInfo {
        key: "go",
        name: "Go",
        aliases: &["golang"],
        extensions: &["go"],
        comment_kinds: &["comment"],
        docstrings: false,
        status: LanguageStability::Beta,
        notes: "// and /* */ comments",
        grammar: go,
    },
    LanguageInfo {
        key: "cpp",
        name: "C++",
        aliases: &["c++", "cplusplus"],
        extensions: &["cpp", "cxx", "cc", "hpp", "hxx", "hh", "h"],
        comment_kinds: &["comment"],
        docstrings: false,
        status: LanguageStability::Beta,
        notes: "// and /* */ comments",
        grammar: cpp,
    },
];

/// All languages compiled into this build.
pub fn registered_languages() -> &'static [LanguageInfo] {
    &LANGUAGES
}

/// Resolve a language key, alias or extension.
pub fn language_info(language: &str) -> Result<&'static LanguageInfo> {
    let name = language.trim_start_matches('.').to_ascii_lowercase();
    LANGUAGES
        .iter()
        .find(|info| info.answers_to(&name))
        .ok_or_else(|| CommentaryError::unsupported(format!("Unsupported language: {}", language)))
}

/// Language key for a path, decided by its extension.
pub fn language_key_for_path(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    by_extension(ext).map(|info| info.key.to_string())
}

/// Whether files with this extension (leading dot optional) are analyzed.
pub fn extension_is_supported(ext: &str) -> bool {
    by_extension(ext).is_some()
}

fn by_extension(ext: &str) -> Option<&'static LanguageInfo> {
    let ext = ext.trim_start_matches('.');
    LANGUAGES
        .iter()
        .find(|info| info.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_from_paths() {
        let cases = [
            ("src/main.py", Some("py")),
            ("lib/index.MJS", Some("js")),
            ("ui/App.tsx", Some("ts")),
            ("include/vec.hpp", Some("cpp")),
            ("README", None),
            ("notes.txt", None),
        ];
        for (path, expected) in cases {
            assert_eq!(
                language_key_for_path(Path::new(path)).as_deref(),
                expected,
                "{}",
                path
            );
        }
    }

    #[test]
    fn test_aliases_and_extensions_resolve() {
        for (name, key) in [
            ("python", "py"),
            ("Golang", "go"),
            ("c++", "cpp"),
            ("jsx", "js"),
            (".rs", "rs"),
        ] {
            assert_eq!(language_info(name).unwrap().key, key);
        }
        assert!(matches!(
            language_info("cobol"),
            Err(CommentaryError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_extension_support() {
        assert!(extension_is_supported(".pyi"));
        assert!(extension_is_supported("TS"));
        assert!(!extension_is_supported("java"));
    }

    #[test]
    fn test_every_grammar_loads() {
        for info in registered_languages() {
            assert!(info.parser().is_ok(), "no parser for {}", info.key);
            assert!(!info.comment_kinds.is_empty());
        }
        let docstring_languages: Vec<_> = registered_languages()
            .iter()
            .filter(|info| info.docstrings)
            .map(|info| info.key)
            .collect();
        assert_eq!(docstring_languages, vec!["py"]);
    }
}
