//! Comment extraction on top of the tree-sitter grammars.
//!
//! Only comment locations are taken from the syntax tree. Adjacent code is
//! recovered from the raw text line by line, which keeps the extractor the
//! same for every language.

use tree_sitter::Node;

use crate::core::errors::{CommentaryError, Result};
use crate::core::model::{CommentKind, CommentSpan};
use crate::lang::registry::{language_info, LanguageInfo};

/// Located comment before its context is resolved.
#[derive(Debug, Clone, Copy)]
struct RawComment {
    start: usize,
    end: usize,
    /// Python docstring rather than a comment node
    docstring: bool,
    /// Byte offset of the definition a docstring belongs to
    owner: Option<usize>,
    /// Byte range of the enclosing code block
    context: Option<(usize, usize)>,
}

/// Extracts comment spans from source text.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommentExtractor;

impl CommentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every comment of `source`, ascending by start offset.
    pub fn extract(&self, file_id: &str, source: &str, language: &str) -> Result<Vec<CommentSpan>> {
        let info = language_info(language)?;
        let mut parser = info.parser()?;
        let tree = parser.parse(source, None).ok_or_else(|| {
            CommentaryError::parse_in_file(info.key, "parser produced no syntax tree", file_id)
        })?;

        let mut raw = collect_comments(tree.root_node(), info, source);
        raw.sort_by_key(|comment| comment.start);
        raw.dedup_by_key(|comment| comment.start);

        let lines = LineIndex::new(source);
        let ranges: Vec<(usize, usize)> = raw.iter().map(|c| (c.start, c.end)).collect();

        raw.iter()
            .map(|comment| {
                let raw_text = &source[comment.start..comment.end];
                let kind = if comment.docstring || raw_text.starts_with("/*") {
                    CommentKind::Block
                } else {
                    CommentKind::Line
                };
                let (adjacent_code, anchor_offset) =
                    adjacent_code(source, &lines, &ranges, comment);
                let (context_code, context_offset) = match comment.context {
                    Some((start, end)) => (code_between(source, start, end, &ranges), start),
                    None => (String::new(), 0),
                };

                let span = CommentSpan {
                    file_id: file_id.to_string(),
                    start: comment.start,
                    end: comment.end,
                    line: lines.line_of(comment.start) + 1,
                    kind,
                    raw_text: raw_text.to_string(),
                    adjacent_code,
                    anchor_offset,
                    context_code,
                    context_offset,
                };
                span.validate()?;
                Ok(span)
            })
            .collect()
    }
}

fn collect_comments(root: Node<'_>, info: &LanguageInfo, source: &str) -> Vec<RawComment> {
    let mut found = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if info.comment_kinds.contains(&node.kind()) {
            let start = node.start_byte();
            // Some grammars include the terminating newline in line comments.
            let end = start + source[start..node.end_byte()].trim_end().len();
            if end > start {
                found.push(RawComment {
                    start,
                    end,
                    docstring: false,
                    owner: None,
                    context: context_range(node, info),
                });
            }
            continue;
        }

        if info.docstrings {
            if let Some(mut docstring) = python_docstring(node) {
                if docstring.context.is_none() {
                    docstring.context = context_range(node, info);
                }
                found.push(docstring);
                continue;
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }

    found
}

/// A docstring is the first statement of a module, function or class body
/// when that statement is a bare string.
fn python_docstring(node: Node<'_>) -> Option<RawComment> {
    if node.kind() != "expression_statement" || node.named_child_count() != 1 {
        return None;
    }
    let mut cursor = node.walk();
    let is_string = node
        .named_children(&mut cursor)
        .next()
        .map(|child| child.kind() == "string")
        .unwrap_or(false);
    if !is_string {
        return None;
    }

    let parent = node.parent()?;
    let mut cursor = parent.walk();
    let first_statement = parent
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment")?;
    if first_statement.start_byte() != node.start_byte() {
        return None;
    }

    let definition = match parent.kind() {
        "module" => None,
        "block" => {
            let definition = parent.parent()?;
            if !matches!(definition.kind(), "function_definition" | "class_definition") {
                return None;
            }
            Some(definition)
        }
        _ => return None,
    };

    Some(RawComment {
        start: node.start_byte(),
        end: node.end_byte(),
        docstring: true,
        owner: definition.map(|d| d.start_byte()),
        context: definition.map(|d| (d.start_byte(), d.end_byte())),
    })
}

/// Byte range of the code block a comment belongs to.
///
/// Below the top level this is the node holding the comment, usually a
/// function or statement body. At the top level it is the statement the
/// comment documents together with its neighbouring statements.
fn context_range(node: Node<'_>, info: &LanguageInfo) -> Option<(usize, usize)> {
    let parent = node.parent()?;
    if parent.parent().is_some() {
        return Some((parent.start_byte(), parent.end_byte()));
    }

    let is_code = |candidate: &Node<'_>| !info.comment_kinds.contains(&candidate.kind());
    let row = node.start_position().row;
    let documented = match siblings(node, Node::prev_named_sibling).find(is_code) {
        Some(previous) if previous.end_position().row == row => previous,
        _ => siblings(node, Node::next_named_sibling).find(is_code)?,
    };
    let first = siblings(documented, Node::prev_named_sibling)
        .find(is_code)
        .unwrap_or(documented);
    let last = siblings(documented, Node::next_named_sibling)
        .find(is_code)
        .unwrap_or(documented);
    Some((first.start_byte(), last.end_byte()))
}

fn siblings<'t>(
    node: Node<'t>,
    step: fn(&Node<'t>) -> Option<Node<'t>>,
) -> impl Iterator<Item = Node<'t>> {
    std::iter::successors(step(&node), move |current| step(current))
}

/// Code documented by a comment and the offset of the line it sits on.
///
/// Trailing comments document the code before them on the same line;
/// docstrings document their definition line; everything else documents the
/// next line that has code once comments are removed.
fn adjacent_code(
    source: &str,
    lines: &LineIndex,
    comments: &[(usize, usize)],
    comment: &RawComment,
) -> (String, usize) {
    if let Some(owner) = comment.owner {
        let line = lines.line_of(owner);
        let (start, end) = lines.bounds(line, source.len());
        return (code_between(source, start, end, comments), start);
    }

    let line = lines.line_of(comment.start);
    let (line_start, _) = lines.bounds(line, source.len());
    let before = code_between(source, line_start, comment.start, comments);
    if !before.is_empty() {
        return (before, line_start);
    }

    let mut next = lines.line_of(comment.end) + 1;
    while next < lines.len() {
        let (start, end) = lines.bounds(next, source.len());
        let code = code_between(source, start, end, comments);
        if !code.is_empty() {
            return (code, start);
        }
        next += 1;
    }

    (String::new(), source.len())
}

/// Text of `start..end` with comment bytes removed, trimmed.
fn code_between(source: &str, start: usize, end: usize, comments: &[(usize, usize)]) -> String {
    let mut code = String::new();
    let mut cursor = start;
    for &(c_start, c_end) in comments {
        if c_end <= cursor || c_start >= end {
            continue;
        }
        if c_start > cursor {
            code.push_str(&source[cursor..c_start]);
        }
        cursor = cursor.max(c_end.min(end));
    }
    if cursor < end {
        code.push_str(&source[cursor..end]);
    }
    code.trim().to_string()
}

/// Byte offsets of line starts.
#[derive(Debug)]
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(offset, _)| offset + 1),
        );
        Self { starts }
    }

    fn len(&self) -> usize {
        self.starts.len()
    }

    /// 0-based line containing `offset`.
    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset) - 1
    }

    /// Byte range of a line, newline excluded.
    fn bounds(&self, line: usize, source_len: usize) -> (usize, usize) {
        let start = self.starts[line];
        let end = self
            .starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(source_len);
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JS: &str = "// Adds two numbers\nfunction add(a, b) {\n  return a + b; // sum\n}\n";

    #[test]
    fn test_line_comment_documents_next_line() {
        let spans = CommentExtractor::new().extract("add.js", JS, "js").unwrap();
        assert_eq!(spans.len(), 2);

        let first = &spans[0];
        assert_eq!(first.raw_text, "// Adds two numbers");
        assert_eq!(first.kind, CommentKind::Line);
        assert_eq!(first.line, 1);
        assert_eq!(first.adjacent_code, "function add(a, b) {");
        assert_eq!(&JS[first.start..first.end], first.raw_text);
    }

    #[test]
    fn test_trailing_comment_documents_its_own_line() {
        let spans = CommentExtractor::new().extract("add.js", JS, "js").unwrap();
        let trailing = &spans[1];
        assert_eq!(trailing.raw_text, "// sum");
        assert_eq!(trailing.adjacent_code, "return a + b;");
        assert_eq!(trailing.line, 3);
    }

    #[test]
    fn test_context_is_enclosing_block_without_comments() {
        let spans = CommentExtractor::new().extract("add.js", JS, "js").unwrap();

        let leading = &spans[0];
        assert_eq!(leading.context_offset, JS.find("function").unwrap());
        assert!(leading.context_code.starts_with("function add(a, b) {"));
        assert!(leading.context_code.ends_with('}'));

        let trailing = &spans[1];
        assert!(trailing.context_code.starts_with('{'));
        assert!(trailing.context_code.contains("return a + b;"));
        assert!(!trailing.context_code.contains("sum"));
    }

    #[test]
    fn test_same_last_line_in_different_functions_has_different_context() {
        let source = concat!(
            "function load(path) {\n",
            "  const result = read(path);\n",
            "  // parsed config\n",
            "  return result;\n",
            "}\n",
            "\n",
            "function total(items) {\n",
            "  let result = 0;\n",
            "  for (const item of items) { result += item.price; }\n",
            "  // running sum\n",
            "  return result;\n",
            "}\n",
        );
        let spans = CommentExtractor::new().extract("m.js", source, "js").unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].adjacent_code, spans[1].adjacent_code);
        assert_ne!(spans[0].context_code, spans[1].context_code);
        assert_ne!(spans[0].context_offset, spans[1].context_offset);
    }

    #[test]
    fn test_stacked_comments_share_anchor() {
        let source = "// one\n// two\n\nconst x = 1;\n";
        let spans = CommentExtractor::new().extract("x.js", source, "js").unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].anchor_offset, spans[1].anchor_offset);
        assert_eq!(spans[0].adjacent_code, "const x = 1;");
    }

    #[test]
    fn test_block_comment() {
        let source = "/* Compare the\n   hashes. */\nif (a === b) {\n}\n";
        let spans = CommentExtractor::new().extract("x.ts", source, "ts").unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, CommentKind::Block);
        assert_eq!(spans[0].adjacent_code, "if (a === b) {");
    }

    #[test]
    fn test_python_docstring_documents_definition() {
        let source = concat!(
            "def is_prime(num):\n",
            "    \"\"\"Check primality.\"\"\"\n",
            "    # small numbers\n",
            "    if num < 2:\n",
            "        return False\n",
        );
        let spans = CommentExtractor::new().extract("p.py", source, "py").unwrap();
        assert_eq!(spans.len(), 2);

        let docstring = &spans[0];
        assert_eq!(docstring.kind, CommentKind::Block);
        assert_eq!(docstring.adjacent_code, "def is_prime(num):");
        assert_eq!(docstring.anchor_offset, 0);
        assert_eq!(docstring.context_offset, 0);
        assert!(docstring.context_code.contains("return False"));
        assert!(!docstring.context_code.contains("primality"));

        assert_eq!(spans[1].raw_text, "# small numbers");
        assert_eq!(spans[1].adjacent_code, "if num < 2:");
    }

    #[test]
    fn test_rust_line_comments_exclude_newline() {
        let source = "/// Doc line\nfn main() {}\n";
        let spans = CommentExtractor::new().extract("m.rs", source, "rust").unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].raw_text, "/// Doc line");
        assert_eq!(spans[0].adjacent_code, "fn main() {}");
    }

    #[test]
    fn test_unknown_language_is_unsupported() {
        let err = CommentExtractor::new()
            .extract("x.cob", "* comment", "cobol")
            .unwrap_err();
        assert!(matches!(err, CommentaryError::Unsupported { .. }));
    }

    #[test]
    fn test_comment_at_end_of_file_has_no_code() {
        let spans = CommentExtractor::new()
            .extract("x.go", "package main\n// trailing note", "go")
            .unwrap();
        assert_eq!(spans.len(), 1);
        assert!(spans[0].adjacent_code.is_empty());
    }
}
