//! Tree-sitter backed call syntax for TypeScript sources.
//!
//! Callers that already walk a tree-sitter tree wrap the decorator's
//! `call_expression` node with [`TsCall::from_node`] (or the decorator node
//! itself with [`TsCall::from_decorator`]). [`parse`] turns a standalone
//! snippet such as `Get('/:id')` into a tree and locates its call.

use std::borrow::Cow;
use std::fmt;

use once_cell::sync::OnceCell;
use streaming_iterator::StreamingIterator;
use tracing::{trace, warn};
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, Tree};

use super::{CallSyntax, Literal};

/// Tree-sitter query matching every call expression.
const CALL_QUERY: &str = r#"
(call_expression) @call
"#;

/// Compiled call queries, one per dialect.
static TYPESCRIPT_CALL_QUERY: OnceCell<Query> = OnceCell::new();
static TSX_CALL_QUERY: OnceCell<Query> = OnceCell::new();

/// Grammar used to parse a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    TypeScript,
    Tsx,
}

impl Dialect {
    /// The tree-sitter language for this dialect.
    pub fn language(self) -> Language {
        match self {
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// The call-expression query for this dialect, compiled on first use.
    fn call_query(self) -> anyhow::Result<&'static Query> {
        let cell = match self {
            Dialect::TypeScript => &TYPESCRIPT_CALL_QUERY,
            Dialect::Tsx => &TSX_CALL_QUERY,
        };
        let query = cell.get_or_try_init(|| Query::new(&self.language(), CALL_QUERY))?;
        Ok(query)
    }

    /// Pick a dialect from a file extension (without dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "ts" | "mts" | "cts" => Some(Dialect::TypeScript),
            "tsx" => Some(Dialect::Tsx),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::TypeScript => write!(f, "typescript"),
            Dialect::Tsx => write!(f, "tsx"),
        }
    }
}

/// A parsed source snippet.
///
/// Owns the tree and the source bytes so [`TsCall`] views can borrow both.
pub struct ParsedSource {
    tree: Tree,
    source: Vec<u8>,
    dialect: Dialect,
}

/// Parse a TypeScript source snippet.
///
/// Syntax errors do not fail the parse; the tree keeps ERROR nodes and
/// [`ParsedSource::has_errors`] reports them.
pub fn parse(source: &str, dialect: Dialect) -> anyhow::Result<ParsedSource> {
    let mut parser = Parser::new();
    parser.set_language(&dialect.language())?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| anyhow::anyhow!("failed to parse {} source", dialect))?;

    if tree.root_node().has_error() {
        warn!(%dialect, "source parsed with syntax errors");
    }
    trace!(%dialect, bytes = source.len(), "parsed source");

    Ok(ParsedSource {
        tree,
        source: source.as_bytes().to_vec(),
        dialect,
    })
}

impl ParsedSource {
    /// The tree-sitter tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The original source bytes.
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// The dialect the source was parsed with.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Whether the tree contains ERROR or MISSING nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// The first call expression in document order.
    ///
    /// For nested calls (`Get(path())`) the outermost one is returned.
    pub fn first_call(&self) -> anyhow::Result<Option<TsCall<'_>>> {
        let query = self.dialect.call_query()?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, self.tree.root_node(), &self.source[..]);

        let mut first: Option<Node> = None;
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let node = capture.node;
                let earlier = match first {
                    None => true,
                    Some(current) => {
                        (node.start_byte(), std::cmp::Reverse(node.end_byte()))
                            < (current.start_byte(), std::cmp::Reverse(current.end_byte()))
                    }
                };
                if earlier {
                    first = Some(node);
                }
            }
        }

        Ok(first.and_then(|node| TsCall::from_node(node, &self.source)))
    }
}

/// A `call_expression` node viewed through [`CallSyntax`].
#[derive(Clone, Copy)]
pub struct TsCall<'tree> {
    node: Node<'tree>,
    source: &'tree [u8],
}

impl<'tree> TsCall<'tree> {
    /// Wrap a `call_expression` node. Returns None for any other node kind.
    pub fn from_node(node: Node<'tree>, source: &'tree [u8]) -> Option<Self> {
        (node.kind() == "call_expression").then_some(Self { node, source })
    }

    /// Wrap the call inside a `decorator` node (`@Get('/')`).
    ///
    /// Returns None for bare decorators (`@Injectable`) and non-decorator nodes.
    pub fn from_decorator(node: Node<'tree>, source: &'tree [u8]) -> Option<Self> {
        if node.kind() != "decorator" {
            return None;
        }
        let mut cursor = node.walk();
        let call = node
            .named_children(&mut cursor)
            .find(|n| n.kind() == "call_expression");
        call.and_then(|n| Self::from_node(n, source))
    }

    /// The underlying node.
    pub fn node(&self) -> Node<'tree> {
        self.node
    }

    fn text(&self, node: Node<'tree>) -> &'tree str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn arg_nodes(&self) -> Vec<Node<'tree>> {
        let args = match self.node.child_by_field_name("arguments") {
            Some(n) if n.kind() == "arguments" => n,
            // Tagged templates (`Get`/path/`) carry no argument list
            _ => return Vec::new(),
        };
        let mut cursor = args.walk();
        let nodes: Vec<_> = args
            .named_children(&mut cursor)
            .filter(|n| n.kind() != "comment")
            .collect();
        nodes
    }
}

impl CallSyntax for TsCall<'_> {
    fn callee(&self) -> Cow<'_, str> {
        let function = match self.node.child_by_field_name("function") {
            Some(f) => f,
            None => return Cow::Borrowed(""),
        };
        let name_node = match function.kind() {
            "member_expression" => function.child_by_field_name("property").unwrap_or(function),
            _ => function,
        };
        Cow::Borrowed(self.text(name_node))
    }

    fn arg_count(&self) -> usize {
        self.arg_nodes().len()
    }

    fn arg(&self, index: usize) -> Option<Literal> {
        self.arg_nodes()
            .get(index)
            .map(|node| literal_from_node(*node, self.source))
    }
}

impl fmt::Debug for TsCall<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TsCall")
            .field("text", &self.text(self.node))
            .field("start_byte", &self.node.start_byte())
            .finish()
    }
}

/// Convert an expression node into a [`Literal`].
fn literal_from_node(node: Node, source: &[u8]) -> Literal {
    let text = node.utf8_text(source).unwrap_or("");
    match node.kind() {
        "string" => Literal::String(decode_fragments(node, source)),
        "template_string" => {
            let mut cursor = node.walk();
            let has_substitution = node
                .named_children(&mut cursor)
                .any(|n| n.kind() == "template_substitution");
            if has_substitution {
                other(node, text)
            } else {
                Literal::String(decode_fragments(node, source))
            }
        }
        "number" => parse_number(text)
            .map(Literal::Number)
            .unwrap_or_else(|| other(node, text)),
        "true" => Literal::Bool(true),
        "false" => Literal::Bool(false),
        "null" | "undefined" => Literal::Null,
        "array" => {
            let mut cursor = node.walk();
            let items: Vec<_> = node
                .named_children(&mut cursor)
                .filter(|n| n.kind() != "comment")
                .map(|n| literal_from_node(n, source))
                .collect();
            Literal::Array(items)
        }
        "unary_expression" => {
            let operator = node
                .child_by_field_name("operator")
                .and_then(|n| n.utf8_text(source).ok());
            let argument = node
                .child_by_field_name("argument")
                .map(|n| literal_from_node(n, source));
            match (operator, argument) {
                (Some("-"), Some(Literal::Number(n))) => Literal::Number(-n),
                (Some("+"), Some(Literal::Number(n))) => Literal::Number(n),
                _ => other(node, text),
            }
        }
        // `(x)`, `x as const`, `x satisfies T`, `x!`
        "parenthesized_expression" | "as_expression" | "satisfies_expression"
        | "non_null_expression" => match node.named_child(0) {
            Some(inner) => literal_from_node(inner, source),
            None => other(node, text),
        },
        _ => other(node, text),
    }
}

fn other(node: Node, text: &str) -> Literal {
    Literal::Other {
        kind: node.kind().to_string(),
        text: text.to_string(),
    }
}

/// Text between the delimiters of a string or template node, escapes decoded.
///
/// Works on byte ranges so it does not depend on how the grammar exposes
/// the raw fragments.
fn decode_fragments(node: Node, source: &[u8]) -> String {
    if node.end_byte() < node.start_byte() + 2 {
        return String::new();
    }
    let end = node.end_byte() - 1;
    let mut pos = node.start_byte() + 1;
    let mut out = String::new();

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "escape_sequence" || child.start_byte() < pos {
            continue;
        }
        out.push_str(source_slice(source, pos, child.start_byte()));
        push_escape(&mut out, child.utf8_text(source).unwrap_or(""));
        pos = child.end_byte();
    }
    if pos < end {
        out.push_str(source_slice(source, pos, end));
    }
    out
}

fn source_slice(source: &[u8], from: usize, to: usize) -> &str {
    source
        .get(from..to)
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
        .unwrap_or("")
}

fn push_escape(out: &mut String, seq: &str) {
    let body = match seq.strip_prefix('\\') {
        Some(b) => b,
        None => {
            out.push_str(seq);
            return;
        }
    };

    let mut chars = body.chars();
    let decoded = match chars.next() {
        Some('n') => Some('\n'),
        Some('t') => Some('\t'),
        Some('r') => Some('\r'),
        Some('b') => Some('\u{8}'),
        Some('f') => Some('\u{c}'),
        Some('v') => Some('\u{b}'),
        Some('0') if body.len() == 1 => Some('\0'),
        Some('x') => hex_char(&body[1..]),
        Some('u') => hex_char(body[1..].trim_start_matches('{').trim_end_matches('}')),
        // Line continuation
        Some('\n') | Some('\r') | Some('\u{2028}') | Some('\u{2029}') => return,
        Some(c) => Some(c),
        None => None,
    };

    match decoded {
        Some(c) => out.push(c),
        None => out.push_str(seq),
    }
}

fn hex_char(digits: &str) -> Option<char> {
    u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
}

/// Parse a JavaScript numeric literal (`200`, `1_000`, `0x1F`, `2e3`).
fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();
    let cleaned = cleaned.trim_end_matches('n');

    let radix = if cleaned.starts_with("0x") {
        16
    } else if cleaned.starts_with("0o") {
        8
    } else if cleaned.starts_with("0b") {
        2
    } else {
        return cleaned.parse().ok();
    };

    u64::from_str_radix(&cleaned[2..], radix)
        .ok()
        .map(|v| v as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_call_args(source: &str) -> (String, Vec<Literal>) {
        let parsed = parse(source, Dialect::TypeScript).unwrap();
        let call = parsed.first_call().unwrap().expect("call expression");
        (call.callee().into_owned(), call.args())
    }

    #[test]
    fn test_simple_call() {
        let (callee, args) = first_call_args("Controller('test')");
        assert_eq!(callee, "Controller");
        assert_eq!(args, vec![Literal::from("test")]);
    }

    #[test]
    fn test_member_callee() {
        let (callee, args) = first_call_args("Http.Get(\"/users\")");
        assert_eq!(callee, "Get");
        assert_eq!(args, vec![Literal::from("/users")]);
    }

    #[test]
    fn test_no_arguments() {
        let (callee, args) = first_call_args("Get()");
        assert_eq!(callee, "Get");
        assert!(args.is_empty());
    }

    #[test]
    fn test_outermost_call_is_first() {
        let (callee, args) = first_call_args("Get(prefix('/a'))");
        assert_eq!(callee, "Get");
        assert_eq!(args.len(), 1);
        assert!(matches!(&args[0], Literal::Other { kind, .. } if kind == "call_expression"));
    }

    #[test]
    fn test_string_escapes() {
        let (_, args) = first_call_args(r#"ContentType('it\'s\tA\x42')"#);
        assert_eq!(args, vec![Literal::from("it's\tAB")]);
    }

    #[test]
    fn test_empty_string() {
        let (_, args) = first_call_args("Controller('')");
        assert_eq!(args, vec![Literal::from("")]);
    }

    #[test]
    fn test_template_strings() {
        let (_, args) = first_call_args("Get(`/plain`, `/x/${id}`)");
        assert_eq!(args[0], Literal::from("/plain"));
        assert!(matches!(&args[1], Literal::Other { kind, .. } if kind == "template_string"));
    }

    #[test]
    fn test_numbers() {
        let (_, args) = first_call_args("HttpCode(200, 0x1F, 1_000, -5)");
        assert_eq!(
            args,
            vec![
                Literal::Number(200.0),
                Literal::Number(31.0),
                Literal::Number(1000.0),
                Literal::Number(-5.0),
            ]
        );
    }

    #[test]
    fn test_arrays_and_keywords() {
        let (_, args) = first_call_args("Authorize(['a', /* note */ 'b'] as const, true, null, undefined)");
        assert_eq!(
            args,
            vec![
                Literal::from(vec!["a", "b"]),
                Literal::Bool(true),
                Literal::Null,
                Literal::Null,
            ]
        );
    }

    #[test]
    fn test_comments_between_arguments() {
        let (_, args) = first_call_args("Method(/* verb */ 'get', '/x')");
        assert_eq!(args, vec![Literal::from("get"), Literal::from("/x")]);
    }

    #[test]
    fn test_identifier_argument() {
        let (_, args) = first_call_args("HttpCode(HttpStatus.OK)");
        assert!(matches!(&args[0], Literal::Other { kind, text } if kind == "member_expression" && text == "HttpStatus.OK"));
    }

    #[test]
    fn test_no_call() {
        let parsed = parse("const x = 1;", Dialect::TypeScript).unwrap();
        assert!(parsed.first_call().unwrap().is_none());
    }

    #[test]
    fn test_from_decorator() {
        let source = r#"
@Controller('/users')
@Injectable
class UsersController {}
"#;
        let parsed = parse(source, Dialect::TypeScript).unwrap();
        let language = parsed.dialect().language();
        let query = Query::new(&language, "(decorator) @decorator").unwrap();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree().root_node(), parsed.source());

        let mut calls = Vec::new();
        let mut bare = 0;
        while let Some(m) = matches.next() {
            for capture in m.captures {
                match TsCall::from_decorator(capture.node, parsed.source()) {
                    Some(call) => calls.push(call.callee().into_owned()),
                    None => bare += 1,
                }
            }
        }

        assert_eq!(calls, vec!["Controller".to_string()]);
        assert_eq!(bare, 1);
    }

    #[test]
    fn test_from_node_rejects_other_kinds() {
        let parsed = parse("Get()", Dialect::TypeScript).unwrap();
        assert!(TsCall::from_node(parsed.tree().root_node(), parsed.source()).is_none());
    }

    #[test]
    fn test_tsx_dialect() {
        let parsed = parse("Get('/a')", Dialect::Tsx).unwrap();
        assert_eq!(parsed.dialect(), Dialect::Tsx);
        assert!(parsed.first_call().unwrap().is_some());
        assert_eq!(Dialect::from_extension("tsx"), Some(Dialect::Tsx));
        assert_eq!(Dialect::from_extension("mts"), Some(Dialect::TypeScript));
        assert_eq!(Dialect::from_extension("py"), None);
    }

    #[test]
    fn test_call_query_is_compiled_once() {
        let first = Dialect::TypeScript.call_query().unwrap();
        let second = Dialect::TypeScript.call_query().unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(!std::ptr::eq(first, Dialect::Tsx.call_query().unwrap()));

        for source in ["Get('/a')", "Post('/b')"] {
            let parsed = parse(source, Dialect::TypeScript).unwrap();
            assert!(parsed.first_call().unwrap().is_some());
        }
    }

    #[test]
    fn test_parse_number_forms() {
        assert_eq!(parse_number("2e3"), Some(2000.0));
        assert_eq!(parse_number("0b101"), Some(5.0));
        assert_eq!(parse_number("0o17"), Some(15.0));
        assert_eq!(parse_number("10n"), Some(10.0));
        assert_eq!(parse_number("abc"), None);
    }
}
