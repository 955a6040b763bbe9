//! Read-only view of a decorator call expression.
//!
//! Extraction rules never touch a concrete parser's node types. They read
//! calls through the [`CallSyntax`] capability, which exposes only the callee
//! name and the literal value of each argument. Two implementations ship
//! with the crate:
//!
//! - [`CallExpr`]: an owned call, for callers that already hold decorator
//!   data in their own representation (and for tests)
//! - `treesitter::TsCall`: a view over a tree-sitter TypeScript
//!   `call_expression` node (feature `tree-sitter`)

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(feature = "tree-sitter")]
pub mod treesitter;

/// Literal value of a call argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    /// String literal (quotes removed, escapes decoded).
    String(String),
    /// Numeric literal.
    Number(f64),
    /// `true` / `false`.
    Bool(bool),
    /// `null` or `undefined`.
    Null,
    /// Array literal, elements in source order.
    Array(Vec<Literal>),
    /// Any expression that is not a literal (identifier, call, object, ...).
    Other {
        /// Syntax kind of the expression (e.g. "identifier").
        kind: String,
        /// Source text of the expression.
        text: String,
    },
}

impl Literal {
    /// Returns the string value if this is a string literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer if this is a whole-number literal.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Literal::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
            _ => None,
        }
    }

    /// Short name of the literal kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Literal::String(_) => "string",
            Literal::Number(_) => "number",
            Literal::Bool(_) => "boolean",
            Literal::Null => "null",
            Literal::Array(_) => "array",
            Literal::Other { .. } => "expression",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "{:?}", s),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Null => write!(f, "null"),
            Literal::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Literal::Other { text, .. } => write!(f, "{}", text),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<i32> for Literal {
    fn from(n: i32) -> Self {
        Literal::Number(f64::from(n))
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Number(n as f64)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl<L: Into<Literal>> From<Vec<L>> for Literal {
    fn from(items: Vec<L>) -> Self {
        Literal::Array(items.into_iter().map(Into::into).collect())
    }
}

/// Capability set an extraction rule needs from a call expression.
///
/// Any syntax representation (tree, token list, pre-decoded metadata) that
/// can answer these questions can drive the extractors.
pub trait CallSyntax {
    /// Name of the called function (`Get` for both `Get()` and `Http.Get()`).
    fn callee(&self) -> Cow<'_, str>;

    /// Number of arguments in the call.
    fn arg_count(&self) -> usize;

    /// Literal value of the argument at `index`, or None if absent.
    fn arg(&self, index: usize) -> Option<Literal>;

    /// All arguments in source order.
    fn args(&self) -> Vec<Literal> {
        (0..self.arg_count()).filter_map(|i| self.arg(i)).collect()
    }

    /// String value of the argument at `index`, if it is a string literal.
    fn string_arg(&self, index: usize) -> Option<String> {
        match self.arg(index) {
            Some(Literal::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl<C: CallSyntax + ?Sized> CallSyntax for &C {
    fn callee(&self) -> Cow<'_, str> {
        (**self).callee()
    }

    fn arg_count(&self) -> usize {
        (**self).arg_count()
    }

    fn arg(&self, index: usize) -> Option<Literal> {
        (**self).arg(index)
    }
}

/// An owned call expression.
///
/// ```
/// use routemeta::syntax::{CallExpr, CallSyntax};
///
/// let call = CallExpr::new("Get").with_arg("/:id");
/// assert_eq!(call.callee(), "Get");
/// assert_eq!(call.string_arg(0).as_deref(), Some("/:id"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub callee: String,
    #[serde(default)]
    pub args: Vec<Literal>,
}

impl CallExpr {
    /// Create a call with no arguments.
    pub fn new(callee: impl Into<String>) -> Self {
        Self {
            callee: callee.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument.
    pub fn with_arg(mut self, arg: impl Into<Literal>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl CallSyntax for CallExpr {
    fn callee(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.callee)
    }

    fn arg_count(&self) -> usize {
        self.args.len()
    }

    fn arg(&self, index: usize) -> Option<Literal> {
        self.args.get(index).cloned()
    }
}
