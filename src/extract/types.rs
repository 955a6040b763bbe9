//! Records produced by the extraction rules.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Route prefix declared on a controller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub path: String,
}

/// HTTP method and normalized path of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodAction {
    /// Lowercase HTTP verb (e.g. "get").
    pub method: String,
    /// Path with `:name` segments rewritten to `{name}`.
    pub path: String,
}

/// Response declared on an endpoint.
///
/// `T` is the caller's type descriptor. It is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodResponse<T> {
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<T>,
}

/// A role (or comma-joined role list) required to call an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRequirement {
    pub name: String,
}

/// Decorator family a call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoratorKind {
    /// Controller route prefix (`Controller('/users')`).
    RoutePrefix,
    /// Verb-named route (`Get('/:id')`).
    Verb,
    /// Generic verb + path route (`Method('get', '/:id')`).
    GenericMethod,
    /// Explicit status code (`HttpCode(201)`).
    StatusCode,
    /// Redirect response (`Redirect('https://...')`).
    Redirect,
    /// Required roles (`Authorize('admin')`).
    Security,
    /// Response content type (`ContentType('text/csv')`).
    Produce,
}

impl DecoratorKind {
    /// All kinds, in declaration order.
    pub const ALL: [DecoratorKind; 7] = [
        DecoratorKind::RoutePrefix,
        DecoratorKind::Verb,
        DecoratorKind::GenericMethod,
        DecoratorKind::StatusCode,
        DecoratorKind::Redirect,
        DecoratorKind::Security,
        DecoratorKind::Produce,
    ];

    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DecoratorKind::RoutePrefix => "route_prefix",
            DecoratorKind::Verb => "verb",
            DecoratorKind::GenericMethod => "generic_method",
            DecoratorKind::StatusCode => "status_code",
            DecoratorKind::Redirect => "redirect",
            DecoratorKind::Security => "security",
            DecoratorKind::Produce => "produce",
        }
    }

    /// Whether the decorator declares a response (and needs a type).
    pub fn is_response(&self) -> bool {
        matches!(self, DecoratorKind::StatusCode | DecoratorKind::Redirect)
    }
}

impl fmt::Display for DecoratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata extracted from one decorator call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecoratorMetadata<T> {
    RoutePrefix(RouteDescriptor),
    Action(MethodAction),
    Response(MethodResponse<T>),
    Security(SecurityRequirement),
    Produce { media_type: String },
}

/// A decorator call that breaks the argument contract of its family.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("{decorator}: missing argument {index}")]
    MissingArgument { decorator: String, index: usize },
    #[error("{decorator}: argument {index} must be {expected}, found {found}")]
    UnexpectedArgument {
        decorator: String,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{decorator}: invalid status code {value}")]
    InvalidStatusCode { decorator: String, value: String },
}
