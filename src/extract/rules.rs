//! Extraction rules, one per decorator family.
//!
//! Every rule is a pure function over a call. Omitted optional arguments
//! produce defaults (empty path, no schema); arguments of the wrong shape
//! are reported as [`ExtractError`] rather than guessed at.

use once_cell::sync::Lazy;
use regex::Regex;

use super::table::default_kind;
use super::types::{
    DecoratorKind, ExtractError, MethodAction, MethodResponse, SecurityRequirement,
};
use crate::syntax::{CallSyntax, Literal};

/// Status code reported for redirect decorators.
pub const REDIRECT_STATUS: u16 = 302;

/// Separator used when several roles are required.
const ROLE_SEPARATOR: &str = ", ";

static PATH_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([A-Za-z0-9_]+)").expect("valid regex"));

/// Rewrite `:name` path parameters to `{name}`.
///
/// ```
/// assert_eq!(routemeta::normalize_path("/xxx/:id/:sub"), "/xxx/{id}/{sub}");
/// ```
pub fn normalize_path(path: &str) -> String {
    PATH_PARAM.replace_all(path, "{$1}").into_owned()
}

/// Route prefix of a controller declaration, or `""` without an argument.
pub fn get_route_prefix<C: CallSyntax + ?Sized>(call: &C) -> Result<String, ExtractError> {
    match call.arg(0) {
        None => Ok(String::new()),
        Some(Literal::String(path)) => Ok(path),
        Some(other) => Err(unexpected(call, 0, "a string literal", &other)),
    }
}

/// HTTP method and normalized path of a route declaration.
///
/// Calls registered as the generic form (`Method('get', '/x')`) read the verb
/// from their first argument; every other call is named after its verb.
pub fn get_method_action<C: CallSyntax + ?Sized>(call: &C) -> Result<MethodAction, ExtractError> {
    let generic = default_kind(&call.callee()) == Some(DecoratorKind::GenericMethod);
    method_action(call, generic)
}

/// [`get_method_action`] with the call form chosen by the caller.
pub fn method_action<C: CallSyntax + ?Sized>(
    call: &C,
    generic: bool,
) -> Result<MethodAction, ExtractError> {
    let (method, first_path_arg) = if generic {
        match call.arg(0) {
            Some(Literal::String(verb)) => (verb.to_lowercase(), 1),
            Some(other) => return Err(unexpected(call, 0, "a string literal", &other)),
            None => return Err(missing(call, 0)),
        }
    } else {
        (call.callee().to_lowercase(), 0)
    };

    // Last string literal wins; RegExp routes and other expressions are skipped
    let raw_path = (first_path_arg..call.arg_count())
        .rev()
        .find_map(|i| call.string_arg(i))
        .unwrap_or_default();

    Ok(MethodAction {
        method,
        path: normalize_path(&raw_path),
    })
}

/// Response declared by a status-code or redirect decorator.
///
/// Redirects always report 302 without a schema. Status-code declarations
/// attach `return_type` unchanged, including "no value" types.
pub fn get_method_response<C: CallSyntax + ?Sized, T>(
    call: &C,
    return_type: T,
) -> Result<MethodResponse<T>, ExtractError> {
    let redirect = default_kind(&call.callee()) == Some(DecoratorKind::Redirect);
    method_response(call, return_type, redirect)
}

/// [`get_method_response`] with the redirect form chosen by the caller.
pub fn method_response<C: CallSyntax + ?Sized, T>(
    call: &C,
    return_type: T,
    redirect: bool,
) -> Result<MethodResponse<T>, ExtractError> {
    method_response_with(call, || return_type, redirect)
}

/// [`method_response`] with the return type resolved only when it is
/// attached, after the status code has been validated.
pub fn method_response_with<C, T, F>(
    call: &C,
    resolve_type: F,
    redirect: bool,
) -> Result<MethodResponse<T>, ExtractError>
where
    C: CallSyntax + ?Sized,
    F: FnOnce() -> T,
{
    if redirect {
        return Ok(MethodResponse {
            code: REDIRECT_STATUS,
            schema: None,
        });
    }

    let arg = call.arg(0).ok_or_else(|| missing(call, 0))?;
    let code = arg
        .as_integer()
        .and_then(|n| u16::try_from(n).ok())
        .filter(|n| (100..=999).contains(n))
        .ok_or_else(|| ExtractError::InvalidStatusCode {
            decorator: call.callee().into_owned(),
            value: arg.to_string(),
        })?;

    Ok(MethodResponse {
        code,
        schema: Some(resolve_type()),
    })
}

/// Roles required by an authorization decorator.
///
/// An array of roles is joined with `", "` in source order.
pub fn get_method_securities<C: CallSyntax + ?Sized>(
    call: &C,
) -> Result<SecurityRequirement, ExtractError> {
    let name = match call.arg(0) {
        Some(Literal::String(role)) => role,
        Some(Literal::Array(items)) => {
            let mut roles = Vec::with_capacity(items.len());
            for item in &items {
                match item.as_str() {
                    Some(role) => roles.push(role),
                    None => return Err(unexpected(call, 0, "an array of string literals", item)),
                }
            }
            roles.join(ROLE_SEPARATOR)
        }
        Some(other) => {
            return Err(unexpected(call, 0, "a string or array literal", &other));
        }
        None => return Err(missing(call, 0)),
    };

    Ok(SecurityRequirement { name })
}

/// Media type declared by a content-type decorator, verbatim.
pub fn get_produce<C: CallSyntax + ?Sized>(call: &C) -> Result<String, ExtractError> {
    match call.arg(0) {
        Some(Literal::String(media_type)) => Ok(media_type),
        Some(other) => Err(unexpected(call, 0, "a string literal", &other)),
        None => Err(missing(call, 0)),
    }
}

fn missing<C: CallSyntax + ?Sized>(call: &C, index: usize) -> ExtractError {
    ExtractError::MissingArgument {
        decorator: call.callee().into_owned(),
        index,
    }
}

fn unexpected<C: CallSyntax + ?Sized>(
    call: &C,
    index: usize,
    expected: &'static str,
    found: &Literal,
) -> ExtractError {
    ExtractError::UnexpectedArgument {
        decorator: call.callee().into_owned(),
        index,
        expected,
        found: found.kind_name(),
    }
}
