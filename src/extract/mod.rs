//! Extraction of routing metadata from decorator calls.
//!
//! The rules in this module each handle one decorator family:
//!
//! | Family          | Built-in names                      | Rule                      |
//! |-----------------|-------------------------------------|---------------------------|
//! | route prefix    | `Controller`, `JsonController`      | [`get_route_prefix`]      |
//! | verb + path     | `Get`, `Post`, ..., `Method`        | [`get_method_action`]     |
//! | response        | `HttpCode`, `Redirect`              | [`get_method_response`]   |
//! | security        | `Authorize`, `Authorized`           | [`get_method_securities`] |
//! | content type    | `ContentType`                       | [`get_produce`]           |
//!
//! Callers that locate decorators themselves can call a rule directly, or let
//! an [`Extractor`] pick the rule from the decorator name.

mod rules;
mod table;
mod types;

pub use rules::{
    get_method_action, get_method_response, get_method_securities, get_produce,
    get_route_prefix, method_action, method_response, method_response_with, normalize_path,
    REDIRECT_STATUS,
};
pub use table::{default_decorators, default_kind, Extractor};
pub use types::{
    DecoratorKind, DecoratorMetadata, ExtractError, MethodAction, MethodResponse,
    RouteDescriptor, SecurityRequirement,
};
