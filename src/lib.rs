//! Routemeta - routing metadata from decorator calls.
//!
//! Routemeta reads the decorators of annotated controller classes
//! (`@Controller('/users')`, `@Get('/:id')`, `@HttpCode(201)`, ...) and turns
//! each call into a small record a documentation generator can consume,
//! e.g. when producing an OpenAPI description.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────┐     ┌────────────────────┐
//! │ Caller (locates  │────▶│ CallSyntax   │────▶│ Extraction rules   │
//! │ decorator calls) │     │ (TsCall,     │     │ (prefix, action,   │
//! └──────────────────┘     │  CallExpr)   │     │  response, ...)    │
//!                          └──────────────┘     └────────────────────┘
//!                                                        │
//!                          ┌──────────────┐              ▼
//!                          │ Extractor    │     ┌────────────────────┐
//!                          │ (name table, │────▶│ DecoratorMetadata  │
//!                          │  aliases)    │     └────────────────────┘
//!                          └──────────────┘
//! ```
//!
//! - `syntax`: the call capability the rules read through, plus the
//!   tree-sitter TypeScript adapter (feature `tree-sitter`)
//! - `extract`: the rules and the decorator name table
//! - `config`: YAML alias configuration
//! - `logging`: `tracing` subscriber setup
//!
//! # Example
//!
//! ```
//! use routemeta::syntax::CallExpr;
//!
//! let call = CallExpr::new("Get").with_arg("/users/:id");
//! let action = routemeta::get_method_action(&call).unwrap();
//! assert_eq!(action.method, "get");
//! assert_eq!(action.path, "/users/{id}");
//! ```

pub mod config;
pub mod extract;
pub mod logging;
pub mod syntax;

pub use config::ExtractorConfig;
pub use extract::{
    get_method_action, get_method_response, get_method_securities, get_produce,
    get_route_prefix, normalize_path, DecoratorKind, DecoratorMetadata, ExtractError, Extractor,
    MethodAction, MethodResponse, RouteDescriptor, SecurityRequirement,
};
pub use syntax::{CallExpr, CallSyntax, Literal};
