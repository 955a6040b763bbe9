//! Decorator name lookup and dispatch.
//!
//! Decorator names map to a [`DecoratorKind`] through a flat table. Adding a
//! verb or an alias is adding an entry; there is no per-decorator type.

use std::collections::HashMap;

use phf::phf_map;
use tracing::debug;

use super::rules;
use super::types::{
    DecoratorKind, DecoratorMetadata, ExtractError, RouteDescriptor,
};
use crate::config::ExtractorConfig;
use crate::syntax::CallSyntax;

/// Built-in decorator names (routing-controllers style).
static DEFAULT_DECORATORS: phf::Map<&'static str, DecoratorKind> = phf_map! {
    "Controller" => DecoratorKind::RoutePrefix,
    "JsonController" => DecoratorKind::RoutePrefix,
    "Get" => DecoratorKind::Verb,
    "Post" => DecoratorKind::Verb,
    "Put" => DecoratorKind::Verb,
    "Delete" => DecoratorKind::Verb,
    "Patch" => DecoratorKind::Verb,
    "Option" => DecoratorKind::Verb,
    "Options" => DecoratorKind::Verb,
    "Head" => DecoratorKind::Verb,
    "All" => DecoratorKind::Verb,
    "Method" => DecoratorKind::GenericMethod,
    "HttpCode" => DecoratorKind::StatusCode,
    "Redirect" => DecoratorKind::Redirect,
    "Authorize" => DecoratorKind::Security,
    "Authorized" => DecoratorKind::Security,
    "ContentType" => DecoratorKind::Produce,
};

/// Kind of a built-in decorator name.
pub fn default_kind(name: &str) -> Option<DecoratorKind> {
    DEFAULT_DECORATORS.get(name).copied()
}

/// Built-in decorator names with their kinds, sorted by name.
pub fn default_decorators() -> Vec<(&'static str, DecoratorKind)> {
    let mut entries: Vec<_> = DEFAULT_DECORATORS
        .entries()
        .map(|(name, kind)| (*name, *kind))
        .collect();
    entries.sort_by_key(|(name, _)| *name);
    entries
}

/// Routes located decorator calls to the matching extraction rule.
#[derive(Debug, Clone)]
pub struct Extractor {
    table: HashMap<String, DecoratorKind>,
}

impl Extractor {
    /// Create an extractor that knows the built-in decorator names.
    pub fn new() -> Self {
        let table = DEFAULT_DECORATORS
            .entries()
            .map(|(name, kind)| (name.to_string(), *kind))
            .collect();
        Self { table }
    }

    /// Create an extractor from a configuration.
    ///
    /// Configured aliases are added to the built-in names, or replace them
    /// when `include_defaults` is false. The configuration is validated first.
    pub fn from_config(config: &ExtractorConfig) -> anyhow::Result<Self> {
        crate::config::validate(config)?;

        let mut extractor = if config.include_defaults {
            Self::new()
        } else {
            Self {
                table: HashMap::new(),
            }
        };

        for (name, kind) in config.aliases() {
            if let Some(previous) = extractor.table.insert(name.to_string(), kind) {
                if previous != kind {
                    debug!(
                        decorator = name,
                        from = %previous,
                        to = %kind,
                        "alias overrides built-in decorator"
                    );
                }
            }
        }

        Ok(extractor)
    }

    /// Register a decorator name.
    pub fn register(&mut self, name: impl Into<String>, kind: DecoratorKind) {
        self.table.insert(name.into(), kind);
    }

    /// Kind of the decorator called `name`, if known.
    pub fn kind_of(&self, name: &str) -> Option<DecoratorKind> {
        self.table.get(name).copied()
    }

    /// Number of known decorator names.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no decorator names are known.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Extract metadata from a located decorator call.
    ///
    /// Returns `Ok(None)` for decorators outside the table (`@Injectable()`).
    /// `resolve_type` yields the annotated method's return type; it is only
    /// called for status-code decorators.
    pub fn extract<C, T, F>(
        &self,
        call: &C,
        resolve_type: F,
    ) -> Result<Option<DecoratorMetadata<T>>, ExtractError>
    where
        C: CallSyntax + ?Sized,
        F: FnOnce() -> T,
    {
        let callee = call.callee();
        let kind = match self.kind_of(&callee) {
            Some(kind) => kind,
            None => {
                debug!(decorator = %callee, "skipping unknown decorator");
                return Ok(None);
            }
        };
        debug!(decorator = %callee, %kind, "extracting decorator");

        let metadata = match kind {
            DecoratorKind::RoutePrefix => DecoratorMetadata::RoutePrefix(RouteDescriptor {
                path: rules::get_route_prefix(call)?,
            }),
            DecoratorKind::Verb => DecoratorMetadata::Action(rules::method_action(call, false)?),
            DecoratorKind::GenericMethod => {
                DecoratorMetadata::Action(rules::method_action(call, true)?)
            }
            DecoratorKind::StatusCode | DecoratorKind::Redirect => {
                let redirect = kind == DecoratorKind::Redirect;
                DecoratorMetadata::Response(rules::method_response_with(
                    call,
                    resolve_type,
                    redirect,
                )?)
            }
            DecoratorKind::Security => {
                DecoratorMetadata::Security(rules::get_method_securities(call)?)
            }
            DecoratorKind::Produce => DecoratorMetadata::Produce {
                media_type: rules::get_produce(call)?,
            },
        };

        Ok(Some(metadata))
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}
