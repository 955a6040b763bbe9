//! Decorator alias configuration.
//!
//! Projects that wrap the stock decorators (`export const Roles = Authorize`)
//! register the extra names here:
//!
//! ```yaml
//! version: "1"
//! include_defaults: true
//! decorators:
//!   security: [Roles]
//!   generic_method: [Route]
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extract::DecoratorKind;

/// Config file names looked up by [`discover`].
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["routemeta.yaml", ".routemeta.yaml"];

/// Config versions this crate understands.
const SUPPORTED_VERSIONS: &[&str] = &["1"];

static DECORATOR_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid regex"));

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub version: String,
    /// Keep the built-in decorator names (default: true)
    #[serde(default = "default_include_defaults")]
    pub include_defaults: bool,
    #[serde(default)]
    pub decorators: DecoratorAliases,
}

fn default_include_defaults() -> bool {
    true
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            version: String::new(),
            include_defaults: true,
            decorators: DecoratorAliases::default(),
        }
    }
}

/// Extra decorator names, grouped by kind.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DecoratorAliases {
    #[serde(default)]
    pub route_prefix: Vec<String>,
    #[serde(default)]
    pub verb: Vec<String>,
    #[serde(default)]
    pub generic_method: Vec<String>,
    #[serde(default)]
    pub status_code: Vec<String>,
    #[serde(default)]
    pub redirect: Vec<String>,
    #[serde(default)]
    pub security: Vec<String>,
    #[serde(default)]
    pub produce: Vec<String>,
}

impl DecoratorAliases {
    /// Names registered for `kind`.
    pub fn names(&self, kind: DecoratorKind) -> &[String] {
        match kind {
            DecoratorKind::RoutePrefix => &self.route_prefix,
            DecoratorKind::Verb => &self.verb,
            DecoratorKind::GenericMethod => &self.generic_method,
            DecoratorKind::StatusCode => &self.status_code,
            DecoratorKind::Redirect => &self.redirect,
            DecoratorKind::Security => &self.security,
            DecoratorKind::Produce => &self.produce,
        }
    }
}

impl ExtractorConfig {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parse a configuration from a YAML string.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: ExtractorConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// All configured aliases with their kind, in kind order.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, DecoratorKind)> + '_ {
        DecoratorKind::ALL.into_iter().flat_map(move |kind| {
            self.decorators
                .names(kind)
                .iter()
                .map(move |name| (name.as_str(), kind))
        })
    }
}

/// Check a configuration for unsupported versions, malformed names and
/// names registered under more than one kind.
pub fn validate(config: &ExtractorConfig) -> anyhow::Result<()> {
    if !config.version.is_empty() && !SUPPORTED_VERSIONS.contains(&config.version.as_str()) {
        anyhow::bail!(
            "unsupported config version {:?}, expected one of {}",
            config.version,
            SUPPORTED_VERSIONS.join(", ")
        );
    }

    let mut seen: HashMap<&str, DecoratorKind> = HashMap::new();
    for (name, kind) in config.aliases() {
        if !DECORATOR_NAME.is_match(name) {
            anyhow::bail!("invalid decorator name {:?} under {}", name, kind);
        }
        if let Some(previous) = seen.insert(name, kind) {
            if previous != kind {
                anyhow::bail!(
                    "decorator {:?} is registered as both {} and {}",
                    name,
                    previous,
                    kind
                );
            }
        }
    }

    Ok(())
}

/// Find a config file in `dir`.
pub fn discover<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.as_ref().join(name))
        .find(|path| path.is_file())
}

/// Load the config file in `dir`, or the defaults when there is none.
pub fn load<P: AsRef<Path>>(dir: P) -> anyhow::Result<ExtractorConfig> {
    let config = match discover(&dir) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading decorator config");
            ExtractorConfig::parse_file(&path)?
        }
        None => ExtractorConfig::default(),
    };
    validate(&config)?;
    Ok(config)
}
