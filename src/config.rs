//! Tool configuration: loading, merging, validation, and resolution.
//!
//! Configuration comes from three layers, later layers overriding earlier:
//!
//! ```text
//! stock defaults  →  websketch.toml in the asset root  →  CLI flags
//! ```
//!
//! The file layer is optional and sparse: override just the keys you want.
//! Unknown keys are rejected to catch typos early.
//!
//! ## Tri-state feature flags
//!
//! `etag` and `gzip` are strings, not booleans, because each feature has a
//! third state: `"true"` bakes the feature in, `"false"` leaves it out, and
//! any other value (conventionally `"compiler"`) defers the decision to the
//! firmware's own build flags; the generated code wraps the feature in
//! `#ifdef <PREFIX>_ENABLE_ETAG` / `#ifdef <PREFIX>_ENABLE_GZIP` guards.
//! Parsing is total: there is no invalid value, unrecognized strings defer.
//!
//! ## Resolution
//!
//! [`ToolConfig`] is what users edit; [`ResolvedConfig`] is the fixed
//! decision set generation actually reads. Resolution happens exactly once,
//! never fails, and normalizes the base path (one trailing slash stripped).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Name of the optional config file looked up in the asset root.
pub const CONFIG_FILENAME: &str = "websketch.toml";

/// User-facing configuration, loaded from `websketch.toml` and CLI flags.
///
/// All fields have defaults; config files need only the overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// ETag generation: `"true"`, `"false"`, or `"compiler"` (deferred).
    pub etag: String,
    /// Gzip variants: `"true"`, `"false"`, or `"compiler"` (deferred).
    pub gzip: String,
    /// `Cache-Control: max-age` seconds; 0 emits the no-cache directive.
    pub cachetime: u32,
    /// URL prefix for every route, e.g. `/ui`. Empty serves from the root.
    pub base_path: String,
    /// Symbol prefix for every generated name.
    pub prefix: String,
    /// Name of the generated initialization entry point.
    pub entry: String,
    /// Value for the generated `<PREFIX>_VERSION` macro. Omitted = no macro.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Output file the `build` command writes.
    pub output: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            etag: "true".to_string(),
            gzip: "true".to_string(),
            cachetime: 86400,
            base_path: String::new(),
            prefix: "WEBSKETCH".to_string(),
            entry: "initWebsketch".to_string(),
            version: None,
            output: "websketch.h".to_string(),
        }
    }
}

impl ToolConfig {
    /// Validate values that would produce uncompilable output.
    ///
    /// Tri-state strings are never validated, since every value is meaningful.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_c_identifier(&self.prefix) {
            return Err(ConfigError::Validation(format!(
                "prefix must be a valid C identifier, got {:?}",
                self.prefix
            )));
        }
        if !is_c_identifier(&self.entry) {
            return Err(ConfigError::Validation(format!(
                "entry must be a valid C identifier, got {:?}",
                self.entry
            )));
        }
        if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "base_path must start with '/', got {:?}",
                self.base_path
            )));
        }
        if self.output.is_empty() {
            return Err(ConfigError::Validation("output must not be empty".into()));
        }
        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_c_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// =============================================================================
// Tri-state feature flags
// =============================================================================

/// The three-way state of a generated feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureMode {
    /// Feature code emitted unconditionally.
    Enabled,
    /// Feature code not emitted at all.
    Disabled,
    /// Feature code emitted under a preprocessor guard; the firmware build
    /// decides via `-D<PREFIX>_ENABLE_...`.
    Deferred,
}

impl FeatureMode {
    /// Total mapping from the config string. Never fails: unrecognized
    /// values defer to the firmware build, which is itself a legitimate
    /// deployment choice.
    pub fn parse(value: &str) -> Self {
        match value {
            "true" => Self::Enabled,
            "false" => Self::Disabled,
            _ => Self::Deferred,
        }
    }
}

impl fmt::Display for FeatureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Enabled => "true",
            Self::Disabled => "false",
            Self::Deferred => "compiler",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Resolved configuration
// =============================================================================

/// The fixed decision set generation reads. Constructed once per generation
/// via [`ResolvedConfig::from_tool`], read-only thereafter.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub symbol_prefix: String,
    pub etag: FeatureMode,
    pub gzip: FeatureMode,
    pub cache_seconds: u32,
    /// Normalized: empty, or a path without trailing slash.
    pub base_path: String,
    pub entry_name: String,
    pub version: Option<String>,
}

impl ResolvedConfig {
    /// Resolve user configuration into the fixed decision set.
    ///
    /// Total: resolution never fails. A lone `/` base path normalizes to
    /// empty, the identity element for route prefixing.
    pub fn from_tool(config: &ToolConfig) -> Self {
        let base_path = config
            .base_path
            .strip_suffix('/')
            .unwrap_or(&config.base_path)
            .to_string();
        Self {
            symbol_prefix: config.prefix.clone(),
            etag: FeatureMode::parse(&config.etag),
            gzip: FeatureMode::parse(&config.gzip),
            cache_seconds: config.cachetime,
            base_path,
            entry_name: config.entry.clone(),
            version: config.version.clone(),
        }
    }

    /// Single descriptive line embedded in the generated `//config:` comment.
    pub fn describe(&self) -> String {
        format!(
            "etag: {}, gzip: {}, cachetime: {}, basepath: {}, prefix: {}, entry: {}, version: {}",
            self.etag,
            self.gzip,
            self.cache_seconds,
            if self.base_path.is_empty() {
                "(none)"
            } else {
                &self.base_path
            },
            self.symbol_prefix,
            self.entry_name,
            self.version.as_deref().unwrap_or("(none)"),
        )
    }
}

// =============================================================================
// Config loading and merging
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`, the base
/// layer for merging user overrides on top.
fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ToolConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; non-table overlay values replace base values;
/// base keys absent from the overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `websketch.toml` from a directory as a raw TOML value.
///
/// `Ok(None)` if the file does not exist; `Err` if it exists but is invalid.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, deserialize, validate.
pub fn resolve_file_config(overlay: Option<toml::Value>) -> Result<ToolConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(stock_defaults_value(), ov),
        None => stock_defaults_value(),
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from `websketch.toml` in the asset root, falling back
/// to stock defaults when the file is absent.
///
/// CLI overrides are applied by the caller after this; validation runs again
/// once they have been folded in.
pub fn load_config(asset_root: &Path) -> Result<ToolConfig, ConfigError> {
    resolve_file_config(load_raw_config(asset_root)?)
}

/// A fully-commented stock `websketch.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Websketch Configuration
# =======================
# Place this file in the asset root as `websketch.toml`. All settings are
# optional; values shown are the defaults. CLI flags override file values.
# Unknown keys will cause an error.

# ETag generation for conditional requests (304 Not Modified).
#   "true"     - always generate ETag checks
#   "false"    - never
#   "compiler" - emit under #ifdef <PREFIX>_ENABLE_ETAG, firmware decides
etag = "true"

# Gzip-compressed variants of compressible assets.
#   "true"     - serve gzip where it shrinks the file
#   "false"    - raw bytes only
#   "compiler" - emit both under #ifdef <PREFIX>_ENABLE_GZIP, firmware decides
gzip = "true"

# Cache-Control max-age in seconds. 0 emits "no-cache".
cachetime = 86400

# URL prefix for every route, e.g. "/ui" serves /ui/index.html and /ui.
# Empty serves from the server root.
base_path = ""

# Prefix for every generated symbol, macro, and function name.
prefix = "WEBSKETCH"

# Name of the generated initialization function the firmware calls.
entry = "initWebsketch"

# Uncomment to embed a version macro (#define <PREFIX>_VERSION "...").
# version = "1.0.0"

# Output file written by `websketch build`.
output = "websketch.h"
"##
}
