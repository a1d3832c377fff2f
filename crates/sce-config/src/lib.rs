// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and registry bootstrap.
//!
//! [`ErrorsConfig`] names the JSON error catalog to load and any inline
//! templates to register on top of it. [`build_registry`] turns a validated
//! config into the read-only [`TemplateRegistry`] that the host application
//! hands to error construction sites.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use sce_templates::{ErrorClassEntry, TemplateError, TemplateRegistry, is_valid_class_id};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested file was not found or could not be read.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },

    /// The configured catalog file is not a valid catalog.
    #[error("invalid error catalog {path}: {source}")]
    Catalog {
        /// Catalog path.
        path: String,
        /// Underlying catalog failure.
        #[source]
        source: TemplateError,
    },

    /// An inline template could not be registered.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A recommended optional field is missing.
    MissingOptionalField {
        /// Name of the missing field.
        field: String,
        /// Why it matters.
        hint: String,
    },
    /// No catalog and no inline templates: every class lookup will fail.
    EmptyRegistry,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::MissingOptionalField { field, hint } => {
                write!(f, "missing optional field '{field}': {hint}")
            }
            ConfigWarning::EmptyRegistry => {
                f.write_str("no catalog or inline templates; every error class is unknown")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level configuration for the error layer.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ErrorsConfig {
    /// Path to a JSON error catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<String>,

    /// Log level override (e.g. `"debug"`, `"info"`, `"warn"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Inline templates keyed by error class; these replace catalog entries
    /// of the same name.
    #[serde(default)]
    pub templates: BTreeMap<String, TemplateEntry>,
}

impl Default for ErrorsConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            log_level: Some("info".into()),
            templates: BTreeMap::new(),
        }
    }
}

/// An inline error-class template.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct TemplateEntry {
    /// Message template with `<name>` or `{name}` placeholders.
    pub message: String,
    /// Optional five-character SQLSTATE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_state: Option<String>,
}

impl From<&TemplateEntry> for ErrorClassEntry {
    fn from(entry: &TemplateEntry) -> Self {
        Self {
            message: vec![entry.message.clone()],
            sql_state: entry.sql_state.clone(),
            sub_class: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// SQLSTATE codes are exactly five characters.
const SQL_STATE_LEN: usize = 5;

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load an [`ErrorsConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`ErrorsConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<ErrorsConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => ErrorsConfig::default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse a TOML string into an [`ErrorsConfig`].
pub fn parse_toml(content: &str) -> Result<ErrorsConfig, ConfigError> {
    toml::from_str::<ErrorsConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `SCE_CATALOG_PATH`
/// - `SCE_LOG_LEVEL`
pub fn apply_env_overrides(config: &mut ErrorsConfig) {
    if let Ok(val) = std::env::var("SCE_CATALOG_PATH") {
        config.catalog_path = Some(val);
    }
    if let Ok(val) = std::env::var("SCE_LOG_LEVEL") {
        config.log_level = Some(val);
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn is_valid_sql_state(state: &str) -> bool {
    state.len() == SQL_STATE_LEN && state.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (bad log level, malformed class ids, empty messages, malformed
/// SQLSTATEs) are returned as a [`ConfigError::ValidationError`].
pub fn validate_config(config: &ErrorsConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref level) = config.log_level
        && !VALID_LOG_LEVELS.contains(&level.as_str())
    {
        errors.push(format!("invalid log_level '{level}'"));
    }

    if let Some(ref path) = config.catalog_path
        && path.trim().is_empty()
    {
        errors.push("catalog_path must not be empty".into());
    }

    for (class, entry) in &config.templates {
        if !is_valid_class_id(class) {
            errors.push(format!("template '{class}': invalid error class identifier"));
        }
        if entry.message.trim().is_empty() {
            errors.push(format!("template '{class}': message must not be empty"));
        }
        if let Some(ref state) = entry.sql_state
            && !is_valid_sql_state(state)
        {
            errors.push(format!(
                "template '{class}': sql_state '{state}' must be {SQL_STATE_LEN} uppercase alphanumerics"
            ));
        }
    }

    match (&config.catalog_path, config.templates.is_empty()) {
        (None, true) => warnings.push(ConfigWarning::EmptyRegistry),
        (None, false) => warnings.push(ConfigWarning::MissingOptionalField {
            field: "catalog_path".into(),
            hint: "only inline templates will be registered".into(),
        }),
        (Some(_), _) => {}
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations.  Values in `overlay` take precedence over `base`.
///
/// Template maps are combined; on class collisions the overlay entry wins.
pub fn merge_configs(base: ErrorsConfig, overlay: ErrorsConfig) -> ErrorsConfig {
    let mut templates = base.templates;
    templates.extend(overlay.templates);
    ErrorsConfig {
        catalog_path: overlay.catalog_path.or(base.catalog_path),
        log_level: overlay.log_level.or(base.log_level),
        templates,
    }
}

// ---------------------------------------------------------------------------
// Registry bootstrap
// ---------------------------------------------------------------------------

/// Build the template registry described by `config`.
///
/// Loads the catalog at `catalog_path` (if set), then registers inline
/// templates over it. An inline template for a catalog class replaces only
/// its message; the catalog's sub-classes stay, and so does its SQLSTATE
/// unless the inline entry sets one.
pub fn build_registry(config: &ErrorsConfig) -> Result<TemplateRegistry, ConfigError> {
    let mut registry = match config.catalog_path {
        Some(ref path) => {
            let content =
                std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                    path: path.clone(),
                })?;
            TemplateRegistry::from_json_str(&content).map_err(|source| ConfigError::Catalog {
                path: path.clone(),
                source,
            })?
        }
        None => TemplateRegistry::new(),
    };

    for (class, entry) in &config.templates {
        if registry.contains(class) {
            warn!(error_class = %class, "inline template replaces catalog message");
        }
        registry.override_message(class.clone(), ErrorClassEntry::from(entry))?;
    }

    info!(classes = registry.len(), "error template registry ready");
    Ok(registry)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
