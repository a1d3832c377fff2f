// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error-class message template registry.
//!
//! An error class is a stable `SCREAMING_SNAKE_CASE` identifier such as
//! `DATETIME_OVERFLOW`; only `A-Z`, `0-9` and `_` are accepted. The
//! [`TemplateRegistry`] maps each class to a [`Template`] and renders it
//! against named message parameters. Classes may
//! carry sub-classes, addressed as `CLASS.SUB_CLASS`; their message is the
//! class template followed by a space and the sub-class template.
//!
//! The registry is built once by the host application and then only read.
//! Error construction sites consume it through the [`TemplateResolver`]
//! trait so they never depend on how the catalog was loaded.
//!
//! ```
//! use sce_templates::{TemplateRegistry, TemplateResolver};
//! use std::collections::BTreeMap;
//!
//! let registry = TemplateRegistry::new()
//!     .with_template("DATETIME_OVERFLOW", "value {value} overflows datetime range")
//!     .unwrap();
//! let params = BTreeMap::from([("value".to_string(), "9999-99-99".to_string())]);
//! assert_eq!(
//!     registry.resolve("DATETIME_OVERFLOW", &params).unwrap(),
//!     "value 9999-99-99 overflows datetime range",
//! );
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod template;

pub use template::Template;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures raised while loading or resolving message templates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// The error class (or sub-class) is not registered.
    #[error("unknown error class: {class}")]
    UnknownErrorClass {
        /// Class identifier that was requested.
        class: String,
    },

    /// The template references a placeholder with no supplied value.
    #[error("error class {class} requires message parameter '{parameter}'")]
    MissingParameter {
        /// Class identifier being resolved.
        class: String,
        /// Placeholder name that had no value.
        parameter: String,
    },

    /// A class identifier is empty or has characters outside `A-Z`, `0-9`,
    /// `_`.
    #[error("invalid error class identifier: '{class}'")]
    InvalidClassId {
        /// The rejected identifier.
        class: String,
    },

    /// The catalog document could not be parsed.
    #[error("failed to parse error catalog: {reason}")]
    CatalogParse {
        /// Human-readable parse error detail.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Resolver seam
// ---------------------------------------------------------------------------

/// Read-only message lookup consumed by error construction sites.
pub trait TemplateResolver {
    /// Render the template registered for `class` with `params`.
    ///
    /// # Errors
    ///
    /// [`TemplateError::UnknownErrorClass`] when `class` is not registered,
    /// [`TemplateError::MissingParameter`] when a placeholder has no value.
    fn resolve(&self, class: &str, params: &BTreeMap<String, String>)
    -> Result<String, TemplateError>;

    /// SQLSTATE registered for `class`, if any.
    fn sql_state(&self, class: &str) -> Option<&str> {
        let _ = class;
        None
    }
}

// ---------------------------------------------------------------------------
// Catalog document
// ---------------------------------------------------------------------------

/// One error class as it appears in a JSON catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorClassEntry {
    /// Template lines, joined with `\n`.
    pub message: Vec<String>,
    /// Five-character SQLSTATE associated with the class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_state: Option<String>,
    /// Refinements addressed as `CLASS.SUB_CLASS`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_class: BTreeMap<String, SubClassEntry>,
}

/// A sub-class of an [`ErrorClassEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubClassEntry {
    /// Template lines, joined with `\n`.
    pub message: Vec<String>,
}

/// A whole catalog: class identifier to entry.
pub type Catalog = BTreeMap<String, ErrorClassEntry>;

// ---------------------------------------------------------------------------
// TemplateRegistry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct RegisteredClass {
    template: Template,
    sql_state: Option<String>,
    sub_classes: BTreeMap<String, Template>,
}

/// In-memory registry of error-class templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateRegistry {
    classes: BTreeMap<String, RegisteredClass>,
}

/// Whether `id` is a single class or sub-class identifier: one or more of
/// `A-Z`, `0-9`, `_`.
pub fn is_valid_class_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}

/// Whether `class` is a full error-class reference, either `CLASS` or
/// `CLASS.SUB_CLASS`.
pub fn is_valid_error_class(class: &str) -> bool {
    match class.split_once('.') {
        Some((main, sub)) => is_valid_class_id(main) && is_valid_class_id(sub),
        None => is_valid_class_id(class),
    }
}

fn check_class_id(class: &str) -> Result<(), TemplateError> {
    if !is_valid_class_id(class) {
        return Err(TemplateError::InvalidClassId {
            class: class.to_owned(),
        });
    }
    Ok(())
}

impl TemplateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a class with a single-line template.
    pub fn insert(
        &mut self,
        class: impl Into<String>,
        template: impl Into<String>,
    ) -> Result<(), TemplateError> {
        self.insert_entry(
            class,
            ErrorClassEntry {
                message: vec![template.into()],
                sql_state: None,
                sub_class: BTreeMap::new(),
            },
        )
    }

    /// Register (or replace) a class from a full catalog entry.
    pub fn insert_entry(
        &mut self,
        class: impl Into<String>,
        entry: ErrorClassEntry,
    ) -> Result<(), TemplateError> {
        let class = class.into();
        check_class_id(&class)?;
        let mut sub_classes = BTreeMap::new();
        for (name, sub) in entry.sub_class {
            check_class_id(&name)?;
            sub_classes.insert(name, Template::parse(sub.message.join("\n")));
        }
        self.classes.insert(
            class,
            RegisteredClass {
                template: Template::parse(entry.message.join("\n")),
                sql_state: entry.sql_state,
                sub_classes,
            },
        );
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_template(
        mut self,
        class: impl Into<String>,
        template: impl Into<String>,
    ) -> Result<Self, TemplateError> {
        self.insert(class, template)?;
        Ok(self)
    }

    /// Build a registry from a parsed [`Catalog`].
    pub fn from_catalog(catalog: Catalog) -> Result<Self, TemplateError> {
        let mut registry = Self::new();
        for (class, entry) in catalog {
            registry.insert_entry(class, entry)?;
        }
        debug!(classes = registry.len(), "loaded error catalog");
        Ok(registry)
    }

    /// Parse a JSON catalog document.
    pub fn from_json_str(json: &str) -> Result<Self, TemplateError> {
        let catalog: Catalog =
            serde_json::from_str(json).map_err(|e| TemplateError::CatalogParse {
                reason: e.to_string(),
            })?;
        Self::from_catalog(catalog)
    }

    /// Replace the message of `class` while keeping what the entry does not
    /// restate.
    ///
    /// Sub-classes already registered for `class` survive, with those in
    /// `entry` added over them. The registered SQLSTATE is kept when `entry`
    /// has none. An unregistered `class` is inserted as-is.
    pub fn override_message(
        &mut self,
        class: impl Into<String>,
        entry: ErrorClassEntry,
    ) -> Result<(), TemplateError> {
        let class = class.into();
        let Some(existing) = self.classes.get_mut(&class) else {
            return self.insert_entry(class, entry);
        };
        for name in entry.sub_class.keys() {
            check_class_id(name)?;
        }
        existing.template = Template::parse(entry.message.join("\n"));
        if entry.sql_state.is_some() {
            existing.sql_state = entry.sql_state;
        }
        for (name, sub) in entry.sub_class {
            existing
                .sub_classes
                .insert(name, Template::parse(sub.message.join("\n")));
        }
        debug!(error_class = %class, "overrode error class message");
        Ok(())
    }

    /// Merge `overlay` into `self`; classes in `overlay` replace same-named ones
    /// wholesale, sub-classes included.
    pub fn extend(&mut self, overlay: TemplateRegistry) {
        debug!(classes = overlay.len(), "merging error templates");
        self.classes.extend(overlay.classes);
    }

    /// Whether `class` (optionally `CLASS.SUB_CLASS`) is registered.
    pub fn contains(&self, class: &str) -> bool {
        self.lookup(class).is_ok()
    }

    /// Number of top-level classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no classes are registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Top-level class identifiers in sorted order.
    pub fn class_ids(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// The raw template text for `class`, sub-class text appended.
    pub fn template(&self, class: &str) -> Result<String, TemplateError> {
        let (main, sub) = self.lookup(class)?;
        Ok(match sub {
            Some(sub) => format!("{} {}", main.template, sub),
            None => main.template.to_string(),
        })
    }

    fn lookup(&self, class: &str) -> Result<(&RegisteredClass, Option<&Template>), TemplateError> {
        let unknown = || TemplateError::UnknownErrorClass {
            class: class.to_owned(),
        };
        let (main_id, sub_id) = match class.split_once('.') {
            Some((main, sub)) => (main, Some(sub)),
            None => (class, None),
        };
        let main = self.classes.get(main_id).ok_or_else(unknown)?;
        let sub = match sub_id {
            Some(id) => Some(main.sub_classes.get(id).ok_or_else(unknown)?),
            None => None,
        };
        Ok((main, sub))
    }

    fn render(
        &self,
        class: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<String, TemplateError> {
        let (main, sub) = self.lookup(class)?;
        let missing = |parameter: &str| TemplateError::MissingParameter {
            class: class.to_owned(),
            parameter: parameter.to_owned(),
        };
        let mut message = main.template.render(params).map_err(missing)?;
        if let Some(sub) = sub {
            message.push(' ');
            message.push_str(&sub.render(params).map_err(missing)?);
        }
        Ok(message)
    }
}

impl TemplateResolver for TemplateRegistry {
    fn resolve(
        &self,
        class: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<String, TemplateError> {
        self.render(class, params).inspect_err(|e| {
            warn!(error_class = class, error = %e, "error class resolution failed");
        })
    }

    fn sql_state(&self, class: &str) -> Option<&str> {
        let main_id = class.split_once('.').map_or(class, |(main, _)| main);
        self.classes.get(main_id)?.sql_state.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    const CATALOG: &str = r#"{
        "DATETIME_OVERFLOW": {
            "message": ["value <value> overflows datetime range"],
            "sqlState": "22008"
        },
        "CANNOT_PARSE": {
            "message": ["Cannot parse <input>."],
            "subClass": {
                "WITH_HINT": { "message": ["Try <hint>."] }
            }
        },
        "MULTI_LINE": {
            "message": ["first <a>", "second <b>"]
        }
    }"#;

    fn catalog_registry() -> TemplateRegistry {
        TemplateRegistry::from_json_str(CATALOG).unwrap()
    }

    // -- Lookup -----------------------------------------------------------

    #[test]
    fn resolves_registered_class() {
        let reg = TemplateRegistry::new()
            .with_template("DATETIME_OVERFLOW", "value {value} overflows datetime range")
            .unwrap();
        let msg = reg
            .resolve("DATETIME_OVERFLOW", &params(&[("value", "9999-99-99")]))
            .unwrap();
        assert_eq!(msg, "value 9999-99-99 overflows datetime range");
    }

    #[test]
    fn unknown_class_is_an_error() {
        let reg = TemplateRegistry::new();
        let err = reg.resolve("NOT_REGISTERED", &BTreeMap::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownErrorClass {
                class: "NOT_REGISTERED".into()
            }
        );
    }

    #[test]
    fn missing_parameter_names_class_and_placeholder() {
        let reg = catalog_registry();
        let err = reg.resolve("DATETIME_OVERFLOW", &BTreeMap::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingParameter {
                class: "DATETIME_OVERFLOW".into(),
                parameter: "value".into(),
            }
        );
        assert_eq!(
            err.to_string(),
            "error class DATETIME_OVERFLOW requires message parameter 'value'"
        );
    }

    #[test]
    fn contains_and_len() {
        let reg = catalog_registry();
        assert_eq!(reg.len(), 3);
        assert!(!reg.is_empty());
        assert!(reg.contains("CANNOT_PARSE"));
        assert!(reg.contains("CANNOT_PARSE.WITH_HINT"));
        assert!(!reg.contains("CANNOT_PARSE.NOPE"));
        assert!(!reg.contains("NOPE"));
    }

    #[test]
    fn class_ids_are_sorted() {
        let reg = catalog_registry();
        let ids: Vec<_> = reg.class_ids().collect();
        assert_eq!(ids, vec!["CANNOT_PARSE", "DATETIME_OVERFLOW", "MULTI_LINE"]);
    }

    // -- Catalog ----------------------------------------------------------

    #[test]
    fn multi_line_messages_join_with_newline() {
        let reg = catalog_registry();
        let msg = reg
            .resolve("MULTI_LINE", &params(&[("a", "1"), ("b", "2")]))
            .unwrap();
        assert_eq!(msg, "first 1\nsecond 2");
    }

    #[test]
    fn sub_class_appends_to_main_message() {
        let reg = catalog_registry();
        let msg = reg
            .resolve(
                "CANNOT_PARSE.WITH_HINT",
                &params(&[("input", "'abc'"), ("hint", "quoting")]),
            )
            .unwrap();
        assert_eq!(msg, "Cannot parse 'abc'. Try quoting.");
    }

    #[test]
    fn unknown_sub_class_reports_full_id() {
        let reg = catalog_registry();
        let err = reg.resolve("CANNOT_PARSE.NOPE", &BTreeMap::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownErrorClass {
                class: "CANNOT_PARSE.NOPE".into()
            }
        );
    }

    #[test]
    fn template_text_includes_sub_class() {
        let reg = catalog_registry();
        assert_eq!(
            reg.template("CANNOT_PARSE.WITH_HINT").unwrap(),
            "Cannot parse <input>. Try <hint>."
        );
    }

    #[test]
    fn sql_state_comes_from_main_class() {
        let reg = catalog_registry();
        assert_eq!(reg.sql_state("DATETIME_OVERFLOW"), Some("22008"));
        assert_eq!(reg.sql_state("CANNOT_PARSE.WITH_HINT"), None);
        assert_eq!(reg.sql_state("NOPE"), None);
    }

    #[test]
    fn malformed_json_is_catalog_parse_error() {
        let err = TemplateRegistry::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, TemplateError::CatalogParse { .. }));
    }

    #[test]
    fn entry_without_message_is_catalog_parse_error() {
        let err = TemplateRegistry::from_json_str(r#"{"X": {"sqlState": "42000"}}"#).unwrap_err();
        assert!(matches!(err, TemplateError::CatalogParse { .. }));
    }

    #[test]
    fn catalog_entry_serde_uses_catalog_field_names() {
        let entry = ErrorClassEntry {
            message: vec!["m".into()],
            sql_state: Some("22008".into()),
            sub_class: BTreeMap::new(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({"message": ["m"], "sqlState": "22008"}));
    }

    // -- Class identifiers ------------------------------------------------

    #[test]
    fn dotted_class_id_is_rejected() {
        let err = TemplateRegistry::new().insert("A.B", "x").unwrap_err();
        assert_eq!(err, TemplateError::InvalidClassId { class: "A.B".into() });
    }

    #[test]
    fn empty_class_id_is_rejected() {
        let err = TemplateRegistry::new().insert("", "x").unwrap_err();
        assert!(matches!(err, TemplateError::InvalidClassId { .. }));
    }

    #[test]
    fn dotted_sub_class_id_is_rejected() {
        let json = r#"{"A": {"message": ["a"], "subClass": {"B.C": {"message": ["b"]}}}}"#;
        let err = TemplateRegistry::from_json_str(json).unwrap_err();
        assert_eq!(err, TemplateError::InvalidClassId { class: "B.C".into() });
    }

    #[test]
    fn lowercase_or_spaced_class_id_is_rejected() {
        for bad in ["lower", "Mixed_Case", "HAS SPACE", "DASH-ED"] {
            let err = TemplateRegistry::new().insert(bad, "x").unwrap_err();
            assert_eq!(err, TemplateError::InvalidClassId { class: bad.into() });
        }
    }

    #[test]
    fn lowercase_sub_class_id_is_rejected() {
        let json = r#"{"A": {"message": ["a"], "subClass": {"sub": {"message": ["b"]}}}}"#;
        let err = TemplateRegistry::from_json_str(json).unwrap_err();
        assert_eq!(err, TemplateError::InvalidClassId { class: "sub".into() });
    }

    #[test]
    fn error_class_reference_validation() {
        for good in ["A", "_LEGACY_ERROR_TEMP_1234", "CANNOT_PARSE.WITH_HINT"] {
            assert!(is_valid_error_class(good), "{good}");
        }
        for bad in ["", ".", "A.", ".B", "A.B.C", "a", "A.b", "A B"] {
            assert!(!is_valid_error_class(bad), "{bad}");
        }
    }

    // -- Merging ----------------------------------------------------------

    const SYNTAX_CATALOG: &str = r#"{
        "PARSE_SYNTAX_ERROR": {
            "message": ["Syntax error near <token>."],
            "sqlState": "42601",
            "subClass": {
                "WITH_POSITION": { "message": ["Position <pos>."] }
            }
        }
    }"#;

    fn override_entry(message: &str, sql_state: Option<&str>) -> ErrorClassEntry {
        ErrorClassEntry {
            message: vec![message.into()],
            sql_state: sql_state.map(str::to_owned),
            sub_class: BTreeMap::new(),
        }
    }

    #[test]
    fn override_message_keeps_sub_classes_and_sql_state() {
        let mut reg = TemplateRegistry::from_json_str(SYNTAX_CATALOG).unwrap();
        reg.override_message(
            "PARSE_SYNTAX_ERROR",
            override_entry("Invalid syntax at <token>.", None),
        )
        .unwrap();

        let p = params(&[("token", "x"), ("pos", "0")]);
        assert_eq!(
            reg.resolve("PARSE_SYNTAX_ERROR", &p).unwrap(),
            "Invalid syntax at x."
        );
        assert_eq!(
            reg.resolve("PARSE_SYNTAX_ERROR.WITH_POSITION", &p).unwrap(),
            "Invalid syntax at x. Position 0."
        );
        assert_eq!(reg.sql_state("PARSE_SYNTAX_ERROR"), Some("42601"));
    }

    #[test]
    fn override_message_sql_state_wins_when_given() {
        let mut reg = TemplateRegistry::from_json_str(SYNTAX_CATALOG).unwrap();
        reg.override_message("PARSE_SYNTAX_ERROR", override_entry("m", Some("42000")))
            .unwrap();
        assert_eq!(reg.sql_state("PARSE_SYNTAX_ERROR.WITH_POSITION"), Some("42000"));
    }

    #[test]
    fn override_message_adds_new_sub_classes() {
        let mut reg = TemplateRegistry::from_json_str(SYNTAX_CATALOG).unwrap();
        let mut entry = override_entry("Syntax error near <token>.", None);
        entry.sub_class.insert(
            "WITH_LINE".into(),
            SubClassEntry {
                message: vec!["Line <line>.".into()],
            },
        );
        reg.override_message("PARSE_SYNTAX_ERROR", entry).unwrap();
        assert!(reg.contains("PARSE_SYNTAX_ERROR.WITH_POSITION"));
        assert!(reg.contains("PARSE_SYNTAX_ERROR.WITH_LINE"));
    }

    #[test]
    fn override_message_inserts_unknown_class() {
        let mut reg = TemplateRegistry::new();
        reg.override_message("FRESH", override_entry("fresh", Some("22000")))
            .unwrap();
        assert_eq!(reg.template("FRESH").unwrap(), "fresh");
        assert_eq!(reg.sql_state("FRESH"), Some("22000"));
    }

    #[test]
    fn override_message_rejects_bad_sub_class_without_partial_update() {
        let mut reg = TemplateRegistry::from_json_str(SYNTAX_CATALOG).unwrap();
        let before = reg.clone();
        let mut entry = override_entry("changed", None);
        entry.sub_class.insert(
            "bad id".into(),
            SubClassEntry {
                message: vec!["b".into()],
            },
        );
        let err = reg.override_message("PARSE_SYNTAX_ERROR", entry).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidClassId { .. }));
        assert_eq!(reg, before);
    }

    #[test]
    fn extend_overlay_wins() {
        let mut base = TemplateRegistry::new()
            .with_template("A", "base a")
            .unwrap()
            .with_template("B", "base b")
            .unwrap();
        let overlay = TemplateRegistry::new().with_template("A", "overlay a").unwrap();
        base.extend(overlay);
        assert_eq!(base.len(), 2);
        assert_eq!(base.template("A").unwrap(), "overlay a");
        assert_eq!(base.template("B").unwrap(), "base b");
    }

    #[test]
    fn insert_replaces_existing_class() {
        let mut reg = TemplateRegistry::new();
        reg.insert("A", "one").unwrap();
        reg.insert("A", "two").unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.resolve("A", &BTreeMap::new()).unwrap(), "two");
    }

    // -- Resolver seam ----------------------------------------------------

    struct Fixed;

    impl TemplateResolver for Fixed {
        fn resolve(
            &self,
            class: &str,
            _params: &BTreeMap<String, String>,
        ) -> Result<String, TemplateError> {
            Ok(format!("fixed {class}"))
        }
    }

    #[test]
    fn default_sql_state_is_none() {
        assert_eq!(Fixed.sql_state("ANY"), None);
        let dynamic: &dyn TemplateResolver = &Fixed;
        assert_eq!(dynamic.resolve("X", &BTreeMap::new()).unwrap(), "fixed X");
    }

    #[test]
    fn registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TemplateRegistry>();
        assert_send_sync::<TemplateError>();
    }
}
