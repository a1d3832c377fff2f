// SPDX-License-Identifier: MIT OR Apache-2.0
//! Classified errors for the Spark client layer.
//!
//! A [`SparkError`] is built from exactly one of:
//!
//! * a literal message, or
//! * a stable error class plus named message parameters, resolved through a
//!   [`TemplateResolver`] when the error is constructed.
//!
//! Every error has an [`ErrorKind`] for domain branching and an
//! [`InteropSet`] for generic value/type/attribute classification. Errors
//! are immutable once built.
//!
//! ```
//! use sce_error::{ErrorKind, SparkError};
//! use sce_templates::TemplateRegistry;
//! use std::collections::BTreeMap;
//!
//! let registry = TemplateRegistry::new()
//!     .with_template("DATETIME_OVERFLOW", "value {value} overflows datetime range")
//!     .unwrap();
//! let params = BTreeMap::from([("value".to_string(), "9999-99-99".to_string())]);
//! let err = SparkError::with_class(ErrorKind::DateTime, &registry, "DATETIME_OVERFLOW", params)
//!     .unwrap();
//! assert_eq!(
//!     err.to_string(),
//!     "[DATETIME_OVERFLOW] value 9999-99-99 overflows datetime range",
//! );
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod interop;
mod kind;

pub use interop::{Interop, InteropSet};
pub use kind::ErrorKind;
pub use sce_templates::{TemplateError, TemplateResolver};

use sce_templates::is_valid_error_class;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Named message parameters.
pub type MessageParameters = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Construction errors
// ---------------------------------------------------------------------------

/// Ways the literal-message / error-class exclusivity can be broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Both a literal message and an error class were supplied.
    MessageAndClass,
    /// Neither a literal message nor an error class was supplied.
    NeitherMessageNorClass,
    /// An error class was supplied without message parameters.
    ClassWithoutParameters,
    /// Message parameters were supplied without an error class.
    ParametersWithoutClass,
    /// The error class is not `CLASS` or `CLASS.SUB_CLASS` over `A-Z`, `0-9`,
    /// `_`.
    InvalidErrorClass,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MessageAndClass => "message and error class are mutually exclusive",
            Self::NeitherMessageNorClass => "either a message or an error class is required",
            Self::ClassWithoutParameters => "error class requires message parameters",
            Self::ParametersWithoutClass => "message parameters require an error class",
            Self::InvalidErrorClass => "malformed error class identifier",
        })
    }
}

/// Failure to construct a [`SparkError`].
///
/// These are caller or catalog bugs, never domain failures; they are not
/// converted into [`ErrorKind::Unknown`] errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    /// The message/class exclusivity contract was broken.
    #[error("error construction contract violated: {0}")]
    ContractViolation(Violation),

    /// The error class could not be resolved to a message.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

// ---------------------------------------------------------------------------
// SparkError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Message {
    Literal(String),
    Classified {
        error_class: String,
        parameters: MessageParameters,
        resolved: String,
    },
}

/// A classified client error.
///
/// Displays as `[ERROR_CLASS] message` when built from an error class and as
/// the bare message otherwise.
#[derive(Clone)]
pub struct SparkError {
    kind: ErrorKind,
    message: Message,
    interop: InteropSet,
    sql_state: Option<String>,
    source: Option<Arc<dyn StdError + Send + Sync>>,
}

impl SparkError {
    /// Build an error from a literal message.
    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Message::Literal(message.into()),
            interop: InteropSet::empty(),
            sql_state: None,
            source: None,
        }
    }

    /// Build an error from an error class, resolving its message through
    /// `resolver`.
    ///
    /// # Errors
    ///
    /// [`ConstructionError::Template`] when the class is unknown or a
    /// placeholder has no value.
    pub fn with_class<R>(
        kind: ErrorKind,
        resolver: &R,
        error_class: impl Into<String>,
        parameters: MessageParameters,
    ) -> Result<Self, ConstructionError>
    where
        R: TemplateResolver + ?Sized,
    {
        Self::builder(kind)
            .error_class(error_class)
            .parameters(parameters)
            .build(resolver)
    }

    /// Start a [`SparkErrorBuilder`].
    pub fn builder(kind: ErrorKind) -> SparkErrorBuilder {
        SparkErrorBuilder {
            kind,
            message: None,
            error_class: None,
            parameters: None,
            interop: InteropSet::empty(),
            sql_state: None,
            source: None,
        }
    }

    /// Add a generic capability tag.
    #[must_use]
    pub fn compose(mut self, cap: Interop) -> Self {
        self.interop = self.interop.with(cap);
        self
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Failure kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Shorthand for `self.kind().is_a(kind)`.
    pub fn is_a(&self, kind: ErrorKind) -> bool {
        self.kind.is_a(kind)
    }

    /// Error class, if built from one.
    pub fn error_class(&self) -> Option<&str> {
        match &self.message {
            Message::Classified { error_class, .. } => Some(error_class.as_str()),
            Message::Literal(_) => None,
        }
    }

    /// Message parameters, if built from an error class.
    pub fn message_parameters(&self) -> Option<&MessageParameters> {
        match &self.message {
            Message::Classified { parameters, .. } => Some(parameters),
            Message::Literal(_) => None,
        }
    }

    /// The resolved message without the class tag.
    pub fn message(&self) -> &str {
        match &self.message {
            Message::Literal(text) => text.as_str(),
            Message::Classified { resolved, .. } => resolved.as_str(),
        }
    }

    /// SQLSTATE for the error, when the catalog or caller supplied one.
    pub fn sql_state(&self) -> Option<&str> {
        self.sql_state.as_deref()
    }

    /// Whether retrying the failed operation may succeed.
    ///
    /// SQLSTATE classes `08` (connection exception) and `40` (transaction
    /// rollback) are transient; otherwise [`ErrorKind::is_transient`] decides.
    pub fn is_transient(&self) -> bool {
        match self.sql_state.as_deref() {
            Some(state) if state.starts_with("08") || state.starts_with("40") => true,
            _ => self.kind.is_transient(),
        }
    }

    /// Intrinsic capabilities of the kind plus any composed tags.
    pub fn interop(&self) -> InteropSet {
        self.kind.intrinsic_interop().union(self.interop)
    }

    /// Whether generic code should treat this error as `cap`.
    pub fn behaves_as(&self, cap: Interop) -> bool {
        self.interop().contains(cap)
    }

    /// Find the first [`SparkError`] in `err`'s source chain (including `err`
    /// itself) that behaves as `cap`.
    pub fn find_behaving_as<'a>(
        err: &'a (dyn StdError + 'static),
        cap: Interop,
    ) -> Option<&'a SparkError> {
        let mut current = Some(err);
        while let Some(e) = current {
            if let Some(spark) = e.downcast_ref::<SparkError>()
                && spark.behaves_as(cap)
            {
                return Some(spark);
            }
            current = e.source();
        }
        None
    }
}

impl fmt::Debug for SparkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("SparkError");
        d.field("kind", &self.kind);
        if let Some(class) = self.error_class() {
            d.field("error_class", &class);
        }
        if let Some(params) = self.message_parameters() {
            d.field("message_parameters", params);
        }
        d.field("message", &self.message());
        if !self.interop.is_empty() {
            d.field("interop", &self.interop);
        }
        if let Some(ref state) = self.sql_state {
            d.field("sql_state", state);
        }
        if let Some(ref src) = self.source {
            d.field("source", &src.to_string());
        }
        d.finish()
    }
}

impl fmt::Display for SparkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error_class() {
            Some(class) => write!(f, "[{class}] {}", self.message()),
            None => f.write_str(self.message()),
        }
    }
}

impl StdError for SparkError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Option-based construction of a [`SparkError`].
///
/// [`build`](Self::build) checks that exactly one of a literal message or an
/// error class with parameters was supplied.
pub struct SparkErrorBuilder {
    kind: ErrorKind,
    message: Option<String>,
    error_class: Option<String>,
    parameters: Option<MessageParameters>,
    interop: InteropSet,
    sql_state: Option<String>,
    source: Option<Arc<dyn StdError + Send + Sync>>,
}

impl SparkErrorBuilder {
    /// Set the literal message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the error class.
    #[must_use]
    pub fn error_class(mut self, error_class: impl Into<String>) -> Self {
        self.error_class = Some(error_class.into());
        self
    }

    /// Replace all message parameters.
    #[must_use]
    pub fn parameters(mut self, parameters: MessageParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Add one message parameter.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Add a generic capability tag.
    #[must_use]
    pub fn interop(mut self, cap: Interop) -> Self {
        self.interop = self.interop.with(cap);
        self
    }

    /// Override the SQLSTATE the catalog would supply.
    #[must_use]
    pub fn sql_state(mut self, sql_state: impl Into<String>) -> Self {
        self.sql_state = Some(sql_state.into());
        self
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Check the exclusivity contract and resolve the message.
    ///
    /// `resolver` is consulted only when an error class was supplied.
    ///
    /// # Errors
    ///
    /// [`ConstructionError::ContractViolation`] when the contract is broken,
    /// [`ConstructionError::Template`] when resolution fails.
    pub fn build<R>(self, resolver: &R) -> Result<SparkError, ConstructionError>
    where
        R: TemplateResolver + ?Sized,
    {
        let message = match (self.message, self.error_class, self.parameters) {
            (Some(text), None, None) => Message::Literal(text),
            (None, Some(error_class), Some(parameters)) => {
                let resolved = resolver.resolve(&error_class, &parameters)?;
                Message::Classified {
                    error_class,
                    parameters,
                    resolved,
                }
            }
            (Some(_), Some(_), _) => {
                return Err(ConstructionError::ContractViolation(Violation::MessageAndClass));
            }
            (None, None, None) => {
                return Err(ConstructionError::ContractViolation(
                    Violation::NeitherMessageNorClass,
                ));
            }
            (None, Some(_), None) => {
                return Err(ConstructionError::ContractViolation(
                    Violation::ClassWithoutParameters,
                ));
            }
            (_, None, Some(_)) => {
                return Err(ConstructionError::ContractViolation(
                    Violation::ParametersWithoutClass,
                ));
            }
        };

        let sql_state = self.sql_state.or_else(|| match &message {
            Message::Classified { error_class, .. } => {
                resolver.sql_state(error_class).map(str::to_owned)
            }
            Message::Literal(_) => None,
        });

        Ok(SparkError {
            kind: self.kind,
            message,
            interop: self.interop,
            sql_state,
            source: self.source,
        })
    }
}

// ---------------------------------------------------------------------------
// Serialization support
// ---------------------------------------------------------------------------

/// Serialisable snapshot of a [`SparkError`] (without the opaque source).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SparkErrorDto {
    /// Failure kind.
    pub kind: ErrorKind,
    /// Error class, when built from one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_class: Option<String>,
    /// Message parameters, when built from an error class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_parameters: Option<MessageParameters>,
    /// Resolved message without the class tag.
    pub message: String,
    /// SQLSTATE, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_state: Option<String>,
    /// Composed capability tags (intrinsic kind tags are implied).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interop: Vec<Interop>,
    /// String representation of the source error, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_message: Option<String>,
}

impl From<&SparkError> for SparkErrorDto {
    fn from(err: &SparkError) -> Self {
        Self {
            kind: err.kind,
            error_class: err.error_class().map(str::to_owned),
            message_parameters: err.message_parameters().cloned(),
            message: err.message().to_owned(),
            sql_state: err.sql_state.clone(),
            interop: err.interop.iter().collect(),
            source_message: err.source.as_ref().map(|s| s.to_string()),
        }
    }
}

impl TryFrom<SparkErrorDto> for SparkError {
    type Error = ConstructionError;

    /// Rebuild an error from a snapshot. The message is taken as already
    /// resolved; the source is lost. The error class must be well formed.
    fn try_from(dto: SparkErrorDto) -> Result<Self, Self::Error> {
        let message = match (dto.error_class, dto.message_parameters) {
            (Some(error_class), Some(_)) if !is_valid_error_class(&error_class) => {
                return Err(ConstructionError::ContractViolation(
                    Violation::InvalidErrorClass,
                ));
            }
            (Some(error_class), Some(parameters)) => Message::Classified {
                error_class,
                parameters,
                resolved: dto.message,
            },
            (None, None) => Message::Literal(dto.message),
            (Some(_), None) => {
                return Err(ConstructionError::ContractViolation(
                    Violation::ClassWithoutParameters,
                ));
            }
            (None, Some(_)) => {
                return Err(ConstructionError::ContractViolation(
                    Violation::ParametersWithoutClass,
                ));
            }
        };
        Ok(Self {
            kind: dto.kind,
            message,
            interop: dto.interop.into_iter().collect(),
            sql_state: dto.sql_state,
            source: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
