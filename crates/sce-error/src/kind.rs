// SPDX-License-Identifier: MIT OR Apache-2.0
//! The closed failure taxonomy.

use crate::interop::{Interop, InteropSet};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of failure a [`SparkError`](crate::SparkError) represents.
///
/// Kinds form a fixed refinement tree rooted at [`ErrorKind::Base`]. A kind
/// adds no data and no rendering behaviour; it exists so callers can branch
/// on what went wrong, e.g. "any analysis failure" via
/// [`is_a`](ErrorKind::is_a).
///
/// ```text
/// Base
/// ├─ Analysis
/// │  ├─ TempViewAlreadyExists
/// │  └─ Parse
/// ├─ IllegalArgument
/// │  └─ NumberFormat
/// ├─ Arithmetic, IndexOutOfBounds, DateTime
/// ├─ StreamingQuery, QueryExecution, Worker
/// ├─ Runtime, Upgrade, Unknown
/// └─ Value, TypeMismatch, AttributeAccess
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Root of the taxonomy; a failure with no more specific kind.
    Base,
    /// Failed to analyze a query plan.
    Analysis,
    /// Failed to create a temporary view because it already exists.
    TempViewAlreadyExists,
    /// Failed to parse a SQL command.
    Parse,
    /// An illegal or inappropriate argument was passed.
    IllegalArgument,
    /// A string could not be converted to a number.
    NumberFormat,
    /// Arithmetic failure such as overflow or division by zero.
    Arithmetic,
    /// An array or collection index was out of bounds.
    IndexOutOfBounds,
    /// Datetime parsing, formatting or range failure.
    DateTime,
    /// A failure that stopped a streaming query.
    StreamingQuery,
    /// Failed to execute a query.
    QueryExecution,
    /// Raised from remote or out-of-process worker execution.
    Worker,
    /// Engine runtime failure.
    Runtime,
    /// Behaviour changed because of an engine upgrade.
    Upgrade,
    /// None of the other kinds apply.
    Unknown,
    /// Wrong value; also classifiable as a generic value failure.
    Value,
    /// Wrong type; also classifiable as a generic type failure.
    TypeMismatch,
    /// Missing or inaccessible attribute; also a generic attribute failure.
    AttributeAccess,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [ErrorKind; 18] = [
        Self::Base,
        Self::Analysis,
        Self::TempViewAlreadyExists,
        Self::Parse,
        Self::IllegalArgument,
        Self::NumberFormat,
        Self::Arithmetic,
        Self::IndexOutOfBounds,
        Self::DateTime,
        Self::StreamingQuery,
        Self::QueryExecution,
        Self::Worker,
        Self::Runtime,
        Self::Upgrade,
        Self::Unknown,
        Self::Value,
        Self::TypeMismatch,
        Self::AttributeAccess,
    ];

    /// The kind this one directly refines. `None` only for [`ErrorKind::Base`].
    pub const fn parent(self) -> Option<ErrorKind> {
        match self {
            Self::Base => None,
            Self::TempViewAlreadyExists | Self::Parse => Some(Self::Analysis),
            Self::NumberFormat => Some(Self::IllegalArgument),
            Self::Analysis
            | Self::IllegalArgument
            | Self::Arithmetic
            | Self::IndexOutOfBounds
            | Self::DateTime
            | Self::StreamingQuery
            | Self::QueryExecution
            | Self::Worker
            | Self::Runtime
            | Self::Upgrade
            | Self::Unknown
            | Self::Value
            | Self::TypeMismatch
            | Self::AttributeAccess => Some(Self::Base),
        }
    }

    /// Strict ancestors, nearest first, ending at [`ErrorKind::Base`].
    pub fn ancestors(self) -> impl Iterator<Item = ErrorKind> {
        std::iter::successors(self.parent(), |k| k.parent())
    }

    /// Whether `self` is `other` or refines it.
    pub fn is_a(self, other: ErrorKind) -> bool {
        self == other || self.ancestors().any(|k| k == other)
    }

    /// Generic capabilities every error of this kind has.
    pub const fn intrinsic_interop(self) -> InteropSet {
        match self {
            Self::Value => InteropSet::of(Interop::Value),
            Self::TypeMismatch => InteropSet::of(Interop::Type),
            Self::AttributeAccess => InteropSet::of(Interop::Attribute),
            _ => InteropSet::empty(),
        }
    }

    /// Default transient classification for the kind.
    ///
    /// Only worker failures are retryable by default.
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Worker)
    }

    /// Stable `SCREAMING_SNAKE_CASE` name, identical to the serde form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base => "BASE",
            Self::Analysis => "ANALYSIS",
            Self::TempViewAlreadyExists => "TEMP_VIEW_ALREADY_EXISTS",
            Self::Parse => "PARSE",
            Self::IllegalArgument => "ILLEGAL_ARGUMENT",
            Self::NumberFormat => "NUMBER_FORMAT",
            Self::Arithmetic => "ARITHMETIC",
            Self::IndexOutOfBounds => "INDEX_OUT_OF_BOUNDS",
            Self::DateTime => "DATE_TIME",
            Self::StreamingQuery => "STREAMING_QUERY",
            Self::QueryExecution => "QUERY_EXECUTION",
            Self::Worker => "WORKER",
            Self::Runtime => "RUNTIME",
            Self::Upgrade => "UPGRADE",
            Self::Unknown => "UNKNOWN",
            Self::Value => "VALUE",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::AttributeAccess => "ATTRIBUTE_ACCESS",
        }
    }

    /// One-line description of the kind.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Base => "error raised by the client",
            Self::Analysis => "failed to analyze a query plan",
            Self::TempViewAlreadyExists => "temporary view already exists",
            Self::Parse => "failed to parse a SQL command",
            Self::IllegalArgument => "illegal or inappropriate argument",
            Self::NumberFormat => "invalid number format",
            Self::Arithmetic => "arithmetic failure",
            Self::IndexOutOfBounds => "index out of bounds",
            Self::DateTime => "datetime failure",
            Self::StreamingQuery => "streaming query stopped",
            Self::QueryExecution => "failed to execute a query",
            Self::Worker => "failure in a worker process",
            Self::Runtime => "engine runtime failure",
            Self::Upgrade => "behaviour changed by an upgrade",
            Self::Unknown => "unclassified failure",
            Self::Value => "invalid value",
            Self::TypeMismatch => "invalid type",
            Self::AttributeAccess => "invalid attribute access",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
