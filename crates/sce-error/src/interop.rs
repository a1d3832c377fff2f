// SPDX-License-Identifier: MIT OR Apache-2.0
//! Generic capability tags.
//!
//! Code that knows nothing about [`ErrorKind`](crate::ErrorKind) can still ask
//! whether a failure is a generic "wrong value", "wrong type" or "missing
//! attribute" problem. The tags live beside the error's single message, so
//! composing a capability never copies message, class or parameters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A generic error category an error can also be classified under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Interop {
    /// The error behaves as a value error.
    Value,
    /// The error behaves as a type error.
    Type,
    /// The error behaves as an attribute error.
    Attribute,
}

impl Interop {
    /// Every capability, in declaration order.
    pub const ALL: [Interop; 3] = [Self::Value, Self::Type, Self::Attribute];

    const fn bit(self) -> u8 {
        match self {
            Self::Value => 1,
            Self::Type => 1 << 1,
            Self::Attribute => 1 << 2,
        }
    }

    /// Stable lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Type => "type",
            Self::Attribute => "attribute",
        }
    }
}

impl fmt::Display for Interop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of [`Interop`] tags.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InteropSet(u8);

impl InteropSet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// A set holding only `cap`.
    pub const fn of(cap: Interop) -> Self {
        Self(cap.bit())
    }

    /// `self` plus `cap`.
    #[must_use]
    pub const fn with(self, cap: Interop) -> Self {
        Self(self.0 | cap.bit())
    }

    /// Every tag in `self` or `other`.
    #[must_use]
    pub const fn union(self, other: InteropSet) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether `cap` is in the set.
    pub const fn contains(self, cap: Interop) -> bool {
        self.0 & cap.bit() != 0
    }

    /// Whether the set has no tags.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of tags in the set.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Tags in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Interop> {
        Interop::ALL.into_iter().filter(move |cap| self.contains(*cap))
    }
}

impl fmt::Debug for InteropSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Interop> for InteropSet {
    fn from_iter<I: IntoIterator<Item = Interop>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl From<Interop> for InteropSet {
    fn from(cap: Interop) -> Self {
        Self::of(cap)
    }
}
