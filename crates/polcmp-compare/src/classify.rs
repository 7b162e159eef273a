//! Key-level classification of two flattened documents.
//!
//! Every key of either map yields exactly one [`ComparisonRow`]. Keys are
//! visited in the left map's order, then the right-only keys in the right
//! map's order.

use std::fmt;

use polcmp_types::keys::{is_metadata_key, ARRAY_LABEL, MISSING_LABEL, NOT_CONFIGURED};
use polcmp_types::{write_scalar, FlatMap, FlatValue};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// One side of a comparison row.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// The key does not exist in this document.
    Missing,
    /// The key is a complex setting expanded into child keys.
    Array,
    /// A scalar value from the document.
    Value(Value),
}

impl Cell {
    /// Resolve a map lookup into a cell.
    pub fn resolve(entry: Option<&FlatValue>) -> Self {
        match entry {
            None => Self::Missing,
            Some(FlatValue::Array) => Self::Array,
            Some(FlatValue::Scalar(value)) => Self::Value(value.clone()),
        }
    }

    /// Absent or explicitly null: the key is not set.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Missing | Self::Value(Value::Null))
    }

    /// Absent, or a document value that literally reads `MISSING`.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Value(Value::String(s)) => s == MISSING_LABEL,
            _ => false,
        }
    }

    /// The policy's own "left unset" marker.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::Value(Value::String(s)) if s == NOT_CONFIGURED)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str(MISSING_LABEL),
            Self::Array => f.write_str(ARRAY_LABEL),
            Self::Value(value) => write_scalar(f, value),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Classification of a single key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Header metadata; shown, never compared.
    Informational,
    /// Both documents hold the same value.
    Match,
    /// One side is missing, unset or not configured.
    Diff,
    /// Both sides are configured with different values.
    Conflict,
}

impl Outcome {
    /// Report text: empty, `MATCH`, `DIFF` or `CONFLICT`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Informational => "",
            Self::Match => "MATCH",
            Self::Diff => "DIFF",
            Self::Conflict => "CONFLICT",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One classified key.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub key: String,
    pub left: Cell,
    pub right: Cell,
    pub outcome: Outcome,
}

/// Decide the outcome for `key`. Rules apply in order:
///
/// 1. metadata keys are informational;
/// 2. exactly one side unset is `Diff`;
/// 3. equal sides are `Match`;
/// 4. a not-configured or missing side is `Diff`;
/// 5. anything else is `Conflict`.
pub fn outcome_for(key: &str, left: &Cell, right: &Cell) -> Outcome {
    if is_metadata_key(key) {
        Outcome::Informational
    } else if left.is_unset() != right.is_unset() {
        Outcome::Diff
    } else if same_value(left, right) {
        Outcome::Match
    } else if left.is_not_configured()
        || right.is_not_configured()
        || left.is_missing()
        || right.is_missing()
    {
        Outcome::Diff
    } else {
        Outcome::Conflict
    }
}

/// Identity first, then structural equality.
fn same_value(left: &Cell, right: &Cell) -> bool {
    std::ptr::eq(left, right) || left == right
}

/// Classify every key in the union of `left` and `right`.
pub fn classify(left: &FlatMap, right: &FlatMap) -> Vec<ComparisonRow> {
    let right_only = right.keys().filter(|key| !left.contains_key(key));

    left.keys()
        .chain(right_only)
        .map(|key| {
            let l = Cell::resolve(left.get(key));
            let r = Cell::resolve(right.get(key));
            let outcome = outcome_for(key, &l, &r);
            ComparisonRow {
                key: key.to_string(),
                left: l,
                right: r,
                outcome,
            }
        })
        .collect()
}
