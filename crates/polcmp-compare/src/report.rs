//! Comparison reports: classified rows plus the two column headers.

use polcmp_flatten::FlattenedPolicy;
use polcmp_types::keys::is_ignored_property;
use polcmp_types::FlatMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{classify, ComparisonRow, Outcome};

/// Header used when the left document has no display name.
pub const DEFAULT_LEFT_NAME: &str = "Policy 1";
/// Header used when the right document has no display name.
pub const DEFAULT_RIGHT_NAME: &str = "Policy 2";

/// Options controlling which keys reach the classifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareOptions {
    /// Keys dropped in addition to the built-in bookkeeping properties.
    #[serde(default)]
    pub extra_ignored_keys: Vec<String>,
}

impl CompareOptions {
    /// Returns `true` if `key` never reaches the classifier.
    pub fn is_ignored(&self, key: &str) -> bool {
        is_ignored_property(key) || self.extra_ignored_keys.iter().any(|k| k == key)
    }
}

/// Per-outcome row counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub informational: usize,
    pub matches: usize,
    pub diffs: usize,
    pub conflicts: usize,
}

impl Summary {
    fn tally(rows: &[ComparisonRow]) -> Self {
        rows.iter().fold(Self::default(), |mut s, row| {
            match row.outcome {
                Outcome::Informational => s.informational += 1,
                Outcome::Match => s.matches += 1,
                Outcome::Diff => s.diffs += 1,
                Outcome::Conflict => s.conflicts += 1,
            }
            s
        })
    }
}

/// The result of comparing two documents.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ComparisonReport {
    /// Display name of the left document.
    pub left_name: Option<String>,
    /// Display name of the right document.
    pub right_name: Option<String>,
    /// One row per compared key.
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonReport {
    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Row counts per outcome.
    pub fn summary(&self) -> Summary {
        Summary::tally(&self.rows)
    }

    /// Returns `true` if no compared key is `Diff` or `Conflict`.
    pub fn is_equivalent(&self) -> bool {
        let s = self.summary();
        s.diffs == 0 && s.conflicts == 0
    }

    /// Rows with the given outcome.
    pub fn rows_with(&self, outcome: Outcome) -> impl Iterator<Item = &ComparisonRow> {
        self.rows.iter().filter(move |r| r.outcome == outcome)
    }

    /// Rows that need attention: `Diff` and `Conflict`.
    pub fn differences(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.rows
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Diff | Outcome::Conflict))
    }

    /// Look up the row for `key`.
    pub fn row(&self, key: &str) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// The four column headers: setting, left name, right name, status.
    pub fn headers(&self) -> [&str; 4] {
        [
            "Setting",
            self.left_name.as_deref().unwrap_or(DEFAULT_LEFT_NAME),
            self.right_name.as_deref().unwrap_or(DEFAULT_RIGHT_NAME),
            "Status",
        ]
    }
}

/// Compare two flattened documents.
///
/// Ignored keys are removed from both maps before classification, so they
/// never appear as rows.
pub fn compare(
    left: &FlattenedPolicy,
    right: &FlattenedPolicy,
    options: &CompareOptions,
) -> ComparisonReport {
    let left_entries = without_ignored(&left.entries, options);
    let right_entries = without_ignored(&right.entries, options);

    let report = ComparisonReport {
        left_name: left.display_name.clone(),
        right_name: right.display_name.clone(),
        rows: classify(&left_entries, &right_entries),
    };

    let summary = report.summary();
    debug!(
        rows = report.len(),
        matches = summary.matches,
        diffs = summary.diffs,
        conflicts = summary.conflicts,
        "compared documents"
    );
    report
}

fn without_ignored(entries: &FlatMap, options: &CompareOptions) -> FlatMap {
    let mut kept = entries.clone();
    kept.retain(|key, _| !options.is_ignored(key));
    kept
}
