//! Key classifier for Policy Compare.
//!
//! Classifies every key of two flattened documents as `MATCH`, `DIFF` or
//! `CONFLICT` (header metadata stays unclassified) and bundles the rows with
//! the two document names into a report.
//!
//! # Key Types
//!
//! - [`ComparisonRow`] / [`Cell`] / [`Outcome`] -- One classified key
//! - [`ComparisonReport`] / [`Summary`] -- All rows plus column headers and counts
//! - [`CompareOptions`] -- Extra keys to drop before classification

pub mod classify;
pub mod report;

pub use classify::{classify, outcome_for, Cell, ComparisonRow, Outcome};
pub use report::{
    compare, CompareOptions, ComparisonReport, Summary, DEFAULT_LEFT_NAME, DEFAULT_RIGHT_NAME,
};
