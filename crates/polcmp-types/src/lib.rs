//! Foundation types for Policy Compare.
//!
//! This crate provides the document model and the flat key/value shapes the
//! flattener produces and the classifier consumes. Every other polcmp crate
//! depends on `polcmp-types`.
//!
//! # Key Types
//!
//! - [`PolicyDocument`] — A policy export: header metadata plus its settings delta
//! - [`SettingNode`] / [`SettingKind`] — One setting, decoded into Simple, Complex or Abstract
//! - [`FlatValue`] — A flattened scalar or the `ARRAY` sentinel
//! - [`FlatMap`] — Insertion-ordered key → value map, later writes win
//! - [`KeyAddressingMode`] — Full definition id or last segment only

pub mod addressing;
pub mod document;
pub mod error;
pub mod keys;
pub mod value;

pub use addressing::{join_key, KeyAddressingMode};
pub use document::{is_complex_discriminator, kind_of, PolicyDocument, SettingKind, SettingNode};
pub use error::{DocumentError, DocumentResult};
pub use value::{write_scalar, FlatMap, FlatValue};
