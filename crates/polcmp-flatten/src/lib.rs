//! Tree flattener for Policy Compare.
//!
//! Turns a policy document into an ordered `key → value` map that can be
//! compared key by key. Two strategies are supported:
//!
//! - **settings-delta**: header metadata, then every setting node. Complex
//!   nodes are expanded under their own key, abstract nodes contribute their
//!   implementation id and one key per parameter.
//! - **generic**: structural descent through any JSON object, with arrays
//!   collapsed into a single string.
//!
//! # Key Types
//!
//! - [`Flattener`] / [`FlattenConfig`] -- Entry point and its configuration
//! - [`FlattenedPolicy`] -- Result: shape, display name, flat entries
//! - [`FlattenError`] -- `MalformedInput` / `MissingRequiredField`

pub mod config;
pub mod error;
pub mod flattener;
pub mod nesting;
pub mod settings;
pub mod structural;

pub use config::{DocumentShape, FlattenConfig, ShapeSelection, DEFAULT_MAX_DEPTH};
pub use error::{FlattenError, FlattenResult};
pub use flattener::{detect_shape, flatten, FlattenedPolicy, Flattener};
pub use settings::seed_metadata;
pub use structural::flatten_generic;
