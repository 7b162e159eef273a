//! Structural flattening for documents without a settings delta.
//!
//! Object property names are chained with `_`; arrays end the descent and are
//! rendered as a single `", "`-joined string.

use polcmp_types::keys::KEY_SEPARATOR;
use polcmp_types::{FlatMap, FlatValue};
use serde_json::Value;
use tracing::debug;

use crate::config::FlattenConfig;
use crate::error::{FlattenError, FlattenResult};
use crate::nesting;

/// Flatten an arbitrary JSON value.
pub fn flatten_generic(config: &FlattenConfig, value: &Value) -> FlattenResult<FlatMap> {
    let map = flatten_value(config, value, "", 0, FlatMap::new())?;
    debug!(keys = map.len(), "flattened generic document");
    Ok(map)
}

/// `prefix` is carried untrimmed and only trimmed when a leaf is written.
fn flatten_value(
    config: &FlattenConfig,
    value: &Value,
    prefix: &str,
    depth: usize,
    mut acc: FlatMap,
) -> FlattenResult<FlatMap> {
    if depth > config.max_depth {
        return Err(FlattenError::malformed(
            leaf_key(prefix),
            format!("document nests deeper than {} levels", config.max_depth),
        ));
    }

    match value {
        Value::Object(properties) => {
            for (name, child) in properties {
                let path = format!("{prefix}{KEY_SEPARATOR}{name}");
                acc = flatten_value(config, child, &path, depth + 1, acc)?;
            }
        }
        Value::Array(items) => {
            let remaining = config.max_depth.saturating_sub(depth);
            if items.iter().any(|item| nesting::exceeds(item, remaining)) {
                return Err(FlattenError::malformed(
                    leaf_key(prefix),
                    format!("document nests deeper than {} levels", config.max_depth),
                ));
            }
            acc.insert(leaf_key(prefix), FlatValue::text(join_array(items)));
        }
        scalar => {
            acc.insert(leaf_key(prefix), FlatValue::Scalar(scalar.clone()));
        }
    }
    Ok(acc)
}

fn leaf_key(prefix: &str) -> String {
    prefix.trim_matches(KEY_SEPARATOR).to_string()
}

/// Strings verbatim, null as empty, everything else as compact JSON.
fn join_array(items: &[Value]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match item {
            Value::Null => {}
            Value::String(s) => out.push_str(s),
            other => out.push_str(&other.to_string()),
        }
    }
    out
}
