//! Depth checks on raw JSON.
//!
//! Decoding, cloning and rendering a `serde_json::Value` each recurse once per
//! level, so nesting is measured here with an explicit stack before any of
//! that happens.

use polcmp_types::is_complex_discriminator;
use polcmp_types::keys::{KEY_SEPARATOR, SETTINGS_DELTA};
use serde_json::Value;

use crate::config::FlattenConfig;
use crate::error::{FlattenError, FlattenResult};

const ODATA_TYPE: &str = "@odata.type";
const DEFINITION_ID: &str = "definitionId";
const CHILDREN: &str = "value";

/// True when `value` holds more than `limit` levels of arrays and objects.
pub fn exceeds(value: &Value, limit: usize) -> bool {
    let mut stack = vec![(value, 0usize)];
    while let Some((value, depth)) = stack.pop() {
        match value {
            Value::Array(items) => {
                if depth >= limit {
                    return true;
                }
                stack.extend(items.iter().map(|item| (item, depth + 1)));
            }
            Value::Object(fields) => {
                if depth >= limit {
                    return true;
                }
                stack.extend(fields.values().map(|field| (field, depth + 1)));
            }
            _ => {}
        }
    }
    false
}

/// Reject a settings-delta document whose setting tree, or any other field,
/// nests deeper than `config.max_depth`. Errors name the flattened key where
/// the limit was crossed, the same key the flattener itself would report.
pub fn check_settings_delta(config: &FlattenConfig, document: &Value) -> FlattenResult<()> {
    let Value::Object(root) = document else {
        if exceeds(document, config.max_depth) {
            return Err(too_deep("<document>", config));
        }
        return Ok(());
    };

    for (name, field) in root {
        match field {
            Value::Array(nodes) if name == SETTINGS_DELTA => check_nodes(config, nodes)?,
            other if exceeds(other, config.max_depth) => return Err(too_deep(name.as_str(), config)),
            _ => {}
        }
    }
    Ok(())
}

fn check_nodes(config: &FlattenConfig, nodes: &[Value]) -> FlattenResult<()> {
    let mut pending: Vec<(&Value, String, usize)> =
        nodes.iter().map(|node| (node, String::new(), 0)).collect();

    while let Some((node, prefix, depth)) = pending.pop() {
        let Value::Object(fields) = node else {
            if exceeds(node, config.max_depth) {
                return Err(too_deep(prefix, config));
            }
            continue;
        };

        let definition_id = fields
            .get(DEFINITION_ID)
            .and_then(Value::as_str)
            .unwrap_or_default();
        let key = config.addressing.key(&prefix, definition_id, config.delimiter);
        let complex = fields
            .get(ODATA_TYPE)
            .and_then(Value::as_str)
            .is_some_and(is_complex_discriminator);

        for (name, field) in fields {
            match field {
                Value::Array(children) if complex && name == CHILDREN => {
                    if depth + 1 > config.max_depth {
                        return Err(too_deep(key, config));
                    }
                    pending.extend(children.iter().map(|child| (child, key.clone(), depth + 1)));
                }
                other if exceeds(other, config.max_depth) => {
                    return Err(too_deep(format!("{key}{KEY_SEPARATOR}{name}"), config));
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn too_deep(path: impl Into<String>, config: &FlattenConfig) -> FlattenError {
    FlattenError::malformed(
        path,
        format!("setting tree nests deeper than {} levels", config.max_depth),
    )
}
