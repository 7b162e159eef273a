//! Settings-delta flattening.
//!
//! Walks a [`PolicyDocument`]'s setting tree depth-first. The output map is
//! threaded through the recursion by value: each call takes the map built so
//! far and hands back the extended one.

use polcmp_types::keys::{
    self, IMPLEMENTATION_ID_PROPERTY, KEY_SEPARATOR, SETTINGS_DELTA,
};
use polcmp_types::{kind_of, FlatMap, FlatValue, PolicyDocument, SettingKind, SettingNode};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::FlattenConfig;
use crate::error::{FlattenError, FlattenResult};

/// Flatten a settings-delta document: metadata first, then every setting.
pub fn flatten_document(
    config: &FlattenConfig,
    document: &PolicyDocument,
) -> FlattenResult<FlatMap> {
    let nodes = document
        .settings_delta
        .as_deref()
        .ok_or(FlattenError::MissingRequiredField(SETTINGS_DELTA))?;

    let map = flatten_nodes(config, nodes, "", 0, seed_metadata(document))?;
    debug!(
        keys = map.len(),
        settings = nodes.len(),
        addressing = %config.addressing,
        "flattened settings-delta document"
    );
    Ok(map)
}

/// The six header keys. Absent fields become null; absent role scope tags
/// become the empty string.
pub fn seed_metadata(document: &PolicyDocument) -> FlatMap {
    let text_or_null = |field: &'static str, value: &Option<String>| match value {
        Some(s) => FlatValue::text(s.clone()),
        None => {
            debug!(field, "metadata field absent");
            FlatValue::null()
        }
    };

    let mut map = FlatMap::new();
    map.insert(
        keys::DISPLAY_NAME,
        text_or_null(keys::DISPLAY_NAME, &document.display_name),
    );
    map.insert(
        keys::DESCRIPTION,
        text_or_null(keys::DESCRIPTION, &document.description),
    );
    map.insert(
        keys::ROLE_SCOPE_TAG_IDS,
        FlatValue::text(document.joined_role_scope_tags()),
    );
    map.insert(
        keys::TEMPLATE_DISPLAY_NAME,
        text_or_null(keys::TEMPLATE_DISPLAY_NAME, &document.template_display_name),
    );
    map.insert(
        keys::TEMPLATE_ID,
        text_or_null(keys::TEMPLATE_ID, &document.template_id),
    );
    map.insert(
        keys::VERSION_INFO,
        document
            .version_info
            .clone()
            .map_or_else(FlatValue::null, FlatValue::Scalar),
    );
    map
}

/// Flatten `nodes` beneath `prefix` into `acc`.
pub fn flatten_nodes(
    config: &FlattenConfig,
    nodes: &[SettingNode],
    prefix: &str,
    depth: usize,
    mut acc: FlatMap,
) -> FlattenResult<FlatMap> {
    if depth > config.max_depth {
        return Err(FlattenError::malformed(
            prefix,
            format!("setting tree nests deeper than {} levels", config.max_depth),
        ));
    }

    for node in nodes {
        let key = config
            .addressing
            .key(prefix, &node.definition_id, config.delimiter);

        acc = match &node.kind {
            SettingKind::Simple { value } => {
                write(&mut acc, key, FlatValue::Scalar(value.clone()));
                acc
            }
            SettingKind::Complex { children } => {
                debug!(key = %key, children = children.len(), depth, "expanding complex setting");
                write(&mut acc, key.clone(), FlatValue::Array);
                flatten_nodes(config, children, &key, depth + 1, acc)?
            }
            SettingKind::Abstract {
                implementation_id,
                value_json,
            } => flatten_abstract(key, implementation_id.as_ref(), value_json.as_ref(), acc)?,
        };
    }

    Ok(acc)
}

/// Write the chosen implementation under `key` and, when one is chosen, each
/// of its parameters under `key_<name>` as compact JSON text.
fn flatten_abstract(
    key: String,
    implementation_id: Option<&Value>,
    value_json: Option<&Value>,
    mut acc: FlatMap,
) -> FlattenResult<FlatMap> {
    let Some(implementation) = implementation_id else {
        write(&mut acc, key, FlatValue::null());
        return Ok(acc);
    };
    write(&mut acc, key.clone(), FlatValue::Scalar(implementation.clone()));

    let parameters = embedded_object(&key, value_json)?;
    for (name, value) in parameters {
        if name == IMPLEMENTATION_ID_PROPERTY {
            continue;
        }
        write(
            &mut acc,
            format!("{key}{KEY_SEPARATOR}{name}"),
            FlatValue::text(value.to_string()),
        );
    }
    Ok(acc)
}

/// Decode an abstract setting's parameters. Only the top level is read;
/// nested values stay whole.
fn embedded_object(key: &str, value_json: Option<&Value>) -> FlattenResult<Map<String, Value>> {
    match value_json {
        Some(Value::String(text)) => serde_json::from_str::<Map<String, Value>>(text)
            .map_err(|e| FlattenError::malformed(key, format!("valueJson is not a JSON object: {e}"))),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(FlattenError::malformed(
            key,
            format!("valueJson must be a JSON object string, got {}", kind_of(other)),
        )),
        None => Err(FlattenError::malformed(
            key,
            "abstract setting selects an implementation but has no valueJson",
        )),
    }
}

fn write(acc: &mut FlatMap, key: String, value: FlatValue) {
    if let Some(previous) = acc.insert(key.clone(), value) {
        warn!(key = %key, previous = %previous, "flattened key written twice; keeping the later value");
    }
}
