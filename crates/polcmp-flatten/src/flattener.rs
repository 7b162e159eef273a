use polcmp_types::keys::{DISPLAY_NAME, SETTINGS_DELTA, TEMPLATE_ID};
use polcmp_types::{FlatMap, PolicyDocument};
use serde_json::Value;
use tracing::debug;

use crate::config::{DocumentShape, FlattenConfig, ShapeSelection};
use crate::error::{FlattenError, FlattenResult};
use crate::{nesting, settings, structural};

/// A flattened document, ready for classification.
#[derive(Clone, Debug, PartialEq)]
pub struct FlattenedPolicy {
    /// Strategy that produced `entries`.
    pub shape: DocumentShape,
    /// The document's `displayName`, used as a report column header.
    pub display_name: Option<String>,
    /// Flattened key/value pairs in traversal order.
    pub entries: FlatMap,
}

/// Flattens policy documents according to a [`FlattenConfig`].
#[derive(Clone, Debug, Default)]
pub struct Flattener {
    config: FlattenConfig,
}

impl Flattener {
    /// Create a flattener with the given configuration.
    pub fn new(config: FlattenConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &FlattenConfig {
        &self.config
    }

    /// Parse JSON text and flatten it.
    pub fn flatten_str(&self, json: &str) -> FlattenResult<FlattenedPolicy> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| FlattenError::malformed("<document>", e.to_string()))?;
        self.flatten_json(&value)
    }

    /// Flatten a parsed JSON document, choosing the strategy from the
    /// configured [`ShapeSelection`].
    pub fn flatten_json(&self, value: &Value) -> FlattenResult<FlattenedPolicy> {
        let shape = match self.config.shape {
            ShapeSelection::Auto => detect_shape(value),
            ShapeSelection::SettingsDelta => DocumentShape::SettingsDelta,
            ShapeSelection::Generic => DocumentShape::Generic,
        };
        debug!(%shape, "flattening document");

        match shape {
            DocumentShape::SettingsDelta => {
                nesting::check_settings_delta(&self.config, value)?;
                let document = PolicyDocument::from_value(value.clone())?;
                let entries = self.flatten_document(&document)?;
                Ok(FlattenedPolicy {
                    shape,
                    display_name: document.display_name,
                    entries,
                })
            }
            DocumentShape::Generic => Ok(FlattenedPolicy {
                shape,
                display_name: value
                    .get(DISPLAY_NAME)
                    .and_then(Value::as_str)
                    .map(str::to_string),
                entries: self.flatten_generic(value)?,
            }),
        }
    }

    /// Flatten a decoded settings-delta document.
    pub fn flatten_document(&self, document: &PolicyDocument) -> FlattenResult<FlatMap> {
        settings::flatten_document(&self.config, document)
    }

    /// Flatten any JSON value structurally.
    pub fn flatten_generic(&self, value: &Value) -> FlattenResult<FlatMap> {
        structural::flatten_generic(&self.config, value)
    }
}

/// Flatten a settings-delta document with the default configuration.
pub fn flatten(document: &PolicyDocument) -> FlattenResult<FlatMap> {
    Flattener::default().flatten_document(document)
}

/// Settings-delta when the top-level object carries a template identity or a
/// settings delta; generic otherwise.
pub fn detect_shape(value: &Value) -> DocumentShape {
    match value {
        Value::Object(map) if map.contains_key(TEMPLATE_ID) || map.contains_key(SETTINGS_DELTA) => {
            DocumentShape::SettingsDelta
        }
        _ => DocumentShape::Generic,
    }
}
