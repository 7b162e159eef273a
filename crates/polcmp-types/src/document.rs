//! Policy documents and their setting trees.
//!
//! Setting nodes arrive as loosely typed JSON objects discriminated by an
//! `@odata.type` string. They are decoded once into [`SettingNode`] so the
//! rest of the workspace can dispatch with `match`.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{DocumentError, DocumentResult};

/// Discriminator fragment marking an abstract (implementation-selecting)
/// setting.
const ABSTRACT_MARKER: &str = "AbstractComplexSettingInstance";
/// Discriminator fragment marking a complex setting.
const COMPLEX_MARKER: &str = "Complex";
/// Discriminator fragment excluding a complex setting from the complex kind.
const ABSTRACT_FRAGMENT: &str = "Abstract";

/// A policy export: header metadata plus its settings delta.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "roleScopeTagIds", default)]
    pub role_scope_tag_ids: Option<Vec<String>>,
    #[serde(rename = "TemplateDisplayName", default)]
    pub template_display_name: Option<String>,
    #[serde(rename = "TemplateId", default)]
    pub template_id: Option<String>,
    #[serde(rename = "versionInfo", default)]
    pub version_info: Option<Value>,
    /// `None` when the document has no `settingsDelta` field at all.
    #[serde(rename = "settingsDelta", default)]
    pub settings_delta: Option<Vec<SettingNode>>,
}

impl PolicyDocument {
    /// Decode a document from JSON text.
    pub fn from_json_str(json: &str) -> DocumentResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode a document from an already parsed JSON value.
    pub fn from_value(value: Value) -> DocumentResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Role scope tags joined with `|`, empty when absent.
    pub fn joined_role_scope_tags(&self) -> String {
        self.role_scope_tag_ids
            .as_deref()
            .unwrap_or_default()
            .join("|")
    }
}

/// One entry of a settings delta.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawSettingNode")]
pub struct SettingNode {
    /// Instance id of this node, if the export carries one.
    pub id: Option<String>,
    /// Possibly multi-segment identifier of the setting definition.
    pub definition_id: String,
    /// The decoded variant.
    pub kind: SettingKind,
}

/// The three mutually exclusive kinds of setting node.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingKind {
    /// A leaf holding a scalar value.
    Simple { value: Value },
    /// A container whose children are flattened beneath it.
    Complex { children: Vec<SettingNode> },
    /// A setting that selects one implementation and carries its parameters
    /// as an embedded JSON object.
    Abstract {
        implementation_id: Option<Value>,
        /// Usually a string holding serialized JSON; an inline object is
        /// accepted as well. Decoded lazily by the flattener.
        value_json: Option<Value>,
    },
}

impl SettingNode {
    /// A simple node.
    pub fn simple(definition_id: impl Into<String>, value: Value) -> Self {
        Self {
            id: None,
            definition_id: definition_id.into(),
            kind: SettingKind::Simple { value },
        }
    }

    /// A complex node with the given children.
    pub fn complex(definition_id: impl Into<String>, children: Vec<SettingNode>) -> Self {
        Self {
            id: None,
            definition_id: definition_id.into(),
            kind: SettingKind::Complex { children },
        }
    }

    /// An abstract node.
    pub fn abstract_setting(
        definition_id: impl Into<String>,
        implementation_id: Option<Value>,
        value_json: Option<Value>,
    ) -> Self {
        Self {
            id: None,
            definition_id: definition_id.into(),
            kind: SettingKind::Abstract {
                implementation_id,
                value_json,
            },
        }
    }
}

/// Wire form of a setting node, before the variant is decided.
#[derive(Deserialize)]
struct RawSettingNode {
    #[serde(rename = "@odata.type", default)]
    odata_type: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "definitionId")]
    definition_id: String,
    #[serde(rename = "valueJson", default)]
    value_json: Option<Value>,
    #[serde(default)]
    value: Value,
    #[serde(rename = "implementationId", default)]
    implementation_id: Option<Value>,
}

impl TryFrom<RawSettingNode> for SettingNode {
    type Error = DocumentError;

    fn try_from(raw: RawSettingNode) -> Result<Self, Self::Error> {
        let discriminator = raw.odata_type.as_deref().unwrap_or_default();

        let kind = if discriminator.contains(ABSTRACT_MARKER) {
            SettingKind::Abstract {
                implementation_id: raw.implementation_id,
                value_json: raw.value_json,
            }
        } else if is_complex_discriminator(discriminator) {
            if !raw.value.is_array() {
                return Err(DocumentError::MalformedNode {
                    definition_id: raw.definition_id,
                    reason: format!("complex setting value must be a list, got {}", kind_of(&raw.value)),
                });
            }
            let children: Vec<SettingNode> =
                serde_json::from_value(raw.value).map_err(|e| DocumentError::MalformedNode {
                    definition_id: raw.definition_id.clone(),
                    reason: e.to_string(),
                })?;
            SettingKind::Complex { children }
        } else {
            SettingKind::Simple { value: raw.value }
        };

        Ok(Self {
            id: raw.id,
            definition_id: raw.definition_id,
            kind,
        })
    }
}

/// True when an `@odata.type` value marks a complex (child-bearing) setting.
pub fn is_complex_discriminator(discriminator: &str) -> bool {
    discriminator.contains(COMPLEX_MARKER) && !discriminator.contains(ABSTRACT_FRAGMENT)
}

/// Short JSON type name used in error messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
