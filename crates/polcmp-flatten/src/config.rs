use std::fmt;

use polcmp_types::KeyAddressingMode;
use serde::{Deserialize, Serialize};

/// Default cap on setting-tree nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Which flattening strategy to apply to a document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeSelection {
    /// Sniff the document: settings-delta when it carries a template
    /// identity or a settings delta, structural otherwise.
    #[default]
    Auto,
    /// Always treat the input as a settings-delta document.
    SettingsDelta,
    /// Always flatten the input structurally.
    Generic,
}

/// The strategy actually used for a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentShape {
    SettingsDelta,
    Generic,
}

impl fmt::Display for DocumentShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SettingsDelta => write!(f, "settings-delta"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// Configuration for the flattener.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenConfig {
    /// How definition ids become key segments.
    pub addressing: KeyAddressingMode,
    /// Delimiter separating definition id segments.
    pub delimiter: char,
    /// Maximum nesting depth before the input is rejected.
    pub max_depth: usize,
    /// Strategy selection.
    pub shape: ShapeSelection,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            addressing: KeyAddressingMode::LastSegment,
            delimiter: '_',
            max_depth: DEFAULT_MAX_DEPTH,
            shape: ShapeSelection::Auto,
        }
    }
}

impl FlattenConfig {
    /// Same configuration with a different addressing mode.
    pub fn with_addressing(self, addressing: KeyAddressingMode) -> Self {
        Self { addressing, ..self }
    }

    /// Same configuration with a forced shape.
    pub fn with_shape(self, shape: ShapeSelection) -> Self {
        Self { shape, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = FlattenConfig::default();
        assert_eq!(c.addressing, KeyAddressingMode::LastSegment);
        assert_eq!(c.delimiter, '_');
        assert_eq!(c.max_depth, 64);
        assert_eq!(c.shape, ShapeSelection::Auto);
    }

    #[test]
    fn builders_replace_one_field() {
        let c = FlattenConfig::default()
            .with_addressing(KeyAddressingMode::Full)
            .with_shape(ShapeSelection::Generic);
        assert_eq!(c.addressing, KeyAddressingMode::Full);
        assert_eq!(c.shape, ShapeSelection::Generic);
        assert_eq!(c.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn shape_names() {
        let s: ShapeSelection = serde_json::from_str("\"settings-delta\"").unwrap();
        assert_eq!(s, ShapeSelection::SettingsDelta);
        assert_eq!(DocumentShape::Generic.to_string(), "generic");
    }
}
