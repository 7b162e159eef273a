use serde::{Deserialize, Serialize};

use crate::keys::KEY_SEPARATOR;

/// How a setting's definition id is turned into a flattened key segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyAddressingMode {
    /// Use the whole definition id.
    Full,
    /// Use only the text after the last delimiter.
    #[default]
    LastSegment,
}

impl KeyAddressingMode {
    /// The key segment for `definition_id` under this mode.
    ///
    /// In `LastSegment` mode an id without the delimiter, or one ending with
    /// it, is used whole.
    pub fn segment<'a>(&self, definition_id: &'a str, delimiter: char) -> &'a str {
        match self {
            Self::Full => definition_id,
            Self::LastSegment => match definition_id.rsplit_once(delimiter) {
                Some((_, tail)) if !tail.is_empty() => tail,
                _ => definition_id,
            },
        }
    }

    /// Compute the flattened key for `definition_id` beneath `prefix`.
    pub fn key(&self, prefix: &str, definition_id: &str, delimiter: char) -> String {
        join_key(prefix, self.segment(definition_id, delimiter))
    }
}

impl std::fmt::Display for KeyAddressingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::LastSegment => write!(f, "last-segment"),
        }
    }
}

/// Join `prefix` and `name` with `_`, trimming separators from both ends.
pub fn join_key(prefix: &str, name: &str) -> String {
    format!("{prefix}{KEY_SEPARATOR}{name}")
        .trim_matches(KEY_SEPARATOR)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "device_vendor_msft_policy_config_defender_allowarchivescanning";

    #[test]
    fn full_mode_keeps_whole_id() {
        assert_eq!(KeyAddressingMode::Full.segment(ID, '_'), ID);
    }

    #[test]
    fn last_segment_mode_takes_tail() {
        assert_eq!(
            KeyAddressingMode::LastSegment.segment(ID, '_'),
            "allowarchivescanning"
        );
    }

    #[test]
    fn last_segment_without_delimiter_uses_whole_id() {
        assert_eq!(KeyAddressingMode::LastSegment.segment("x", '_'), "x");
        assert_eq!(KeyAddressingMode::LastSegment.segment("trailing_", '_'), "trailing_");
    }

    #[test]
    fn custom_delimiter() {
        assert_eq!(KeyAddressingMode::LastSegment.segment("a.b.c", '.'), "c");
        assert_eq!(KeyAddressingMode::LastSegment.segment("a_b.c", '.'), "c");
    }

    #[test]
    fn join_trims_separators() {
        assert_eq!(join_key("", "root"), "root");
        assert_eq!(join_key("root", "a"), "root_a");
        assert_eq!(join_key("", ""), "");
        assert_eq!(join_key("_root_", "a_"), "root__a");
    }

    #[test]
    fn key_applies_prefix_in_both_modes() {
        assert_eq!(KeyAddressingMode::LastSegment.key("p", "x_y", '_'), "p_y");
        assert_eq!(KeyAddressingMode::Full.key("p", "x_y", '_'), "p_x_y");
    }

    #[test]
    fn serde_names() {
        let mode: KeyAddressingMode = serde_json::from_str("\"last-segment\"").unwrap();
        assert_eq!(mode, KeyAddressingMode::LastSegment);
        assert_eq!(serde_json::to_string(&KeyAddressingMode::Full).unwrap(), "\"full\"");
        assert_eq!(KeyAddressingMode::default().to_string(), "last-segment");
    }
}
