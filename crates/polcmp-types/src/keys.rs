//! Well-known key names and marker strings shared by the flattener and the
//! classifier.

/// Flattened key for the document display name.
pub const DISPLAY_NAME: &str = "displayName";
/// Flattened key for the document description.
pub const DESCRIPTION: &str = "description";
/// Flattened key for the `|`-joined role scope tags.
pub const ROLE_SCOPE_TAG_IDS: &str = "roleScopeTagIds";
/// Flattened key for the template display name.
pub const TEMPLATE_DISPLAY_NAME: &str = "TemplateDisplayName";
/// Flattened key for the template identity. Its presence also marks a
/// settings-delta document.
pub const TEMPLATE_ID: &str = "TemplateId";
/// Flattened key for the version information.
pub const VERSION_INFO: &str = "versionInfo";

/// Header keys. Always emitted, never classified.
pub const METADATA_KEYS: [&str; 6] = [
    DISPLAY_NAME,
    DESCRIPTION,
    ROLE_SCOPE_TAG_IDS,
    TEMPLATE_DISPLAY_NAME,
    TEMPLATE_ID,
    VERSION_INFO,
];

/// Bookkeeping properties dropped before classification.
pub const IGNORED_PROPERTIES: [&str; 4] =
    ["@odata.type", "id", "lastModifiedDateTime", "createdDateTime"];

/// Document field holding the list of setting nodes.
pub const SETTINGS_DELTA: &str = "settingsDelta";

/// Property inside an abstract setting's value object naming the chosen
/// implementation. Never emitted as a flattened key.
pub const IMPLEMENTATION_ID_PROPERTY: &str = "$implementationId";

/// Scalar value a policy uses for a setting that was left unset.
pub const NOT_CONFIGURED: &str = "notConfigured";

/// Rendered form of a key absent from one document.
pub const MISSING_LABEL: &str = "MISSING";

/// Rendered form of a complex setting expanded into child keys.
pub const ARRAY_LABEL: &str = "ARRAY";

/// Separator joining a prefix and a setting segment.
pub const KEY_SEPARATOR: char = '_';

/// Returns `true` if `key` is one of the header keys.
pub fn is_metadata_key(key: &str) -> bool {
    METADATA_KEYS.contains(&key)
}

/// Returns `true` if `key` is a bookkeeping property.
pub fn is_ignored_property(key: &str) -> bool {
    IGNORED_PROPERTIES.contains(&key)
}
