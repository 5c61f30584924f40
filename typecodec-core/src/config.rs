//! Codec configuration

use crate::constants::{
    DEFAULT_ELEM_NAME, DEFAULT_ENTRY_ELEM_NAME, DEFAULT_KEY_ELEM_NAME, DEFAULT_MAX_DEPTH,
    DEFAULT_TYPE_ATTR_NAME, DEFAULT_VALUE_ELEM_NAME,
};
use serde::{Deserialize, Serialize};

/// Labels and limits shared by every codec built from one registry.
///
/// Labels are cosmetic: changing them changes the token stream but never the
/// decoded values, as long as encoder and decoder agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Label for one map entry
    pub entry_elem_name: String,

    /// Label wrapping a map key
    pub key_elem_name: String,

    /// Label wrapping a map value
    pub value_elem_name: String,

    /// Label wrapping one array element
    pub elem_name: String,

    /// Label carrying the runtime type of a polymorphic value
    pub type_attr_name: String,

    /// Maximum nesting depth, `None` for unbounded
    pub max_depth: Option<usize>,
}

impl CodecConfig {
    /// Set the map entry label
    pub fn entry_elem_name(mut self, name: impl Into<String>) -> Self {
        self.entry_elem_name = name.into();
        self
    }

    /// Set the map key label
    pub fn key_elem_name(mut self, name: impl Into<String>) -> Self {
        self.key_elem_name = name.into();
        self
    }

    /// Set the map value label
    pub fn value_elem_name(mut self, name: impl Into<String>) -> Self {
        self.value_elem_name = name.into();
        self
    }

    /// Set the array element label
    pub fn elem_name(mut self, name: impl Into<String>) -> Self {
        self.elem_name = name.into();
        self
    }

    /// Set the maximum nesting depth
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            entry_elem_name: DEFAULT_ENTRY_ELEM_NAME.to_string(),
            key_elem_name: DEFAULT_KEY_ELEM_NAME.to_string(),
            value_elem_name: DEFAULT_VALUE_ELEM_NAME.to_string(),
            elem_name: DEFAULT_ELEM_NAME.to_string(),
            type_attr_name: DEFAULT_TYPE_ATTR_NAME.to_string(),
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CodecConfig = serde_json::from_str(r#"{"entry_elem_name":"entry"}"#).unwrap();

        assert_eq!(config.entry_elem_name, "entry");
        assert_eq!(config.key_elem_name, DEFAULT_KEY_ELEM_NAME);
        assert_eq!(config.max_depth, Some(DEFAULT_MAX_DEPTH));
    }

    #[test]
    fn test_unbounded_depth() {
        let config: CodecConfig = serde_json::from_str(r#"{"max_depth":null}"#).unwrap();
        assert_eq!(config.max_depth, None);
    }
}
