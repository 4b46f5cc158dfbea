use std::{fs, path::Path};

use serde::Deserialize;

use crate::error::GeneratorError;

/// Generation-time switches. Every run uses one configuration for all units.
///
/// ```toml
/// decode-unknown-enum-values = true
/// generate-interfaces        = true
/// keyword-append-token       = "_"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Decode unrecognised enum values to `SbeUnknown` instead of failing.
    pub decode_unknown_enum_values: bool,
    /// Implement the runtime's flyweight traits on message and composite codecs.
    pub generate_interfaces:        bool,
    /// Appended to property names that collide with Rust keywords.
    pub keyword_append_token:       Option<String>,
    /// Path generated code uses to reach the runtime.
    pub runtime_crate:              String,
    pub read_only_buffer:           String,
    pub mutable_buffer:             String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            decode_unknown_enum_values: false,
            generate_interfaces:        false,
            keyword_append_token:       None,
            runtime_crate:              "brine_sbe".to_string(),
            read_only_buffer:           "brine_sbe::ReadBuf".to_string(),
            mutable_buffer:             "brine_sbe::WriteBuf".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, GeneratorError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GeneratorError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_to_the_facade_crate() {
        let config = GeneratorConfig::default();
        assert!(!config.decode_unknown_enum_values);
        assert!(!config.generate_interfaces);
        assert_eq!(config.keyword_append_token, None);
        assert_eq!(config.runtime_crate, "brine_sbe");
        assert_eq!(config.read_only_buffer, "brine_sbe::ReadBuf");
    }

    #[test]
    fn reads_kebab_case_keys() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            decode-unknown-enum-values = true
            keyword-append-token = "_"
            mutable-buffer = "crate::buffers::Writer"
            "#,
        )
        .unwrap();
        assert!(config.decode_unknown_enum_values);
        assert!(!config.generate_interfaces);
        assert_eq!(config.keyword_append_token.as_deref(), Some("_"));
        assert_eq!(config.mutable_buffer, "crate::buffers::Writer");
        assert_eq!(config.read_only_buffer, "brine_sbe::ReadBuf");
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            GeneratorConfig::from_toml_str("emit-java = true"),
            Err(GeneratorError::Config(_))
        ));
    }
}
