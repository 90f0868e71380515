use anyhow::{Context, Result};
use quire_core::{ClientConfig, QueryConfig, RichTextOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of `quire.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuireConfig {
    pub throw_error_for_missing_linked_items: bool,
    pub enable_advanced_logging: bool,
    pub rich_text: RichTextOptions,
}

impl QuireConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self =
            toml::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Defaults when the file does not exist. A file that exists but does not
    /// parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.rich_text.validate()?;
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new()
            .with_advanced_logging(self.enable_advanced_logging)
            .with_rich_text(self.rich_text.clone())
    }

    pub fn query_config(&self) -> QueryConfig {
        QueryConfig::new()
            .with_throw_error_for_missing_linked_items(self.throw_error_for_missing_linked_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_core::ParserBackend;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = QuireConfig::load_or_default(&dir.path().join("quire.toml")).unwrap();
        assert_eq!(config, QuireConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quire.toml");
        std::fs::write(
            &path,
            r#"
throw_error_for_missing_linked_items = true

[rich_text]
linked_item_wrapper_tag = "div"
backend = "dom"
"#,
        )
        .unwrap();

        let config = QuireConfig::load(&path).unwrap();
        assert!(config.throw_error_for_missing_linked_items);
        assert_eq!(config.rich_text.linked_item_wrapper_tag, "div");
        assert_eq!(config.rich_text.backend, ParserBackend::Dom);
        assert_eq!(
            config.rich_text.linked_item_wrapper_classes,
            vec!["linked-item-wrapper"]
        );
        assert_eq!(config.client_config().parser.name(), "dom");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quire.toml");
        std::fs::write(&path, "rich_text = 3").unwrap();
        assert!(QuireConfig::load_or_default(&path).is_err());
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = QuireConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("[rich_text]"));
        assert_eq!(toml::from_str::<QuireConfig>(&text).unwrap(), config);
    }
}
