use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nexus_core::FeedConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration that can be loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// Base URL of the posts backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,

    /// Default author for comments, chat and typing notifications
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Directory holding the post draft handoff file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: CliConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Overlay the file settings on `base`
    pub fn apply(&self, base: FeedConfig) -> FeedConfig {
        let mut config = match self.backend_url.as_deref() {
            Some(url) => FeedConfig {
                backend_url: FeedConfig::new(url).backend_url,
                ..base
            },
            None => base,
        };
        if let Some(ref dir) = self.data_dir {
            config = config.with_data_dir(dir);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_full() {
        let json = r#"{
            "backendUrl": "http://feed.test:8000/",
            "author": "Ada",
            "dataDir": "/tmp/nexus"
        }"#;
        let config: CliConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.author.as_deref(), Some("Ada"));

        let feed = config.apply(FeedConfig::default());
        assert_eq!(feed.backend_url, "http://feed.test:8000");
        assert_eq!(feed.data_dir, PathBuf::from("/tmp/nexus"));
    }

    #[test]
    fn test_parse_config_minimal() {
        let config: CliConfig = serde_json::from_str("{}").unwrap();
        assert!(config.backend_url.is_none());
        assert!(config.author.is_none());

        let feed = config.apply(FeedConfig::new("http://base.test"));
        assert_eq!(feed.backend_url, "http://base.test");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nexus.json");
        std::fs::write(&path, r#"{"backendUrl": "http://file.test"}"#).unwrap();
        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.backend_url.as_deref(), Some("http://file.test"));

        assert!(CliConfig::load(&dir.path().join("missing.json")).is_err());
    }
}
