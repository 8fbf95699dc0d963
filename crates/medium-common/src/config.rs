use serde::{Deserialize, Serialize};

use std::future::Future;
use std::path::Path;
use std::path::PathBuf;

use crate::error::MediumError;

/// Host-level settings for one embedded medium.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Language code used to look up a localized field schema.
    pub language: String,
    /// Content id handed to the host runtime when instantiating media.
    pub content_id: String,
    /// Whether saves come from the authoring tool rather than an end user.
    pub author_mode: bool,
    /// Path to the base field schema (semantics) JSON.
    pub semantics_path: Option<PathBuf>,
    /// Directory holding `<language>.json` translation files.
    pub language_dir: Option<PathBuf>,
}

impl Default for Config {
    /// Creates a new default configuration: English, end-user mode, content id `0`.
    fn default() -> Self {
        Self {
            language: "en".to_owned(),
            content_id: "0".to_owned(),
            author_mode: false,
            semantics_path: None,
            language_dir: None,
        }
    }
}

impl Config {
    /// Loads the configuration from the provided loader.
    pub async fn load(loader: &impl Loader) -> Result<Self, MediumError> {
        loader.load().await
    }

    /// Saves the configuration using the provided saver.
    pub async fn save(&self, saver: &impl Saver) -> Result<(), MediumError> {
        saver.save(self).await
    }
}

/// The trait for loading configuration data.
pub trait Loader {
    /// Loads the configuration data.
    fn load(&self) -> impl Future<Output = Result<Config, MediumError>> + Send;
}

/// The trait for saving configuration data.
pub trait Saver {
    /// Saves the configuration data.
    fn save(&self, config: &Config) -> impl Future<Output = Result<(), MediumError>> + Send;
}

/// An implementation of [`Loader`] and [`Saver`] that reads and writes a configuration file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new [`FileStore`] with the given path.
    ///
    /// [`Config`] data will be serialized and deserialized using the file extension.
    /// `.json` and `.toml` are supported.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|ext| ext.to_str())
    }
}

impl Loader for FileStore {
    async fn load(&self) -> Result<Config, MediumError> {
        match self.extension() {
            Some("json") => Ok(serde_json::from_str(&std::fs::read_to_string(&self.path)?)?),
            Some("toml") => Ok(toml::from_str(&std::fs::read_to_string(&self.path)?)?),
            _ => Err(MediumError::Config(format!(
                "unsupported file format: {}",
                self.path.display()
            ))),
        }
    }
}

impl Saver for FileStore {
    async fn save(&self, config: &Config) -> Result<(), MediumError> {
        match self.extension() {
            Some("json") => Ok(std::fs::write(
                &self.path,
                serde_json::to_string_pretty(config)?,
            )?),
            Some("toml") => Ok(std::fs::write(&self.path, toml::to_string_pretty(config)?)?),
            _ => Err(MediumError::Config(format!(
                "unsupported file format: {}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("medium.toml"));
        let config = Config {
            language: "de".into(),
            author_mode: true,
            ..Default::default()
        };
        config.save(&store).await.unwrap();
        assert_eq!(Config::load(&store).await.unwrap(), config);
    }

    #[tokio::test]
    async fn missing_keys_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("medium.json");
        std::fs::write(&path, r#"{"language":"nb"}"#).unwrap();
        let config = Config::load(&FileStore::new(&path)).await.unwrap();
        assert_eq!(config.language, "nb");
        assert_eq!(config.content_id, "0");
        assert!(!config.author_mode);
    }

    #[tokio::test]
    async fn unknown_extension_is_rejected() {
        let store = FileStore::new("medium.yaml");
        assert!(matches!(
            Config::load(&store).await,
            Err(MediumError::Config(_))
        ));
    }
}
