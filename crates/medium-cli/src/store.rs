//! Translations read from a directory of `<language>.json` files.

use std::path::PathBuf;

use medium_core::SchemaStore;
use serde_json::Value;

pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SchemaStore for DirStore {
    async fn fetch(&self, language: &str, library: &str) -> Option<Value> {
        let path = self.dir.join(format!("{language}.json"));
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(error) => {
                tracing::debug!(path = %path.display(), %library, %error, "no translation file");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "translation file is not JSON");
                None
            }
        }
    }
}
