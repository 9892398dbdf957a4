// Rust guideline compliant 2026-10-19

//! File adapter for the `ModelSource` port.
//!
//! Reads a JSON forest artifact from disk with `tokio::fs`. A missing file is
//! reported as `ModelLoadError::NotFound`, which puts the classification
//! service in fallback mode.

use std::io;
use std::path::{Path, PathBuf};

use classifier::{EnsembleModel, ModelLoadError, ModelSource};

/// `ModelSource` adapter backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileModelSource {
    path: PathBuf,
}

impl FileModelSource {
    /// Read the artifact at `path` on first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelSource for FileModelSource {
    async fn load(&self) -> Result<EnsembleModel, ModelLoadError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ModelLoadError::NotFound {
                    location: self.describe(),
                },
                _ => ModelLoadError::Unreadable {
                    location: self.describe(),
                    reason: e.to_string(),
                },
            })?;
        EnsembleModel::from_json(&text)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::FileModelSource;
    use classifier::{ModelLoadError, ModelSource as _};

    const FOREST: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../model/bot_forest.json");

    fn temp_path(suffix: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("bot_watch_{}_{suffix}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn loads_bundled_forest() {
        let model = FileModelSource::new(FOREST).load().await.unwrap();
        assert_eq!(model.name(), "bot-forest");
        assert_eq!(model.trees().len(), 4);
        assert_eq!(model.schema().len(), 7);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let source = FileModelSource::new(temp_path("missing.json"));
        let result = source.load().await;
        assert!(matches!(result, Err(ModelLoadError::NotFound { .. })));
    }

    #[tokio::test]
    async fn garbage_file_is_malformed() {
        let path = temp_path("garbage.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();
        let result = FileModelSource::new(&path).load().await;
        tokio::fs::remove_file(&path).await.unwrap();
        assert!(matches!(result, Err(ModelLoadError::Malformed { .. })));
    }

    #[tokio::test]
    async fn directory_is_unreadable() {
        let source = FileModelSource::new(std::env::temp_dir());
        let result = source.load().await;
        assert!(matches!(result, Err(ModelLoadError::Unreadable { .. })));
    }

    #[test]
    fn describe_is_the_path() {
        let source = FileModelSource::new("model/bot_forest.json");
        assert_eq!(source.describe(), "model/bot_forest.json");
        assert_eq!(source.path(), std::path::Path::new("model/bot_forest.json"));
    }
}
