//! Local settings panel values and their JSON export.
//!
//! These never leave the machine; the backend does not read them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name used for exports.
pub const EXPORT_FILE_NAME: &str = "aetherchat-settings.json";

const SETTINGS_DIR: &str = ".aetherchat";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown setting '{0}'")]
    UnknownKey(String),

    #[error("invalid value '{value}' for {key}: {source}")]
    InvalidValue {
        key: String,
        value: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings shown in the settings panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(rename = "enableRAG")]
    pub enable_rag: bool,
    pub enable_memory: bool,
    pub auto_save: bool,
    pub vector_database: String,
    pub embedding_model: String,
    pub chunk_size: u32,
    pub chunk_overlap: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            temperature: 0.7,
            max_tokens: 2048,
            enable_rag: true,
            enable_memory: true,
            auto_save: true,
            vector_database: "pinecone".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            chunk_size: 512,
            chunk_overlap: 50,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Like [`Settings::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Change one setting, addressed by its JSON key (`maxTokens`, `enableRAG`, ...).
    ///
    /// String settings take `value` verbatim; the rest parse it as JSON.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut json = serde_json::to_value(&*self)?;
        let slot = json
            .get_mut(key)
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;

        let invalid = |source: serde_json::Error| SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            source,
        };
        *slot = if slot.is_string() {
            serde_json::Value::String(value.to_string())
        } else {
            serde_json::from_str(value).map_err(invalid)?
        };

        *self = serde_json::from_value(json).map_err(invalid)?;
        Ok(())
    }

    /// Pretty-printed JSON, as written by [`Settings::export`].
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the settings as pretty JSON, creating parent directories.
    pub fn export(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, self.to_json()?).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Default export location, `~/.aetherchat/aetherchat-settings.json`.
pub fn default_export_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(SETTINGS_DIR).join(EXPORT_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_uses_panel_key_names() {
        let json: serde_json::Value =
            serde_json::from_str(&Settings::default().to_json().unwrap()).unwrap();
        assert_eq!(json["model"], "gpt-4");
        assert_eq!(json["maxTokens"], 2048);
        assert_eq!(json["enableRAG"], true);
        assert_eq!(json["vectorDatabase"], "pinecone");
        assert_eq!(json["embeddingModel"], "text-embedding-ada-002");
        assert_eq!(json["chunkOverlap"], 50);
    }

    #[test]
    fn export_creates_directories_and_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(EXPORT_FILE_NAME);

        let settings = Settings {
            model: "llama3".to_string(),
            chunk_size: 1024,
            ..Settings::default()
        };
        settings.export(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{"temperature": 0.2, "enableRAG": false}"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert!((settings.temperature - 0.2).abs() < f32::EPSILON);
        assert!(!settings.enable_rag);
        assert_eq!(settings.max_tokens, 2048);
    }

    #[test]
    fn set_updates_typed_values() {
        let mut settings = Settings::default();
        settings.set("model", "llama3").unwrap();
        settings.set("maxTokens", "4096").unwrap();
        settings.set("enableRAG", "false").unwrap();
        settings.set("temperature", "0.25").unwrap();

        assert_eq!(settings.model, "llama3");
        assert_eq!(settings.max_tokens, 4096);
        assert!(!settings.enable_rag);
        assert!((settings.temperature - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.set("colour", "blue"),
            Err(SettingsError::UnknownKey(_))
        ));
        assert!(matches!(
            settings.set("chunkSize", "lots"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(
            settings.set("chunkSize", "-3"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn edited_value_survives_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILE_NAME);

        let mut settings = Settings::load_or_default(&path).unwrap();
        assert_eq!(settings, Settings::default());
        settings.set("vectorDatabase", "qdrant").unwrap();
        settings.export(&path).unwrap();

        let mut reloaded = Settings::load_or_default(&path).unwrap();
        assert_eq!(reloaded.vector_database, "qdrant");
        reloaded.set("chunkOverlap", "64").unwrap();
        reloaded.export(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["vectorDatabase"], "qdrant");
        assert_eq!(json["chunkOverlap"], 64);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Settings::load(Path::new("/nonexistent/settings.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/settings.json"));
    }
}
