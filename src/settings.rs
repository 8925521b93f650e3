use async_openai::error::OpenAIError;
use async_openai::{Client, config::OpenAIConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result, SettingsError};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Root of everything the game writes: settings, logs and transcripts.
pub fn data_dir() -> Result<PathBuf> {
    let home_dir = dir::home_dir().ok_or(AppError::NoHomeDir)?;
    Ok(home_dir.join("parley").join("data"))
}

// Application settings, persisted as pretty JSON.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub model: String,
    pub request_timeout_secs: u64,
    pub temperature: f32,
    pub debug_mode: bool,
    /// Optional JSON catalog replacing the built-in scenarios.
    pub catalog_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            openai_api_key: None,
            model: "gpt-4o-mini".to_string(),
            request_timeout_secs: 60,
            temperature: 0.85,
            debug_mode: false,
            catalog_path: None,
        }
    }
}

impl Settings {
    pub fn default_path() -> Result<PathBuf> {
        Ok(data_dir()?.join("settings.json"))
    }

    // Load settings from the default path, falling back to defaults when the file is absent.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Ok(Self::load_from_file(path)?)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> std::result::Result<Self, SettingsError> {
        let data = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&data)?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> std::result::Result<(), SettingsError> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }

    /// The credential in effect: the environment wins over the settings file.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_with_env(&self, env_key: Option<String>) -> Option<String> {
        env_key
            .into_iter()
            .chain(self.openai_api_key.clone())
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }

    // Asynchronously validate an API key with OpenAI's services.
    pub async fn validate_api_key(api_key: &str) -> ApiKeyStatus {
        let client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));
        match client.models().list().await {
            Ok(_) => ApiKeyStatus::Valid,
            Err(OpenAIError::Reqwest(e)) => {
                log::warn!("Could not reach OpenAI to validate the API key: {e}");
                ApiKeyStatus::Unreachable
            }
            Err(e) => {
                log::info!("API key rejected: {e}");
                ApiKeyStatus::Rejected
            }
        }
    }
}

/// Result of checking a credential against the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyStatus {
    Valid,
    Rejected,
    /// No answer in time, or no connection at all.
    Unreachable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = Settings {
            openai_api_key: Some("sk-test".into()),
            model: "gpt-4o".into(),
            debug_mode: true,
            ..Settings::default()
        };
        settings.save_to_file(&path).unwrap();

        let loaded = Settings::load_from_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"model": "gpt-4.1-mini"}"#).unwrap();

        let loaded = Settings::load_from_file(&path).unwrap();
        assert_eq!(loaded.model, "gpt-4.1-mini");
        assert_eq!(loaded.request_timeout_secs, 60);
        assert!(loaded.openai_api_key.is_none());
    }

    #[test]
    fn environment_key_takes_precedence() {
        let settings = Settings {
            openai_api_key: Some("from-file".into()),
            ..Settings::default()
        };
        assert_eq!(
            settings.api_key_with_env(Some("from-env".into())).as_deref(),
            Some("from-env")
        );
        assert_eq!(
            settings.api_key_with_env(Some("   ".into())).as_deref(),
            Some("from-file")
        );
        assert_eq!(Settings::default().api_key_with_env(None), None);
    }
}
