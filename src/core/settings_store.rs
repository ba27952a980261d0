use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use super::backend::ServiceEndpoints;
use super::models::{RuntimeSettings, RuntimeSettingsUpdate};

pub const API_URL_ENV: &str = "JOBFIT_API_URL";
pub const TOKEN_ENV: &str = "JOBFIT_TOKEN";

const APP_DIR: &str = "Jobfit";
const SETTINGS_FILE: &str = "client-settings.json";

pub struct SettingsStore {
    file_path: PathBuf,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self {
            file_path: app_data_root().join(SETTINGS_FILE),
        }
    }

    pub fn new_with_path(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub async fn load(&self) -> anyhow::Result<RuntimeSettings> {
        if !tokio::fs::try_exists(&self.file_path)
            .await
            .unwrap_or(false)
        {
            debug!(path = %self.file_path.display(), "no settings file, using defaults");
            return Ok(RuntimeSettings::default());
        }

        let content = tokio::fs::read_to_string(&self.file_path)
            .await
            .with_context(|| {
                format!("failed to read settings file {}", self.file_path.display())
            })?;

        let parsed = serde_json::from_str::<RuntimeSettings>(&content).with_context(|| {
            format!("invalid JSON in settings file {}", self.file_path.display())
        })?;

        ServiceEndpoints::from_base(&parsed.api_base_url).with_context(|| {
            format!("invalid api base url in {}", self.file_path.display())
        })?;

        Ok(parsed)
    }

    pub async fn save(&self, settings: &RuntimeSettings) -> anyhow::Result<()> {
        ServiceEndpoints::from_base(&settings.api_base_url)?;

        if let Some(parent) = self.file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(settings)?;
        tokio::fs::write(&self.file_path, json).await?;
        info!(path = %self.file_path.display(), "settings saved");
        Ok(())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

pub fn apply_update(current: &RuntimeSettings, update: RuntimeSettingsUpdate) -> RuntimeSettings {
    RuntimeSettings {
        api_base_url: update
            .api_base_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| current.api_base_url.clone()),
        // 0 clears the timeout
        request_timeout_seconds: match update.request_timeout_seconds {
            Some(0) => None,
            Some(secs) => Some(secs),
            None => current.request_timeout_seconds,
        },
        user_agent: current.user_agent.clone(),
    }
}

pub fn api_url_from_env() -> Option<String> {
    std::env::var(API_URL_ENV).ok()
}

pub fn apply_api_url_override(
    mut settings: RuntimeSettings,
    api_url: Option<String>,
) -> anyhow::Result<RuntimeSettings> {
    let Some(api_url) = api_url.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return Ok(settings);
    };

    ServiceEndpoints::from_base(&api_url)
        .with_context(|| format!("{API_URL_ENV} is not a usable base url"))?;
    info!(api_base_url = %api_url, "api base url overridden from environment");
    settings.api_base_url = api_url;
    Ok(settings)
}

pub fn token_from_env() -> Option<String> {
    std::env::var(TOKEN_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn app_data_root() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(local_app_data) = std::env::var("LOCALAPPDATA") {
            return PathBuf::from(local_app_data).join(APP_DIR);
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = dirs::home_dir() {
            return home
                .join("Library")
                .join("Application Support")
                .join(APP_DIR);
        }
    }

    if let Some(path) = dirs::data_local_dir() {
        return path.join(APP_DIR);
    }

    PathBuf::from(".").join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::DEFAULT_API_BASE_URL;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new_with_path(dir.path().join("client-settings.json"));

        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, RuntimeSettings::default());
        assert_eq!(loaded.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[tokio::test]
    async fn save_then_load_persists_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new_with_path(dir.path().join("nested").join("settings.json"));
        let settings = RuntimeSettings {
            api_base_url: "https://jobfit.example.com/api".to_string(),
            request_timeout_seconds: Some(30),
            ..RuntimeSettings::default()
        };

        store.save(&settings).await.unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"apiBaseUrl\""));

        assert_eq!(store.load().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn invalid_url_is_refused_on_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new_with_path(&path);
        let bad = RuntimeSettings {
            api_base_url: "ftp://jobfit.example.com".to_string(),
            ..RuntimeSettings::default()
        };

        assert!(store.save(&bad).await.is_err());
        assert!(!path.exists());

        std::fs::write(&path, r#"{"apiBaseUrl":"not a url"}"#).unwrap();
        assert!(store.load().await.is_err());
    }

    #[test]
    fn update_keeps_unset_fields() {
        let current = RuntimeSettings {
            request_timeout_seconds: Some(20),
            ..RuntimeSettings::default()
        };

        let next = apply_update(
            &current,
            RuntimeSettingsUpdate {
                api_base_url: Some(" http://10.0.0.5:8000 ".to_string()),
                request_timeout_seconds: None,
            },
        );

        assert_eq!(next.api_base_url, "http://10.0.0.5:8000");
        assert_eq!(next.request_timeout_seconds, Some(20));
        assert_eq!(next.user_agent, current.user_agent);
    }

    #[test]
    fn zero_timeout_clears_saved_timeout() {
        let current = RuntimeSettings {
            request_timeout_seconds: Some(30),
            ..RuntimeSettings::default()
        };

        let cleared = apply_update(
            &current,
            RuntimeSettingsUpdate {
                api_base_url: None,
                request_timeout_seconds: Some(0),
            },
        );
        assert_eq!(cleared.request_timeout_seconds, None);

        let changed = apply_update(
            &cleared,
            RuntimeSettingsUpdate {
                api_base_url: None,
                request_timeout_seconds: Some(45),
            },
        );
        assert_eq!(changed.request_timeout_seconds, Some(45));
    }

    #[test]
    fn api_url_override_is_validated() {
        let settings = RuntimeSettings::default();

        let overridden =
            apply_api_url_override(settings.clone(), Some("https://staging.example.com".into()))
                .unwrap();
        assert_eq!(overridden.api_base_url, "https://staging.example.com");

        let untouched = apply_api_url_override(settings.clone(), Some("   ".into())).unwrap();
        assert_eq!(untouched, settings);

        assert!(apply_api_url_override(settings, Some("mailto:someone".into())).is_err());
    }
}
