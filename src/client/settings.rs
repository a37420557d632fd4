//! User settings and where they are kept. The chat client only talks
//! to a `SettingsRepository`, so the backing store can be swapped.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use super::theme::Theme;
use crate::ai::models::ChatModel;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub selected_model: ChatModel,
    #[serde(default)]
    pub custom_personality: String,
    // Only set once the user toggles the theme
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_preference: Option<Theme>,
}

pub trait SettingsRepository: Send + Sync {
    fn load(&self) -> Result<Settings>;
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// Settings that live as long as the process.
#[derive(Debug, Default)]
pub struct InMemorySettings(Mutex<Settings>);

impl SettingsRepository for InMemorySettings {
    fn load(&self) -> Result<Settings> {
        let settings = self.0.lock().map_err(|e| anyhow!("{}", e))?;
        Ok(settings.clone())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let mut stored = self.0.lock().map_err(|e| anyhow!("{}", e))?;
        *stored = settings.clone();
        Ok(())
    }
}

/// Settings persisted as a JSON file. A missing file means defaults.
#[derive(Debug, Clone)]
pub struct JsonFileSettings {
    path: PathBuf,
}

impl JsonFileSettings {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SettingsRepository for JsonFileSettings {
    fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings {}", self.path.display()))?;
        let settings = serde_json::from_str(&data)
            .with_context(|| format!("Invalid settings file {}", self.path.display()))?;
        Ok(settings)
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(settings)?)
            .with_context(|| format!("Failed to write settings {}", self.path.display()))?;
        Ok(())
    }
}
