//! Application settings persistence
//!
//! Stores the last session location in the platform-specific app data folder:
//! - Linux: ~/.config/s3-tree/settings.json
//! - Windows: %APPDATA%/s3-tree/settings.json
//! - macOS: ~/Library/Application Support/s3-tree/settings.json

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application settings that persist between sessions
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Settings {
    /// Last connected profile name
    #[serde(default)]
    pub last_profile: Option<String>,

    /// Last opened bucket name
    #[serde(default)]
    pub last_bucket: Option<String>,
}

impl Settings {
    /// Load settings from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    /// Load settings from `path`, returning defaults if the file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Settings file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;

        let settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings from {:?}", path))?;

        tracing::info!(
            "Loaded settings: profile={:?}, bucket={:?}",
            settings.last_profile,
            settings.last_bucket
        );

        Ok(settings)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    /// Save settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .context("Failed to serialize settings")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;

        tracing::debug!("Saved settings to {:?}", path);

        Ok(())
    }

    /// Get the path to the settings file
    pub fn settings_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "s3-tree", "s3-tree")
            .context("Failed to determine settings directory")?;

        Ok(proj_dirs.config_dir().join("settings.json"))
    }

    /// Update the last selected profile. Forgets the bucket, which belongs
    /// to the previous store.
    pub fn set_profile(&mut self, profile: Option<&str>) {
        self.last_profile = profile.map(|s| s.to_string());
        self.last_bucket = None;
    }

    /// Update the last opened bucket
    pub fn set_bucket(&mut self, bucket: Option<&str>) {
        self.last_bucket = bucket.map(|s| s.to_string());
    }
}
