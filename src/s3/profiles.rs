//! Connection profile registry
//!
//! Each profile is stored as one YAML record named `<name>.connection`:
//!
//! ```yaml
//! name: local-minio
//! endpoint: minio.local:9000
//! access_key: minioadmin
//! secret_key: minioadmin
//! ignore_ssl_verification: true
//! ```
//!
//! The default directory is the platform config folder:
//! - Linux: ~/.config/s3-tree/connections/
//! - Windows: %APPDATA%/s3-tree/connections/
//! - macOS: ~/Library/Application Support/s3-tree/connections/

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{BrowserError, Result};
use crate::s3::types::ConnectionProfile;

const PROFILE_EXTENSION: &str = "connection";

/// Enumerates, loads and saves connection profiles in one directory
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    dir: PathBuf,
}

impl ProfileRegistry {
    /// Registry rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Registry in the platform config folder
    pub fn open_default() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("org", "s3-tree", "s3-tree").ok_or_else(|| {
            BrowserError::Config("failed to determine profile directory".to_string())
        })?;

        Ok(Self::new(proj_dirs.config_dir().join("connections")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Names of all stored profiles, sorted
    pub fn list_profiles(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            tracing::debug!("Profile directory {:?} does not exist", self.dir);
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(PROFILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Load the profile stored under `name`
    pub fn load(&self, name: &str) -> Result<ConnectionProfile> {
        validate_identifier(name)?;
        let path = self.record_path(name);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BrowserError::NotFound(format!("profile '{}'", name)));
            }
            Err(e) => return Err(e.into()),
        };

        let profile: ConnectionProfile = serde_yaml::from_str(&contents)
            .map_err(|e| BrowserError::Parse(format!("profile {:?}: {}", path, e)))?;

        if profile.name != name {
            tracing::warn!(
                "Profile record {:?} carries name '{}', expected '{}'",
                path,
                profile.name,
                name
            );
        }

        Ok(profile)
    }

    /// Validate and persist `profile`, replacing any record with the same name
    pub fn save(&self, profile: &ConnectionProfile) -> Result<()> {
        validate_profile(profile)?;

        fs::create_dir_all(&self.dir)?;

        let contents = serde_yaml::to_string(profile)
            .map_err(|e| BrowserError::Parse(format!("profile '{}': {}", profile.name, e)))?;

        let path = self.record_path(&profile.name);
        fs::write(&path, contents)?;

        // Records hold secret keys
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!("Saved profile '{}' to {:?}", profile.name, path);
        Ok(())
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, PROFILE_EXTENSION))
    }
}

/// Reject profiles with a blank required field or an unusable name
pub fn validate_profile(profile: &ConnectionProfile) -> Result<()> {
    let required = [
        ("name", &profile.name),
        ("endpoint", &profile.endpoint),
        ("access key", &profile.access_key),
        ("secret key", &profile.secret_key),
    ];

    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| *field)
        .collect();

    if !missing.is_empty() {
        return Err(BrowserError::Validation(format!(
            "all fields are required (missing: {})",
            missing.join(", ")
        )));
    }

    validate_identifier(&profile.name)
}

fn validate_identifier(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(BrowserError::Validation("profile name is required".to_string()));
    }
    if name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(BrowserError::Validation(format!(
            "profile name '{}' must be a plain file name",
            name
        )));
    }
    Ok(())
}
