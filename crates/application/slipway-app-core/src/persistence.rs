use crate::domain::AppSettings;
use crate::ports::SettingsRepo;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const QUALIFIER: &str = "com";
const ORG: &str = "slipway";
const APP: &str = "builder";

/// Settings storage under the platform config dir, written atomically so a
/// crash mid-save never leaves a truncated settings file.
pub struct FilePersistence;

impl Default for FilePersistence {
    fn default() -> Self {
        Self::new()
    }
}

impl FilePersistence {
    pub fn new() -> Self {
        Self
    }

    fn config_dir(&self) -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from(QUALIFIER, ORG, APP)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }
        Ok(config_dir.to_path_buf())
    }

    fn settings_path(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("settings.json"))
    }

    pub fn load_settings(&self) -> Result<AppSettings> {
        let path = self.settings_path()?;
        if !path.exists() {
            return Ok(AppSettings::default());
        }
        let content = fs::read_to_string(&path).context("Failed to read settings")?;
        let settings: AppSettings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        let path = self.settings_path()?;
        let json = serde_json::to_string_pretty(settings)?;
        atomic_write(&path, json.as_bytes()).context("Failed to write settings")?;
        Ok(())
    }
}

impl SettingsRepo for FilePersistence {
    fn load(&self) -> Result<AppSettings> {
        self.load_settings()
    }

    fn save(&self, settings: &AppSettings) -> Result<()> {
        self.save_settings(settings)
    }
}

fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = {
        let mut name = path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    };

    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("Failed to create temp file {}", tmp_path.to_string_lossy()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write temp file {}", tmp_path.to_string_lossy()))?;
    file.sync_all()
        .with_context(|| format!("Failed to sync temp file {}", tmp_path.to_string_lossy()))?;
    drop(file);

    match fs::rename(&tmp_path, path) {
        Ok(()) => {}
        // Windows refuses to rename over an existing file.
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            fs::remove_file(path).ok();
            fs::rename(&tmp_path, path).with_context(|| {
                format!("Failed to replace settings file {}", path.to_string_lossy())
            })?;
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!(
                    "Failed to rename temp file {} to {}",
                    tmp_path.to_string_lossy(),
                    path.to_string_lossy()
                )
            });
        }
    }

    Ok(())
}
