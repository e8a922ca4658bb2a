//! Settings
//!
//! Persistent settings stored as JSON in ~/.config/dmimatch/settings.json,
//! or wherever `DMIMATCH_CONFIG` points. Every field is optional; a missing
//! file means defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::constants::{limits, paths, provider, timing};
use crate::error::{DmiError, Result};
use crate::identity::IdentityKey;
use crate::provider::{DmidecodeProvider, IdentityProvider, SysfsProvider};
use crate::system::{has_dmi_sysfs, is_root};

/// Which identity source to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Dmidecode,
    Sysfs,
}

impl std::str::FromStr for ProviderKind {
    type Err = DmiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dmidecode" => Ok(Self::Dmidecode),
            "sysfs" => Ok(Self::Sysfs),
            other => Err(DmiError::invalid_config(
                "provider",
                format!("unknown provider {:?} (expected dmidecode or sysfs)", other),
            )),
        }
    }
}

/// Identity acquisition settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub provider: ProviderKind,

    /// Command line run by the dmidecode provider, split on whitespace
    /// (`sudo dmidecode` is accepted); `-s <keyword>` is appended
    #[serde(default = "default_dmidecode_command")]
    pub dmidecode_command: String,

    /// Bound on a single provider query
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Directory holding the DMI attributes for the sysfs provider
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,
}

fn default_dmidecode_command() -> String { provider::DMIDECODE_COMMAND.to_string() }
fn default_timeout_ms() -> u64 { timing::DEFAULT_PROVIDER_TIMEOUT_MS }
fn default_sysfs_root() -> PathBuf { PathBuf::from(paths::DMI_SYSFS_ROOT) }

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            dmidecode_command: default_dmidecode_command(),
            timeout_ms: default_timeout_ms(),
            sysfs_root: default_sysfs_root(),
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(DmiError::invalid_config("timeout_ms", "must be greater than zero"));
        }
        if self.dmidecode_command.trim().is_empty() {
            return Err(DmiError::invalid_config("dmidecode_command", "must not be empty"));
        }
        if self.longest_command_line() >= limits::MAX_COMMAND_LEN {
            return Err(DmiError::invalid_config(
                "dmidecode_command",
                format!("command line would exceed {} bytes", limits::MAX_COMMAND_LEN - 1),
            ));
        }
        Ok(())
    }

    /// Length of `<command> -s <keyword>` for the longest keyword
    fn longest_command_line(&self) -> usize {
        let keyword = IdentityKey::ALL
            .iter()
            .map(|k| k.provider_name().len())
            .max()
            .unwrap_or(0);
        self.dmidecode_command.len() + provider::DMIDECODE_STRING_FLAG.len() + keyword + 2
    }

    /// Build the configured identity provider
    pub fn build_provider(&self) -> Result<Box<dyn IdentityProvider>> {
        self.validate()?;
        match self.provider {
            ProviderKind::Dmidecode => {
                if !is_root() {
                    debug!("Running {} without root; it may not be able to read the DMI tables", self.dmidecode_command);
                }
                Ok(Box::new(
                    DmidecodeProvider::new(self.dmidecode_command.clone()).with_timeout(self.timeout()),
                ))
            }
            ProviderKind::Sysfs => {
                if !has_dmi_sysfs(&self.sysfs_root) {
                    debug!("{} does not exist; every query will fail", self.sysfs_root.display());
                }
                Ok(Box::new(SysfsProvider::new(self.sysfs_root.clone())))
            }
        }
    }
}

/// Get the settings file path
/// `DMIMATCH_CONFIG` if set, else ~/.config/dmimatch/settings.json
pub fn get_settings_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(paths::CONFIG_ENV) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    let dir = paths::user_config_dir()
        .ok_or_else(|| DmiError::config("Could not determine config directory"))?;
    Ok(dir.join(paths::SETTINGS_FILE))
}

/// Load settings from the default location
pub fn load_settings() -> Result<Settings> {
    load_settings_from(&get_settings_path()?)
}

/// Load settings from JSON file, returning defaults if it does not exist
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        debug!("No settings at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    let size = fs::metadata(path)
        .map_err(|source| DmiError::FileRead { path: path.to_path_buf(), source })?
        .len();
    if size > limits::MAX_SETTINGS_SIZE {
        return Err(DmiError::config(format!(
            "Settings file {} too large ({} bytes, max {})",
            path.display(),
            size,
            limits::MAX_SETTINGS_SIZE
        )));
    }

    let content = fs::read_to_string(path)
        .map_err(|source| DmiError::FileRead { path: path.to_path_buf(), source })?;

    let settings: Settings = serde_json::from_str(&content).map_err(|e| {
        DmiError::config(format!("Failed to parse settings JSON: {}", e))
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Save settings to the default location
pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &get_settings_path()?)
}

/// Save settings to JSON file
/// Uses atomic write (temp file + rename) so a crash never leaves a torn file
pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    use std::io::Write;

    settings.validate()?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                DmiError::config(format!("Failed to create config directory: {}", e))
            })?;
        }
    }

    let json = serde_json::to_string_pretty(settings)?;
    let temp_path = path.with_extension("json.tmp");

    let write = |temp: &Path| -> std::io::Result<()> {
        let mut file = fs::File::create(temp)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()
    };
    write(&temp_path).map_err(|source| DmiError::FileWrite { path: temp_path.clone(), source })?;

    fs::rename(&temp_path, path)
        .map_err(|source| DmiError::FileWrite { path: path.to_path_buf(), source })?;

    Ok(())
}
