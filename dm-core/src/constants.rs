//! Constants and configuration values for dmimatch
//!
//! Centralizes the limits, paths and defaults used by the identity
//! providers and the settings layer.

use std::time::Duration;

/// Identity acquisition limits
pub mod limits {
    /// Longest answer kept from the provider for one key, in bytes.
    /// DMI strings longer than this are not sane; the rest is drained and dropped.
    pub const MAX_ANSWER_LEN: usize = 4096;

    /// Bound on a full provider command line, `<command> -s <keyword>`,
    /// including a terminator byte
    pub const MAX_COMMAND_LEN: usize = 260;

    /// Maximum settings file size (64KB)
    pub const MAX_SETTINGS_SIZE: u64 = 64 * 1024;
}

/// Timing constants for provider invocation
pub mod timing {
    use super::*;

    /// Default bound on a single provider query
    pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 5000;

    /// Default bound on a single provider query as a Duration
    pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS);

    /// How often a provider that closed stdout is checked for exit
    pub const PROVIDER_POLL_INTERVAL: Duration = Duration::from_millis(10);
}

/// Provider defaults
pub mod provider {
    /// Command run by the dmidecode provider
    pub const DMIDECODE_COMMAND: &str = "dmidecode";

    /// Flag asking dmidecode for a single string
    pub const DMIDECODE_STRING_FLAG: &str = "-s";
}

/// System paths
pub mod paths {
    /// sysfs directory exposing the DMI identity attributes
    #[cfg(target_os = "linux")]
    pub const DMI_SYSFS_ROOT: &str = "/sys/class/dmi/id";

    #[cfg(not(target_os = "linux"))]
    pub const DMI_SYSFS_ROOT: &str = "";

    /// Application directory name under the user config dir
    pub const APP_DIR: &str = "dmimatch";

    /// Settings file name
    pub const SETTINGS_FILE: &str = "settings.json";

    /// Environment variable overriding the settings file location
    pub const CONFIG_ENV: &str = "DMIMATCH_CONFIG";

    /// User configuration directory
    /// XDG_CONFIG_HOME first, then HOME/.config, then whatever `dirs` reports
    pub fn user_config_dir() -> Option<std::path::PathBuf> {
        let config_base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            Some(std::path::PathBuf::from(xdg))
        } else if let Ok(home) = std::env::var("HOME") {
            Some(std::path::PathBuf::from(home).join(".config"))
        } else {
            dirs::config_dir()
        };

        config_base.map(|p| p.join(APP_DIR))
    }
}
