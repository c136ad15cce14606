//! User settings for hostvault
//!
//! Manages CLI preferences and the stored master-password record. Protocol
//! parameters (iterations, lengths) live in `crypto::params::CryptoConfig`
//! and are not user-configurable.

use serde::{Deserialize, Serialize};

use super::paths::VaultPaths;
use crate::crypto::password::PasswordRecord;
use crate::error::VaultError;

/// User settings for hostvault
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Master-password record (`saltHex:hashHex`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_password: Option<String>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            log_level: default_log_level(),
            master_password: None,
        }
    }
}

impl Settings {
    /// Whether a master password has been set
    pub fn has_master_password(&self) -> bool {
        self.master_password.is_some()
    }

    /// Store a master-password record
    pub fn set_master_password(&mut self, record: &PasswordRecord) {
        self.master_password = Some(record.to_string());
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &VaultPaths) -> Result<Self, VaultError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| VaultError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents)
                .map_err(|e| VaultError::Config(format!("Failed to parse settings file: {}", e)))?;

            tracing::debug!(path = %settings_path.display(), "Loaded settings");
            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &VaultPaths) -> Result<(), VaultError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| VaultError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(&settings_path, contents)
            .map_err(|e| VaultError::Io(format!("Failed to write settings file: {}", e)))?;

        tracing::debug!(path = %settings_path.display(), "Saved settings");
        Ok(())
    }
}
