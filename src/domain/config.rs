//! Application configuration.
//!
//! Every field has a built-in default so a missing or partial config file is
//! fine. Paths may start with `~`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Export location settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Base directory that holds one subdirectory per exported contact.
    #[serde(default = "default_export_dir")]
    pub base_dir: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            base_dir: default_export_dir(),
        }
    }
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("~/Documents/SWORD/sigexport2/signalchats")
}

/// How to reach the Signal account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSettings {
    /// signal-cli executable name or path.
    #[serde(default = "default_cli_binary")]
    pub cli_binary: String,

    /// signal-cli data directory passed as `--config`.
    #[serde(default = "default_cli_config_dir")]
    pub config_dir: PathBuf,

    /// Signal Desktop databases, tried in order.
    #[serde(default = "default_database_paths")]
    pub database_paths: Vec<PathBuf>,
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            cli_binary: default_cli_binary(),
            config_dir: default_cli_config_dir(),
            database_paths: default_database_paths(),
        }
    }
}

fn default_cli_binary() -> String {
    "signal-cli".to_string()
}

fn default_cli_config_dir() -> PathBuf {
    PathBuf::from("~/.local/share/signal-cli")
}

fn default_database_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("~/.local/share/signal-desktop/sql/db.sqlite"),
        PathBuf::from("~/.var/app/org.signal.Signal/data/signal-desktop/sql/db.sqlite"),
    ]
}

/// Where to look for evidence of a backup before deleting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupSettings {
    #[serde(default = "default_signal_backup_paths")]
    pub signal_paths: Vec<PathBuf>,

    #[serde(default)]
    pub system_paths: Vec<PathBuf>,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            signal_paths: default_signal_backup_paths(),
            system_paths: Vec::new(),
        }
    }
}

fn default_signal_backup_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("~/Signal"),
        PathBuf::from("~/Documents/Signal"),
        PathBuf::from("~/.signal"),
    ]
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub export: ExportSettings,

    #[serde(default)]
    pub signal: SignalSettings,

    #[serde(default)]
    pub backup: BackupSettings,
}

impl AppConfig {
    /// Default location of the config file.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sig-prune-contact")
            .join("config.toml")
    }
}

/// Expands a leading `~` to the home directory.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
