//! Advisory backup check before deletion.

use std::path::PathBuf;

use crate::domain::{expand_home, BackupSettings};

/// Looks for Signal or system backups at configured locations.
pub struct BackupChecker {
    signal_paths: Vec<PathBuf>,
    system_paths: Vec<PathBuf>,
}

impl BackupChecker {
    #[must_use]
    pub fn new(settings: &BackupSettings) -> Self {
        Self {
            signal_paths: settings.signal_paths.iter().map(|p| expand_home(p)).collect(),
            system_paths: settings.system_paths.iter().map(|p| expand_home(p)).collect(),
        }
    }

    /// First existing backup location, Signal backups before system ones.
    #[must_use]
    pub fn find_backup(&self) -> Option<PathBuf> {
        let found = self
            .signal_paths
            .iter()
            .chain(&self.system_paths)
            .find(|p| p.exists())
            .cloned();

        match &found {
            Some(path) => tracing::info!("Found backup at {}", path.display()),
            None => tracing::warn!("No backup found at configured locations"),
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_finds_first_existing() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("Signal");
        std::fs::create_dir(&present).unwrap();

        let checker = BackupChecker::new(&BackupSettings {
            signal_paths: vec![dir.path().join("missing"), present.clone()],
            system_paths: vec![dir.path().to_path_buf()],
        });
        assert_eq!(checker.find_backup(), Some(present));
    }

    #[test]
    fn test_falls_back_to_system_paths() {
        let dir = tempdir().unwrap();
        let checker = BackupChecker::new(&BackupSettings {
            signal_paths: vec![dir.path().join("missing")],
            system_paths: vec![dir.path().to_path_buf()],
        });
        assert_eq!(checker.find_backup(), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_nothing_found() {
        let dir = tempdir().unwrap();
        let checker = BackupChecker::new(&BackupSettings {
            signal_paths: vec![dir.path().join("a")],
            system_paths: Vec::new(),
        });
        assert!(checker.find_backup().is_none());
    }
}
