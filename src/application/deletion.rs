//! Deletion guard.
//!
//! A conversation is only cleared when the export directory handed in holds an
//! `export_manifest.json` and its `deletion_log.json` (if any) is readable.
//! Every attempt past those checks appends one entry to that log.

use std::fs;
use std::path::Path;

use chrono::Utc;

use crate::domain::{AppError, Contact, DeletionLogEntry, Result};

use super::exporter::MANIFEST_FILE;
use super::ports::ConversationEraser;

/// Append-only audit log of deletion attempts.
pub const DELETION_LOG_FILE: &str = "deletion_log.json";

/// Clears conversations, but only behind a completed export.
pub struct DeletionGuard<'a, E: ConversationEraser + ?Sized> {
    eraser: &'a E,
}

impl<'a, E: ConversationEraser + ?Sized> DeletionGuard<'a, E> {
    #[must_use]
    pub const fn new(eraser: &'a E) -> Self {
        Self { eraser }
    }

    /// Deletes the conversation with `contact`.
    ///
    /// Returns `false` without touching the account when the manifest is
    /// missing or the existing deletion log is unusable, and `false` after
    /// logging a failed attempt when clearing fails.
    pub fn delete_conversation(
        &self,
        contact: &Contact,
        export_dir: &Path,
        leave_groups: bool,
        dry_run: bool,
    ) -> bool {
        let manifest_path = export_dir.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            tracing::error!("Export manifest not found at {}", manifest_path.display());
            tracing::error!("Refusing to delete without successful export");
            return false;
        }

        // The attempt must be recordable before anything irreversible happens.
        let log_path = export_dir.join(DELETION_LOG_FILE);
        let mut history = match read_log(&log_path) {
            Ok(history) => history,
            Err(e) => {
                tracing::error!("Deletion log at {} is unusable: {e}", log_path.display());
                tracing::error!("Refusing to delete without a writable audit log");
                return false;
            }
        };

        let contact_id = contact.identifier();
        let success = match self.eraser.clear_conversation(contact_id, dry_run) {
            Ok(()) => {
                tracing::info!("Cleared conversation with {contact_id}");
                if leave_groups {
                    self.leave_shared_groups(contact_id, dry_run);
                }
                true
            }
            Err(e) => {
                tracing::error!("Error during deletion: {e}");
                false
            }
        };

        history.push(DeletionLogEntry {
            timestamp: Utc::now(),
            contact: contact.clone(),
            success,
            dry_run,
        });
        if let Err(e) = write_log(&log_path, &history, dry_run) {
            tracing::error!(
                "Attempt for {contact_id} finished (success: {success}) but was not recorded: {e}"
            );
        }

        success
    }

    fn leave_shared_groups(&self, contact_id: &str, dry_run: bool) {
        match self.eraser.leave_shared_groups(contact_id, dry_run) {
            Ok(0) => tracing::info!("No groups shared with {contact_id}"),
            Ok(left) => tracing::info!("Left {left} groups shared with {contact_id}"),
            Err(e) => tracing::warn!("Could not leave groups shared with {contact_id}: {e}"),
        }
    }
}

/// Rewrites `deletion_log.json` with `entries`. No-op in dry-run mode.
///
/// # Errors
/// Returns error if the log cannot be serialized or written.
pub fn write_log(log_path: &Path, entries: &[DeletionLogEntry], dry_run: bool) -> Result<()> {
    if dry_run {
        tracing::info!("[DRY RUN] Would write deletion log to {}", log_path.display());
        return Ok(());
    }

    let content = serde_json::to_string_pretty(entries).map_err(AppError::json_parse)?;
    fs::write(log_path, content)
        .map_err(|e| AppError::io(format!("Failed to write {}", log_path.display()), e))?;

    tracing::info!("Wrote deletion log: {}", log_path.display());
    Ok(())
}

/// Reads all entries of a deletion log; a missing file is an empty log.
///
/// # Errors
/// Returns error if the file exists but cannot be read or parsed.
pub fn read_log(log_path: &Path) -> Result<Vec<DeletionLogEntry>> {
    if !log_path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(log_path)
        .map_err(|e| AppError::io(format!("Failed to read {}", log_path.display()), e))?;
    serde_json::from_str(&content).map_err(AppError::json_parse)
}
