//! End-to-end run: resolve, fetch, confirm, export, and optionally delete.
//!
//! Each stage can end the run early; the exit status says how far it got.

use std::path::PathBuf;

use crate::domain::{Contact, ExportFormat, Result};

use super::backup::BackupChecker;
use super::deletion::DeletionGuard;
use super::exporter::{ExportOptions, ExportReport, Exporter};
use super::ports::{ConversationEraser, MessageSource, Prompter, Tone};
use super::resolver::resolve_contact;

/// Process exit status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Export done; deletion done, cancelled, or not requested.
    Success,
    /// Bad input, nothing selected, export declined, or export failed.
    Failed,
    /// Export done but deletion failed or had no real export to rely on.
    DeletionFailed,
}

impl ExitStatus {
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failed => 1,
            Self::DeletionFailed => 2,
        }
    }
}

/// Everything the run needs to know from the command line.
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    pub contact: Option<String>,
    pub export_dir: PathBuf,
    pub formats: Vec<ExportFormat>,
    pub include_attachments: bool,
    pub delete: bool,
    pub require_backup_check: bool,
    pub dry_run: bool,
    /// Skip every interactive confirmation, including the typed deletion token.
    pub force: bool,
    pub leave_groups: bool,
}

/// Sequences the stages of one run against one contact.
pub struct Workflow<'a, A, P>
where
    A: MessageSource + ConversationEraser + ?Sized,
    P: Prompter + ?Sized,
{
    account: &'a A,
    prompter: &'a mut P,
    backup: BackupChecker,
    options: WorkflowOptions,
}

impl<'a, A, P> Workflow<'a, A, P>
where
    A: MessageSource + ConversationEraser + ?Sized,
    P: Prompter + ?Sized,
{
    pub fn new(
        account: &'a A,
        prompter: &'a mut P,
        backup: BackupChecker,
        options: WorkflowOptions,
    ) -> Self {
        Self {
            account,
            prompter,
            backup,
            options,
        }
    }

    /// Runs every stage and reports how the run ended.
    ///
    /// # Errors
    /// Returns error for invalid contact input, an unreachable contact list, or
    /// closed input during a prompt.
    pub fn run(&mut self) -> Result<ExitStatus> {
        self.prompter.say(Tone::Heading, "Step 1: Contact Selection");
        let contact_arg = self.options.contact.clone();
        let Some(contact) =
            resolve_contact(self.account, &mut *self.prompter, contact_arg.as_deref())?
        else {
            self.prompter
                .say(Tone::Warning, "No contact selected. Exiting.");
            tracing::info!("No contact selected, exiting");
            return Ok(ExitStatus::Failed);
        };
        tracing::info!("Selected contact: {}", contact.label());

        self.prompter.say(Tone::Heading, "Step 2: Fetching Messages");
        let messages = self.account.fetch_messages(contact.identifier());
        self.prompter
            .say(Tone::Success, &format!("✓ Found {} messages", messages.len()));
        tracing::info!(
            "Fetched {} messages for {}",
            messages.len(),
            contact.identifier()
        );

        self.prompter.say(Tone::Heading, "Step 3: Export Configuration");
        if !self.options.force && !self.confirm_export(&contact, messages.len())? {
            self.prompter.say(Tone::Warning, "Export cancelled.");
            tracing::info!("Export cancelled by user");
            return Ok(ExitStatus::Failed);
        }

        self.prompter.say(Tone::Heading, "Step 4: Exporting Messages");
        let exporter = Exporter::new(self.options.export_dir.clone());
        let export_options = ExportOptions {
            formats: self.options.formats.clone(),
            include_attachments: self.options.include_attachments,
            dry_run: self.options.dry_run,
        };
        let report = match exporter.export_messages(&contact, &messages, &export_options) {
            Ok(report) => report,
            Err(e) => {
                self.prompter
                    .say(Tone::Failure, &format!("✗ Export failed: {e}"));
                tracing::error!("Export failed: {e}");
                return Ok(ExitStatus::Failed);
            }
        };
        if report.dry_run {
            self.prompter.say(
                Tone::Success,
                &format!(
                    "✓ Dry run complete, nothing written: {}",
                    report.directory.display()
                ),
            );
        } else {
            self.prompter.say(
                Tone::Success,
                &format!("✓ Export complete: {}", report.directory.display()),
            );
            tracing::info!("Export successful to {}", report.directory.display());
        }

        if !self.options.delete {
            self.prompter
                .say(Tone::Success, "✓ Export complete (deletion not enabled)");
            tracing::info!("Export completed without deletion");
            return Ok(ExitStatus::Success);
        }

        self.prompter.say(Tone::Heading, "Step 5: Deletion Phase");
        self.run_deletion(&contact, &report)
    }

    fn confirm_export(&mut self, contact: &Contact, message_count: usize) -> Result<bool> {
        let formats: Vec<String> = self.options.formats.iter().map(ToString::to_string).collect();
        self.prompter.show_panel(
            "Export Configuration",
            &[
                ("Contact", contact.label()),
                (
                    "Export Directory",
                    self.options.export_dir.display().to_string(),
                ),
                ("Formats", formats.join(", ")),
                (
                    "Attachments",
                    if self.options.include_attachments { "Yes" } else { "No" }.to_string(),
                ),
                ("Messages to Export", message_count.to_string()),
                ("Mode", mode_label(self.options.dry_run, "LIVE")),
            ],
        );
        self.prompter.confirm("Proceed with export?")
    }

    fn run_deletion(&mut self, contact: &Contact, report: &ExportReport) -> Result<ExitStatus> {
        if self.options.require_backup_check {
            self.prompter.say(Tone::Warning, "Checking for backup...");
            if self.backup.find_backup().is_none()
                && !self.options.force
                && !self.prompter.confirm("No backup found. Continue anyway?")?
            {
                self.prompter.say(Tone::Warning, "Deletion cancelled.");
                tracing::info!("Deletion cancelled - no backup found");
                return Ok(ExitStatus::Success);
            }
        }

        if !self.options.force && !self.confirm_deletion(contact, report)? {
            self.prompter.say(Tone::Warning, "Deletion cancelled.");
            tracing::info!("Deletion cancelled by user");
            return Ok(ExitStatus::Success);
        }

        let Some(export_dir) = report.usable_directory() else {
            self.prompter.say(
                Tone::Failure,
                "Cannot delete without export directory. Use non-dry-run mode.",
            );
            return Ok(ExitStatus::DeletionFailed);
        };

        let guard = DeletionGuard::new(self.account);
        let name = contact.name.as_deref().unwrap_or("Unknown");
        if guard.delete_conversation(
            contact,
            export_dir,
            self.options.leave_groups,
            self.options.dry_run,
        ) {
            self.prompter.show_panel(
                "Deletion Complete",
                &[("Result", format!("✓ Conversation with {name} deleted successfully"))],
            );
            tracing::info!("Deletion successful for {name}");
            self.prompter.say(Tone::Success, "✓ Operation complete!");
            Ok(ExitStatus::Success)
        } else {
            self.prompter.show_panel(
                "Deletion Failed",
                &[("Result", format!("✗ Failed to delete conversation with {name}"))],
            );
            tracing::error!("Deletion failed for {name}");
            self.prompter
                .say(Tone::Failure, "✗ Deletion failed (export was successful)");
            Ok(ExitStatus::DeletionFailed)
        }
    }

    /// Summary plus a typed confirmation of the contact's name slug.
    fn confirm_deletion(&mut self, contact: &Contact, report: &ExportReport) -> Result<bool> {
        let stats = &report.manifest.statistics;
        self.prompter.show_panel(
            "DELETION SUMMARY",
            &[
                ("Messages", stats.message_count.to_string()),
                ("Attachments", stats.attachment_count.to_string()),
                ("Date Range", stats.date_range.to_string()),
                ("Contact", contact.label()),
                ("Mode", mode_label(self.options.dry_run, "LIVE DELETION")),
            ],
        );

        let token = contact.confirmation_token();
        self.prompter.say(
            Tone::Warning,
            &format!("Type the contact name to confirm deletion: {token}"),
        );
        let typed = self.prompter.ask("Confirmation", None)?;

        if typed.trim().to_lowercase() == token.to_lowercase() {
            return Ok(true);
        }
        self.prompter.say(Tone::Failure, "Deletion cancelled");
        Ok(false)
    }
}

fn mode_label(dry_run: bool, live: &str) -> String {
    if dry_run {
        "DRY RUN".to_string()
    } else {
        live.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::deletion::{read_log, DELETION_LOG_FILE};
    use crate::application::exporter::MANIFEST_FILE;
    use crate::application::testing::{FakeAccount, ScriptedPrompter};
    use crate::domain::{AppError, BackupSettings, Message};
    use serde_json::json;
    use std::path::Path;
    use tempfile::tempdir;

    fn alice() -> Contact {
        Contact {
            name: Some("Alice Smith".into()),
            number: Some("+15551234567".into()),
            uuid: None,
        }
    }

    fn account() -> FakeAccount {
        let messages: Vec<Message> = serde_json::from_value(json!([
            {"sender": "+15551234567", "body": "hi", "timestamp": "2024-01-01T10:00:00", "attachments": []},
            {"sender": "me", "body": "hello", "timestamp": "2024-01-01T10:01:00", "attachments": [{"id": "x"}]},
        ]))
        .unwrap();
        FakeAccount::new(vec![alice()], messages)
    }

    fn options(export_dir: &Path) -> WorkflowOptions {
        WorkflowOptions {
            contact: Some("+15551234567".into()),
            export_dir: export_dir.to_path_buf(),
            formats: vec![ExportFormat::Json],
            include_attachments: false,
            delete: false,
            require_backup_check: false,
            dry_run: false,
            force: false,
            leave_groups: false,
        }
    }

    fn no_backups(dir: &Path) -> BackupChecker {
        BackupChecker::new(&BackupSettings {
            signal_paths: vec![dir.join("no-signal-backup")],
            system_paths: Vec::new(),
        })
    }

    fn run(account: &FakeAccount, answers: &[&str], opts: WorkflowOptions) -> (Result<ExitStatus>, ScriptedPrompter) {
        let mut prompter = ScriptedPrompter::new(answers);
        let backup = no_backups(&opts.export_dir);
        let status = Workflow::new(account, &mut prompter, backup, opts).run();
        (status, prompter)
    }

    fn count_entries(path: &Path) -> usize {
        if !path.exists() {
            return 0;
        }
        std::fs::read_dir(path).unwrap().count()
    }

    #[test]
    fn test_export_only_succeeds() {
        let dir = tempdir().unwrap();
        let account = account();

        let (status, _) = run(&account, &["y"], options(dir.path()));
        assert_eq!(status.unwrap(), ExitStatus::Success);
        assert!(dir
            .path()
            .join("alice-smith_15551234567")
            .join(MANIFEST_FILE)
            .is_file());
        assert!(account.cleared.borrow().is_empty());
        assert_eq!(account.fetched.borrow().as_slice(), &["+15551234567".to_string()]);
    }

    #[test]
    fn test_unknown_contact_exits_1() {
        let dir = tempdir().unwrap();
        let account = account();
        let opts = WorkflowOptions {
            contact: Some("+10000000000".into()),
            ..options(dir.path())
        };

        let (status, _) = run(&account, &[], opts);
        assert_eq!(status.unwrap(), ExitStatus::Failed);
        assert!(account.fetched.borrow().is_empty());
    }

    #[test]
    fn test_invalid_contact_shape_is_error() {
        let dir = tempdir().unwrap();
        let account = account();
        let opts = WorkflowOptions {
            contact: Some("not-a-contact".into()),
            ..options(dir.path())
        };

        let (status, _) = run(&account, &[], opts);
        assert!(matches!(status, Err(AppError::InvalidInput { .. })));
        assert_eq!(count_entries(dir.path()), 0);
    }

    #[test]
    fn test_declined_export_exits_1() {
        let dir = tempdir().unwrap();
        let account = account();

        let (status, _) = run(&account, &["n"], options(dir.path()));
        assert_eq!(status.unwrap(), ExitStatus::Failed);
        assert_eq!(count_entries(dir.path()), 0);
    }

    #[test]
    fn test_export_failure_exits_1() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let account = account();
        let opts = WorkflowOptions {
            force: true,
            delete: true,
            ..options(&blocker)
        };

        let (status, _) = run(&account, &[], opts);
        assert_eq!(status.unwrap(), ExitStatus::Failed);
        assert!(account.cleared.borrow().is_empty());
    }

    #[test]
    fn test_export_and_delete_with_typed_confirmation() {
        let dir = tempdir().unwrap();
        let account = account();
        let opts = WorkflowOptions {
            delete: true,
            ..options(dir.path())
        };

        let (status, prompter) = run(&account, &["y", "ALICE-SMITH "], opts);
        assert_eq!(status.unwrap(), ExitStatus::Success);
        assert_eq!(account.cleared.borrow().len(), 1);

        let log = read_log(
            &dir.path()
                .join("alice-smith_15551234567")
                .join(DELETION_LOG_FILE),
        )
        .unwrap();
        assert_eq!(log.len(), 1);
        assert!(log[0].success);
        assert!(prompter
            .panels
            .iter()
            .any(|p| p.starts_with("DELETION SUMMARY") && p.contains("Attachments: 1")));
    }

    #[test]
    fn test_mismatched_token_cancels_without_log() {
        let dir = tempdir().unwrap();
        let account = account();
        let opts = WorkflowOptions {
            delete: true,
            ..options(dir.path())
        };

        let (status, _) = run(&account, &["y", "alice"], opts);
        assert_eq!(status.unwrap(), ExitStatus::Success);
        assert!(account.cleared.borrow().is_empty());
        assert!(!dir
            .path()
            .join("alice-smith_15551234567")
            .join(DELETION_LOG_FILE)
            .exists());
    }

    #[test]
    fn test_dry_run_delete_confirmed_exits_2_without_writes() {
        let dir = tempdir().unwrap();
        let account = account();
        let opts = WorkflowOptions {
            delete: true,
            dry_run: true,
            formats: vec![ExportFormat::Json, ExportFormat::Md, ExportFormat::Html],
            include_attachments: true,
            ..options(dir.path())
        };

        let (status, _) = run(&account, &["y", "alice-smith"], opts);
        assert_eq!(status.unwrap(), ExitStatus::DeletionFailed);
        assert_eq!(count_entries(dir.path()), 0);
        assert!(account.cleared.borrow().is_empty());
    }

    #[test]
    fn test_dry_run_delete_cancelled_exits_0() {
        let dir = tempdir().unwrap();
        let account = account();
        let opts = WorkflowOptions {
            delete: true,
            dry_run: true,
            ..options(dir.path())
        };

        let (status, _) = run(&account, &["y", "nope"], opts);
        assert_eq!(status.unwrap(), ExitStatus::Success);
        assert_eq!(count_entries(dir.path()), 0);
    }

    #[test]
    fn test_force_skips_all_prompts() {
        let dir = tempdir().unwrap();
        let account = account();
        let opts = WorkflowOptions {
            delete: true,
            force: true,
            require_backup_check: true,
            ..options(dir.path())
        };

        let (status, prompter) = run(&account, &[], opts);
        assert_eq!(status.unwrap(), ExitStatus::Success);
        assert!(prompter.asked.is_empty());
        assert_eq!(account.cleared.borrow().len(), 1);
    }

    #[test]
    fn test_failed_clear_exits_2() {
        let dir = tempdir().unwrap();
        let account = account().failing_clear();
        let opts = WorkflowOptions {
            delete: true,
            force: true,
            ..options(dir.path())
        };

        let (status, _) = run(&account, &[], opts);
        assert_eq!(status.unwrap(), ExitStatus::DeletionFailed);
        let log = read_log(
            &dir.path()
                .join("alice-smith_15551234567")
                .join(DELETION_LOG_FILE),
        )
        .unwrap();
        assert_eq!(log.len(), 1);
        assert!(!log[0].success);
    }

    #[test]
    fn test_missing_backup_declined_cancels_deletion() {
        let dir = tempdir().unwrap();
        let account = account();
        let opts = WorkflowOptions {
            delete: true,
            require_backup_check: true,
            ..options(dir.path())
        };

        let (status, prompter) = run(&account, &["y", "n"], opts);
        assert_eq!(status.unwrap(), ExitStatus::Success);
        assert!(account.cleared.borrow().is_empty());
        assert!(prompter
            .asked
            .iter()
            .any(|q| q == "No backup found. Continue anyway?"));
    }

    #[test]
    fn test_missing_backup_overridden() {
        let dir = tempdir().unwrap();
        let account = account();
        let opts = WorkflowOptions {
            delete: true,
            require_backup_check: true,
            ..options(dir.path())
        };

        let (status, _) = run(&account, &["y", "y", "alice-smith"], opts);
        assert_eq!(status.unwrap(), ExitStatus::Success);
        assert_eq!(account.cleared.borrow().len(), 1);
    }

    #[test]
    fn test_closed_input_is_interrupted() {
        let dir = tempdir().unwrap();
        let account = account();

        let (status, _) = run(&account, &[], options(dir.path()));
        assert!(matches!(status, Err(AppError::Interrupted)));
        assert_eq!(count_entries(dir.path()), 0);
    }
}
