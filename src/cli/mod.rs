//! CLI interface using clap.
//!
//! Provides the command-line arguments for a single export-then-delete run.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::application::WorkflowOptions;
use crate::domain::{expand_home, AppConfig, ExportFormat, Result};
use crate::infrastructure::LogSettings;

/// Export a Signal conversation, then optionally delete it from the account.
///
/// Deletion only ever runs against a directory holding a completed export.
#[derive(Parser, Debug)]
#[command(name = "sig-prune-contact")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Target contact (phone number or UUID). If omitted, interactive selection.
    #[arg(long)]
    pub contact: Option<String>,

    /// Base export directory [default: from config].
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Export formats (comma-separated): json,md,html.
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Export and copy attachments.
    #[arg(long)]
    pub attachments: bool,

    /// Enable deletion after successful export.
    #[arg(long)]
    pub delete: bool,

    /// Require confirmation that backup exists before deletion.
    #[arg(long)]
    pub require_backup_check: bool,

    /// Preview only, no side effects.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip interactive confirmations (batch mode).
    #[arg(long)]
    pub force: bool,

    /// Also leave groups with this contact.
    #[arg(long)]
    pub leave_groups: bool,

    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write structured JSON-lines logs to file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Configuration file [default: <config dir>/sig-prune-contact/config.toml].
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Logging options for this run.
    #[must_use]
    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            verbosity: self.verbose,
            log_file: self.log_file.as_deref().map(expand_home),
        }
    }

    /// Parse the format list argument.
    ///
    /// # Errors
    /// Returns `InvalidInput` for an empty list or an unknown format.
    pub fn export_formats(&self) -> Result<Vec<ExportFormat>> {
        ExportFormat::parse_list(&self.format)
    }

    /// Merges flags over `config` into the run options.
    ///
    /// # Errors
    /// Returns `InvalidInput` if `--format` cannot be parsed.
    pub fn workflow_options(&self, config: &AppConfig) -> Result<WorkflowOptions> {
        let export_dir = self
            .export_dir
            .as_deref()
            .unwrap_or(config.export.base_dir.as_path());

        Ok(WorkflowOptions {
            contact: self.contact.clone().filter(|c| !c.trim().is_empty()),
            export_dir: expand_home(export_dir),
            formats: self.export_formats()?,
            include_attachments: self.attachments,
            delete: self.delete,
            require_backup_check: self.require_backup_check,
            dry_run: self.dry_run,
            force: self.force,
            leave_groups: self.leave_groups,
        })
    }

    /// Config file to load, if one was given.
    #[must_use]
    pub fn config_path(&self) -> Option<&Path> {
        self.config.as_deref()
    }
}
