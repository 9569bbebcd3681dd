//! Export engine.
//!
//! Writes a contact's conversation into `<base>/<slug>/` in every requested
//! format, stages an attachments directory, and writes the manifest last. An
//! export directory only counts as complete once its manifest exists.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppError, Contact, ExportConfig, ExportFormat, ExportManifest, Message, Result};

use super::formatter::render;

/// Manifest file whose presence marks a completed export.
pub const MANIFEST_FILE: &str = "export_manifest.json";

/// Staging subdirectory for attachments.
pub const ATTACHMENTS_DIR: &str = "attachments";

/// What to export and how.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub formats: Vec<ExportFormat>,
    pub include_attachments: bool,
    pub dry_run: bool,
}

/// Outcome of an export run.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Directory the export targets (not created in dry-run mode).
    pub directory: PathBuf,
    pub manifest: ExportManifest,
    pub dry_run: bool,
}

impl ExportReport {
    /// The export directory, if it really exists on disk with a manifest.
    #[must_use]
    pub fn usable_directory(&self) -> Option<&Path> {
        (!self.dry_run).then_some(self.directory.as_path())
    }
}

/// Writes conversation exports below a base directory.
pub struct Exporter {
    base_dir: PathBuf,
}

impl Exporter {
    #[must_use]
    pub const fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Directory an export for `contact` lands in.
    #[must_use]
    pub fn directory_for(&self, contact: &Contact) -> PathBuf {
        self.base_dir.join(contact.directory_slug())
    }

    /// Exports `messages` for `contact`.
    ///
    /// Partial files are left in place on failure; without a manifest the
    /// directory is not treated as a completed export.
    ///
    /// # Errors
    /// Returns error if any directory or file cannot be written.
    pub fn export_messages(
        &self,
        contact: &Contact,
        messages: &[Message],
        options: &ExportOptions,
    ) -> Result<ExportReport> {
        let export_dir = self.directory_for(contact);
        let dry_run = options.dry_run;

        if dry_run {
            tracing::info!("[DRY RUN] Would create export directory: {}", export_dir.display());
        } else {
            fs::create_dir_all(&export_dir).map_err(|e| {
                AppError::io(
                    format!("Failed to create export directory {}", export_dir.display()),
                    e,
                )
            })?;
            tracing::info!("Created export directory: {}", export_dir.display());
        }

        let manifest = ExportManifest::new(
            contact,
            messages,
            ExportConfig {
                formats: options.formats.clone(),
                include_attachments: options.include_attachments,
            },
        );

        for format in &options.formats {
            let path = export_dir.join(format.file_name());
            if dry_run {
                tracing::info!(
                    "[DRY RUN] Would write {} messages as {format} to {}",
                    messages.len(),
                    path.display()
                );
                continue;
            }

            let content = render(*format, contact, messages, manifest.export_date)
                .map_err(AppError::json_parse)?;
            write_file(&path, &content)?;
            tracing::info!(
                "Exported {} messages as {format} to {}",
                messages.len(),
                path.display()
            );
        }

        if options.include_attachments {
            stage_attachments(
                &export_dir,
                manifest.statistics.attachment_count,
                dry_run,
            )?;
        }

        let manifest_path = export_dir.join(MANIFEST_FILE);
        if dry_run {
            tracing::info!("[DRY RUN] Would write manifest to {}", manifest_path.display());
        } else {
            let content =
                serde_json::to_string_pretty(&manifest).map_err(AppError::json_parse)?;
            write_file(&manifest_path, &content)?;
            tracing::info!("Wrote manifest: {}", manifest_path.display());
            tracing::info!("Export complete: {}", export_dir.display());
        }

        Ok(ExportReport {
            directory: export_dir,
            manifest,
            dry_run,
        })
    }
}

/// Creates the attachments staging directory when there is anything to stage.
fn stage_attachments(export_dir: &Path, attachment_count: usize, dry_run: bool) -> Result<()> {
    let attachments_dir = export_dir.join(ATTACHMENTS_DIR);

    if dry_run {
        tracing::info!(
            "[DRY RUN] Would create attachments directory at {}",
            attachments_dir.display()
        );
        return Ok(());
    }

    if attachment_count == 0 {
        tracing::debug!("No attachments referenced, skipping staging directory");
        return Ok(());
    }

    fs::create_dir_all(&attachments_dir).map_err(|e| {
        AppError::io(
            format!("Failed to create {}", attachments_dir.display()),
            e,
        )
    })?;
    tracing::info!("Created attachments directory: {}", attachments_dir.display());
    tracing::info!(
        attachment_count,
        "Attachments must be copied manually from Signal storage"
    );

    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)
        .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))
}
