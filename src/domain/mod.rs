//! Domain layer - core types and errors.
//!
//! This layer contains pure domain models and error types
//! without any external dependencies (subprocess, DB, terminal).

pub mod config;
pub mod error;
pub mod models;

pub use config::{expand_home, AppConfig, BackupSettings, SignalSettings};
pub use error::{AppError, Result};
pub use models::{
    Contact, ContactQuery, DeletionLogEntry, ExportConfig, ExportFormat, ExportManifest, Message,
};
