//! Application layer - use cases and orchestration.
//!
//! Contact resolution, export, guarded deletion, and the workflow that
//! sequences them. All I/O with Signal and the user goes through `ports`.

pub mod backup;
pub mod deletion;
pub mod exporter;
pub mod formatter;
pub mod fuzzy;
pub mod ports;
pub mod resolver;
pub mod workflow;

#[cfg(test)]
pub mod testing;

pub use backup::BackupChecker;
pub use ports::{ConversationEraser, MessageSource, Prompter, Tone};
pub use workflow::{ExitStatus, Workflow, WorkflowOptions};
