//! Infrastructure layer - external adapters (signal-cli, database, terminal).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod account;
pub mod config;
pub mod logging;
pub mod signal_cli;
pub mod signal_store;
pub mod terminal;

pub use account::SignalAccount;
pub use config::load_config;
pub use logging::LogSettings;
pub use terminal::TerminalPrompter;
