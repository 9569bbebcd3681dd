//! sig-prune-contact - Export a Signal conversation, then safely delete it.
//!
//! One run targets one contact: resolve it (by number, UUID, or interactive
//! search), export its messages into a per-contact directory with a manifest,
//! and only then, if asked and confirmed, clear the conversation from the
//! account.
//!
//!   sig-prune-contact                                  # pick a contact interactively
//!   sig-prune-contact --contact +15551234567 --format json,md
//!   sig-prune-contact --contact <uuid> --delete --dry-run

mod application;
mod cli;
mod domain;
mod infrastructure;

use clap::Parser;
use colored::Colorize;

use application::{BackupChecker, ExitStatus, Workflow};
use cli::Cli;
use infrastructure::{load_config, logging, SignalAccount, TerminalPrompter};

fn main() {
    let cli = Cli::parse();

    println!(
        "{} {}",
        "sig-prune-contact".bold().cyan(),
        env!("CARGO_PKG_VERSION").dimmed()
    );

    if let Err(e) = logging::init(&cli.log_settings()) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    install_interrupt_handler();

    match run(&cli) {
        Ok(status) => std::process::exit(status.code()),
        Err(e) => {
            tracing::debug!("Run aborted: {e:?}");
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Main application logic.
fn run(cli: &Cli) -> domain::Result<ExitStatus> {
    let config = load_config(cli.config_path())?;
    let options = cli.workflow_options(&config)?;

    let account = SignalAccount::new(&config.signal);
    tracing::info!("signal-cli version: {}", account.cli_version());

    let mut prompter = TerminalPrompter::stdio();
    let backup = BackupChecker::new(&config.backup);

    Workflow::new(&account, &mut prompter, backup, options).run()
}

/// Ctrl-C ends the run with exit code 1.
fn install_interrupt_handler() {
    let result = ctrlc::set_handler(|| {
        eprintln!();
        eprintln!("{}", "Interrupted by user".yellow());
        std::process::exit(1);
    });

    if let Err(e) = result {
        tracing::warn!("Could not install Ctrl-C handler: {e}");
    }
}
