//! Seams between the workflow and the outside world.
//!
//! The workflow only talks to Signal and to the user through these traits, so
//! the real adapters in `infrastructure` can be swapped for in-memory fakes.

use crate::domain::{Contact, Message, Result};

/// Read access to the Signal account.
pub trait MessageSource {
    /// Lists every contact known to the account.
    ///
    /// # Errors
    /// Returns error if the account cannot be queried at all.
    fn list_contacts(&self) -> Result<Vec<Contact>>;

    /// Returns the conversation with `contact_id` in chronological order.
    ///
    /// Never fails: an unreachable store is logged and yields no messages.
    fn fetch_messages(&self, contact_id: &str) -> Vec<Message>;
}

/// Destructive access to the Signal account.
pub trait ConversationEraser {
    /// Clears the conversation with `contact_id`.
    ///
    /// # Errors
    /// Returns error if the underlying client refuses or fails.
    fn clear_conversation(&self, contact_id: &str, dry_run: bool) -> Result<()>;

    /// Leaves every group `contact_id` is a member of, returning how many.
    ///
    /// # Errors
    /// Returns error if groups cannot be listed or one cannot be left.
    fn leave_shared_groups(&self, contact_id: &str, dry_run: bool) -> Result<usize>;
}

/// How a status line should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Heading,
    Success,
    Warning,
    Failure,
}

/// Interactive user input and output.
pub trait Prompter {
    /// Asks for free text. An empty answer yields `default`.
    ///
    /// # Errors
    /// Returns `Interrupted` if input is closed.
    fn ask(&mut self, prompt: &str, default: Option<&str>) -> Result<String>;

    /// Asks a yes/no question.
    ///
    /// # Errors
    /// Returns `Interrupted` if input is closed.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    /// Shows an enumerated contact table (numbered from 1).
    fn show_contacts(&mut self, title: &str, contacts: &[Contact]);

    /// Shows a titled block of `key: value` rows.
    fn show_panel(&mut self, title: &str, rows: &[(&str, String)]);

    /// Prints one line of status text.
    fn say(&mut self, tone: Tone, line: &str);
}
