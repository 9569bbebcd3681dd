//! The real Signal account: contacts and deletion through signal-cli,
//! message history from the Signal Desktop database.

use std::path::PathBuf;

use crate::application::{ConversationEraser, MessageSource};
use crate::domain::{Contact, Message, Result, SignalSettings};

use super::signal_cli::SignalCli;
use super::signal_store::SignalDesktopStore;

pub struct SignalAccount {
    cli: SignalCli,
    database_paths: Vec<PathBuf>,
}

impl SignalAccount {
    #[must_use]
    pub fn new(settings: &SignalSettings) -> Self {
        Self {
            cli: SignalCli::new(settings),
            database_paths: settings.database_paths.clone(),
        }
    }

    #[must_use]
    pub fn cli_version(&self) -> String {
        self.cli.version()
    }
}

impl MessageSource for SignalAccount {
    fn list_contacts(&self) -> Result<Vec<Contact>> {
        self.cli.list_contacts()
    }

    fn fetch_messages(&self, contact_id: &str) -> Vec<Message> {
        tracing::info!("Fetching messages for {contact_id}");

        let store = match SignalDesktopStore::open_first(&self.database_paths) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!("Cannot read Signal Desktop database: {e}");
                return Vec::new();
            }
        };

        match store.messages_for(contact_id) {
            Ok(messages) => {
                tracing::info!("Retrieved {} messages", messages.len());
                messages
            }
            Err(e) => {
                tracing::warn!("Failed to query messages: {e}");
                Vec::new()
            }
        }
    }
}

impl ConversationEraser for SignalAccount {
    fn clear_conversation(&self, contact_id: &str, dry_run: bool) -> Result<()> {
        self.cli.clear_conversation(contact_id, dry_run)
    }

    fn leave_shared_groups(&self, contact_id: &str, dry_run: bool) -> Result<usize> {
        let groups = self.cli.groups_with(contact_id)?;
        self.cli.leave_groups(&groups, dry_run)?;
        Ok(groups.len())
    }
}
