//! signal-cli subprocess adapter.
//!
//! Lists contacts and groups, and leaves groups, by shelling out to signal-cli.

use std::path::PathBuf;
use std::process::Command;

use crate::domain::{expand_home, AppError, Contact, Result, SignalSettings};

/// Wrapper around the signal-cli executable.
pub struct SignalCli {
    binary: String,
    config_dir: PathBuf,
}

impl SignalCli {
    #[must_use]
    pub fn new(settings: &SignalSettings) -> Self {
        Self {
            binary: settings.cli_binary.clone(),
            config_dir: expand_home(&settings.config_dir),
        }
    }

    /// Runs signal-cli with `args` and returns trimmed stdout.
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg(format!("--config={}", self.config_dir.display()))
            .args(args)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AppError::SignalCli {
                        message: format!(
                            "{} not found. Install it via: snap install signal-cli",
                            self.binary
                        ),
                    }
                } else {
                    AppError::io(format!("Failed to run {}", self.binary), e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(AppError::SignalCli { message });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// signal-cli version string, or `unknown`.
    #[must_use]
    pub fn version(&self) -> String {
        self.run(&["--version"]).unwrap_or_else(|e| {
            tracing::debug!("Could not determine signal-cli version: {e}");
            "unknown".to_string()
        })
    }

    /// All contacts reported by `listContacts`.
    ///
    /// # Errors
    /// Returns error if signal-cli cannot be run or fails.
    pub fn list_contacts(&self) -> Result<Vec<Contact>> {
        tracing::debug!("Fetching contacts list from signal-cli");
        let output = self.run(&["listContacts"])?;
        let contacts: Vec<Contact> = output.lines().filter_map(parse_contact_line).collect();
        tracing::info!("Found {} contacts", contacts.len());
        Ok(contacts)
    }

    /// Clears the conversation with `contact_id`.
    ///
    /// signal-cli has no command that clears a conversation's history
    /// (`removeContact` only drops the contact entry), so a live run changes
    /// nothing and reports the conversation as not cleared.
    ///
    /// # Errors
    /// Always in live mode.
    pub fn clear_conversation(&self, contact_id: &str, dry_run: bool) -> Result<()> {
        if dry_run {
            tracing::info!("[DRY RUN] Would clear conversation with {contact_id}");
            return Ok(());
        }

        tracing::warn!("Direct conversation clearing via signal-cli is not available");
        tracing::info!("Delete the conversation with {contact_id} manually in the Signal app");
        Err(AppError::SignalCli {
            message: format!(
                "{} cannot clear the conversation with {contact_id}; delete it in the Signal app",
                self.binary
            ),
        })
    }

    /// Ids of all groups that list `member` among their members.
    ///
    /// # Errors
    /// Returns error if signal-cli cannot be run or fails.
    pub fn groups_with(&self, member: &str) -> Result<Vec<String>> {
        let output = self.run(&["listGroups", "-d"])?;
        let groups: Vec<String> = output
            .lines()
            .filter_map(parse_group_line)
            .filter(|group| group.members.iter().any(|m| m == member))
            .map(|group| group.id)
            .collect();
        tracing::debug!("{} groups shared with {member}", groups.len());
        Ok(groups)
    }

    /// Leaves each group in `group_ids`, stopping at the first failure.
    ///
    /// # Errors
    /// Returns error if leaving a group fails.
    pub fn leave_groups(&self, group_ids: &[String], dry_run: bool) -> Result<()> {
        if group_ids.is_empty() {
            return Ok(());
        }

        tracing::info!("Leaving {} groups", group_ids.len());
        for group_id in group_ids {
            if dry_run {
                tracing::info!("[DRY RUN] Would leave group: {group_id}");
                continue;
            }
            self.run(&["leaveGroup", "-g", group_id])?;
            tracing::info!("Left group: {group_id}");
        }
        Ok(())
    }
}

/// One group from `listGroups -d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupListing {
    pub id: String,
    pub members: Vec<String>,
}

/// Parses one `Id: <id> Name: <name> ... Members: [a, b] ...` line.
#[must_use]
pub fn parse_group_line(line: &str) -> Option<GroupListing> {
    let rest = line.trim().strip_prefix("Id: ")?;
    let id = rest.split_once(" Name: ").map_or(rest, |(id, _)| id).trim();
    if id.is_empty() {
        return None;
    }

    let members = rest
        .split_once("Members: [")
        .and_then(|(_, tail)| tail.split_once(']'))
        .map(|(list, _)| {
            list.split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Some(GroupListing {
        id: id.to_string(),
        members,
    })
}

/// Parses one `Name (number) [uuid]` line of `listContacts` output.
///
/// The last bracketed group is the uuid and the last parenthesized group the
/// number; whatever precedes them is the name.
#[must_use]
pub fn parse_contact_line(line: &str) -> Option<Contact> {
    let mut rest = line.trim();
    if rest.is_empty() || rest.starts_with('=') {
        return None;
    }

    let mut uuid = None;
    if let (Some(open), Some(close)) = (rest.rfind('['), rest.rfind(']')) {
        if open < close {
            uuid = Some(rest[open + 1..close].to_string());
            rest = rest[..open].trim();
        }
    }

    let mut number = None;
    let mut name = rest;
    if let (Some(open), Some(close)) = (rest.rfind('('), rest.rfind(')')) {
        if open < close {
            number = Some(rest[open + 1..close].to_string());
            name = rest[..open].trim();
        }
    }

    let number = number.filter(|n| !n.is_empty());
    let uuid = uuid.filter(|u| !u.is_empty());
    if name.is_empty() || (number.is_none() && uuid.is_none()) {
        return None;
    }

    Some(Contact {
        name: Some(name.to_string()),
        number,
        uuid,
    })
}
