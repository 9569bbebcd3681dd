//! In-memory collaborators for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::domain::{AppError, Contact, Message, Result};

use super::ports::{ConversationEraser, MessageSource, Prompter, Tone};

/// Fake Signal account that records every call.
pub struct FakeAccount {
    pub contacts: Vec<Contact>,
    pub messages: Vec<Message>,
    pub fail_clear: bool,
    pub fetched: RefCell<Vec<String>>,
    pub cleared: RefCell<Vec<(String, bool)>>,
    pub left_groups: RefCell<Vec<(String, bool)>>,
}

impl FakeAccount {
    pub fn new(contacts: Vec<Contact>, messages: Vec<Message>) -> Self {
        Self {
            contacts,
            messages,
            fail_clear: false,
            fetched: RefCell::new(Vec::new()),
            cleared: RefCell::new(Vec::new()),
            left_groups: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_clear(mut self) -> Self {
        self.fail_clear = true;
        self
    }
}

impl MessageSource for FakeAccount {
    fn list_contacts(&self) -> Result<Vec<Contact>> {
        Ok(self.contacts.clone())
    }

    fn fetch_messages(&self, contact_id: &str) -> Vec<Message> {
        self.fetched.borrow_mut().push(contact_id.to_string());
        self.messages.clone()
    }
}

impl ConversationEraser for FakeAccount {
    fn clear_conversation(&self, contact_id: &str, dry_run: bool) -> Result<()> {
        self.cleared
            .borrow_mut()
            .push((contact_id.to_string(), dry_run));
        if self.fail_clear {
            return Err(AppError::SignalCli {
                message: "clear rejected".into(),
            });
        }
        Ok(())
    }

    fn leave_shared_groups(&self, contact_id: &str, dry_run: bool) -> Result<usize> {
        self.left_groups
            .borrow_mut()
            .push((contact_id.to_string(), dry_run));
        Ok(0)
    }
}

/// Prompter fed from a fixed script of answers.
///
/// Running out of answers behaves like closed stdin.
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
    pub output: Vec<String>,
    pub panels: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| (*a).to_string()).collect(),
            asked: Vec::new(),
            output: Vec::new(),
            panels: Vec::new(),
        }
    }

    fn next_answer(&mut self, prompt: &str) -> Result<String> {
        self.asked.push(prompt.to_string());
        self.answers.pop_front().ok_or(AppError::Interrupted)
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str, default: Option<&str>) -> Result<String> {
        let answer = self.next_answer(prompt)?;
        match default {
            Some(d) if answer.is_empty() => Ok(d.to_string()),
            _ => Ok(answer),
        }
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.next_answer(prompt)?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }

    fn show_contacts(&mut self, title: &str, contacts: &[Contact]) {
        self.output
            .push(format!("{title}: {} rows", contacts.len()));
    }

    fn show_panel(&mut self, title: &str, rows: &[(&str, String)]) {
        let body: Vec<String> = rows.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        self.panels.push(format!("{title}\n{}", body.join("\n")));
    }

    fn say(&mut self, _tone: Tone, line: &str) {
        self.output.push(line.to_string());
    }
}
