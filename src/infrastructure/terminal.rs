//! Interactive terminal prompter.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::application::{Prompter, Tone};
use crate::domain::{AppError, Contact, Result};

const MISSING: &str = "—";

/// Prompter reading answers line by line from `input`.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter bound to the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    // Terminal write failures are not actionable here.
    fn emit(&mut self, text: impl Display) {
        let _ = writeln!(self.output, "{text}");
    }

    fn read_answer(&mut self, prompt: &str) -> Result<String> {
        let _ = write!(self.output, "{prompt}: ");
        let _ = self.output.flush();

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| AppError::io("Failed to read from terminal", e))?;
        if read == 0 {
            return Err(AppError::Interrupted);
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn ask(&mut self, prompt: &str, default: Option<&str>) -> Result<String> {
        let shown = match default {
            Some(d) if !d.is_empty() => format!("{} ({d})", prompt.bold()),
            _ => prompt.bold().to_string(),
        };
        let answer = self.read_answer(&shown)?;
        match default {
            Some(d) if answer.is_empty() => Ok(d.to_string()),
            _ => Ok(answer),
        }
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let shown = format!("{} [y/n]", prompt.bold());
        loop {
            match self.read_answer(&shown)?.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.emit("Please answer y or n".yellow()),
            }
        }
    }

    fn show_contacts(&mut self, title: &str, contacts: &[Contact]) {
        self.emit(title.bold().cyan());
        self.emit(contacts_table(contacts));
    }

    fn show_panel(&mut self, title: &str, rows: &[(&str, String)]) {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![title.to_string()]);
        for (key, value) in rows {
            table.add_row(vec![format!("{key}: {value}")]);
        }
        self.emit("");
        self.emit(table);
    }

    fn say(&mut self, tone: Tone, line: &str) {
        match tone {
            Tone::Plain => self.emit(line),
            Tone::Heading => {
                self.emit("");
                self.emit(line.bold().cyan());
            }
            Tone::Success => self.emit(line.green()),
            Tone::Warning => self.emit(line.yellow()),
            Tone::Failure => self.emit(line.red().bold()),
        }
    }
}

/// Numbered contact listing.
#[must_use]
pub fn contacts_table(contacts: &[Contact]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Name", "Number", "UUID"]);

    for (i, contact) in contacts.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            contact.name.clone().unwrap_or_else(|| MISSING.to_string()),
            contact.number.clone().unwrap_or_else(|| MISSING.to_string()),
            contact
                .uuid
                .as_deref()
                .map_or_else(|| MISSING.to_string(), shorten_uuid),
        ]);
    }

    table.to_string()
}

/// Keeps the first and last 8 characters of identifiers longer than 16.
#[must_use]
pub fn shorten_uuid(uuid: &str) -> String {
    let chars: Vec<char> = uuid.chars().collect();
    if chars.len() <= 16 {
        return uuid.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 8..].iter().collect();
    format!("{head}...{tail}")
}
