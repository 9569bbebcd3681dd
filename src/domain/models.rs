//! Domain models for Signal contacts, messages, and export records.
//!
//! Contacts and messages are read-only projections of what signal-cli and the
//! Signal Desktop store report. The manifest and deletion log entry are the two
//! records this tool writes to disk.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{AppError, Result};

/// Canonical 8-4-4-4-12 UUID text, matched against the lowercased input.
static UUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .unwrap_or_else(|_| unreachable!("static pattern is valid"))
});

/// Manifest format version written to `export_manifest.json`.
pub const MANIFEST_VERSION: &str = "1.0";

/// A Signal contact.
///
/// At least one of `number` and `uuid` is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: Option<String>,
    pub number: Option<String>,
    pub uuid: Option<String>,
}

impl Contact {
    /// Identifier used for lookups: the number if present, else the uuid.
    #[must_use]
    pub fn identifier(&self) -> &str {
        self.number
            .as_deref()
            .or(self.uuid.as_deref())
            .unwrap_or_default()
    }

    /// Directory name for this contact's export, e.g. `alice-smith_15551234567`.
    ///
    /// Always a single path component: separators become hyphens, and a name
    /// that is empty or only dots is replaced by `unknown`.
    #[must_use]
    pub fn directory_slug(&self) -> String {
        let name = slugify(self.name.as_deref().unwrap_or("unknown")).replace(['/', '\\'], "-");
        let name = if name.chars().all(|c| c == '.') {
            "unknown".to_string()
        } else {
            name
        };
        let digits: String = self
            .number
            .as_deref()
            .unwrap_or_default()
            .chars()
            .filter(|c| *c != '+' && *c != '-')
            .collect();

        if digits.is_empty() {
            name
        } else {
            format!("{name}_{digits}")
        }
    }

    /// Token the user must type back to confirm deletion.
    #[must_use]
    pub fn confirmation_token(&self) -> String {
        slugify(self.name.as_deref().unwrap_or("contact"))
    }

    /// Short `Name (number)` label for prompts and logs.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{} ({})",
            self.name.as_deref().unwrap_or("Unknown"),
            self.number
                .as_deref()
                .or(self.uuid.as_deref())
                .unwrap_or("—")
        )
    }

    /// Text the fuzzy search runs against: name and number.
    #[must_use]
    pub fn search_text(&self) -> String {
        format!(
            "{} {}",
            self.name.as_deref().unwrap_or_default(),
            self.number.as_deref().unwrap_or_default()
        )
    }
}

/// Lowercases and hyphenates a display name.
#[must_use]
pub fn slugify(text: &str) -> String {
    text.to_lowercase().replace(' ', "-")
}

/// A classified `--contact` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactQuery {
    Number(String),
    Uuid(String),
}

impl ContactQuery {
    /// Classifies a raw identifier as a phone number or UUID.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the text has neither shape.
    pub fn parse(raw: &str) -> Result<Self> {
        let first = raw
            .chars()
            .next()
            .ok_or_else(|| AppError::invalid_input("Contact identifier is empty"))?;

        if first == '+' || first.is_ascii_digit() {
            return Ok(Self::Number(raw.to_string()));
        }

        if UUID_PATTERN.is_match(&raw.to_lowercase()) {
            return Ok(Self::Uuid(raw.to_string()));
        }

        Err(AppError::invalid_input(format!(
            "Invalid contact format: {raw} (expected a phone number or UUID)"
        )))
    }

    /// Exact match against the corresponding contact field.
    #[must_use]
    pub fn matches(&self, contact: &Contact) -> bool {
        match self {
            Self::Number(n) => contact.number.as_deref() == Some(n.as_str()),
            Self::Uuid(u) => contact.uuid.as_deref() == Some(u.as_str()),
        }
    }
}

/// A single message, kept as the opaque mapping the source produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(pub Map<String, Value>);

impl Message {
    /// Returns a field, treating explicit `null` as absent.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Renders a field as display text; non-string values use their JSON text.
    #[must_use]
    pub fn field_text(&self, key: &str) -> Option<String> {
        self.field(key).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Timestamp if it is a usable sort key (number or string).
    #[must_use]
    pub fn timestamp(&self) -> Option<&Value> {
        self.field("timestamp")
            .filter(|v| v.is_number() || v.is_string())
    }

    /// Number of attachments referenced by this message.
    #[must_use]
    pub fn attachment_count(&self) -> usize {
        self.field("attachments")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

impl From<Map<String, Value>> for Message {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Orders timestamps: numbers numerically, strings lexically, numbers first.
#[must_use]
pub fn compare_timestamps(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(_), _) => Ordering::Less,
        (_, Value::Number(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Md,
    Html,
}

impl ExportFormat {
    /// File name the format is written to inside the export directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Json => "messages.json",
            Self::Md => "messages.md",
            Self::Html => "messages.html",
        }
    }

    /// Parses a comma-separated list such as `json,md`.
    ///
    /// # Errors
    /// Returns `InvalidInput` on the first unknown entry.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>> {
        raw.split(',').map(str::parse).collect()
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "md" => Ok(Self::Md),
            "html" => Ok(Self::Html),
            other => Err(AppError::invalid_input(format!(
                "Invalid format: {other}. Must be one of: json, md, html"
            ))),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Md => write!(f, "md"),
            Self::Html => write!(f, "html"),
        }
    }
}

/// First and last message timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<Value>,
    pub end: Option<Value>,
}

impl DateRange {
    /// Min/max over the messages that carry a usable timestamp.
    #[must_use]
    pub fn from_messages(messages: &[Message]) -> Self {
        let mut stamps: Vec<&Value> = messages.iter().filter_map(Message::timestamp).collect();
        stamps.sort_by(|a, b| compare_timestamps(a, b));

        Self {
            start: stamps.first().map(|v| (*v).clone()),
            end: stamps.last().map(|v| (*v).clone()),
        }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |v: &Option<Value>| match v {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "N/A".to_string(),
        };
        write!(f, "{} to {}", show(&self.start), show(&self.end))
    }
}

/// Summary numbers recorded in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportStatistics {
    pub message_count: usize,
    pub attachment_count: usize,
    pub date_range: DateRange,
}

impl ExportStatistics {
    #[must_use]
    pub fn from_messages(messages: &[Message]) -> Self {
        Self {
            message_count: messages.len(),
            attachment_count: messages.iter().map(Message::attachment_count).sum(),
            date_range: DateRange::from_messages(messages),
        }
    }
}

/// What the user asked the export to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub formats: Vec<ExportFormat>,
    pub include_attachments: bool,
}

/// Completion record of an export. Its presence on disk gates deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportManifest {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub contact: Contact,
    pub statistics: ExportStatistics,
    pub export_config: ExportConfig,
}

impl ExportManifest {
    #[must_use]
    pub fn new(contact: &Contact, messages: &[Message], config: ExportConfig) -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            export_date: Utc::now(),
            contact: contact.clone(),
            statistics: ExportStatistics::from_messages(messages),
            export_config: config,
        }
    }
}

/// One entry of the append-only `deletion_log.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletionLogEntry {
    pub timestamp: DateTime<Utc>,
    pub contact: Contact,
    pub success: bool,
    pub dry_run: bool,
}
