//! `SQLite` reader for Signal Desktop's message database.
//!
//! Rows of the `messages` table are turned into opaque [`Message`] maps.

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use serde_json::{Map, Number, Value};

use crate::domain::{expand_home, AppError, Message, Result};

const MESSAGES_QUERY: &str =
    "SELECT * FROM messages WHERE conversationId = ?1 ORDER BY sent_at ASC";

/// Read-only view of a Signal Desktop database.
pub struct SignalDesktopStore {
    conn: Connection,
}

impl SignalDesktopStore {
    /// Opens the first of `candidates` that exists.
    ///
    /// # Errors
    /// Returns error if none exists or the database cannot be opened.
    pub fn open_first(candidates: &[PathBuf]) -> Result<Self> {
        let path = candidates
            .iter()
            .map(|p| expand_home(p))
            .find(|p| p.exists())
            .ok_or_else(|| AppError::Database {
                message: "Signal Desktop database not found".to_string(),
                source: None,
            })?;

        tracing::debug!(path = %path.display(), "Opening Signal Desktop database");
        Self::open(&path)
    }

    /// Opens a database in read-only mode.
    ///
    /// # Errors
    /// Returns error if database cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(path, flags).map_err(AppError::database)?;

        conn.execute_batch(
            "PRAGMA query_only = ON;
             PRAGMA temp_store = MEMORY;",
        )
        .map_err(AppError::database)?;

        Ok(Self { conn })
    }

    /// All messages of one conversation, oldest first.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub fn messages_for(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let mut stmt = self
            .conn
            .prepare(MESSAGES_QUERY)
            .map_err(AppError::database)?;

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let rows = stmt
            .query_map([conversation_id], |row| Ok(row_to_message(row, &columns)))
            .map_err(AppError::database)?;

        let mut messages = Vec::new();
        for row in rows {
            match row {
                Ok(message) => messages.push(message),
                Err(e) => {
                    tracing::warn!("Failed to read row: {}", e);
                }
            }
        }

        tracing::debug!(
            "Fetched {} messages for conversation '{}'",
            messages.len(),
            conversation_id
        );

        Ok(messages)
    }
}

fn row_to_message(row: &Row<'_>, columns: &[String]) -> Message {
    let mut fields = Map::new();
    for (idx, name) in columns.iter().enumerate() {
        let value = row.get_ref(idx).map_or(Value::Null, column_value);
        fields.insert(name.clone(), value);
    }

    // Keys from the embedded json blob never override real columns.
    let embedded = match fields.get("json") {
        Some(Value::String(raw)) => serde_json::from_str::<Value>(raw).ok(),
        _ => None,
    };
    if let Some(Value::Object(extra)) = embedded {
        for (key, value) in extra {
            fields.entry(key).or_insert(value);
        }
    }

    fill_missing(&mut fields, "timestamp", "sent_at");
    fill_missing(&mut fields, "sender", "source");

    Message(fields)
}

fn column_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(t) | ValueRef::Blob(t) => {
            Value::String(String::from_utf8_lossy(t).into_owned())
        }
    }
}

fn fill_missing(fields: &mut Map<String, Value>, key: &str, from: &str) {
    if !fields.get(key).is_some_and(|v| !v.is_null()) {
        if let Some(value) = fields.get(from).filter(|v| !v.is_null()).cloned() {
            fields.insert(key.to_string(), value);
        }
    }
}
