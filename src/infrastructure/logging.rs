//! Tracing setup.
//!
//! Human-readable output goes to the terminal (warnings and errors on stderr).
//! With a log file, every event is also appended to it as one JSON object per
//! line: `{timestamp, level, message, data?}`.

use std::fmt::Debug;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::layer::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

use crate::domain::{AppError, Result};

/// Logging options taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    pub verbosity: u8,
    pub log_file: Option<PathBuf>,
}

impl LogSettings {
    fn default_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Installs the global subscriber. Call once, before anything logs.
///
/// # Errors
/// Returns error if the log file cannot be opened.
pub fn init(settings: &LogSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.default_filter()));

    let file_layer = settings
        .log_file
        .as_deref()
        .map(JsonFileLayer::open)
        .transpose()?;

    let terminal = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr.with_max_level(Level::WARN).or_else(std::io::stdout));

    tracing_subscriber::registry()
        .with(filter)
        .with(terminal)
        .with(file_layer)
        .init();

    Ok(())
}

/// Appends events to a file as JSON lines.
pub struct JsonFileLayer {
    file: Mutex<File>,
}

impl JsonFileLayer {
    /// Opens `path` for appending, creating parent directories.
    ///
    /// # Errors
    /// Returns error if the directory or file cannot be created.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create log directory", e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| AppError::io(format!("Failed to open log file: {}", path.display()), e))?;

        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: Subscriber> Layer<S> for JsonFileLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let record = json_record(
            *event.metadata().level(),
            &fields.message,
            fields.data,
            &Utc::now().to_rfc3339(),
        );

        if let Ok(mut file) = self.file.lock() {
            // Nowhere left to report a failing log write.
            let _ = writeln!(file, "{record}");
        }
    }
}

/// Level names as they appear in the log file.
#[must_use]
pub fn level_name(level: Level) -> &'static str {
    match level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARNING",
        _ => "ERROR",
    }
}

fn json_record(level: Level, message: &str, data: Map<String, Value>, timestamp: &str) -> Value {
    let mut record = json!({
        "timestamp": timestamp,
        "level": level_name(level),
        "message": message,
    });
    if !data.is_empty() {
        record["data"] = Value::Object(data);
    }
    record
}

#[derive(Default)]
struct FieldCollector {
    message: String,
    data: Map<String, Value>,
}

impl Visit for FieldCollector {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.data.insert(field.name().to_string(), json!(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.data.insert(field.name().to_string(), json!(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.data.insert(field.name().to_string(), json!(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.data.insert(field.name().to_string(), json!(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.data.insert(field.name().to_string(), json!(value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        let text = format!("{value:?}");
        if field.name() == "message" {
            self.message = text;
        } else {
            self.data.insert(field.name().to_string(), Value::String(text));
        }
    }
}
