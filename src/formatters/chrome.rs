//! ChromeLogger batch formatter
//!
//! Accumulates console rows across records; the browser-console handler
//! later base64-encodes the batch into the `X-ChromeLogger-Data`
//! response header. Row state is locked independently of the owning
//! handler so concurrent invocation stays safe.

use super::Formatter;
use crate::core::level::Level;
use crate::core::record::Record;
use parking_lot::Mutex;
use serde_json::{json, Value};

const PROTOCOL_VERSION: &str = "4.1.0";

fn console_type_for(level: Level) -> &'static str {
    match level {
        Level::Error | Level::Critical | Level::Alert | Level::Emergency => "error",
        Level::Warning => "warn",
        Level::Info | Level::Notice => "info",
        Level::Debug => "log",
    }
}

#[derive(Default)]
pub struct ChromeLoggerFormatter {
    rows: Mutex<Vec<Value>>,
}

impl ChromeLoggerFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    fn row_for(record: &Record) -> Value {
        let mut parts = vec![json!(record.context), json!(record.message)];
        if !record.data.is_empty() {
            parts.push(Value::Object(record.data.clone()));
        }

        let backtrace = match (record.data.get("file"), record.data.get("line")) {
            (Some(file), Some(line)) => {
                format!(
                    "{}:{}",
                    file.as_str().unwrap_or("unknown"),
                    line
                )
            }
            _ => "unknown".to_string(),
        };

        json!([parts, backtrace, console_type_for(record.level)])
    }

    /// The accumulated batch payload.
    pub fn batch(&self) -> String {
        let rows = self.rows.lock();
        json!({
            "version": PROTOCOL_VERSION,
            "columns": ["log", "backtrace", "type"],
            "rows": *rows,
        })
        .to_string()
    }

    /// Serialized size of the current batch in bytes.
    pub fn byte_size(&self) -> usize {
        self.batch().len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn rows(&self) -> Vec<Value> {
        self.rows.lock().clone()
    }

    /// Drain the current batch, returning its payload. Used when the
    /// in-memory cap rolls the batch over.
    pub fn take_batch(&self) -> String {
        let payload = self.batch();
        self.rows.lock().clear();
        payload
    }

    pub fn reset(&self) {
        self.rows.lock().clear();
    }
}

impl Formatter for ChromeLoggerFormatter {
    fn format(&self, record: &Record) -> String {
        let row = Self::row_for(record);
        let rendered = row.to_string();
        self.rows.lock().push(row);
        rendered
    }
}
