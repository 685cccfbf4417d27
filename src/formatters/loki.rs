//! Grafana Loki push-payload formatter
//!
//! Produces the `streams`/`values` body for `POST /loki/api/v1/push`.
//! Label values are sanitized to `[a-zA-Z0-9_]`; this mirrors the
//! behaviour of the system this crate is modelled on, which sanitizes
//! values even though Loki itself only restricts label keys.

use super::Formatter;
use crate::core::record::Record;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

pub struct LokiFormatter {
    static_labels: HashMap<String, String>,
}

impl LokiFormatter {
    pub fn new(static_labels: HashMap<String, String>) -> Self {
        Self { static_labels }
    }

    /// Replace runs of characters outside `[a-zA-Z0-9_]` with a single
    /// `_`, and prefix `_` when the result does not start with
    /// `[a-zA-Z_]`.
    pub fn sanitize_label_value(value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        let mut in_run = false;
        for ch in value.chars() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                out.push(ch);
                in_run = false;
            } else if !in_run {
                out.push('_');
                in_run = true;
            }
        }
        let starts_ok = out
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false);
        if starts_ok {
            out
        } else {
            format!("_{}", out)
        }
    }

    /// Nanosecond timestamp for the stream entry: a `timestamp` root
    /// field is honoured when integral (seconds) or parseable; anything
    /// else falls back to the current wall clock.
    fn nanos_for(record: &Record) -> i64 {
        let source = record
            .fields
            .get("timestamp")
            .or_else(|| record.data.get("timestamp"));
        if let Some(value) = source {
            if let Some(seconds) = value.as_i64() {
                return seconds * 1_000_000_000;
            }
            if let Some(seconds) = value.as_f64() {
                return (seconds * 1e9) as i64;
            }
            if let Some(text) = value.as_str() {
                if let Ok(seconds) = text.parse::<i64>() {
                    return seconds * 1_000_000_000;
                }
                if let Ok(parsed) = text.parse::<DateTime<Utc>>() {
                    return parsed.timestamp_nanos_opt().unwrap_or(0);
                }
            }
        }
        Utc::now().timestamp_nanos_opt().unwrap_or(0)
    }

    fn labels_for(&self, record: &Record) -> Map<String, Value> {
        let mut labels = Map::new();
        for (key, value) in &self.static_labels {
            labels.insert(
                key.clone(),
                Value::String(Self::sanitize_label_value(value)),
            );
        }
        labels.insert(
            "level".to_string(),
            Value::String(Self::sanitize_label_value(record.level.as_str())),
        );
        if !record.context.is_empty() {
            labels.insert(
                "context".to_string(),
                Value::String(Self::sanitize_label_value(&record.context)),
            );
        }
        labels
    }
}

impl Formatter for LokiFormatter {
    fn format(&self, record: &Record) -> String {
        let mut line = record.message.clone();
        if !record.data.is_empty() {
            line.push(' ');
            line.push_str(&serde_json::to_string(&record.data).unwrap_or_default());
        }

        let payload = json!({
            "streams": [{
                "stream": Value::Object(self.labels_for(record)),
                "values": [[Self::nanos_for(record).to_string(), line]],
            }]
        });
        payload.to_string()
    }
}
