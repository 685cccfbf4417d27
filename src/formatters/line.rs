//! Single-line text formatter (the default)

use super::Formatter;
use crate::core::record::Record;

/// `context.LEVEL: message {"data":…}` on one line.
#[derive(Debug, Clone, Default)]
pub struct LineFormatter;

impl LineFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for LineFormatter {
    fn format(&self, record: &Record) -> String {
        let data = serde_json::to_string(&record.data).unwrap_or_else(|_| "{}".to_string());
        format!(
            "{}.{}: {} {}",
            record.context,
            record.level.as_str().to_uppercase(),
            record.message,
            data
        )
    }
}
