//! Multi-line indented formatter for consoles

use super::Formatter;
use crate::core::record::{value_to_display, Record};

/// Readable multi-line layout: headline first, then indented root fields
/// and data entries.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter;

impl HumanFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for HumanFormatter {
    fn format(&self, record: &Record) -> String {
        let mut out = format!(
            "[{}] {} - {}",
            record.level.as_str().to_uppercase(),
            record.context,
            record.message
        );
        for (key, value) in &record.fields {
            out.push_str(&format!("\n  {}: {}", key, value_to_display(value)));
        }
        if !record.data.is_empty() {
            out.push_str("\n  data:");
            for (key, value) in &record.data {
                out.push_str(&format!("\n    {}: {}", key, value_to_display(value)));
            }
        }
        out
    }
}
