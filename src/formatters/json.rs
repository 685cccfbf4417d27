//! JSON formatter

use super::Formatter;
use crate::core::record::Record;

/// The record as a single JSON object; key order follows the record.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &Record) -> String {
        serde_json::to_string(&record.to_json()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::level::Level;
    use serde_json::json;

    #[test]
    fn test_json_format_round_trips() {
        let mut record = Record::new("Billing", Level::Error, "charge failed");
        record.fields.insert("request_id".to_string(), json!("r-7"));
        record.data.insert("amount".to_string(), json!(12.5));

        let parsed: serde_json::Value =
            serde_json::from_str(&JsonFormatter::new().format(&record)).unwrap();
        assert_eq!(parsed["context"], "Billing");
        assert_eq!(parsed["level"], "error");
        assert_eq!(parsed["request_id"], "r-7");
        assert_eq!(parsed["data"]["amount"], 12.5);
    }

    #[test]
    fn test_json_key_order_preserved() {
        let record = Record::new("Svc", Level::Info, "m");
        let out = JsonFormatter::new().format(&record);
        let context_at = out.find("\"context\"").unwrap();
        let level_at = out.find("\"level\"").unwrap();
        let message_at = out.find("\"message\"").unwrap();
        let data_at = out.find("\"data\"").unwrap();
        assert!(context_at < level_at && level_at < message_at && message_at < data_at);
    }
}
