//! Slack incoming-webhook formatter

use super::Formatter;
use crate::core::level::Level;
use crate::core::record::Record;
use chrono::Utc;
use serde_json::{json, Value};

fn emoji_for(level: Level) -> &'static str {
    match level {
        Level::Emergency | Level::Alert | Level::Critical => "rotating_light",
        Level::Error => "x",
        Level::Warning => "warning",
        Level::Notice => "speech_balloon",
        Level::Info => "information_source",
        Level::Debug => "bug",
    }
}

fn color_for(level: Level) -> &'static str {
    match level {
        Level::Emergency | Level::Alert | Level::Critical => "danger",
        Level::Error => "#ff0000",
        Level::Warning => "warning",
        Level::Notice | Level::Info => "#2196F3",
        Level::Debug => "#607D8B",
    }
}

#[derive(Debug, Clone, Default)]
pub struct SlackFormatter;

impl SlackFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for SlackFormatter {
    fn format(&self, record: &Record) -> String {
        let mut payload = json!({
            "text": format!(":{}: {}", emoji_for(record.level), record.message),
        });

        if !record.context.is_empty() || !record.data.is_empty() {
            let mut fields = Vec::new();
            if !record.context.is_empty() {
                fields.push(json!({
                    "title": "Context",
                    "value": record.context,
                    "short": true,
                }));
            }
            fields.push(json!({
                "title": "Level",
                "value": record.level.as_str(),
                "short": true,
            }));
            if !record.data.is_empty() {
                let data = serde_json::to_string_pretty(&record.data).unwrap_or_default();
                fields.push(json!({
                    "title": "Data",
                    "value": format!("```{}```", data),
                    "short": false,
                }));
            }

            payload["attachments"] = json!([{
                "color": color_for(record.level),
                "fields": fields,
                "footer": "fanlog",
                "ts": Utc::now().timestamp(),
            }]);
        }

        payload.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_only_when_bare() {
        let record = Record::new("", Level::Info, "hello");
        let parsed: Value = serde_json::from_str(&SlackFormatter::new().format(&record)).unwrap();
        assert_eq!(parsed["text"], ":information_source: hello");
        assert!(parsed.get("attachments").is_none());
    }

    #[test]
    fn test_attachment_with_context_and_data() {
        let mut record = Record::new("Billing", Level::Critical, "charge failed");
        record.data.insert("order".to_string(), json!(17));

        let parsed: Value = serde_json::from_str(&SlackFormatter::new().format(&record)).unwrap();
        assert_eq!(parsed["text"], ":rotating_light: charge failed");

        let attachment = &parsed["attachments"][0];
        assert_eq!(attachment["color"], "danger");
        assert_eq!(attachment["fields"][0]["title"], "Context");
        assert_eq!(attachment["fields"][0]["value"], "Billing");
        assert_eq!(attachment["fields"][1]["title"], "Level");
        assert_eq!(attachment["fields"][1]["value"], "critical");
        let data_value = attachment["fields"][2]["value"].as_str().unwrap();
        assert!(data_value.starts_with("```") && data_value.ends_with("```"));
        assert!(data_value.contains("\"order\": 17"));
        assert!(attachment["ts"].is_i64());
    }

    #[test]
    fn test_level_tables() {
        assert_eq!(emoji_for(Level::Error), "x");
        assert_eq!(color_for(Level::Error), "#ff0000");
        assert_eq!(emoji_for(Level::Warning), "warning");
        assert_eq!(color_for(Level::Debug), "#607D8B");
        assert_eq!(emoji_for(Level::Alert), "rotating_light");
    }
}
