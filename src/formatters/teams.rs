//! Microsoft Teams MessageCard formatter

use super::Formatter;
use crate::core::level::Level;
use crate::core::record::Record;
use serde_json::{json, Value};

const MAX_FACTS_FROM_DATA: usize = 5;
const MAX_FACT_VALUE_LEN: usize = 100;

fn theme_color_for(level: Level) -> &'static str {
    match level {
        Level::Emergency | Level::Alert | Level::Critical => "FF0000",
        Level::Error => "DC3545",
        Level::Warning => "FFC107",
        Level::Notice => "17A2B8",
        Level::Info => "007BFF",
        Level::Debug => "6C757D",
    }
}

fn title_for(level: Level) -> String {
    let emoji = match level {
        Level::Emergency | Level::Alert | Level::Critical => "\u{1F6A8}",
        Level::Error => "\u{274C}",
        Level::Warning => "\u{26A0}\u{FE0F}",
        Level::Notice => "\u{1F4E3}",
        Level::Info => "\u{2139}\u{FE0F}",
        Level::Debug => "\u{1F41B}",
    };
    format!("{} {}", emoji, level.as_str().to_uppercase())
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn fact_value(value: &Value) -> String {
    let rendered = match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    };
    if rendered.chars().count() > MAX_FACT_VALUE_LEN {
        let truncated: String = rendered.chars().take(MAX_FACT_VALUE_LEN - 3).collect();
        format!("{}...", truncated)
    } else {
        rendered
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeamsFormatter;

impl TeamsFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for TeamsFormatter {
    fn format(&self, record: &Record) -> String {
        let summary: String = record.message.chars().take(80).collect();

        let mut facts = vec![json!({
            "name": "Level",
            "value": record.level.as_str(),
        })];
        if !record.context.is_empty() {
            facts.push(json!({"name": "Context", "value": record.context}));
        }
        if let Some(ts) = record.fields.get("timestamp") {
            facts.push(json!({"name": "Timestamp", "value": fact_value(ts)}));
        }

        for (key, value) in record.data.iter().take(MAX_FACTS_FROM_DATA) {
            facts.push(json!({
                "name": capitalize(key),
                "value": fact_value(value),
            }));
        }
        if record.data.len() > MAX_FACTS_FROM_DATA {
            facts.push(json!({
                "name": "Additional Fields",
                "value": format!("+{} more...", record.data.len() - MAX_FACTS_FROM_DATA),
            }));
        }

        let mut section = json!({
            "activityTitle": record.message,
            "facts": facts,
        });
        if !record.context.is_empty() {
            section["activitySubtitle"] = json!(format!("Context: {}", record.context));
        }

        json!({
            "@type": "MessageCard",
            "@context": "http://schema.org/extensions",
            "summary": summary,
            "themeColor": theme_color_for(record.level),
            "title": title_for(record.level),
            "sections": [section],
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_card_shape() {
        let mut record = Record::new("Payments", Level::Error, "charge declined");
        record.data.insert("order".to_string(), json!(991));

        let parsed: Value = serde_json::from_str(&TeamsFormatter::new().format(&record)).unwrap();
        assert_eq!(parsed["@type"], "MessageCard");
        assert_eq!(parsed["summary"], "charge declined");
        assert_eq!(parsed["themeColor"], "DC3545");
        assert!(parsed["title"].as_str().unwrap().contains("ERROR"));

        let section = &parsed["sections"][0];
        assert_eq!(section["activityTitle"], "charge declined");
        assert_eq!(section["activitySubtitle"], "Context: Payments");
        let facts = section["facts"].as_array().unwrap();
        assert_eq!(facts[0]["name"], "Level");
        assert_eq!(facts[1]["name"], "Context");
        assert_eq!(facts[2]["name"], "Order");
        assert_eq!(facts[2]["value"], "991");
    }

    #[test]
    fn test_summary_truncated_to_80() {
        let long = "x".repeat(200);
        let record = Record::new("", Level::Info, long);
        let parsed: Value = serde_json::from_str(&TeamsFormatter::new().format(&record)).unwrap();
        assert_eq!(parsed["summary"].as_str().unwrap().chars().count(), 80);
    }

    #[test]
    fn test_data_facts_capped_at_five() {
        let mut record = Record::new("", Level::Info, "m");
        for i in 0..8 {
            record.data.insert(format!("key{}", i), json!(i));
        }
        let parsed: Value = serde_json::from_str(&TeamsFormatter::new().format(&record)).unwrap();
        let facts = parsed["sections"][0]["facts"].as_array().unwrap();
        // Level + 5 data entries + overflow marker.
        assert_eq!(facts.len(), 7);
        let last = facts.last().unwrap();
        assert_eq!(last["name"], "Additional Fields");
        assert_eq!(last["value"], "+3 more...");
    }

    #[test]
    fn test_long_values_truncated() {
        let mut record = Record::new("", Level::Info, "m");
        record.data.insert("blob".to_string(), json!("v".repeat(150)));
        let parsed: Value = serde_json::from_str(&TeamsFormatter::new().format(&record)).unwrap();
        let value = parsed["sections"][0]["facts"][1]["value"].as_str().unwrap();
        assert_eq!(value.chars().count(), 100);
        assert!(value.ends_with("..."));
    }

    #[test]
    fn test_scalar_rendering() {
        assert_eq!(fact_value(&json!(true)), "true");
        assert_eq!(fact_value(&Value::Null), "null");
        assert_eq!(fact_value(&json!({"a": 1})), "{\"a\":1}");
        assert_eq!(fact_value(&json!([1, 2])), "[1,2]");
    }
}
