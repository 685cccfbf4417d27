//! Finished log record and the message interpolation language
//!
//! A record is an ordered map with three mandatory keys (`context`,
//! `level`, `message`), user-registered root fields, and a `data` sub-map
//! holding call-site context plus registered extras.

use super::level::Level;
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub struct Record {
    pub context: String,
    pub level: Level,
    pub message: String,
    /// Root fields registered via `add_field`, in registration order.
    pub fields: Map<String, Value>,
    /// Call-site context merged with registered extras.
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(context: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            level,
            message: message.into(),
            fields: Map::new(),
            data: Map::new(),
        }
    }

    /// Wire shape: `{ context, level, message, <root fields…>, data }`.
    /// Key order is preserved.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("context".to_string(), Value::String(self.context.clone()));
        obj.insert(
            "level".to_string(),
            Value::String(self.level.as_str().to_string()),
        );
        obj.insert("message".to_string(), Value::String(self.message.clone()));
        for (key, value) in &self.fields {
            obj.insert(key.clone(), value.clone());
        }
        obj.insert("data".to_string(), Value::Object(self.data.clone()));
        Value::Object(obj)
    }
}

/// Render a value for placeholder substitution: scalars in their string
/// form, maps and lists as compact JSON.
pub fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

/// Interpolate `{identifier}` placeholders from the lookup map.
///
/// Unknown placeholders are preserved literally, unmatched braces pass
/// through verbatim, and substitution is single-pass: substituted text is
/// never rescanned.
pub fn interpolate(template: &str, lookup: &Map<String, Value>) -> String {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'{' {
            // Scan for a well-formed identifier terminated by '}'.
            let mut j = i + 1;
            while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
                j += 1;
            }
            if j > i + 1 && j < bytes.len() && bytes[j] == b'}' {
                let name = &template[i + 1..j];
                if let Some(value) = lookup.get(name) {
                    out.push_str(&value_to_display(value));
                } else {
                    out.push_str(&template[i..=j]);
                }
                i = j + 1;
                continue;
            }
        }
        let ch = template[i..].chars().next().unwrap_or('\u{FFFD}');
        out.push(ch);
        i += ch.len_utf8();
    }

    out
}
