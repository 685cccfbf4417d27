//! Generic HTTP webhook handler

use super::transport::{validate_url, HttpTransport};
use crate::core::error::Result;
use crate::core::handler::{Handler, HandlerCore, StreamHandler};
use crate::core::level::Level;
use crate::core::record::Record;
use chrono::Utc;
use serde_json::{json, Map, Value};

/// Builds the request body from the formatted message and the record.
pub type BodyFormatter = Box<dyn Fn(&str, &Record) -> String + Send + Sync>;

pub struct WebhookHandler {
    core: HandlerCore,
    transport: HttpTransport,
    url: String,
    body_formatter: Option<BodyFormatter>,
}

impl WebhookHandler {
    pub fn new(url: &str, min_level: Level) -> Result<Self> {
        validate_url("WebhookHandler", url)?;
        Ok(Self {
            core: HandlerCore::new("webhook", min_level),
            transport: HttpTransport::json_post()?,
            url: url.to_string(),
            body_formatter: None,
        })
    }

    #[must_use]
    pub fn with_transport(mut self, transport: HttpTransport) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the default `{ message, data, timestamp }` body.
    #[must_use]
    pub fn with_body_formatter(mut self, formatter: BodyFormatter) -> Self {
        self.body_formatter = Some(formatter);
        self
    }

    fn body_for(&self, message: &str, record: &Record) -> String {
        match &self.body_formatter {
            Some(formatter) => formatter(message, record),
            None => json!({
                "message": record.message,
                "data": Value::Object(record.data.clone()),
                "timestamp": Utc::now().timestamp(),
            })
            .to_string(),
        }
    }
}

impl Handler for WebhookHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "webhook"
    }

    fn invoke(
        &mut self,
        level: Level,
        message: &str,
        call_context: &Map<String, Value>,
    ) -> Option<String> {
        let (record, payload) = self.core.prepare(level, message, call_context)?;

        if self.core.has_stream() {
            return self.core.write_stream(&payload).then_some(payload);
        }

        let body = self.body_for(&payload, &record);
        self.transport.send(&self.url, &body).then_some(payload)
    }
}

impl StreamHandler for WebhookHandler {}
