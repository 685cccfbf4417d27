//! Grafana Loki push handler

use super::transport::{validate_url, HttpTransport};
use crate::core::error::Result;
use crate::core::handler::{Handler, HandlerCore, StreamHandler};
use crate::core::level::Level;
use crate::formatters::LokiFormatter;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub struct LokiHandler {
    core: HandlerCore,
    transport: HttpTransport,
    push_url: String,
}

impl LokiHandler {
    pub fn new(
        base_url: &str,
        static_labels: HashMap<String, String>,
        min_level: Level,
    ) -> Result<Self> {
        validate_url("LokiHandler", base_url)?;
        let push_url = format!("{}/loki/api/v1/push", base_url.trim_end_matches('/'));
        let mut core = HandlerCore::new("loki", min_level);
        core.set_formatter(Arc::new(LokiFormatter::new(static_labels)));
        Ok(Self {
            core,
            transport: HttpTransport::json_post()?,
            push_url,
        })
    }

    #[must_use]
    pub fn with_transport(mut self, transport: HttpTransport) -> Self {
        self.transport = transport;
        self
    }

    pub fn push_url(&self) -> &str {
        &self.push_url
    }
}

impl Handler for LokiHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "loki"
    }

    fn invoke(
        &mut self,
        level: Level,
        message: &str,
        call_context: &Map<String, Value>,
    ) -> Option<String> {
        let (_, payload) = self.core.prepare(level, message, call_context)?;

        if self.core.has_stream() {
            return self.core.write_stream(&payload).then_some(payload);
        }

        self.transport
            .send(&self.push_url, &payload)
            .then_some(payload)
    }
}

impl StreamHandler for LokiHandler {}
