//! Microsoft Teams webhook handler

use super::transport::{validate_url, HttpTransport};
use crate::core::error::Result;
use crate::core::handler::{Handler, HandlerCore, StreamHandler};
use crate::core::level::Level;
use crate::formatters::TeamsFormatter;
use serde_json::{Map, Value};
use std::sync::Arc;

pub struct TeamsHandler {
    core: HandlerCore,
    transport: HttpTransport,
    webhook_url: String,
}

impl TeamsHandler {
    pub fn new(webhook_url: &str, min_level: Level) -> Result<Self> {
        validate_url("TeamsHandler", webhook_url)?;
        let mut core = HandlerCore::new("teams", min_level);
        core.set_formatter(Arc::new(TeamsFormatter::new()));
        Ok(Self {
            core,
            transport: HttpTransport::json_post()?,
            webhook_url: webhook_url.to_string(),
        })
    }

    #[must_use]
    pub fn with_transport(mut self, transport: HttpTransport) -> Self {
        self.transport = transport;
        self
    }
}

impl Handler for TeamsHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "teams"
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
            .send(&self.webhook_url, &payload)
            .then_some(payload)
    }
}

impl StreamHandler for TeamsHandler {}
