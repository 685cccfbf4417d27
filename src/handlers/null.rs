//! Null handler: gates and formats, delivers nowhere
//!
//! Useful as a wrapped sink in decorator tests and as a benchmark
//! target.

use crate::core::handler::{Handler, HandlerCore, StreamHandler};
use crate::core::level::Level;
use serde_json::{Map, Value};

pub struct NullHandler {
    core: HandlerCore,
}

impl NullHandler {
    pub fn new(min_level: Level) -> Self {
        Self {
            core: HandlerCore::new("null", min_level),
        }
    }
}

impl Handler for NullHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "null"
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
        Some(payload)
    }
}

impl StreamHandler for NullHandler {}
