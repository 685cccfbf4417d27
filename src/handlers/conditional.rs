//! Conditional decorator
//!
//! Routes each record to the first handler whose predicate matches, in
//! rule order, falling back to an optional default handler. Context,
//! formatter and stream assignments propagate to every contained
//! handler.

use crate::core::handler::{Handler, HandlerCore, SharedStream, StreamHandler};
use crate::core::level::Level;
use crate::formatters::Formatter;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Routing predicate over `(level, message, call_context)`.
pub type Predicate = Box<dyn Fn(Level, &str, &Map<String, Value>) -> bool + Send + Sync>;

pub struct ConditionalHandler {
    core: HandlerCore,
    routes: Vec<(Predicate, Box<dyn StreamHandler>)>,
    fallback: Option<Box<dyn StreamHandler>>,
}

impl ConditionalHandler {
    pub fn new() -> Self {
        Self {
            core: HandlerCore::new("conditional", Level::Debug),
            routes: Vec::new(),
            fallback: None,
        }
    }

    /// Append a routing rule; rules are evaluated in insertion order.
    #[must_use]
    pub fn route(mut self, predicate: Predicate, handler: Box<dyn StreamHandler>) -> Self {
        self.routes.push((predicate, handler));
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, handler: Box<dyn StreamHandler>) -> Self {
        self.fallback = Some(handler);
        self
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    fn contained_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn StreamHandler>> + '_ {
        self.routes
            .iter_mut()
            .map(|(_, handler)| handler)
            .chain(self.fallback.iter_mut())
    }
}

impl Default for ConditionalHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for ConditionalHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "conditional"
    }

    fn invoke(
        &mut self,
        level: Level,
        message: &str,
        call_context: &Map<String, Value>,
    ) -> Option<String> {
        if !self.core.is_responsible(level) {
            return None;
        }

        for (predicate, handler) in &mut self.routes {
            if predicate(level, message, call_context) {
                return handler.invoke(level, message, call_context);
            }
        }
        match &mut self.fallback {
            Some(handler) => handler.invoke(level, message, call_context),
            None => None,
        }
    }

    fn set_context(&mut self, context: &str) {
        self.core.set_context(context);
        for handler in self.contained_mut() {
            handler.set_context(context);
        }
    }

    fn set_formatter(&mut self, formatter: Arc<dyn Formatter>) {
        for handler in self.contained_mut() {
            handler.set_formatter(Arc::clone(&formatter));
        }
    }

    fn flush(&mut self) -> crate::core::error::Result<()> {
        for handler in self.contained_mut() {
            handler.flush()?;
        }
        Ok(())
    }
}

impl StreamHandler for ConditionalHandler {
    fn set_stream(&mut self, stream: SharedStream) {
        for handler in self.contained_mut() {
            handler.set_stream(Arc::clone(&stream));
        }
    }
}
