//! FingersCrossed decorator
//!
//! Buffers records in a bounded circular buffer and forwards nothing
//! until a record reaches the activation level; activation flushes the
//! buffer to the wrapped handler in FIFO order, followed by the
//! triggering record. With latching on, everything after activation is
//! forwarded immediately; with latching off, sub-threshold records go
//! back to buffering.

use crate::core::handler::{Handler, HandlerCore, SharedStream, StreamHandler};
use crate::core::level::Level;
use crate::formatters::Formatter;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::Arc;

const DEFAULT_CAPACITY: usize = 100;

type BufferedEntry = (Level, String, Map<String, Value>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingersCrossedStats {
    pub buffered: usize,
    pub capacity: usize,
    pub activated: bool,
    pub activation_level: Level,
    pub latching: bool,
}

pub struct FingersCrossedHandler {
    core: HandlerCore,
    wrapped: Box<dyn StreamHandler>,
    activation_level: Level,
    capacity: usize,
    latching: bool,
    buffer: VecDeque<BufferedEntry>,
    activated: bool,
}

impl FingersCrossedHandler {
    pub fn new(wrapped: Box<dyn StreamHandler>) -> Self {
        Self {
            core: HandlerCore::new("fingers_crossed", Level::Debug),
            wrapped,
            activation_level: Level::Error,
            capacity: DEFAULT_CAPACITY,
            latching: true,
            buffer: VecDeque::new(),
            activated: false,
        }
    }

    #[must_use]
    pub fn with_activation_level(mut self, level: Level) -> Self {
        self.activation_level = level;
        self
    }

    /// Buffer capacity; values below 1 are raised to 1.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn with_latching(mut self, latching: bool) -> Self {
        self.latching = latching;
        self
    }

    /// Drain the buffer to the wrapped handler without activating.
    pub fn flush_buffer(&mut self) {
        while let Some((level, message, data)) = self.buffer.pop_front() {
            self.wrapped.invoke(level, &message, &data);
        }
    }

    /// Clear the buffer and the activation latch.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.activated = false;
    }

    pub fn statistics(&self) -> FingersCrossedStats {
        FingersCrossedStats {
            buffered: self.buffer.len(),
            capacity: self.capacity,
            activated: self.activated,
            activation_level: self.activation_level,
            latching: self.latching,
        }
    }
}

impl Handler for FingersCrossedHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "fingers_crossed"
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

        if self.activated && self.latching {
            return self.wrapped.invoke(level, message, call_context);
        }

        if level.rank() >= self.activation_level.rank() {
            self.activated = true;
            self.flush_buffer();
            return self.wrapped.invoke(level, message, call_context);
        }

        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer
            .push_back((level, message.to_string(), call_context.clone()));
        None
    }

    fn set_context(&mut self, context: &str) {
        self.core.set_context(context);
        self.wrapped.set_context(context);
    }

    fn set_formatter(&mut self, formatter: Arc<dyn Formatter>) {
        self.wrapped.set_formatter(formatter);
    }

    fn flush(&mut self) -> crate::core::error::Result<()> {
        self.flush_buffer();
        self.wrapped.flush()
    }
}

impl StreamHandler for FingersCrossedHandler {
    fn set_stream(&mut self, stream: SharedStream) {
        self.wrapped.set_stream(stream);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::handler::MemoryStream;
    use crate::handlers::NullHandler;

    fn capture_handler() -> (Box<dyn StreamHandler>, MemoryStream) {
        let capture = MemoryStream::new();
        let mut inner = NullHandler::new(Level::Debug);
        inner.set_context("Svc");
        inner.set_stream(capture.stream());
        (Box::new(inner), capture)
    }

    #[test]
    fn test_buffers_until_activation() {
        let (inner, capture) = capture_handler();
        let mut handler = FingersCrossedHandler::new(inner);

        assert!(handler.invoke(Level::Info, "one", &Map::new()).is_none());
        assert!(handler.invoke(Level::Warning, "two", &Map::new()).is_none());
        assert!(capture.lines().is_empty());
        assert_eq!(handler.statistics().buffered, 2);
    }

    #[test]
    fn test_activation_flushes_fifo_then_trigger() {
        let (inner, capture) = capture_handler();
        let mut handler = FingersCrossedHandler::new(inner);

        handler.invoke(Level::Info, "one", &Map::new());
        handler.invoke(Level::Info, "two", &Map::new());
        let result = handler.invoke(Level::Error, "boom", &Map::new());
        assert!(result.is_some());

        let lines = capture.lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("one"));
        assert!(lines[1].contains("two"));
        assert!(lines[2].contains("boom"));
        assert!(handler.statistics().activated);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let (inner, capture) = capture_handler();
        let mut handler = FingersCrossedHandler::new(inner).with_capacity(3);

        for message in ["i1", "i2", "i3", "i4", "i5"] {
            handler.invoke(Level::Info, message, &Map::new());
        }
        assert_eq!(handler.statistics().buffered, 3);
        handler.invoke(Level::Error, "boom", &Map::new());

        let lines = capture.lines();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("i3"));
        assert!(lines[1].contains("i4"));
        assert!(lines[2].contains("i5"));
        assert!(lines[3].contains("boom"));
    }

    #[test]
    fn test_latching_forwards_after_activation() {
        let (inner, capture) = capture_handler();
        let mut handler = FingersCrossedHandler::new(inner);

        handler.invoke(Level::Error, "boom", &Map::new());
        let result = handler.invoke(Level::Debug, "after", &Map::new());
        assert!(result.is_some());
        assert_eq!(capture.lines().len(), 2);
    }

    #[test]
    fn test_latching_off_rebuffers() {
        let (inner, capture) = capture_handler();
        let mut handler = FingersCrossedHandler::new(inner).with_latching(false);

        handler.invoke(Level::Error, "first", &Map::new());
        assert_eq!(capture.lines().len(), 1);

        // Sub-threshold records buffer again after activation.
        assert!(handler.invoke(Level::Info, "quiet", &Map::new()).is_none());
        assert_eq!(capture.lines().len(), 1);

        handler.invoke(Level::Error, "second", &Map::new());
        let lines = capture.lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("quiet"));
        assert!(lines[2].contains("second"));
    }

    #[test]
    fn test_flush_buffer_without_activation() {
        let (inner, capture) = capture_handler();
        let mut handler = FingersCrossedHandler::new(inner);

        handler.invoke(Level::Info, "pending", &Map::new());
        handler.flush_buffer();

        assert_eq!(capture.lines().len(), 1);
        assert!(!handler.statistics().activated);
    }

    #[test]
    fn test_reset() {
        let (inner, _) = capture_handler();
        let mut handler = FingersCrossedHandler::new(inner);

        handler.invoke(Level::Error, "boom", &Map::new());
        handler.invoke(Level::Info, "buffered?", &Map::new());
        handler.reset();

        let stats = handler.statistics();
        assert!(!stats.activated);
        assert_eq!(stats.buffered, 0);
    }

    #[test]
    fn test_capacity_minimum_is_one() {
        let (inner, _) = capture_handler();
        let handler = FingersCrossedHandler::new(inner).with_capacity(0);
        assert_eq!(handler.statistics().capacity, 1);
    }
}
