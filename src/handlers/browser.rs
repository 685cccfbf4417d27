//! Browser-console handler
//!
//! Accumulates ChromeLogger rows across a request and, at shutdown,
//! exposes the batch as an `X-ChromeLogger-Data` header value, provided
//! response headers have not been committed yet. Accumulation beyond
//! the in-memory cap rolls the current batch into an overflow list and
//! starts a new one.

use crate::core::handler::{Handler, HandlerCore, StreamHandler};
use crate::core::level::Level;
use crate::formatters::ChromeLoggerFormatter;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{Map, Value};
use std::sync::Arc;

pub const CHROME_LOGGER_HEADER: &str = "X-ChromeLogger-Data";
const MAX_PAYLOAD_BYTES: usize = 240_000;

pub struct BrowserConsoleHandler {
    core: HandlerCore,
    rows: Arc<ChromeLoggerFormatter>,
    headers_committed: bool,
    overflow: Vec<String>,
}

impl BrowserConsoleHandler {
    pub fn new(min_level: Level) -> Self {
        let rows = Arc::new(ChromeLoggerFormatter::new());
        let mut core = HandlerCore::new("browser_console", min_level);
        core.set_formatter(Arc::clone(&rows) as Arc<dyn crate::formatters::Formatter>);
        Self {
            core,
            rows,
            headers_committed: false,
            overflow: Vec::new(),
        }
    }

    /// Tell the handler the host has flushed response headers; from then
    /// on `header()` yields nothing.
    pub fn set_headers_committed(&mut self, committed: bool) {
        self.headers_committed = committed;
    }

    /// The response header to emit for the accumulated batch, or `None`
    /// when headers are already committed or nothing was logged.
    pub fn header(&self) -> Option<(&'static str, String)> {
        if self.headers_committed || self.rows.row_count() == 0 {
            return None;
        }
        Some((CHROME_LOGGER_HEADER, BASE64.encode(self.rows.batch())))
    }

    /// Batches rolled over by the payload cap, oldest first.
    pub fn take_overflow(&mut self) -> Vec<String> {
        std::mem::take(&mut self.overflow)
    }

    pub fn row_count(&self) -> usize {
        self.rows.row_count()
    }

    pub fn reset(&mut self) {
        self.rows.reset();
        self.overflow.clear();
    }
}

impl Handler for BrowserConsoleHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "browser_console"
    }

    fn invoke(
        &mut self,
        level: Level,
        message: &str,
        call_context: &Map<String, Value>,
    ) -> Option<String> {
        let (_, payload) = self.core.prepare(level, message, call_context)?;

        if self.rows.byte_size() > MAX_PAYLOAD_BYTES {
            self.overflow.push(self.rows.take_batch());
        }

        if self.core.has_stream() {
            return self.core.write_stream(&payload).then_some(payload);
        }
        Some(payload)
    }
}

impl StreamHandler for BrowserConsoleHandler {}
