//! Console and error-stream handlers
//!
//! Bound to the process's standard streams, which are borrowed and never
//! closed. The console handler colourizes the level tag; colour is
//! skipped entirely when a stream override is set.

use crate::core::handler::{Handler, HandlerCore, StreamHandler};
use crate::core::level::Level;
use colored::Colorize;
use serde_json::{Map, Value};
use std::io::Write;

pub struct ConsoleHandler {
    core: HandlerCore,
    use_colors: bool,
}

impl ConsoleHandler {
    pub fn new(min_level: Level) -> Self {
        Self {
            core: HandlerCore::new("console", min_level),
            use_colors: true,
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
}

impl Handler for ConsoleHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "console"
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

        let line = if self.use_colors {
            let tag = format!("[{}]", record.level.as_str())
                .color(record.level.color_code())
                .to_string();
            format!("{} {}", tag, payload)
        } else {
            format!("[{}] {}", record.level.as_str(), payload)
        };
        println!("{}", line);
        Some(payload)
    }

    fn flush(&mut self) -> crate::core::error::Result<()> {
        std::io::stdout().flush()?;
        Ok(())
    }
}

impl StreamHandler for ConsoleHandler {}

pub struct ErrorStreamHandler {
    core: HandlerCore,
}

impl ErrorStreamHandler {
    pub fn new(min_level: Level) -> Self {
        Self {
            core: HandlerCore::new("error_stream", min_level),
        }
    }
}

impl Handler for ErrorStreamHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "error_stream"
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

        eprintln!("{}", payload);
        Some(payload)
    }

    fn flush(&mut self) -> crate::core::error::Result<()> {
        std::io::stderr().flush()?;
        Ok(())
    }
}

impl StreamHandler for ErrorStreamHandler {}
