//! # fanlog
//!
//! Structured, multi-sink application logging. A program constructs one
//! or more named [`Logger`]s; each logger fans every record out to an
//! ordered collection of handlers. Handlers gate by severity, run the
//! record through a pluggable formatter, and deliver to their
//! destination: files, standard streams, the system log, SMTP, HTTP
//! webhooks, Slack, Teams, Grafana Loki, Redis, AMQP and Kafka brokers,
//! relational databases, or the browser console.
//!
//! ## Example
//!
//! ```no_run
//! use fanlog::prelude::*;
//!
//! let mut logger = Logger::new("OrderSvc");
//! logger.add_file("app.log", Level::Debug).unwrap();
//! logger.add_file("errors.log", Level::Error).unwrap();
//!
//! logger.info("service started");
//! logger.error("payment gateway unreachable");
//! ```
//!
//! ## Threading
//!
//! Dispatch is synchronous and takes `&mut self`; hosts that log from
//! several threads wrap the logger in a mutex. Handler state that
//! outlives a dispatch call (the ChromeLogger row batch) carries its
//! own lock.

pub mod core;
pub mod formatters;
pub mod handlers;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        Handler, Level, Logger, MemoryStream, Record, Result, SharedStream, StreamHandler,
    };
    pub use crate::formatters::Formatter;
    pub use crate::handlers::{
        ConditionalHandler, FingersCrossedHandler, SamplingHandler, SamplingStrategy,
    };
}

pub use crate::core::{
    enrichers, interpolate, shared_stream, ErrorHook, FanlogError, Handler, HandlerCore, Level,
    Logger, MemoryStream, Producer, Record, RecordBuilder, Result, SharedStream, StreamHandler,
};
pub use crate::formatters::Formatter;

/// Fresh empty call context, used by the level macros.
pub fn empty_call_context() -> serde_json::Map<String, serde_json::Value> {
    serde_json::Map::new()
}
