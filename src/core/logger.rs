//! Named logger: handler registry and dispatch loop
//!
//! A logger holds a context string, an insertion-ordered registry of
//! handlers keyed by identity with a secondary name index, and an
//! optional error hook. Dispatch fans every record out to all handlers
//! in registration order; a failing handler never prevents delivery to
//! the remaining handlers.

use super::error::{FanlogError, Result};
use super::handler::Handler;
use super::level::Level;
use crate::handlers::{
    AmqpChannel, AmqpHandler, BrowserConsoleHandler, ConsoleHandler, DatabaseHandler,
    EmailConfig, EmailHandler, ErrorStreamHandler, FileHandler, KafkaHandler, KafkaProducer,
    LokiHandler, NullHandler, RedisConnection, RedisKvHandler, RedisPubSubHandler, SlackHandler,
    SqlConnection, SyslogHandler, TeamsHandler, WebhookHandler,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

/// Observer for handler failures escaping a dispatch. Must not panic; a
/// panicking hook is ignored.
pub type ErrorHook =
    Box<dyn Fn(&FanlogError, &str, Level, &str, &Map<String, Value>) + Send + Sync>;

pub struct Logger {
    context: String,
    handlers: Vec<Box<dyn Handler>>,
    names: HashMap<String, String>,
    error_hook: Option<ErrorHook>,
}

impl Logger {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            handlers: Vec::new(),
            names: HashMap::new(),
            error_hook: None,
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Install the error hook invoked with
    /// `(error, handler_id, level, message, call_context)` whenever a
    /// handler panics during dispatch.
    pub fn on_error(&mut self, hook: ErrorHook) {
        self.error_hook = Some(hook);
    }

    /// Register a handler. The logger's context is assigned to the
    /// handler, and a pre-set handler name is indexed. Registering an
    /// identity that is already present is a no-op.
    ///
    /// Returns the handler's identity.
    pub fn add_handler(&mut self, mut handler: Box<dyn Handler>) -> String {
        let id = handler.handler_id();
        if self.handlers.iter().any(|h| h.handler_id() == id) {
            return id;
        }
        handler.set_context(&self.context);
        if let Some(name) = handler.handler_name() {
            self.names.insert(name, id.clone());
        }
        self.handlers.push(handler);
        id
    }

    /// Register a handler under a name in one step.
    pub fn add_named_handler(&mut self, name: &str, mut handler: Box<dyn Handler>) -> String {
        handler.set_handler_name(name);
        self.add_handler(handler)
    }

    pub fn get_handler(&self, name: &str) -> Option<&dyn Handler> {
        let id = self.names.get(name)?;
        self.handlers
            .iter()
            .find(|h| h.handler_id() == *id)
            .map(|h| h.as_ref())
    }

    pub fn get_handler_mut(&mut self, name: &str) -> Option<&mut Box<dyn Handler>> {
        let id = self.names.get(name)?.clone();
        self.handlers.iter_mut().find(|h| h.handler_id() == id)
    }

    /// All registered handlers of the given runtime kind, in
    /// registration order.
    pub fn handlers_of_kind(&self, kind: &str) -> Vec<&dyn Handler> {
        self.handlers
            .iter()
            .filter(|h| h.kind() == kind)
            .map(|h| h.as_ref())
            .collect()
    }

    /// Remove a handler by name or, failing that, by identity. Any name
    /// index entry pointing at the removed handler is dropped too.
    pub fn remove_handler(&mut self, name_or_id: &str) -> bool {
        let id = match self.names.get(name_or_id) {
            Some(id) => id.clone(),
            None => name_or_id.to_string(),
        };
        let position = self.handlers.iter().position(|h| h.handler_id() == id);
        match position {
            Some(index) => {
                self.handlers.remove(index);
                self.names.retain(|_, mapped| *mapped != id);
                true
            }
            None => false,
        }
    }

    /// Fan one record out to every handler in insertion order.
    ///
    /// Each handler runs inside `catch_unwind`; a panic is routed to the
    /// error hook (if any) and dispatch continues with the next handler.
    pub fn log(&mut self, level: Level, message: &str, call_context: &Map<String, Value>) {
        if self.handlers.is_empty() {
            return;
        }

        for index in 0..self.handlers.len() {
            let outcome = {
                let handler = &mut self.handlers[index];
                catch_unwind(AssertUnwindSafe(|| {
                    handler.invoke(level, message, call_context)
                }))
            };

            if let Err(panic_info) = outcome {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                let error = FanlogError::HandlerPanic(panic_msg);
                let handler_id = self.handlers[index].handler_id();
                if let Some(ref hook) = self.error_hook {
                    // A hook that panics is ignored; dispatch continues.
                    let _ = catch_unwind(AssertUnwindSafe(|| {
                        hook(&error, &handler_id, level, message, call_context)
                    }));
                }
            }
        }
    }

    /// Flush every handler, ignoring per-handler failures.
    pub fn flush(&mut self) {
        for handler in &mut self.handlers {
            let _ = handler.flush();
        }
    }

    #[inline]
    pub fn debug(&mut self, message: &str) {
        self.log(Level::Debug, message, &Map::new());
    }

    #[inline]
    pub fn info(&mut self, message: &str) {
        self.log(Level::Info, message, &Map::new());
    }

    #[inline]
    pub fn notice(&mut self, message: &str) {
        self.log(Level::Notice, message, &Map::new());
    }

    #[inline]
    pub fn warning(&mut self, message: &str) {
        self.log(Level::Warning, message, &Map::new());
    }

    #[inline]
    pub fn error(&mut self, message: &str) {
        self.log(Level::Error, message, &Map::new());
    }

    #[inline]
    pub fn critical(&mut self, message: &str) {
        self.log(Level::Critical, message, &Map::new());
    }

    #[inline]
    pub fn alert(&mut self, message: &str) {
        self.log(Level::Alert, message, &Map::new());
    }

    #[inline]
    pub fn emergency(&mut self, message: &str) {
        self.log(Level::Emergency, message, &Map::new());
    }
}

/// Builder façade: construct a sink with its defaults, register it, and
/// hand back the identity for later naming or removal.
impl Logger {
    pub fn add_file(&mut self, path: impl AsRef<Path>, min_level: Level) -> Result<String> {
        let handler = FileHandler::new(path, min_level)?;
        Ok(self.add_handler(Box::new(handler)))
    }

    pub fn add_console(&mut self, min_level: Level) -> String {
        self.add_handler(Box::new(ConsoleHandler::new(min_level)))
    }

    pub fn add_error_stream(&mut self, min_level: Level) -> String {
        self.add_handler(Box::new(ErrorStreamHandler::new(min_level)))
    }

    pub fn add_syslog(&mut self, min_level: Level) -> Result<String> {
        let handler = SyslogHandler::new(min_level)?;
        Ok(self.add_handler(Box::new(handler)))
    }

    pub fn add_null(&mut self, min_level: Level) -> String {
        self.add_handler(Box::new(NullHandler::new(min_level)))
    }

    pub fn add_webhook(&mut self, url: &str, min_level: Level) -> Result<String> {
        let handler = WebhookHandler::new(url, min_level)?;
        Ok(self.add_handler(Box::new(handler)))
    }

    pub fn add_slack(&mut self, webhook_url: &str, min_level: Level) -> Result<String> {
        let handler = SlackHandler::new(webhook_url, min_level)?;
        Ok(self.add_handler(Box::new(handler)))
    }

    pub fn add_teams(&mut self, webhook_url: &str, min_level: Level) -> Result<String> {
        let handler = TeamsHandler::new(webhook_url, min_level)?;
        Ok(self.add_handler(Box::new(handler)))
    }

    pub fn add_loki(
        &mut self,
        base_url: &str,
        labels: HashMap<String, String>,
        min_level: Level,
    ) -> Result<String> {
        let handler = LokiHandler::new(base_url, labels, min_level)?;
        Ok(self.add_handler(Box::new(handler)))
    }

    pub fn add_email(&mut self, config: EmailConfig, min_level: Level) -> Result<String> {
        let handler = EmailHandler::new(config, min_level)?;
        Ok(self.add_handler(Box::new(handler)))
    }

    pub fn add_database(
        &mut self,
        connection: Box<dyn SqlConnection>,
        table: &str,
        min_level: Level,
    ) -> Result<String> {
        let handler = DatabaseHandler::new(connection, table, min_level)?;
        Ok(self.add_handler(Box::new(handler)))
    }

    pub fn add_browser_console(&mut self, min_level: Level) -> String {
        self.add_handler(Box::new(BrowserConsoleHandler::new(min_level)))
    }

    pub fn add_redis(
        &mut self,
        connection: Box<dyn RedisConnection>,
        ttl_seconds: u64,
        min_level: Level,
    ) -> String {
        self.add_handler(Box::new(RedisKvHandler::new(connection, ttl_seconds, min_level)))
    }

    pub fn add_redis_pubsub(
        &mut self,
        connection: Box<dyn RedisConnection>,
        channel: &str,
        min_level: Level,
    ) -> Result<String> {
        let handler = RedisPubSubHandler::new(connection, channel, min_level)?;
        Ok(self.add_handler(Box::new(handler)))
    }

    pub fn add_amqp(
        &mut self,
        channel: Box<dyn AmqpChannel>,
        exchange: &str,
        min_level: Level,
    ) -> Result<String> {
        let handler = AmqpHandler::new(channel, exchange, min_level)?;
        Ok(self.add_handler(Box::new(handler)))
    }

    pub fn add_kafka(
        &mut self,
        producer: Box<dyn KafkaProducer>,
        topic: &str,
        min_level: Level,
    ) -> Result<String> {
        let handler = KafkaHandler::new(producer, topic, min_level)?;
        Ok(self.add_handler(Box::new(handler)))
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("context", &self.context)
            .field("handlers", &self.handlers.len())
            .field("named", &self.names.len())
            .finish()
    }
}
