//! Handler implementations
//!
//! Terminal sinks write one record to one destination; the decorator
//! handlers (fingers-crossed, sampling, conditional) wrap streamable
//! handlers and modify which records reach them.

pub mod amqp;
pub mod browser;
pub mod conditional;
pub mod console;
pub mod database;
pub mod email;
pub mod file;
pub mod fingers_crossed;
pub mod kafka;
pub mod loki;
pub mod null;
pub mod redis;
pub mod sampling;
pub mod slack;
pub mod syslog;
pub mod teams;
pub mod transport;
pub mod webhook;

pub use amqp::{AmqpChannel, AmqpHandler};
pub use browser::{BrowserConsoleHandler, CHROME_LOGGER_HEADER};
pub use conditional::{ConditionalHandler, Predicate};
pub use console::{ConsoleHandler, ErrorStreamHandler};
pub use database::{DatabaseHandler, SqlConnection, SqlDriver};
pub use email::{EmailConfig, EmailHandler};
pub use file::FileHandler;
pub use fingers_crossed::{FingersCrossedHandler, FingersCrossedStats};
pub use kafka::{KafkaHandler, KafkaProducer};
pub use loki::LokiHandler;
pub use null::NullHandler;
pub use redis::{RedisConnection, RedisKvHandler, RedisPubSubHandler};
pub use sampling::{SamplerStats, SamplingHandler, SamplingSnapshot, SamplingStrategy};
pub use slack::SlackHandler;
pub use syslog::SyslogHandler;
pub use teams::TeamsHandler;
pub use transport::HttpTransport;
pub use webhook::{BodyFormatter, WebhookHandler};

// Re-export the contract next to its implementations.
pub use crate::core::handler::{Handler, StreamHandler};
