//! Kafka handler
//!
//! Produces each record to a topic through a caller-constructed
//! producer, with a non-blocking poll after every publish. The broker
//! chooses the partition. `flush_with_timeout` forces delivery before
//! shutdown.

use crate::core::error::{FanlogError, Result};
use crate::core::handler::{Handler, HandlerCore};
use crate::core::level::Level;
use serde_json::{Map, Value};

/// Interface obligation for a Kafka producer handle.
pub trait KafkaProducer: Send {
    fn is_connected(&self) -> bool;
    fn produce(&mut self, topic: &str, payload: &[u8]) -> std::result::Result<(), String>;
    /// Non-blocking delivery-report poll.
    fn poll(&mut self);
    fn flush(&mut self, timeout_ms: u64) -> std::result::Result<(), String>;
}

pub struct KafkaHandler {
    core: HandlerCore,
    producer: Box<dyn KafkaProducer>,
    topic: String,
}

impl KafkaHandler {
    pub fn new(producer: Box<dyn KafkaProducer>, topic: &str, min_level: Level) -> Result<Self> {
        if !producer.is_connected() {
            return Err(FanlogError::config(
                "KafkaHandler",
                "producer handle is not connected",
            ));
        }
        if topic.is_empty() {
            return Err(FanlogError::config("KafkaHandler", "empty topic name"));
        }
        Ok(Self {
            core: HandlerCore::new("kafka", min_level),
            producer,
            topic: topic.to_string(),
        })
    }

    /// Block up to `timeout_ms` until in-flight records are delivered.
    pub fn flush_with_timeout(&mut self, timeout_ms: u64) -> bool {
        self.producer.flush(timeout_ms).is_ok()
    }
}

impl Handler for KafkaHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "kafka"
    }

    fn invoke(
        &mut self,
        level: Level,
        message: &str,
        call_context: &Map<String, Value>,
    ) -> Option<String> {
        let (_, payload) = self.core.prepare(level, message, call_context)?;

        let produced = self.producer.produce(&self.topic, payload.as_bytes());
        self.producer.poll();
        produced.ok()?;
        Some(payload)
    }

    fn flush(&mut self) -> Result<()> {
        self.producer
            .flush(1000)
            .map_err(|e| FanlogError::delivery("kafka", e))
    }
}
