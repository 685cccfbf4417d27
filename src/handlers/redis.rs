//! Redis handlers: key/value snapshots and pub/sub fan-out
//!
//! The crate consumes a caller-constructed connection through the
//! [`RedisConnection`] obligation; concrete client crates stay outside.
//! Broker unavailability never propagates into the host: failures
//! surface only as an absent return value.

use crate::core::error::{FanlogError, Result};
use crate::core::handler::{Handler, HandlerCore};
use crate::core::level::Level;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::{Map, Value};

/// Interface obligation for a Redis client handle.
pub trait RedisConnection: Send {
    fn is_connected(&self) -> bool;
    fn connect(&mut self) -> std::result::Result<(), String>;
    fn setex(
        &mut self,
        key: &str,
        ttl_seconds: u64,
        value: &str,
    ) -> std::result::Result<(), String>;
    fn publish(&mut self, channel: &str, payload: &str) -> std::result::Result<(), String>;
}

fn random_key() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    format!("Redis{}", suffix)
}

/// Stores each record as `SETEX <key> <ttl> <json>` under a randomized
/// key. Connection is lazy; a failed initial connect latches a
/// silently-failed state and later records drop without a reconnect
/// attempt.
pub struct RedisKvHandler {
    core: HandlerCore,
    connection: Box<dyn RedisConnection>,
    ttl_seconds: u64,
    connect_failed: bool,
}

impl RedisKvHandler {
    pub fn new(
        connection: Box<dyn RedisConnection>,
        ttl_seconds: u64,
        min_level: Level,
    ) -> Self {
        Self {
            core: HandlerCore::new("redis", min_level),
            connection,
            ttl_seconds,
            connect_failed: false,
        }
    }

    fn ensure_connected(&mut self) -> bool {
        if self.connect_failed {
            return false;
        }
        if self.connection.is_connected() {
            return true;
        }
        if self.connection.connect().is_err() {
            self.connect_failed = true;
            return false;
        }
        true
    }
}

impl Handler for RedisKvHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "redis"
    }

    fn invoke(
        &mut self,
        level: Level,
        message: &str,
        call_context: &Map<String, Value>,
    ) -> Option<String> {
        let (record, payload) = self.core.prepare(level, message, call_context)?;

        if !self.ensure_connected() {
            return None;
        }

        let encoded = serde_json::to_string(&record.to_json())
            .unwrap_or_else(|_| format!("{:?}", record));
        self.connection
            .setex(&random_key(), self.ttl_seconds, &encoded)
            .ok()?;
        Some(payload)
    }
}

/// `PUBLISH <channel> <payload>` per record. The handle must already be
/// connected at construction.
pub struct RedisPubSubHandler {
    core: HandlerCore,
    connection: Box<dyn RedisConnection>,
    channel: String,
}

impl RedisPubSubHandler {
    pub fn new(
        connection: Box<dyn RedisConnection>,
        channel: &str,
        min_level: Level,
    ) -> Result<Self> {
        if !connection.is_connected() {
            return Err(FanlogError::config(
                "RedisPubSubHandler",
                "connection handle is not connected",
            ));
        }
        if channel.is_empty() {
            return Err(FanlogError::config("RedisPubSubHandler", "empty channel"));
        }
        Ok(Self {
            core: HandlerCore::new("redis_pubsub", min_level),
            connection,
            channel: channel.to_string(),
        })
    }
}

impl Handler for RedisPubSubHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "redis_pubsub"
    }

    fn invoke(
        &mut self,
        level: Level,
        message: &str,
        call_context: &Map<String, Value>,
    ) -> Option<String> {
        let (_, payload) = self.core.prepare(level, message, call_context)?;
        self.connection.publish(&self.channel, &payload).ok()?;
        Some(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeRedisState {
        connected: bool,
        refuse_connect: bool,
        connect_attempts: usize,
        stored: Vec<(String, u64, String)>,
        published: Vec<(String, String)>,
    }

    #[derive(Clone, Default)]
    struct FakeRedis {
        state: Arc<Mutex<FakeRedisState>>,
    }

    impl FakeRedis {
        fn connected() -> Self {
            let fake = Self::default();
            fake.state.lock().connected = true;
            fake
        }

        fn refusing() -> Self {
            let fake = Self::default();
            fake.state.lock().refuse_connect = true;
            fake
        }
    }

    impl RedisConnection for FakeRedis {
        fn is_connected(&self) -> bool {
            self.state.lock().connected
        }

        fn connect(&mut self) -> std::result::Result<(), String> {
            let mut state = self.state.lock();
            state.connect_attempts += 1;
            if state.refuse_connect {
                return Err("refused".to_string());
            }
            state.connected = true;
            Ok(())
        }

        fn setex(
            &mut self,
            key: &str,
            ttl_seconds: u64,
            value: &str,
        ) -> std::result::Result<(), String> {
            self.state
                .lock()
                .stored
                .push((key.to_string(), ttl_seconds, value.to_string()));
            Ok(())
        }

        fn publish(&mut self, channel: &str, payload: &str) -> std::result::Result<(), String> {
            self.state
                .lock()
                .published
                .push((channel.to_string(), payload.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_kv_lazy_connect_and_store() {
        let fake = FakeRedis::default();
        let mut handler = RedisKvHandler::new(Box::new(fake.clone()), 300, Level::Debug);
        handler.set_context("Svc");

        assert_eq!(fake.state.lock().connect_attempts, 0);
        assert!(handler.invoke(Level::Info, "stored", &Map::new()).is_some());

        let state = fake.state.lock();
        assert_eq!(state.connect_attempts, 1);
        let (key, ttl, value) = &state.stored[0];
        assert!(key.starts_with("Redis"));
        assert_eq!(key.len(), "Redis".len() + 16);
        assert_eq!(*ttl, 300);
        let parsed: Value = serde_json::from_str(value).unwrap();
        assert_eq!(parsed["message"], "stored");
        assert_eq!(parsed["context"], "Svc");
    }

    #[test]
    fn test_kv_failed_connect_latches() {
        let fake = FakeRedis::refusing();
        let mut handler = RedisKvHandler::new(Box::new(fake.clone()), 300, Level::Debug);

        assert!(handler.invoke(Level::Info, "one", &Map::new()).is_none());
        assert!(handler.invoke(Level::Info, "two", &Map::new()).is_none());

        // Only the first record triggered a connect attempt.
        assert_eq!(fake.state.lock().connect_attempts, 1);
        assert!(fake.state.lock().stored.is_empty());
    }

    #[test]
    fn test_pubsub_requires_connected_handle() {
        let fake = FakeRedis::default();
        assert!(RedisPubSubHandler::new(Box::new(fake), "logs", Level::Debug).is_err());

        let fake = FakeRedis::connected();
        assert!(RedisPubSubHandler::new(Box::new(fake), "logs", Level::Debug).is_ok());
    }

    #[test]
    fn test_pubsub_publishes_formatted_payload() {
        let fake = FakeRedis::connected();
        let mut handler =
            RedisPubSubHandler::new(Box::new(fake.clone()), "logs", Level::Debug).unwrap();
        handler.set_context("Svc");

        handler.invoke(Level::Warning, "fan out", &Map::new()).unwrap();

        let state = fake.state.lock();
        assert_eq!(state.published[0].0, "logs");
        assert_eq!(state.published[0].1, "Svc.WARNING: fan out {}");
    }
}
