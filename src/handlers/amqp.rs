//! AMQP handler
//!
//! Publishes each record to a fan-out exchange through a
//! caller-constructed channel. The exchange is declared lazily on the
//! first publish; broker errors are swallowed to an absent return.

use crate::core::error::{FanlogError, Result};
use crate::core::handler::{Handler, HandlerCore};
use crate::core::level::Level;
use serde_json::{Map, Value};

/// Interface obligation for an AMQP channel handle.
pub trait AmqpChannel: Send {
    fn is_connected(&self) -> bool;
    fn declare_fanout_exchange(&mut self, name: &str) -> std::result::Result<(), String>;
    fn publish(
        &mut self,
        exchange: &str,
        routing_key: &str,
        payload: &[u8],
        persistent: bool,
    ) -> std::result::Result<(), String>;
}

pub struct AmqpHandler {
    core: HandlerCore,
    channel: Box<dyn AmqpChannel>,
    exchange: String,
    declared: bool,
}

impl AmqpHandler {
    pub fn new(channel: Box<dyn AmqpChannel>, exchange: &str, min_level: Level) -> Result<Self> {
        if !channel.is_connected() {
            return Err(FanlogError::config(
                "AmqpHandler",
                "channel handle is not connected",
            ));
        }
        if exchange.is_empty() {
            return Err(FanlogError::config("AmqpHandler", "empty exchange name"));
        }
        Ok(Self {
            core: HandlerCore::new("amqp", min_level),
            channel,
            exchange: exchange.to_string(),
            declared: false,
        })
    }
}

impl Handler for AmqpHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "amqp"
    }

    fn invoke(
        &mut self,
        level: Level,
        message: &str,
        call_context: &Map<String, Value>,
    ) -> Option<String> {
        let (_, payload) = self.core.prepare(level, message, call_context)?;

        if !self.declared {
            self.channel.declare_fanout_exchange(&self.exchange).ok()?;
            self.declared = true;
        }
        self.channel
            .publish(&self.exchange, "", payload.as_bytes(), true)
            .ok()?;
        Some(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeChannelState {
        declares: Vec<String>,
        published: Vec<(String, String, Vec<u8>, bool)>,
        fail_publish: bool,
    }

    #[derive(Clone)]
    struct FakeChannel {
        connected: bool,
        state: Arc<Mutex<FakeChannelState>>,
    }

    impl FakeChannel {
        fn new(connected: bool) -> Self {
            Self {
                connected,
                state: Arc::default(),
            }
        }
    }

    impl AmqpChannel for FakeChannel {
        fn is_connected(&self) -> bool {
            self.connected
        }

        fn declare_fanout_exchange(&mut self, name: &str) -> std::result::Result<(), String> {
            self.state.lock().declares.push(name.to_string());
            Ok(())
        }

        fn publish(
            &mut self,
            exchange: &str,
            routing_key: &str,
            payload: &[u8],
            persistent: bool,
        ) -> std::result::Result<(), String> {
            let mut state = self.state.lock();
            if state.fail_publish {
                return Err("channel closed".to_string());
            }
            state.published.push((
                exchange.to_string(),
                routing_key.to_string(),
                payload.to_vec(),
                persistent,
            ));
            Ok(())
        }
    }

    #[test]
    fn test_unconnected_channel_rejected() {
        let channel = FakeChannel::new(false);
        assert!(AmqpHandler::new(Box::new(channel), "logs", Level::Debug).is_err());
    }

    #[test]
    fn test_exchange_declared_once() {
        let channel = FakeChannel::new(true);
        let state = Arc::clone(&channel.state);
        let mut handler = AmqpHandler::new(Box::new(channel), "logs", Level::Debug).unwrap();

        handler.invoke(Level::Info, "one", &Map::new()).unwrap();
        handler.invoke(Level::Info, "two", &Map::new()).unwrap();

        assert_eq!(state.lock().declares, ["logs"]);
        assert_eq!(state.lock().published.len(), 2);
    }

    #[test]
    fn test_publish_empty_routing_key_persistent() {
        let channel = FakeChannel::new(true);
        let state = Arc::clone(&channel.state);
        let mut handler = AmqpHandler::new(Box::new(channel), "logs", Level::Debug).unwrap();

        handler.invoke(Level::Error, "boom", &Map::new()).unwrap();

        let (exchange, routing_key, _, persistent) = state.lock().published[0].clone();
        assert_eq!(exchange, "logs");
        assert_eq!(routing_key, "");
        assert!(persistent);
    }

    #[test]
    fn test_publish_failure_swallowed() {
        let channel = FakeChannel::new(true);
        let state = Arc::clone(&channel.state);
        state.lock().fail_publish = true;
        let mut handler = AmqpHandler::new(Box::new(channel), "logs", Level::Debug).unwrap();

        assert!(handler.invoke(Level::Error, "boom", &Map::new()).is_none());
    }
}
