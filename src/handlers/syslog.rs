//! Syslog handler
//!
//! RFC 3164 datagrams over the local `/dev/log` socket, USER facility.
//! The socket is opened lazily on the first accepted record; the
//! handler's context string serves as the ident on every message.

use crate::core::error::Result;
use crate::core::handler::{Handler, HandlerCore, StreamHandler};
use crate::core::level::Level;
use serde_json::{Map, Value};

#[cfg(unix)]
use std::os::unix::net::UnixDatagram;

const FACILITY_USER: u8 = 1;

pub struct SyslogHandler {
    core: HandlerCore,
    #[cfg(unix)]
    socket: Option<UnixDatagram>,
}

impl SyslogHandler {
    #[cfg(unix)]
    pub fn new(min_level: Level) -> Result<Self> {
        Ok(Self {
            core: HandlerCore::new("syslog", min_level),
            socket: None,
        })
    }

    #[cfg(not(unix))]
    pub fn new(_min_level: Level) -> Result<Self> {
        Err(crate::core::error::FanlogError::config(
            "SyslogHandler",
            "system log is only available on unix platforms",
        ))
    }

    #[cfg(unix)]
    fn socket(&mut self) -> std::io::Result<&UnixDatagram> {
        if self.socket.is_none() {
            let socket = UnixDatagram::unbound()?;
            socket.connect("/dev/log")?;
            self.socket = Some(socket);
        }
        Ok(self.socket.as_ref().expect("socket opened above"))
    }

    fn priority(level: Level) -> u8 {
        (FACILITY_USER << 3) | level.syslog_severity()
    }

    fn datagram(&self, level: Level, payload: &str) -> String {
        let ident = if self.core.context().is_empty() {
            "fanlog"
        } else {
            self.core.context()
        };
        format!(
            "<{}>{}[{}]: {}",
            Self::priority(level),
            ident,
            std::process::id(),
            payload
        )
    }
}

impl Handler for SyslogHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "syslog"
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

        #[cfg(unix)]
        {
            let datagram = self.datagram(level, &payload);
            let socket = self.socket().ok()?;
            socket.send(datagram.as_bytes()).ok()?;
            Some(payload)
        }
        #[cfg(not(unix))]
        {
            None
        }
    }
}

impl StreamHandler for SyslogHandler {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_priority_encoding() {
        // USER facility is 8; severity is the inverted level table.
        assert_eq!(SyslogHandler::priority(Level::Emergency), 8);
        assert_eq!(SyslogHandler::priority(Level::Error), 11);
        assert_eq!(SyslogHandler::priority(Level::Debug), 15);
    }

    #[test]
    fn test_construction_does_not_open_socket() {
        let handler = SyslogHandler::new(Level::Debug).unwrap();
        assert!(handler.socket.is_none());
    }

    #[test]
    fn test_level_gate_skips_socket_open() {
        let mut handler = SyslogHandler::new(Level::Error).unwrap();
        assert!(handler.invoke(Level::Info, "dropped", &Map::new()).is_none());
        assert!(handler.socket.is_none());
    }

    #[test]
    fn test_datagram_uses_context_as_ident() {
        let mut handler = SyslogHandler::new(Level::Debug).unwrap();
        handler.set_context("OrderSvc");
        let datagram = handler.datagram(Level::Warning, "low stock");
        assert!(datagram.starts_with("<12>OrderSvc["));
        assert!(datagram.ends_with("]: low stock"));
    }

    #[test]
    fn test_stream_override_bypasses_socket() {
        use crate::core::handler::MemoryStream;
        let mut handler = SyslogHandler::new(Level::Debug).unwrap();
        let capture = MemoryStream::new();
        handler.set_stream(capture.stream());
        handler.invoke(Level::Info, "redirected", &Map::new());
        assert_eq!(capture.lines().len(), 1);
        assert!(handler.socket.is_none());
    }
}
