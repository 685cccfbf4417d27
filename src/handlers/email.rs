//! SMTP email handler
//!
//! Speaks a minimal SMTP dialog directly over a TCP socket: greeting,
//! EHLO, optional STARTTLS upgrade with re-EHLO, optional AUTH LOGIN,
//! envelope, dot-terminated body, QUIT. At most one email is sent per
//! `rate_limit_seconds`; records inside the window are dropped.

use crate::core::error::{FanlogError, Result};
use crate::core::handler::{Handler, HandlerCore, StreamHandler};
use crate::core::level::Level;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use native_tls::TlsConnector;
use serde_json::{Map, Value};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub starttls: bool,
    pub html: bool,
    pub rate_limit_seconds: u64,
    pub timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 25,
            from: String::new(),
            to: Vec::new(),
            subject: "Log notification".to_string(),
            username: None,
            password: None,
            starttls: false,
            html: false,
            rate_limit_seconds: 60,
            timeout_secs: 10,
        }
    }
}

fn valid_address(address: &str) -> bool {
    let mut parts = address.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !address.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

/// One side of the SMTP conversation over any byte stream.
struct Dialog<S: Read + Write> {
    stream: S,
}

impl<S: Read + Write> Dialog<S> {
    fn new(stream: S) -> Self {
        Self { stream }
    }

    fn into_inner(self) -> S {
        self.stream
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            let n = self.stream.read(&mut byte)?;
            if n == 0 {
                return Err(FanlogError::smtp(0, "connection closed"));
            }
            if byte[0] == b'\n' {
                break;
            }
            if byte[0] != b'\r' {
                line.push(byte[0]);
            }
        }
        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    /// Read one (possibly multi-line) reply and check its code. A line
    /// whose 4th byte is `-` continues the reply.
    fn expect(&mut self, expected: u16) -> Result<()> {
        loop {
            let line = self.read_line()?;
            let continued = line.as_bytes().get(3) == Some(&b'-');
            if continued {
                continue;
            }
            let code: u16 = line
                .get(..3)
                .and_then(|digits| digits.parse().ok())
                .ok_or_else(|| FanlogError::smtp(expected, line.clone()))?;
            if code != expected {
                return Err(FanlogError::smtp(expected, line));
            }
            return Ok(());
        }
    }

    fn command(&mut self, line: &str, expected: u16) -> Result<()> {
        self.stream.write_all(line.as_bytes())?;
        self.stream.write_all(b"\r\n")?;
        self.expect(expected)
    }
}

pub struct EmailHandler {
    core: HandlerCore,
    config: EmailConfig,
    last_sent: Option<Instant>,
}

impl EmailHandler {
    pub fn new(config: EmailConfig, min_level: Level) -> Result<Self> {
        if !valid_address(&config.from) {
            return Err(FanlogError::config(
                "EmailHandler",
                format!("invalid sender address '{}'", config.from),
            ));
        }
        if config.to.is_empty() {
            return Err(FanlogError::config("EmailHandler", "no recipients"));
        }
        for recipient in &config.to {
            if !valid_address(recipient) {
                return Err(FanlogError::config(
                    "EmailHandler",
                    format!("invalid recipient address '{}'", recipient),
                ));
            }
        }
        Ok(Self {
            core: HandlerCore::new("email", min_level),
            config,
            last_sent: None,
        })
    }

    fn rate_limited(&self) -> bool {
        match self.last_sent {
            Some(at) => at.elapsed() < Duration::from_secs(self.config.rate_limit_seconds),
            None => false,
        }
    }

    fn message_body(&self, level: Level, payload: &str) -> String {
        let content_type = if self.config.html {
            "text/html"
        } else {
            "text/plain"
        };
        let mut headers = format!(
            "From: {}\r\nTo: {}\r\nSubject: {} [{}]\r\nDate: {}\r\n",
            self.config.from,
            self.config.to.join(", "),
            self.config.subject,
            level.as_str(),
            Utc::now().to_rfc2822(),
        );
        headers.push_str("MIME-Version: 1.0\r\n");
        headers.push_str(&format!(
            "Content-Type: {}; charset=utf-8\r\nContent-Transfer-Encoding: 8bit\r\n\r\n",
            content_type
        ));

        // Dot-stuff body lines so a leading '.' cannot end DATA early.
        let body: String = payload
            .lines()
            .map(|line| {
                if line.starts_with('.') {
                    format!(".{}\r\n", line)
                } else {
                    format!("{}\r\n", line)
                }
            })
            .collect();
        headers + &body
    }

    fn envelope_and_data<S: Read + Write>(
        &self,
        dialog: &mut Dialog<S>,
        message: &str,
    ) -> Result<()> {
        if let (Some(username), Some(password)) = (&self.config.username, &self.config.password) {
            dialog.command("AUTH LOGIN", 334)?;
            dialog.command(&BASE64.encode(username), 334)?;
            dialog.command(&BASE64.encode(password), 235)?;
        }
        dialog.command(&format!("MAIL FROM:<{}>", self.config.from), 250)?;
        for recipient in &self.config.to {
            dialog.command(&format!("RCPT TO:<{}>", recipient), 250)?;
        }
        dialog.command("DATA", 354)?;
        dialog.stream.write_all(message.as_bytes())?;
        dialog.command(".", 250)?;
        dialog.command("QUIT", 221)?;
        Ok(())
    }

    fn deliver(&self, level: Level, payload: &str) -> Result<()> {
        let message = self.message_body(level, payload);
        let address = (self.config.host.as_str(), self.config.port);
        let tcp = TcpStream::connect(address)?;
        let timeout = Some(Duration::from_secs(self.config.timeout_secs));
        tcp.set_read_timeout(timeout)?;
        tcp.set_write_timeout(timeout)?;

        let mut dialog = Dialog::new(tcp);
        dialog.expect(220)?;
        dialog.command(&format!("EHLO {}", hostname()), 250)?;

        if self.config.starttls {
            dialog.command("STARTTLS", 220)?;
            let connector = TlsConnector::new()
                .map_err(|e| FanlogError::delivery("email", e.to_string()))?;
            let tls = connector
                .connect(&self.config.host, dialog.into_inner())
                .map_err(|e| FanlogError::delivery("email", e.to_string()))?;
            let mut dialog = Dialog::new(tls);
            dialog.command(&format!("EHLO {}", hostname()), 250)?;
            self.envelope_and_data(&mut dialog, &message)
        } else {
            self.envelope_and_data(&mut dialog, &message)
        }
    }
}

#[cfg(target_os = "linux")]
fn hostname() -> String {
    std::fs::read_to_string("/proc/sys/kernel/hostname")
        .map(|name| name.trim().to_string())
        .unwrap_or_else(|_| "localhost".to_string())
}

#[cfg(not(target_os = "linux"))]
fn hostname() -> String {
    "localhost".to_string()
}

impl Handler for EmailHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "email"
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

        if self.rate_limited() {
            return None;
        }
        match self.deliver(level, &payload) {
            Ok(()) => {
                self.last_sent = Some(Instant::now());
                Some(payload)
            }
            Err(_) => None,
        }
    }
}

impl StreamHandler for EmailHandler {}
