//! Handler contract
//!
//! Every sink implements [`Handler`]; sinks that can redirect their
//! output to a caller-supplied byte stream additionally implement
//! [`StreamHandler`], which is what makes them wrappable by the decorator
//! handlers.
//!
//! Shared per-handler state (identity, optional name, minimum level,
//! context, formatter, record builder, stream override) lives in
//! [`HandlerCore`]; concrete handlers embed one and delegate the common
//! contract methods to it.

use super::error::Result;
use super::fields::{Producer, RecordBuilder};
use super::level::Level;
use super::record::Record;
use crate::formatters::{Formatter, LineFormatter};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A writable byte sink that can be shared between a test and one or
/// more handlers. Streams set this way are borrowed, never closed.
pub type SharedStream = Arc<Mutex<dyn Write + Send>>;

/// Wrap a writer for use with [`StreamHandler::set_stream`].
pub fn shared_stream<W: Write + Send + 'static>(writer: W) -> SharedStream {
    Arc::new(Mutex::new(writer))
}

/// In-memory byte sink whose contents stay readable after being handed
/// to a handler. The capture side of `set_stream` in tests, and the
/// accumulation buffer when composing handlers.
#[derive(Clone, Default)]
pub struct MemoryStream {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.buffer.lock().clone()
    }

    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    /// The written payloads, one per line.
    pub fn lines(&self) -> Vec<String> {
        self.as_string().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }

    /// This stream as a [`SharedStream`] for `set_stream`.
    pub fn stream(&self) -> SharedStream {
        shared_stream(self.clone())
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

static HANDLER_SEQ: AtomicU64 = AtomicU64::new(1);

fn next_handler_id(kind: &str) -> String {
    let seq = HANDLER_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}-{:08x}", kind, seq)
}

/// State shared by every handler kind.
pub struct HandlerCore {
    id: String,
    name: Option<String>,
    min_level: Level,
    context: String,
    formatter: Option<Arc<dyn Formatter>>,
    builder: RecordBuilder,
    stream: Option<SharedStream>,
}

impl HandlerCore {
    pub fn new(kind: &str, min_level: Level) -> Self {
        Self {
            id: next_handler_id(kind),
            name: None,
            min_level,
            context: String::new(),
            formatter: None,
            builder: RecordBuilder::new(),
            stream: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn set_context(&mut self, context: &str) {
        self.context = context.to_string();
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn set_min_level(&mut self, level: Level) {
        self.min_level = level;
    }

    pub fn set_formatter(&mut self, formatter: Arc<dyn Formatter>) {
        self.formatter = Some(formatter);
    }

    pub fn set_stream(&mut self, stream: SharedStream) {
        self.stream = Some(stream);
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    pub fn add_field(&mut self, name: impl Into<String>, producer: Producer) -> bool {
        self.builder.add_field(name, producer)
    }

    pub fn add_extra(&mut self, name: impl Into<String>, producer: Producer) -> bool {
        self.builder.add_extra(name, producer)
    }

    /// Level gate: the handler is responsible iff the record's rank is at
    /// least its minimum level's rank.
    #[inline]
    pub fn is_responsible(&self, level: Level) -> bool {
        level.rank() >= self.min_level.rank()
    }

    pub fn build_record(
        &self,
        level: Level,
        message: &str,
        call_context: &Map<String, Value>,
    ) -> Record {
        self.builder.build(&self.context, level, message, call_context)
    }

    /// Format a record, installing the default line formatter on first use.
    pub fn format(&mut self, record: &Record) -> String {
        let formatter = self
            .formatter
            .get_or_insert_with(|| Arc::new(LineFormatter::new()));
        formatter.format(record)
    }

    /// Gate, build and format in one step. Returns `None` when the level
    /// gate rejects the record.
    pub fn prepare(
        &mut self,
        level: Level,
        message: &str,
        call_context: &Map<String, Value>,
    ) -> Option<(Record, String)> {
        if !self.is_responsible(level) {
            return None;
        }
        let record = self.build_record(level, message, call_context);
        let payload = self.format(&record);
        Some((record, payload))
    }

    /// Write `payload` plus a newline to the stream override. Returns
    /// `false` when there is no override or the write failed.
    pub fn write_stream(&mut self, payload: &str) -> bool {
        match &self.stream {
            Some(stream) => {
                let mut writer = stream.lock();
                writer
                    .write_all(payload.as_bytes())
                    .and_then(|_| writer.write_all(b"\n"))
                    .is_ok()
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for HandlerCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerCore")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("min_level", &self.min_level)
            .field("context", &self.context)
            .field("stream_override", &self.stream.is_some())
            .finish()
    }
}

pub trait Handler: Send {
    fn core(&self) -> &HandlerCore;
    fn core_mut(&mut self) -> &mut HandlerCore;

    /// Runtime kind of this handler ("file", "slack", …), used by the
    /// logger's kind lookup.
    fn kind(&self) -> &'static str;

    /// Deliver one record. Returns the formatted payload on success and
    /// `None` on drop or delivery failure.
    fn invoke(
        &mut self,
        level: Level,
        message: &str,
        call_context: &Map<String, Value>,
    ) -> Option<String>;

    fn handler_id(&self) -> String {
        self.core().id().to_string()
    }

    fn handler_name(&self) -> Option<String> {
        self.core().name().map(str::to_string)
    }

    fn set_handler_name(&mut self, name: &str) {
        self.core_mut().set_name(name);
    }

    fn set_context(&mut self, context: &str) {
        self.core_mut().set_context(context);
    }

    fn set_formatter(&mut self, formatter: Arc<dyn Formatter>) {
        self.core_mut().set_formatter(formatter);
    }

    fn is_responsible(&self, level: Level) -> bool {
        self.core().is_responsible(level)
    }

    /// Flush any buffered state. Terminal handlers that buffer nothing
    /// use the default no-op.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Capability trait for handlers whose output can be redirected to a
/// caller-supplied stream. Decorators require their wrapped child to be
/// streamable.
pub trait StreamHandler: Handler {
    fn set_stream(&mut self, stream: SharedStream) {
        self.core_mut().set_stream(stream);
    }
}
