//! File handler
//!
//! Plain append-mode file sink. Construction fails when the parent
//! directory does not exist; the file itself is opened lazily on the
//! first accepted record. The handler owns its stream and flushes it on
//! drop.

use crate::core::error::{FanlogError, Result};
use crate::core::handler::{Handler, HandlerCore, StreamHandler};
use crate::core::level::Level;
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub struct FileHandler {
    core: HandlerCore,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileHandler {
    pub fn new(path: impl AsRef<std::path::Path>, min_level: Level) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            if !parent.is_dir() {
                return Err(FanlogError::file_handler(
                    path.display().to_string(),
                    format!("parent directory '{}' does not exist", parent.display()),
                ));
            }
        }
        Ok(Self {
            core: HandlerCore::new("file", min_level),
            path,
            writer: None,
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn writer(&mut self) -> std::io::Result<&mut BufWriter<File>> {
        if self.writer.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            self.writer = Some(BufWriter::new(file));
        }
        Ok(self.writer.as_mut().expect("writer opened above"))
    }
}

impl Handler for FileHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "file"
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

        let written = self
            .writer()
            .and_then(|writer| {
                writer.write_all(payload.as_bytes())?;
                writer.write_all(b"\n")
            })
            .is_ok();
        written.then_some(payload)
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl StreamHandler for FileHandler {}

impl Drop for FileHandler {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
