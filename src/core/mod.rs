//! Core record pipeline and handler framework

pub mod enrichers;
pub mod error;
pub mod fields;
pub mod handler;
pub mod level;
pub mod logger;
pub mod record;

pub use error::{FanlogError, Result};
pub use fields::{Producer, RecordBuilder};
pub use handler::{
    shared_stream, Handler, HandlerCore, MemoryStream, SharedStream, StreamHandler,
};
pub use level::Level;
pub use logger::{ErrorHook, Logger};
pub use record::{interpolate, value_to_display, Record};
