//! Error types for the logging framework

pub type Result<T> = std::result::Result<T, FanlogError>;

#[derive(Debug, thiserror::Error)]
pub enum FanlogError {
    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration rejected at handler construction
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File handler error with path
    #[error("File handler error for '{path}': {message}")]
    FileHandlerError { path: String, message: String },

    /// Delivery to a sink failed
    #[error("Delivery failed via {sink}: {message}")]
    DeliveryError { sink: String, message: String },

    /// SMTP protocol mismatch
    #[error("SMTP error (expected {expected}): {reply}")]
    SmtpError { expected: u16, reply: String },

    /// A handler panicked during dispatch
    #[error("Handler panicked: {0}")]
    HandlerPanic(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl FanlogError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        FanlogError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file handler error
    pub fn file_handler(path: impl Into<String>, message: impl Into<String>) -> Self {
        FanlogError::FileHandlerError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a delivery error
    pub fn delivery(sink: impl Into<String>, message: impl Into<String>) -> Self {
        FanlogError::DeliveryError {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create an SMTP protocol error
    pub fn smtp(expected: u16, reply: impl Into<String>) -> Self {
        FanlogError::SmtpError {
            expected,
            reply: reply.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        FanlogError::Other(msg.into())
    }
}
