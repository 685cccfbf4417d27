//! Logging macros for ergonomic message formatting.
//!
//! # Examples
//!
//! ```
//! use fanlog::prelude::*;
//! use fanlog::info;
//!
//! let mut logger = Logger::new("app");
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Listening on port {}", port);
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use fanlog::prelude::*;
/// # let mut logger = Logger::new("app");
/// use fanlog::log;
/// log!(logger, Level::Info, "Simple message");
/// log!(logger, Level::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, &format!($($arg)+), &$crate::empty_call_context())
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)+)
    };
}

/// Log a notice-level message.
#[macro_export]
macro_rules! notice {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Notice, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warning, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Critical, $($arg)+)
    };
}

/// Log an alert-level message.
#[macro_export]
macro_rules! alert {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Alert, $($arg)+)
    };
}

/// Log an emergency-level message.
#[macro_export]
macro_rules! emergency {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Emergency, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Level, Logger};
    use crate::handlers::{NullHandler, StreamHandler};
    use crate::core::handler::MemoryStream;

    #[test]
    fn test_log_macro() {
        let mut logger = Logger::new("app");
        log!(logger, Level::Info, "Test message");
        log!(logger, Level::Info, "Formatted: {}", 42);
    }

    #[test]
    fn test_level_macros_format_and_dispatch() {
        let capture = MemoryStream::new();
        let mut handler = NullHandler::new(Level::Debug);
        handler.set_stream(capture.stream());

        let mut logger = Logger::new("app");
        logger.add_handler(Box::new(handler));

        debug!(logger, "Counter: {}", 10);
        info!(logger, "Items: {}", 100);
        notice!(logger, "Deployed");
        warning!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);
        critical!(logger, "No disk");
        alert!(logger, "Paging");
        emergency!(logger, "Down");

        let lines = capture.lines();
        assert_eq!(lines.len(), 8);
        assert!(lines[0].contains("Counter: 10"));
        assert!(lines[3].contains("Retry 1 of 3"));
        assert!(lines[7].contains("Down"));
    }
}
