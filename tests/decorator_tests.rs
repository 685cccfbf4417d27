//! Scenario tests for the decorator handlers

use fanlog::handlers::{
    FingersCrossedHandler, NullHandler, SamplingHandler, SamplingStrategy, StreamHandler,
};
use fanlog::prelude::*;
use fanlog::Level;
use std::time::Duration;

fn capture_null() -> (Box<dyn StreamHandler>, MemoryStream) {
    let capture = MemoryStream::new();
    let mut handler = NullHandler::new(Level::Debug);
    handler.set_stream(capture.stream());
    (Box::new(handler), capture)
}

#[test]
fn test_fingers_crossed_capacity_three_latching_on() {
    let (inner, capture) = capture_null();
    let decorator = FingersCrossedHandler::new(inner)
        .with_capacity(3)
        .with_activation_level(Level::Error)
        .with_latching(true);

    let mut logger = Logger::new("svc");
    logger.add_handler(Box::new(decorator));

    for message in ["i1", "i2", "i3", "i4", "i5"] {
        logger.info(message);
    }
    logger.error("boom");

    // min(buffered, capacity) + 1 deliveries: the two oldest infos were
    // evicted by the capacity.
    let lines = capture.lines();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].contains("i3"));
    assert!(lines[1].contains("i4"));
    assert!(lines[2].contains("i5"));
    assert!(lines[3].contains("boom"));
}

#[test]
fn test_fingers_crossed_nothing_before_activation() {
    let (inner, capture) = capture_null();
    let decorator = FingersCrossedHandler::new(inner);

    let mut logger = Logger::new("svc");
    logger.add_handler(Box::new(decorator));

    for i in 0..150 {
        logger.info(&format!("quiet {}", i));
    }
    assert!(capture.lines().is_empty());
}

#[test]
fn test_fingerprint_sampling_window() {
    let (inner, capture) = capture_null();
    let decorator = SamplingHandler::new(
        inner,
        SamplingStrategy::Fingerprint { window_seconds: 1 },
    );

    let mut logger = Logger::new("svc");
    logger.add_handler(Box::new(decorator));

    for _ in 0..5 {
        logger.info("X");
    }
    std::thread::sleep(Duration::from_millis(2100));
    logger.info("X");
    logger.info("Y");

    // First X, the X after the window, and Y.
    let lines = capture.lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains(": X "));
    assert!(lines[1].contains(": X "));
    assert!(lines[2].contains(": Y "));
}

#[test]
fn test_smart_sampling_statistical() {
    let (inner, capture) = capture_null();
    let decorator = SamplingHandler::new(
        inner,
        SamplingStrategy::Smart {
            always_log: vec![Level::Error],
            sample_percentage: 50,
        },
    );

    let mut logger = Logger::new("svc");
    logger.add_handler(Box::new(decorator));

    for _ in 0..100 {
        logger.error("always kept");
    }
    for _ in 0..2000 {
        logger.info("sometimes kept");
    }

    let lines = capture.lines();
    let errors = lines.iter().filter(|l| l.contains("always kept")).count();
    let infos = lines.iter().filter(|l| l.contains("sometimes kept")).count();
    assert_eq!(errors, 100);
    assert!(
        (800..=1200).contains(&infos),
        "expected ~1000 sampled infos, got {}",
        infos
    );
}

#[test]
fn test_decorators_nest() {
    // Sampling inside fingers-crossed: the buffer sees everything, the
    // sampler dedups only what gets flushed through it.
    let (inner, capture) = capture_null();
    let sampler = SamplingHandler::new(
        inner,
        SamplingStrategy::Fingerprint { window_seconds: 60 },
    );
    let decorator = FingersCrossedHandler::new(Box::new(sampler)).with_capacity(10);

    let mut logger = Logger::new("svc");
    logger.add_handler(Box::new(decorator));

    logger.info("dup");
    logger.info("dup");
    logger.info("unique");
    logger.error("trigger");

    let lines = capture.lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("dup"));
    assert!(lines[1].contains("unique"));
    assert!(lines[2].contains("trigger"));
}

#[test]
fn test_decorator_context_propagates_from_logger() {
    let (inner, capture) = capture_null();
    let decorator = FingersCrossedHandler::new(inner);

    let mut logger = Logger::new("Billing");
    logger.add_handler(Box::new(decorator));

    logger.error("charge failed");
    assert!(capture.lines()[0].starts_with("Billing."));
}
