//! Sampling decorator
//!
//! Gates records through one of four strategies before they reach the
//! wrapped handler: first-N-per-second rate limiting, uniform
//! percentage, smart (rank-based always-log levels plus percentage),
//! and fingerprint deduplication over a sliding window.

use crate::core::handler::{Handler, HandlerCore, SharedStream, StreamHandler};
use crate::core::level::Level;
use crate::formatters::Formatter;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const FINGERPRINT_MESSAGE_PREFIX: usize = 200;

#[derive(Debug, Clone)]
pub enum SamplingStrategy {
    /// Accept the first `per_second` records of each wall-clock second.
    Rate { per_second: u32 },
    /// Accept each record with probability `percentage`/100.
    Percentage { percentage: u8 },
    /// Accept unconditionally at or above the least severe of
    /// `always_log`; percentage-gate everything below.
    Smart {
        always_log: Vec<Level>,
        sample_percentage: u8,
    },
    /// Accept the first occurrence of each `(level, message prefix)`
    /// fingerprint per window.
    Fingerprint { window_seconds: u64 },
}

impl SamplingStrategy {
    fn name(&self) -> &'static str {
        match self {
            SamplingStrategy::Rate { .. } => "rate",
            SamplingStrategy::Percentage { .. } => "percentage",
            SamplingStrategy::Smart { .. } => "smart",
            SamplingStrategy::Fingerprint { .. } => "fingerprint",
        }
    }
}

/// Accept/drop counters, cheap enough to bump on every record.
#[derive(Debug, Default)]
pub struct SamplerStats {
    accepted: AtomicU64,
    dropped: AtomicU64,
}

impl SamplerStats {
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn record(&self, accepted: bool) {
        if accepted {
            self.accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[derive(Debug, Clone)]
struct FingerprintEntry {
    count: u64,
    first_seen: u64,
    last_seen: u64,
}

/// Point-in-time view returned by [`SamplingHandler::statistics`].
#[derive(Debug, Clone)]
pub struct SamplingSnapshot {
    pub strategy: &'static str,
    pub accepted: u64,
    pub dropped: u64,
    pub tracked_fingerprints: usize,
    pub current_second_count: u32,
}

pub struct SamplingHandler {
    core: HandlerCore,
    wrapped: Box<dyn StreamHandler>,
    strategy: SamplingStrategy,
    stats: SamplerStats,
    current_second: u64,
    count_this_second: u32,
    fingerprints: HashMap<String, FingerprintEntry>,
}

impl SamplingHandler {
    pub fn new(wrapped: Box<dyn StreamHandler>, strategy: SamplingStrategy) -> Self {
        Self {
            core: HandlerCore::new("sampling", Level::Debug),
            wrapped,
            strategy,
            stats: SamplerStats::default(),
            current_second: 0,
            count_this_second: 0,
            fingerprints: HashMap::new(),
        }
    }

    fn now_seconds() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    /// 128-bit fingerprint of `level || ":" || message prefix`, so that
    /// identical messages at different levels stay distinct.
    fn fingerprint(level: Level, message: &str) -> String {
        let prefix: String = message.chars().take(FINGERPRINT_MESSAGE_PREFIX).collect();
        let digest = Sha256::digest(format!("{}:{}", level.as_str(), prefix).as_bytes());
        digest[..16].iter().map(|b| format!("{:02x}", b)).collect()
    }

    fn percentage_accepts(percentage: u8) -> bool {
        use rand::Rng;
        rand::thread_rng().gen_range(1..=100) <= percentage as u32
    }

    fn should_accept(&mut self, level: Level, message: &str) -> bool {
        match &self.strategy {
            SamplingStrategy::Rate { per_second } => {
                let now = Self::now_seconds();
                if now != self.current_second {
                    self.current_second = now;
                    self.count_this_second = 0;
                }
                self.count_this_second += 1;
                self.count_this_second <= *per_second
            }
            SamplingStrategy::Percentage { percentage } => Self::percentage_accepts(*percentage),
            SamplingStrategy::Smart {
                always_log,
                sample_percentage,
            } => {
                let floor = always_log.iter().map(|l| l.rank()).min();
                match floor {
                    Some(floor) if level.rank() >= floor => true,
                    _ => Self::percentage_accepts(*sample_percentage),
                }
            }
            SamplingStrategy::Fingerprint { window_seconds } => {
                let now = Self::now_seconds();
                let window = *window_seconds;
                self.fingerprints
                    .retain(|_, entry| entry.last_seen >= now.saturating_sub(window));

                let key = Self::fingerprint(level, message);
                match self.fingerprints.get_mut(&key) {
                    Some(entry) => {
                        entry.count += 1;
                        entry.last_seen = now;
                        false
                    }
                    None => {
                        self.fingerprints.insert(
                            key,
                            FingerprintEntry {
                                count: 1,
                                first_seen: now,
                                last_seen: now,
                            },
                        );
                        true
                    }
                }
            }
        }
    }

    pub fn statistics(&self) -> SamplingSnapshot {
        SamplingSnapshot {
            strategy: self.strategy.name(),
            accepted: self.stats.accepted(),
            dropped: self.stats.dropped(),
            tracked_fingerprints: self.fingerprints.len(),
            current_second_count: self.count_this_second,
        }
    }

    /// Occurrence count tracked for a fingerprinted message, if any.
    pub fn fingerprint_count(&self, level: Level, message: &str) -> Option<u64> {
        self.fingerprints
            .get(&Self::fingerprint(level, message))
            .map(|entry| entry.count)
    }
}

impl Handler for SamplingHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn kind(&self) -> &'static str {
        "sampling"
    }

    fn invoke(
        &mut self,
        level: Level,
        message: &str,
        call_context: &Map<String, Value>,
    ) -> Option<String> {
        if !self.core.is_responsible(level) {
            return None;
        }

        let accepted = self.should_accept(level, message);
        self.stats.record(accepted);
        if !accepted {
            return None;
        }
        self.wrapped.invoke(level, message, call_context)
    }

    fn set_context(&mut self, context: &str) {
        self.core.set_context(context);
        self.wrapped.set_context(context);
    }

    fn set_formatter(&mut self, formatter: Arc<dyn Formatter>) {
        self.wrapped.set_formatter(formatter);
    }

    fn flush(&mut self) -> crate::core::error::Result<()> {
        self.wrapped.flush()
    }
}

impl StreamHandler for SamplingHandler {
    fn set_stream(&mut self, stream: SharedStream) {
        self.wrapped.set_stream(stream);
    }
}
