//! Enricher producers
//!
//! Nullary callables handed to `add_field` / `add_extra`. Each call
//! returns a fresh producer; value-capturing enrichers (client IP,
//! request snapshot) take their snapshot at construction.

use super::fields::Producer;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::net::IpAddr;

/// ISO 8601 timestamp with millisecond precision.
pub fn timestamp() -> Producer {
    Box::new(|| Value::String(Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()))
}

/// Unix timestamp in seconds.
pub fn unix_timestamp() -> Producer {
    Box::new(|| json!(Utc::now().timestamp()))
}

/// Random v4 UUID per record.
pub fn uuid() -> Producer {
    Box::new(|| Value::String(uuid::Uuid::new_v4().to_string()))
}

/// Resident-set size of the current process in bytes; 0 where the
/// platform offers no cheap way to read it.
pub fn memory_usage() -> Producer {
    Box::new(|| json!(resident_set_bytes()))
}

#[cfg(target_os = "linux")]
fn resident_set_bytes() -> u64 {
    // Second field of /proc/self/statm is resident pages.
    std::fs::read_to_string("/proc/self/statm")
        .ok()
        .and_then(|statm| {
            statm
                .split_whitespace()
                .nth(1)
                .and_then(|pages| pages.parse::<u64>().ok())
        })
        .map(|pages| pages * 4096)
        .unwrap_or(0)
}

#[cfg(not(target_os = "linux"))]
fn resident_set_bytes() -> u64 {
    0
}

/// Client IP captured at construction, e.g. from the connection the
/// current request arrived on.
pub fn client_ip(addr: IpAddr) -> Producer {
    Box::new(move || Value::String(addr.to_string()))
}

/// Snapshot of the current HTTP request as a map.
pub fn request_snapshot(
    method: impl Into<String>,
    path: impl Into<String>,
    headers: Vec<(String, String)>,
) -> Producer {
    let method = method.into();
    let path = path.into();
    Box::new(move || {
        let mut snapshot = Map::new();
        snapshot.insert("method".to_string(), Value::String(method.clone()));
        snapshot.insert("path".to_string(), Value::String(path.clone()));
        let header_map: Map<String, Value> = headers
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        snapshot.insert("headers".to_string(), Value::Object(header_map));
        Value::Object(snapshot)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_shape() {
        let value = timestamp()();
        let s = value.as_str().unwrap();
        assert!(s.ends_with('Z'));
        assert_eq!(s.len(), "2025-01-08T10:30:45.123Z".len());
    }

    #[test]
    fn test_uuid_unique_per_call() {
        let producer = uuid();
        assert_ne!(producer(), producer());
    }

    #[test]
    fn test_client_ip_captured() {
        let producer = client_ip("192.168.1.9".parse().unwrap());
        assert_eq!(producer(), Value::String("192.168.1.9".to_string()));
    }

    #[test]
    fn test_request_snapshot() {
        let producer = request_snapshot(
            "POST",
            "/orders",
            vec![("x-request-id".to_string(), "r-1".to_string())],
        );
        let value = producer();
        assert_eq!(value["method"], "POST");
        assert_eq!(value["path"], "/orders");
        assert_eq!(value["headers"]["x-request-id"], "r-1");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_memory_usage_positive_on_linux() {
        let value = memory_usage()();
        assert!(value.as_u64().unwrap() > 0);
    }
}
