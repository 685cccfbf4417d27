//! Shared HTTP transport engine
//!
//! Method/header/timeout/retry plumbing behind the webhook, Slack,
//! Teams and Loki handlers. Construction validates everything; `send`
//! never returns an error, only success or failure.

use crate::core::error::{FanlogError, Result};
use reqwest::blocking::Client;
use reqwest::{Method, Url};
use std::time::Duration;

const ALLOWED_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];
const MIN_TIMEOUT_SECS: u64 = 1;
const MAX_TIMEOUT_SECS: u64 = 300;
const MAX_RETRIES: u32 = 10;

pub struct HttpTransport {
    client: Client,
    method: Method,
    headers: Vec<(String, String)>,
    retries: u32,
    retry_delay: Duration,
}

impl HttpTransport {
    /// Validated constructor. A missing `Content-Type` header defaults
    /// to `application/json`.
    pub fn new(
        method: &str,
        mut headers: Vec<(String, String)>,
        timeout_secs: u64,
        retries: u32,
        retry_delay_secs: u64,
    ) -> Result<Self> {
        let method_upper = method.to_uppercase();
        if !ALLOWED_METHODS.contains(&method_upper.as_str()) {
            return Err(FanlogError::config(
                "HttpTransport",
                format!("method '{}' is not allowed", method),
            ));
        }
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&timeout_secs) {
            return Err(FanlogError::config(
                "HttpTransport",
                format!("timeout must be {}-{}s", MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS),
            ));
        }
        if retries > MAX_RETRIES {
            return Err(FanlogError::config(
                "HttpTransport",
                format!("retries must be 0-{}", MAX_RETRIES),
            ));
        }

        if !headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FanlogError::config("HttpTransport", e.to_string()))?;

        let method = Method::from_bytes(method_upper.as_bytes())
            .map_err(|e| FanlogError::config("HttpTransport", e.to_string()))?;

        Ok(Self {
            client,
            method,
            headers,
            retries,
            retry_delay: Duration::from_secs(retry_delay_secs),
        })
    }

    /// The defaults the thin wrapper handlers start from: JSON POST,
    /// 10 s timeout, two retries one second apart.
    pub fn json_post() -> Result<Self> {
        Self::new("POST", Vec::new(), 10, 2, 1)
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Deliver the payload. Success is any status in 200-399. Failed
    /// attempts (status or transport error) are retried after
    /// `retry_delay`, with no sleep after the final attempt.
    pub fn send(&self, url: &str, payload: &str) -> bool {
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(_) => return false,
        };

        for attempt in 0..=self.retries {
            let mut request = self.client.request(self.method.clone(), url.clone());
            for (name, value) in &self.headers {
                request = request.header(name.as_str(), value.as_str());
            }
            let outcome = request.body(payload.to_string()).send();

            if let Ok(response) = outcome {
                let status = response.status().as_u16();
                if (200..400).contains(&status) {
                    return true;
                }
            }

            if attempt < self.retries {
                std::thread::sleep(self.retry_delay);
            }
        }

        false
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("method", &self.method)
            .field("retries", &self.retries)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

/// Validate a URL eagerly; handler constructors refuse bad URLs rather
/// than discovering them at send time.
pub fn validate_url(component: &str, url: &str) -> Result<()> {
    Url::parse(url)
        .map(|_| ())
        .map_err(|e| FanlogError::config(component, format!("invalid URL '{}': {}", url, e)))
}
