//! Blocking HTTP access shared by the network sources

use std::time::Duration;

use reqwest::blocking::Client;

use crate::types::{PizarraError, Result};

/// Browser-like agent; several quote pages reject unknown clients
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Thin wrapper over a blocking reqwest client with a fixed timeout.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout_ms: u64,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout_ms`.
    ///
    /// With `system_proxy` off, proxy settings from the environment are ignored.
    pub fn new(timeout_ms: u64, system_proxy: bool) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent(USER_AGENT);
        if !system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(|e| {
            PizarraError::Transport(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client, timeout_ms })
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// GET `url` and return the body. Non-2xx statuses are transport errors.
    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(PizarraError::Transport(format!("HTTP {} from {}", status, url)));
        }
        Ok(response.bytes()?.to_vec())
    }

    /// GET `url` as text, replacing invalid UTF-8
    pub fn get_text(&self, url: &str) -> Result<String> {
        let bytes = self.get_bytes(url)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
