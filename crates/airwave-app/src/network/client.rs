//! Shared HTTP client wrapper
//!
//! Blocking `reqwest` client with the Airwave user agent and timeouts.
//! Non-2xx responses are errors.

use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::config::network::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, USER_AGENT};
use crate::error::Result;

/// Shared HTTP client with standard configuration
pub struct HttpClient {
    inner: reqwest::blocking::Client,
}

impl HttpClient {
    /// Create a new client with default Airwave settings
    pub fn new() -> Result<Self> {
        let inner = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .build()?;
        Ok(Self { inner })
    }

    /// GET a URL with query parameters and deserialize the JSON response
    pub fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        let resp = self.inner.get(url).query(query).send()?.error_for_status()?;
        let data = resp.json::<T>()?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_get_json_unreachable_host() {
        let client = HttpClient::new().unwrap();
        let url = Url::parse("http://127.0.0.1:1/json").unwrap();
        let result: Result<serde_json::Value> = client.get_json(url, &[]);
        assert!(result.is_err());
    }
}
