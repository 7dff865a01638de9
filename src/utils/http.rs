// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create a configured asynchronous HTTP client.
///
/// Every request carries the configured user agent and content-negotiation
/// headers.
pub fn create_async_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value("http.accept", &config.accept)?);
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value("http.accept_language", &config.accept_language)?,
    );

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::config(format!("{field} is not a valid header value: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_with_defaults() {
        assert!(create_async_client(&HttpConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_invalid_header_value() {
        let config = HttpConfig {
            accept_language: "en\nX-Injected: 1".into(),
            ..HttpConfig::default()
        };
        assert!(create_async_client(&config).is_err());
    }
}
