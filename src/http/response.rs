// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response type

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};

/// HTTP response representation
#[derive(Debug, Clone)]
pub struct Response {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
    /// Final URL (after redirects)
    pub url: Url,
    /// Response time in milliseconds
    pub response_time_ms: u64,
}

impl Response {
    /// Create a new response
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        url: Url,
        response_time_ms: u64,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            url,
            response_time_ms,
        }
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Get body as text, lossy conversion
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: StatusCode, body: &'static str) -> Response {
        Response::new(
            status,
            HeaderMap::new(),
            Bytes::from(body),
            Url::parse("https://example.com").unwrap(),
            100,
        )
    }

    #[test]
    fn test_response_status() {
        let resp = response(StatusCode::OK, "");
        assert!(resp.is_success());
        assert_eq!(resp.status_code(), 200);

        assert!(!response(StatusCode::BAD_GATEWAY, "").is_success());
    }

    #[test]
    fn test_response_json() {
        let resp = response(StatusCode::OK, r#"[{"id":"A1","type":"page"}]"#);
        let targets: Vec<serde_json::Value> = resp.json().unwrap();
        assert_eq!(targets[0]["type"], "page");
    }
}
