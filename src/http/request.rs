// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request type

use crate::error::Result;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use url::Url;

/// HTTP request representation
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Request URL
    pub url: Url,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Option<Bytes>,
}

impl Request {
    /// Create a new request with arbitrary method
    pub fn new(method: Method, url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            method,
            url: Url::parse(url.as_ref())?,
            headers: HeaderMap::new(),
            body: None,
        })
    }

    /// Create a new GET request
    pub fn get(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    /// Create a new POST request
    pub fn post(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::POST, url)
    }

    /// Create a new PUT request
    pub fn put(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::PUT, url)
    }

    /// Set a header; invalid names or values are skipped
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set JSON body
    pub fn json<T: Serialize>(mut self, data: &T) -> Result<Self> {
        let json = serde_json::to_vec(data)?;
        self.body = Some(Bytes::from(json));
        Ok(self.header(super::headers::CONTENT_TYPE, "application/json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_creation() {
        let req = Request::get("https://example.com/path").unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url.path(), "/path");
        assert!(req.body.is_none());
    }

    #[test]
    fn test_json_sets_content_type() {
        let req = Request::post("https://hooks.example.com/in")
            .unwrap()
            .json(&serde_json::json!({"a": 1}))
            .unwrap();

        assert_eq!(
            req.headers.get("content-type").map(|v| v.to_str().unwrap()),
            Some("application/json")
        );
        assert_eq!(req.body.as_deref(), Some(&br#"{"a":1}"#[..]));
    }

    #[test]
    fn test_invalid_header_skipped() {
        let req = Request::get("https://example.com")
            .unwrap()
            .header("bad header", "value");
        assert!(req.headers.is_empty());
    }
}
