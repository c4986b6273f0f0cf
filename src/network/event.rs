// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Observed request snapshot

use std::collections::HashMap;

use tokio::time::Instant;

/// One outbound request as the browser saw it leave
///
/// Built once by the driver and never mutated afterwards; the builder
/// methods are only used while the driver assembles the snapshot.
#[derive(Debug, Clone)]
pub struct ObservedRequest {
    target: String,
    method: String,
    headers: HashMap<String, String>,
    body: Option<String>,
    observed_at: Instant,
}

impl ObservedRequest {
    /// Create a new snapshot stamped with the current instant
    pub fn new(target: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            method: method.into(),
            headers: HashMap::new(),
            body: None,
            observed_at: Instant::now(),
        }
    }

    /// Add header, replacing any with the same name in another casing
    pub fn with_header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_headers([(name.into(), value.into())])
    }

    /// Add several headers; later names replace earlier ones case-insensitively
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            let name = name.into();
            self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
            self.headers.insert(name, value.into());
        }
        self
    }

    /// Add body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Absolute target URL
    pub fn target(&self) -> &str {
        &self.target
    }

    /// HTTP method token
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Headers as sent, with their original name casing
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Raw payload, if any
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// When the driver observed the request
    pub fn observed_at(&self) -> Instant {
        self.observed_at
    }

    /// Header lookup, case-insensitive on the name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Host of the target URL
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.target)
            .ok()
            .and_then(|u| u.host_str().map(String::from))
    }

    /// Body decoded as `application/x-www-form-urlencoded` pairs
    pub fn body_params(&self) -> Vec<(String, String)> {
        self.body
            .as_deref()
            .map(|body| {
                url::form_urlencoded::parse(body.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Give up the snapshot, keeping headers and body
    pub fn into_parts(self) -> (HashMap<String, String>, Option<String>) {
        (self.headers, self.body)
    }
}
