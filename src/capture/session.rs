// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Captured session envelope

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single request captured in a run
///
/// Serializes to the delivery envelope
/// `{"headers": {...}, "body": "...", "capturedAt": "<RFC 3339>"}`.
/// Not `Clone`: ownership moves from the coordinator to delivery.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedSession {
    headers: HashMap<String, String>,
    body: String,
    captured_at: DateTime<Utc>,
}

impl CapturedSession {
    /// Build a session stamped with the current time
    pub fn new(headers: HashMap<String, String>, body: impl Into<String>) -> Self {
        Self {
            headers,
            body: body.into(),
            captured_at: Utc::now(),
        }
    }

    /// Headers as captured (credential possibly overwritten from the jar)
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Header lookup, case-insensitive on the name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Request payload
    pub fn body(&self) -> &str {
        &self.body
    }

    /// When the capture resolved
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}
