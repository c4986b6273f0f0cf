// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network event correlation
//!
//! Chrome reports a request in two halves: `Network.requestWillBeSent`
//! carries url, method and body, `Network.requestWillBeSentExtraInfo`
//! carries the headers actually put on the wire (including `cookie`).
//! Either half may arrive first.

use std::collections::{HashMap, VecDeque};

use serde::Deserialize;
use serde_json::Value;

use crate::network::ObservedRequest;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestWillBeSent {
    request_id: String,
    request: DevtoolsRequest,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DevtoolsRequest {
    url: String,
    method: String,
    #[serde(default)]
    headers: HashMap<String, Value>,
    post_data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtraInfo {
    request_id: String,
    #[serde(default)]
    headers: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestRef {
    request_id: String,
}

enum Half {
    Request(ObservedRequest),
    WireHeaders(HashMap<String, String>),
}

/// Turns raw `Network.*` events into [`ObservedRequest`]s
///
/// A request is emitted as soon as `requestWillBeSent` arrives, and again
/// with wire headers merged in once the extra-info half shows up. Keeps at
/// most `capacity` half-seen requests.
pub struct RequestTracker {
    pending: HashMap<String, Half>,
    order: VecDeque<String>,
    capacity: usize,
}

impl RequestTracker {
    /// Create a tracker
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Feed one protocol event; returns a request to emit, if any
    pub fn on_event(&mut self, method: &str, params: &Value) -> Option<ObservedRequest> {
        match method {
            "Network.requestWillBeSent" => {
                let event: RequestWillBeSent = parse(method, params)?;
                self.request_will_be_sent(event)
            }
            "Network.requestWillBeSentExtraInfo" => {
                let event: ExtraInfo = parse(method, params)?;
                self.extra_info(event)
            }
            "Network.loadingFinished" | "Network.loadingFailed" => {
                let event: RequestRef = parse(method, params)?;
                self.pending.remove(&event.request_id);
                None
            }
            _ => None,
        }
    }

    /// Number of half-seen requests held
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is held
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn request_will_be_sent(&mut self, event: RequestWillBeSent) -> Option<ObservedRequest> {
        let DevtoolsRequest {
            url,
            method,
            headers,
            post_data,
        } = event.request;

        let mut request = ObservedRequest::new(url, method).with_headers(stringify(headers));
        if let Some(body) = post_data {
            request = request.with_body(body);
        }

        match self.pending.remove(&event.request_id) {
            Some(Half::WireHeaders(wire)) => Some(request.with_headers(wire)),
            _ => {
                self.hold(event.request_id, Half::Request(request.clone()));
                Some(request)
            }
        }
    }

    fn extra_info(&mut self, event: ExtraInfo) -> Option<ObservedRequest> {
        let wire = stringify(event.headers);

        match self.pending.remove(&event.request_id) {
            Some(Half::Request(request)) => Some(request.with_headers(wire)),
            _ => {
                self.hold(event.request_id, Half::WireHeaders(wire));
                None
            }
        }
    }

    fn hold(&mut self, request_id: String, half: Half) {
        self.order.push_back(request_id.clone());
        self.pending.insert(request_id, half);

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.pending.remove(&oldest);
            }
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(method: &str, params: &Value) -> Option<T> {
    match T::deserialize(params) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::trace!(method, error = %e, "Unreadable network event");
            None
        }
    }
}

/// HTTP/2 pseudo-headers (`:path`, `:authority`) are not header names
fn stringify(headers: HashMap<String, Value>) -> HashMap<String, String> {
    headers
        .into_iter()
        .filter(|(name, _)| !name.starts_with(':'))
        .map(|(name, value)| match value {
            Value::String(s) => (name, s),
            other => (name, other.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn will_be_sent(id: &str) -> Value {
        json!({
            "requestId": id,
            "request": {
                "url": "https://www.facebook.com/api/graphql/",
                "method": "POST",
                "headers": { "Content-Type": "application/x-www-form-urlencoded" },
                "postData": "lsd=abc&fb_dtsg=tok"
            },
            "type": "XHR"
        })
    }

    fn extra_info(id: &str) -> Value {
        json!({
            "requestId": id,
            "headers": {
                "cookie": "c_user=1; xs=2",
                ":authority": "www.facebook.com",
                ":method": "POST",
                ":path": "/api/graphql/",
                ":scheme": "https"
            }
        })
    }

    #[test]
    fn test_base_then_wire_headers() {
        let mut tracker = RequestTracker::new(16);

        let base = tracker
            .on_event("Network.requestWillBeSent", &will_be_sent("1"))
            .unwrap();
        assert_eq!(base.method(), "POST");
        assert_eq!(base.body(), Some("lsd=abc&fb_dtsg=tok"));
        assert!(base.header("cookie").is_none());

        let merged = tracker
            .on_event("Network.requestWillBeSentExtraInfo", &extra_info("1"))
            .unwrap();
        assert_eq!(merged.header("cookie"), Some("c_user=1; xs=2"));
        assert_eq!(merged.header("content-type"), Some("application/x-www-form-urlencoded"));
        assert_eq!(merged.observed_at(), base.observed_at());
        assert!(merged.headers().keys().all(|name| !name.starts_with(':')));
        assert_eq!(merged.headers().len(), 2);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_wire_headers_first() {
        let mut tracker = RequestTracker::new(16);

        assert!(tracker
            .on_event("Network.requestWillBeSentExtraInfo", &extra_info("2"))
            .is_none());
        assert_eq!(tracker.len(), 1);

        let merged = tracker
            .on_event("Network.requestWillBeSent", &will_be_sent("2"))
            .unwrap();
        assert_eq!(merged.header("cookie"), Some("c_user=1; xs=2"));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_get_without_body() {
        let mut tracker = RequestTracker::new(16);
        let params = json!({
            "requestId": "3",
            "request": { "url": "https://www.facebook.com/", "method": "GET", "headers": {} }
        });

        let request = tracker.on_event("Network.requestWillBeSent", &params).unwrap();
        assert_eq!(request.body(), None);
    }

    #[test]
    fn test_loading_finished_forgets() {
        let mut tracker = RequestTracker::new(16);
        tracker.on_event("Network.requestWillBeSent", &will_be_sent("4"));
        tracker.on_event("Network.loadingFinished", &json!({ "requestId": "4" }));

        assert!(tracker.is_empty());
        assert!(tracker
            .on_event("Network.requestWillBeSentExtraInfo", &extra_info("4"))
            .is_none());
    }

    #[test]
    fn test_capacity_bound() {
        let mut tracker = RequestTracker::new(2);
        for id in ["a", "b", "c"] {
            tracker.on_event("Network.requestWillBeSent", &will_be_sent(id));
        }
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_malformed_and_unrelated_events() {
        let mut tracker = RequestTracker::new(16);
        assert!(tracker
            .on_event("Network.requestWillBeSent", &json!({ "requestId": 5 }))
            .is_none());
        assert!(tracker.on_event("Page.frameNavigated", &json!({})).is_none());
        assert!(tracker.is_empty());
    }
}
