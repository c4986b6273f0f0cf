// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page implementation

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::Instant;

use super::config::PageConfig;
use super::connection::{Connection, EventHandler};
use super::driver::PageDriver;
use super::events::RequestTracker;
use super::scripts;
use crate::error::{Error, Result};
use crate::http::{Cookie, CookieSource, SameSite};
use crate::network::{ObserverRegistry, RequestSource, Subscription};

/// Cookie as reported by `Network.getCookies`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DevtoolsCookie {
    name: String,
    value: String,
    domain: String,
    path: String,
    /// Seconds since epoch, `-1` for session cookies
    #[serde(default)]
    expires: f64,
    #[serde(default)]
    http_only: bool,
    #[serde(default)]
    secure: bool,
    same_site: Option<String>,
}

impl From<DevtoolsCookie> for Cookie {
    fn from(c: DevtoolsCookie) -> Self {
        let mut cookie = Cookie::new(c.name, c.value)
            .domain(c.domain)
            .path(c.path)
            .secure(c.secure)
            .http_only(c.http_only)
            .same_site(c.same_site.as_deref().map(SameSite::parse).unwrap_or_default());

        if c.expires > 0.0 {
            if let Some(expires) = DateTime::from_timestamp(c.expires as i64, 0) {
                cookie = cookie.expires(expires);
            }
        }
        cookie
    }
}

/// A Chrome page target driven over DevTools
pub struct Page {
    target_id: String,
    config: PageConfig,
    connection: Connection,
    observers: ObserverRegistry,
}

impl Page {
    /// Attach to a page target and enable the domains we listen on
    pub async fn attach(target_id: impl Into<String>, ws_url: &str, config: PageConfig) -> Result<Self> {
        let observers = ObserverRegistry::new();
        let tracker = Mutex::new(RequestTracker::new(config.max_pending_requests));

        let emitter = observers.clone();
        let on_event: EventHandler = Arc::new(move |method: &str, params: &Value| {
            let request = tracker.lock().on_event(method, params);
            if let Some(request) = request {
                emitter.emit(request);
            }
        });

        let connection = Connection::connect(ws_url, on_event, config.command_timeout).await?;
        connection
            .send(
                "Network.enable",
                json!({ "maxPostDataSize": config.max_post_data_size }),
            )
            .await?;
        connection.send("Page.enable", json!({})).await?;

        let target_id = target_id.into();
        tracing::debug!(target_id = %target_id, "Page attached");

        Ok(Self {
            target_id,
            config,
            connection,
            observers,
        })
    }

    /// DevTools target id
    pub fn id(&self) -> &str {
        &self.target_id
    }

    /// Get page configuration
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Registry fed with this page's outbound requests
    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    /// Evaluate an expression and return its JSON value
    pub async fn evaluate(&self, expression: &str) -> Result<Value> {
        let result = self
            .connection
            .send(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;

        if let Some(details) = result.get("exceptionDetails") {
            let message = details
                .pointer("/exception/description")
                .or_else(|| details.get("text"))
                .and_then(Value::as_str)
                .unwrap_or("script threw");
            return Err(Error::js(message));
        }

        Ok(result.pointer("/result/value").cloned().unwrap_or(Value::Null))
    }

    /// Evaluate `script` until `ready` accepts its value
    async fn poll_until(
        &self,
        script: &str,
        timeout: Duration,
        operation: &str,
        ready: impl Fn(&Value) -> bool,
    ) -> Result<()> {
        let deadline = Instant::now() + timeout;

        loop {
            match self.evaluate(script).await {
                Ok(value) if ready(&value) => return Ok(()),
                Ok(_) => {}
                Err(e @ (Error::BrowserClosed | Error::Transport(_))) => return Err(e),
                // Execution context churns while a document loads
                Err(e) => tracing::trace!(operation, error = %e, "Poll evaluation failed"),
            }

            if Instant::now() >= deadline {
                return Err(Error::timeout(operation, timeout.as_millis() as u64));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn expect_match(&self, script: String, selector: &str) -> Result<()> {
        match self.evaluate(&script).await? {
            Value::Bool(true) => Ok(()),
            _ => Err(Error::Dom(format!("No element matches {}", selector))),
        }
    }
}

impl RequestSource for Page {
    fn subscribe(&self) -> Subscription {
        self.observers.subscribe()
    }
}

#[async_trait]
impl CookieSource for Page {
    async fn cookies(&self, domain: &str) -> Result<Vec<Cookie>> {
        let result = self
            .connection
            .send(
                "Network.getCookies",
                json!({ "urls": [format!("https://{}/", domain)] }),
            )
            .await
            .map_err(|e| Error::cookie_fetch(domain, e.to_string()))?;

        let cookies: Vec<DevtoolsCookie> = serde_json::from_value(
            result.get("cookies").cloned().unwrap_or(Value::Array(vec![])),
        )
        .map_err(|e| Error::cookie_fetch(domain, e.to_string()))?;

        Ok(cookies.into_iter().map(Cookie::from).collect())
    }
}

#[async_trait]
impl PageDriver for Page {
    async fn navigate(&self, url: &str) -> Result<()> {
        tracing::debug!(url, "Navigating");

        let result = self
            .connection
            .send("Page.navigate", json!({ "url": url }))
            .await
            .map_err(|e| match e {
                Error::Protocol(reason) => Error::navigation_failed(url, reason),
                other => other,
            })?;

        if let Some(reason) = result.get("errorText").and_then(Value::as_str) {
            if !reason.is_empty() {
                return Err(Error::navigation_failed(url, reason));
            }
        }

        self.poll_until(
            scripts::READY_STATE,
            self.config.command_timeout,
            "waiting for document",
            |state| matches!(state.as_str(), Some("interactive" | "complete")),
        )
        .await
        .map_err(|e| match e {
            Error::Timeout { operation, duration_ms, .. } => Error::timeout_with_url(operation, duration_ms, url),
            other => other,
        })
    }

    async fn current_url(&self) -> Result<String> {
        match self.evaluate(scripts::LOCATION_HREF).await? {
            Value::String(href) => Ok(href),
            other => Err(Error::Protocol(format!("location.href evaluated to {}", other))),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.poll_until(
            &scripts::selector_exists(selector),
            timeout,
            &format!("waiting for selector {}", selector),
            |found| found.as_bool() == Some(true),
        )
        .await
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        self.expect_match(scripts::fill(selector, value), selector).await
    }

    async fn click_button(&self, label: &str, timeout: Duration) -> Result<()> {
        self.poll_until(
            &scripts::click_button(label),
            timeout,
            &format!("waiting for visible '{}' button", label),
            |clicked| clicked.as_bool() == Some(true),
        )
        .await
    }

    async fn submit_form(&self, selector: &str) -> Result<()> {
        self.expect_match(scripts::submit_form(selector), selector).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_devtools_cookie_conversion() {
        let raw = json!({
            "name": "xs",
            "value": "abc",
            "domain": ".facebook.com",
            "path": "/",
            "expires": 1893456000.5,
            "size": 5,
            "httpOnly": true,
            "secure": true,
            "session": false,
            "sameSite": "None",
            "priority": "Medium"
        });

        let cookie: Cookie = serde_json::from_value::<DevtoolsCookie>(raw).unwrap().into();
        assert_eq!(cookie.name, "xs");
        assert_eq!(cookie.value, "abc");
        assert_eq!(cookie.domain, ".facebook.com");
        assert!(cookie.secure);
        assert!(cookie.http_only);
        assert_eq!(cookie.same_site, SameSite::None);
        assert_eq!(cookie.expires.map(|e| e.timestamp()), Some(1893456000));
    }

    #[test]
    fn test_session_cookie_has_no_expiry() {
        let raw = json!({
            "name": "c_user",
            "value": "1000",
            "domain": ".facebook.com",
            "path": "/",
            "expires": -1,
            "secure": true,
            "sameSite": "Lax"
        });

        let cookie: Cookie = serde_json::from_value::<DevtoolsCookie>(raw).unwrap().into();
        assert!(cookie.expires.is_none());
        assert!(!cookie.http_only);
        assert_eq!(cookie.same_site, SameSite::Lax);
    }
}
