// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for sessiontap
//!
//! Capture failures are kept distinguishable from generic I/O so the caller
//! can tell an operator what to do next (e.g. "no matching request arrived").

use thiserror::Error;

/// Result type alias for sessiontap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sessiontap
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Browser process could not be started
    #[error("Browser launch failed: {0}")]
    Launch(String),

    /// DOM lookup failed
    #[error("DOM error: {0}")]
    Dom(String),

    /// Script evaluated in the page threw
    #[error("JavaScript error: {message}")]
    JavaScript { message: String },

    /// Navigation error
    #[error("Navigation failed to {url}: {reason}")]
    Navigation { url: String, reason: String },

    /// Generic timeout (login wait, selector wait, DevTools command)
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        url: Option<String>,
    },

    /// No qualifying request was observed before the capture deadline
    #[error(
        "No matching request captured within {deadline_ms}ms; confirm the triggering page action was performed"
    )]
    CaptureTimeout { deadline_ms: u64 },

    /// Cookie-jar snapshot failed after a request was accepted
    #[error("Cookie fetch for {domain} failed: {reason}")]
    CookieFetch { domain: String, reason: String },

    /// DevTools protocol returned an error or malformed message
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// DevTools websocket failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Webhook answered with a non-success status
    #[error("Webhook returned {status}: {body}")]
    Delivery { status: u16, body: String },

    /// Browser closed
    #[error("Browser has been closed")]
    BrowserClosed,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a navigation error
    pub fn navigation_failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Navigation {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: None,
        }
    }

    /// Create a timeout error with URL
    pub fn timeout_with_url(
        operation: impl Into<String>,
        duration_ms: u64,
        url: impl Into<String>,
    ) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: Some(url.into()),
        }
    }

    /// Create a capture timeout error
    pub fn capture_timeout(deadline_ms: u64) -> Self {
        Error::CaptureTimeout { deadline_ms }
    }

    /// Create a cookie fetch error
    pub fn cookie_fetch(domain: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::CookieFetch {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a JavaScript error
    pub fn js<S: Into<String>>(msg: S) -> Self {
        Error::JavaScript {
            message: msg.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is any kind of timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. } | Error::CaptureTimeout { .. })
    }

    /// Check if this is the capture deadline elapsing
    pub fn is_capture_timeout(&self) -> bool {
        matches!(self, Error::CaptureTimeout { .. })
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Delivery { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Navigation { url, .. } => Some(url),
            Error::Timeout { url: Some(u), .. } => Some(u),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
