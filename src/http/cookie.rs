// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie types, an in-process cookie jar, and the cookie-source seam used by
//! the capture coordinator

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

use crate::error::Result;

/// A single HTTP cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie belongs to
    pub domain: String,
    /// Path the cookie is valid for
    pub path: String,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag (HTTPS only)
    pub secure: bool,
    /// HttpOnly flag (not accessible via JavaScript)
    pub http_only: bool,
    /// SameSite attribute
    pub same_site: SameSite,
}

/// SameSite cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SameSite {
    #[default]
    None,
    Lax,
    Strict,
}

impl SameSite {
    /// Parse the attribute value, case-insensitively
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "strict" => SameSite::Strict,
            "lax" => SameSite::Lax,
            _ => SameSite::None,
        }
    }
}

impl Cookie {
    /// Create a new cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
            same_site: SameSite::default(),
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set secure flag
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set http_only flag
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Set same_site attribute
    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp < Utc::now())
    }

    /// Check if the cookie would be sent to the given URL
    pub fn matches(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or("");
        if !self.domain_matches(host) {
            return false;
        }

        if !url.path().starts_with(&self.path) {
            return false;
        }

        if self.secure && url.scheme() != "https" {
            return false;
        }

        !self.is_expired()
    }

    fn domain_matches(&self, host: &str) -> bool {
        if self.domain.is_empty() {
            return true;
        }

        let domain = self.domain.trim_start_matches('.');
        host == domain || host.ends_with(&format!(".{}", domain))
    }

    /// Convert to cookie header format
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Render cookies as a `Cookie` header value, keeping the given order
pub fn cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .map(Cookie::to_header_value)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Anything that can produce a snapshot of the cookies stored for a domain
///
/// The browser driver implements this against the live browser profile;
/// [`CookieJar`] implements it for cookies collected in-process.
#[async_trait]
pub trait CookieSource: Send + Sync {
    /// Cookies that apply to `domain`, in the source's enumeration order
    async fn cookies(&self, domain: &str) -> Result<Vec<Cookie>>;
}

/// Thread-safe cookie storage
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    /// Cookies stored by domain, in insertion order per domain
    cookies: Arc<DashMap<String, Vec<Cookie>>>,
}

impl CookieJar {
    /// Create a new empty cookie jar
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cookie, replacing any with the same name and path
    pub fn add(&self, cookie: Cookie) {
        let mut entry = self.cookies.entry(cookie.domain.clone()).or_default();
        entry.retain(|c| c.name != cookie.name || c.path != cookie.path);
        entry.push(cookie);
    }

    /// Get all cookies for a URL
    pub fn get_cookies(&self, url: &Url) -> Vec<Cookie> {
        self.remove_expired();

        self.cookies
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|c| c.matches(url))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn remove_expired(&self) {
        for mut entry in self.cookies.iter_mut() {
            entry.value_mut().retain(|c| !c.is_expired());
        }
    }

    /// Get total cookie count
    pub fn len(&self) -> usize {
        self.cookies.iter().map(|e| e.value().len()).sum()
    }

    /// Check if jar is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CookieSource for CookieJar {
    async fn cookies(&self, domain: &str) -> Result<Vec<Cookie>> {
        let url = Url::parse(&format!("https://{}/", domain))?;
        Ok(self.get_cookies(&url))
    }
}
