// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer
//!
//! A small reqwest wrapper used for DevTools endpoint discovery and webhook
//! delivery, plus the cookie types shared with the browser driver.

mod client;
mod cookie;
mod request;
mod response;

pub use client::{HttpClient, HttpClientConfig};
pub use cookie::{cookie_header, Cookie, CookieJar, CookieSource, SameSite};
pub use request::Request;
pub use response::Response;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("sessiontap/", env!("CARGO_PKG_VERSION"));

/// Common HTTP headers
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
}
