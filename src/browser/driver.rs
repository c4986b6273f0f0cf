// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page driver abstraction
//!
//! The login flow and the runner only talk to a page through this trait,
//! so they can be exercised against a scripted page in tests.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::http::CookieSource;
use crate::network::RequestSource;

/// One controllable browser page
///
/// Every implementation is also a [`RequestSource`] for its outbound
/// traffic and a [`CookieSource`] for its cookie store.
#[async_trait]
pub trait PageDriver: RequestSource + CookieSource {
    /// Navigate to a URL and wait for the document to become interactive
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Current `location.href`
    async fn current_url(&self) -> Result<String>;

    /// Wait until `selector` matches an element
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Set the value of the element matching `selector`
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    /// Click the first visible button whose accessible name contains `label`
    /// (case-insensitive), waiting up to `timeout` for one to appear
    async fn click_button(&self, label: &str, timeout: Duration) -> Result<()>;

    /// Submit the form that owns the element matching `selector`
    async fn submit_form(&self, selector: &str) -> Result<()>;
}
