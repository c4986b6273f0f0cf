// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Login flow
//!
//! Fills the login form when credentials are configured, otherwise leaves
//! the operator to log in by hand, then waits for the authenticated home URL.

use std::fmt;
use std::time::Duration;

use regex::Regex;
use tokio::time::Instant;

use super::driver::PageDriver;
use crate::error::{Error, Result};

/// Default login page
pub const DEFAULT_LOGIN_URL: &str = "https://www.facebook.com/login/";
/// URL pattern of the authenticated home page
pub const DEFAULT_HOME_PATTERN: &str = r"^https://www\.facebook\.com/?$";

const EMAIL_SELECTOR: &str = r#"input[name="email"]"#;
const PASSWORD_SELECTOR: &str = r#"input[name="pass"]"#;

/// Login configuration
#[derive(Clone)]
pub struct LoginConfig {
    /// Page with the login form
    pub login_url: String,
    /// Account email
    pub email: Option<String>,
    /// Account password
    pub password: Option<String>,
    /// Regex the URL must match once logged in
    pub home_pattern: String,
    /// How long to wait for the home page (covers manual logins and CAPTCHAs)
    pub login_timeout: Duration,
    /// URL poll interval
    pub poll_interval: Duration,
    /// How long to wait for the email field
    pub form_timeout: Duration,
    /// Pause between filling the form and submitting it
    pub settle_delay: Duration,
    /// Accessible name of the submit button
    pub button_label: String,
    /// How long to wait for that button to become visible
    pub button_timeout: Duration,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            email: None,
            password: None,
            home_pattern: DEFAULT_HOME_PATTERN.to_string(),
            login_timeout: Duration::from_secs(10 * 60),
            poll_interval: Duration::from_millis(500),
            form_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_millis(1500),
            button_label: "log in".to_string(),
            button_timeout: Duration::from_secs(8),
        }
    }
}

impl fmt::Debug for LoginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginConfig")
            .field("login_url", &self.login_url)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("home_pattern", &self.home_pattern)
            .field("login_timeout", &self.login_timeout)
            .finish_non_exhaustive()
    }
}

impl LoginConfig {
    /// Create a new login config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set credentials
    pub fn credentials(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self.password = Some(password.into());
        self
    }

    /// Set login URL
    pub fn login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into();
        self
    }

    /// Set home URL pattern
    pub fn home_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.home_pattern = pattern.into();
        self
    }

    /// Set login timeout
    pub fn login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Email and password, when both are set and non-empty
    pub fn login_credentials(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some((email, password))
            }
            _ => None,
        }
    }
}

/// Drives a page through the login form
#[derive(Debug, Clone)]
pub struct LoginFlow {
    config: LoginConfig,
    home: Regex,
}

impl LoginFlow {
    /// Create a login flow, compiling the home pattern
    pub fn new(config: LoginConfig) -> Result<Self> {
        let home = Regex::new(&config.home_pattern)
            .map_err(|e| Error::Config(format!("Invalid home URL pattern: {}", e)))?;
        Ok(Self { config, home })
    }

    /// Get the configuration
    pub fn config(&self) -> &LoginConfig {
        &self.config
    }

    /// Whether `url` is the authenticated home page
    pub fn is_home(&self, url: &str) -> bool {
        self.home.is_match(url)
    }

    /// Log in and wait until the page reaches the home URL
    pub async fn run<D: PageDriver + ?Sized>(&self, page: &D) -> Result<()> {
        page.navigate(&self.config.login_url).await?;

        match self.config.login_credentials() {
            Some((email, password)) => self.submit_credentials(page, email, password).await?,
            None => tracing::info!("No credentials configured; complete login manually in the browser window"),
        }

        tracing::info!(
            timeout_ms = self.config.login_timeout.as_millis() as u64,
            "Waiting for login to complete"
        );
        self.wait_for_home(page).await?;
        tracing::info!("Login detected");
        Ok(())
    }

    async fn submit_credentials<D: PageDriver + ?Sized>(
        &self,
        page: &D,
        email: &str,
        password: &str,
    ) -> Result<()> {
        page.wait_for_selector(EMAIL_SELECTOR, self.config.form_timeout)
            .await?;
        page.fill(EMAIL_SELECTOR, email).await?;
        page.fill(PASSWORD_SELECTOR, password).await?;

        tokio::time::sleep(self.config.settle_delay).await;

        match page
            .click_button(&self.config.button_label, self.config.button_timeout)
            .await
        {
            Ok(()) => tracing::info!("Clicked login button"),
            Err(e @ Error::Timeout { .. }) => {
                tracing::info!(error = %e, "No visible login button; submitting form directly");
                page.submit_form(EMAIL_SELECTOR).await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn wait_for_home<D: PageDriver + ?Sized>(&self, page: &D) -> Result<()> {
        let deadline = Instant::now() + self.config.login_timeout;
        let mut last_url = String::new();

        loop {
            match page.current_url().await {
                Ok(url) if self.is_home(&url) => return Ok(()),
                Ok(url) => last_url = url,
                Err(Error::BrowserClosed) => return Err(Error::BrowserClosed),
                Err(e) => tracing::trace!(error = %e, "Could not read page URL"),
            }

            if Instant::now() >= deadline {
                return Err(Error::timeout_with_url(
                    "waiting for login",
                    self.config.login_timeout.as_millis() as u64,
                    last_url,
                ));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}
