// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Run configuration

use std::time::Duration;

use crate::browser::{BrowserConfig, LoginConfig, PageConfig};
use crate::capture::{ClassifierConfig, DEFAULT_CAPTURE_TIMEOUT};
use crate::error::{Error, Result};

/// Page whose API traffic is captured
pub const DEFAULT_FEATURE_URL: &str = "https://www.facebook.com/marketplace/";

/// Everything one capture run needs
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Per-page DevTools settings
    pub page: PageConfig,
    /// Login flow settings
    pub login: LoginConfig,
    /// Request classification
    pub classifier: ClassifierConfig,
    /// How long to wait for a qualifying request after arming
    pub capture_timeout: Duration,
    /// Page visited after login to trigger the API calls
    pub feature_url: String,
    /// Collector endpoint
    pub webhook_url: String,
    /// Replace the captured credential with the browser's cookie jar
    pub cookie_snapshot: bool,
}

impl RunConfig {
    /// Config with defaults for everything except the webhook
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            browser: BrowserConfig::default(),
            page: PageConfig::default(),
            login: LoginConfig::default(),
            classifier: ClassifierConfig::default(),
            capture_timeout: DEFAULT_CAPTURE_TIMEOUT,
            feature_url: DEFAULT_FEATURE_URL.to_string(),
            webhook_url: webhook_url.into(),
            cookie_snapshot: true,
        }
    }

    /// Set browser config
    pub fn browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }

    /// Set login config
    pub fn login(mut self, login: LoginConfig) -> Self {
        self.login = login;
        self
    }

    /// Set classifier config
    pub fn classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set capture deadline
    pub fn capture_timeout(mut self, timeout: Duration) -> Self {
        self.capture_timeout = timeout;
        self
    }

    /// Set feature URL
    pub fn feature_url(mut self, url: impl Into<String>) -> Self {
        self.feature_url = url.into();
        self
    }

    /// Enable or disable the cookie-jar snapshot
    pub fn cookie_snapshot(mut self, enabled: bool) -> Self {
        self.cookie_snapshot = enabled;
        self
    }

    /// Check the settings that would otherwise only fail mid-run
    pub fn validate(&self) -> Result<()> {
        if self.webhook_url.trim().is_empty() {
            return Err(Error::Config("Webhook URL is required".to_string()));
        }
        if self.capture_timeout.is_zero() {
            return Err(Error::Config("Capture timeout must be positive".to_string()));
        }
        if self.login.login_timeout.is_zero() {
            return Err(Error::Config("Login timeout must be positive".to_string()));
        }

        for (name, value) in [("login", &self.login.login_url), ("feature", &self.feature_url)] {
            url::Url::parse(value)
                .map_err(|e| Error::Config(format!("Invalid {} URL '{}': {}", name, value, e)))?;
        }

        if self.classifier.endpoint_marker.is_empty() {
            return Err(Error::Config("Endpoint marker must not be empty".to_string()));
        }
        if self.classifier.credential_header.trim().is_empty() {
            return Err(Error::Config("Credential header must not be empty".to_string()));
        }

        if let Some(ref intent) = self.classifier.intent {
            if intent.identity_marker.trim().is_empty() {
                return Err(Error::Config(
                    "Strict intent needs an identity marker".to_string(),
                ));
            }
            if intent.operation_markers.iter().all(|m| m.trim().is_empty()) {
                return Err(Error::Config(
                    "Strict intent needs at least one operation marker".to_string(),
                ));
            }
        }

        if self.login.email.is_some() != self.login.password.is_some() {
            tracing::warn!("Only one of email/password set; login will be manual");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::IntentFilter;

    #[test]
    fn test_defaults_validate() {
        let config = RunConfig::new("https://collector.example.com/hook");
        config.validate().unwrap();

        assert_eq!(config.capture_timeout, Duration::from_millis(30_000));
        assert_eq!(config.login.login_timeout, Duration::from_secs(600));
        assert_eq!(config.feature_url, DEFAULT_FEATURE_URL);
        assert!(config.cookie_snapshot);
        assert!(!config.classifier.is_strict());
    }

    #[test]
    fn test_missing_webhook() {
        assert!(matches!(RunConfig::new("  ").validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_capture_timeout() {
        let config = RunConfig::new("https://c.example.com").capture_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_bad_feature_url() {
        let config = RunConfig::new("https://c.example.com").feature_url("marketplace");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("feature"));
    }

    #[test]
    fn test_strict_requires_markers() {
        let config = RunConfig::new("https://c.example.com")
            .classifier(ClassifierConfig::new().strict(IntentFilter::new("__user=1", vec![])));
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = RunConfig::new("https://c.example.com").classifier(
            ClassifierConfig::new().strict(IntentFilter::new("", vec!["Query".to_string()])),
        );
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = RunConfig::new("https://c.example.com").classifier(
            ClassifierConfig::new().strict(IntentFilter::new("__user=1", vec!["Query".to_string()])),
        );
        config.validate().unwrap();
    }
}
