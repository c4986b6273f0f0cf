// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Command-line and environment settings

use std::path::PathBuf;
use std::time::Duration;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser};

use crate::browser::{BrowserConfig, LoginConfig, DEFAULT_LOGIN_URL};
use crate::capture::{ClassifierConfig, IntentFilter};
use crate::config::{RunConfig, DEFAULT_FEATURE_URL};

/// Log in, capture one authenticated API request, and post it to a webhook
#[derive(Debug, Parser)]
#[command(name = "sessiontap", author, version, about)]
pub struct Cli {
    /// Account email; omit to log in by hand
    #[arg(long, env = "FACEBOOK_EMAIL")]
    pub email: Option<String>,

    /// Account password
    #[arg(long, env = "FACEBOOK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Collector endpoint receiving the captured session
    #[arg(long, env = "WEBHOOK_URL")]
    pub webhook_url: String,

    /// Capture deadline in milliseconds
    #[arg(long, env = "CAPTURE_TIMEOUT_MS", default_value_t = 30_000)]
    pub capture_timeout_ms: u64,

    /// How long to wait for login to complete, in milliseconds
    #[arg(long, env = "LOGIN_TIMEOUT_MS", default_value_t = 600_000)]
    pub login_timeout_ms: u64,

    /// Only accept requests for the configured identity and operations
    #[arg(long, env = "STRICT_INTENT", value_parser = FalseyValueParser::new())]
    pub strict_intent: bool,

    /// Body marker identifying the expected account (strict mode)
    #[arg(long, env = "IDENTITY_MARKER")]
    pub identity_marker: Option<String>,

    /// Comma-separated operation-name markers (strict mode)
    #[arg(long, env = "OPERATION_MARKERS", value_delimiter = ',')]
    pub operation_markers: Vec<String>,

    /// Chrome/Chromium binary
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Run the browser headless
    #[arg(long, env = "HEADLESS", value_parser = FalseyValueParser::new())]
    pub headless: bool,

    /// Login page
    #[arg(long, env = "LOGIN_URL", default_value = DEFAULT_LOGIN_URL)]
    pub login_url: String,

    /// Page that triggers the API calls once logged in
    #[arg(long, env = "FEATURE_URL", default_value = DEFAULT_FEATURE_URL)]
    pub feature_url: String,

    /// Replace the captured cookie header with the browser's cookie jar
    #[arg(
        long,
        env = "COOKIE_SNAPSHOT",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = FalseyValueParser::new()
    )]
    pub cookie_snapshot: bool,
}

impl Cli {
    /// Build the library configuration
    pub fn into_run_config(self) -> RunConfig {
        let mut browser = BrowserConfig::new().headless(self.headless);
        if let Some(path) = self.chrome_path {
            browser = browser.executable(path);
        }

        let mut login = LoginConfig::new()
            .login_url(self.login_url)
            .login_timeout(Duration::from_millis(self.login_timeout_ms));
        login.email = self.email;
        login.password = self.password;

        let mut classifier = ClassifierConfig::new();
        if self.strict_intent {
            let operations = self
                .operation_markers
                .into_iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            classifier = classifier.strict(IntentFilter::new(
                self.identity_marker.unwrap_or_default(),
                operations,
            ));
        } else if self.identity_marker.is_some() || !self.operation_markers.is_empty() {
            tracing::debug!("Intent markers ignored without strict intent");
        }

        RunConfig::new(self.webhook_url)
            .browser(browser)
            .login(login)
            .classifier(classifier)
            .capture_timeout(Duration::from_millis(self.capture_timeout_ms))
            .feature_url(self.feature_url)
            .cookie_snapshot(self.cookie_snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["sessiontap"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--webhook-url", "https://c.example.com/hook"]).into_run_config();

        assert_eq!(config.webhook_url, "https://c.example.com/hook");
        assert_eq!(config.capture_timeout, Duration::from_millis(30_000));
        assert_eq!(config.login.login_timeout, Duration::from_millis(600_000));
        assert_eq!(config.login.login_url, DEFAULT_LOGIN_URL);
        assert_eq!(config.feature_url, DEFAULT_FEATURE_URL);
        assert!(config.cookie_snapshot);
        assert!(!config.classifier.is_strict());
        config.validate().unwrap();
    }

    #[test]
    fn test_strict_intent_markers() {
        let config = parse(&[
            "--webhook-url",
            "https://c.example.com/hook",
            "--strict-intent",
            "--identity-marker",
            "__user=1000",
            "--operation-markers",
            "MarketplaceSearch, MarketplacePaginatedSearch,,",
        ])
        .into_run_config();

        let intent = config.classifier.intent.expect("strict mode");
        assert_eq!(intent.identity_marker, "__user=1000");
        assert_eq!(intent.token_marker, "fb_dtsg");
        assert_eq!(
            intent.operation_markers,
            vec!["MarketplaceSearch".to_string(), "MarketplacePaginatedSearch".to_string()]
        );
    }

    #[test]
    fn test_browser_and_snapshot_flags() {
        let config = parse(&[
            "--webhook-url",
            "https://c.example.com/hook",
            "--headless",
            "--chrome-path",
            "/opt/chromium/chrome",
            "--cookie-snapshot",
            "false",
            "--capture-timeout-ms",
            "5000",
        ])
        .into_run_config();

        assert!(config.browser.headless);
        assert_eq!(
            config.browser.executable,
            Some(PathBuf::from("/opt/chromium/chrome"))
        );
        assert!(!config.cookie_snapshot);
        assert_eq!(config.capture_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_credentials_flow_into_login() {
        let config = parse(&[
            "--webhook-url",
            "https://c.example.com/hook",
            "--email",
            "me@example.com",
            "--password",
            "hunter2",
        ])
        .into_run_config();

        assert_eq!(
            config.login.login_credentials(),
            Some(("me@example.com", "hunter2"))
        );
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let result = Cli::try_parse_from([
            "sessiontap",
            "--webhook-url",
            "https://c.example.com/hook",
            "--capture-timeout-ms",
            "soon",
        ]);
        assert!(result.is_err());
    }
}
