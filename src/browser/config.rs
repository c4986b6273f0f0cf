// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser and Page configuration

use std::path::PathBuf;
use std::time::Duration;

/// Executable names tried on `PATH` when no explicit binary is configured
pub const CHROME_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Chrome/Chromium binary; searched on `PATH` when unset
    pub executable: Option<PathBuf>,
    /// Run without a window
    pub headless: bool,
    /// User agent override
    pub user_agent: Option<String>,
    /// How long to wait for the DevTools endpoint after spawning
    pub launch_timeout: Duration,
    /// Extra command-line switches
    pub extra_args: Vec<String>,
    /// Profile directory; a temporary one is created when unset
    pub user_data_dir: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            headless: false,
            user_agent: None,
            launch_timeout: Duration::from_secs(20),
            extra_args: vec![],
            user_data_dir: None,
        }
    }
}

impl BrowserConfig {
    /// Create a new browser config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the browser binary
    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Run headless
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set launch timeout
    pub fn launch_timeout(mut self, timeout: Duration) -> Self {
        self.launch_timeout = timeout;
        self
    }

    /// Add a command-line switch
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Use a fixed profile directory
    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    /// Command-line switches for a launch using `data_dir` as profile
    pub fn launch_args(&self, data_dir: &std::path::Path) -> Vec<String> {
        let mut args = vec![
            "--remote-debugging-port=0".to_string(),
            format!("--user-data-dir={}", data_dir.display()),
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
        ];

        if self.headless {
            args.push("--headless=new".to_string());
        }
        if let Some(ref ua) = self.user_agent {
            args.push(format!("--user-agent={}", ua));
        }

        args.extend(self.extra_args.iter().cloned());
        args.push("about:blank".to_string());
        args
    }
}

/// Page configuration
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Timeout for a single DevTools command
    pub command_timeout: Duration,
    /// Interval between DOM/URL polls
    pub poll_interval: Duration,
    /// Largest request body Chrome will attach to events
    pub max_post_data_size: u64,
    /// Upper bound on requests kept for header correlation
    pub max_pending_requests: usize,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(100),
            max_post_data_size: 1024 * 1024,
            max_pending_requests: 1000,
        }
    }
}

impl PageConfig {
    /// Create a new page config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set command timeout
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
