// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Sessiontap - Authenticated Request Capture
//!
//! Drives a local Chrome through a login, watches the traffic it sends, and
//! relays the first credentialed API call it sees to a collector webhook.
//!
//! ## Features
//!
//! - Request classification: endpoint, method, credential and payload gates
//!   with an optional strict intent filter
//! - Capture coordination: first match wins, raced against a deadline
//! - Cookie snapshot: replace the captured credential with the live jar
//! - Chrome DevTools driver: launch, navigate, evaluate, observe requests
//! - Webhook delivery: one JSON POST, no retries
//!
//! ## Example
//!
//! ```rust,no_run
//! use sessiontap::{RunConfig, Runner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = Runner::new(RunConfig::new("https://collector.example.com/hook"))?;
//!     let receipt = runner.run().await?;
//!     println!("Webhook answered {}", receipt.status);
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod capture;
pub mod cli;
pub mod config;
pub mod delivery;
pub mod error;
pub mod http;
pub mod network;
pub mod runner;

// Re-exports for convenience

// Browser and Page
pub use browser::{Browser, BrowserConfig, LoginConfig, LoginFlow, Page, PageConfig, PageDriver};

// Capture
pub use capture::{
    CaptureCoordinator, CapturedSession, Classifier, ClassifierConfig, IntentFilter,
    PendingCapture, RejectReason, Verdict, Warning,
};

// Configuration
pub use cli::Cli;
pub use config::RunConfig;

// Delivery
pub use delivery::{DeliveryReceipt, Webhook};

// Errors
pub use error::{Error, Result};

// HTTP
pub use http::{Cookie, CookieJar, CookieSource, HttpClient};

// Network
pub use network::{ObservedRequest, ObserverRegistry, RequestSource, Subscription};

// Pipeline
pub use runner::Runner;

/// Sessiontap version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
