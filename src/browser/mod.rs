// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser and Page API
//!
//! A Chrome process driven over the DevTools protocol, the page-level
//! driver trait, and the login flow built on it.

mod browser;
mod config;
mod connection;
mod driver;
mod events;
mod login;
mod page;
mod scripts;

pub use browser::{Browser, BrowserVersion, DevtoolsEndpoint, TargetInfo};
pub use config::{BrowserConfig, PageConfig, CHROME_CANDIDATES};
pub use connection::{Connection, EventHandler};
pub use driver::PageDriver;
pub use events::RequestTracker;
pub use login::{LoginConfig, LoginFlow, DEFAULT_HOME_PATTERN, DEFAULT_LOGIN_URL};
pub use page::Page;
