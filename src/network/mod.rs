// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Outbound request observation
//!
//! Request snapshots and the subscribe/unsubscribe plumbing between a
//! browser driver and whoever is watching its traffic.

mod event;
mod observer;

pub use event::ObservedRequest;
pub use observer::{ObserverId, ObserverRegistry, RequestSource, Subscription};
