// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capture engine
//!
//! Classifies observed requests and resolves a single capture per run.

mod classifier;
mod coordinator;
mod session;

pub use classifier::{
    Classifier, ClassifierConfig, IntentFilter, RejectReason, Verdict, Warning,
    DEFAULT_AUXILIARY_TOKEN, DEFAULT_ENDPOINT_MARKER, DEFAULT_TOKEN_MARKER,
};
pub use coordinator::{CaptureCoordinator, PendingCapture, DEFAULT_CAPTURE_TIMEOUT};
pub use session::CapturedSession;
