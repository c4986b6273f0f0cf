// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capture coordinator
//!
//! Races the observed-request stream against a deadline and resolves with
//! the first request the classifier lets through. The lifecycle is
//! `WAITING -> RESOLVED | TIMED_OUT`; a [`PendingCapture`] is consumed by
//! [`PendingCapture::wait`], so it cannot resolve twice.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

use super::classifier::{Classifier, RejectReason, Verdict};
use super::session::CapturedSession;
use crate::error::{Error, Result};
use crate::http::{cookie_header, CookieSource};
use crate::network::{ObservedRequest, RequestSource, Subscription};

/// Default capture deadline
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Owns the classifier and the per-run deadline
#[derive(Debug, Clone)]
pub struct CaptureCoordinator {
    classifier: Classifier,
    deadline: Duration,
}

impl CaptureCoordinator {
    /// Create a coordinator
    pub fn new(classifier: Classifier, deadline: Duration) -> Self {
        Self {
            classifier,
            deadline,
        }
    }

    /// The configured deadline
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// The classifier in use
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Subscribe to `source` and start the clock
    ///
    /// Call this before driving the page, otherwise the triggering request
    /// may go out before anyone is listening.
    pub fn arm<S: RequestSource + ?Sized>(&self, source: &S) -> PendingCapture<'_> {
        let subscription = source.subscribe();
        let deadline = Instant::now() + self.deadline;

        tracing::debug!(
            observer = subscription.id(),
            deadline_ms = self.deadline_ms(),
            "Capture armed"
        );

        PendingCapture {
            classifier: &self.classifier,
            subscription,
            deadline,
            bound_ms: self.deadline_ms(),
        }
    }

    /// Arm and wait in one step
    pub async fn capture<S: RequestSource + ?Sized>(
        &self,
        source: &S,
        cookies: Option<&dyn CookieSource>,
    ) -> Result<CapturedSession> {
        self.arm(source).wait(cookies).await
    }

    fn deadline_ms(&self) -> u64 {
        self.deadline.as_millis() as u64
    }
}

enum Step {
    Deadline,
    Event(Option<ObservedRequest>),
}

/// An armed capture waiting for its first qualifying request
pub struct PendingCapture<'a> {
    classifier: &'a Classifier,
    subscription: Subscription,
    deadline: Instant,
    bound_ms: u64,
}

impl PendingCapture<'_> {
    /// Absolute deadline of this capture
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Wait for the first qualifying request
    ///
    /// When `cookies` is given, the credential header of the winning request
    /// is replaced with a snapshot of the jar for the request's host.
    pub async fn wait(mut self, cookies: Option<&dyn CookieSource>) -> Result<CapturedSession> {
        loop {
            let step = tokio::select! {
                biased;
                _ = sleep_until(self.deadline) => Step::Deadline,
                event = self.subscription.next() => Step::Event(event),
            };

            let request = match step {
                Step::Deadline => {
                    // Requests seen in time may still be queued
                    while let Some(request) = self.subscription.try_next() {
                        if self.qualifies(&request) {
                            self.subscription.unsubscribe();
                            return self.resolve(request, cookies).await;
                        }
                    }
                    return Err(self.time_out());
                }
                Step::Event(None) => {
                    tracing::debug!("Request stream closed before a match, waiting out deadline");
                    self.subscription.unsubscribe();
                    sleep_until(self.deadline).await;
                    return Err(self.time_out());
                }
                Step::Event(Some(request)) => request,
            };

            if self.qualifies(&request) {
                self.subscription.unsubscribe();
                return self.resolve(request, cookies).await;
            }
        }
    }

    fn qualifies(&self, request: &ObservedRequest) -> bool {
        if request.observed_at() >= self.deadline {
            tracing::trace!(url = request.target(), "Ignoring request seen after deadline");
            return false;
        }

        let verdict = self.classifier.classify(request);
        log_verdict(request, &verdict);
        verdict.is_qualifying()
    }

    fn time_out(&mut self) -> Error {
        self.subscription.unsubscribe();
        tracing::warn!(deadline_ms = self.bound_ms, "Capture deadline elapsed");
        Error::capture_timeout(self.bound_ms)
    }

    async fn resolve(
        &self,
        request: ObservedRequest,
        cookies: Option<&dyn CookieSource>,
    ) -> Result<CapturedSession> {
        let host = request.host();
        let target = request.target().to_string();
        let (mut headers, body) = request.into_parts();

        if let Some(source) = cookies {
            let domain = host.ok_or_else(|| Error::cookie_fetch(&target, "target has no host"))?;

            let jar = source.cookies(&domain).await.map_err(|e| match e {
                Error::CookieFetch { .. } => e,
                other => Error::cookie_fetch(&domain, other.to_string()),
            })?;

            if jar.is_empty() {
                tracing::warn!(domain = %domain, "Cookie snapshot is empty");
            }

            let credential = &self.classifier.config().credential_header;
            headers.retain(|name, _| !name.eq_ignore_ascii_case(credential));
            headers.insert(credential.to_ascii_lowercase(), cookie_header(&jar));

            tracing::debug!(domain = %domain, cookies = jar.len(), "Credential replaced from cookie jar");
        }

        Ok(CapturedSession::new(headers, body.unwrap_or_default()))
    }
}

fn log_verdict(request: &ObservedRequest, verdict: &Verdict) {
    let url = request.target();
    let method = request.method();

    match verdict {
        Verdict::Accept => {
            tracing::info!(url, method, "Captured credentialed request");
        }
        Verdict::AcceptWithWarning(warning) => {
            tracing::warn!(url, method, reason = %warning, "Captured request with warning");
        }
        Verdict::Reject(RejectReason::WrongOperation) => {
            tracing::info!(url, method, reason = %RejectReason::WrongOperation, "Skipping request");
        }
        Verdict::Reject(
            reason @ (RejectReason::MissingCredential
            | RejectReason::EmptyPayload
            | RejectReason::NotTargetIdentity),
        ) => {
            tracing::debug!(url, method, reason = %reason, "Skipping request");
        }
        Verdict::Reject(reason) => {
            tracing::trace!(url, method, reason = %reason, "Skipping request");
        }
    }
}
