// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request classifier
//!
//! Decides whether one observed request is the credentialed API call we are
//! waiting for. Gates run cheapest first:
//!
//! 1. endpoint marker and method
//! 2. credential header present and non-blank
//! 3. body present and non-blank
//! 4. (strict mode only) identity + anti-forgery token, then operation name
//! 5. auxiliary token in the form-encoded body, which only decides between
//!    a clean accept and an accept with a warning

use std::fmt;

use crate::http::headers;
use crate::network::ObservedRequest;

/// Default endpoint marker for the target API
pub const DEFAULT_ENDPOINT_MARKER: &str = "facebook.com/api/graphql";
/// Default anti-forgery token field name
pub const DEFAULT_TOKEN_MARKER: &str = "fb_dtsg";
/// Default auxiliary token field name
pub const DEFAULT_AUXILIARY_TOKEN: &str = "lsd";

/// Strict-mode intent markers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentFilter {
    /// Form field identifying the expected account (e.g. `__user=1000`)
    pub identity_marker: String,
    /// Name of the anti-forgery token field
    pub token_marker: String,
    /// Operation-name markers for the target feature; any one must match
    pub operation_markers: Vec<String>,
}

impl IntentFilter {
    /// Create a filter with the default token marker
    pub fn new(identity_marker: impl Into<String>, operation_markers: Vec<String>) -> Self {
        Self {
            identity_marker: identity_marker.into(),
            token_marker: DEFAULT_TOKEN_MARKER.to_string(),
            operation_markers,
        }
    }

    /// Set the anti-forgery token marker
    pub fn token_marker(mut self, marker: impl Into<String>) -> Self {
        self.token_marker = marker.into();
        self
    }
}

/// Classifier configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Substring the target URL must contain
    pub endpoint_marker: String,
    /// Required HTTP method
    pub method: String,
    /// Header carrying the session credential
    pub credential_header: String,
    /// Form field whose absence downgrades an accept to a warning
    pub auxiliary_token: String,
    /// Strict intent filtering, if enabled
    pub intent: Option<IntentFilter>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint_marker: DEFAULT_ENDPOINT_MARKER.to_string(),
            method: "POST".to_string(),
            credential_header: headers::COOKIE.to_string(),
            auxiliary_token: DEFAULT_AUXILIARY_TOKEN.to_string(),
            intent: None,
        }
    }
}

impl ClassifierConfig {
    /// Create a new classifier config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint marker
    pub fn endpoint_marker(mut self, marker: impl Into<String>) -> Self {
        self.endpoint_marker = marker.into();
        self
    }

    /// Set the credential header name
    pub fn credential_header(mut self, name: impl Into<String>) -> Self {
        self.credential_header = name.into();
        self
    }

    /// Set the auxiliary token field
    pub fn auxiliary_token(mut self, field: impl Into<String>) -> Self {
        self.auxiliary_token = field.into();
        self
    }

    /// Enable strict intent filtering
    pub fn strict(mut self, intent: IntentFilter) -> Self {
        self.intent = Some(intent);
        self
    }

    /// Whether strict intent filtering is enabled
    pub fn is_strict(&self) -> bool {
        self.intent.is_some()
    }
}

/// Why a request was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Target does not contain the endpoint marker
    WrongTarget,
    /// Method is not the mutating verb
    WrongMethod,
    /// Credential header absent or blank
    MissingCredential,
    /// Body absent or blank
    EmptyPayload,
    /// Identity or anti-forgery token marker absent (strict mode)
    NotTargetIdentity,
    /// Authenticated, but none of the operation markers matched (strict mode)
    WrongOperation,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            RejectReason::WrongTarget => "not the target endpoint",
            RejectReason::WrongMethod => "wrong method",
            RejectReason::MissingCredential => "missing credential",
            RejectReason::EmptyPayload => "empty payload",
            RejectReason::NotTargetIdentity => "not the target identity",
            RejectReason::WrongOperation => "authenticated but wrong operation",
        };
        f.write_str(reason)
    }
}

/// Why an accepted request was flagged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The auxiliary token field was not found in the body
    MissingAuxiliaryToken(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingAuxiliaryToken(field) => {
                write!(f, "credential and payload present but no {} token in body", field)
            }
        }
    }
}

/// Outcome of classifying one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    AcceptWithWarning(Warning),
    Reject(RejectReason),
}

impl Verdict {
    /// Whether the request can be captured
    pub fn is_qualifying(&self) -> bool {
        !matches!(self, Verdict::Reject(_))
    }

    /// Human-readable reason, for rejects and warnings
    pub fn reason(&self) -> Option<String> {
        match self {
            Verdict::Accept => None,
            Verdict::AcceptWithWarning(warning) => Some(warning.to_string()),
            Verdict::Reject(reason) => Some(reason.to_string()),
        }
    }
}

/// Stateless request classifier
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    /// Create a classifier
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a single observed request
    pub fn classify(&self, request: &ObservedRequest) -> Verdict {
        if !request.target().contains(&self.config.endpoint_marker) {
            return Verdict::Reject(RejectReason::WrongTarget);
        }
        if !request.method().eq_ignore_ascii_case(&self.config.method) {
            return Verdict::Reject(RejectReason::WrongMethod);
        }

        let has_credential = request
            .header(&self.config.credential_header)
            .map_or(false, |v| !v.trim().is_empty());
        if !has_credential {
            return Verdict::Reject(RejectReason::MissingCredential);
        }

        let body = match request.body() {
            Some(body) if !body.trim().is_empty() => body,
            _ => return Verdict::Reject(RejectReason::EmptyPayload),
        };

        let params = request.body_params();

        if let Some(ref intent) = self.config.intent {
            if !has_marker(&params, &intent.identity_marker)
                || !has_marker(&params, &intent.token_marker)
            {
                return Verdict::Reject(RejectReason::NotTargetIdentity);
            }
            if !intent.operation_markers.iter().any(|m| body.contains(m.as_str())) {
                return Verdict::Reject(RejectReason::WrongOperation);
            }
        }

        if has_form_field(&params, &self.config.auxiliary_token) {
            Verdict::Accept
        } else {
            Verdict::AcceptWithWarning(Warning::MissingAuxiliaryToken(
                self.config.auxiliary_token.clone(),
            ))
        }
    }
}

/// Whether the form carries a non-empty value for `field`
fn has_form_field(params: &[(String, String)], field: &str) -> bool {
    params.iter().any(|(k, v)| k == field && !v.trim().is_empty())
}

/// `name=value` markers match a whole field, bare markers a field name
fn has_marker(params: &[(String, String)], marker: &str) -> bool {
    match marker.split_once('=') {
        Some((name, value)) => params.iter().any(|(k, v)| k == name && v == value),
        None => params.iter().any(|(k, _)| k == marker),
    }
}
