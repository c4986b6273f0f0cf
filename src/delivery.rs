// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Webhook delivery
//!
//! One POST of the captured session as JSON. Not retried.

use url::Url;

use crate::capture::CapturedSession;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, Request};

/// What the webhook answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub status: u16,
    pub body: String,
}

/// Collector endpoint for captured sessions
#[derive(Clone)]
pub struct Webhook {
    url: Url,
    client: HttpClient,
}

impl Webhook {
    /// Webhook at `url`; only http and https are accepted
    pub fn new(url: &str) -> Result<Self> {
        Self::with_client(url, HttpClient::with_config(HttpClientConfig::default())?)
    }

    /// Webhook using an existing client
    pub fn with_client(url: &str, client: HttpClient) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| Error::Config(format!("Invalid webhook URL '{}': {}", url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Webhook URL must be http or https, got {}",
                url.scheme()
            )));
        }
        Ok(Self { url, client })
    }

    /// Target URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// POST the session envelope
    pub async fn deliver(&self, session: CapturedSession) -> Result<DeliveryReceipt> {
        let request = Request::post(self.url.as_str())?.json(&session)?;

        tracing::info!(host = self.url.host_str().unwrap_or_default(), "Sending session to webhook");
        let response = self.client.execute(request).await?;

        let status = response.status_code();
        let body = response.text_lossy();
        tracing::info!(status, body = %body, "Webhook response");

        if !response.is_success() {
            return Err(Error::Delivery { status, body });
        }
        Ok(DeliveryReceipt { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session() -> CapturedSession {
        let mut headers = HashMap::new();
        headers.insert("cookie".to_string(), "c_user=1; xs=2".to_string());
        CapturedSession::new(headers, "lsd=abc&fb_dtsg=tok")
    }

    #[tokio::test]
    async fn test_delivers_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(serde_json::json!({
                "headers": { "cookie": "c_user=1; xs=2" },
                "body": "lsd=abc&fb_dtsg=tok"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("stored"))
            .expect(1)
            .mount(&server)
            .await;

        let webhook = Webhook::new(&format!("{}/hook", server.uri())).unwrap();
        let receipt = webhook.deliver(session()).await.unwrap();

        assert_eq!(receipt, DeliveryReceipt { status: 200, body: "stored".to_string() });

        let requests = server.received_requests().await.unwrap();
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(sent["capturedAt"].is_string());
    }

    #[tokio::test]
    async fn test_non_success_is_error_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let webhook = Webhook::new(&server.uri()).unwrap();
        let err = webhook.deliver(session()).await.unwrap_err();

        match err {
            Error::Delivery { status, ref body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            ref other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.to_string(), "Webhook returned 500: boom");
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(matches!(Webhook::new("not a url"), Err(Error::Config(_))));
        assert!(matches!(Webhook::new("ftp://example.com/x"), Err(Error::Config(_))));
    }
}
