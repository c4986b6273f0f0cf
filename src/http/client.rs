// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Client;

use super::request::Request;
use super::response::Response;
use super::DEFAULT_USER_AGENT;
use crate::error::Result;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Default timeout
    pub timeout: Duration,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Default headers
    pub default_headers: HeaderMap,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(super::headers::ACCEPT, HeaderValue::from_static("*/*"));

        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            default_headers,
        }
    }
}

impl HttpClientConfig {
    /// Config for talking to the local DevTools endpoint
    pub fn for_devtools() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_redirects: 0,
            ..Default::default()
        }
    }
}

/// Thin reqwest wrapper with timing and request logging
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::limited(config.max_redirects))
            .default_headers(config.default_headers.clone())
            .build()?;

        Ok(Self { client, config })
    }

    /// Execute a request
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let start = Instant::now();

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let response_time = start.elapsed().as_millis() as u64;

        let final_url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = status.as_u16(),
            time_ms = response_time,
            "HTTP response"
        );

        Ok(Response::new(status, headers, body, final_url, response_time))
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_devtools_config() {
        let client = HttpClient::with_config(HttpClientConfig::for_devtools()).unwrap();
        assert_eq!(client.config().user_agent, DEFAULT_USER_AGENT);
        assert_eq!(client.config().max_redirects, 0);
        assert_eq!(client.config().timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_execute_sends_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/version"))
            .and(header("user-agent", DEFAULT_USER_AGENT))
            .and(header("accept", "*/*"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"Browser":"Chrome/120"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::with_config(HttpClientConfig::for_devtools()).unwrap();
        let resp = client
            .execute(Request::get(format!("{}/json/version", server.uri())).unwrap())
            .await
            .unwrap();

        assert!(resp.is_success());
        assert_eq!(resp.text_lossy(), r#"{"Browser":"Chrome/120"}"#);
    }

    #[tokio::test]
    async fn test_execute_posts_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"body": "lsd=1"})))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::with_config(HttpClientConfig::default()).unwrap();
        let request = Request::post(format!("{}/hook", server.uri()))
            .unwrap()
            .json(&serde_json::json!({"body": "lsd=1"}))
            .unwrap();

        assert_eq!(client.execute(request).await.unwrap().status_code(), 202);
    }
}
