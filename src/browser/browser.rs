// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser implementation
//!
//! Spawns a local Chrome/Chromium with remote debugging enabled and hands
//! out DevTools-driven [`Page`]s.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use tempfile::TempDir;
use tokio::process::{Child, Command};
use tokio::time::Instant;
use url::Url;

use super::config::{BrowserConfig, PageConfig, CHROME_CANDIDATES};
use super::page::Page;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, Request};

/// File Chrome writes into the profile once the debugging port is bound
const DEVTOOLS_PORT_FILE: &str = "DevToolsActivePort";

/// `/json/version` response
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "Protocol-Version", default)]
    pub protocol_version: String,
}

/// Entry of `/json/list`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub url: String,
    pub web_socket_debugger_url: Option<String>,
}

/// HTTP side of the DevTools endpoint
#[derive(Clone)]
pub struct DevtoolsEndpoint {
    base: Url,
    client: HttpClient,
}

impl DevtoolsEndpoint {
    /// Endpoint at `base` (e.g. `http://127.0.0.1:9222/`)
    pub fn new(base: Url) -> Result<Self> {
        Ok(Self {
            base,
            client: HttpClient::with_config(HttpClientConfig::for_devtools())?,
        })
    }

    /// Base URL
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Browser product and protocol version
    pub async fn version(&self) -> Result<BrowserVersion> {
        self.fetch(Request::get(self.base.join("json/version")?)?).await
    }

    /// First page target nobody is attached to, opening one if needed
    pub async fn page_target(&self) -> Result<TargetInfo> {
        let targets: Vec<TargetInfo> = self.fetch(Request::get(self.base.join("json/list")?)?).await?;

        if let Some(target) = targets
            .into_iter()
            .find(|t| t.kind == "page" && t.web_socket_debugger_url.is_some())
        {
            return Ok(target);
        }

        tracing::debug!("No free page target, opening one");
        self.fetch(Request::put(self.base.join("json/new?about:blank")?)?)
            .await
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, request: Request) -> Result<T> {
        let response = self.client.execute(request).await?;
        if !response.is_success() {
            return Err(Error::Protocol(format!(
                "DevTools endpoint {} returned {}",
                response.url,
                response.status_code()
            )));
        }
        response.json()
    }
}

/// A running Chrome process
pub struct Browser {
    config: BrowserConfig,
    page_config: PageConfig,
    endpoint: DevtoolsEndpoint,
    process: Mutex<Option<Child>>,
    profile: Mutex<Option<TempDir>>,
    closed: RwLock<bool>,
}

impl Browser {
    /// Launch a browser
    pub async fn launch(config: BrowserConfig) -> Result<Self> {
        Self::launch_with_page_config(config, PageConfig::default()).await
    }

    /// Launch a browser whose pages use `page_config`
    pub async fn launch_with_page_config(config: BrowserConfig, page_config: PageConfig) -> Result<Self> {
        let executable = match config.executable.clone() {
            Some(path) => path,
            None => find_executable(CHROME_CANDIDATES, std::env::var_os("PATH").as_deref())
                .ok_or_else(|| {
                    Error::Launch("No Chrome/Chromium binary found on PATH; set CHROME_PATH".to_string())
                })?,
        };

        let (profile, data_dir) = match config.user_data_dir.clone() {
            Some(dir) => (None, dir),
            None => {
                let temp = tempfile::Builder::new().prefix("sessiontap-").tempdir()?;
                let dir = temp.path().to_path_buf();
                (Some(temp), dir)
            }
        };
        // A leftover file from an earlier run would point at a dead port
        let _ = std::fs::remove_file(data_dir.join(DEVTOOLS_PORT_FILE));

        tracing::info!(
            executable = %executable.display(),
            headless = config.headless,
            "Launching browser"
        );

        let mut child = Command::new(&executable)
            .args(config.launch_args(&data_dir))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Launch(format!("{}: {}", executable.display(), e)))?;

        let port = match wait_for_port(&mut child, &data_dir, config.launch_timeout).await {
            Ok(port) => port,
            Err(e) => {
                let _ = child.kill().await;
                return Err(e);
            }
        };

        let endpoint = DevtoolsEndpoint::new(Url::parse(&format!("http://127.0.0.1:{}/", port))?)?;
        match endpoint.version().await {
            Ok(version) => tracing::info!(
                browser = %version.browser,
                protocol = %version.protocol_version,
                port,
                "Browser ready"
            ),
            Err(e) => tracing::warn!(error = %e, "Could not read browser version"),
        }

        Ok(Self {
            config,
            page_config,
            endpoint,
            process: Mutex::new(Some(child)),
            profile: Mutex::new(profile),
            closed: RwLock::new(false),
        })
    }

    /// Attach to a page target
    pub async fn new_page(&self) -> Result<Page> {
        if self.is_closed() {
            return Err(Error::BrowserClosed);
        }

        let target = self.endpoint.page_target().await?;
        let ws_url = target.web_socket_debugger_url.ok_or_else(|| {
            Error::Protocol(format!("Target {} has no debugger URL", target.id))
        })?;

        Page::attach(target.id, &ws_url, self.page_config.clone()).await
    }

    /// Get browser config
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// DevTools HTTP endpoint
    pub fn endpoint(&self) -> &DevtoolsEndpoint {
        &self.endpoint
    }

    /// Check if browser is closed
    pub fn is_closed(&self) -> bool {
        *self.closed.read()
    }

    /// Kill the process and remove the temporary profile
    pub async fn close(&self) {
        *self.closed.write() = true;

        let child = self.process.lock().take();
        if let Some(mut child) = child {
            if let Err(e) = child.kill().await {
                tracing::debug!(error = %e, "Browser process already gone");
            }
        }

        let profile = self.profile.lock().take();
        if let Some(profile) = profile {
            if let Err(e) = profile.close() {
                tracing::debug!(error = %e, "Could not remove browser profile");
            }
        }

        tracing::info!("Browser closed");
    }
}

impl Drop for Browser {
    fn drop(&mut self) {
        if let Some(child) = self.process.get_mut().as_mut() {
            let _ = child.start_kill();
        }
    }
}

/// First candidate found in the `PATH`-style list `path`
fn find_executable(candidates: &[&str], path: Option<&OsStr>) -> Option<PathBuf> {
    let path = path?;
    std::env::split_paths(path)
        .flat_map(|dir| candidates.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

/// Port recorded in the profile's `DevToolsActivePort` file
fn read_devtools_port(data_dir: &Path) -> Option<u16> {
    let contents = std::fs::read_to_string(data_dir.join(DEVTOOLS_PORT_FILE)).ok()?;
    contents.lines().next()?.trim().parse().ok()
}

async fn wait_for_port(child: &mut Child, data_dir: &Path, timeout: Duration) -> Result<u16> {
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(port) = read_devtools_port(data_dir) {
            return Ok(port);
        }
        if let Some(status) = child.try_wait()? {
            return Err(Error::Launch(format!("Browser exited during startup ({})", status)));
        }
        if Instant::now() >= deadline {
            return Err(Error::timeout(
                "waiting for DevTools port",
                timeout.as_millis() as u64,
            ));
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_read_devtools_port() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_devtools_port(dir.path()), None);

        std::fs::write(
            dir.path().join(DEVTOOLS_PORT_FILE),
            "41235\n/devtools/browser/8d6c-uuid\n",
        )
        .unwrap();
        assert_eq!(read_devtools_port(dir.path()), Some(41235));
    }

    #[test]
    fn test_read_devtools_port_garbage() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEVTOOLS_PORT_FILE), "").unwrap();
        assert_eq!(read_devtools_port(dir.path()), None);
    }

    #[test]
    fn test_find_executable() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(second.path().join("chromium"), "").unwrap();

        let path = std::env::join_paths([first.path(), second.path()]).unwrap();
        let found = find_executable(CHROME_CANDIDATES, Some(path.as_os_str()));

        assert_eq!(found, Some(second.path().join("chromium")));
        assert_eq!(find_executable(CHROME_CANDIDATES, None), None);
    }

    #[tokio::test]
    async fn test_page_target_prefers_free_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "SW", "type": "service_worker", "url": "", "webSocketDebuggerUrl": "ws://x/sw" },
                { "id": "BUSY", "type": "page", "url": "about:blank" },
                { "id": "P1", "type": "page", "url": "about:blank", "webSocketDebuggerUrl": "ws://127.0.0.1/devtools/page/P1" }
            ])))
            .mount(&server)
            .await;

        let endpoint = DevtoolsEndpoint::new(Url::parse(&server.uri()).unwrap()).unwrap();
        let target = endpoint.page_target().await.unwrap();

        assert_eq!(target.id, "P1");
        assert_eq!(
            target.web_socket_debugger_url.as_deref(),
            Some("ws://127.0.0.1/devtools/page/P1")
        );
    }

    #[tokio::test]
    async fn test_page_target_opens_new() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/json/new"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "NEW", "type": "page", "url": "about:blank",
                "webSocketDebuggerUrl": "ws://127.0.0.1/devtools/page/NEW"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = DevtoolsEndpoint::new(Url::parse(&server.uri()).unwrap()).unwrap();
        assert_eq!(endpoint.page_target().await.unwrap().id, "NEW");
    }

    #[tokio::test]
    async fn test_version_and_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Browser": "Chrome/126.0.6478.126",
                "Protocol-Version": "1.3",
                "webSocketDebuggerUrl": "ws://127.0.0.1/devtools/browser/abc"
            })))
            .mount(&server)
            .await;

        let endpoint = DevtoolsEndpoint::new(Url::parse(&server.uri()).unwrap()).unwrap();
        let version = endpoint.version().await.unwrap();
        assert_eq!(version.browser, "Chrome/126.0.6478.126");
        assert_eq!(version.protocol_version, "1.3");

        // Nothing mounted for /json/list
        assert!(matches!(endpoint.page_target().await, Err(Error::Protocol(_))));
    }
}
