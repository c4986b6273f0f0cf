// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! End-to-end capture run

use std::sync::Arc;

use crate::browser::{Browser, LoginFlow, PageDriver};
use crate::capture::{CaptureCoordinator, Classifier};
use crate::config::RunConfig;
use crate::delivery::{DeliveryReceipt, Webhook};
use crate::error::Result;
use crate::http::CookieSource;

/// Runs login, capture and delivery once
pub struct Runner {
    config: RunConfig,
    login: LoginFlow,
    coordinator: CaptureCoordinator,
    webhook: Webhook,
}

impl Runner {
    /// Validate the config and prepare the pipeline
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;

        let login = LoginFlow::new(config.login.clone())?;
        let coordinator = CaptureCoordinator::new(
            Classifier::new(config.classifier.clone()),
            config.capture_timeout,
        );
        let webhook = Webhook::new(&config.webhook_url)?;

        Ok(Self {
            config,
            login,
            coordinator,
            webhook,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Launch a browser, run the pipeline on its first page, close it
    pub async fn run(&self) -> Result<DeliveryReceipt> {
        let browser =
            Browser::launch_with_page_config(self.config.browser.clone(), self.config.page.clone())
                .await?;

        let result = match browser.new_page().await {
            Ok(page) => self.run_with_page(Arc::new(page)).await,
            Err(e) => Err(e),
        };

        browser.close().await;
        result
    }

    /// Run the pipeline on an already open page
    pub async fn run_with_page<D: PageDriver + 'static>(&self, page: Arc<D>) -> Result<DeliveryReceipt> {
        self.login.run(&*page).await?;

        // Subscribe before the feature page starts firing requests
        let pending = self.coordinator.arm(&*page);

        tracing::info!(url = %self.config.feature_url, "Opening feature page");
        let navigator = page.clone();
        let url = self.config.feature_url.clone();
        let navigation = tokio::spawn(async move {
            if let Err(e) = navigator.navigate(&url).await {
                tracing::debug!(error = %e, "Feature page navigation failed");
            }
        });

        let cookies: Option<&dyn CookieSource> = if self.config.cookie_snapshot {
            Some(&*page)
        } else {
            None
        };
        let outcome = pending.wait(cookies).await;
        navigation.abort();

        let session = outcome?;
        self.webhook.deliver(session).await
    }
}
