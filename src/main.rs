// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Sessiontap CLI
//!
//! Reads settings from flags or the environment and runs one capture.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sessiontap::{Cli, Runner};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sessiontap=info")),
        )
        .init();

    let config = Cli::parse().into_run_config();

    let runner = match Runner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    tracing::info!(version = sessiontap::VERSION, "Starting capture run");

    match runner.run().await {
        Ok(receipt) => {
            tracing::info!(status = receipt.status, "Session delivered");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Capture run failed");
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
