// ABOUTME: Gateway binary for the coaching dashboard
// ABOUTME: Loads configuration, initializes logging and backends, and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Coachdesk Server Binary
//!
//! Starts the request gate, auth routes, admin API, and typing indicator
//! in front of the prebuilt dashboard pages.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use coachdesk::config::{BackendKind, ServerConfig};
use coachdesk::logging;
use coachdesk::resources::ServerResources;
use coachdesk::server::CoachdeskServer;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "coachdesk-server")]
#[command(about = "Coachdesk - session and role gate for the coaching dashboard")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override backend (hosted, sqlite, memory)
    #[arg(long)]
    backend: Option<BackendKind>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env_with_backend(args.backend)?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("Starting Coachdesk gateway");
    info!("{}", config.summary());

    let port = config.http_port;
    let resources = Arc::new(ServerResources::from_config(config).await?);
    let server = CoachdeskServer::new(resources);

    if let Err(e) = server.run(port).await {
        error!("Server error: {e}");
        return Err(e.into());
    }
    Ok(())
}
