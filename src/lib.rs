// ABOUTME: Main library entry point for the coachdesk gateway
// ABOUTME: Request gate, session handling, admin role actions, and typing indicators for the dashboard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Coachdesk
//!
//! Server side of a multi-role coaching dashboard. Coaches, athletes, and
//! admins share one web app; this crate decides which of them may see which
//! pages and performs the few privileged operations the dashboard needs.
//!
//! ## Architecture
//!
//! - **Gate**: per-request session refresh, route classification, forced
//!   password change, and role checks, as axum middleware
//! - **Identity**: the external auth provider (hosted REST or in-memory)
//! - **Profiles**: role assignments (hosted REST, `SQLite`, or in-memory)
//! - **Admin**: authorized role changes and account lifecycle with
//!   compensation on partial failure
//! - **SSE**: typing indicators fanned out per conversation
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use coachdesk::config::ServerConfig;
//! use coachdesk::errors::AppResult;
//! use coachdesk::resources::ServerResources;
//! use coachdesk::server::CoachdeskServer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     let port = config.http_port;
//!     let resources = Arc::new(ServerResources::from_config(config).await?);
//!     CoachdeskServer::new(resources).run(port).await
//! }
//! ```

/// Admin role and account actions
pub mod admin;

/// Environment configuration
pub mod config;

/// Request gate
pub mod gate;

/// Shared client for the hosted auth and data backend
pub mod hosted_api;

/// Auth provider implementations
pub mod identity;

/// Structured logging setup
pub mod logging;

/// HTTP middleware and extractors
pub mod middleware;

/// Profile store implementations
pub mod profiles;

/// Shared server resources
pub mod resources;

/// HTTP routes
pub mod routes;

/// Cookie handling
pub mod security;

/// HTTP server lifecycle
pub mod server;

/// Cookie session resolution and refresh
pub mod session;

/// Server-sent event fan-out
pub mod sse;

pub use coachdesk_core::{constants, errors, models, permissions};
