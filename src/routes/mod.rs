// ABOUTME: Route module organization for the coachdesk HTTP surface
// ABOUTME: Assembles API routes, static pages, and the layer stack with the request gate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the coachdesk gateway
//!
//! Each domain module contains only route definitions and thin handlers that
//! delegate to the session manager, admin service, or typing hub. Anything
//! not matched by an API route is served from the static page directory.

/// Account routes for the signed-in user
pub mod account;
/// Admin role and account routes
pub mod admin;
/// Sign-in, callback, and sign-out routes
pub mod auth;
/// Health check route
pub mod health;
/// Typing indicator routes
pub mod typing;

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, Router};
use tower_http::services::{ServeDir, ServeFile};

pub use account::AccountRoutes;
pub use admin::AdminRoutes;
pub use auth::AuthRoutes;
pub use health::HealthRoutes;
pub use typing::TypingRoutes;

use crate::gate::request_gate;
use crate::middleware::{request_id_layers, setup_cors, trace_layer};
use crate::resources::ServerResources;

/// Build the full application router.
///
/// Layers from the outside in: CORS, request ID, tracing, request gate.
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    let static_dir = &resources.config.static_dir;
    let pages = ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(static_dir.join("404.html")));

    let (set_request_id, propagate_request_id) = request_id_layers();

    Router::new()
        .merge(HealthRoutes::routes(resources))
        .merge(AuthRoutes::routes(resources))
        .merge(AccountRoutes::routes(resources))
        .merge(AdminRoutes::routes(resources))
        .merge(TypingRoutes::routes(resources))
        .fallback_service(pages)
        .layer(from_fn_with_state(
            Arc::clone(&resources.gate),
            request_gate,
        ))
        .layer(trace_layer())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .layer(setup_cors(&resources.config.cors))
}
