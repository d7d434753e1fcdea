// ABOUTME: Health check route handler for service monitoring
// ABOUTME: Reports service name, version, and the active backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::constants::service_names;
use crate::resources::ServerResources;

/// Health body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests
    pub status: String,
    /// Service name
    pub service: String,
    /// Crate version
    pub version: String,
    /// Active backend
    pub backend: String,
}

/// Health route definitions
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health route
    pub fn routes(resources: &Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .with_state(Arc::clone(resources))
    }

    async fn handle_health(State(resources): State<Arc<ServerResources>>) -> Json<HealthResponse> {
        Json(HealthResponse {
            status: "ok".to_owned(),
            service: service_names::COACHDESK.to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            backend: resources.config.backend.to_string(),
        })
    }
}
