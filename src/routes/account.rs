// ABOUTME: Account route handlers for the signed-in user
// ABOUTME: Password change that clears a forced change, and the current user with roles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{defaults, paths};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::middleware::CurrentUser;
use crate::permissions::RoleSet;
use crate::resources::ServerResources;

/// Password change body
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    /// New password
    pub password: String,
}

/// Plain success body
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    /// Always `true` on 200
    pub success: bool,
}

/// Current user with effective roles
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    /// Identity id
    pub id: Uuid,
    /// Sign-in email
    pub email: String,
    /// Display name from the profile
    pub full_name: Option<String>,
    /// Roles with the default applied
    pub roles: RoleSet,
    /// Whether a password change is pending
    pub force_password_change: bool,
}

/// Account route definitions
pub struct AccountRoutes;

impl AccountRoutes {
    /// Create all account routes
    pub fn routes(resources: &Arc<ServerResources>) -> Router {
        Router::new()
            .route(paths::ACCOUNT_PASSWORD_API, post(Self::handle_change_password))
            .route("/api/me", get(Self::handle_me))
            .with_state(Arc::clone(resources))
    }

    async fn handle_change_password(
        State(resources): State<Arc<ServerResources>>,
        CurrentUser(session): CurrentUser,
        Json(request): Json<ChangePasswordRequest>,
    ) -> AppResult<Json<SuccessResponse>> {
        if request.password.chars().count() < defaults::MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {} characters",
                defaults::MIN_PASSWORD_LENGTH
            )));
        }

        resources
            .identity
            .update_password(&session.access_token, &request.password)
            .await?;
        AppLogger::log_auth_event(&session.user.id.to_string(), "password_change", true, None);

        Ok(Json(SuccessResponse { success: true }))
    }

    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        CurrentUser(session): CurrentUser,
    ) -> AppResult<Json<MeResponse>> {
        let user = session.user;
        let profile = resources.profiles.get_profile(user.id).await?;
        let roles = profile
            .as_ref()
            .map_or(RoleSet::DEFAULT, |profile| profile.roles.normalized());

        Ok(Json(MeResponse {
            id: user.id,
            email: user.email,
            full_name: profile.and_then(|profile| profile.full_name),
            roles,
            force_password_change: user.metadata.force_password_change,
        }))
    }
}
