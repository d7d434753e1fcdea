// ABOUTME: Admin API route handlers for user roles and account lifecycle
// ABOUTME: Thin wrappers over RoleAdminService rendering the AdminResponse envelope
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use http::StatusCode;
use serde::Deserialize;
use serde_json::{json, to_value};
use uuid::Uuid;

use crate::admin::{AdminResponse, InviteRequest};
use crate::errors::AppResult;
use crate::middleware::CurrentUser;
use crate::models::AuthUser;
use crate::permissions::Role;
use crate::resources::ServerResources;

/// Promote body
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    /// Role name to grant
    pub role: String,
}

/// Admin route definitions
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    pub fn routes(resources: &Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/users", get(Self::handle_list_users))
            .route("/api/admin/users/invite", post(Self::handle_invite))
            .route("/api/admin/users/:id", delete(Self::handle_delete))
            .route(
                "/api/admin/users/:id/resend-invite",
                post(Self::handle_resend_invite),
            )
            .route(
                "/api/admin/users/:id/reset-password",
                post(Self::handle_reset_password),
            )
            .route("/api/admin/users/:id/roles", post(Self::handle_promote))
            .route(
                "/api/admin/users/:id/roles/:role",
                delete(Self::handle_demote),
            )
            .with_state(Arc::clone(resources))
    }

    async fn handle_list_users(
        State(resources): State<Arc<ServerResources>>,
        CurrentUser(session): CurrentUser,
    ) -> Response {
        let result = resources.admin.list_profiles(&session.user).await;
        reply(result.and_then(|profiles| {
            let total = profiles.len();
            Ok(AdminResponse::ok(
                format!("{total} users"),
                Some(json!({ "users": to_value(profiles)?, "total": total })),
            ))
        }))
    }

    async fn handle_invite(
        State(resources): State<Arc<ServerResources>>,
        CurrentUser(session): CurrentUser,
        Json(request): Json<InviteRequest>,
    ) -> Response {
        let result = resources.admin.invite_user(&session.user, request).await;
        reply(result.and_then(|profile| {
            Ok(AdminResponse::ok(
                format!("Invitation sent to {}", profile.email),
                Some(to_value(profile)?),
            ))
        }))
    }

    async fn handle_resend_invite(
        State(resources): State<Arc<ServerResources>>,
        CurrentUser(session): CurrentUser,
        Path(user_id): Path<Uuid>,
    ) -> Response {
        let result = resources.admin.resend_invite(&session.user, user_id).await;
        reply(result.map(|()| AdminResponse::ok("Invitation resent", None)))
    }

    async fn handle_reset_password(
        State(resources): State<Arc<ServerResources>>,
        CurrentUser(session): CurrentUser,
        Path(user_id): Path<Uuid>,
    ) -> Response {
        let result = resources.admin.reset_password(&session.user, user_id).await;
        reply(result.and_then(|temporary| {
            Ok(AdminResponse::ok(
                "Temporary password issued; the user must change it at next sign-in",
                Some(to_value(temporary)?),
            ))
        }))
    }

    async fn handle_promote(
        State(resources): State<Arc<ServerResources>>,
        CurrentUser(session): CurrentUser,
        Path(user_id): Path<Uuid>,
        Json(request): Json<RoleRequest>,
    ) -> Response {
        reply(change_role(&resources, &session.user, user_id, &request.role, RoleChange::Grant).await)
    }

    async fn handle_demote(
        State(resources): State<Arc<ServerResources>>,
        CurrentUser(session): CurrentUser,
        Path((user_id, role)): Path<(Uuid, String)>,
    ) -> Response {
        reply(change_role(&resources, &session.user, user_id, &role, RoleChange::Revoke).await)
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        CurrentUser(session): CurrentUser,
        Path(user_id): Path<Uuid>,
    ) -> Response {
        let result = resources.admin.delete_user(&session.user, user_id).await;
        reply(result.map(|()| AdminResponse::ok("User deleted", None)))
    }
}

#[derive(Clone, Copy)]
enum RoleChange {
    Grant,
    Revoke,
}

async fn change_role(
    resources: &ServerResources,
    caller: &AuthUser,
    user_id: Uuid,
    role: &str,
    change: RoleChange,
) -> AppResult<AdminResponse> {
    let role: Role = role.parse()?;
    let (roles, verb) = match change {
        RoleChange::Grant => (resources.admin.promote(caller, user_id, role).await?, "Granted"),
        RoleChange::Revoke => (resources.admin.demote(caller, user_id, role).await?, "Revoked"),
    };
    Ok(AdminResponse::ok(
        format!("{verb} {role}"),
        Some(json!({ "user_id": user_id, "roles": roles })),
    ))
}

/// Render an action result, using the error code's status on failure
fn reply(result: AppResult<AdminResponse>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(error) => {
            let status = StatusCode::from_u16(error.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(AdminResponse::failed(error.message))).into_response()
        }
    }
}
