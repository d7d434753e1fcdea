// ABOUTME: Axum middleware running the request gate in front of every page and API route
// ABOUTME: Resolves the session, fetches roles when needed, and redirects or passes through with cookies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::header::{LOCATION, SET_COOKIE};
use http::{HeaderMap, HeaderValue, StatusCode};
use tracing::{debug, info};
use uuid::Uuid;

use super::policy::{decide_with_roles, decide_without_roles, GateDecision, RedirectReason};
use super::routes::{is_static_asset, RouteCategories};
use crate::errors::{AppError, AppResult};
use crate::models::AuthUser;
use crate::permissions::RoleSet;
use crate::profiles::{roles_or_default, ProfileStore};
use crate::security::cookies::append_set_cookies;
use crate::session::{SessionManager, SessionState};

/// Session attached to requests the gate let through
#[derive(Debug, Clone)]
pub struct CurrentSession {
    /// Signed-in identity
    pub user: AuthUser,
    /// Access token valid for this request
    pub access_token: String,
}

/// Gate outcome together with the resolved session
#[derive(Debug)]
pub struct GateOutcome {
    /// Redirect or pass through
    pub decision: GateDecision,
    /// Session after refresh
    pub session: SessionState,
}

/// Session and role gate
#[derive(Clone)]
pub struct RequestGate {
    sessions: SessionManager,
    profiles: Arc<dyn ProfileStore>,
}

impl RequestGate {
    /// Build a gate over a session manager and profile store
    #[must_use]
    pub fn new(sessions: SessionManager, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { sessions, profiles }
    }

    /// Run the gate for `path`.
    ///
    /// Roles are only fetched for signed-in users on protected paths.
    ///
    /// # Errors
    ///
    /// Returns the provider or store error; refreshed cookies are handed
    /// back alongside so the caller can still deliver them.
    pub async fn evaluate(
        &self,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<GateOutcome, (AppError, Vec<HeaderValue>)> {
        let session = self
            .sessions
            .resolve(headers)
            .await
            .map_err(|error| (error, Vec::new()))?;

        let categories = RouteCategories::classify(path);
        if let Some(decision) = decide_without_roles(path, categories, session.user.as_ref()) {
            return Ok(GateOutcome { decision, session });
        }

        let Some(user_id) = session.user.as_ref().map(|user| user.id) else {
            return Ok(GateOutcome {
                decision: GateDecision::Continue,
                session,
            });
        };

        match self.roles(user_id).await {
            Ok(roles) => Ok(GateOutcome {
                decision: decide_with_roles(categories, roles),
                session,
            }),
            Err(error) => Err((error, session.set_cookies)),
        }
    }

    async fn roles(&self, user_id: Uuid) -> AppResult<RoleSet> {
        roles_or_default(self.profiles.as_ref(), user_id).await
    }
}

/// `302 Found` to `location`
#[must_use]
pub fn found(location: &str) -> Response {
    HeaderValue::from_str(location).map_or_else(
        |_| AppError::internal(format!("Invalid redirect location: {location}")).into_response(),
        |value| {
            let mut response = StatusCode::FOUND.into_response();
            response.headers_mut().insert(LOCATION, value);
            response
        },
    )
}

/// Axum middleware entry point
pub async fn request_gate(
    State(gate): State<Arc<RequestGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    if is_static_asset(&path) {
        return next.run(request).await;
    }

    let outcome = match gate.evaluate(&path, request.headers()).await {
        Ok(outcome) => outcome,
        Err((error, set_cookies)) => {
            let mut response = error.into_response();
            append_set_cookies(response.headers_mut(), &set_cookies);
            return response;
        }
    };

    let GateOutcome { decision, session } = outcome;
    log_decision(&path, &decision, session.user.as_ref());
    if let GateDecision::Redirect { location, .. } = decision {
        let mut response = found(&location);
        append_set_cookies(response.headers_mut(), &session.set_cookies);
        return response;
    }

    if let (Some(user), Some(access_token)) = (session.user, session.access_token) {
        request.extensions_mut().insert(CurrentSession { user, access_token });
    }

    let mut response = next.run(request).await;
    // Handlers that issue or clear the session own the cookies
    if !response.headers().contains_key(SET_COOKIE) {
        append_set_cookies(response.headers_mut(), &session.set_cookies);
    }
    response
}

fn log_decision(path: &str, decision: &GateDecision, user: Option<&AuthUser>) {
    let user_id = user.map(|user| user.id.to_string());
    let user_id = user_id.as_deref().unwrap_or("anonymous");
    match decision {
        GateDecision::Continue => debug!(path = %path, user_id = %user_id, "Gate pass-through"),
        GateDecision::Redirect {
            location,
            reason: RedirectReason::RoleMismatch,
        } => info!(
            path = %path,
            user_id = %user_id,
            location = %location,
            "Role does not grant area, redirecting"
        ),
        GateDecision::Redirect { location, reason } => debug!(
            path = %path,
            user_id = %user_id,
            location = %location,
            reason = %reason,
            "Gate redirect"
        ),
    }
}
