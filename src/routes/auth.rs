// ABOUTME: Sign-in, OAuth callback, and sign-out route handlers
// ABOUTME: Issue and clear session cookies and redirect into the right dashboard area
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Authentication routes
//!
//! Provider failures here never surface as JSON. They send the browser back
//! to the login page with an `error` query parameter.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Form, Router};
use http::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::warn;

use crate::constants::{cookies, paths};
use crate::errors::ErrorCode;
use crate::gate::policy::{default_area, needs_role_selection};
use crate::gate::{found, CurrentSession};
use crate::logging::AppLogger;
use crate::profiles::roles_or_default;
use crate::resources::ServerResources;
use crate::security::cookies::{append_set_cookies, get_cookie_value, SessionCookies};

/// Login form body
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
    /// Page to return to after sign-in
    #[serde(default, rename = "redirectTo")]
    pub redirect_to: Option<String>,
}

/// OAuth callback query
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code
    #[serde(default)]
    pub code: Option<String>,
    /// Page to continue to
    #[serde(default)]
    pub next: Option<String>,
}

/// Auth route definitions
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all auth routes
    pub fn routes(resources: &Arc<ServerResources>) -> Router {
        Router::new()
            .route("/auth/login", post(Self::handle_login))
            .route("/auth/callback", get(Self::handle_callback))
            .route(
                paths::LOGOUT,
                get(Self::handle_logout).post(Self::handle_logout),
            )
            .with_state(Arc::clone(resources))
    }

    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Form(form): Form<LoginForm>,
    ) -> Response {
        let email = form.email.trim();
        match resources
            .identity
            .sign_in_with_password(email, &form.password)
            .await
        {
            Ok(session) => {
                let user_id = session.user.id.to_string();
                let state = resources.sessions.issued(session);
                AppLogger::log_auth_event(&user_id, "login", true, None);
                redirect_with_cookies(
                    local_target(form.redirect_to.as_deref()).unwrap_or(paths::DASHBOARD),
                    &state.set_cookies,
                )
            }
            Err(error) => {
                AppLogger::log_auth_event("unknown", "login", false, Some(error.code.description()));
                let reason = match error.code {
                    ErrorCode::AuthInvalid | ErrorCode::InvalidInput => "invalid_credentials",
                    _ => "auth_unavailable",
                };
                found(&login_error(reason))
            }
        }
    }

    async fn handle_callback(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<CallbackQuery>,
        headers: HeaderMap,
    ) -> Response {
        let Some(code) = query.code.as_deref().filter(|code| !code.is_empty()) else {
            return found(&login_error("auth_callback_failed"));
        };

        let verifier = get_cookie_value(&headers, cookies::CODE_VERIFIER);
        let session = match resources
            .identity
            .exchange_code(code, verifier.as_deref())
            .await
        {
            Ok(session) => session,
            Err(error) => {
                AppLogger::log_auth_event("unknown", "oauth_callback", false, Some(&error.message));
                return found(&login_error("auth_callback_failed"));
            }
        };

        let user_id = session.user.id;
        let state = resources.sessions.issued(session);
        AppLogger::log_auth_event(&user_id.to_string(), "oauth_callback", true, None);

        let location = match roles_or_default(resources.profiles.as_ref(), user_id).await {
            Ok(roles) if needs_role_selection(roles) => paths::SELECT_ROLE,
            Ok(roles) => local_target(query.next.as_deref()).unwrap_or_else(|| default_area(roles)),
            Err(error) => {
                warn!(user_id = %user_id, error = %error, "Role lookup failed after callback");
                local_target(query.next.as_deref()).unwrap_or(paths::DASHBOARD)
            }
        };
        redirect_with_cookies(location, &state.set_cookies)
    }

    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        session: Option<Extension<CurrentSession>>,
        headers: HeaderMap,
    ) -> Response {
        let access_token = session
            .map(|Extension(session)| session.access_token)
            .or_else(|| SessionCookies::from_headers(&headers).access_token);

        if let Some(access_token) = access_token {
            if let Err(error) = resources.identity.sign_out(&access_token).await {
                warn!(error = %error, "Provider sign-out failed, clearing cookies anyway");
            }
        }

        redirect_with_cookies(paths::LOGIN, &resources.sessions.cleared_cookies())
    }
}

/// `candidate` when it is a path on this site
#[must_use]
pub fn local_target(candidate: Option<&str>) -> Option<&str> {
    candidate.filter(|target| {
        target.starts_with('/') && !target.starts_with("//") && !target.starts_with("/\\")
    })
}

fn login_error(reason: &str) -> String {
    format!("{}?error={reason}", paths::LOGIN)
}

fn redirect_with_cookies(location: &str, set_cookies: &[HeaderValue]) -> Response {
    let mut response = found(location);
    append_set_cookies(response.headers_mut(), set_cookies);
    response
}
