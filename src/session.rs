// ABOUTME: Refresh-on-request session handling for the gate and auth routes
// ABOUTME: Resolves the user from cookies, rotates expired access tokens, and clears dead sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use http::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::errors::AppResult;
use crate::identity::IdentityProvider;
use crate::models::{AuthUser, IssuedSession};
use crate::security::cookies::{CookieWriter, SessionCookies};

/// Session as resolved for one request
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Authenticated identity, if any
    pub user: Option<AuthUser>,
    /// Access token valid for the rest of this request
    pub access_token: Option<String>,
    /// Set-Cookie values the response must carry
    pub set_cookies: Vec<HeaderValue>,
}

/// Resolves and refreshes sessions through the identity provider
#[derive(Clone)]
pub struct SessionManager {
    identity: Arc<dyn IdentityProvider>,
    cookies: CookieWriter,
}

impl SessionManager {
    /// Create a manager writing cookies with `cookies`
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, cookies: CookieWriter) -> Self {
        Self { identity, cookies }
    }

    /// Resolve the session carried by request headers
    ///
    /// # Errors
    ///
    /// Returns an error only when the provider cannot answer; rejected tokens
    /// produce an anonymous state with clearing cookies.
    pub async fn resolve(&self, headers: &HeaderMap) -> AppResult<SessionState> {
        let cookies = SessionCookies::from_headers(headers);
        if !cookies.is_present() {
            return Ok(SessionState::default());
        }

        if let Some(access_token) = &cookies.access_token {
            if let Some(user) = self.identity.get_user(access_token).await? {
                return Ok(SessionState {
                    user: Some(user),
                    access_token: Some(access_token.clone()),
                    set_cookies: Vec::new(),
                });
            }
        }

        if let Some(refresh_token) = &cookies.refresh_token {
            if let Some(session) = self.identity.refresh_session(refresh_token).await? {
                debug!(user_id = %session.user.id, "Session refreshed");
                return Ok(self.issued(session));
            }
        }

        debug!("Session cookies rejected, clearing");
        Ok(SessionState {
            user: None,
            access_token: None,
            set_cookies: self.cookies.cleared(),
        })
    }

    /// State for a freshly issued session
    #[must_use]
    pub fn issued(&self, session: IssuedSession) -> SessionState {
        SessionState {
            set_cookies: self.cookies.session(&session),
            access_token: Some(session.tokens.access_token),
            user: Some(session.user),
        }
    }

    /// Cookies that end the browser session
    #[must_use]
    pub fn cleared_cookies(&self) -> Vec<HeaderValue> {
        self.cookies.cleared()
    }
}
