// ABOUTME: Identity provider backed by a hosted auth service REST API
// ABOUTME: Validates and refreshes sessions, signs users in, and performs admin identity operations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use super::IdentityProvider;
use crate::errors::{AppError, AppResult};
use crate::hosted_api::{error_from_response, HostedApi};
use crate::models::{AuthUser, IssuedSession, SessionTokens, UserMetadata};

/// Token endpoint response
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
    user: AuthUser,
}

impl From<TokenResponse> for IssuedSession {
    fn from(response: TokenResponse) -> Self {
        Self {
            tokens: SessionTokens {
                access_token: response.access_token,
                refresh_token: response.refresh_token,
            },
            expires_in: response.expires_in,
            user: response.user,
        }
    }
}

/// Hosted auth provider client
#[derive(Clone)]
pub struct HostedAuthClient {
    api: HostedApi,
}

impl HostedAuthClient {
    /// Wrap a configured API client
    #[must_use]
    pub const fn new(api: HostedApi) -> Self {
        Self { api }
    }

    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> AppResult<reqwest::Response> {
        let path = format!("auth/v1/token?grant_type={grant_type}");
        Ok(self.api.public(Method::POST, &path)?.json(&body).send().await?)
    }
}

#[async_trait]
impl IdentityProvider for HostedAuthClient {
    fn name(&self) -> &'static str {
        "hosted"
    }

    async fn get_user(&self, access_token: &str) -> AppResult<Option<AuthUser>> {
        let response = self
            .api
            .as_user(Method::GET, "auth/v1/user", access_token)?
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => Ok(Some(response.json::<AuthUser>().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!("Access token rejected by provider");
                Ok(None)
            }
            _ => Err(error_from_response(response).await),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> AppResult<Option<IssuedSession>> {
        let response = self
            .token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await?;

        match response.status() {
            s if s.is_success() => Ok(Some(response.json::<TokenResponse>().await?.into())),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!("Refresh token rejected by provider");
                Ok(None)
            }
            _ => Err(error_from_response(response).await),
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<IssuedSession> {
        let response = self
            .token_grant("password", json!({ "email": email, "password": password }))
            .await?;

        match response.status() {
            s if s.is_success() => Ok(response.json::<TokenResponse>().await?.into()),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                Err(AppError::auth_invalid("Invalid email or password"))
            }
            _ => Err(error_from_response(response).await),
        }
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> AppResult<IssuedSession> {
        let response = self
            .token_grant(
                "pkce",
                json!({ "auth_code": code, "code_verifier": code_verifier }),
            )
            .await?;

        if response.status().is_success() {
            Ok(response.json::<TokenResponse>().await?.into())
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        let response = self
            .api
            .as_user(Method::POST, "auth/v1/logout", access_token)?
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            // Already expired; nothing left to revoke.
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(()),
            _ => Err(error_from_response(response).await),
        }
    }

    async fn update_password(&self, access_token: &str, new_password: &str) -> AppResult<()> {
        let response = self
            .api
            .as_user(Method::PUT, "auth/v1/user", access_token)?
            .json(&json!({
                "password": new_password,
                "data": { "force_password_change": false },
            }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> AppResult<Option<AuthUser>> {
        let response = self
            .api
            .as_service(Method::GET, &format!("auth/v1/admin/users/{user_id}"))?
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => Ok(Some(response.json::<AuthUser>().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(error_from_response(response).await),
        }
    }

    async fn invite_user(&self, email: &str, metadata: &UserMetadata) -> AppResult<AuthUser> {
        let response = self
            .api
            .as_service(Method::POST, "auth/v1/invite")?
            .json(&json!({ "email": email, "data": metadata }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json::<AuthUser>().await?)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn resend_invite(&self, email: &str) -> AppResult<()> {
        let response = self
            .api
            .as_service(Method::POST, "auth/v1/invite")?
            .json(&json!({ "email": email }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn set_password(&self, user_id: Uuid, password: &str) -> AppResult<()> {
        let response = self
            .api
            .as_service(Method::PUT, &format!("auth/v1/admin/users/{user_id}"))?
            .json(&json!({ "password": password }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn update_metadata(
        &self,
        user_id: Uuid,
        metadata: &UserMetadata,
    ) -> AppResult<AuthUser> {
        let response = self
            .api
            .as_service(Method::PUT, &format!("auth/v1/admin/users/{user_id}"))?
            .json(&json!({ "user_metadata": metadata }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json::<AuthUser>().await?)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn delete_user(&self, user_id: Uuid) -> AppResult<()> {
        let response = self
            .api
            .as_service(Method::DELETE, &format!("auth/v1/admin/users/{user_id}"))?
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let error = error_from_response(response).await;
            warn!(user_id = %user_id, "Provider refused identity deletion: {}", error.message);
            Err(error)
        }
    }
}
