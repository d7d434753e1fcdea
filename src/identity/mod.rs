// ABOUTME: Auth provider abstraction used by the session layer, auth routes, and admin actions
// ABOUTME: Hosted (REST) and in-memory implementations share the IdentityProvider trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Identity Providers
//!
//! The auth provider owns identities and sessions. The gateway only validates
//! and refreshes tokens, and performs a handful of admin operations on behalf
//! of authorized callers.
//!
//! Token answers follow one rule: a token the provider rejects is `Ok(None)`,
//! while a provider that cannot answer is an `Err`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::{AuthUser, IssuedSession, UserMetadata};

/// REST client for a hosted auth provider
pub mod hosted;
/// In-process provider for development and tests
pub mod memory;

pub use hosted::HostedAuthClient;
pub use memory::MemoryIdentityProvider;

/// Auth provider operations
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short name for logs and health output
    fn name(&self) -> &'static str;

    /// Resolve the identity behind an access token
    async fn get_user(&self, access_token: &str) -> AppResult<Option<AuthUser>>;

    /// Exchange a refresh token for a new session
    async fn refresh_session(&self, refresh_token: &str) -> AppResult<Option<IssuedSession>>;

    /// Email and password sign-in
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> AppResult<IssuedSession>;

    /// Exchange an OAuth authorization code for a session
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> AppResult<IssuedSession>;

    /// Revoke the session behind an access token
    async fn sign_out(&self, access_token: &str) -> AppResult<()>;

    /// Change the password of the identity behind an access token and clear
    /// any pending forced change
    async fn update_password(&self, access_token: &str, new_password: &str) -> AppResult<()>;

    /// Admin: look up an identity by id
    async fn get_user_by_id(&self, user_id: Uuid) -> AppResult<Option<AuthUser>>;

    /// Admin: create an identity and send an invitation
    async fn invite_user(&self, email: &str, metadata: &UserMetadata) -> AppResult<AuthUser>;

    /// Admin: send the invitation again
    async fn resend_invite(&self, email: &str) -> AppResult<()>;

    /// Admin: set a password without knowing the old one
    async fn set_password(&self, user_id: Uuid, password: &str) -> AppResult<()>;

    /// Admin: replace identity metadata
    async fn update_metadata(&self, user_id: Uuid, metadata: &UserMetadata)
        -> AppResult<AuthUser>;

    /// Admin: remove the identity
    async fn delete_user(&self, user_id: Uuid) -> AppResult<()>;
}
