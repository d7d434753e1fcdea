// ABOUTME: In-process identity provider for local development mode and tests
// ABOUTME: Keeps identities, passwords, and opaque session tokens in concurrent maps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use uuid::Uuid;

use super::IdentityProvider;
use crate::errors::{AppError, AppResult};
use crate::models::{AuthUser, IssuedSession, SessionTokens, UserMetadata};

const ACCESS_TOKEN_TTL_SECS: u64 = 3600;

/// Operations that can be made to fail, for exercising compensation paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityOperation {
    /// `get_user` and `refresh_session`
    SessionLookup,
    /// `invite_user`
    Invite,
    /// `delete_user`
    Delete,
    /// `update_metadata`
    UpdateMetadata,
    /// `set_password`
    SetPassword,
}

#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password: Option<String>,
}

/// Identity provider holding everything in memory
#[derive(Default)]
pub struct MemoryIdentityProvider {
    accounts: DashMap<Uuid, Account>,
    emails: DashMap<String, Uuid>,
    access_tokens: DashMap<String, Uuid>,
    refresh_tokens: DashMap<String, Uuid>,
    auth_codes: DashMap<String, Uuid>,
    invites_sent: DashMap<String, u32>,
    failing: DashSet<IdentityOperation>,
}

impl MemoryIdentityProvider {
    /// Empty provider
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an identity with a password
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` if the email is taken
    pub fn create_user(
        &self,
        email: &str,
        password: &str,
        metadata: UserMetadata,
    ) -> AppResult<AuthUser> {
        self.insert_account(email, Some(password.to_owned()), metadata)
    }

    /// Issue a session for an existing identity
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for unknown ids
    pub fn issue_session(&self, user_id: Uuid) -> AppResult<IssuedSession> {
        let user = self
            .accounts
            .get(&user_id)
            .map(|account| account.user.clone())
            .ok_or_else(|| AppError::not_found(format!("User {user_id}")))?;

        let tokens = SessionTokens {
            access_token: format!("mem-at-{}", Uuid::new_v4().simple()),
            refresh_token: format!("mem-rt-{}", Uuid::new_v4().simple()),
        };
        self.access_tokens
            .insert(tokens.access_token.clone(), user_id);
        self.refresh_tokens
            .insert(tokens.refresh_token.clone(), user_id);

        Ok(IssuedSession {
            tokens,
            expires_in: ACCESS_TOKEN_TTL_SECS,
            user,
        })
    }

    /// Issue a one-time OAuth authorization code
    #[must_use]
    pub fn issue_auth_code(&self, user_id: Uuid) -> String {
        let code = Uuid::new_v4().simple().to_string();
        self.auth_codes.insert(code.clone(), user_id);
        code
    }

    /// Invalidate an access token as if it had expired
    pub fn expire_access_token(&self, access_token: &str) {
        self.access_tokens.remove(access_token);
    }

    /// Number of invitations sent to `email`
    #[must_use]
    pub fn invites_sent(&self, email: &str) -> u32 {
        self.invites_sent
            .get(&normalize_email(email))
            .map_or(0, |count| *count)
    }

    /// Whether the password matches
    #[must_use]
    pub fn check_password(&self, user_id: Uuid, password: &str) -> bool {
        self.accounts
            .get(&user_id)
            .is_some_and(|account| account.password.as_deref() == Some(password))
    }

    /// Make `operation` fail until cleared
    pub fn fail_on(&self, operation: IdentityOperation) {
        self.failing.insert(operation);
    }

    /// Stop failing `operation`
    pub fn clear_failure(&self, operation: IdentityOperation) {
        self.failing.remove(&operation);
    }

    fn check_failure(&self, operation: IdentityOperation) -> AppResult<()> {
        if self.failing.contains(&operation) {
            return Err(AppError::external_unavailable(
                "memory identity provider",
                format!("{operation:?} unavailable"),
            ));
        }
        Ok(())
    }

    fn insert_account(
        &self,
        email: &str,
        password: Option<String>,
        metadata: UserMetadata,
    ) -> AppResult<AuthUser> {
        let key = normalize_email(email);
        if self.emails.contains_key(&key) {
            return Err(AppError::already_exists(format!("User {email}")));
        }

        let user = AuthUser {
            id: Uuid::new_v4(),
            email: key.clone(),
            metadata,
        };
        self.emails.insert(key, user.id);
        self.accounts.insert(
            user.id,
            Account {
                user: user.clone(),
                password,
            },
        );
        Ok(user)
    }

    fn user_for_access_token(&self, access_token: &str) -> Option<Uuid> {
        self.access_tokens.get(access_token).map(|id| *id)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_user(&self, access_token: &str) -> AppResult<Option<AuthUser>> {
        self.check_failure(IdentityOperation::SessionLookup)?;
        Ok(self
            .user_for_access_token(access_token)
            .and_then(|id| self.accounts.get(&id).map(|account| account.user.clone())))
    }

    async fn refresh_session(&self, refresh_token: &str) -> AppResult<Option<IssuedSession>> {
        self.check_failure(IdentityOperation::SessionLookup)?;
        let Some((_, user_id)) = self.refresh_tokens.remove(refresh_token) else {
            return Ok(None);
        };
        if !self.accounts.contains_key(&user_id) {
            return Ok(None);
        }
        self.issue_session(user_id).map(Some)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<IssuedSession> {
        let user_id = self
            .emails
            .get(&normalize_email(email))
            .map(|id| *id)
            .filter(|id| self.check_password(*id, password))
            .ok_or_else(|| AppError::auth_invalid("Invalid email or password"))?;
        self.issue_session(user_id)
    }

    async fn exchange_code(
        &self,
        code: &str,
        _code_verifier: Option<&str>,
    ) -> AppResult<IssuedSession> {
        let (_, user_id) = self
            .auth_codes
            .remove(code)
            .ok_or_else(|| AppError::auth_invalid("Authorization code is invalid or used"))?;
        self.issue_session(user_id)
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        if let Some((_, user_id)) = self.access_tokens.remove(access_token) {
            self.refresh_tokens.retain(|_, owner| *owner != user_id);
        }
        Ok(())
    }

    async fn update_password(&self, access_token: &str, new_password: &str) -> AppResult<()> {
        let user_id = self
            .user_for_access_token(access_token)
            .ok_or_else(|| AppError::auth_invalid("Session expired"))?;
        let mut account = self
            .accounts
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id}")))?;
        account.password = Some(new_password.to_owned());
        account.user.metadata.force_password_change = false;
        Ok(())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> AppResult<Option<AuthUser>> {
        Ok(self
            .accounts
            .get(&user_id)
            .map(|account| account.user.clone()))
    }

    async fn invite_user(&self, email: &str, metadata: &UserMetadata) -> AppResult<AuthUser> {
        self.check_failure(IdentityOperation::Invite)?;
        let user = self.insert_account(email, None, metadata.clone())?;
        *self.invites_sent.entry(user.email.clone()).or_insert(0) += 1;
        Ok(user)
    }

    async fn resend_invite(&self, email: &str) -> AppResult<()> {
        let key = normalize_email(email);
        if !self.emails.contains_key(&key) {
            return Err(AppError::not_found(format!("User {email}")));
        }
        *self.invites_sent.entry(key).or_insert(0) += 1;
        Ok(())
    }

    async fn set_password(&self, user_id: Uuid, password: &str) -> AppResult<()> {
        self.check_failure(IdentityOperation::SetPassword)?;
        let mut account = self
            .accounts
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id}")))?;
        account.password = Some(password.to_owned());
        Ok(())
    }

    async fn update_metadata(
        &self,
        user_id: Uuid,
        metadata: &UserMetadata,
    ) -> AppResult<AuthUser> {
        self.check_failure(IdentityOperation::UpdateMetadata)?;
        let mut account = self
            .accounts
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id}")))?;
        account.user.metadata = metadata.clone();
        Ok(account.user.clone())
    }

    async fn delete_user(&self, user_id: Uuid) -> AppResult<()> {
        self.check_failure(IdentityOperation::Delete)?;
        let (_, account) = self
            .accounts
            .remove(&user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id}")))?;
        self.emails.remove(&account.user.email);
        self.access_tokens.retain(|_, owner| *owner != user_id);
        self.refresh_tokens.retain(|_, owner| *owner != user_id);
        Ok(())
    }
}
