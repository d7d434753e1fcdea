// ABOUTME: Admin role mutations and account lifecycle actions with authorization and compensation
// ABOUTME: Promote, demote, delete, invite, resend-invite, reset-password, and listing of profiles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use rand::{distributions::Alphanumeric, Rng};
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::models::{InviteRequest, TemporaryPassword};
use crate::constants::defaults;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::identity::IdentityProvider;
use crate::logging::AppLogger;
use crate::models::{AuthUser, Profile, UserMetadata};
use crate::permissions::{Role, RoleSet};
use crate::profiles::{roles_or_default, ProfileStore};

/// Role and account administration on behalf of a signed-in caller.
///
/// Every action re-reads the caller's roles from the profile store instead of
/// trusting anything cached in the session.
#[derive(Clone)]
pub struct RoleAdminService {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
}

impl RoleAdminService {
    /// Build the service over the shared identity and profile clients
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { identity, profiles }
    }

    async fn authorize(&self, caller: &AuthUser, required: RoleSet, action: &str) -> AppResult<()> {
        let roles = roles_or_default(self.profiles.as_ref(), caller.id).await?;
        if roles.contains_any(required) {
            return Ok(());
        }

        AppLogger::log_security_event(
            "admin_action_denied",
            &format!("{action} requires one of {required}, caller has {roles}"),
            Some(&caller.id.to_string()),
        );
        Err(AppError::permission_denied(format!(
            "{action} requires one of {required}"
        )))
    }

    async fn authorize_role_change(
        &self,
        caller: &AuthUser,
        role: Role,
        action: &str,
    ) -> AppResult<()> {
        let required = role.managed_by();
        if required.is_empty() {
            return Err(AppError::permission_denied(format!(
                "Role {role} cannot be changed through the admin API"
            )));
        }
        self.authorize(caller, required, action).await
    }

    async fn current_roles(&self, user_id: Uuid) -> AppResult<RoleSet> {
        self.profiles
            .get_profile(user_id)
            .await?
            .map(|profile| profile.roles.normalized())
            .ok_or_else(|| AppError::not_found(format!("Profile {user_id}")))
    }

    async fn write_roles(&self, user_id: Uuid, roles: RoleSet) -> AppResult<RoleSet> {
        let roles = roles.normalized();
        self.profiles.update_roles(user_id, roles).await?;

        let stored = roles_or_default(self.profiles.as_ref(), user_id).await?;
        if stored != roles {
            error!(
                user_id = %user_id,
                expected = %roles,
                stored = %stored,
                "Role write did not persist"
            );
            return Err(AppError::internal(format!(
                "Role update for {user_id} was not persisted"
            )));
        }
        Ok(stored)
    }

    /// Grant `role` to `target`.
    ///
    /// Returns the target's role set after the change.
    pub async fn promote(&self, caller: &AuthUser, target: Uuid, role: Role) -> AppResult<RoleSet> {
        self.authorize_role_change(caller, role, "promote").await?;

        let current = self.current_roles(target).await?;
        if current.contains_role(role) {
            log_unchanged(target, role);
            return Ok(current);
        }

        let result = self.write_roles(target, current.with_role(role)).await;
        log_outcome(caller, &format!("promote:{role}"), target, &result);
        result
    }

    /// Revoke `role` from `target`; an emptied set falls back to the default
    pub async fn demote(&self, caller: &AuthUser, target: Uuid, role: Role) -> AppResult<RoleSet> {
        self.authorize_role_change(caller, role, "demote").await?;

        if target == caller.id && role == Role::Admin {
            return Err(AppError::invalid_input("Cannot revoke your own admin role"));
        }

        let current = self.current_roles(target).await?;
        if !current.contains_role(role) {
            log_unchanged(target, role);
            return Ok(current);
        }

        let result = self.write_roles(target, current.without_role(role)).await;
        log_outcome(caller, &format!("demote:{role}"), target, &result);
        result
    }

    /// Remove a user's profile and identity.
    ///
    /// The profile goes first. If the identity cannot be removed the profile
    /// is restored from a snapshot and the identity error is returned. An
    /// identity that no longer exists does not block removing its profile.
    pub async fn delete_user(&self, caller: &AuthUser, target: Uuid) -> AppResult<()> {
        self.authorize(caller, RoleSet::SUPER_ADMIN, "delete user")
            .await?;
        if target == caller.id {
            return Err(AppError::invalid_input("Cannot delete your own account"));
        }

        let snapshot = self.profiles.get_profile(target).await?;
        if snapshot.is_none() && self.identity.get_user_by_id(target).await?.is_none() {
            return Err(AppError::not_found(format!("User {target}")));
        }

        if snapshot.is_some() {
            self.profiles.delete_profile(target).await?;
        }

        if let Err(identity_error) = self.delete_identity(target).await {
            if let Some(profile) = &snapshot {
                match self.profiles.create_profile(profile).await {
                    Ok(()) => warn!(user_id = %target, "Identity delete failed, profile restored"),
                    Err(restore_error) => error!(
                        user_id = %target,
                        error = %restore_error,
                        "Identity delete failed and profile could not be restored"
                    ),
                }
            }
            AppLogger::log_admin_action(
                &caller.id.to_string(),
                "delete_user",
                &target.to_string(),
                false,
            );
            return Err(identity_error);
        }

        AppLogger::log_admin_action(&caller.id.to_string(), "delete_user", &target.to_string(), true);
        Ok(())
    }

    /// Invite a new user with a pending password change.
    ///
    /// The identity is created first; if the profile insert fails the
    /// identity is deleted again.
    pub async fn invite_user(&self, caller: &AuthUser, request: InviteRequest) -> AppResult<Profile> {
        let roles = request.roles.normalized();
        if roles.contains_role(Role::SuperAdmin) {
            return Err(AppError::permission_denied(
                "Role super_admin cannot be granted through the admin API",
            ));
        }
        let required = if roles.contains_role(Role::Admin) {
            RoleSet::SUPER_ADMIN
        } else {
            RoleSet::ADMINISTRATORS
        };
        self.authorize(caller, required, "invite user").await?;

        let email = request.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::invalid_input("A valid email address is required"));
        }

        let metadata = UserMetadata {
            force_password_change: true,
        };
        let user = self.identity.invite_user(&email, &metadata).await?;

        let mut profile = Profile::new(user.id, user.email.clone(), roles);
        if let Some(full_name) = request.full_name.filter(|name| !name.trim().is_empty()) {
            profile = profile.with_full_name(full_name);
        }

        if let Err(profile_error) = self.profiles.create_profile(&profile).await {
            match self.identity.delete_user(user.id).await {
                Ok(()) => warn!(user_id = %user.id, "Profile insert failed, invited identity removed"),
                Err(cleanup_error) => error!(
                    user_id = %user.id,
                    error = %cleanup_error,
                    "Profile insert failed and invited identity could not be removed"
                ),
            }
            AppLogger::log_admin_action(&caller.id.to_string(), "invite_user", &email, false);
            return Err(profile_error);
        }

        AppLogger::log_admin_action(&caller.id.to_string(), "invite_user", &user.id.to_string(), true);
        Ok(profile)
    }

    /// Send the invitation email again
    pub async fn resend_invite(&self, caller: &AuthUser, target: Uuid) -> AppResult<()> {
        self.authorize(caller, RoleSet::ADMINISTRATORS, "resend invite")
            .await?;
        let user = self.target_identity(target).await?;

        let result = self.identity.resend_invite(&user.email).await;
        log_outcome(caller, "resend_invite", target, &result);
        result
    }

    /// Replace the target's password with a generated temporary one and
    /// require a change at next sign-in.
    ///
    /// The forced-change flag is set before the password so a failure never
    /// leaves an unflagged temporary password; a failed password write
    /// restores the previous metadata.
    pub async fn reset_password(
        &self,
        caller: &AuthUser,
        target: Uuid,
    ) -> AppResult<TemporaryPassword> {
        self.authorize(caller, RoleSet::ADMINISTRATORS, "reset password")
            .await?;
        let user = self.target_identity(target).await?;

        let result = self.rotate_password(user).await;
        log_outcome(caller, "reset_password", target, &result);
        result
    }

    async fn rotate_password(&self, user: AuthUser) -> AppResult<TemporaryPassword> {
        let target = user.id;
        let previous = user.metadata.clone();
        let mut metadata = user.metadata;
        metadata.force_password_change = true;
        let user = self.identity.update_metadata(target, &metadata).await?;

        let password = generate_temporary_password();
        if let Err(password_error) = self.identity.set_password(target, &password).await {
            match self.identity.update_metadata(target, &previous).await {
                Ok(_) => warn!(user_id = %target, "Password reset failed, metadata restored"),
                Err(restore_error) => error!(
                    user_id = %target,
                    error = %restore_error,
                    "Password reset failed and metadata could not be restored"
                ),
            }
            return Err(password_error);
        }

        Ok(TemporaryPassword {
            user_id: user.id,
            email: user.email,
            password,
        })
    }

    /// All profiles, for the admin user list
    pub async fn list_profiles(&self, caller: &AuthUser) -> AppResult<Vec<Profile>> {
        self.authorize(caller, RoleSet::ADMINISTRATORS, "list users")
            .await?;
        self.profiles.list_profiles().await
    }

    /// Identity removal where an already missing identity counts as removed
    async fn delete_identity(&self, target: Uuid) -> AppResult<()> {
        match self.identity.delete_user(target).await {
            Err(error) if error.code == ErrorCode::ResourceNotFound => {
                warn!(user_id = %target, "Identity already gone, profile removal stands");
                Ok(())
            }
            result => result,
        }
    }

    async fn target_identity(&self, target: Uuid) -> AppResult<AuthUser> {
        self.identity
            .get_user_by_id(target)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {target}")))
    }
}

fn generate_temporary_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(defaults::TEMP_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

fn log_unchanged(target: Uuid, role: Role) {
    debug!(user_id = %target, role = %role, "Role already in requested state");
}

fn log_outcome<T>(caller: &AuthUser, action: &str, target: Uuid, result: &AppResult<T>) {
    AppLogger::log_admin_action(
        &caller.id.to_string(),
        action,
        &target.to_string(),
        result.is_ok(),
    );
}
