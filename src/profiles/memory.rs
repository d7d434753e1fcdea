// ABOUTME: In-memory profile store backed by a concurrent map
// ABOUTME: Used by the memory backend and by tests, with injectable write failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, DashSet};
use uuid::Uuid;

use super::ProfileStore;
use crate::errors::{AppError, AppResult};
use crate::models::Profile;
use crate::permissions::RoleSet;

/// Writes that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileOperation {
    /// `fetch_roles` and `get_profile`
    Read,
    /// `create_profile`
    Create,
    /// `update_roles`
    UpdateRoles,
    /// `delete_profile`
    Delete,
}

/// Profile store holding records in memory
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: DashMap<Uuid, Profile>,
    failing: DashSet<ProfileOperation>,
}

impl MemoryProfileStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record without normalizing, to model legacy rows
    pub fn insert_raw(&self, profile: Profile) {
        self.profiles.insert(profile.id, profile);
    }

    /// Make `operation` fail until cleared
    pub fn fail_on(&self, operation: ProfileOperation) {
        self.failing.insert(operation);
    }

    /// Stop failing `operation`
    pub fn clear_failure(&self, operation: ProfileOperation) {
        self.failing.remove(&operation);
    }

    fn check_failure(&self, operation: ProfileOperation) -> AppResult<()> {
        if self.failing.contains(&operation) {
            return Err(AppError::database(format!("{operation:?} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_roles(&self, user_id: Uuid) -> AppResult<Option<RoleSet>> {
        self.check_failure(ProfileOperation::Read)?;
        Ok(self
            .profiles
            .get(&user_id)
            .map(|profile| profile.roles)
            .filter(|roles| !roles.is_empty()))
    }

    async fn get_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        self.check_failure(ProfileOperation::Read)?;
        Ok(self.profiles.get(&user_id).map(|profile| profile.clone()))
    }

    async fn list_profiles(&self) -> AppResult<Vec<Profile>> {
        let mut profiles: Vec<Profile> = self
            .profiles
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    async fn create_profile(&self, profile: &Profile) -> AppResult<()> {
        self.check_failure(ProfileOperation::Create)?;
        if self.profiles.contains_key(&profile.id) {
            return Err(AppError::already_exists(format!("Profile {}", profile.id)));
        }
        let mut stored = profile.clone();
        stored.roles = stored.roles.normalized();
        self.profiles.insert(stored.id, stored);
        Ok(())
    }

    async fn update_roles(&self, user_id: Uuid, roles: RoleSet) -> AppResult<()> {
        self.check_failure(ProfileOperation::UpdateRoles)?;
        let mut profile = self
            .profiles
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("Profile {user_id}")))?;
        profile.roles = roles.normalized();
        profile.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_profile(&self, user_id: Uuid) -> AppResult<()> {
        self.check_failure(ProfileOperation::Delete)?;
        self.profiles
            .remove(&user_id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Profile {user_id}")))
    }
}
