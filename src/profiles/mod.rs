// ABOUTME: Profile store abstraction holding role assignments keyed by identity id
// ABOUTME: Hosted REST, SQLite, and in-memory implementations share the ProfileStore trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Profile Stores
//!
//! The gate only ever needs `fetch_roles`. Admin actions use the rest of the
//! trait. Implementations never store an empty role set.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::Profile;
use crate::permissions::RoleSet;

/// Profiles table in the hosted backend
pub mod hosted;
/// In-process store for development and tests
pub mod memory;
/// SQLite store
pub mod sqlite;

pub use hosted::HostedProfileStore;
pub use memory::MemoryProfileStore;
pub use sqlite::SqliteProfileStore;

/// Profile persistence operations
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Short name for logs and health output
    fn name(&self) -> &'static str;

    /// Roles recorded for `user_id`; `None` when there is no row or no roles
    async fn fetch_roles(&self, user_id: Uuid) -> AppResult<Option<RoleSet>>;

    /// Full profile record
    async fn get_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>>;

    /// All profiles, newest first
    async fn list_profiles(&self) -> AppResult<Vec<Profile>>;

    /// Insert a new profile
    async fn create_profile(&self, profile: &Profile) -> AppResult<()>;

    /// Replace the role set of an existing profile
    async fn update_roles(&self, user_id: Uuid, roles: RoleSet) -> AppResult<()>;

    /// Remove a profile
    async fn delete_profile(&self, user_id: Uuid) -> AppResult<()>;
}

/// Roles for `user_id` with the default applied when none are recorded
pub async fn roles_or_default(store: &dyn ProfileStore, user_id: Uuid) -> AppResult<RoleSet> {
    Ok(store
        .fetch_roles(user_id)
        .await?
        .map_or(RoleSet::DEFAULT, RoleSet::normalized))
}
