// ABOUTME: Profile store backed by the hosted backend's REST table interface
// ABOUTME: Issues select/insert/update/delete requests against the profiles table
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::ProfileStore;
use crate::errors::{AppError, AppResult};
use crate::hosted_api::{error_from_response, HostedApi};
use crate::models::Profile;
use crate::permissions::RoleSet;

const TABLE: &str = "rest/v1/profiles";
const PROFILE_COLUMNS: &str = "id,email,full_name,roles,created_at,updated_at";

#[derive(Deserialize)]
struct RolesRow {
    roles: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize)]
struct ProfileRow {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    roles: Option<Vec<String>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        let now = Utc::now();
        Self {
            id: row.id,
            email: row.email.unwrap_or_default(),
            full_name: row.full_name,
            roles: row
                .roles
                .map_or(RoleSet::DEFAULT, RoleSet::from_strings)
                .normalized(),
            created_at: row.created_at.unwrap_or(now),
            updated_at: row.updated_at.unwrap_or(now),
        }
    }
}

impl From<&Profile> for ProfileRow {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            email: Some(profile.email.clone()),
            full_name: profile.full_name.clone(),
            roles: Some(profile.roles.normalized().to_strings()),
            created_at: Some(profile.created_at),
            updated_at: Some(profile.updated_at),
        }
    }
}

/// Hosted profiles table client
#[derive(Clone)]
pub struct HostedProfileStore {
    api: HostedApi,
}

impl HostedProfileStore {
    /// Wrap a configured API client
    #[must_use]
    pub const fn new(api: HostedApi) -> Self {
        Self { api }
    }

    async fn select<T: for<'de> Deserialize<'de>>(&self, query: &str) -> AppResult<Vec<T>> {
        let response = self
            .api
            .as_reader(Method::GET, &format!("{TABLE}?{query}"))?
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json::<Vec<T>>().await?)
        } else {
            Err(error_from_response(response).await)
        }
    }
}

#[async_trait]
impl ProfileStore for HostedProfileStore {
    fn name(&self) -> &'static str {
        "hosted"
    }

    async fn fetch_roles(&self, user_id: Uuid) -> AppResult<Option<RoleSet>> {
        let rows: Vec<RolesRow> = self
            .select(&format!("id=eq.{user_id}&select=roles"))
            .await?;

        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.roles)
            .map(RoleSet::from_strings)
            .filter(|roles| !roles.is_empty()))
    }

    async fn get_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        let rows: Vec<ProfileRow> = self
            .select(&format!("id=eq.{user_id}&select={PROFILE_COLUMNS}"))
            .await?;
        Ok(rows.into_iter().next().map(Profile::from))
    }

    async fn list_profiles(&self) -> AppResult<Vec<Profile>> {
        let rows: Vec<ProfileRow> = self
            .select(&format!("select={PROFILE_COLUMNS}&order=created_at.desc"))
            .await?;
        Ok(rows.into_iter().map(Profile::from).collect())
    }

    async fn create_profile(&self, profile: &Profile) -> AppResult<()> {
        let response = self
            .api
            .as_service(Method::POST, TABLE)?
            .header("Prefer", "return=minimal")
            .json(&ProfileRow::from(profile))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn update_roles(&self, user_id: Uuid, roles: RoleSet) -> AppResult<()> {
        let response = self
            .api
            .as_service(Method::PATCH, &format!("{TABLE}?id=eq.{user_id}"))?
            .header("Prefer", "return=representation")
            .json(&json!({
                "roles": roles.normalized().to_strings(),
                "updated_at": Utc::now(),
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        let updated: Vec<serde_json::Value> = response.json().await?;
        if updated.is_empty() {
            return Err(AppError::not_found(format!("Profile {user_id}")));
        }
        Ok(())
    }

    async fn delete_profile(&self, user_id: Uuid) -> AppResult<()> {
        let response = self
            .api
            .as_service(Method::DELETE, &format!("{TABLE}?id=eq.{user_id}"))?
            .header("Prefer", "return=representation")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        let deleted: Vec<serde_json::Value> = response.json().await?;
        if deleted.is_empty() {
            return Err(AppError::not_found(format!("Profile {user_id}")));
        }
        Ok(())
    }
}
