// ABOUTME: SQLite profile store for deployments that keep profiles outside the hosted backend
// ABOUTME: Roles are stored as a JSON string array, ids and timestamps as text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::ProfileStore;
use crate::errors::{AppError, AppResult};
use crate::models::Profile;
use crate::permissions::RoleSet;

/// Profile store on a SQLite pool
#[derive(Clone)]
pub struct SqliteProfileStore {
    pool: SqlitePool,
}

impl SqliteProfileStore {
    /// Connect, creating the database file if needed, and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails, or the
    /// schema cannot be created
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let in_memory = database_url.contains(":memory:");
        if !in_memory {
            ensure_parent_dir(database_url)?;
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to an in-memory database is a separate database.
        let max_connections = if in_memory { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        info!("SQLite profile store ready: {database_url}");
        Ok(store)
    }

    /// Create the profiles table
    ///
    /// # Errors
    ///
    /// Returns an error if the schema statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                full_name TEXT,
                roles TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_profiles_email ON profiles(email)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Underlying pool, for tests that seed legacy rows
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn ensure_parent_dir(database_url: &str) -> AppResult<()> {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::database(format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
    }
    Ok(())
}

fn parse_roles(raw: Option<&str>) -> AppResult<Option<RoleSet>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let names: Option<Vec<String>> = serde_json::from_str(raw)?;
    Ok(names
        .map(RoleSet::from_strings)
        .filter(|roles| !roles.is_empty()))
}

fn encode_roles(roles: RoleSet) -> AppResult<String> {
    Ok(serde_json::to_string(&roles.normalized())?)
}

fn row_to_profile(row: &SqliteRow) -> AppResult<Profile> {
    let id: String = row.try_get("id")?;
    let roles: Option<String> = row.try_get("roles")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    Ok(Profile {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::database(format!("Invalid profile id '{id}': {e}")))?,
        email: row.try_get("email")?,
        full_name: row.try_get("full_name")?,
        roles: parse_roles(roles.as_deref())?.unwrap_or(RoleSet::DEFAULT),
        created_at,
        updated_at,
    })
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn fetch_roles(&self, user_id: Uuid) -> AppResult<Option<RoleSet>> {
        let row = sqlx::query("SELECT roles FROM profiles WHERE id = ?1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let roles: Option<String> = row.try_get("roles")?;
                parse_roles(roles.as_deref())
            }
            None => Ok(None),
        }
    }

    async fn get_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        let row = sqlx::query(
            "SELECT id, email, full_name, roles, created_at, updated_at FROM profiles WHERE id = ?1",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_profile).transpose()
    }

    async fn list_profiles(&self) -> AppResult<Vec<Profile>> {
        let rows = sqlx::query(
            "SELECT id, email, full_name, roles, created_at, updated_at FROM profiles ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_profile).collect()
    }

    async fn create_profile(&self, profile: &Profile) -> AppResult<()> {
        let result = sqlx::query(
            r"
            INSERT INTO profiles (id, email, full_name, roles, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(profile.id.to_string())
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(encode_roles(profile.roles)?)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                AppError::already_exists(format!("Profile {}", profile.id)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_roles(&self, user_id: Uuid, roles: RoleSet) -> AppResult<()> {
        let result = sqlx::query("UPDATE profiles SET roles = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(encode_roles(roles)?)
            .bind(Utc::now())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Profile {user_id}")));
        }
        Ok(())
    }

    async fn delete_profile(&self, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = ?1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Profile {user_id}")));
        }
        Ok(())
    }
}
