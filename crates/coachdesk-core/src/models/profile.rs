// ABOUTME: Application profile record keyed by identity id
// ABOUTME: Holds the role set that drives area access and admin authorization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permissions::RoleSet;

/// Profile record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Identity id
    pub id: Uuid,
    /// Contact email
    pub email: String,
    /// Display name
    pub full_name: Option<String>,
    /// Assigned roles, never empty once stored
    pub roles: RoleSet,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last role or name change
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// New profile with normalized roles
    pub fn new(id: Uuid, email: impl Into<String>, roles: RoleSet) -> Self {
        let now = Utc::now();
        Self {
            id,
            email: email.into(),
            full_name: None,
            roles: roles.normalized(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }
}
