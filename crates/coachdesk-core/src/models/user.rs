// ABOUTME: Identity record returned by the auth provider
// ABOUTME: Carries the user id, email, and session metadata such as the forced password change flag
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Metadata stored alongside the identity by the auth provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    /// User must set a new password before using the app
    #[serde(default)]
    pub force_password_change: bool,
}

/// Authenticated identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Identity id, also the profile key
    pub id: Uuid,
    /// Sign-in email
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Provider-side metadata
    #[serde(default, alias = "user_metadata", deserialize_with = "null_as_default")]
    pub metadata: UserMetadata,
}

/// Providers send `null` for absent fields (phone-only identities have no email)
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl AuthUser {
    /// Create an identity with default metadata
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            metadata: UserMetadata::default(),
        }
    }

    /// Whether the forced password change interstitial applies
    #[must_use]
    pub const fn must_change_password(&self) -> bool {
        self.metadata.force_password_change
    }
}
