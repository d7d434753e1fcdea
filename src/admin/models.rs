// ABOUTME: Request and response types for admin role and account actions
// ABOUTME: Invite input, temporary password output, and the uniform AdminResponse envelope
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::permissions::RoleSet;

/// Input for inviting a new user
#[derive(Debug, Clone, Deserialize)]
pub struct InviteRequest {
    /// Invitee email
    pub email: String,
    /// Optional display name
    #[serde(default)]
    pub full_name: Option<String>,
    /// Initial roles; empty means the default
    #[serde(default)]
    pub roles: RoleSet,
}

/// Temporary credentials handed back to the admin after a reset
#[derive(Debug, Clone, Serialize)]
pub struct TemporaryPassword {
    /// Target identity
    pub user_id: Uuid,
    /// Target email
    pub email: String,
    /// Generated password, shown once
    pub password: String,
}

/// Uniform admin API response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResponse {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human readable outcome
    pub message: String,
    /// Action-specific payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl AdminResponse {
    /// Successful response with a payload
    pub fn ok(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    /// Failed response
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}
