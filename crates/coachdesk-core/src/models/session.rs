// ABOUTME: Session token pair and the result of a sign-in or refresh
// ABOUTME: Tokens are opaque to the gateway and only round-trip through cookies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

use super::AuthUser;

/// Access and refresh token pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    /// Short-lived access token
    pub access_token: String,
    /// Long-lived refresh token
    pub refresh_token: String,
}

// Tokens never reach logs.
impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Session issued by sign-in, code exchange, or refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    /// New token pair
    pub tokens: SessionTokens,
    /// Access token lifetime in seconds
    pub expires_in: u64,
    /// Identity the session belongs to
    pub user: AuthUser,
}
