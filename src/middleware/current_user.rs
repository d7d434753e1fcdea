// ABOUTME: Extractor for the signed-in user attached by the request gate
// ABOUTME: Rejects with AUTH_REQUIRED when the gate found no session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::errors::AppError;
use crate::gate::CurrentSession;

/// Signed-in user for API handlers
#[derive(Debug, Clone)]
pub struct CurrentUser(pub CurrentSession);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .map(Self)
            .ok_or_else(AppError::auth_required)
    }
}
