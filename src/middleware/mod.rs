// ABOUTME: HTTP middleware for request tracing, CORS, and session extraction
// ABOUTME: Provides request ID propagation, span creation, and the signed-in user extractor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// CORS layer
pub mod cors;
/// Signed-in user extractor
pub mod current_user;
/// Request IDs and HTTP spans
pub mod tracing;

pub use cors::setup_cors;
pub use current_user::CurrentUser;
pub use tracing::{request_id_layers, trace_layer, REQUEST_ID_HEADER};
