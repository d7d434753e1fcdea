// ABOUTME: Request gate deciding, per request, whether to pass through or redirect
// ABOUTME: Combines session refresh, route classification, password policy, and role checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Request Gate
//!
//! Every non-static request goes through the gate in this order:
//!
//! 1. Resolve the session, refreshing an expired access token when a refresh
//!    token is present. Rotated or cleared cookies ride on the response
//!    whatever the outcome.
//! 2. Without a user, protected areas redirect to the login page with the
//!    requested path in `redirectTo`.
//! 3. A pending password change redirects everything except the change
//!    page, logout, the password API, and static assets.
//! 4. Signed-in users are sent away from login and registration pages.
//! 5. Area membership is checked against the profile's roles.
//!
//! [`policy`] holds the table as pure functions; [`middleware`] wires it
//! into axum.

/// Axum middleware and request extension
pub mod middleware;
/// Redirect table
pub mod policy;
/// Path classification
pub mod routes;

pub use middleware::{found, request_gate, CurrentSession, RequestGate};
pub use policy::{decide, GateDecision, RedirectReason};
pub use routes::RouteCategories;
