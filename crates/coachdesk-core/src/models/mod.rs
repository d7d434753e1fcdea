// ABOUTME: Core data models shared by the gate, the stores, and the admin actions
// ABOUTME: Re-exports identity, profile, and session types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! - `AuthUser`: the auth provider's identity record as seen by the gateway
//! - `Profile`: the application record holding role assignments
//! - `SessionTokens` / `IssuedSession`: token pair carried in cookies

mod profile;
mod session;
mod user;

pub use profile::Profile;
pub use session::{IssuedSession, SessionTokens};
pub use user::{AuthUser, UserMetadata};
