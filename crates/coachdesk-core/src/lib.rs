// ABOUTME: Core types and constants for the Coachdesk gateway
// ABOUTME: Foundation crate with error handling, roles, route tables, and session models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Coachdesk Core
//!
//! Shared types for the Coachdesk gateway. Kept separate from the server crate
//! so the types that change rarely do not trigger full rebuilds.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode`, and the JSON error body
//! - **permissions**: closed `Role` enum and `RoleSet` bitflags
//! - **constants**: route tables, cookie names, environment variable names
//! - **models**: identity, profile, and session records

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Role model with bitflags sets
pub mod permissions;

/// Core data models
pub mod models;
