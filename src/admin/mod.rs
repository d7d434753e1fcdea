// ABOUTME: Administration of roles and accounts for signed-in admins
// ABOUTME: Authorization table, verified role writes, and compensating multi-step actions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Admin Actions
//!
//! | Action | Caller needs |
//! |---|---|
//! | grant/revoke `athlete`, `coach` | `admin` or `super_admin` |
//! | grant/revoke `admin` | `super_admin` |
//! | grant/revoke `super_admin` | not possible |
//! | invite, resend invite, reset password | `admin` or `super_admin` (`super_admin` to invite an admin) |
//! | delete | `super_admin` |

/// Role and account actions
pub mod actions;
/// Request and response types
pub mod models;

pub use actions::RoleAdminService;
pub use models::{AdminResponse, InviteRequest, TemporaryPassword};
