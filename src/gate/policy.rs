// ABOUTME: Redirect table of the request gate as pure functions
// ABOUTME: Splits the decision into a session phase and a role phase so roles are fetched only when needed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use crate::constants::paths;
use crate::models::AuthUser;
use crate::permissions::{Role, RoleSet};

use super::routes::{is_force_password_exempt, RouteCategories};

/// Why a request was redirected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// Protected page without a session
    Unauthenticated,
    /// Password change pending
    ForcePasswordChange,
    /// Auth-only page with a session
    AlreadySignedIn,
    /// Roles do not grant the requested area
    RoleMismatch,
}

impl fmt::Display for RedirectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unauthenticated => "unauthenticated",
            Self::ForcePasswordChange => "force_password_change",
            Self::AlreadySignedIn => "already_signed_in",
            Self::RoleMismatch => "role_mismatch",
        })
    }
}

/// Outcome of the gate for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Pass the request through
    Continue,
    /// Answer with `302 Found`
    Redirect {
        /// `Location` header value
        location: String,
        /// Why
        reason: RedirectReason,
    },
}

impl GateDecision {
    fn redirect(location: impl Into<String>, reason: RedirectReason) -> Self {
        Self::Redirect {
            location: location.into(),
            reason,
        }
    }

    /// Redirect target, if any
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Continue => None,
            Self::Redirect { location, .. } => Some(location),
        }
    }
}

/// Login URL that returns to `path` after sign-in
#[must_use]
pub fn login_redirect(path: &str) -> String {
    format!(
        "{}?{}={}",
        paths::LOGIN,
        paths::REDIRECT_TO_PARAM,
        urlencoding::encode(path)
    )
}

/// Everything decidable without the role list.
///
/// Returns `None` when the user is signed in and the path is protected, in
/// which case [`decide_with_roles`] finishes the decision.
#[must_use]
pub fn decide_without_roles(
    path: &str,
    categories: RouteCategories,
    user: Option<&AuthUser>,
) -> Option<GateDecision> {
    let Some(user) = user else {
        if categories.is_protected() {
            return Some(GateDecision::redirect(
                login_redirect(path),
                RedirectReason::Unauthenticated,
            ));
        }
        if categories.intersects(RouteCategories::ROLE_SELECT | RouteCategories::FORCE_PASSWORD) {
            return Some(GateDecision::redirect(
                paths::LOGIN,
                RedirectReason::Unauthenticated,
            ));
        }
        return Some(GateDecision::Continue);
    };

    if user.must_change_password() && !is_force_password_exempt(path) {
        return Some(GateDecision::redirect(
            paths::CHANGE_PASSWORD,
            RedirectReason::ForcePasswordChange,
        ));
    }

    if categories.contains(RouteCategories::AUTH_ONLY)
        && !categories.intersects(RouteCategories::ROLE_SELECT | RouteCategories::FORCE_PASSWORD)
    {
        return Some(GateDecision::redirect(
            paths::DASHBOARD,
            RedirectReason::AlreadySignedIn,
        ));
    }

    if categories.is_protected() {
        None
    } else {
        Some(GateDecision::Continue)
    }
}

/// Area membership check for a signed-in user on a protected path
#[must_use]
pub fn decide_with_roles(categories: RouteCategories, roles: RoleSet) -> GateDecision {
    if categories.contains(RouteCategories::ADMIN) && !roles.contains_role(Role::Admin) {
        let fallback = if roles.contains_role(Role::Coach) {
            paths::DASHBOARD
        } else {
            paths::ATHLETE_HOME
        };
        return GateDecision::redirect(fallback, RedirectReason::RoleMismatch);
    }

    if categories.contains(RouteCategories::COACH)
        && !roles.contains_any(RoleSet::COACH | RoleSet::ADMIN)
    {
        return GateDecision::redirect(paths::ATHLETE_HOME, RedirectReason::RoleMismatch);
    }

    if categories.contains(RouteCategories::ATHLETE)
        && !roles.contains_any(RoleSet::ATHLETE | RoleSet::COACH | RoleSet::ADMIN)
    {
        return GateDecision::redirect(paths::DASHBOARD, RedirectReason::RoleMismatch);
    }

    GateDecision::Continue
}

/// Full gate decision with the role list already known.
///
/// `roles` is the profile's recorded roles; `None` means no row or no roles
/// and is treated as `[athlete]`.
#[must_use]
pub fn decide(path: &str, user: Option<&AuthUser>, roles: Option<RoleSet>) -> GateDecision {
    let categories = RouteCategories::classify(path);
    decide_without_roles(path, categories, user).unwrap_or_else(|| {
        decide_with_roles(
            categories,
            roles.map_or(RoleSet::DEFAULT, RoleSet::normalized),
        )
    })
}

/// Where a user lands after the OAuth callback when no target was requested
#[must_use]
pub fn default_area(roles: RoleSet) -> &'static str {
    if roles.contains_role(Role::Admin) {
        paths::ADMIN_HOME
    } else if roles.contains_role(Role::Coach) {
        paths::DASHBOARD
    } else {
        paths::ATHLETE_HOME
    }
}

/// Whether the user must pick an area after signing in
#[must_use]
pub fn needs_role_selection(roles: RoleSet) -> bool {
    (roles & (RoleSet::ATHLETE | RoleSet::COACH | RoleSet::ADMIN))
        .bits()
        .count_ones()
        > 1
}
