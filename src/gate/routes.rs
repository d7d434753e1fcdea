// ABOUTME: Static route classification used by the request gate
// ABOUTME: Maps a request path to coach, athlete, admin, auth-only, role-select, and password categories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use bitflags::bitflags;

use crate::constants::{paths, route_prefixes, static_assets};

const ROLE_SELECT_PATHS: &[&str] = &[paths::SELECT_ROLE];
const FORCE_PASSWORD_PATHS: &[&str] = &[paths::CHANGE_PASSWORD];

bitflags! {
    /// Categories a path belongs to; a path may belong to several or none
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RouteCategories: u8 {
        /// Coach area
        const COACH = 1 << 0;
        /// Athlete area
        const ATHLETE = 1 << 1;
        /// Admin area
        const ADMIN = 1 << 2;
        /// Login, register, and password reset pages
        const AUTH_ONLY = 1 << 3;
        /// Role picker page
        const ROLE_SELECT = 1 << 4;
        /// Forced password change page
        const FORCE_PASSWORD = 1 << 5;
    }
}

impl RouteCategories {
    /// Categories that require a session
    pub const PROTECTED: Self = Self::COACH.union(Self::ATHLETE).union(Self::ADMIN);

    /// Classify a request path
    #[must_use]
    pub fn classify(path: &str) -> Self {
        let mut categories = Self::empty();
        let tables = [
            (Self::COACH, route_prefixes::COACH),
            (Self::ATHLETE, route_prefixes::ATHLETE),
            (Self::ADMIN, route_prefixes::ADMIN),
            (Self::AUTH_ONLY, route_prefixes::AUTH_ONLY),
            (Self::ROLE_SELECT, ROLE_SELECT_PATHS),
            (Self::FORCE_PASSWORD, FORCE_PASSWORD_PATHS),
        ];

        for (category, prefixes) in tables {
            if prefixes.iter().any(|prefix| matches_prefix(path, prefix)) {
                categories |= category;
            }
        }
        categories
    }

    /// Whether any protected category applies
    #[must_use]
    pub const fn is_protected(self) -> bool {
        self.intersects(Self::PROTECTED)
    }
}

/// Prefix match on whole path segments: `/admin` matches `/admin` and
/// `/admin/coaches` but not `/administrator`
#[must_use]
pub fn matches_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Paths the gate never runs for
#[must_use]
pub fn is_static_asset(path: &str) -> bool {
    if static_assets::PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
    {
        return true;
    }

    path.rsplit_once('.').is_some_and(|(stem, extension)| {
        !stem.is_empty()
            && !extension.contains('/')
            && static_assets::EXTENSIONS
                .iter()
                .any(|known| extension.eq_ignore_ascii_case(known))
    })
}

/// Paths reachable while a password change is pending
#[must_use]
pub fn is_force_password_exempt(path: &str) -> bool {
    path == paths::CHANGE_PASSWORD
        || path == paths::LOGOUT
        || path == paths::ACCOUNT_PASSWORD_API
        || is_static_asset(path)
}
