// ABOUTME: Closed role model with a bitflags role set for membership and union checks
// ABOUTME: Maps profile role strings to Role values and defines who may grant each role
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Roles
//!
//! Profiles store roles as a list of strings. Inside the gateway they become a
//! [`RoleSet`], so membership tests are bit operations and a misspelled role
//! can never be granted.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::{AppError, AppResult};

/// A single role a profile can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Trains under a coach
    Athlete,
    /// Manages clients and programs
    Coach,
    /// Manages coaches and athletes
    Admin,
    /// Manages admins
    SuperAdmin,
}

impl Role {
    /// Every role, in stable display order
    pub const ALL: [Self; 4] = [Self::Athlete, Self::Coach, Self::Admin, Self::SuperAdmin];

    /// Role name as stored in profiles
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Athlete => "athlete",
            Self::Coach => "coach",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Single-role set for this role
    #[must_use]
    pub const fn flag(self) -> RoleSet {
        match self {
            Self::Athlete => RoleSet::ATHLETE,
            Self::Coach => RoleSet::COACH,
            Self::Admin => RoleSet::ADMIN,
            Self::SuperAdmin => RoleSet::SUPER_ADMIN,
        }
    }

    /// Roles a caller must hold (any of) to grant or revoke this role.
    ///
    /// `super_admin` is never managed through the API, so its requirement is
    /// the empty set.
    #[must_use]
    pub const fn managed_by(self) -> RoleSet {
        match self {
            Self::Athlete | Self::Coach => RoleSet::ADMIN.union(RoleSet::SUPER_ADMIN),
            Self::Admin => RoleSet::SUPER_ADMIN,
            Self::SuperAdmin => RoleSet::empty(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            "athlete" => Ok(Self::Athlete),
            "coach" => Ok(Self::Coach),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            other => Err(AppError::invalid_input(format!("Unknown role: {other}"))),
        }
    }
}

bitflags! {
    /// Set of roles held by a profile
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RoleSet: u8 {
        /// athlete
        const ATHLETE = 0b0001;
        /// coach
        const COACH = 0b0010;
        /// admin
        const ADMIN = 0b0100;
        /// `super_admin`
        const SUPER_ADMIN = 0b1000;
    }
}

impl RoleSet {
    /// Roles assumed when a profile has no roles recorded
    pub const DEFAULT: Self = Self::ATHLETE;

    /// Roles that may manage other users
    pub const ADMINISTRATORS: Self = Self::ADMIN.union(Self::SUPER_ADMIN);

    /// Build a set from a single role
    #[must_use]
    pub const fn of(role: Role) -> Self {
        role.flag()
    }

    /// Whether the set holds `role`
    #[must_use]
    pub const fn contains_role(self, role: Role) -> bool {
        self.contains(role.flag())
    }

    /// Whether the set holds at least one role of `other`
    #[must_use]
    pub const fn contains_any(self, other: Self) -> bool {
        self.intersects(other)
    }

    /// Set with `role` added
    #[must_use]
    pub const fn with_role(self, role: Role) -> Self {
        self.union(role.flag())
    }

    /// Set with `role` removed
    #[must_use]
    pub const fn without_role(self, role: Role) -> Self {
        self.difference(role.flag())
    }

    /// Replace an empty set with [`RoleSet::DEFAULT`]
    #[must_use]
    pub const fn normalized(self) -> Self {
        if self.is_empty() {
            Self::DEFAULT
        } else {
            self
        }
    }

    /// Roles in the set, in stable order
    pub fn roles(self) -> impl Iterator<Item = Role> {
        Role::ALL
            .into_iter()
            .filter(move |role| self.contains_role(*role))
    }

    /// Parse a stored role list. Unknown names are dropped with a warning.
    pub fn from_strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        values
            .into_iter()
            .fold(Self::empty(), |set, value| match value.as_ref().parse::<Role>() {
                Ok(role) => set.with_role(role),
                Err(_) => {
                    tracing::warn!(role = value.as_ref(), "Ignoring unknown role in profile");
                    set
                }
            })
    }

    /// Role names in stable order
    #[must_use]
    pub fn to_strings(self) -> Vec<String> {
        self.roles().map(|role| role.as_str().to_owned()).collect()
    }
}

impl Default for RoleSet {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.to_strings().join(", "))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, role| set.with_role(role))
    }
}

impl Serialize for RoleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.roles().map(Role::as_str))
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(Self::from_strings(names))
    }
}
