// ABOUTME: Security helpers for session transport
// ABOUTME: Cookie parsing and Set-Cookie construction for session tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Session cookie reading and writing
pub mod cookies;
