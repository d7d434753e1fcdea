// ABOUTME: Server-sent event fan-out for realtime conversation state
// ABOUTME: Currently carries typing indicators between conversation participants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Typing indicator hub and debouncer
pub mod typing;

pub use typing::{next_event, TypingDebouncer, TypingEvent, TypingHub};
