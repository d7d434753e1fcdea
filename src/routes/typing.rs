// ABOUTME: Typing indicator route handlers for conversation participants
// ABOUTME: Keystroke and stop notifications plus a server-sent event stream per conversation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::debug;
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::resources::ServerResources;

/// SSE event name for typing changes
pub const TYPING_EVENT: &str = "typing";

/// Typing notification body
#[derive(Debug, Deserialize)]
pub struct TypingRequest {
    /// `true` on keystroke, `false` on explicit stop
    pub is_typing: bool,
}

/// How many subscribers received the resulting event
#[derive(Debug, Serialize, Deserialize)]
pub struct TypingResponse {
    /// Receivers of the published event; 0 when nothing was sent
    pub delivered: usize,
}

/// Typing route definitions
pub struct TypingRoutes;

impl TypingRoutes {
    /// Create all typing routes
    pub fn routes(resources: &Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/conversations/:id/typing",
                post(Self::handle_typing),
            )
            .route(
                "/api/conversations/:id/typing/stream",
                get(Self::handle_stream),
            )
            .with_state(Arc::clone(resources))
    }

    async fn handle_typing(
        State(resources): State<Arc<ServerResources>>,
        CurrentUser(session): CurrentUser,
        Path(conversation_id): Path<Uuid>,
        Json(request): Json<TypingRequest>,
    ) -> Json<TypingResponse> {
        let user_id = session.user.id;
        let delivered = if request.is_typing {
            resources.typing.keystroke(conversation_id, user_id)
        } else {
            resources.typing.stop(conversation_id, user_id)
        };
        Json(TypingResponse { delivered })
    }

    async fn handle_stream(
        State(resources): State<Arc<ServerResources>>,
        CurrentUser(session): CurrentUser,
        Path(conversation_id): Path<Uuid>,
    ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        let viewer = session.user.id;
        let receiver = resources.typing_hub.subscribe(conversation_id);
        debug!(conversation_id = %conversation_id, user_id = %viewer, "Typing stream opened");

        let events = BroadcastStream::new(receiver).filter_map(move |item| match item {
            Ok(event) if event.user_id != viewer => Event::default()
                .event(TYPING_EVENT)
                .json_data(&event)
                .ok()
                .map(Ok),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                debug!(skipped, "Typing stream lagged, skipping missed events");
                None
            }
        });

        Sse::new(events).keep_alive(KeepAlive::default())
    }
}
