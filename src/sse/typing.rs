// ABOUTME: Typing indicator fan-out with one broadcast channel per conversation
// ABOUTME: At-most-once delivery plus a server-side idle debounce per conversation participant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// One typing state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingEvent {
    /// Conversation the event belongs to
    pub conversation_id: Uuid,
    /// Participant who is or stopped typing
    pub user_id: Uuid,
    /// `true` while typing
    pub is_typing: bool,
    /// Server time of the change
    pub at: DateTime<Utc>,
}

impl TypingEvent {
    /// Event stamped with the current time
    #[must_use]
    pub fn new(conversation_id: Uuid, user_id: Uuid, is_typing: bool) -> Self {
        Self {
            conversation_id,
            user_id,
            is_typing,
            at: Utc::now(),
        }
    }
}

/// Per-conversation broadcast channels.
///
/// Events published while nobody listens are dropped. Slow subscribers skip
/// whatever fell out of the channel buffer.
pub struct TypingHub {
    channels: DashMap<Uuid, broadcast::Sender<TypingEvent>>,
    capacity: usize,
}

impl TypingHub {
    /// Hub whose channels buffer `capacity` events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Listen to a conversation, creating its channel on first use.
    ///
    /// Channels whose subscribers have all gone are swept first, so the map
    /// never holds more than the live channels plus those abandoned since the
    /// previous subscribe.
    pub fn subscribe(&self, conversation_id: Uuid) -> broadcast::Receiver<TypingEvent> {
        self.prune();
        self.channels
            .entry(conversation_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Send an event to current subscribers; returns how many received it
    pub fn publish(&self, event: TypingEvent) -> usize {
        let conversation_id = event.conversation_id;
        let Some(sender) = self
            .channels
            .get(&conversation_id)
            .map(|entry| entry.value().clone())
        else {
            debug!(conversation_id = %conversation_id, "No typing subscribers, event dropped");
            return 0;
        };

        if let Ok(delivered) = sender.send(event) {
            delivered
        } else {
            self.channels
                .remove_if(&conversation_id, |_, sender| sender.receiver_count() == 0);
            debug!(conversation_id = %conversation_id, "Typing channel idle, removed");
            0
        }
    }

    /// Drop channels nobody listens to; returns how many were removed
    pub fn prune(&self) -> usize {
        let before = self.channels.len();
        self.channels.retain(|_, sender| sender.receiver_count() > 0);
        let removed = before.saturating_sub(self.channels.len());
        if removed > 0 {
            debug!(removed, "Idle typing channels pruned");
        }
        removed
    }

    /// Number of conversations with a live channel
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

impl Default for TypingHub {
    fn default() -> Self {
        Self::new(crate::constants::defaults::TYPING_CHANNEL_CAPACITY)
    }
}

/// Next event for a subscriber, skipping events lost to lag.
///
/// Returns `None` once the channel is closed.
pub async fn next_event(receiver: &mut broadcast::Receiver<TypingEvent>) -> Option<TypingEvent> {
    loop {
        match receiver.recv().await {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "Typing subscriber lagged, skipping missed events");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

type TimerKey = (Uuid, Uuid);

/// Collapses keystrokes into start and stop events.
///
/// A keystroke announces typing only when the participant was idle, then
/// (re)arms an idle timer. When the timer fires a stop event goes out.
#[derive(Clone)]
pub struct TypingDebouncer {
    hub: Arc<TypingHub>,
    idle_timeout: Duration,
    timers: Arc<DashMap<TimerKey, (u64, JoinHandle<()>)>>,
    generation: Arc<AtomicU64>,
}

impl TypingDebouncer {
    /// Debouncer publishing into `hub`
    #[must_use]
    pub fn new(hub: Arc<TypingHub>, idle_timeout: Duration) -> Self {
        Self {
            hub,
            idle_timeout,
            timers: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record a keystroke; returns deliveries of the start event (0 when the
    /// participant was already typing)
    pub fn keystroke(&self, conversation_id: Uuid, user_id: Uuid) -> usize {
        let key = (conversation_id, user_id);
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);

        match self.timers.entry(key) {
            Entry::Occupied(mut entry) => {
                entry.get().1.abort();
                entry.insert((generation, self.arm(key, generation)));
                0
            }
            Entry::Vacant(entry) => {
                let delivered = self
                    .hub
                    .publish(TypingEvent::new(conversation_id, user_id, true));
                entry.insert((generation, self.arm(key, generation)));
                delivered
            }
        }
    }

    /// Explicit stop; cancels the idle timer and publishes the stop event
    pub fn stop(&self, conversation_id: Uuid, user_id: Uuid) -> usize {
        if let Some((_, (_, handle))) = self.timers.remove(&(conversation_id, user_id)) {
            handle.abort();
        }
        self.hub
            .publish(TypingEvent::new(conversation_id, user_id, false))
    }

    /// Whether a participant currently counts as typing
    #[must_use]
    pub fn is_typing(&self, conversation_id: Uuid, user_id: Uuid) -> bool {
        self.timers.contains_key(&(conversation_id, user_id))
    }

    fn arm(&self, key: TimerKey, generation: u64) -> JoinHandle<()> {
        let hub = Arc::clone(&self.hub);
        let timers = Arc::clone(&self.timers);
        let idle_timeout = self.idle_timeout;

        tokio::spawn(async move {
            tokio::time::sleep(idle_timeout).await;
            let expired = timers
                .remove_if(&key, |_, (armed, _)| *armed == generation)
                .is_some();
            if expired {
                let (conversation_id, user_id) = key;
                hub.publish(TypingEvent::new(conversation_id, user_id, false));
            }
        })
    }
}
