//! In-process store implementation.

use super::{NewMessage, RoomFeed, RoomStore, StoreError};
use crate::room::{ChatMessage, MessageId, Room, RoomId};
use async_trait::async_trait;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

/// Buffered change notifications per room before slow subscribers lag.
const CHANNEL_CAPACITY: usize = 64;

/// Length of generated chat message ids.
const MESSAGE_ID_LEN: usize = 16;

struct Inner {
    rooms: HashMap<RoomId, Room>,
    channels: HashMap<RoomId, broadcast::Sender<Room>>,
}

/// Room store backed by process memory.
///
/// A single mutex serializes all transforms, which makes this the
/// degenerate case of optimistic concurrency: transforms are applied to
/// the latest committed state and conflicts cannot occur, so the retry
/// loop the [`RoomStore`] contract allows for never runs.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                rooms: HashMap::new(),
                channels: HashMap::new(),
            })),
        }
    }

    fn guard(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::new("store mutex poisoned"))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

fn notify(inner: &Inner, id: &str, room: &Room) {
    if let Some(tx) = inner.channels.get(id) {
        // Send only fails when no subscriber is listening.
        let _ = tx.send(room.clone());
    }
}

fn generate_message_id() -> MessageId {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(MESSAGE_ID_LEN)
        .map(char::from)
        .collect()
}

#[async_trait]
impl RoomStore for MemoryStore {
    #[instrument(skip(self))]
    async fn read(&self, id: &str) -> Result<Option<Room>, StoreError> {
        let inner = self.guard()?;
        Ok(inner.rooms.get(id).cloned())
    }

    #[instrument(skip(self, room), fields(room_id = %room.id))]
    async fn write(&self, room: Room) -> Result<(), StoreError> {
        let mut inner = self.guard()?;
        if inner.rooms.contains_key(&room.id) {
            warn!(room_id = %room.id, "overwriting existing document");
        }
        inner.rooms.insert(room.id.clone(), room.clone());
        notify(&inner, &room.id, &room);
        Ok(())
    }

    #[instrument(skip(self, transform))]
    async fn transact<F>(&self, id: &str, mut transform: F) -> Result<Option<Room>, StoreError>
    where
        F: FnMut(Option<Room>) -> Option<Room> + Send,
    {
        let mut inner = self.guard()?;
        let before = inner.rooms.get(id).cloned();

        match transform(before.clone()) {
            Some(mut room) => {
                if before.as_ref() == Some(&room) {
                    debug!(room_id = id, "no-op commit");
                    return Ok(Some(room));
                }
                room.updated_at = Utc::now().timestamp_millis();
                inner.rooms.insert(id.to_string(), room.clone());
                notify(&inner, id, &room);
                Ok(Some(room))
            }
            None => Ok(before),
        }
    }

    #[instrument(skip(self, message), fields(uid = %message.uid))]
    async fn append_message(
        &self,
        id: &str,
        message: NewMessage,
    ) -> Result<MessageId, StoreError> {
        let mut inner = self.guard()?;
        let now = Utc::now().timestamp_millis();

        let Some(room) = inner.rooms.get_mut(id) else {
            return Err(StoreError::new(format!("room '{id}' not found")));
        };

        let mut message_id = generate_message_id();
        while room.messages.contains_key(&message_id) {
            message_id = generate_message_id();
        }

        room.messages.insert(
            message_id.clone(),
            ChatMessage {
                uid: message.uid,
                name: message.name,
                text: message.text,
                created_at: now,
            },
        );
        room.updated_at = now;

        let snapshot = room.clone();
        notify(&inner, id, &snapshot);
        Ok(message_id)
    }

    #[instrument(skip(self))]
    async fn subscribe(&self, id: &str) -> Result<RoomFeed, StoreError> {
        let mut inner = self.guard()?;
        let current = inner.rooms.get(id).cloned();
        let tx = inner
            .channels
            .entry(id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        Ok(RoomFeed {
            current,
            changes: tx.subscribe(),
        })
    }
}
