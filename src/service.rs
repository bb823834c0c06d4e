//! Room service: binds the transition engine to the store.
//!
//! Every mutation is an engine transform applied through
//! [`RoomStore::transact`]; the service adds the pieces that are not pure
//! state transitions: code generation, password digests, the rematch
//! orchestration, and chat appends.

use crate::games::gomoku::{Coord, Mark};
use crate::room::{engine, JoinError, MessageId, Room, RoomId, RoomStatus};
use crate::store::{NewMessage, RoomFeed, RoomStore, StoreError};
use chrono::Utc;
use derive_more::{Display, Error, From};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Room code alphabet: uppercase without the easily-confused characters.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Length of generated room codes.
const CODE_LEN: usize = 6;

/// Failure of a service operation.
///
/// Two tiers: [`JoinError`] carries the user-actionable rejections the
/// caller must surface, [`StoreError`] the opaque transport failures.
/// Precondition races are not errors at all; those operations return the
/// committed document unchanged.
#[derive(Debug, Display, Error, From)]
pub enum ServiceError {
    /// A join attempt was rejected.
    #[display("{_0}")]
    Join(JoinError),
    /// The store failed.
    #[display("{_0}")]
    Store(StoreError),
}

/// The room service.
pub struct RoomService<S> {
    store: Arc<S>,
}

impl<S> Clone for RoomService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> std::fmt::Debug for RoomService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomService").finish_non_exhaustive()
    }
}

impl<S: RoomStore> RoomService<S> {
    /// Creates a service over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates a new room in the lobby and returns its document.
    ///
    /// The room code is re-rolled until it does not collide with an
    /// existing room.
    #[instrument(skip(self, password))]
    pub async fn create_room(
        &self,
        name: &str,
        password: Option<&str>,
    ) -> Result<Room, ServiceError> {
        let mut code = generate_room_code();
        while self.store.read(&code).await?.is_some() {
            code = generate_room_code();
        }

        let now = Utc::now().timestamp_millis();
        let room = Room::new(code, name, password.map(hash_password), now);
        self.store.write(room.clone()).await?;

        info!(room_id = %room.id, protected = room.has_password(), "room created");
        Ok(room)
    }

    /// Seats `uid` in the room, returning the assigned mark.
    ///
    /// The slot assignment runs inside the store's atomic primitive, so
    /// two users racing for the last seat resolve to one seated and one
    /// [`JoinError::RoomFull`].
    #[instrument(skip(self, password))]
    pub async fn join_room(
        &self,
        id: &str,
        uid: &str,
        name: &str,
        password: Option<&str>,
    ) -> Result<Mark, ServiceError> {
        let digest = password.map(hash_password);

        let mut outcome: Option<Result<Mark, JoinError>> = None;
        self.store
            .transact(id, |room| match room {
                None => {
                    outcome = Some(Err(JoinError::RoomNotFound));
                    None
                }
                Some(room) => {
                    let (next, result) = engine::join(room, uid, name, digest.as_deref());
                    outcome = Some(result);
                    Some(next)
                }
            })
            .await?;

        match outcome.unwrap_or(Err(JoinError::RoomNotFound)) {
            Ok(side) => {
                info!(room_id = id, %uid, %side, "joined room");
                Ok(side)
            }
            Err(e) => {
                warn!(room_id = id, %uid, error = %e, "join rejected");
                Err(ServiceError::Join(e))
            }
        }
    }

    /// Sets a seat's ready flag, then runs the rematch orchestration:
    /// once both players are ready in `Lobby` or `RoundEnd`, the next
    /// round starts.
    #[instrument(skip(self))]
    pub async fn set_ready(
        &self,
        id: &str,
        side: Mark,
        ready: bool,
    ) -> Result<Option<Room>, ServiceError> {
        let committed = self
            .store
            .transact(id, |room| room.map(|r| engine::set_ready(r, side, ready)))
            .await?;

        if let Some(room) = &committed {
            let can_start = matches!(room.status, RoomStatus::Lobby | RoomStatus::RoundEnd);
            if can_start && room.players.both_ready() {
                return self.start_round(id).await;
            }
        }

        Ok(committed)
    }

    /// Starts the next round. Readiness is this caller's precondition;
    /// the transform itself re-validates seats and status.
    #[instrument(skip(self))]
    pub async fn start_round(&self, id: &str) -> Result<Option<Room>, ServiceError> {
        let committed = self
            .store
            .transact(id, |room| room.map(engine::start_round))
            .await?;
        Ok(committed)
    }

    /// Places a mark for the given side.
    #[instrument(skip(self))]
    pub async fn place_move(
        &self,
        id: &str,
        side: Mark,
        at: Coord,
    ) -> Result<Option<Room>, ServiceError> {
        let committed = self
            .store
            .transact(id, |room| room.map(|r| engine::place_move(r, side, at)))
            .await?;
        Ok(committed)
    }

    /// Proposes a draw.
    #[instrument(skip(self))]
    pub async fn offer_draw(&self, id: &str, side: Mark) -> Result<Option<Room>, ServiceError> {
        let committed = self
            .store
            .transact(id, |room| room.map(|r| engine::offer_draw(r, side)))
            .await?;
        Ok(committed)
    }

    /// Answers an outstanding draw offer.
    #[instrument(skip(self))]
    pub async fn respond_draw(
        &self,
        id: &str,
        side: Mark,
        accept: bool,
    ) -> Result<Option<Room>, ServiceError> {
        let committed = self
            .store
            .transact(id, |room| {
                room.map(|r| engine::respond_draw(r, side, accept))
            })
            .await?;
        Ok(committed)
    }

    /// Concedes the round for the given side.
    #[instrument(skip(self))]
    pub async fn surrender(&self, id: &str, side: Mark) -> Result<Option<Room>, ServiceError> {
        let committed = self
            .store
            .transact(id, |room| room.map(|r| engine::surrender(r, side)))
            .await?;
        Ok(committed)
    }

    /// Vacates a seat, returning the room to the lobby.
    #[instrument(skip(self))]
    pub async fn leave_room(&self, id: &str, side: Mark) -> Result<Option<Room>, ServiceError> {
        let committed = self
            .store
            .transact(id, |room| room.map(|r| engine::leave(r, side)))
            .await?;
        Ok(committed)
    }

    /// Appends a chat message, returning its generated id.
    ///
    /// Blank messages are dropped without touching the store.
    #[instrument(skip(self, text))]
    pub async fn send_message(
        &self,
        id: &str,
        uid: &str,
        name: &str,
        text: &str,
    ) -> Result<Option<MessageId>, ServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let message_id = self
            .store
            .append_message(
                id,
                NewMessage::new(uid.to_string(), name.to_string(), text.to_string()),
            )
            .await?;
        Ok(Some(message_id))
    }

    /// Reads the committed room document.
    #[instrument(skip(self))]
    pub async fn room(&self, id: &str) -> Result<Option<Room>, ServiceError> {
        Ok(self.store.read(id).await?)
    }

    /// Subscribes to the room's committed changes.
    #[instrument(skip(self))]
    pub async fn subscribe(&self, id: &str) -> Result<RoomFeed, ServiceError> {
        Ok(self.store.subscribe(id).await?)
    }
}

/// Generates a shareable room code.
fn generate_room_code() -> RoomId {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// SHA-256 hex digest of a room password.
fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_code_shape() {
        let code = generate_room_code();
        assert_eq!(code.len(), CODE_LEN);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_password_digest_is_stable_hex() {
        let a = hash_password("secret");
        let b = hash_password("secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(hash_password("secret"), hash_password("other"));
    }
}
