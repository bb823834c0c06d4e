//! The transactional room store.
//!
//! The store is the only shared mutable resource: it owns the committed
//! room documents, serializes concurrent transforms against each one, and
//! pushes committed changes to subscribers. The engine never talks to a
//! store directly; the service applies engine transforms through
//! [`RoomStore::transact`].

mod memory;

pub use memory::MemoryStore;

use crate::room::{MessageId, Room};
use async_trait::async_trait;
use derive_more::{Display, Error};
use tokio::sync::broadcast;

/// Store failure with caller location tracking.
///
/// Opaque to the rest of the system: there is no store-specific recovery,
/// the failure just propagates.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Line number where the error occurred.
    pub line: u32,
    /// Source file where the error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error at the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// A chat message to append, before the store assigns it an id and a
/// timestamp.
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct NewMessage {
    /// Sender's user id.
    pub uid: String,
    /// Sender's display name.
    pub name: String,
    /// Message body.
    pub text: String,
}

/// A subscription to one room's committed changes.
#[derive(Debug)]
pub struct RoomFeed {
    /// The committed document at subscription time, if the room exists.
    pub current: Option<Room>,
    /// Receives every subsequently committed document.
    pub changes: broadcast::Receiver<Room>,
}

/// Atomic read-modify-write storage for room documents.
///
/// Implementations must apply [`transact`](Self::transact) transforms
/// against the latest committed state, serially per room; a transform may
/// be re-invoked on conflict, so it must be free of external side
/// effects. Committing an unchanged document is a no-op: subscribers are
/// not notified and `updated_at` is not advanced.
#[async_trait]
pub trait RoomStore: Send + Sync + 'static {
    /// Reads the committed document, if the room exists.
    async fn read(&self, id: &str) -> Result<Option<Room>, StoreError>;

    /// Unconditionally writes a document. Used only at room creation.
    async fn write(&self, room: Room) -> Result<(), StoreError>;

    /// Applies `transform` to the latest committed state and commits the
    /// result, retrying on conflicting concurrent writers.
    ///
    /// The transform receives `None` when the room does not exist.
    /// Returning `None` leaves the store untouched. Returns the committed
    /// document (`None` if the room still does not exist).
    async fn transact<F>(&self, id: &str, transform: F) -> Result<Option<Room>, StoreError>
    where
        F: FnMut(Option<Room>) -> Option<Room> + Send;

    /// Appends a chat message under a freshly generated id, stamping the
    /// current time, and returns the id.
    async fn append_message(&self, id: &str, message: NewMessage)
        -> Result<MessageId, StoreError>;

    /// Subscribes to the room: the current committed value immediately,
    /// then every committed change.
    async fn subscribe(&self, id: &str) -> Result<RoomFeed, StoreError>;
}
