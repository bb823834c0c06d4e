//! Gomoku Rooms library - realtime lobby and game rooms.
//!
//! Two players share a room document holding the board, seats, scores,
//! draw offers and chat for 20x20 five-in-a-row. All mutation flows
//! through pure state transforms applied under the store's atomic
//! read-modify-write primitive, so concurrent clients either fully win a
//! write or have their stale intent resolve to a no-op.
//!
//! # Architecture
//!
//! - **Games**: pure board types and win detection ([`winning_line`])
//! - **Room**: the shared document and its guarded transition engine
//! - **Store**: the transactional document store and change feed
//! - **Service**: orchestration (codes, passwords, rematch votes, chat)
//! - **Server**: the HTTP/SSE surface over the service
//!
//! # Example
//!
//! ```no_run
//! use gomoku_rooms::{MemoryStore, RoomService};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), gomoku_rooms::ServiceError> {
//! let service = RoomService::new(Arc::new(MemoryStore::new()));
//!
//! let room = service.create_room("friday night", None).await?;
//! let side = service.join_room(&room.id, "uid-1", "Alice", None).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod cli;
mod config;
mod games;
mod room;
mod server;
mod service;
mod store;

// Crate-level exports - CLI
pub use cli::{Cli, Command};

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Game catalog and gomoku rules
pub use games::gomoku::{Board, Cell, Coord, Mark, SIZE, WIN_LENGTH, winning_line};
pub use games::{GameInfo, GameKind, catalog};

// Crate-level exports - Room state and transitions
pub use room::engine;
pub use room::{
    CHAT_LOG_LIMIT, ChatEntry, ChatMessage, DrawOffer, EndReason, JoinError, LastMove, MessageId,
    Player, Room, RoomId, RoomStatus, Slots, UserId,
};

// Crate-level exports - Store
pub use store::{MemoryStore, NewMessage, RoomFeed, RoomStore, StoreError};

// Crate-level exports - Service
pub use service::{RoomService, ServiceError};

// Crate-level exports - HTTP server
pub use server::{
    ChatRequest, ChatResponse, CreateRoomRequest, DrawOfferRequest, DrawRespondRequest,
    JoinRoomRequest, JoinRoomResponse, MoveRequest, ReadyRequest, SideRequest, router,
};
