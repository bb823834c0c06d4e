//! Room state and the guarded transitions over it.

pub mod engine;
mod error;
mod state;

pub use error::JoinError;
pub use state::{
    ChatEntry, ChatMessage, DrawOffer, EndReason, LastMove, MessageId, Player, Room, RoomId,
    RoomStatus, Slots, UserId, CHAT_LOG_LIMIT,
};
