//! The room document: the authoritative shared state of one match.

use crate::games::gomoku::{Board, Coord, Mark};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a room (short shareable code).
pub type RoomId = String;

/// Unique identifier for a user.
pub type UserId = String;

/// Unique identifier for a chat message.
pub type MessageId = String;

/// Number of chat messages kept when reading the log.
pub const CHAT_LOG_LIMIT: usize = 200;

/// Lifecycle status of a room.
///
/// `Decision` and `Closed` are reserved: they are part of the declared state
/// space but no transition produces or consumes them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    /// Waiting for players to fill both seats and ready up.
    Lobby,
    /// A round is in progress.
    Playing,
    /// The last round ended; waiting for rematch votes.
    RoundEnd,
    /// Reserved.
    Decision,
    /// Reserved.
    Closed,
}

/// A player occupying one of the two seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Opaque user id.
    pub uid: UserId,
    /// Display name.
    pub name: String,
    /// Ready flag; doubles as the rematch vote after a round ends.
    pub ready: bool,
    /// Rounds won in this room (a draw counts for both players).
    pub score: u32,
}

impl Player {
    /// Creates a freshly seated player: not ready, score zero.
    pub fn new(uid: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            ready: false,
            score: 0,
        }
    }
}

/// The two seats of a room, keyed by mark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slots {
    /// The player seated as X, if any.
    pub x: Option<Player>,
    /// The player seated as O, if any.
    pub o: Option<Player>,
}

impl Slots {
    /// Returns the seat for the given mark.
    pub fn get(&self, side: Mark) -> Option<&Player> {
        match side {
            Mark::X => self.x.as_ref(),
            Mark::O => self.o.as_ref(),
        }
    }

    /// Returns the seat for the given mark, mutably.
    pub fn get_mut(&mut self, side: Mark) -> Option<&mut Player> {
        match side {
            Mark::X => self.x.as_mut(),
            Mark::O => self.o.as_mut(),
        }
    }

    /// Seats a player at the given mark, replacing any occupant.
    pub fn set(&mut self, side: Mark, player: Option<Player>) {
        match side {
            Mark::X => self.x = player,
            Mark::O => self.o = player,
        }
    }

    /// The first empty seat, X before O.
    pub fn first_empty(&self) -> Option<Mark> {
        if self.x.is_none() {
            Some(Mark::X)
        } else if self.o.is_none() {
            Some(Mark::O)
        } else {
            None
        }
    }

    /// Which seat the given uid occupies, if any.
    pub fn seat_of(&self, uid: &str) -> Option<Mark> {
        if self.x.as_ref().is_some_and(|p| p.uid == uid) {
            Some(Mark::X)
        } else if self.o.as_ref().is_some_and(|p| p.uid == uid) {
            Some(Mark::O)
        } else {
            None
        }
    }

    /// True when both seats are taken.
    pub fn both_occupied(&self) -> bool {
        self.x.is_some() && self.o.is_some()
    }

    /// True when both seats are taken and both occupants are ready.
    pub fn both_ready(&self) -> bool {
        self.x.as_ref().is_some_and(|p| p.ready) && self.o.as_ref().is_some_and(|p| p.ready)
    }

    /// Exchanges the occupants of the two seats.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.x, &mut self.o);
    }
}

/// The most recent move of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct LastMove {
    /// Where the mark was placed.
    pub at: Coord,
    /// Which mark played it.
    pub by: Mark,
}

/// An outstanding draw proposal. At most one exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawOffer {
    /// The mark that proposed the draw.
    pub from: Mark,
}

/// How the last round ended, tagged with the responsible mark:
/// the winner for a win, the offerer for a draw, the quitter for a
/// surrender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "by", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndReason {
    /// A mark completed a line of five.
    Win(Mark),
    /// Both players agreed to a draw; carries the offerer.
    Draw(Mark),
    /// A player surrendered; carries the one who gave up.
    Surrender(Mark),
}

impl EndReason {
    /// The mark responsible for the outcome.
    pub fn by(&self) -> Mark {
        match self {
            EndReason::Win(m) | EndReason::Draw(m) | EndReason::Surrender(m) => *m,
        }
    }
}

/// One chat message as stored in the room document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sender's user id.
    pub uid: UserId,
    /// Sender's display name at send time.
    pub name: String,
    /// Message body.
    pub text: String,
    /// Unix milliseconds at append time.
    pub created_at: i64,
}

/// One chat message as read back: id plus the stored record, in
/// timestamp order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    /// Message id generated by the store.
    pub id: MessageId,
    /// Sender's user id.
    pub uid: UserId,
    /// Sender's display name at send time.
    pub name: String,
    /// Message body.
    pub text: String,
    /// Unix milliseconds at append time.
    pub created_at: i64,
}

/// The authoritative room document.
///
/// All mutation goes through the transition engine applied under the
/// store's atomic primitive; nothing outside `room::engine` should write
/// these fields once a room is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Short shareable room code.
    pub id: RoomId,
    /// Display name given at creation.
    pub name: String,
    /// SHA-256 hex digest of the room password; `None` if unprotected.
    pub password_hash: Option<String>,
    /// Lifecycle status.
    pub status: RoomStatus,
    /// The board of the current (or last finished) round.
    pub board: Board,
    /// Whose move is next.
    pub turn: Mark,
    /// Winner of the last finished round, if it ended in a win.
    pub winner: Option<Mark>,
    /// The two seats.
    pub players: Slots,
    /// Most recent move of the current round.
    pub last_move: Option<LastMove>,
    /// The winning line of the last finished round, ordered end to end.
    pub winning_line: Option<Vec<Coord>>,
    /// Outstanding draw proposal.
    pub draw_offer: Option<DrawOffer>,
    /// How the last round ended.
    pub end_reason: Option<EndReason>,
    /// Chat log keyed by message id. Iteration order is unspecified;
    /// use [`Room::chat_log`] for a timestamp-ordered view.
    pub messages: HashMap<MessageId, ChatMessage>,
    /// Unix milliseconds at creation.
    pub created_at: i64,
    /// Unix milliseconds of the last committed change.
    pub updated_at: i64,
}

impl Room {
    /// Creates a fresh room in the lobby: empty board, empty seats.
    pub fn new(
        id: impl Into<RoomId>,
        name: impl Into<String>,
        password_hash: Option<String>,
        now: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            password_hash,
            status: RoomStatus::Lobby,
            board: Board::new(),
            turn: Mark::X,
            winner: None,
            players: Slots::default(),
            last_move: None,
            winning_line: None,
            draw_offer: None,
            end_reason: None,
            messages: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether joining requires a password.
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// The chat log sorted by timestamp (message id breaks ties), capped
    /// to the most recent [`CHAT_LOG_LIMIT`] entries.
    pub fn chat_log(&self) -> Vec<ChatEntry> {
        let mut entries: Vec<ChatEntry> = self
            .messages
            .iter()
            .map(|(id, msg)| ChatEntry {
                id: id.clone(),
                uid: msg.uid.clone(),
                name: msg.name.clone(),
                text: msg.text.clone(),
                created_at: msg.created_at,
            })
            .collect();

        entries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        if entries.len() > CHAT_LOG_LIMIT {
            entries.drain(..entries.len() - CHAT_LOG_LIMIT);
        }
        entries
    }
}
