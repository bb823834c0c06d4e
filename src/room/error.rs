//! User-actionable room errors.
//!
//! These are the only failures surfaced to callers; every other invalid
//! intent resolves to a no-op commit (see [`crate::room::engine`]).

use derive_more::{Display, Error};

/// Why a join attempt was rejected.
///
/// Each variant blocks forward progress the user must react to, so these
/// are reported rather than swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum JoinError {
    /// No room exists under the given code.
    #[display("room not found")]
    RoomNotFound,
    /// The room is password-protected and no password was supplied.
    #[display("password required")]
    PasswordRequired,
    /// The supplied password does not match.
    #[display("incorrect password")]
    PasswordIncorrect,
    /// Both seats are already taken.
    #[display("room already has two players")]
    RoomFull,
}
