//! Room transition engine.
//!
//! Every operation is a pure transform from the current committed room to
//! the next one, meant to be applied through the store's atomic
//! [`transact`](crate::store::RoomStore::transact) primitive. When a
//! precondition does not hold the input is returned unchanged (a no-op
//! commit): under concurrent writers the same intent can race against
//! another client's change, and resolving to "do nothing" is the correct
//! outcome. Transforms never touch `updated_at`; the store stamps it on
//! commit.

use crate::games::gomoku::{winning_line, Board, Cell, Coord, Mark};
use crate::room::error::JoinError;
use crate::room::state::{DrawOffer, EndReason, LastMove, Player, Room, RoomStatus};
use tracing::{debug, info, instrument};

/// Seats a new player, or reclaims the seat a returning uid already holds.
///
/// The only transform with a reportable outcome: the caller needs to know
/// which seat was assigned, and the password/full failures must be
/// distinguishable. On error the room is returned unchanged.
///
/// `password_digest` is the SHA-256 hex digest of the password the caller
/// supplied, if any; the transform only compares digests.
#[instrument(skip(room, password_digest), fields(room_id = %room.id))]
pub fn join(
    mut room: Room,
    uid: &str,
    name: &str,
    password_digest: Option<&str>,
) -> (Room, Result<Mark, JoinError>) {
    // A reload re-joins; hand the same seat back.
    if let Some(side) = room.players.seat_of(uid) {
        debug!(%uid, %side, "uid already seated, reclaiming seat");
        return (room, Ok(side));
    }

    if let Some(expected) = room.password_hash.as_deref() {
        match password_digest {
            None => return (room, Err(JoinError::PasswordRequired)),
            Some(digest) if digest != expected => {
                return (room, Err(JoinError::PasswordIncorrect));
            }
            Some(_) => {}
        }
    }

    match room.players.first_empty() {
        Some(side) => {
            info!(%uid, %name, %side, "player seated");
            room.players.set(side, Some(Player::new(uid, name)));
            (room, Ok(side))
        }
        None => (room, Err(JoinError::RoomFull)),
    }
}

/// Sets the ready flag of the given seat. No-op when the seat is empty.
#[instrument(skip(room), fields(room_id = %room.id))]
pub fn set_ready(mut room: Room, side: Mark, ready: bool) -> Room {
    match room.players.get_mut(side) {
        Some(player) => player.ready = ready,
        None => debug!(%side, "ready flag for empty seat ignored"),
    }
    room
}

/// Starts the next round.
///
/// Requires both seats occupied and status `Lobby` or `RoundEnd`; whether
/// both players are ready is the caller's concern (the rematch
/// orchestration checks it before invoking this). Swaps which player
/// occupies which seat so the opening move alternates between the two,
/// resets the board and every per-round field, and hands the opening move
/// to X.
#[instrument(skip(room), fields(room_id = %room.id))]
pub fn start_round(mut room: Room) -> Room {
    if !room.players.both_occupied() {
        debug!("round start with an empty seat ignored");
        return room;
    }
    if !matches!(room.status, RoomStatus::Lobby | RoomStatus::RoundEnd) {
        debug!(status = %room.status, "round start outside lobby/round-end ignored");
        return room;
    }

    room.players.swap();
    if let Some(player) = room.players.get_mut(Mark::X) {
        player.ready = false;
    }
    if let Some(player) = room.players.get_mut(Mark::O) {
        player.ready = false;
    }

    room.board = Board::new();
    room.turn = Mark::X;
    room.status = RoomStatus::Playing;
    room.winner = None;
    room.last_move = None;
    room.winning_line = None;
    room.draw_offer = None;
    room.end_reason = None;

    info!("round started");
    room
}

/// Places a mark for the given side.
///
/// No-op unless a round is in progress, it is `side`'s turn, and the
/// target cell is an empty in-bounds cell. A winning move settles the
/// round; otherwise the turn flips. Any outstanding draw offer is cleared
/// either way.
#[instrument(skip(room), fields(room_id = %room.id))]
pub fn place_move(mut room: Room, side: Mark, at: Coord) -> Room {
    if room.status != RoomStatus::Playing {
        debug!(status = %room.status, "move outside a round ignored");
        return room;
    }
    if room.turn != side {
        debug!(%side, turn = %room.turn, "move out of turn ignored");
        return room;
    }
    if !room.board.is_empty_at(at) {
        debug!(?at, "move onto occupied or out-of-bounds cell ignored");
        return room;
    }
    if room.board.set(at, Cell::Occupied(side)).is_err() {
        return room;
    }

    room.last_move = Some(LastMove::new(at, side));
    room.draw_offer = None;

    match winning_line(&room.board, at, side) {
        Some(line) => {
            info!(%side, ?at, len = line.len(), "winning move");
            room.winner = Some(side);
            room.status = RoomStatus::RoundEnd;
            room.winning_line = Some(line);
            room.end_reason = Some(EndReason::Win(side));
            if let Some(player) = room.players.get_mut(side) {
                player.score += 1;
            }
        }
        None => {
            room.turn = side.opponent();
            room.winning_line = None;
            room.end_reason = None;
        }
    }

    room
}

/// Proposes a draw. No-op outside a round or while an offer is pending.
#[instrument(skip(room), fields(room_id = %room.id))]
pub fn offer_draw(mut room: Room, side: Mark) -> Room {
    if room.status != RoomStatus::Playing {
        debug!(status = %room.status, "draw offer outside a round ignored");
        return room;
    }
    if room.draw_offer.is_some() {
        debug!("second draw offer ignored");
        return room;
    }

    room.draw_offer = Some(DrawOffer { from: side });
    room
}

/// Answers an outstanding draw offer.
///
/// Only the side that did not make the offer may respond. Accepting ends
/// the round with no winner and a point for both players; either way the
/// offer is cleared.
#[instrument(skip(room), fields(room_id = %room.id))]
pub fn respond_draw(mut room: Room, side: Mark, accept: bool) -> Room {
    if room.status != RoomStatus::Playing {
        debug!(status = %room.status, "draw response outside a round ignored");
        return room;
    }
    let Some(offer) = room.draw_offer else {
        debug!("draw response without an offer ignored");
        return room;
    };
    if offer.from == side {
        debug!(%side, "offerer answering own draw offer ignored");
        return room;
    }

    room.draw_offer = None;
    if accept {
        info!(offerer = %offer.from, "draw accepted");
        room.status = RoomStatus::RoundEnd;
        room.winner = None;
        room.winning_line = None;
        room.end_reason = Some(EndReason::Draw(offer.from));
        if let Some(player) = room.players.get_mut(Mark::X) {
            player.score += 1;
        }
        if let Some(player) = room.players.get_mut(Mark::O) {
            player.score += 1;
        }
    }

    room
}

/// Concedes the round: the opponent wins and takes a point.
#[instrument(skip(room), fields(room_id = %room.id))]
pub fn surrender(mut room: Room, side: Mark) -> Room {
    if room.status != RoomStatus::Playing {
        debug!(status = %room.status, "surrender outside a round ignored");
        return room;
    }

    let opponent = side.opponent();
    info!(%side, %opponent, "surrender");
    room.status = RoomStatus::RoundEnd;
    room.winner = Some(opponent);
    room.winning_line = None;
    room.draw_offer = None;
    room.end_reason = Some(EndReason::Surrender(side));
    if let Some(player) = room.players.get_mut(opponent) {
        player.score += 1;
    }

    room
}

/// Vacates a seat and returns the room to the lobby.
///
/// Ends any in-progress round without awarding points. The per-round
/// outcome fields are cleared so the lobby invariant (no winner outside
/// `RoundEnd`) holds.
#[instrument(skip(room), fields(room_id = %room.id))]
pub fn leave(mut room: Room, side: Mark) -> Room {
    info!(%side, "seat vacated");
    room.players.set(side, None);
    room.status = RoomStatus::Lobby;
    room.winner = None;
    room.winning_line = None;
    room.draw_offer = None;
    room.end_reason = None;
    room
}
