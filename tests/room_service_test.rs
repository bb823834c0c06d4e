//! End-to-end tests for the room service over the in-memory store.

use gomoku_rooms::{
    Coord, EndReason, JoinError, Mark, MemoryStore, Room, RoomService, RoomStatus, ServiceError,
};
use std::sync::Arc;

fn service() -> RoomService<MemoryStore> {
    RoomService::new(Arc::new(MemoryStore::new()))
}

/// Creates a room and seats Alice and Bob.
async fn seated_room(service: &RoomService<MemoryStore>) -> Room {
    let room = service.create_room("test room", None).await.unwrap();
    let side = service
        .join_room(&room.id, "uid-alice", "Alice", None)
        .await
        .unwrap();
    assert_eq!(side, Mark::X);
    let side = service
        .join_room(&room.id, "uid-bob", "Bob", None)
        .await
        .unwrap();
    assert_eq!(side, Mark::O);
    service.room(&room.id).await.unwrap().unwrap()
}

/// Readies both players, which starts the round (and swaps the seats).
async fn started_room(service: &RoomService<MemoryStore>) -> Room {
    let room = seated_room(service).await;

    let after = service
        .set_ready(&room.id, Mark::X, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.status, RoomStatus::Lobby);

    let after = service
        .set_ready(&room.id, Mark::O, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.status, RoomStatus::Playing);
    after
}

#[tokio::test]
async fn test_create_room_starts_in_lobby() {
    let service = service();
    let room = service.create_room("friday night", None).await.unwrap();

    assert_eq!(room.id.len(), 6);
    assert_eq!(room.name, "friday night");
    assert_eq!(room.status, RoomStatus::Lobby);
    assert!(!room.has_password());
    assert!(room.players.x.is_none() && room.players.o.is_none());
}

#[tokio::test]
async fn test_join_unknown_room() {
    let service = service();
    let result = service.join_room("ZZZZZZ", "uid-1", "Alice", None).await;
    assert!(matches!(
        result,
        Err(ServiceError::Join(JoinError::RoomNotFound))
    ));
}

#[tokio::test]
async fn test_join_with_wrong_password() {
    let service = service();
    let room = service
        .create_room("secret room", Some("hunter2"))
        .await
        .unwrap();
    assert!(room.has_password());

    let result = service.join_room(&room.id, "uid-1", "Alice", None).await;
    assert!(matches!(
        result,
        Err(ServiceError::Join(JoinError::PasswordRequired))
    ));

    let result = service
        .join_room(&room.id, "uid-1", "Alice", Some("wrong"))
        .await;
    assert!(matches!(
        result,
        Err(ServiceError::Join(JoinError::PasswordIncorrect))
    ));

    // No seat was handed out along the way.
    let loaded = service.room(&room.id).await.unwrap().unwrap();
    assert!(loaded.players.x.is_none());

    let side = service
        .join_room(&room.id, "uid-1", "Alice", Some("hunter2"))
        .await
        .unwrap();
    assert_eq!(side, Mark::X);
}

#[tokio::test]
async fn test_third_player_rejected() {
    let service = service();
    let room = seated_room(&service).await;

    let result = service.join_room(&room.id, "uid-carol", "Carol", None).await;
    assert!(matches!(
        result,
        Err(ServiceError::Join(JoinError::RoomFull))
    ));
}

#[tokio::test]
async fn test_both_ready_starts_round_and_swaps_seats() {
    let service = service();
    let room = started_room(&service).await;

    // Alice joined first as X; the round start swapped the seats.
    assert_eq!(room.players.x.as_ref().unwrap().uid, "uid-bob");
    assert_eq!(room.players.o.as_ref().unwrap().uid, "uid-alice");
    assert_eq!(room.turn, Mark::X);
    assert!(!room.players.x.as_ref().unwrap().ready);
    assert!(!room.players.o.as_ref().unwrap().ready);
}

#[tokio::test]
async fn test_five_in_a_row_wins_the_round() {
    let service = service();
    let room = started_room(&service).await;
    let id = room.id.clone();

    // X builds row 0, O answers on the diagonal.
    for col in 0..4 {
        service
            .place_move(&id, Mark::X, Coord::new(0, col))
            .await
            .unwrap();
        service
            .place_move(&id, Mark::O, Coord::new(col + 1, col + 1))
            .await
            .unwrap();
    }
    let settled = service
        .place_move(&id, Mark::X, Coord::new(0, 4))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(settled.status, RoomStatus::RoundEnd);
    assert_eq!(settled.winner, Some(Mark::X));
    assert_eq!(settled.end_reason, Some(EndReason::Win(Mark::X)));

    let line = settled.winning_line.as_ref().unwrap();
    let expected: Vec<Coord> = (0..5).map(|c| Coord::new(0, c)).collect();
    assert_eq!(line, &expected);

    // The winning seat's occupant took exactly one point.
    assert_eq!(settled.players.x.as_ref().unwrap().score, 1);
    assert_eq!(settled.players.o.as_ref().unwrap().score, 0);
}

#[tokio::test]
async fn test_move_out_of_turn_is_silent_noop() {
    let service = service();
    let room = started_room(&service).await;

    let committed = service
        .place_move(&room.id, Mark::O, Coord::new(5, 5))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(committed, room);
}

#[tokio::test]
async fn test_draw_reject_keeps_playing() {
    let service = service();
    let room = started_room(&service).await;

    let offered = service
        .offer_draw(&room.id, Mark::X)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(offered.draw_offer.unwrap().from, Mark::X);

    let answered = service
        .respond_draw(&room.id, Mark::O, false)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(answered.status, RoomStatus::Playing);
    assert_eq!(answered.draw_offer, None);
    assert_eq!(answered.players.x.as_ref().unwrap().score, 0);
    assert_eq!(answered.players.o.as_ref().unwrap().score, 0);
}

#[tokio::test]
async fn test_draw_accept_settles_round() {
    let service = service();
    let room = started_room(&service).await;

    service.offer_draw(&room.id, Mark::O).await.unwrap();
    let settled = service
        .respond_draw(&room.id, Mark::X, true)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(settled.status, RoomStatus::RoundEnd);
    assert_eq!(settled.winner, None);
    assert_eq!(settled.end_reason, Some(EndReason::Draw(Mark::O)));
    assert_eq!(settled.players.x.as_ref().unwrap().score, 1);
    assert_eq!(settled.players.o.as_ref().unwrap().score, 1);
}

#[tokio::test]
async fn test_rematch_after_round_end() {
    let service = service();
    let room = started_room(&service).await;
    let x_uid = room.players.x.as_ref().unwrap().uid.clone();

    let settled = service
        .surrender(&room.id, Mark::O)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(settled.status, RoomStatus::RoundEnd);
    assert_eq!(settled.winner, Some(Mark::X));

    // Both rematch votes restart the round and swap the seats again.
    service.set_ready(&room.id, Mark::X, true).await.unwrap();
    let next = service
        .set_ready(&room.id, Mark::O, true)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(next.status, RoomStatus::Playing);
    assert_eq!(next.winner, None);
    assert_eq!(next.players.o.as_ref().unwrap().uid, x_uid);
    assert_eq!(next.turn, Mark::X);
}

#[tokio::test]
async fn test_leave_returns_room_to_lobby() {
    let service = service();
    let room = started_room(&service).await;

    let after = service
        .leave_room(&room.id, Mark::X)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(after.status, RoomStatus::Lobby);
    assert!(after.players.x.is_none());
    assert!(after.players.o.is_some());
    assert_eq!(after.winner, None);
}

#[tokio::test]
async fn test_chat_log_is_sorted_and_blankless() {
    let service = service();
    let room = seated_room(&service).await;

    let first = service
        .send_message(&room.id, "uid-alice", "Alice", "good luck")
        .await
        .unwrap();
    assert!(first.is_some());

    let blank = service
        .send_message(&room.id, "uid-bob", "Bob", "   ")
        .await
        .unwrap();
    assert!(blank.is_none());

    let second = service
        .send_message(&room.id, "uid-bob", "Bob", "have fun")
        .await
        .unwrap();
    assert!(second.is_some());

    let loaded = service.room(&room.id).await.unwrap().unwrap();
    let log = loaded.chat_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].text, "good luck");
    assert_eq!(log[1].text, "have fun");
    assert!(log[0].created_at <= log[1].created_at);
}

#[tokio::test]
async fn test_subscription_sees_committed_changes() {
    let service = service();
    let room = service.create_room("watched", None).await.unwrap();

    let mut feed = service.subscribe(&room.id).await.unwrap();
    assert_eq!(feed.current.as_ref().unwrap().id, room.id);

    service
        .join_room(&room.id, "uid-alice", "Alice", None)
        .await
        .unwrap();

    let change = feed.changes.recv().await.unwrap();
    assert_eq!(change.players.x.as_ref().unwrap().name, "Alice");
}

#[tokio::test]
async fn test_rejoin_after_reload_keeps_seat() {
    let service = service();
    let room = seated_room(&service).await;

    let side = service
        .join_room(&room.id, "uid-alice", "Alice", None)
        .await
        .unwrap();
    assert_eq!(side, Mark::X);
}
