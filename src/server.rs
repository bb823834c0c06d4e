//! HTTP surface for the room service.
//!
//! JSON endpoints for every room operation plus a server-sent-events feed
//! per room. User-actionable errors map to distinguishable status codes;
//! precondition races commit nothing and answer `200` with the committed
//! document, indistinguishable from a successful no-change commit.

use crate::games::{catalog, gomoku::Coord, gomoku::Mark, GameInfo};
use crate::room::{JoinError, MessageId, Room};
use crate::service::{RoomService, ServiceError};
use crate::store::RoomStore;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, instrument, warn};

/// Request to create a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    /// Room display name.
    pub name: String,
    /// Optional password protecting the room.
    pub password: Option<String>,
}

/// Request to join a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomRequest {
    /// Caller's user id.
    pub uid: String,
    /// Caller's display name.
    pub name: String,
    /// Password, when the room is protected.
    pub password: Option<String>,
}

/// Seat assigned by a successful join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    /// The mark the caller now plays.
    pub side: Mark,
}

/// Request to set a seat's ready flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyRequest {
    /// Which seat.
    pub side: Mark,
    /// The new flag value.
    pub ready: bool,
}

/// Request to place a mark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Which seat is moving.
    pub side: Mark,
    /// Target row.
    pub row: usize,
    /// Target column.
    pub col: usize,
}

/// Request to propose a draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawOfferRequest {
    /// Which seat proposes.
    pub side: Mark,
}

/// Request answering a draw offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawRespondRequest {
    /// Which seat answers.
    pub side: Mark,
    /// Whether the draw is accepted.
    pub accept: bool,
}

/// Request to surrender or leave.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideRequest {
    /// Which seat acts.
    pub side: Mark,
}

/// Request to append a chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Sender's user id.
    pub uid: String,
    /// Sender's display name.
    pub name: String,
    /// Message body.
    pub text: String,
}

/// Id of an appended chat message; `None` when the message was blank and
/// dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated message id.
    pub id: Option<MessageId>,
}

/// Shared handler state.
pub struct AppState<S> {
    service: RoomService<S>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

/// Error as sent to clients.
struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServiceError::Join(JoinError::RoomNotFound) => StatusCode::NOT_FOUND,
            ServiceError::Join(JoinError::PasswordRequired) => StatusCode::UNAUTHORIZED,
            ServiceError::Join(JoinError::PasswordIncorrect) => StatusCode::FORBIDDEN,
            ServiceError::Join(JoinError::RoomFull) => StatusCode::CONFLICT,
            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            warn!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Builds the router over the given service.
pub fn router<S: RoomStore>(service: RoomService<S>) -> Router {
    let state = AppState { service };
    Router::new()
        .route("/games", get(list_games))
        .route("/rooms", post(create_room::<S>))
        .route("/rooms/{id}", get(get_room::<S>))
        .route("/rooms/{id}/events", get(room_events::<S>))
        .route("/rooms/{id}/join", post(join_room::<S>))
        .route("/rooms/{id}/ready", post(set_ready::<S>))
        .route("/rooms/{id}/move", post(place_move::<S>))
        .route("/rooms/{id}/draw/offer", post(offer_draw::<S>))
        .route("/rooms/{id}/draw/respond", post(respond_draw::<S>))
        .route("/rooms/{id}/surrender", post(surrender::<S>))
        .route("/rooms/{id}/leave", post(leave_room::<S>))
        .route("/rooms/{id}/chat", post(send_message::<S>))
        .with_state(state)
}

/// Lists the game catalog.
async fn list_games() -> Json<Vec<GameInfo>> {
    Json(catalog())
}

#[instrument(skip(state, req), fields(name = %req.name))]
async fn create_room<S: RoomStore>(
    State(state): State<AppState<S>>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    let room = state
        .service
        .create_room(&req.name, req.password.as_deref())
        .await?;
    info!(room_id = %room.id, "room created over http");
    Ok((StatusCode::CREATED, Json(room)))
}

#[instrument(skip(state))]
async fn get_room<S: RoomStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Room>, ApiError> {
    match state.service.room(&id).await? {
        Some(room) => Ok(Json(room)),
        None => Err(ServiceError::Join(JoinError::RoomNotFound).into()),
    }
}

#[instrument(skip(state, req), fields(uid = %req.uid))]
async fn join_room<S: RoomStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(req): Json<JoinRoomRequest>,
) -> Result<Json<JoinRoomResponse>, ApiError> {
    let side = state
        .service
        .join_room(&id, &req.uid, &req.name, req.password.as_deref())
        .await?;
    Ok(Json(JoinRoomResponse { side }))
}

#[instrument(skip(state, req))]
async fn set_ready<S: RoomStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(req): Json<ReadyRequest>,
) -> Result<Json<Option<Room>>, ApiError> {
    let room = state.service.set_ready(&id, req.side, req.ready).await?;
    Ok(Json(room))
}

#[instrument(skip(state, req))]
async fn place_move<S: RoomStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<Option<Room>>, ApiError> {
    let room = state
        .service
        .place_move(&id, req.side, Coord::new(req.row, req.col))
        .await?;
    Ok(Json(room))
}

#[instrument(skip(state, req))]
async fn offer_draw<S: RoomStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(req): Json<DrawOfferRequest>,
) -> Result<Json<Option<Room>>, ApiError> {
    let room = state.service.offer_draw(&id, req.side).await?;
    Ok(Json(room))
}

#[instrument(skip(state, req))]
async fn respond_draw<S: RoomStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(req): Json<DrawRespondRequest>,
) -> Result<Json<Option<Room>>, ApiError> {
    let room = state
        .service
        .respond_draw(&id, req.side, req.accept)
        .await?;
    Ok(Json(room))
}

#[instrument(skip(state, req))]
async fn surrender<S: RoomStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(req): Json<SideRequest>,
) -> Result<Json<Option<Room>>, ApiError> {
    let room = state.service.surrender(&id, req.side).await?;
    Ok(Json(room))
}

#[instrument(skip(state, req))]
async fn leave_room<S: RoomStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(req): Json<SideRequest>,
) -> Result<Json<Option<Room>>, ApiError> {
    let room = state.service.leave_room(&id, req.side).await?;
    Ok(Json(room))
}

#[instrument(skip(state, req), fields(uid = %req.uid))]
async fn send_message<S: RoomStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message_id = state
        .service
        .send_message(&id, &req.uid, &req.name, &req.text)
        .await?;
    Ok(Json(ChatResponse { id: message_id }))
}

/// Streams the room document: the current value, then every committed
/// change, as `room` SSE events.
#[instrument(skip(state))]
async fn room_events<S: RoomStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let feed = state.service.subscribe(&id).await?;

    let initial = futures::stream::iter(feed.current);
    let changes = futures::stream::unfold(feed.changes, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(room) => return Some((room, rx)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber lagged, resuming from latest");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    let stream = initial
        .chain(changes)
        .map(|room| Event::default().event("room").json_data(&room));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
