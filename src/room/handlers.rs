use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::types::{
    CastVoteRequest, CastVoteResponse, CreateRoomRequest, CreateRoomResponse, JoinRoomRequest,
    RoomResponse, SubmitTurnRequest,
};
use crate::shared::{AppError, AppState};

/// HTTP handler for creating a new room
///
/// POST /rooms
/// Returns the generated room code and the initial room state
#[instrument(name = "create_room", skip(state, request), fields(mode = %request.mode))]
pub async fn create_room(
    State(state): State<AppState>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<Json<CreateRoomResponse>, AppError> {
    info!(topic = %request.topic, "Creating new room");

    let room = state.coordinator.create_room(request).await?;

    Ok(Json(CreateRoomResponse {
        room_code: room.code.clone(),
        room,
    }))
}

/// HTTP handler for joining an open room
///
/// POST /rooms/{code}/join
#[instrument(name = "join_room", skip(state, request))]
pub async fn join_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<JoinRoomRequest>,
) -> Result<Json<RoomResponse>, AppError> {
    info!(code = %code, name = %request.name, "Participant joining room");

    let room = state.coordinator.join_room(&code, request).await?;
    Ok(Json(RoomResponse { room }))
}

/// HTTP handler for a point-in-time room snapshot
///
/// GET /rooms/{code}
pub async fn get_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    let room = state.coordinator.room_snapshot(&code).await?;
    Ok(Json(RoomResponse { room }))
}

/// HTTP handler for explicitly starting a duel or assembly debate
///
/// POST /rooms/{code}/start
#[instrument(name = "begin_debate", skip(state))]
pub async fn begin_debate(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    info!(code = %code, "Starting debate");

    let room = state.coordinator.begin_debate(&code).await?;
    Ok(Json(RoomResponse { room }))
}

/// HTTP handler for submitting a speaking turn
///
/// POST /rooms/{code}/turns
#[instrument(name = "submit_turn", skip(state, request), fields(identity = %request.identity))]
pub async fn submit_turn(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<SubmitTurnRequest>,
) -> Result<Json<RoomResponse>, AppError> {
    let room = state.coordinator.submit_turn(&code, request).await?;

    info!(
        code = %code,
        progress_index = room.progress_index,
        stage = %room.stage,
        "Turn accepted"
    );
    Ok(Json(RoomResponse { room }))
}

/// HTTP handler for opening ballot collection early (assembly only)
///
/// POST /rooms/{code}/voting/start
#[instrument(name = "begin_voting", skip(state))]
pub async fn begin_voting(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    info!(code = %code, "Opening voting");

    let room = state.coordinator.begin_voting(&code).await?;
    Ok(Json(RoomResponse { room }))
}

/// HTTP handler for casting a ballot (assembly only)
///
/// POST /rooms/{code}/votes
#[instrument(name = "cast_vote", skip(state, request), fields(identity = %request.identity))]
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<CastVoteRequest>,
) -> Result<Json<CastVoteResponse>, AppError> {
    let (votes, room) = state.coordinator.cast_vote(&code, request).await?;
    Ok(Json(CastVoteResponse { votes, room }))
}
