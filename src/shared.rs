use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::debate::SessionCoordinator;
use crate::event::EventBus;
use crate::room::store::RoomStore;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RoomStore>,
    pub event_bus: EventBus,
    pub coordinator: Arc<SessionCoordinator>,
}

impl AppState {
    pub fn new(store: Arc<RoomStore>, event_bus: EventBus) -> Self {
        let coordinator = Arc::new(SessionCoordinator::new(
            Arc::clone(&store),
            event_bus.clone(),
        ));
        Self {
            store,
            event_bus,
            coordinator,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Could not allocate a unique room code")]
    CodeCollision,

    #[error("Not your turn: {0}")]
    NotYourTurn(String),

    #[error("Side is full: {0}")]
    SideFull(String),

    #[error("Room is full: {0}")]
    RoomFull(String),

    #[error("Duplicate identity: {0}")]
    DuplicateIdentity(String),

    #[error("Room is not accepting joins: {0}")]
    NotJoinable(String),

    #[error("Room is not ready to start: {0}")]
    NotReady(String),

    #[error("Voting already started: {0}")]
    AlreadyVoting(String),

    #[error("Room is not in its voting stage: {0}")]
    NotVoting(String),

    #[error("Voting is incomplete: {0}")]
    IncompleteVotes(String),

    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::RoomNotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::CodeCollision => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not allocate a unique room code".to_string(),
            ),
            AppError::NotYourTurn(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::SideFull(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::RoomFull(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::DuplicateIdentity(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotJoinable(msg) => (StatusCode::CONFLICT, msg),
            AppError::NotReady(msg) => (StatusCode::CONFLICT, msg),
            AppError::AlreadyVoting(msg) => (StatusCode::CONFLICT, msg),
            AppError::NotVoting(msg) => (StatusCode::CONFLICT, msg),
            AppError::IncompleteVotes(msg) => (StatusCode::CONFLICT, msg),
            AppError::UnknownParticipant(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
