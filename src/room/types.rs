use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::models::{Ballot, DebateMode, Room, Side};

/// Request payload for creating a new room
///
/// Mode-specific creator fields: `creator_side` for team rooms,
/// `creator_country` for assembly rooms, neither for duels.
#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub topic: String,
    pub mode: DebateMode,
    pub creator_name: String,
    pub creator_side: Option<Side>,
    pub creator_country: Option<String>,
}

/// Response for room creation
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub room_code: String,
    pub room: Room,
}

/// Request payload for joining a room
#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    pub name: String,
    pub side: Option<Side>,
    pub country: Option<String>,
}

/// Request payload for submitting a speaking turn
#[derive(Debug, Deserialize)]
pub struct SubmitTurnRequest {
    pub identity: String,
    pub text: String,
    /// Optimistic concurrency check: reject if the room has already moved
    /// past the turn the client thought it was submitting
    pub expected_turn: Option<usize>,
}

/// Request payload for casting a ballot
#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub identity: String,
    pub ballot: Ballot,
}

/// Response for a recorded ballot
#[derive(Debug, Serialize, Deserialize)]
pub struct CastVoteResponse {
    pub votes: HashMap<String, Ballot>,
    pub room: Room,
}

/// Response wrapping a room snapshot
#[derive(Debug, Serialize, Deserialize)]
pub struct RoomResponse {
    pub room: Room,
}
