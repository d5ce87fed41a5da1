use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::debate::voting::VotingResults;
use crate::room::models::{Ballot, DebateMode, Room};

/// Broadcast events fanned out to every subscriber of a room's channel.
///
/// Events are facts about state that has already been committed. Each
/// payload carries the full new room state alongside the targeted fields,
/// so a client that missed an intermediate event can still converge by
/// replacing its local view whenever `room.progress_index`/`room.stage`
/// is newer than what it holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum RoomEvent {
    /// A room was created and is accepting joins
    RoomCreated { topic: String, room: Room },

    /// A participant joined while the room was open
    ParticipantJoined { identity: String, room: Room },

    /// The room activated; participant set and turn order are now frozen
    DebateStarted {
        current_speaker: Option<String>,
        room: Room,
    },

    /// A turn was accepted: transcript appended, progress advanced
    TurnSubmitted {
        speaker: String,
        text: String,
        turn_index: usize,
        next_speaker: Option<String>,
        room: Room,
    },

    /// Assembly only: ballot collection opened, roll frozen
    VotingStarted { roll: Vec<String>, room: Room },

    /// Assembly only: a ballot was recorded (or overwritten)
    VoteSubmitted {
        identity: String,
        votes: HashMap<String, Ballot>,
        room: Room,
    },

    /// Assembly only: every rolled identity voted, outcome computed
    ResultsFinalized { results: VotingResults, room: Room },
}

impl RoomEvent {
    /// All events are room-scoped
    pub fn room_code(&self) -> &str {
        &self.room().code
    }

    pub fn room(&self) -> &Room {
        match self {
            RoomEvent::RoomCreated { room, .. } => room,
            RoomEvent::ParticipantJoined { room, .. } => room,
            RoomEvent::DebateStarted { room, .. } => room,
            RoomEvent::TurnSubmitted { room, .. } => room,
            RoomEvent::VotingStarted { room, .. } => room,
            RoomEvent::VoteSubmitted { room, .. } => room,
            RoomEvent::ResultsFinalized { room, .. } => room,
        }
    }

    /// Wire name of the event, matching the serde tag
    pub fn event_type(&self) -> &'static str {
        match self {
            RoomEvent::RoomCreated { .. } => "room-created",
            RoomEvent::ParticipantJoined { .. } => "participant-joined",
            RoomEvent::DebateStarted { .. } => "debate-started",
            RoomEvent::TurnSubmitted { .. } => "turn-submitted",
            RoomEvent::VotingStarted { .. } => "voting-started",
            RoomEvent::VoteSubmitted { .. } => "vote-submitted",
            RoomEvent::ResultsFinalized { .. } => "results-finalized",
        }
    }
}

/// Deterministic broadcast channel name for a room
pub fn channel_name(mode: DebateMode, code: &str) -> String {
    match mode {
        DebateMode::Duel => format!("room-{code}"),
        DebateMode::Team => format!("team-room-{code}"),
        DebateMode::Assembly => format!("assembly-room-{code}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::models::Participant;

    fn room() -> Room {
        Room::new(
            "ABC123".to_string(),
            "Topic".to_string(),
            DebateMode::Duel,
            Participant::duelist("alice"),
        )
    }

    #[test]
    fn test_channel_name_per_mode() {
        assert_eq!(channel_name(DebateMode::Duel, "ABC123"), "room-ABC123");
        assert_eq!(channel_name(DebateMode::Team, "ABC123"), "team-room-ABC123");
        assert_eq!(
            channel_name(DebateMode::Assembly, "ABC123"),
            "assembly-room-ABC123"
        );
    }

    #[test]
    fn test_event_serializes_with_kebab_case_tag() {
        let event = RoomEvent::ParticipantJoined {
            identity: "bob".to_string(),
            room: room(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "participant-joined");
        assert_eq!(json["identity"], "bob");
        assert_eq!(json["room"]["code"], "ABC123");
    }

    #[test]
    fn test_event_type_matches_serde_tag() {
        let event = RoomEvent::RoomCreated {
            topic: "Topic".to_string(),
            room: room(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], event.event_type());
        assert_eq!(event.room_code(), "ABC123");
    }
}
