use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{Display, EnumString};

use crate::debate::voting::VotingResults;

/// Debate topology of a room
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DebateMode {
    /// 1v1, alternating speakers over a fixed number of rounds
    Duel,
    /// Two teams of three, fixed seat interleave
    Team,
    /// N delegates speaking in join order, followed by a vote
    Assembly,
}

/// Team-mode side tag
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    Proposition,
    Opposition,
}

/// Coarse lifecycle phase of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    /// Accepting joins
    Open,
    /// Turns in progress, participant set frozen
    Active,
    /// Assembly only: ballots being collected
    Voting,
    /// Assembly only: all ballots in, outcome computed
    Results,
    Closed,
}

/// A single participant's vote value in assembly mode
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Ballot {
    Yes,
    No,
    Abstain,
}

/// One member of a room
///
/// `side` is set in team mode, `country` in assembly mode; a duel
/// participant carries neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub side: Option<Side>,
    pub country: Option<String>,
}

impl Participant {
    pub fn duelist(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            side: None,
            country: None,
        }
    }

    pub fn team_member(name: impl Into<String>, side: Side) -> Self {
        Self {
            name: name.into(),
            side: Some(side),
            country: None,
        }
    }

    pub fn delegate(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            side: None,
            country: Some(country.into()),
        }
    }

    /// The label turns and ballots are attributed to. Assembly rooms key
    /// everything by country, the other modes by display name.
    pub fn identity(&self) -> &str {
        self.country.as_deref().unwrap_or(&self.name)
    }

    /// The side or country label recorded alongside transcript entries
    pub fn affiliation(&self) -> Option<String> {
        self.country
            .clone()
            .or_else(|| self.side.map(|s| s.to_string()))
    }
}

/// One completed speaking turn. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: String,
    pub affiliation: Option<String>,
    pub text: String,
    pub turn_index: usize,
}

/// One live or completed debate session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub code: String,
    pub topic: String,
    pub mode: DebateMode,
    /// Insertion order is the turn order for duel and assembly rooms
    pub participants: Vec<Participant>,
    /// Number of completed turns; strictly increases
    pub progress_index: usize,
    pub transcript: Vec<TranscriptEntry>,
    pub stage: Stage,
    /// Assembly only: identity -> ballot, last vote wins until finalized
    pub votes: HashMap<String, Ballot>,
    /// Identities eligible to vote, frozen when voting opens
    pub voting_roll: Vec<String>,
    /// Total turns for this session, frozen at activation
    pub turn_total: Option<usize>,
    pub results: Option<VotingResults>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Room {
    pub fn new(code: String, topic: String, mode: DebateMode, creator: Participant) -> Self {
        let now = Utc::now();
        Self {
            code,
            topic,
            mode,
            participants: vec![creator],
            progress_index: 0,
            transcript: Vec::new(),
            stage: Stage::Open,
            votes: HashMap::new(),
            voting_roll: Vec::new(),
            turn_total: None,
            results: None,
            created_at: now,
            last_activity: now,
        }
    }

    /// Records that something happened in this room, for staleness cleanup
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn has_identity(&self, identity: &str) -> bool {
        self.participants.iter().any(|p| p.identity() == identity)
    }

    /// Number of participants on one side of a team room
    pub fn side_count(&self, side: Side) -> usize {
        self.participants
            .iter()
            .filter(|p| p.side == Some(side))
            .count()
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }
}

const CODE_LENGTH: usize = 6;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a short human-shareable room code (6-char uppercase base-36).
/// Uniqueness is the store's concern, not this function's.
pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Room codes are case-insensitive on the wire; the store keys uppercase.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_room_code_format() {
        for _ in 0..50 {
            let code = generate_room_code();
            assert_eq!(code.len(), 6);
            assert!(code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("ab12cd"), "AB12CD");
        assert_eq!(normalize_code("  Ab12Cd "), "AB12CD");
    }

    #[test]
    fn test_delegate_identity_is_country() {
        let participant = Participant::delegate("Alice", "France");
        assert_eq!(participant.identity(), "France");
        assert_eq!(participant.affiliation(), Some("France".to_string()));
    }

    #[test]
    fn test_duelist_identity_is_name() {
        let participant = Participant::duelist("Bob");
        assert_eq!(participant.identity(), "Bob");
        assert_eq!(participant.affiliation(), None);
    }

    #[test]
    fn test_team_member_affiliation() {
        let participant = Participant::team_member("Cara", Side::Opposition);
        assert_eq!(participant.identity(), "Cara");
        assert_eq!(participant.affiliation(), Some("opposition".to_string()));
    }

    #[test]
    fn test_new_room_starts_open() {
        let room = Room::new(
            "ABC123".to_string(),
            "Topic".to_string(),
            DebateMode::Duel,
            Participant::duelist("Alice"),
        );
        assert_eq!(room.stage, Stage::Open);
        assert_eq!(room.progress_index, 0);
        assert!(room.transcript.is_empty());
        assert_eq!(room.participant_count(), 1);
    }

    #[test]
    fn test_side_count() {
        let mut room = Room::new(
            "ABC123".to_string(),
            "Topic".to_string(),
            DebateMode::Team,
            Participant::team_member("Alice", Side::Proposition),
        );
        room.participants
            .push(Participant::team_member("Bob", Side::Opposition));
        room.participants
            .push(Participant::team_member("Cara", Side::Proposition));

        assert_eq!(room.side_count(Side::Proposition), 2);
        assert_eq!(room.side_count(Side::Opposition), 1);
    }

    #[test]
    fn test_mode_wire_names() {
        assert_eq!(DebateMode::Assembly.to_string(), "assembly");
        assert_eq!(
            serde_json::to_string(&DebateMode::Duel).unwrap(),
            "\"duel\""
        );
        assert_eq!(serde_json::to_string(&Ballot::Abstain).unwrap(), "\"abstain\"");
        assert_eq!(serde_json::to_string(&Stage::Voting).unwrap(), "\"voting\"");
    }
}
