use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{scheduler, voting};
use crate::event::{channel_name, EventBus, RoomEvent};
use crate::room::models::{Ballot, DebateMode, Participant, Room, Side, Stage, TranscriptEntry};
use crate::room::store::RoomStore;
use crate::room::types::{CastVoteRequest, CreateRoomRequest, JoinRoomRequest, SubmitTurnRequest};
use crate::shared::AppError;

/// Orchestrates every client action against a room.
///
/// Each public operation is one `RoomStore::mutate` (validate, compute via
/// the pure scheduler/voting modules, commit) followed by one or more
/// broadcast publishes. Validation failures commit nothing and broadcast
/// nothing; a publish failure after commit is logged and never rolled back,
/// the committed state is the source of truth.
pub struct SessionCoordinator {
    store: Arc<RoomStore>,
    event_bus: EventBus,
}

impl SessionCoordinator {
    pub fn new(store: Arc<RoomStore>, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Creates a room in its `open` stage with the creator as the first
    /// participant.
    #[instrument(skip(self, request), fields(mode = %request.mode))]
    pub async fn create_room(&self, request: CreateRoomRequest) -> Result<Room, AppError> {
        let creator = build_participant(
            request.mode,
            request.creator_name,
            request.creator_side,
            request.creator_country,
        )?;

        let room = self
            .store
            .create(request.topic.clone(), request.mode, creator)
            .await?;

        info!(code = %room.code, mode = %room.mode, "Room created");
        self.broadcast(
            &room,
            vec![RoomEvent::RoomCreated {
                topic: room.topic.clone(),
                room: room.clone(),
            }],
        )
        .await;

        Ok(room)
    }

    /// Adds a participant while the room is open. Team rooms activate
    /// automatically the moment both sides hold exactly three members.
    #[instrument(skip(self, request))]
    pub async fn join_room(&self, code: &str, request: JoinRoomRequest) -> Result<Room, AppError> {
        let (room, events) = self
            .store
            .mutate(code, move |room| {
                if room.stage != Stage::Open {
                    return Err(AppError::NotJoinable(room.code.clone()));
                }

                let joiner =
                    build_participant(room.mode, request.name, request.side, request.country)?;
                let identity = joiner.identity().to_string();

                if room.has_identity(&identity) {
                    return Err(AppError::DuplicateIdentity(identity));
                }
                match room.mode {
                    DebateMode::Duel => {
                        if room.participant_count() >= 2 {
                            return Err(AppError::RoomFull(room.code.clone()));
                        }
                    }
                    DebateMode::Team => {
                        let side = joiner.side.expect("team participant always has a side");
                        if room.side_count(side) >= scheduler::TEAM_SEATS {
                            return Err(AppError::SideFull(side.to_string()));
                        }
                    }
                    DebateMode::Assembly => {}
                }

                room.participants.push(joiner);
                room.touch();

                let mut events = vec![RoomEvent::ParticipantJoined {
                    identity,
                    room: room.clone(),
                }];

                // Team rooms need no explicit start call
                if room.mode == DebateMode::Team
                    && room.side_count(Side::Proposition) == scheduler::TEAM_SEATS
                    && room.side_count(Side::Opposition) == scheduler::TEAM_SEATS
                {
                    events.push(activate(room));
                }

                Ok((room.clone(), events))
            })
            .await?;

        self.broadcast(&room, events).await;
        Ok(room)
    }

    /// Explicit activation for duel and assembly rooms. Freezes the
    /// participant set and with it the turn order.
    #[instrument(skip(self))]
    pub async fn begin_debate(&self, code: &str) -> Result<Room, AppError> {
        let (room, events) = self
            .store
            .mutate(code, |room| {
                if room.stage != Stage::Open {
                    return Err(AppError::NotReady(format!(
                        "room {} has already started",
                        room.code
                    )));
                }
                match room.mode {
                    DebateMode::Duel => {
                        if room.participant_count() != 2 {
                            return Err(AppError::NotReady(
                                "a duel needs exactly two participants".to_string(),
                            ));
                        }
                    }
                    DebateMode::Assembly => {
                        if room.participant_count() < 2 {
                            return Err(AppError::NotReady(
                                "an assembly needs at least two delegates".to_string(),
                            ));
                        }
                    }
                    DebateMode::Team => {
                        return Err(AppError::NotReady(
                            "team rooms start automatically when both sides are full".to_string(),
                        ));
                    }
                }

                room.touch();
                let event = activate(room);
                Ok((room.clone(), vec![event]))
            })
            .await?;

        self.broadcast(&room, events).await;
        Ok(room)
    }

    /// Accepts a turn from the current speaker: appends exactly one
    /// transcript entry and advances the progress index by exactly one,
    /// atomically under the room's lock. A duplicate delivery arrives after
    /// the index has moved on, so it fails the speaker check and changes
    /// nothing.
    #[instrument(skip(self, request), fields(identity = %request.identity))]
    pub async fn submit_turn(
        &self,
        code: &str,
        request: SubmitTurnRequest,
    ) -> Result<Room, AppError> {
        let (room, events) = self
            .store
            .mutate(code, move |room| {
                match room.stage {
                    Stage::Active => {}
                    Stage::Open => {
                        return Err(AppError::NotReady(format!(
                            "room {} has not started",
                            room.code
                        )))
                    }
                    // Turns exhausted; a late or duplicated submission lands here
                    Stage::Voting | Stage::Results | Stage::Closed => {
                        return Err(AppError::NotYourTurn(request.identity))
                    }
                }

                if let Some(expected) = request.expected_turn {
                    if expected != room.progress_index {
                        return Err(AppError::NotYourTurn(request.identity));
                    }
                }

                let speaker = scheduler::speaker_at(room.mode, &room.participants, room.progress_index)
                    .ok_or_else(|| AppError::NotYourTurn(request.identity.clone()))?;
                if speaker.identity() != request.identity {
                    return Err(AppError::NotYourTurn(request.identity));
                }

                let entry = TranscriptEntry {
                    speaker: speaker.name.clone(),
                    affiliation: speaker.affiliation(),
                    text: request.text.clone(),
                    turn_index: room.progress_index,
                };
                let speaker_identity = speaker.identity().to_string();

                room.transcript.push(entry);
                room.progress_index += 1;
                room.touch();

                let next_speaker =
                    scheduler::speaker_at(room.mode, &room.participants, room.progress_index)
                        .map(|p| p.identity().to_string());

                let mut events = vec![RoomEvent::TurnSubmitted {
                    speaker: speaker_identity,
                    text: request.text,
                    turn_index: room.progress_index - 1,
                    next_speaker,
                    room: room.clone(),
                }];

                let total = room
                    .turn_total
                    .unwrap_or_else(|| scheduler::turn_total(room.mode, &room.participants));
                if room.progress_index >= total {
                    match room.mode {
                        DebateMode::Assembly => events.push(open_voting(room)),
                        DebateMode::Duel | DebateMode::Team => {
                            room.stage = Stage::Closed;
                            info!(code = %room.code, "Debate closed, turns exhausted");
                        }
                    }
                }

                Ok((room.clone(), events))
            })
            .await?;

        self.broadcast(&room, events).await;
        Ok(room)
    }

    /// Opens ballot collection early for an assembly room. The transition
    /// is one-way; voting also opens automatically once turns run out.
    #[instrument(skip(self))]
    pub async fn begin_voting(&self, code: &str) -> Result<Room, AppError> {
        let (room, events) = self
            .store
            .mutate(code, |room| {
                if room.mode != DebateMode::Assembly {
                    return Err(AppError::NotVoting(
                        "voting is only available in assembly rooms".to_string(),
                    ));
                }
                match room.stage {
                    Stage::Voting | Stage::Results => {
                        return Err(AppError::AlreadyVoting(room.code.clone()))
                    }
                    Stage::Closed => {
                        return Err(AppError::NotVoting(format!("room {} is closed", room.code)))
                    }
                    Stage::Open => {
                        return Err(AppError::NotReady(format!(
                            "room {} has not started",
                            room.code
                        )))
                    }
                    Stage::Active => {}
                }

                room.touch();
                let event = open_voting(room);
                Ok((room.clone(), vec![event]))
            })
            .await?;

        self.broadcast(&room, events).await;
        Ok(room)
    }

    /// Records (or overwrites) a ballot from an identity on the roll. Once
    /// every rolled identity holds a ballot the room finalizes to `results`.
    #[instrument(skip(self, request), fields(identity = %request.identity))]
    pub async fn cast_vote(
        &self,
        code: &str,
        request: CastVoteRequest,
    ) -> Result<(HashMap<String, Ballot>, Room), AppError> {
        let ((votes, room), events) = self
            .store
            .mutate(code, move |room| {
                if room.mode != DebateMode::Assembly {
                    return Err(AppError::NotVoting(
                        "voting is only available in assembly rooms".to_string(),
                    ));
                }
                match room.stage {
                    Stage::Voting => {}
                    Stage::Results | Stage::Closed => {
                        return Err(AppError::NotVoting(format!(
                            "voting has closed in room {}",
                            room.code
                        )))
                    }
                    Stage::Open | Stage::Active => {
                        return Err(AppError::NotVoting(format!(
                            "voting has not started in room {}",
                            room.code
                        )))
                    }
                }
                if !room.voting_roll.iter().any(|i| i == &request.identity) {
                    return Err(AppError::UnknownParticipant(request.identity));
                }

                voting::cast(&mut room.votes, &request.identity, request.ballot);
                room.touch();

                let mut events = vec![RoomEvent::VoteSubmitted {
                    identity: request.identity,
                    votes: room.votes.clone(),
                    room: room.clone(),
                }];

                if voting::is_complete(&room.votes, &room.voting_roll) {
                    let results = voting::finalize(&room.votes, &room.voting_roll)
                        .map_err(|e| AppError::IncompleteVotes(e.to_string()))?;
                    room.results = Some(results);
                    room.stage = Stage::Results;
                    info!(code = %room.code, outcome = ?results.outcome, "Voting finalized");
                    events.push(RoomEvent::ResultsFinalized {
                        results,
                        room: room.clone(),
                    });
                }

                Ok(((room.votes.clone(), room.clone()), events))
            })
            .await?;

        self.broadcast(&room, events).await;
        Ok((votes, room))
    }

    /// Read-only point-in-time view; never mutates, never broadcasts
    pub async fn room_snapshot(&self, code: &str) -> Result<Room, AppError> {
        self.store.snapshot(code).await
    }

    /// Publishes committed events to the room's channel. Failures here are
    /// logged only; the commit already happened and clients reconcile via
    /// snapshot fetches.
    async fn broadcast(&self, room: &Room, events: Vec<RoomEvent>) {
        let channel = channel_name(room.mode, &room.code);
        for event in events {
            self.event_bus.publish(&channel, event).await;
        }
    }
}

/// Builds a participant from the mode-specific identity fields, rejecting
/// requests missing the field their mode requires.
fn build_participant(
    mode: DebateMode,
    name: String,
    side: Option<Side>,
    country: Option<String>,
) -> Result<Participant, AppError> {
    if name.trim().is_empty() {
        return Err(AppError::InvalidRequest("name must not be empty".to_string()));
    }
    match mode {
        DebateMode::Duel => Ok(Participant::duelist(name)),
        DebateMode::Team => {
            let side = side.ok_or_else(|| {
                AppError::InvalidRequest("side is required for team rooms".to_string())
            })?;
            Ok(Participant::team_member(name, side))
        }
        DebateMode::Assembly => {
            let country = country.filter(|c| !c.trim().is_empty()).ok_or_else(|| {
                AppError::InvalidRequest("country is required for assembly rooms".to_string())
            })?;
            Ok(Participant::delegate(name, country))
        }
    }
}

/// Freezes the participant set and moves the room to its active stage
fn activate(room: &mut Room) -> RoomEvent {
    room.stage = Stage::Active;
    room.turn_total = Some(scheduler::turn_total(room.mode, &room.participants));
    info!(
        code = %room.code,
        participants = room.participant_count(),
        turn_total = ?room.turn_total,
        "Debate started"
    );
    RoomEvent::DebateStarted {
        current_speaker: scheduler::speaker_at(room.mode, &room.participants, room.progress_index)
            .map(|p| p.identity().to_string()),
        room: room.clone(),
    }
}

/// One-way transition into ballot collection; the roll freezes to the
/// identities present right now
fn open_voting(room: &mut Room) -> RoomEvent {
    room.stage = Stage::Voting;
    room.voting_roll = room
        .participants
        .iter()
        .map(|p| p.identity().to_string())
        .collect();
    info!(
        code = %room.code,
        roll = room.voting_roll.len(),
        "Voting started"
    );
    if room.votes.keys().any(|i| !room.voting_roll.contains(i)) {
        // Cannot happen through the public operations, but don't let a
        // stray ballot block finalization accounting
        warn!(code = %room.code, "Ballots present from identities outside the roll");
    }
    RoomEvent::VotingStarted {
        roll: room.voting_roll.clone(),
        room: room.clone(),
    }
}
