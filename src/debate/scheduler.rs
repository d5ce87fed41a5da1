//! Pure speaking-order computation.
//!
//! Given a room's mode, its (frozen) participant list and the number of
//! completed turns, derives who holds the floor. Nothing here mutates state;
//! the coordinator decides what an accepted turn does to the room.

use crate::room::models::{DebateMode, Participant, Side};

/// Each duelist speaks once per round
pub const DUEL_ROUNDS: usize = 3;

/// Seats per side in a team room
pub const TEAM_SEATS: usize = 3;

/// Total turns a session of this mode runs for, given its participant list.
/// Assembly rooms give each delegate exactly one turn, so the participant
/// list must already be frozen when this is consulted for a terminal check.
pub fn turn_total(mode: DebateMode, participants: &[Participant]) -> usize {
    match mode {
        DebateMode::Duel => DUEL_ROUNDS * 2,
        DebateMode::Team => TEAM_SEATS * 2,
        DebateMode::Assembly => participants.len(),
    }
}

/// The participant holding the floor at `progress_index`, or `None` once
/// turns are exhausted.
///
/// - duel: strict alternation in join order
/// - team: proposition seat 0, opposition seat 0, proposition seat 1, ...
///   ownership is the named participant in that seat, not "anyone on the side"
/// - assembly: join order, one turn each
pub fn speaker_at(
    mode: DebateMode,
    participants: &[Participant],
    progress_index: usize,
) -> Option<&Participant> {
    if progress_index >= turn_total(mode, participants) {
        return None;
    }
    match mode {
        DebateMode::Duel => participants.get(progress_index % 2),
        DebateMode::Team => {
            let side = if progress_index % 2 == 0 {
                Side::Proposition
            } else {
                Side::Opposition
            };
            let seat = progress_index / 2;
            participants
                .iter()
                .filter(|p| p.side == Some(side))
                .nth(seat)
        }
        DebateMode::Assembly => participants.get(progress_index),
    }
}
