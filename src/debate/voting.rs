//! Pure vote accumulation and resolution for assembly rooms.
//!
//! No side effects here: the coordinator owns the room state and calls in
//! with the room's vote map and the roll frozen at voting start.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::room::models::Ballot;

/// Ballot counts by value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub yes: usize,
    pub no: usize,
    pub abstain: usize,
}

/// Resolution outcome. Abstentions never affect the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Tied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingResults {
    pub tally: Tally,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum VoteError {
    #[error("Missing ballots from: {}", .0.join(", "))]
    Incomplete(Vec<String>),
}

/// Records a ballot. Re-voting before finalization overwrites the prior
/// ballot from the same identity (last vote wins, never additive).
pub fn cast(votes: &mut HashMap<String, Ballot>, identity: &str, ballot: Ballot) {
    votes.insert(identity.to_string(), ballot);
}

/// Identities on the roll that have not voted yet
pub fn missing_voters(votes: &HashMap<String, Ballot>, roll: &[String]) -> Vec<String> {
    roll.iter()
        .filter(|identity| !votes.contains_key(*identity))
        .cloned()
        .collect()
}

pub fn is_complete(votes: &HashMap<String, Ballot>, roll: &[String]) -> bool {
    missing_voters(votes, roll).is_empty()
}

pub fn tally(votes: &HashMap<String, Ballot>) -> Tally {
    let mut counts = Tally {
        yes: 0,
        no: 0,
        abstain: 0,
    };
    for ballot in votes.values() {
        match ballot {
            Ballot::Yes => counts.yes += 1,
            Ballot::No => counts.no += 1,
            Ballot::Abstain => counts.abstain += 1,
        }
    }
    counts
}

pub fn outcome(tally: &Tally) -> Outcome {
    match tally.yes.cmp(&tally.no) {
        std::cmp::Ordering::Greater => Outcome::Passed,
        std::cmp::Ordering::Less => Outcome::Failed,
        std::cmp::Ordering::Equal => Outcome::Tied,
    }
}

/// Resolves the vote once every identity on the roll has a ballot.
/// The caller decides whether an `Incomplete` result means wait or reject.
pub fn finalize(
    votes: &HashMap<String, Ballot>,
    roll: &[String],
) -> Result<VotingResults, VoteError> {
    let missing = missing_voters(votes, roll);
    if !missing.is_empty() {
        return Err(VoteError::Incomplete(missing));
    }
    let tally = tally(votes);
    Ok(VotingResults {
        outcome: outcome(&tally),
        tally,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roll(identities: &[&str]) -> Vec<String> {
        identities.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cast_is_last_vote_wins() {
        let mut votes = HashMap::new();
        cast(&mut votes, "France", Ballot::Yes);
        cast(&mut votes, "France", Ballot::No);

        assert_eq!(votes.len(), 1);
        assert_eq!(votes.get("France"), Some(&Ballot::No));
    }

    #[test]
    fn test_tally_counts_each_value() {
        let mut votes = HashMap::new();
        cast(&mut votes, "France", Ballot::Yes);
        cast(&mut votes, "Brazil", Ballot::Yes);
        cast(&mut votes, "Japan", Ballot::No);
        cast(&mut votes, "Kenya", Ballot::Abstain);

        let tally = tally(&votes);
        assert_eq!(tally.yes, 2);
        assert_eq!(tally.no, 1);
        assert_eq!(tally.abstain, 1);
    }

    #[test]
    fn test_outcome_comparison_ignores_abstain() {
        let passed = Tally {
            yes: 2,
            no: 1,
            abstain: 5,
        };
        let failed = Tally {
            yes: 1,
            no: 3,
            abstain: 0,
        };
        let tied = Tally {
            yes: 2,
            no: 2,
            abstain: 1,
        };

        assert_eq!(outcome(&passed), Outcome::Passed);
        assert_eq!(outcome(&failed), Outcome::Failed);
        assert_eq!(outcome(&tied), Outcome::Tied);
    }

    #[test]
    fn test_finalize_requires_full_roll() {
        let roll = roll(&["France", "Brazil", "Japan"]);
        let mut votes = HashMap::new();
        cast(&mut votes, "France", Ballot::Yes);
        cast(&mut votes, "Brazil", Ballot::Yes);

        let result = finalize(&votes, &roll);
        assert!(matches!(
            result,
            Err(VoteError::Incomplete(ref missing)) if missing == &vec!["Japan".to_string()]
        ));

        cast(&mut votes, "Japan", Ballot::No);
        let results = finalize(&votes, &roll).unwrap();
        assert_eq!(results.tally.yes, 2);
        assert_eq!(results.tally.no, 1);
        assert_eq!(results.outcome, Outcome::Passed);
    }

    #[test]
    fn test_finalize_with_empty_roll() {
        // A room that somehow opened voting with no participants resolves
        // immediately as tied
        let votes = HashMap::new();
        let results = finalize(&votes, &[]).unwrap();
        assert_eq!(results.outcome, Outcome::Tied);
    }

    #[test]
    fn test_ballots_outside_roll_do_not_block_completion() {
        let roll = roll(&["France"]);
        let mut votes = HashMap::new();
        cast(&mut votes, "France", Ballot::Yes);

        assert!(is_complete(&votes, &roll));
    }
}
