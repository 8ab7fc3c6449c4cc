use super::player::PlayerId;
use super::roster::Roster;
use crate::error::GameError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tracks the vote of each player during the day.
/// A player has either voted for someone, abstained, or not voted yet.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct Votes {
    votes: BTreeMap<PlayerId, PlayerId>,
    skips: BTreeSet<PlayerId>,
}

/// What the village decided.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VoteOutcome {
    /// There were no more votes than abstentions.
    NotPassed,
    Eliminate { target: PlayerId },
}

impl Votes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a vote, replacing any earlier vote or abstention by the same player.
    /// A `None` target withdraws the player's vote.
    pub fn vote(&mut self, roster: &Roster, voter: PlayerId, target: Option<PlayerId>) -> Result<(), GameError> {
        roster.alive(voter)?;
        let Some(target) = target else {
            self.votes.remove(&voter);
            return Ok(());
        };
        roster.alive(target)?;
        if target == voter {
            return Err(GameError::InvalidTarget);
        }
        self.skips.remove(&voter);
        self.votes.insert(voter, target);
        Ok(())
    }

    /// Records that a player abstains, withdrawing any vote they cast.
    pub fn skip(&mut self, roster: &Roster, voter: PlayerId) -> Result<(), GameError> {
        roster.alive(voter)?;
        self.votes.remove(&voter);
        self.skips.insert(voter);
        Ok(())
    }

    /// Returns whether the given player has voted or abstained.
    pub fn has_cast(&self, voter: PlayerId) -> bool {
        self.votes.contains_key(&voter) || self.skips.contains(&voter)
    }

    /// Returns true once every living player has voted or abstained.
    pub fn all_cast(&self, roster: &Roster) -> bool {
        roster.alive_players().all(|p| self.has_cast(p.id))
    }

    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    pub fn skip_count(&self) -> usize {
        self.skips.len()
    }

    /// The number of votes against each player who received any.
    pub fn tally(&self) -> BTreeMap<PlayerId, usize> {
        let mut counts = BTreeMap::new();
        for target in self.votes.values() {
            *counts.entry(*target).or_insert(0) += 1;
        }
        counts
    }

    /// Gets the votes of each player.
    pub fn votes(&self) -> &BTreeMap<PlayerId, PlayerId> {
        &self.votes
    }

    pub fn skips(&self) -> &BTreeSet<PlayerId> {
        &self.skips
    }

    /// Decides the vote. The vote only passes if there are more votes than abstentions;
    /// a tie for the most votes is broken uniformly at random.
    pub fn outcome(&self, rng: &mut impl Rng) -> VoteOutcome {
        if self.vote_count() <= self.skip_count() {
            return VoteOutcome::NotPassed;
        }
        let tally = self.tally();
        let Some(max) = tally.values().copied().max() else {
            return VoteOutcome::NotPassed;
        };
        let tied: Vec<PlayerId> = tally
            .into_iter()
            .filter(|(_, count)| *count == max)
            .map(|(target, _)| target)
            .collect();
        match tied.choose(rng) {
            Some(target) => VoteOutcome::Eliminate { target: *target },
            None => VoteOutcome::NotPassed,
        }
    }
}
