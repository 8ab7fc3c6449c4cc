use super::player::PlayerId;
use super::roster::Roster;
use crate::error::GameError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// When the hunter died, which decides where the game goes after their shot.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum DeathCause {
    /// Killed during the night; the day follows the shot.
    Night,
    /// Voted out; the next night follows the shot.
    Day,
}

/// A hunter waiting to take someone down with them.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub struct HunterShot {
    pub hunter: PlayerId,
    pub cause: DeathCause,
    /// Other hunters who died in the same batch and shoot after this one.
    pub queued: Vec<PlayerId>,
}

impl HunterShot {
    /// Creates the shot for the first of `hunters`, queueing the rest.
    pub fn new(mut hunters: Vec<PlayerId>, cause: DeathCause) -> Option<Self> {
        if hunters.is_empty() {
            return None;
        }
        let hunter = hunters.remove(0);
        Some(Self {
            hunter,
            cause,
            queued: hunters,
        })
    }

    /// Players the hunter may shoot: everyone still alive except the hunter.
    pub fn eligible(&self, roster: &Roster) -> Vec<PlayerId> {
        roster
            .alive_players()
            .filter(|p| p.id != self.hunter)
            .map(|p| p.id)
            .collect()
    }

    /// Checks the hunter's choice. `None` means the hunter shoots no one.
    pub fn check_target(&self, roster: &Roster, target: Option<PlayerId>) -> Result<Option<PlayerId>, GameError> {
        let Some(target) = target else {
            return Ok(None);
        };
        if target == self.hunter {
            return Err(GameError::InvalidTarget);
        }
        roster.alive(target)?;
        Ok(Some(target))
    }

    /// Picks a target uniformly at random when the hunter runs out of time.
    pub fn auto_pick(&self, roster: &Roster, rng: &mut impl Rng) -> Option<PlayerId> {
        self.eligible(roster).choose(rng).copied()
    }
}
