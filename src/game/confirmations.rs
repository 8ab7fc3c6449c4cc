use super::player::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tracks which players have looked at their role card,
/// such that the first night can only start once everyone has.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Confirmations {
    num_players: usize,
    confirmed: BTreeSet<PlayerId>,
}

impl Confirmations {
    /// Expects one confirmation from each of `num_players` players.
    pub fn new(num_players: usize) -> Self {
        Self {
            num_players,
            confirmed: BTreeSet::new(),
        }
    }

    /// Whether the player has already seen their card.
    pub fn has_confirmed(&self, player: PlayerId) -> bool {
        self.confirmed.contains(&player)
    }

    /// Marks the player's card as seen. Returns `true` once every player has seen theirs.
    pub fn confirm(&mut self, player: PlayerId) -> bool {
        self.confirmed.insert(player);
        self.can_proceed()
    }

    pub fn can_proceed(&self) -> bool {
        self.confirmed.len() >= self.num_players
    }

    pub fn confirmed(&self) -> impl Iterator<Item = &PlayerId> {
        self.confirmed.iter()
    }
}
