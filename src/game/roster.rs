use super::options::GameOptions;
use super::player::{Faction, Player, PlayerId, PublicPlayer, Role};
use crate::error::GameError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Every player in the game, in the order their names were submitted.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct Roster {
    players: Vec<Player>,
}

/// Living players on each side of the win check.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub struct FactionCount {
    pub werewolves: usize,
    pub others: usize,
}

impl Roster {
    /// Deals the role pool to the given names.
    ///
    /// The pool is shuffled with Fisher-Yates and then zipped with the names in order,
    /// so every assignment of roles to seats is equally likely.
    pub fn deal(names: &[String], opts: &GameOptions, rng: &mut impl Rng) -> Result<Self, GameError> {
        opts.check_player_count(names.len())?;
        let mut pool = opts.role_pool();
        pool.shuffle(rng);
        let players = names
            .iter()
            .zip(pool)
            .enumerate()
            .map(|(idx, (name, (role, label)))| Player::new(idx + 1, name.clone(), role, label))
            .collect();
        Ok(Self { players })
    }

    /// Builds a roster with fixed roles, using each role's default label.
    #[cfg(test)]
    pub fn with_roles(players: &[(&str, Role)]) -> Self {
        let players = players
            .iter()
            .enumerate()
            .map(|(idx, (name, role))| Player::new(idx + 1, name.to_string(), *role, role.default_label().into()))
            .collect();
        Self { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.alive)
    }

    pub fn by_id(&self, id: PlayerId) -> Result<&Player, GameError> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(GameError::PlayerNotFound)
    }

    /// Returns the player if they exist and are still alive.
    pub fn alive(&self, id: PlayerId) -> Result<&Player, GameError> {
        match self.by_id(id)? {
            player if player.alive => Ok(player),
            _ => Err(GameError::InvalidTarget),
        }
    }

    #[cfg(test)]
    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.alive(id).is_ok()
    }

    /// Returns true if any living player holds the given role.
    pub fn has_living(&self, role: Role) -> bool {
        self.alive_players().any(|p| p.role == role)
    }

    /// Marks the given players as dead, returning the ones that were alive until now.
    /// Killing a player who is already dead has no effect.
    pub fn kill(&mut self, ids: &[PlayerId]) -> Vec<PlayerId> {
        let mut killed = vec![];
        for player in self.players.iter_mut() {
            if player.alive && ids.contains(&player.id) {
                player.alive = false;
                killed.push(player.id);
            }
        }
        killed
    }

    pub fn count_alive_by_faction(&self) -> FactionCount {
        let werewolves = self
            .alive_players()
            .filter(|p| p.faction() == Faction::Werewolves)
            .count();
        let others = self.alive_players().count() - werewolves;
        FactionCount { werewolves, others }
    }

    pub fn names(&self) -> impl Iterator<Item = &'_ str> {
        self.players.iter().map(|p| &p.name[..])
    }

    /// Every player with roles hidden.
    pub fn public(&self) -> Vec<PublicPlayer> {
        self.players.iter().map(Player::public).collect()
    }

    /// Living players with roles hidden.
    pub fn public_alive(&self) -> Vec<PublicPlayer> {
        self.alive_players().map(Player::public).collect()
    }
}
