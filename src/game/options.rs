use super::player::Role;
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One entry of the role pool: how many players receive a role, and what it is called at the table.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct RoleSlot {
    pub kind: Role,
    #[serde(default)]
    pub label: Option<String>,
    pub count: usize,
}

/// Options for customising a game: the role pool and the length of each timed phase.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct GameOptions {
    pub roles: Vec<RoleSlot>,
    /// Seconds each night role (and the hunter) has to act.
    #[serde(default = "default_night_time")]
    pub night_time: u64,
    /// Seconds of discussion before voting opens.
    #[serde(default = "default_discussion_time")]
    pub discussion_time: u64,
    /// Seconds the vote stays open.
    #[serde(default = "default_voting_time")]
    pub voting_time: u64,
}

fn default_night_time() -> u64 {
    30
}

fn default_discussion_time() -> u64 {
    120
}

fn default_voting_time() -> u64 {
    60
}

impl Default for GameOptions {
    fn default() -> Self {
        Self::preset(6)
    }
}

impl RoleSlot {
    pub fn new(kind: Role, count: usize) -> Self {
        Self { kind, label: None, count }
    }

    /// The display name, falling back to the role's default label.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.kind.default_label())
    }
}

impl GameOptions {
    /// A basic setup for `total` players: one werewolf, seer and bodyguard, the rest villagers.
    pub fn preset(total: usize) -> Self {
        Self {
            roles: vec![
                RoleSlot::new(Role::Werewolf, 1),
                RoleSlot::new(Role::Seer, 1),
                RoleSlot::new(Role::Bodyguard, 1),
                RoleSlot::new(Role::Villager, total.saturating_sub(3)),
            ],
            night_time: default_night_time(),
            discussion_time: default_discussion_time(),
            voting_time: default_voting_time(),
        }
    }

    /// Total number of roles in the pool.
    pub fn num_roles(&self) -> usize {
        self.roles.iter().map(|slot| slot.count).sum()
    }

    /// Returns a `GameError` if the role pool cannot be dealt to `num_players` players.
    pub fn check_player_count(&self, num_players: usize) -> Result<(), GameError> {
        if num_players == 0 {
            return Err(GameError::TooFewPlayers);
        }
        let roles = self.num_roles();
        if roles != num_players {
            return Err(GameError::ConfigMismatch {
                players: num_players,
                roles,
            });
        }
        Ok(())
    }

    /// Expands the pool into one `(role, label)` entry per card.
    pub fn role_pool(&self) -> Vec<(Role, String)> {
        self.roles
            .iter()
            .flat_map(|slot| std::iter::repeat((slot.kind, slot.label().to_string())).take(slot.count))
            .collect()
    }

    pub fn night_time(&self) -> Duration {
        Duration::from_secs(self.night_time)
    }

    pub fn discussion_time(&self) -> Duration {
        Duration::from_secs(self.discussion_time)
    }

    pub fn voting_time(&self) -> Duration {
        Duration::from_secs(self.voting_time)
    }
}
