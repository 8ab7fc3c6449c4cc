use serde::{Deserialize, Serialize};

/// Stable identifier of a player, numbered from 1 in the order names were submitted.
pub type PlayerId = usize;

/// A game player.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub role_label: String,
    pub alive: bool,
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Werewolf,
    Seer,
    Bodyguard,
    Witch,
    Hunter,
    Villager,
}

/// The two sides counted by the win check.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub enum Faction {
    Werewolves,
    Village,
}

impl ToString for Role {
    fn to_string(&self) -> String {
        match self {
            Role::Werewolf => "werewolf",
            Role::Seer => "seer",
            Role::Bodyguard => "bodyguard",
            Role::Witch => "witch",
            Role::Hunter => "hunter",
            Role::Villager => "villager",
        }
        .to_string()
    }
}

impl Role {
    /// The roles that wake up at night, in the order they are called.
    pub const NIGHT_ORDER: [Role; 4] = [Role::Werewolf, Role::Seer, Role::Bodyguard, Role::Witch];

    /// Parses the lowercase role key used by setup files and requests.
    pub fn from_key(key: &str) -> Option<Role> {
        match key {
            "werewolf" => Some(Role::Werewolf),
            "seer" => Some(Role::Seer),
            "bodyguard" => Some(Role::Bodyguard),
            "witch" => Some(Role::Witch),
            "hunter" => Some(Role::Hunter),
            "villager" => Some(Role::Villager),
            _ => None,
        }
    }

    pub fn faction(&self) -> Faction {
        match self {
            Role::Werewolf => Faction::Werewolves,
            _ => Faction::Village,
        }
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            Role::Werewolf => "Werewolf",
            Role::Seer => "Seer",
            Role::Bodyguard => "Bodyguard",
            Role::Witch => "Witch",
            Role::Hunter => "Hunter",
            Role::Villager => "Villager",
        }
    }

    /// The one-line reminder shown when a player looks at their role.
    pub fn description(&self) -> &'static str {
        match self {
            Role::Werewolf => "Eliminate a player each night",
            Role::Seer => "Discover a player's role each night",
            Role::Bodyguard => "Protect one player each night",
            Role::Witch => "Save or poison once per game",
            Role::Hunter => "Eliminate someone when eliminated",
            Role::Villager => "Work together to find the werewolves",
        }
    }
}

impl Player {
    pub fn new(id: PlayerId, name: String, role: Role, role_label: String) -> Self {
        Self {
            id,
            name,
            role,
            role_label,
            alive: true,
        }
    }

    pub fn faction(&self) -> Faction {
        self.role.faction()
    }

    /// The view of this player that everyone at the table may see.
    pub fn public(&self) -> PublicPlayer {
        PublicPlayer {
            id: self.id,
            name: self.name.clone(),
            alive: self.alive,
        }
    }
}

/// A player with their role hidden.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct PublicPlayer {
    pub id: PlayerId,
    pub name: String,
    pub alive: bool,
}
