use super::hunter::DeathCause;
use super::night::WitchCharges;
use super::player::{Player, PlayerId, PublicPlayer, Role};
use super::{DayStage, Game, GameState, Winner};
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifies one entry into a phase. Timers carry the id of the phase they were started for,
/// so an expiry that arrives after the phase has ended can be recognised and ignored.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct PhaseId(pub u64);

impl PhaseId {
    pub fn next(self) -> Self {
        PhaseId(self.0 + 1)
    }
}

/// Something the presentation layer needs to hear about.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    /// A new phase has started; `prompt` holds what is needed to render it.
    PhaseEntered {
        phase: PhaseId,
        deadline_secs: Option<u64>,
        prompt: Prompt,
    },
    /// Shown to the seer only.
    RoleRevealed {
        target: PlayerId,
        name: String,
        role_label: String,
    },
    /// A batch of eliminations has been applied to the roster.
    Deaths {
        round: usize,
        reason: DeathReason,
        players: Vec<PublicPlayer>,
        message: String,
    },
    GameOver {
        winner: Winner,
        players: Vec<Player>,
    },
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub enum DeathReason {
    Night,
    Vote,
    HunterShot,
}

/// What a single player sees when they look at their role during role assignment.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoleCard {
    pub player: PublicPlayer,
    pub role: Role,
    pub role_label: String,
    pub description: String,
    pub confirmed: bool,
}

/// The data needed to render the current phase.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Prompt {
    RoleAssignment {
        players: Vec<PublicPlayer>,
        confirmed: Vec<PlayerId>,
    },
    NightTurn {
        round: usize,
        role: Role,
        alive: Vec<PublicPlayer>,
        /// The bodyguard may not protect the same player two rounds running.
        forbidden: Option<PlayerId>,
        /// The werewolves' victim, shown to the witch.
        victim: Option<PlayerId>,
        /// The witch's unused potions.
        charges: Option<WitchCharges>,
    },
    Day {
        round: usize,
        stage: DayStage,
        players: Vec<PublicPlayer>,
        last_night_deaths: Vec<PlayerId>,
        votes: BTreeMap<PlayerId, PlayerId>,
        skips: Vec<PlayerId>,
        all_cast: bool,
    },
    HunterShot {
        round: usize,
        hunter: PublicPlayer,
        cause: DeathCause,
        eligible: Vec<PlayerId>,
    },
    Results {
        round: usize,
        message: String,
        players: Vec<PublicPlayer>,
    },
    GameOver {
        winner: Winner,
        players: Vec<Player>,
    },
}

impl Game {
    /// The role card of a single player. Only meant to be shown to that player.
    pub fn role_card(&self, player: PlayerId) -> Result<RoleCard, GameError> {
        let player = self.roster.by_id(player)?;
        let confirmed = match &self.state {
            GameState::RoleAssignment { confirmations } => confirmations.has_confirmed(player.id),
            _ => true,
        };
        Ok(RoleCard {
            player: player.public(),
            role: player.role,
            role_label: player.role_label.clone(),
            description: player.role.description().to_string(),
            confirmed,
        })
    }

    /// Builds the prompt for the current phase.
    pub fn prompt(&self) -> Prompt {
        match &self.state {
            GameState::RoleAssignment { confirmations } => Prompt::RoleAssignment {
                players: self.roster.public(),
                confirmed: confirmations.confirmed().copied().collect(),
            },
            GameState::Night { queue, actions } => {
                let role = queue.current().unwrap_or(Role::Werewolf);
                Prompt::NightTurn {
                    round: self.round,
                    role,
                    alive: self.roster.public_alive(),
                    forbidden: (role == Role::Bodyguard).then_some(self.last_protected).flatten(),
                    victim: (role == Role::Witch).then(|| actions.pending_victim()).flatten(),
                    charges: (role == Role::Witch).then_some(self.charges),
                }
            }
            GameState::Day { stage, votes } => Prompt::Day {
                round: self.round,
                stage: *stage,
                players: self.roster.public(),
                last_night_deaths: self.last_night_deaths.clone(),
                votes: votes.votes().clone(),
                skips: votes.skips().iter().copied().collect(),
                all_cast: votes.all_cast(&self.roster),
            },
            GameState::HunterShot(shot) => Prompt::HunterShot {
                round: self.round,
                hunter: self
                    .roster
                    .by_id(shot.hunter)
                    .map(Player::public)
                    .unwrap_or_else(|_| PublicPlayer {
                        id: shot.hunter,
                        name: String::new(),
                        alive: false,
                    }),
                cause: shot.cause,
                eligible: shot.eligible(&self.roster),
            },
            GameState::Results { message } => Prompt::Results {
                round: self.round,
                message: message.clone(),
                players: self.roster.public(),
            },
            GameState::GameOver(winner) => Prompt::GameOver {
                winner: *winner,
                players: self.roster.players().to_vec(),
            },
        }
    }
}
