use super::player::{Faction, PlayerId, Role};
use super::roster::Roster;
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An action submitted by the role currently being called at night.
/// A `None` target is an explicit skip.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum NightAction {
    /// The werewolves choose who to eliminate.
    Kill { target: Option<PlayerId> },
    /// The seer learns one player's role.
    Reveal { target: Option<PlayerId> },
    /// The bodyguard protects one player from the werewolves.
    Protect { target: Option<PlayerId> },
    /// The witch may save tonight's victim and poison someone, in the same turn.
    Potions {
        #[serde(default)]
        save: Option<PlayerId>,
        #[serde(default)]
        poison: Option<PlayerId>,
    },
}

impl NightAction {
    /// The role that performs this action.
    pub fn role(&self) -> Role {
        match self {
            NightAction::Kill { .. } => Role::Werewolf,
            NightAction::Reveal { .. } => Role::Seer,
            NightAction::Protect { .. } => Role::Bodyguard,
            NightAction::Potions { .. } => Role::Witch,
        }
    }

    /// The action a role takes when it does nothing.
    pub fn skip(role: Role) -> Option<Self> {
        match role {
            Role::Werewolf => Some(NightAction::Kill { target: None }),
            Role::Seer => Some(NightAction::Reveal { target: None }),
            Role::Bodyguard => Some(NightAction::Protect { target: None }),
            Role::Witch => Some(NightAction::Potions { save: None, poison: None }),
            Role::Hunter | Role::Villager => None,
        }
    }
}

/// The witch's potions that have not been used yet. Never replenished.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub struct WitchCharges {
    pub save: bool,
    pub poison: bool,
}

impl Default for WitchCharges {
    fn default() -> Self {
        Self { save: true, poison: true }
    }
}

/// Everything submitted during one night. Deaths are only computed by [NightActions::finalize].
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct NightActions {
    werewolf_victim: Option<PlayerId>,
    protected: Option<PlayerId>,
    witch_saved: Option<PlayerId>,
    poisoned: BTreeSet<PlayerId>,
}

/// The result of resolving a night.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct NightOutcome {
    /// Players who die, in roster order.
    pub deaths: Vec<PlayerId>,
    /// The werewolves' victim, if they were protected.
    pub saved: Option<PlayerId>,
}

impl NightActions {
    /// The werewolves' victim, unless the witch has already saved them.
    pub fn pending_victim(&self) -> Option<PlayerId> {
        self.werewolf_victim.filter(|victim| self.witch_saved != Some(*victim))
    }

    /// The bodyguard's choice this night.
    pub fn protected(&self) -> Option<PlayerId> {
        self.protected
    }

    /// Records the werewolves' choice. Werewolves may not choose one of their own.
    pub fn kill(&mut self, roster: &Roster, target: PlayerId) -> Result<(), GameError> {
        let victim = roster.alive(target)?;
        if victim.faction() == Faction::Werewolves {
            return Err(GameError::InvalidTarget);
        }
        self.werewolf_victim = Some(target);
        Ok(())
    }

    /// Records the bodyguard's choice; `last_protected` is the player they protected the previous round.
    pub fn protect(
        &mut self,
        roster: &Roster,
        last_protected: Option<PlayerId>,
        target: PlayerId,
    ) -> Result<(), GameError> {
        roster.alive(target)?;
        if self.protected.is_some() || last_protected == Some(target) {
            return Err(GameError::InvalidTarget);
        }
        self.protected = Some(target);
        Ok(())
    }

    /// Uses the save potion on the werewolves' victim.
    /// Saving anyone else is rejected and leaves the potion unused.
    pub fn save(&mut self, charges: &mut WitchCharges, target: PlayerId) -> Result<(), GameError> {
        if !charges.save {
            return Err(GameError::ChargeAlreadyUsed);
        }
        if self.pending_victim() != Some(target) {
            return Err(GameError::InvalidTarget);
        }
        self.witch_saved = Some(target);
        charges.save = false;
        Ok(())
    }

    /// Uses the poison potion on a living player.
    pub fn poison(&mut self, roster: &Roster, charges: &mut WitchCharges, target: PlayerId) -> Result<(), GameError> {
        if !charges.poison {
            return Err(GameError::ChargeAlreadyUsed);
        }
        roster.alive(target)?;
        self.poisoned.insert(target);
        charges.poison = false;
        Ok(())
    }

    /// Works out who dies tonight from what was submitted.
    ///
    /// Protection only counts if the protector is still alive when the night ends.
    pub fn finalize(&self, roster: &Roster) -> NightOutcome {
        let mut saved = None;
        let mut deaths: BTreeSet<PlayerId> = self.poisoned.clone();

        if let Some(victim) = self.werewolf_victim {
            let by_bodyguard = self.protected == Some(victim) && roster.has_living(Role::Bodyguard);
            let by_witch = self.witch_saved == Some(victim) && roster.has_living(Role::Witch);
            if by_bodyguard || by_witch {
                saved = Some(victim);
            } else {
                deaths.insert(victim);
            }
        }

        let deaths = roster
            .players()
            .iter()
            .filter(|p| p.alive && deaths.contains(&p.id))
            .map(|p| p.id)
            .collect();
        NightOutcome { deaths, saved }
    }
}
