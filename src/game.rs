use self::confirmations::Confirmations;
pub use self::events::{DeathReason, GameEvent, PhaseId, Prompt, RoleCard};
use self::hunter::{DeathCause, HunterShot};
pub use self::night::{NightAction, WitchCharges};
use self::night::NightActions;
pub use self::options::{GameOptions, RoleSlot};
use self::player::Faction;
pub use self::player::{Player, PlayerId, Role};
use self::queue::NightQueue;
use self::roster::Roster;
use self::votes::{VoteOutcome, Votes};
use crate::error::GameError;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod confirmations;
mod events;
mod hunter;
mod night;
mod options;
mod player;
mod queue;
mod roster;
mod test;
mod votes;

/// A game of Werewolf, moderated from setup to the final win check.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Game {
    opts: GameOptions,
    roster: Roster,
    state: GameState,
    /// The current round, counted from 1. A round is one night followed by one day.
    round: usize,
    phase: PhaseId,
    charges: WitchCharges,
    /// The player the bodyguard protected in the previous round.
    last_protected: Option<PlayerId>,
    last_night_deaths: Vec<PlayerId>,
    #[serde(skip)]
    events: Vec<GameEvent>,
    rng: rand_chacha::ChaCha8Rng,
}

/// Represents the current phase in the game loop.
#[derive(Clone, Serialize, Deserialize, Debug)]
enum GameState {
    RoleAssignment {
        confirmations: Confirmations,
    },
    Night {
        queue: NightQueue,
        actions: NightActions,
    },
    Day {
        stage: DayStage,
        votes: Votes,
    },
    HunterShot(HunterShot),
    Results {
        message: String,
    },
    GameOver(Winner),
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub enum DayStage {
    /// Players talk things over; no votes yet.
    Discussion,
    Voting,
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub enum Winner {
    /// Every werewolf is dead.
    Villagers,
    /// The werewolves are at least as many as everyone else.
    Werewolves,
}

impl ToString for Winner {
    fn to_string(&self) -> String {
        match self {
            Winner::Villagers => "Villagers",
            Winner::Werewolves => "Werewolves",
        }
        .to_string()
    }
}

impl Game {
    /// Creates a new game, dealing the role pool to the given players.
    pub fn new(opts: GameOptions, player_names: &[String], seed: u64) -> Result<Self, GameError> {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
        let roster = Roster::deal(player_names, &opts, &mut rng)?;
        for player in roster.players() {
            log::debug!("{} -> {} ({})", player.name, player.role_label, player.role.to_string());
        }
        Ok(Self::with_roster(opts, roster, rng))
    }

    fn with_roster(opts: GameOptions, roster: Roster, rng: rand_chacha::ChaCha8Rng) -> Self {
        let mut game = Game {
            opts,
            state: GameState::RoleAssignment {
                confirmations: Confirmations::new(roster.len()),
            },
            roster,
            round: 1,
            phase: PhaseId::default(),
            charges: WitchCharges::default(),
            last_protected: None,
            last_night_deaths: vec![],
            events: vec![],
            rng,
        };
        let state = game.state.clone();
        game.enter(state);
        game
    }

    /// Gets the player names.
    pub fn player_names(&self) -> impl Iterator<Item = &'_ str> {
        self.roster.names()
    }

    pub fn players(&self) -> &[Player] {
        self.roster.players()
    }

    pub fn round(&self) -> usize {
        self.round
    }

    /// The id of the phase currently in progress.
    pub fn phase(&self) -> PhaseId {
        self.phase
    }

    pub fn witch_charges(&self) -> WitchCharges {
        self.charges
    }

    /// Drains the events produced since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// How long the current phase waits for input before resolving itself, if it is timed.
    pub fn deadline(&self) -> Option<Duration> {
        match &self.state {
            GameState::Night { .. } | GameState::HunterShot(_) => Some(self.opts.night_time()),
            GameState::Day { stage: DayStage::Discussion, .. } => Some(self.opts.discussion_time()),
            GameState::Day { stage: DayStage::Voting, .. } => Some(self.opts.voting_time()),
            _ => None,
        }
    }

    /// Called when a player has seen their role.
    pub fn confirm_role(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.roster.by_id(player)?;
        let GameState::RoleAssignment { confirmations } = &mut self.state else {
            return Err(GameError::InvalidAction);
        };
        if confirmations.confirm(player) {
            if self.check_game_over() {
                return Ok(());
            }
            self.start_night();
        }
        Ok(())
    }

    /// Called when the role being called at night submits its action.
    ///
    /// A target the rules forbid is treated as a skip; either way the night moves on to the next role.
    pub fn submit_action(&mut self, action: NightAction) -> Result<(), GameError> {
        let GameState::Night { queue, actions } = &mut self.state else {
            return Err(GameError::InvalidAction);
        };
        let Some(role) = queue.current() else {
            return Err(GameError::InvalidAction);
        };
        if action.role() != role {
            return Err(GameError::NotYourTurn);
        }

        log::debug!("Night {}: {:?}", self.round, action);
        let result = match action {
            NightAction::Kill { target: Some(target) } => actions.kill(&self.roster, target),
            NightAction::Reveal { target: Some(target) } => self.roster.alive(target).map(|player| {
                self.events.push(GameEvent::RoleRevealed {
                    target,
                    name: player.name.clone(),
                    role_label: player.role_label.clone(),
                });
            }),
            NightAction::Protect { target: Some(target) } => {
                actions.protect(&self.roster, self.last_protected, target)
            }
            NightAction::Potions { save, poison } => {
                let saved = save.map_or(Ok(()), |target| actions.save(&mut self.charges, target));
                let poisoned = poison.map_or(Ok(()), |target| {
                    actions.poison(&self.roster, &mut self.charges, target)
                });
                saved.and(poisoned)
            }
            _ => Ok(()),
        };
        if let Err(err) = result {
            log::warn!("{} action partly or wholly ignored: {}", role.to_string(), err);
        }

        if queue.advance().is_some() {
            let state = self.state.clone();
            self.enter(state);
        } else {
            let actions = actions.clone();
            self.finish_night(actions);
        }
        Ok(())
    }

    /// Ends the discussion early and opens the vote.
    pub fn end_discussion(&mut self) -> Result<(), GameError> {
        let GameState::Day { stage: DayStage::Discussion, .. } = &self.state else {
            return Err(GameError::InvalidAction);
        };
        self.enter(GameState::Day {
            stage: DayStage::Voting,
            votes: Votes::new(),
        });
        Ok(())
    }

    /// Called when a player casts their vote; `None` withdraws it.
    pub fn cast_vote(&mut self, voter: PlayerId, target: Option<PlayerId>) -> Result<(), GameError> {
        let GameState::Day { stage: DayStage::Voting, votes } = &mut self.state else {
            return Err(GameError::InvalidAction);
        };
        votes.vote(&self.roster, voter, target)
    }

    /// Called when a player abstains from the vote.
    pub fn skip_vote(&mut self, voter: PlayerId) -> Result<(), GameError> {
        let GameState::Day { stage: DayStage::Voting, votes } = &mut self.state else {
            return Err(GameError::InvalidAction);
        };
        votes.skip(&self.roster, voter)
    }

    /// Closes the vote and carries out its outcome.
    pub fn end_voting(&mut self) -> Result<(), GameError> {
        let GameState::Day { stage: DayStage::Voting, votes } = &self.state else {
            return Err(GameError::InvalidAction);
        };

        let target = match votes.outcome(&mut self.rng) {
            VoteOutcome::NotPassed => {
                log::info!("Day {}: the vote did not pass", self.round);
                self.enter(GameState::Results {
                    message: "The vote did not pass. No one was eliminated.".into(),
                });
                return Ok(());
            }
            VoteOutcome::Eliminate { target } => self.roster.by_id(target)?.clone(),
        };

        // The hunter's own death waits until they have picked who goes with them
        if target.role == Role::Hunter {
            log::info!("Day {}: hunter {} was voted out", self.round, target.name);
            if let Some(shot) = HunterShot::new(vec![target.id], DeathCause::Day) {
                self.enter(GameState::HunterShot(shot));
            }
            return Ok(());
        }

        let message = format!("{} was eliminated by vote.", target.name);
        self.apply_deaths(&[target.id], DeathReason::Vote, message.clone());
        self.enter(GameState::Results { message });
        Ok(())
    }

    /// Called when the hunter picks who to take down with them; `None` spares everyone.
    ///
    /// A target who is dead, unknown or the hunter themself counts as no shot.
    pub fn choose_hunter_target(&mut self, target: Option<PlayerId>) -> Result<(), GameError> {
        let GameState::HunterShot(shot) = &self.state else {
            return Err(GameError::InvalidAction);
        };
        let shot = shot.clone();
        let target = shot.check_target(&self.roster, target).unwrap_or_else(|err| {
            log::warn!("Hunter shot ignored: {}", err);
            None
        });

        let hunter = self.roster.by_id(shot.hunter)?.name.clone();
        let message = match target.map(|id| self.roster.by_id(id)) {
            Some(Ok(victim)) => format!("Hunter {} eliminated {} before dying.", hunter, victim.name),
            _ => format!("Hunter {} eliminated no one before dying.", hunter),
        };

        let mut deaths = vec![shot.hunter];
        deaths.extend(target);
        let killed = self.apply_deaths(&deaths, DeathReason::HunterShot, message);
        if shot.cause == DeathCause::Night {
            self.last_night_deaths.extend(killed.iter().copied());
        }

        // A hunter shot by a hunter gets a shot of their own
        let mut queued = shot.queued.clone();
        queued.extend(
            killed
                .iter()
                .filter(|id| **id != shot.hunter && self.is_role(**id, Role::Hunter)),
        );
        if let Some(next) = HunterShot::new(queued, shot.cause) {
            self.enter(GameState::HunterShot(next));
            return Ok(());
        }

        if self.check_game_over() {
            return Ok(());
        }
        match shot.cause {
            DeathCause::Night => self.start_day(),
            DeathCause::Day => self.next_round(),
        }
        Ok(())
    }

    /// Called when everyone has seen the results of the day.
    pub fn end_results(&mut self) -> Result<(), GameError> {
        let GameState::Results { .. } = &self.state else {
            return Err(GameError::InvalidAction);
        };
        if self.check_game_over() {
            return Ok(());
        }
        self.next_round();
        Ok(())
    }

    /// Called when the timer started for `phase` runs out.
    /// Expiries for a phase that has already ended are ignored.
    pub fn timer_expired(&mut self, phase: PhaseId) -> Result<(), GameError> {
        if phase != self.phase {
            log::debug!("Ignoring stale timer for phase {:?}", phase);
            return Ok(());
        }
        match &self.state {
            GameState::Night { queue, .. } => {
                let Some(action) = queue.current().and_then(NightAction::skip) else {
                    return Err(GameError::InvalidAction);
                };
                log::info!("Night {}: {} ran out of time", self.round, action.role().to_string());
                self.submit_action(action)
            }
            GameState::Day { stage: DayStage::Discussion, .. } => self.end_discussion(),
            GameState::Day { stage: DayStage::Voting, .. } => self.end_voting(),
            GameState::HunterShot(shot) => {
                let target = shot.auto_pick(&self.roster, &mut self.rng);
                log::info!("Hunter ran out of time; picked {:?} at random", target);
                self.choose_hunter_target(target)
            }
            _ => Ok(()),
        }
    }

    /// Returns true if the game is over.
    pub fn game_over(&self) -> bool {
        matches!(self.state, GameState::GameOver(_))
    }

    pub fn winner(&self) -> Option<Winner> {
        match self.state {
            GameState::GameOver(winner) => Some(winner),
            _ => None,
        }
    }

    /// Returns whether a particular player has won.
    pub fn player_has_won(&self, player: PlayerId) -> bool {
        let (Some(winner), Ok(player)) = (self.winner(), self.roster.by_id(player)) else {
            return false;
        };
        match winner {
            Winner::Villagers => player.faction() == Faction::Village,
            Winner::Werewolves => player.faction() == Faction::Werewolves,
        }
    }

    fn start_night(&mut self) {
        self.last_night_deaths.clear();
        let queue = NightQueue::build(&self.roster);
        log::info!("Night {} begins: {:?}", self.round, queue.roles());
        if queue.is_done() {
            self.finish_night(NightActions::default());
            return;
        }
        self.enter(GameState::Night {
            queue,
            actions: NightActions::default(),
        });
    }

    fn finish_night(&mut self, actions: NightActions) {
        let outcome = actions.finalize(&self.roster);
        self.last_protected = actions.protected();

        let names = |ids: &[PlayerId]| {
            ids.iter()
                .filter_map(|id| self.roster.by_id(*id).ok())
                .map(|p| p.name.clone())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut message = match outcome.deaths.len() {
            0 => "No one was eliminated during the night.".to_string(),
            _ => format!("Eliminated during the night: {}.", names(&outcome.deaths)),
        };
        if let Some(saved) = outcome.saved {
            message.push_str(&format!(" {} was protected by the Bodyguard or Witch!", names(&[saved])));
        }

        let killed = self.apply_deaths(&outcome.deaths, DeathReason::Night, message);
        self.last_night_deaths = killed.clone();

        let hunters = killed
            .into_iter()
            .filter(|id| self.is_role(*id, Role::Hunter))
            .collect();
        if let Some(shot) = HunterShot::new(hunters, DeathCause::Night) {
            self.enter(GameState::HunterShot(shot));
            return;
        }

        if self.check_game_over() {
            return;
        }
        self.start_day();
    }

    fn start_day(&mut self) {
        self.enter(GameState::Day {
            stage: DayStage::Discussion,
            votes: Votes::new(),
        });
    }

    fn next_round(&mut self) {
        self.round += 1;
        self.start_night();
    }

    /// Kills the given players and announces it, returning those who were alive until now.
    fn apply_deaths(&mut self, ids: &[PlayerId], reason: DeathReason, message: String) -> Vec<PlayerId> {
        let killed = self.roster.kill(ids);
        log::info!("Round {}: {}", self.round, message);
        self.events.push(GameEvent::Deaths {
            round: self.round,
            reason,
            players: killed
                .iter()
                .filter_map(|id| self.roster.by_id(*id).ok())
                .map(Player::public)
                .collect(),
            message,
        });
        killed
    }

    fn is_role(&self, player: PlayerId, role: Role) -> bool {
        self.roster.by_id(player).map(|p| p.role == role).unwrap_or(false)
    }

    /// Ends the game if either side has won. Villagers are checked first.
    fn check_game_over(&mut self) -> bool {
        let Some(winner) = self.check_winner() else {
            return false;
        };
        log::info!("Game over: {} win", winner.to_string());
        self.enter(GameState::GameOver(winner));
        self.events.push(GameEvent::GameOver {
            winner,
            players: self.roster.players().to_vec(),
        });
        true
    }

    fn check_winner(&self) -> Option<Winner> {
        let count = self.roster.count_alive_by_faction();
        if count.werewolves == 0 {
            Some(Winner::Villagers)
        } else if count.werewolves >= count.others {
            Some(Winner::Werewolves)
        } else {
            None
        }
    }

    /// Moves to a new phase, invalidating any timer started for the previous one.
    fn enter(&mut self, state: GameState) {
        self.state = state;
        self.phase = self.phase.next();
        self.events.push(GameEvent::PhaseEntered {
            phase: self.phase,
            deadline_secs: self.deadline().map(|d| d.as_secs()),
            prompt: self.prompt(),
        });
    }
}
