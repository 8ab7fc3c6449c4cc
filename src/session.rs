use crate::error::GameError;
use crate::game::{Game, GameOptions, PhaseId, PlayerId};
use crate::time::{countdown, iso8601};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::SystemTime;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// What the setup screen hands over to start a game.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Setup {
    pub players: Vec<String>,
    #[serde(default)]
    pub options: GameOptions,
}

/// A single game session on this device.
pub struct Session {
    /// The game itself.
    game: Game,
    /// Channel for sending game updates to the display.
    updates: mpsc::UnboundedSender<Value>,
    /// Timestamp that the game was created.
    started_ts: SystemTime,
    /// The current phase and the moment it will resolve on its own.
    deadline: Option<(PhaseId, Instant)>,
    /// Whether the final summary has been sent.
    summarised: bool,
}

impl Session {
    /// Starts a new game. Fails if the role pool does not match the players.
    pub fn new(setup: Setup, seed: u64, updates: mpsc::UnboundedSender<Value>) -> Result<Self, GameError> {
        let game = Game::new(setup.options, &setup.players, seed)?;
        log::info!("Started a game with {} players", game.players().len());
        let mut session = Self {
            game,
            updates,
            started_ts: SystemTime::now(),
            deadline: None,
            summarised: false,
        };
        session.notify();
        Ok(session)
    }

    /// Performs an action on the game.
    pub fn mutate_game<F>(&mut self, mutation: F) -> Result<(), GameError>
    where
        F: FnOnce(&mut Game) -> Result<(), GameError>,
    {
        let result = mutation(&mut self.game);
        // Rejected input can still have produced events, such as a night turn treated as a skip
        self.notify();
        result
    }

    /// Called when the current phase's timer runs out.
    pub fn expire(&mut self, phase: PhaseId) -> Result<(), GameError> {
        self.mutate_game(|game| game.timer_expired(phase))
    }

    /// The phase currently waiting on a timer, and when it runs out.
    pub fn deadline(&self) -> Option<(PhaseId, Instant)> {
        self.deadline
    }

    /// The full state of the current phase, for a display that has just connected.
    pub fn state(&self) -> Value {
        json!({
            "type": "state",
            "phase": self.game.phase(),
            "round": self.game.round(),
            "remaining": self.deadline.map(|(_, at)| countdown(at.saturating_duration_since(Instant::now()))),
            "prompt": self.game.prompt(),
            "charges": self.game.witch_charges(),
        })
    }

    /// A player's role card, for the role assignment screen.
    pub fn role_card(&self, player: PlayerId) -> Result<Value, GameError> {
        let card = self.game.role_card(player)?;
        Ok(json!({
            "type": "role",
            "card": card,
        }))
    }

    /// Sends a message straight to the display.
    pub fn send(&self, message: Value) {
        self.updates.send(message).ok();
    }

    pub fn game_over(&self) -> bool {
        self.game.game_over()
    }

    /// Sends the game's new events to the display, and restarts the timer if the phase changed.
    fn notify(&mut self) {
        for event in self.game.take_events() {
            match serde_json::to_value(&event) {
                Ok(value) => {
                    self.updates.send(value).ok();
                }
                Err(err) => log::error!("Could not serialise event: {}", err),
            }
        }

        let phase = self.game.phase();
        if self.deadline.map(|(current, _)| current) != Some(phase) {
            self.deadline = self
                .game
                .deadline()
                .map(|duration| (phase, Instant::now() + duration));
            if let Some(duration) = self.game.deadline() {
                log::debug!("Phase {:?} times out in {}", phase, countdown(duration));
            }
        }

        self.summarise();
    }

    /// Sends a summary of the game once it is over.
    fn summarise(&mut self) {
        if !self.game.game_over() || self.summarised {
            return;
        }
        let summary = json!({
            "type": "summary",
            "players": self.game.player_names().collect::<Value>(),
            "rounds": self.game.round(),
            "started": iso8601(self.started_ts),
            "finished": iso8601(SystemTime::now()),
            "winner": self.game.winner().map(|w| w.to_string()),
            "winners": self
                .game
                .players()
                .iter()
                .filter(|p| self.game.player_has_won(p.id))
                .map(|p| p.id)
                .collect::<Vec<_>>(),
        });
        self.updates.send(summary).ok();
        self.summarised = true;
    }
}
