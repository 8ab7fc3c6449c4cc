use thiserror::Error;

/// The result of attempting to perform an invalid operation on a [Game] or [Session].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("role pool holds {roles} roles but {players} players were given")]
    ConfigMismatch { players: usize, roles: usize },
    #[error("at least one player is needed to start a game")]
    TooFewPlayers,
    #[error("no player exists with the given id")]
    PlayerNotFound,
    #[error("this player cannot be chosen for this action")]
    InvalidTarget,
    #[error("this potion has already been used")]
    ChargeAlreadyUsed,
    #[error("it is not this role's turn")]
    NotYourTurn,
    #[error("this action cannot be performed during this phase of the game")]
    InvalidAction,
}
