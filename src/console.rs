use crate::{
    error::GameError,
    game::{NightAction, PhaseId, PlayerId, Role},
    session::Session,
};
use futures_util::{select, FutureExt};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::Instant;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("violation of the request format")]
    ProtocolError,
    #[error("{0}")]
    GameError(#[from] GameError),
}

/// Reads requests line by line and feeds them to the session until the game ends or input closes.
///
/// Each read races the current phase's deadline; whichever comes first is handled,
/// and the other is dropped.
pub async fn run_console<R>(mut session: Session, input: R)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    while !session.game_over() {
        let deadline = session.deadline();
        select! {
            line = lines.next_line().fuse() => {
                let Ok(Some(line)) = line else {
                    log::info!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let result = serde_json::from_str::<Value>(&line)
                    .map_err(|_| ConsoleError::ProtocolError)
                    .and_then(|req| parse_request(&req));
                let reply = match result {
                    Ok(req) => process_request(req, &mut session),
                    Err(err) => {
                        log::warn!("Invalid request received: {}", &line);
                        Err(err)
                    }
                };
                if let Err(err) = reply {
                    session.send(json!({
                        "type": "error",
                        "error": err.to_string()
                    }));
                }
            },
            phase = wait_until(deadline).fuse() => {
                if let Err(err) = session.expire(phase) {
                    log::error!("Timer for phase {:?} could not be applied: {}", phase, err);
                }
            }
        }
    }
}

/// Resolves with the phase id once its deadline passes, or never if the phase is untimed.
async fn wait_until(deadline: Option<(PhaseId, Instant)>) -> PhaseId {
    match deadline {
        Some((phase, at)) => {
            tokio::time::sleep_until(at).await;
            phase
        }
        None => std::future::pending().await,
    }
}

/// A line of input from the person running the game.
#[derive(Debug, PartialEq, Eq)]
enum Request {
    GetState,
    GetRole { player: PlayerId },
    ConfirmRole { player: PlayerId },
    NightAction(NightAction),
    EndDiscussion,
    Vote { voter: PlayerId, target: Option<PlayerId> },
    SkipVote { voter: PlayerId },
    EndVoting,
    HunterShot { target: Option<PlayerId> },
    NextRound,
}

/// Parses a request, such as `{"type": "vote", "voter": 1, "target": 3}`.
fn parse_request(req: &Value) -> Result<Request, ConsoleError> {
    match req["type"].as_str().unwrap_or("") {
        "get_state" => Ok(Request::GetState),
        "get_role" => Ok(Request::GetRole {
            player: player_field(req, "player")?,
        }),
        "confirm_role" => Ok(Request::ConfirmRole {
            player: player_field(req, "player")?,
        }),
        "night_action" => parse_night_action(req).map(Request::NightAction),
        "end_discussion" => Ok(Request::EndDiscussion),
        "vote" => Ok(Request::Vote {
            voter: player_field(req, "voter")?,
            target: optional_player_field(req, "target")?,
        }),
        "skip_vote" => Ok(Request::SkipVote {
            voter: player_field(req, "voter")?,
        }),
        "end_voting" => Ok(Request::EndVoting),
        "hunter_shot" => Ok(Request::HunterShot {
            target: optional_player_field(req, "target")?,
        }),
        "next_round" => Ok(Request::NextRound),
        _ => Err(ConsoleError::ProtocolError),
    }
}

/// Parses a night action. The witch may send `save` and `poison` targets together,
/// or a single potion as `{"action": "poison", "target": 2}`.
fn parse_night_action(req: &Value) -> Result<NightAction, ConsoleError> {
    let role = req["role"]
        .as_str()
        .and_then(Role::from_key)
        .ok_or(ConsoleError::ProtocolError)?;
    let target = optional_player_field(req, "target")?;
    match role {
        Role::Werewolf => Ok(NightAction::Kill { target }),
        Role::Seer => Ok(NightAction::Reveal { target }),
        Role::Bodyguard => Ok(NightAction::Protect { target }),
        Role::Witch => match req["action"].as_str() {
            Some("save") => Ok(NightAction::Potions { save: target, poison: None }),
            Some("poison") => Ok(NightAction::Potions { save: None, poison: target }),
            Some("skip") => Ok(NightAction::Potions { save: None, poison: None }),
            Some(_) => Err(ConsoleError::ProtocolError),
            None => Ok(NightAction::Potions {
                save: optional_player_field(req, "save")?,
                poison: optional_player_field(req, "poison")?,
            }),
        },
        Role::Hunter | Role::Villager => Err(ConsoleError::GameError(GameError::NotYourTurn)),
    }
}

fn player_field(req: &Value, key: &str) -> Result<PlayerId, ConsoleError> {
    optional_player_field(req, key)?.ok_or(ConsoleError::ProtocolError)
}

fn optional_player_field(req: &Value, key: &str) -> Result<Option<PlayerId>, ConsoleError> {
    match &req[key] {
        Value::Null => Ok(None),
        value => value
            .as_u64()
            .map(|id| Some(id as PlayerId))
            .ok_or(ConsoleError::ProtocolError),
    }
}

/// Processes a request against the session.
fn process_request(req: Request, session: &mut Session) -> Result<(), ConsoleError> {
    match req {
        Request::GetState => {
            let state = session.state();
            session.send(state);
            return Ok(());
        }
        Request::GetRole { player } => {
            let card = session.role_card(player)?;
            session.send(card);
            return Ok(());
        }
        Request::ConfirmRole { player } => session.mutate_game(|game| game.confirm_role(player))?,
        Request::NightAction(action) => session.mutate_game(|game| game.submit_action(action))?,
        Request::EndDiscussion => session.mutate_game(|game| game.end_discussion())?,
        Request::Vote { voter, target } => session.mutate_game(|game| game.cast_vote(voter, target))?,
        Request::SkipVote { voter } => session.mutate_game(|game| game.skip_vote(voter))?,
        Request::EndVoting => session.mutate_game(|game| game.end_voting())?,
        Request::HunterShot { target } => session.mutate_game(|game| game.choose_hunter_target(target))?,
        Request::NextRound => session.mutate_game(|game| game.end_results())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_votes_and_skips() {
        let req = json!({ "type": "vote", "voter": 1, "target": 3 });
        assert_eq!(parse_request(&req).unwrap(), Request::Vote { voter: 1, target: Some(3) });

        let req = json!({ "type": "vote", "voter": 1, "target": null });
        assert_eq!(parse_request(&req).unwrap(), Request::Vote { voter: 1, target: None });

        let req = json!({ "type": "skip_vote", "voter": 2 });
        assert_eq!(parse_request(&req).unwrap(), Request::SkipVote { voter: 2 });

        let req = json!({ "type": "get_role", "player": 4 });
        assert_eq!(parse_request(&req).unwrap(), Request::GetRole { player: 4 });
    }

    #[test]
    fn parses_witch_potions() {
        let req = json!({ "type": "night_action", "role": "witch", "save": 2, "poison": 4 });
        assert_eq!(
            parse_request(&req).unwrap(),
            Request::NightAction(NightAction::Potions { save: Some(2), poison: Some(4) })
        );

        let req = json!({ "type": "night_action", "role": "witch", "action": "poison", "target": 3 });
        assert_eq!(
            parse_request(&req).unwrap(),
            Request::NightAction(NightAction::Potions { save: None, poison: Some(3) })
        );
    }

    #[test]
    fn rejects_malformed_requests() {
        assert!(parse_request(&json!({ "type": "dance" })).is_err());
        assert!(parse_request(&json!({ "type": "confirm_role" })).is_err());
        assert!(parse_request(&json!({ "type": "vote", "voter": "bob" })).is_err());
        assert!(parse_request(&json!({ "type": "night_action", "role": "hunter" })).is_err());
    }
}
