//! Night actions and how they resolve into the night's deaths.

use super::super::night::{NightActions, WitchCharges};
use super::super::player::Role;
use super::super::queue::NightQueue;
use super::super::roster::Roster;
use super::super::{GameEvent, GameState, NightAction};
use super::test_utils::*;
use crate::error::GameError;

#[test]
fn test_queue_follows_fixed_order_and_living_holders() {
    let roster = Roster::with_roles(&[
        ("Alex", Role::Witch),
        ("Bob", Role::Villager),
        ("Charlie", Role::Werewolf),
        ("David", Role::Hunter),
    ]);
    let mut queue = NightQueue::build(&roster);
    assert_eq!(queue.roles(), &[Role::Werewolf, Role::Witch]);
    assert_eq!(queue.current(), Some(Role::Werewolf));
    assert_eq!(queue.advance(), Some(Role::Witch));
    assert_eq!(queue.advance(), None);
    assert_eq!(queue.advance(), None);
    assert!(queue.is_done());
}

#[test]
fn test_queue_skips_dead_holders() {
    let mut roster = Roster::with_roles(&[
        ("Alex", Role::Werewolf),
        ("Bob", Role::Seer),
        ("Charlie", Role::Bodyguard),
        ("David", Role::Villager),
    ]);
    roster.kill(&[2]);
    assert_eq!(NightQueue::build(&roster).roles(), &[Role::Werewolf, Role::Bodyguard]);
}

#[test]
fn test_queue_can_be_empty() {
    let roster = Roster::with_roles(&[("Alex", Role::Hunter), ("Bob", Role::Villager)]);
    let queue = NightQueue::build(&roster);
    assert!(queue.roles().is_empty());
    assert!(queue.is_done());
    assert!(NightActions::default().finalize(&roster).deaths.is_empty());
}

#[test]
fn test_werewolf_kill_lands_at_dawn() {
    let mut game = start_game_with_roles(&standard_roles(), 0);
    assert_eq!(current_role(&game), Some(Role::Werewolf));

    game.submit_action(NightAction::Kill { target: Some(5) }).unwrap();
    assert!(is_alive(&game, 5), "deaths wait for the end of the night");

    skip_rest_of_night(&mut game);
    assert!(!is_alive(&game, 5));
    assert!(matches!(game.state, GameState::Day { .. }));
    assert_eq!(game.last_night_deaths, vec![5]);
}

#[test]
fn test_werewolves_cannot_target_each_other() {
    let mut game = start_game_with_roles(
        &[Role::Werewolf, Role::Werewolf, Role::Villager, Role::Villager, Role::Villager],
        0,
    );
    game.submit_action(NightAction::Kill { target: Some(2) }).unwrap();
    assert!(game.players().iter().all(|p| p.alive));
    assert!(matches!(game.state, GameState::Day { .. }));
}

#[test]
fn test_bodyguard_protection_cancels_kill() {
    let mut game = start_game_with_roles(&standard_roles(), 0);
    game.submit_action(NightAction::Kill { target: Some(5) }).unwrap();
    game.submit_action(NightAction::Reveal { target: None }).unwrap();
    game.submit_action(NightAction::Protect { target: Some(5) }).unwrap();
    game.submit_action(NightAction::Potions { save: None, poison: None }).unwrap();

    assert!(is_alive(&game, 5));
    assert_eq!(announced_deaths(&mut game), vec![Vec::<usize>::new()]);
}

#[test]
fn test_bodyguard_may_protect_themself() {
    let mut game = start_game_with_roles(&standard_roles(), 0);
    let bodyguard = id_of(&game, Role::Bodyguard);
    game.submit_action(NightAction::Kill { target: Some(bodyguard) }).unwrap();
    game.submit_action(NightAction::Reveal { target: None }).unwrap();
    game.submit_action(NightAction::Protect { target: Some(bodyguard) }).unwrap();
    game.submit_action(NightAction::Potions { save: None, poison: None }).unwrap();
    assert!(is_alive(&game, bodyguard));
}

#[test]
fn test_bodyguard_cannot_repeat_last_rounds_target() {
    let mut game = start_game_with_roles(&standard_roles(), 0);

    // Round 1: protect Ed, nobody dies
    game.submit_action(NightAction::Kill { target: None }).unwrap();
    game.submit_action(NightAction::Reveal { target: None }).unwrap();
    game.submit_action(NightAction::Protect { target: Some(5) }).unwrap();
    game.submit_action(NightAction::Potions { save: None, poison: None }).unwrap();
    open_vote(&mut game);
    game.end_voting().unwrap();
    game.end_results().unwrap();
    assert_eq!(game.round(), 2);

    // Round 2: protecting Ed again is rejected and counts as no protection
    game.submit_action(NightAction::Kill { target: Some(5) }).unwrap();
    game.submit_action(NightAction::Reveal { target: None }).unwrap();
    game.take_events();
    game.submit_action(NightAction::Protect { target: Some(5) }).unwrap();
    game.submit_action(NightAction::Potions { save: None, poison: None }).unwrap();
    assert!(!is_alive(&game, 5));
}

#[test]
fn test_bodyguard_prompt_shows_forbidden_target() {
    let mut game = start_game_with_roles(&standard_roles(), 0);
    game.last_protected = Some(4);
    game.submit_action(NightAction::Kill { target: None }).unwrap();
    game.submit_action(NightAction::Reveal { target: None }).unwrap();
    assert_eq!(current_role(&game), Some(Role::Bodyguard));
    match game.prompt() {
        crate::game::Prompt::NightTurn { role, forbidden, charges, .. } => {
            assert_eq!(role, Role::Bodyguard);
            assert_eq!(forbidden, Some(4));
            assert_eq!(charges, None);
        }
        other => panic!("unexpected prompt {:?}", other),
    }
}

#[test]
fn test_skipped_protection_lifts_the_restriction() {
    let mut game = start_game_with_roles(&standard_roles(), 0);
    game.last_protected = Some(5);
    skip_rest_of_night(&mut game);
    assert_eq!(game.last_protected, None);
}

#[test]
fn test_dead_bodyguard_does_not_protect() {
    let mut roster = Roster::with_roles(&[
        ("Alex", Role::Werewolf),
        ("Bob", Role::Bodyguard),
        ("Charlie", Role::Villager),
        ("David", Role::Villager),
    ]);
    let mut actions = NightActions::default();
    actions.kill(&roster, 3).unwrap();
    actions.protect(&roster, None, 3).unwrap();
    assert_eq!(actions.finalize(&roster).deaths, Vec::<usize>::new());

    roster.kill(&[2]);
    let outcome = actions.finalize(&roster);
    assert_eq!(outcome.deaths, vec![3]);
    assert_eq!(outcome.saved, None);
}

#[test]
fn test_dead_witch_does_not_save() {
    let mut roster = Roster::with_roles(&[
        ("Alex", Role::Werewolf),
        ("Bob", Role::Witch),
        ("Charlie", Role::Villager),
        ("David", Role::Villager),
    ]);
    let mut charges = WitchCharges::default();
    let mut actions = NightActions::default();
    actions.kill(&roster, 3).unwrap();
    actions.save(&mut charges, 3).unwrap();
    assert_eq!(actions.pending_victim(), None);
    assert_eq!(actions.finalize(&roster).saved, Some(3));

    roster.kill(&[2]);
    assert_eq!(actions.finalize(&roster).deaths, vec![3]);
}

#[test]
fn test_protection_is_order_independent() {
    let roster = Roster::with_roles(&[
        ("Alex", Role::Werewolf),
        ("Bob", Role::Bodyguard),
        ("Charlie", Role::Villager),
        ("David", Role::Villager),
    ]);
    let mut actions = NightActions::default();
    actions.protect(&roster, None, 3).unwrap();
    actions.kill(&roster, 3).unwrap();
    assert!(actions.finalize(&roster).deaths.is_empty());
}

#[test]
fn test_witch_save_cancels_kill() {
    let mut game = start_game_with_roles(&standard_roles(), 0);
    game.submit_action(NightAction::Kill { target: Some(6) }).unwrap();
    game.submit_action(NightAction::Reveal { target: None }).unwrap();
    game.submit_action(NightAction::Protect { target: None }).unwrap();

    match game.prompt() {
        crate::game::Prompt::NightTurn { victim, charges, .. } => {
            assert_eq!(victim, Some(6));
            assert_eq!(charges, Some(WitchCharges { save: true, poison: true }));
        }
        other => panic!("unexpected prompt {:?}", other),
    }

    game.submit_action(NightAction::Potions { save: Some(6), poison: None }).unwrap();
    assert!(is_alive(&game, 6));
    assert_eq!(game.witch_charges(), WitchCharges { save: false, poison: true });
}

#[test]
fn test_witch_can_save_and_poison_in_one_night() {
    let mut game = start_game_with_roles(&standard_roles(), 0);
    game.submit_action(NightAction::Kill { target: Some(6) }).unwrap();
    game.submit_action(NightAction::Reveal { target: None }).unwrap();
    game.submit_action(NightAction::Protect { target: None }).unwrap();
    game.submit_action(NightAction::Potions { save: Some(6), poison: Some(5) }).unwrap();

    assert!(is_alive(&game, 6));
    assert!(!is_alive(&game, 5));
    assert_eq!(game.witch_charges(), WitchCharges { save: false, poison: false });
}

#[test]
fn test_saving_someone_else_keeps_the_potion() {
    let roster = Roster::with_roles(&[
        ("Alex", Role::Werewolf),
        ("Bob", Role::Witch),
        ("Charlie", Role::Villager),
    ]);
    let mut charges = WitchCharges::default();
    let mut actions = NightActions::default();
    actions.kill(&roster, 3).unwrap();
    assert_eq!(actions.save(&mut charges, 2), Err(GameError::InvalidTarget));
    assert!(charges.save);
}

/// Each potion works once; later uses across further nights change nothing.
#[test]
fn test_witch_charges_last_one_game() {
    let mut game = start_game_with_roles(
        &[
            Role::Werewolf,
            Role::Witch,
            Role::Villager,
            Role::Villager,
            Role::Villager,
            Role::Villager,
            Role::Villager,
        ],
        0,
    );

    // Night 1: save Charlie from the wolves
    game.submit_action(NightAction::Kill { target: Some(3) }).unwrap();
    game.submit_action(NightAction::Potions { save: Some(3), poison: None }).unwrap();
    assert!(is_alive(&game, 3));

    // Night 2: the save is spent, so the wolves' kill lands
    open_vote(&mut game);
    game.end_voting().unwrap();
    game.end_results().unwrap();
    game.submit_action(NightAction::Kill { target: Some(3) }).unwrap();
    game.submit_action(NightAction::Potions { save: Some(3), poison: Some(4) }).unwrap();
    assert!(!is_alive(&game, 3));
    assert!(!is_alive(&game, 4), "the poison was still unused");

    // Night 3: both potions are gone
    open_vote(&mut game);
    game.end_voting().unwrap();
    game.end_results().unwrap();
    game.submit_action(NightAction::Kill { target: None }).unwrap();
    game.submit_action(NightAction::Potions { save: None, poison: Some(5) }).unwrap();
    assert!(is_alive(&game, 5));
    assert_eq!(game.witch_charges(), WitchCharges { save: false, poison: false });
}

#[test]
fn test_poison_and_kill_on_same_player_is_one_death() {
    let mut game = start_game_with_roles(&standard_roles(), 0);
    game.submit_action(NightAction::Kill { target: Some(6) }).unwrap();
    game.submit_action(NightAction::Reveal { target: None }).unwrap();
    game.submit_action(NightAction::Protect { target: None }).unwrap();
    game.take_events();
    game.submit_action(NightAction::Potions { save: None, poison: Some(6) }).unwrap();
    assert_eq!(announced_deaths(&mut game), vec![vec![6]]);
}

#[test]
fn test_seer_sees_a_role() {
    let mut game = start_game_with_roles(&standard_roles(), 0);
    game.submit_action(NightAction::Kill { target: None }).unwrap();
    game.take_events();
    game.submit_action(NightAction::Reveal { target: Some(1) }).unwrap();

    let reveal = game.take_events().into_iter().find_map(|event| match event {
        GameEvent::RoleRevealed { target, role_label, .. } => Some((target, role_label)),
        _ => None,
    });
    assert_eq!(reveal, Some((1, "Werewolf".to_string())));
    assert_eq!(current_role(&game), Some(Role::Bodyguard));
}

#[test]
fn test_seer_may_skip() {
    let mut game = start_game_with_roles(&standard_roles(), 0);
    game.submit_action(NightAction::Kill { target: None }).unwrap();
    game.submit_action(NightAction::Reveal { target: None }).unwrap();
    assert_eq!(current_role(&game), Some(Role::Bodyguard));
}

#[test]
fn test_only_current_role_may_act() {
    let mut game = start_game_with_roles(&standard_roles(), 0);
    assert_eq!(
        game.submit_action(NightAction::Reveal { target: Some(1) }),
        Err(GameError::NotYourTurn)
    );
    assert_eq!(current_role(&game), Some(Role::Werewolf));
}

#[test]
fn test_timer_skips_current_role() {
    let mut game = start_game_with_roles(&standard_roles(), 0);
    let phase = game.phase();
    game.timer_expired(phase).unwrap();
    assert_eq!(current_role(&game), Some(Role::Seer));

    // The werewolves' timer has already fired; firing it again does nothing
    game.timer_expired(phase).unwrap();
    assert_eq!(current_role(&game), Some(Role::Seer));
}

#[test]
fn test_each_role_gets_its_own_phase() {
    let mut game = start_game_with_roles(&standard_roles(), 0);
    let first = game.phase();
    game.submit_action(NightAction::Kill { target: None }).unwrap();
    assert!(game.phase() > first);
    assert_eq!(game.deadline(), Some(game.opts.night_time()));
}
