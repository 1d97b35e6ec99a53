//! Combat scenario tests
//!
//! Tests turn flow, targeting, defeat, and end detection

use crate::harness::{Arena, CharacterBuilder, NO_POISON};
use skirmish::combat::{CombatEnd, CombatError};

/// Test: A fight from first swing to the last goblin falling
#[test]
fn test_player_wins_fight() {
    let hero = CharacterBuilder::player("hero", "Hero")
        .ac(10)
        .attack(5)
        .damage(2)
        .dice("1d4")
        .equip("long_sword")
        .shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").hp(7).ac(12).attack(2).shared();

    let mut arena = Arena::start(hero, vec![gob], &[15, 5]);
    assert_eq!(
        arena.opening,
        "Combat started! Turn order: Hero, Goblin. First up: Hero (hero)."
    );

    arena.script(&[10, 2, NO_POISON]);
    assert_eq!(
        arena.turn("attack"),
        "Hero attacks Goblin. d20(10) + ATK Bonus(6) = 16 vs AC(12). HIT! \
         Deals 1d8(2) + DMG Bonus(3) = 5 damage. Goblin HP: 2/7.\nNext up: Goblin."
    );
    assert_eq!(arena.end(), None);

    arena.script(&[3]);
    let miss = "Goblin attacks Hero. d20(3) + ATK Bonus(2) = 5 vs AC(10). MISS!";
    assert_eq!(arena.turn(""), format!("{miss}\nNext up: Hero."));
    assert_eq!(arena.notices(), [miss]);
    assert_eq!(arena.session.round(), 2);

    arena.script(&[7, 1, NO_POISON]);
    let text = arena.turn("attack");
    assert!(text.contains("Goblin HP: 0/7. Goblin has been defeated!"));

    let end = arena.end().expect("combat over");
    assert_eq!(
        end,
        CombatEnd::NpcsDefeated {
            names: vec!["Goblin".into()]
        }
    );
    assert_eq!(end.to_string(), "All NPCs (Goblin) defeated! Combat ends.");
    assert!(!arena.session.is_in_combat());
    assert_eq!(arena.session.rng().remaining(), 0);
}

/// Test: A player knocked to 0 hp ends combat
#[test]
fn test_player_defeat_ends_combat() {
    let hero = CharacterBuilder::player("hero", "Hero").hp(5).ac(10).shared();
    let orc = CharacterBuilder::npc("orc", "Orc").attack(4).dice("2d6").shared();

    let mut arena = Arena::start(hero, vec![orc], &[1, 20]);
    assert_eq!(arena.current(), Some("orc"));

    arena.script(&[10, 9, NO_POISON]);
    let text = arena.turn("");
    assert!(text.contains("Hero HP: 0/5. Hero has been defeated!"));
    assert_eq!(arena.player_hp(), 0);

    let end = arena.end().expect("combat over");
    assert_eq!(end.to_string(), "Player Hero (hero) has been defeated! Combat ends.");
    assert!(!end.player_won());
    assert_eq!(arena.session.current_turn_id(), None);
}

/// Test: Defeated NPCs lose their turns and stop being default targets
#[test]
fn test_defeated_npc_is_skipped() {
    let hero = CharacterBuilder::player("hero", "Hero").ac(10).attack(10).dice("1d4").shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").hp(3).shared();
    let orc = CharacterBuilder::npc("orc", "Orc").hp(3).shared();

    let mut arena = Arena::start(hero, vec![gob, orc], &[20, 10, 5]);
    assert_eq!(arena.session.turn_order(), ["hero", "gob", "orc"]);

    arena.script(&[10, 4, NO_POISON]);
    let text = arena.turn("attack orc");
    assert!(text.starts_with("Hero attacks Orc."));
    assert!(text.ends_with("Orc has been defeated!\nNext up: Goblin."));

    arena.script(&[1]);
    assert!(arena.turn("").contains("MISS!"));

    assert_eq!(
        arena.turn(""),
        "Orc cannot take further actions this turn.\nNext up: Hero."
    );
    assert_eq!(arena.session.round(), 2);
    assert_eq!(arena.end(), None);

    assert_eq!(
        arena.try_turn("attack orc").unwrap_err(),
        CombatError::TargetDefeated("Orc".into())
    );

    arena.script(&[10, 3, NO_POISON]);
    let text = arena.turn("attack");
    assert!(text.starts_with("Hero attacks Goblin."));
    assert!(arena.end().unwrap().player_won());
}

/// Test: Without a named target the first living NPC in turn order is hit
#[test]
fn test_default_target_follows_turn_order() {
    let hero = CharacterBuilder::player("hero", "Hero").attack(10).shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").shared();
    let orc = CharacterBuilder::npc("orc", "Orc").shared();

    // orc outrolls the goblin, so it comes first among the NPCs
    let mut arena = Arena::start(hero, vec![gob, orc], &[20, 5, 10]);
    assert_eq!(arena.session.turn_order(), ["hero", "orc", "gob"]);

    arena.script(&[10, 1, NO_POISON]);
    assert!(arena.turn("charge!").starts_with("Hero attacks Orc."));
}

/// Test: NPC facing a downed player reports it has no target
#[test]
fn test_npc_without_target() {
    let hero = CharacterBuilder::player("hero", "Hero").shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").shared();
    let mut arena = Arena::start(hero, vec![gob], &[1, 20]);

    arena.player.borrow_mut().take_damage(100);
    assert_eq!(
        arena.turn(""),
        "Goblin sees that Hero is defeated and finds no one else to fight.\nNext up: Hero."
    );
    assert!(arena.notices().is_empty());
}

/// Test: Errors in the player's command leave the session where it was
#[test]
fn test_rejected_commands() {
    let hero = CharacterBuilder::player("hero", "Hero").shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").shared();
    let mut arena = Arena::start(hero, vec![gob], &[20, 1]);

    assert_eq!(
        arena.try_turn("attack dragon").unwrap_err(),
        CombatError::UnknownTarget("dragon".into())
    );
    assert_eq!(
        arena.try_turn("attack Hero").unwrap_err(),
        CombatError::SelfTarget("Hero".into())
    );
    assert_eq!(arena.current(), Some("hero"));
    assert_eq!(arena.turn("pass"), "Hero passes their turn.\nNext up: Goblin.");
}

/// Test: A malformed damage dice string aborts the attack and keeps the turn
#[test]
fn test_malformed_dice_propagates() {
    let hero = CharacterBuilder::player("hero", "Hero").ac(5).shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").dice("0d6").shared();
    let mut arena = Arena::start(hero, vec![gob], &[1, 20]);

    arena.script(&[15]);
    let err = arena.try_turn("").unwrap_err();
    assert_eq!(
        err.to_string(),
        "error parsing damage dice for Goblin: \
         dice notation '0d6' must have a positive count and sides"
    );
    assert_eq!(arena.current(), Some("gob"));
    assert_eq!(arena.player_hp(), 20);
}
