//! Initiative scenario tests

use crate::harness::{Arena, CharacterBuilder};
use skirmish::combat::{determine_initiative, roll_initiative, ScriptedRoller};

/// Test: Bonuses can reorder raw rolls
#[test]
fn test_bonus_reorders_rolls() {
    let party = [
        CharacterBuilder::npc("first", "First").initiative(2).build(),
        CharacterBuilder::npc("second", "Second").initiative(5).build(),
        CharacterBuilder::npc("third", "Third").build(),
    ];
    let mut rng = ScriptedRoller::new([10, 5, 15]);

    let rolls = roll_initiative(&party, &mut rng);
    let scores: Vec<i32> = rolls.iter().map(|r| r.score).collect();
    assert_eq!(scores, [15, 12, 10]);

    let mut rng = ScriptedRoller::new([10, 5, 15]);
    assert_eq!(
        determine_initiative(&party, &mut rng),
        ["third", "first", "second"]
    );
}

/// Test: The session announces and follows the rolled order
#[test]
fn test_session_turn_order() {
    let hero = CharacterBuilder::player("hero", "Hero").initiative(2).shared();
    let orc = CharacterBuilder::npc("orc", "Orc").initiative(5).shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").shared();

    let mut arena = Arena::start(hero, vec![orc, gob], &[10, 5, 15]);
    assert_eq!(
        arena.opening,
        "Combat started! Turn order: Goblin, Hero, Orc. First up: Goblin (gob)."
    );
    assert_eq!(arena.session.turn_order(), ["gob", "hero", "orc"]);

    // order is fixed for the whole fight
    arena.player.borrow_mut().take_damage(100);
    for expected in ["hero", "orc", "gob", "hero"] {
        arena.turn("");
        assert_eq!(arena.current(), Some(expected));
    }
    assert_eq!(arena.session.round(), 2);
}

/// Test: The player wins a tie by being listed first
#[test]
fn test_tie_goes_to_first_listed() {
    let hero = CharacterBuilder::player("hero", "Hero").shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").shared();
    let orc = CharacterBuilder::npc("orc", "Orc").shared();

    let arena = Arena::start(hero, vec![gob, orc], &[8, 8, 8]);
    assert_eq!(arena.session.turn_order(), ["hero", "gob", "orc"]);
}
