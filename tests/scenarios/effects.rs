//! Status effect scenario tests
//!
//! Tests poison landing from attacks and ticking on later turns

use crate::harness::{Arena, CharacterBuilder, NO_POISON};
use skirmish::combat::POISON;

/// Test: Poison from a hit ticks at the start of the victim's turns
#[test]
fn test_poison_from_hit_ticks_each_turn() {
    let hero = CharacterBuilder::player("hero", "Hero").ac(10).shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").attack(2).shared();
    let mut arena = Arena::start(hero, vec![gob], &[1, 20]);

    arena.script(&[15, 1, 5]);
    let text = arena.turn("");
    assert!(text.ends_with("Hero HP: 19/20. Hero has been poisoned!\nNext up: Hero."));
    assert_eq!(arena.notices().len(), 1);

    assert_eq!(arena.turn("pass"), "Hero passes their turn.\nNext up: Goblin.");
    assert_eq!(arena.notices(), ["Hero took 2 damage from poison."]);
    assert_eq!(arena.player_hp(), 17);
    assert_eq!(
        arena.player.borrow().status_effects().get(POISON).unwrap().duration,
        2
    );
}

/// Test: A second poisoning refreshes rather than stacks
#[test]
fn test_repoison_refreshes() {
    let hero = CharacterBuilder::player("hero", "Hero").ac(10).shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").attack(5).shared();
    let mut arena = Arena::start(hero, vec![gob], &[1, 20]);

    arena.script(&[15, 1, 1]);
    arena.turn("");
    arena.turn("pass");
    arena.script(&[15, 1, 1]);
    arena.turn("");

    let hero = arena.player.borrow();
    assert_eq!(hero.status_effects().len(), 1);
    assert_eq!(hero.status_effects().get(POISON).unwrap().duration, 3);
}

/// Test: Poison runs out after its duration
#[test]
fn test_poison_expires() {
    let hero = CharacterBuilder::player("hero", "Hero").shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").shared();
    let mut arena = Arena::start(hero, vec![gob], &[20, 1]);
    arena.player.borrow_mut().add_status_effect(POISON, 2, 1);

    arena.turn("pass");
    assert_eq!(arena.notices(), ["Hero took 1 damage from poison."]);

    // every swing lands against AC 0
    arena.script(&[1, 1, NO_POISON]);
    arena.turn("");
    arena.notices();

    arena.turn("pass");
    assert_eq!(
        arena.notices(),
        ["Hero took 1 damage from poison.", "Hero is no longer poison."]
    );
    assert!(arena.player.borrow().status_effects().is_empty());
    assert_eq!(arena.player_hp(), 17);
}

/// Test: An NPC killed by poison loses its action and the fight can end
#[test]
fn test_poison_kills_npc_before_it_acts() {
    let hero = CharacterBuilder::player("hero", "Hero").shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").hp(2).shared();
    let mut arena = Arena::start(hero, vec![gob], &[1, 20]);
    arena.npcs[0].borrow_mut().add_status_effect(POISON, 3, 2);

    assert_eq!(
        arena.turn(""),
        "Goblin cannot take further actions this turn.\nNext up: Hero."
    );
    assert_eq!(
        arena.notices(),
        ["Goblin took 2 damage from poison.", "Goblin succumbed to poison."]
    );
    assert_eq!(arena.npcs[0].borrow().status_effects().get(POISON).unwrap().duration, 3);
    assert_eq!(arena.player_hp(), 20);
    assert!(arena.end().unwrap().player_won());
}
