//! Spell scenario tests
//!
//! Tests casting from the turn prompt and running out of slots

use crate::harness::{Arena, CharacterBuilder};
use skirmish::combat::{Ability, CastError, CombatError, SeededRoller};

/// Test: A heal lands on the caster and uses up the only slot
#[test]
fn test_heal_until_out_of_slots() {
    let hero = CharacterBuilder::player("hero", "Hero")
        .ac(10)
        .spell_slots(1, 1)
        .shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").shared();
    let mut arena = Arena::start(hero, vec![gob], &[20, 1]);
    arena.player.borrow_mut().take_damage(10);

    arena.script(&[3]);
    assert_eq!(
        arena.turn("cast cure light wounds"),
        "Hero casts 'Cure Light Wounds' on Hero, consuming a level 1 slot. \
         Healed 3 HP. (1d4(3) + WIS(0) = 3)\nNext up: Goblin."
    );
    assert_eq!(arena.player_hp(), 13);

    arena.script(&[1]);
    arena.turn("");

    let no_slots = CombatError::Cast(CastError::NoSlots {
        caster: "Hero".into(),
        level: 1,
    });
    assert_eq!(arena.try_turn("cast cure light wounds").unwrap_err(), no_slots);
    assert_eq!(arena.try_turn("cast fire bolt on goblin").unwrap_err(), no_slots);
    assert_eq!(arena.current(), Some("hero"));
    assert_eq!(arena.session.rng().remaining(), 0);
}

/// Test: A wise cleric heals more, and skill checks read the same scores
#[test]
fn test_wisdom_boosts_heal_and_checks() {
    let hero = CharacterBuilder::player("hero", "Hero")
        .spell_slots(1, 1)
        .ability(Ability::Wisdom, 16)
        .proficient("medicine")
        .shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").shared();
    let mut arena = Arena::start(hero, vec![gob], &[20, 1]);
    arena.player.borrow_mut().take_damage(10);

    arena.script(&[2]);
    let text = arena.turn("cast cure light wounds");
    assert!(text.contains("Healed 5 HP. (1d4(2) + WIS(3) = 5)"));
    assert_eq!(arena.player_hp(), 15);

    let mut rng = SeededRoller::new(3);
    let check = arena.player.borrow().skill_check("Medicine", 26, &mut rng);
    assert_eq!(check.ability_modifier, 3);
    assert_eq!(check.proficiency_bonus, 2);
    assert_eq!(check.total, check.roll as i32 + 5);
    assert!(!check.success);
}

/// Test: Healing at full health restores nothing but still costs a slot
#[test]
fn test_heal_at_full_health() {
    let hero = CharacterBuilder::player("hero", "Hero").spell_slots(1, 2).shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").shared();
    let mut arena = Arena::start(hero, vec![gob], &[20, 1]);

    arena.script(&[4]);
    let text = arena.turn("cast Cure Light Wounds");
    assert!(text.contains("Healed 0 HP. (1d4(4) + WIS(0) = 4)"));
    assert_eq!(arena.player_hp(), 20);
    assert_eq!(
        arena.player.borrow().player_data().unwrap().spell_slots.available(1),
        1
    );
}

/// Test: Fire Bolt finishes a wounded goblin and ends the fight
#[test]
fn test_fire_bolt_finishes_goblin() {
    let hero = CharacterBuilder::player("hero", "Hero").spell_slots(1, 1).shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").hp(5).shared();
    let mut arena = Arena::start(hero, vec![gob], &[20, 1]);

    assert_eq!(
        arena.try_turn("cast fire bolt").unwrap_err(),
        CombatError::Cast(CastError::TargetRequired("Fire Bolt".into()))
    );

    arena.script(&[6]);
    let text = arena.turn("cast fire bolt on Goblin");
    assert!(text.starts_with(
        "Hero casts 'Fire Bolt' on Goblin, consuming a level 1 slot. Dealt 5 HP. (1d6(6) = 6) \
         Goblin has been defeated!"
    ));
    assert_eq!(arena.npc_hp(0), 0);
    assert!(arena.end().unwrap().player_won());
}
