//! Equipment scenario tests
//!
//! Tests that loadouts feed the numbers used during a fight

use crate::harness::{Arena, CharacterBuilder, NO_POISON};
use skirmish::combat::{effective_armor_class, ItemCatalog, Slot};
use skirmish::Encounter;

/// Test: Swapping in a heavier shield turns a hit into a miss
#[test]
fn test_shield_changes_outcome_mid_fight() {
    let hero = CharacterBuilder::player("hero", "Hero").ac(12).shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").shared();
    let mut arena = Arena::start(hero, vec![gob], &[1, 20]);

    arena.script(&[13, 2, NO_POISON]);
    assert!(arena.turn("").contains("= 13 vs AC(12). HIT!"));
    arena.turn("pass");

    let catalog = ItemCatalog::builtin();
    arena.player.borrow_mut().equip("steel_shield", &catalog).unwrap();
    arena.script(&[13]);
    assert!(arena.turn("").contains("= 13 vs AC(14). MISS!"));

    arena.turn("pass");
    arena.player.borrow_mut().unequip(Slot::Shield);
    arena.script(&[13, 1, NO_POISON]);
    assert!(arena.turn("").contains("vs AC(12). HIT!"));
}

/// Test: An equipped weapon supplies the damage dice and bonuses
#[test]
fn test_weapon_dice_used_in_attack() {
    let hero = CharacterBuilder::player("hero", "Hero")
        .attack(1)
        .dice("1d4")
        .equip("short_sword")
        .shared();
    let gob = CharacterBuilder::npc("gob", "Goblin").ac(5).shared();
    let mut arena = Arena::start(hero, vec![gob], &[20, 1]);

    arena.script(&[4, 6, NO_POISON]);
    let text = arena.turn("attack");
    assert!(text.contains(
        "d20(4) + ATK Bonus(2) = 6 vs AC(5). HIT! Deals 1d6(6) + DMG Bonus(0) = 6 damage."
    ));
    assert_eq!(arena.session.rng().requests()[2..], [(20, 1), (6, 1), (100, 1)]);
}

/// Test: The demo hero wears the full kit from the item catalog
#[test]
fn test_demo_loadout() {
    let catalog = ItemCatalog::builtin();
    let (hero, npcs) = Encounter::demo().build(&catalog).unwrap();
    assert_eq!(effective_armor_class(&hero.borrow(), &catalog), 15);
    // NPCs ignore equipment entirely
    assert_eq!(effective_armor_class(&npcs[0].borrow(), &catalog), 14);
}
