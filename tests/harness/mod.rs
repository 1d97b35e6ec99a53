//! Integration Test Harness
//!
//! Shared fixtures for combat tests:
//! - `CharacterBuilder` - Terse player/NPC construction
//! - `Arena` - A started session with scripted dice and a recording notifier
//!
//! # Example
//!
//! ```rust,ignore
//! use harness::{Arena, CharacterBuilder};
//!
//! #[test]
//! fn test_goblin_swings() {
//!     let hero = CharacterBuilder::player("hero", "Hero").shared();
//!     let gob = CharacterBuilder::npc("gob", "Goblin").attack(2).shared();
//!
//!     // hero rolls 1 for initiative, the goblin 20
//!     let mut arena = Arena::start(hero, vec![gob], &[1, 20]);
//!     arena.script(&[12, 3, 100]);
//!     let text = arena.turn("");
//!     assert!(text.starts_with("Goblin attacks Hero."));
//! }
//! ```

mod roster;

pub use arena::Arena;
pub use roster::CharacterBuilder;

/// A percentage roll that never triggers poison
#[allow(dead_code)]
pub const NO_POISON: u32 = 100;
