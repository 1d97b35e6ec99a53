//! Scenario Tests for skirmish
//!
//! Whole-turn play scenarios covering:
//! - Combat: turn flow, targeting, and end conditions
//! - Effects: poison ticking across turns
//! - Equipment: loadouts changing hit outcomes mid-fight
//! - Initiative: turn order from rolls and bonuses
//! - Spells: casting and slot use inside a session

pub mod combat;
pub mod effects;
pub mod equipment;
pub mod initiative;
pub mod spells;
