//! skirmish - turn-based combat resolution engine
//!
//! Initiative, attacks, status effects, spells and equipment for one player
//! fighting a group of NPCs, with injectable dice so every fight can be
//! replayed exactly.

pub mod combat;
pub mod config;
pub mod encounter;

pub use config::{Config, ConfigError};
pub use encounter::{Encounter, EncounterError};
