//! Tunable combat rules and the per-call resolution context

use std::fmt;

use serde::{Deserialize, Serialize};

use super::dice::DiceRoller;
use super::equipment::ItemCatalog;
use super::spells::Spellbook;

/// Numbers that govern attack side effects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatRules {
    /// A hit poisons the target when a percentage check is at or below this
    pub poison_chance: u32,
    /// Turns of poison applied by a hit
    pub poison_duration: u32,
    /// Damage per turn of applied poison
    pub poison_potency: u32,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            poison_chance: 10,
            poison_duration: 3,
            poison_potency: 2,
        }
    }
}

/// Everything an attack or cast needs besides the two combatants
pub struct CombatContext<'a> {
    pub rng: &'a mut dyn DiceRoller,
    pub catalog: &'a ItemCatalog,
    pub spellbook: &'a Spellbook,
    pub rules: &'a CombatRules,
}

impl<'a> CombatContext<'a> {
    /// Create a context over the given collaborators
    pub fn new(
        rng: &'a mut dyn DiceRoller,
        catalog: &'a ItemCatalog,
        spellbook: &'a Spellbook,
        rules: &'a CombatRules,
    ) -> Self {
        Self {
            rng,
            catalog,
            spellbook,
            rules,
        }
    }
}

impl fmt::Debug for CombatContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombatContext")
            .field("catalog", &self.catalog.len())
            .field("spellbook", &self.spellbook.len())
            .field("rules", self.rules)
            .finish_non_exhaustive()
    }
}
