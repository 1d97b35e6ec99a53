//! Status effects
//!
//! Timed conditions on a character:
//! - one instance per name; re-applying refreshes it in place
//! - ticked once at the start of the owner's turn
//! - removed by the tick that runs the duration down to zero
//!
//! Only `poison` has per-turn behavior (potency damage); other names simply
//! count down.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::character::Character;

/// Name of the poison effect
pub const POISON: &str = "poison";

/// Effects with built-in per-turn behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Loses potency hit points each turn
    Poison,
}

impl FromStr for EffectKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            POISON => Ok(EffectKind::Poison),
            _ => Err(()),
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectKind::Poison => write!(f, "{}", POISON),
        }
    }
}

/// One active effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub name: String,
    /// Turns remaining, always positive while active
    pub duration: u32,
    /// Effect-specific magnitude, e.g. poison damage per turn
    pub potency: u32,
}

impl StatusEffect {
    pub fn new(name: &str, duration: u32, potency: u32) -> Self {
        Self {
            name: name.to_string(),
            duration,
            potency,
        }
    }

    /// Built-in behavior for this effect, if any
    pub fn kind(&self) -> Option<EffectKind> {
        self.name.parse().ok()
    }
}

/// How an application changed the active list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Added,
    Refreshed,
    /// Zero-duration application; any existing instance was dropped
    Cleared,
}

/// Active effects of one character, in application order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an effect or refresh an existing one of the same name
    pub fn apply(&mut self, name: &str, duration: u32, potency: u32) -> Applied {
        if duration == 0 {
            self.remove(name);
            return Applied::Cleared;
        }

        match self.effects.iter_mut().find(|e| e.name == name) {
            Some(existing) => {
                existing.duration = duration;
                existing.potency = potency;
                Applied::Refreshed
            }
            None => {
                self.effects.push(StatusEffect::new(name, duration, potency));
                Applied::Added
            }
        }
    }

    /// Remove an effect by name
    pub fn remove(&mut self, name: &str) -> Option<StatusEffect> {
        let index = self.effects.iter().position(|e| e.name == name)?;
        Some(self.effects.remove(index))
    }

    /// Count one turn off an effect; returns true if that expired it
    fn count_down(&mut self, name: &str) -> bool {
        let Some(index) = self.effects.iter().position(|e| e.name == name) else {
            return false;
        };
        let effect = &mut self.effects[index];
        effect.duration = effect.duration.saturating_sub(1);
        if effect.duration == 0 {
            self.effects.remove(index);
            true
        } else {
            false
        }
    }

    pub fn get(&self, name: &str) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl Character {
    /// Apply a status effect, reporting what happened to the active list
    pub fn apply_status_effect(&mut self, name: &str, duration: u32, potency: u32) -> Applied {
        let applied = self.status_effects.apply(name, duration, potency);
        debug!(
            "{} {:?} {} ({} turns, potency {})",
            self.name(),
            applied,
            name,
            duration,
            potency
        );
        applied
    }

    /// Apply a status effect and describe the result
    pub fn add_status_effect(&mut self, name: &str, duration: u32, potency: u32) -> String {
        match self.apply_status_effect(name, duration, potency) {
            Applied::Refreshed => format!(
                "{}'s {} has been refreshed to {} turns.",
                self.name(),
                name,
                duration
            ),
            Applied::Added => format!("{} is now {} for {} turns.", self.name(), name, duration),
            Applied::Cleared => format!("{} is no longer {}.", self.name(), name),
        }
    }

    /// Remove a status effect; absent names are ignored
    pub fn remove_status_effect(&mut self, name: &str) {
        if self.status_effects.remove(name).is_some() {
            debug!("{} lost {}", self.name(), name);
        }
    }

    /// Run one turn of every active effect
    ///
    /// Effects are visited in application order from a snapshot. If an
    /// effect drops the character to 0 hp, ticking stops there and that
    /// effect (and any after it) keeps its remaining duration.
    pub fn tick_status_effects(&mut self) -> Vec<String> {
        let snapshot = self.status_effects.effects.clone();
        let mut messages = Vec::new();

        for effect in snapshot {
            if effect.kind() == Some(EffectKind::Poison) {
                self.take_damage(effect.potency);
                messages.push(format!(
                    "{} took {} damage from poison.",
                    self.name(),
                    effect.potency
                ));
                if !self.is_alive() {
                    messages.push(format!("{} succumbed to poison.", self.name()));
                    break;
                }
            }

            if self.status_effects.count_down(&effect.name) {
                debug!("{} expired on {}", effect.name, self.name());
                messages.push(format!("{} is no longer {}.", self.name(), effect.name));
            }
        }

        messages
    }
}
