//! Spells and spell slots
//!
//! A [`Spellbook`] maps names to [`Spell`]s. Players spend one slot of the
//! spell's level per cast; level 0 spells are free.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::abilities::Ability;
use super::character::{clamp_damage, Character};
use super::dice::parse_dice;
use super::rules::CombatContext;
use super::state::CombatError;

/// Who a spell may be aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpellTarget {
    /// Always the caster
    Caster,
    /// The caster or a named ally
    Ally,
    /// A named opponent
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpellEffect {
    Heal,
    Damage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    pub name: String,
    pub level: u8,
    pub target: SpellTarget,
    pub effect: SpellEffect,
    pub dice: String,
    /// Caster ability added to the rolled amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat_modifier: Option<Ability>,
}

impl Spell {
    pub fn new(
        name: &str,
        level: u8,
        target: SpellTarget,
        effect: SpellEffect,
        dice: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            level,
            target,
            effect,
            dice: dice.to_string(),
            stat_modifier: None,
        }
    }

    pub fn with_modifier(mut self, ability: Ability) -> Self {
        self.stat_modifier = Some(ability);
        self
    }
}

static BUILTIN: LazyLock<Arc<Spellbook>> = LazyLock::new(|| {
    Arc::new(Spellbook::from_spells([
        Spell::new("Cure Light Wounds", 1, SpellTarget::Ally, SpellEffect::Heal, "1d4")
            .with_modifier(Ability::Wisdom),
        Spell::new("Fire Bolt", 1, SpellTarget::Enemy, SpellEffect::Damage, "1d6"),
    ]))
});

/// Known spells, looked up case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spellbook {
    spells: BTreeMap<String, Spell>,
}

impl Spellbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in spellbook shared by every session
    pub fn builtin() -> Arc<Spellbook> {
        Arc::clone(&BUILTIN)
    }

    pub fn from_spells(spells: impl IntoIterator<Item = Spell>) -> Self {
        let mut book = Self::new();
        for spell in spells {
            book.insert(spell);
        }
        book
    }

    pub fn insert(&mut self, spell: Spell) {
        self.spells.insert(spell.name.to_lowercase(), spell);
    }

    pub fn get(&self, name: &str) -> Option<&Spell> {
        self.spells.get(&name.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }
}

/// Slots at one level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPool {
    pub current: u32,
    pub max: u32,
}

/// Spell slots by level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpellSlots {
    levels: BTreeMap<u8, SlotPool>,
}

impl SpellSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a level to `slots` full slots
    pub fn set(&mut self, level: u8, slots: u32) {
        self.levels.insert(level, SlotPool { current: slots, max: slots });
    }

    /// Slots left at a level
    pub fn available(&self, level: u8) -> u32 {
        self.levels.get(&level).map_or(0, |pool| pool.current)
    }

    /// Whether a spell of this level can be cast now
    pub fn can_cast(&self, level: u8) -> bool {
        level == 0 || self.available(level) > 0
    }

    fn consume(&mut self, level: u8) -> bool {
        if level == 0 {
            return true;
        }
        match self.levels.get_mut(&level) {
            Some(pool) if pool.current > 0 => {
                pool.current -= 1;
                true
            }
            _ => false,
        }
    }

    /// Refill every level to its maximum
    pub fn restore(&mut self) {
        for pool in self.levels.values_mut() {
            pool.current = pool.max;
        }
    }
}

/// Reasons a cast is refused before anything happens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("unknown spell '{0}'")]
    UnknownSpell(String),

    #[error("{0} cannot cast spells")]
    NotACaster(String),

    #[error("{caster} has no level {level} spell slots left")]
    NoSlots { caster: String, level: u8 },

    #[error("'{0}' needs a target")]
    TargetRequired(String),

    #[error("'{0}' can only target the caster")]
    CasterOnly(String),
}

/// Check that `caster` could cast `spell` now, without changing anything
pub fn check_cast(caster: &Character, spell: &Spell, has_target: bool) -> Result<(), CastError> {
    let player = caster
        .player_data()
        .ok_or_else(|| CastError::NotACaster(caster.name().to_string()))?;
    if !player.spell_slots.can_cast(spell.level) {
        return Err(CastError::NoSlots {
            caster: caster.name().to_string(),
            level: spell.level,
        });
    }
    match (spell.target, has_target) {
        (SpellTarget::Enemy, false) => Err(CastError::TargetRequired(spell.name.clone())),
        (SpellTarget::Caster, true) => Err(CastError::CasterOnly(spell.name.clone())),
        _ => Ok(()),
    }
}

impl Character {
    /// Cast a spell from the context's spellbook
    ///
    /// With no `target`, caster and ally spells land on the caster. A spell
    /// with a stat modifier adds the caster's modifier to the roll, and the
    /// total never drops below zero.
    pub fn cast_spell(
        &mut self,
        spell_name: &str,
        target: Option<&mut Character>,
        ctx: &mut CombatContext<'_>,
    ) -> Result<String, CombatError> {
        let spell = ctx
            .spellbook
            .get(spell_name)
            .ok_or_else(|| CastError::UnknownSpell(spell_name.to_string()))?
            .clone();
        check_cast(self, &spell, target.is_some())?;

        let dice = parse_dice(&spell.dice).map_err(|source| CombatError::MalformedDice {
            character: self.name().to_string(),
            source,
        })?;

        if let Some(player) = self.player_data_mut() {
            player.spell_slots.consume(spell.level);
        }
        let roll = dice.roll(&mut *ctx.rng);
        let modifier = spell
            .stat_modifier
            .map(|ability| (ability, self.ability_modifier(ability)));
        let bonus = modifier.map_or(0, |(_, value)| value);
        let amount = clamp_damage(i64::from(roll) + i64::from(bonus));
        let modifier_note = match modifier {
            Some((ability, value)) => format!(" + {}({})", ability.abbreviation(), value),
            None => String::new(),
        };

        let caster_name = self.name().to_string();
        let recipient = match target {
            Some(target) => target,
            None => self,
        };
        let (verb, applied) = match spell.effect {
            SpellEffect::Heal => ("Healed", recipient.heal(amount)),
            SpellEffect::Damage => ("Dealt", recipient.take_damage(amount)),
        };
        debug!("{} cast {} on {} for {}", caster_name, spell.name, recipient.name(), applied);

        let slot_note = if spell.level == 0 {
            String::new()
        } else {
            format!(", consuming a level {} slot", spell.level)
        };
        let mut message = format!(
            "{} casts '{}' on {}{}. {} {} HP. ({}({}){} = {})",
            caster_name,
            spell.name,
            recipient.name(),
            slot_note,
            verb,
            applied,
            dice,
            roll,
            modifier_note,
            amount
        );
        if spell.effect == SpellEffect::Damage && !recipient.is_alive() {
            message.push_str(&format!(" {} has been defeated!", recipient.name()));
        }
        Ok(message)
    }
}
