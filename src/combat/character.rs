//! Combatants
//!
//! Players and NPCs share one [`Character`] struct and fight the same way.
//! The closed [`Role`] enum carries the data only one side has:
//! - players: equipment, inventory, spell slots
//! - NPCs: dialogue nodes

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::abilities::AbilityScores;
use super::dice::{parse_dice, DiceSpec};
use super::effects::{Applied, StatusEffects, POISON};
use super::equipment::{effective_armor_class, effective_attack_modifiers, Loadout};
use super::rules::CombatContext;
use super::spells::SpellSlots;
use super::state::CombatError;

/// A character shared between a session and its callers
pub type SharedCharacter = Rc<RefCell<Character>>;

/// Named combat modifiers; missing keys default to 0
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatStats {
    pub armor_class: i32,
    pub attack_bonus: i32,
    pub damage_bonus: i32,
    pub initiative_bonus: i32,
}

/// Data only player characters carry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerData {
    pub ability_scores: AbilityScores,
    /// Skill names, lowercase with underscores
    pub proficiencies: Vec<String>,
    pub equipment: Loadout,
    pub inventory: Vec<String>,
    pub spell_slots: SpellSlots,
}

/// Data only NPCs carry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcData {
    /// Dialogue nodes by key, opaque to combat
    pub dialogue: BTreeMap<String, serde_json::Value>,
}

/// Which side a character is on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Role {
    Player(PlayerData),
    Npc(NpcData),
}

/// Errors from building a character
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CharacterError {
    #[error("character id must not be empty")]
    EmptyId,

    #[error("character '{0}' must have a name")]
    EmptyName(String),

    #[error("character '{0}' must have positive max hp")]
    ZeroMaxHp(String),

    #[error("character '{0}' must have base damage dice")]
    EmptyDamageDice(String),
}

/// A combatant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Character {
    id: String,
    name: String,
    max_hp: u32,
    current_hp: u32,
    pub combat_stats: CombatStats,
    base_damage_dice: String,
    pub(super) status_effects: StatusEffects,
    role: Role,
}

impl Character {
    /// Create a character at full health with no active effects
    pub fn new(
        id: &str,
        name: &str,
        max_hp: u32,
        combat_stats: CombatStats,
        base_damage_dice: &str,
        role: Role,
    ) -> Result<Self, CharacterError> {
        if id.trim().is_empty() {
            return Err(CharacterError::EmptyId);
        }
        if name.trim().is_empty() {
            return Err(CharacterError::EmptyName(id.to_string()));
        }
        if max_hp == 0 {
            return Err(CharacterError::ZeroMaxHp(id.to_string()));
        }
        if base_damage_dice.trim().is_empty() {
            return Err(CharacterError::EmptyDamageDice(id.to_string()));
        }

        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            max_hp,
            current_hp: max_hp,
            combat_stats,
            base_damage_dice: base_damage_dice.to_string(),
            status_effects: StatusEffects::new(),
            role,
        })
    }

    /// Create a player character with empty equipment
    pub fn player(
        id: &str,
        name: &str,
        max_hp: u32,
        combat_stats: CombatStats,
        base_damage_dice: &str,
    ) -> Result<Self, CharacterError> {
        Self::new(
            id,
            name,
            max_hp,
            combat_stats,
            base_damage_dice,
            Role::Player(PlayerData::default()),
        )
    }

    /// Create an NPC with no dialogue
    pub fn npc(
        id: &str,
        name: &str,
        max_hp: u32,
        combat_stats: CombatStats,
        base_damage_dice: &str,
    ) -> Result<Self, CharacterError> {
        Self::new(
            id,
            name,
            max_hp,
            combat_stats,
            base_damage_dice,
            Role::Npc(NpcData::default()),
        )
    }

    /// Give a player spell slots at a level
    pub fn with_spell_slots(mut self, level: u8, slots: u32) -> Self {
        match &mut self.role {
            Role::Player(player) => player.spell_slots.set(level, slots),
            Role::Npc(_) => warn!("{} is not a player; ignoring spell slots", self.name),
        }
        self
    }

    /// Attach a dialogue node to an NPC
    pub fn with_dialogue(mut self, key: &str, node: serde_json::Value) -> Self {
        match &mut self.role {
            Role::Npc(npc) => {
                npc.dialogue.insert(key.to_string(), node);
            }
            Role::Player(_) => warn!("{} is not an NPC; ignoring dialogue '{}'", self.name, key),
        }
        self
    }

    /// Wrap for sharing with a combat session
    pub fn into_shared(self) -> SharedCharacter {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn current_hp(&self) -> u32 {
        self.current_hp
    }

    pub fn base_damage_dice(&self) -> &str {
        &self.base_damage_dice
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn is_player(&self) -> bool {
        matches!(self.role, Role::Player(_))
    }

    pub fn player_data(&self) -> Option<&PlayerData> {
        match &self.role {
            Role::Player(player) => Some(player),
            Role::Npc(_) => None,
        }
    }

    pub fn player_data_mut(&mut self) -> Option<&mut PlayerData> {
        match &mut self.role {
            Role::Player(player) => Some(player),
            Role::Npc(_) => None,
        }
    }

    pub fn npc_data(&self) -> Option<&NpcData> {
        match &self.role {
            Role::Npc(npc) => Some(npc),
            Role::Player(_) => None,
        }
    }

    /// Active status effects in application order
    pub fn status_effects(&self) -> &StatusEffects {
        &self.status_effects
    }

    /// Check if the character can still fight
    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    /// Lose hit points, stopping at 0; returns the amount actually lost
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current_hp);
        self.current_hp -= actual;
        actual
    }

    /// Regain hit points, stopping at max; returns the amount actually gained
    pub fn heal(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.max_hp - self.current_hp);
        self.current_hp += actual;
        actual
    }

    /// Add an item to a player's inventory
    pub fn add_item(&mut self, item: &str) -> bool {
        if item.trim().is_empty() {
            return false;
        }
        match self.player_data_mut() {
            Some(player) => {
                player.inventory.push(item.to_string());
                true
            }
            None => false,
        }
    }

    /// Remove one copy of an item from a player's inventory
    pub fn remove_item(&mut self, item: &str) -> bool {
        let Some(player) = self.player_data_mut() else {
            return false;
        };
        match player.inventory.iter().position(|held| held == item) {
            Some(index) => {
                player.inventory.remove(index);
                true
            }
            None => false,
        }
    }

    /// Look up an NPC dialogue node
    pub fn dialogue_node(&self, key: &str) -> Option<&serde_json::Value> {
        self.npc_data()?.dialogue.get(key)
    }

    /// Resolve one attack against `target`
    ///
    /// A miss has no side effects. A hit rolls damage, applies it, and then
    /// makes one poison check whether or not the target went down.
    pub fn attack(
        &self,
        target: &mut Character,
        ctx: &mut CombatContext<'_>,
    ) -> Result<AttackOutcome, CombatError> {
        let modifiers = effective_attack_modifiers(self, ctx.catalog);
        let target_ac = effective_armor_class(target, ctx.catalog);

        let roll = ctx.rng.d20();
        let attack_total = roll as i32 + modifiers.attack_bonus;

        let mut outcome = AttackOutcome {
            attacker: self.name.clone(),
            target: target.name.clone(),
            roll,
            attack_bonus: modifiers.attack_bonus,
            attack_total,
            target_ac,
            damage: None,
            target_hp: target.current_hp,
            target_max_hp: target.max_hp,
            defeated: false,
            poisoned: false,
        };

        if attack_total < target_ac {
            debug!("{} misses {} ({} vs AC {})", self.name, target.name, attack_total, target_ac);
            return Ok(outcome);
        }

        let dice = parse_dice(&modifiers.damage_dice).map_err(|source| CombatError::MalformedDice {
            character: self.name.clone(),
            source,
        })?;
        let dice_roll = dice.roll(&mut *ctx.rng);
        let total = clamp_damage(i64::from(dice_roll) + i64::from(modifiers.damage_bonus));

        target.take_damage(total);
        outcome.damage = Some(DamageRoll {
            dice,
            roll: dice_roll,
            bonus: modifiers.damage_bonus,
            total,
        });
        outcome.target_hp = target.current_hp;
        outcome.defeated = !target.is_alive();
        if outcome.defeated {
            info!("{} was defeated by {}", target.name, self.name);
        }

        let rules = ctx.rules;
        if ctx.rng.percent() <= rules.poison_chance && rules.poison_duration > 0 {
            let applied =
                target.apply_status_effect(POISON, rules.poison_duration, rules.poison_potency);
            outcome.poisoned = applied != Applied::Cleared;
        }

        Ok(outcome)
    }
}

pub(super) fn clamp_damage(raw: i64) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}

/// Damage half of a hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DamageRoll {
    #[serde(serialize_with = "serialize_display")]
    pub dice: DiceSpec,
    pub roll: u32,
    pub bonus: i32,
    /// Damage applied, never negative
    pub total: u32,
}

fn serialize_display<S: serde::Serializer>(
    value: &DiceSpec,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Result of one attack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackOutcome {
    pub attacker: String,
    pub target: String,
    /// The d20 roll
    pub roll: u32,
    pub attack_bonus: i32,
    pub attack_total: i32,
    pub target_ac: i32,
    /// Present on a hit
    pub damage: Option<DamageRoll>,
    pub target_hp: u32,
    pub target_max_hp: u32,
    pub defeated: bool,
    pub poisoned: bool,
}

impl AttackOutcome {
    pub fn is_hit(&self) -> bool {
        self.damage.is_some()
    }
}

impl fmt::Display for AttackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attacks {}. d20({}) + ATK Bonus({}) = {} vs AC({}).",
            self.attacker,
            self.target,
            self.roll,
            self.attack_bonus,
            self.attack_total,
            self.target_ac
        )?;

        let Some(damage) = &self.damage else {
            return write!(f, " MISS!");
        };

        write!(
            f,
            " HIT! Deals {}({}) + DMG Bonus({}) = {} damage. {} HP: {}/{}.",
            damage.dice,
            damage.roll,
            damage.bonus,
            damage.total,
            self.target,
            self.target_hp,
            self.target_max_hp
        )?;
        if self.defeated {
            write!(f, " {} has been defeated!", self.target)?;
        }
        if self.poisoned {
            write!(f, " {} has been poisoned!", self.target)?;
        }
        Ok(())
    }
}
