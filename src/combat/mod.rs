//! Combat system module
//!
//! Turn-based combat between one player and a group of NPCs:
//! - Dice notation and injectable dice rollers
//! - Initiative ordering
//! - Attack resolution against equipment-adjusted armor class
//! - Status effects (poison) ticked at the start of each turn
//! - Ability scores and skill checks
//! - Spells with per-level spell slots
//! - Combat sessions with turn order and end detection

mod abilities;
mod character;
mod dice;
mod effects;
mod equipment;
mod initiative;
mod notify;
mod rules;
mod spells;
mod state;

pub use abilities::{
    ability_modifier, normalize_skill, skill_ability, Ability, AbilityError, AbilityScores,
    SkillCheck, PROFICIENCY_BONUS,
};
pub use character::{
    AttackOutcome, Character, CharacterError, CombatStats, DamageRoll, NpcData, PlayerData, Role,
    SharedCharacter,
};
pub use dice::{
    parse_dice, DiceError, DiceRoller, DiceSpec, ScriptedRoller, SeededRoller, ThreadRoller,
    MAX_DICE_COUNT, MAX_DICE_SIDES,
};
pub use effects::{Applied, EffectKind, StatusEffect, StatusEffects, POISON};
pub use equipment::{
    effective_armor_class, effective_attack_modifiers, AttackModifiers, EquipError, Item,
    ItemCatalog, Loadout, Slot,
};
pub use initiative::{determine_initiative, roll_initiative, InitiativeRoll};
pub use notify::{Notifier, NotifyContext, RecordingNotifier, TracingNotifier};
pub use rules::{CombatContext, CombatRules};
pub use spells::{
    check_cast, CastError, SlotPool, Spell, SpellEffect, SpellSlots, SpellTarget, Spellbook,
};
pub use state::{CombatEnd, CombatError, CombatSession, PlayerAction};
