//! Encounter definitions for the command-line runner
//!
//! An encounter is one player and the NPCs they fight, described in TOML:
//!
//! ```toml
//! player_action = "attack"
//!
//! [player]
//! id = "hero"
//! name = "Hero"
//! max_hp = 30
//! damage_dice = "1d6"
//! equipment = ["long_sword", "leather_armor"]
//! stats = { armor_class = 12, attack_bonus = 4 }
//! abilities = { strength = 15, wisdom = 12 }
//! proficiencies = ["athletics"]
//!
//! [[npcs]]
//! id = "gob"
//! name = "Goblin"
//! max_hp = 7
//! damage_dice = "1d6"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::providers::{Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::{
    Ability, AbilityScores, Character, CharacterError, CombatStats, EquipError, ItemCatalog,
    SharedCharacter,
};

#[derive(Debug, Error)]
pub enum EncounterError {
    #[error("encounter file not found: {0}")]
    Missing(PathBuf),

    #[error("invalid encounter: {0}")]
    Load(#[from] figment::Error),

    #[error(transparent)]
    Character(#[from] CharacterError),

    #[error("cannot equip {id}: {source}")]
    Equip { id: String, source: EquipError },

    #[error("an encounter needs at least one NPC")]
    NoNpcs,
}

/// Spell slots granted at one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGrant {
    pub level: u8,
    pub slots: u32,
}

/// One combatant as written in an encounter file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantDef {
    pub id: String,
    pub name: String,
    pub max_hp: u32,
    pub damage_dice: String,
    #[serde(default)]
    pub stats: CombatStats,
    /// Ability scores, players only
    #[serde(default)]
    pub abilities: AbilityScores,
    #[serde(default)]
    pub proficiencies: Vec<String>,
    /// Item ids, players only
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub inventory: Vec<String>,
    #[serde(default)]
    pub spell_slots: Vec<SlotGrant>,
    /// Dialogue nodes, NPCs only
    #[serde(default)]
    pub dialogue: BTreeMap<String, serde_json::Value>,
}

impl CombatantDef {
    fn new(id: &str, name: &str, max_hp: u32, damage_dice: &str, stats: CombatStats) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            max_hp,
            damage_dice: damage_dice.to_string(),
            stats,
            abilities: AbilityScores::new(),
            proficiencies: Vec::new(),
            equipment: Vec::new(),
            inventory: Vec::new(),
            spell_slots: Vec::new(),
            dialogue: BTreeMap::new(),
        }
    }

    fn build_player(&self, catalog: &ItemCatalog) -> Result<Character, EncounterError> {
        let mut player =
            Character::player(&self.id, &self.name, self.max_hp, self.stats, &self.damage_dice)?;
        for (ability, score) in self.abilities.iter() {
            player = player.with_ability_score(ability, score);
        }
        for skill in &self.proficiencies {
            player = player.with_proficiency(skill);
        }
        for item in &self.equipment {
            player.equip(item, catalog).map_err(|source| EncounterError::Equip {
                id: self.id.clone(),
                source,
            })?;
        }
        for item in &self.inventory {
            player.add_item(item);
        }
        for grant in &self.spell_slots {
            player = player.with_spell_slots(grant.level, grant.slots);
        }
        Ok(player)
    }

    fn build_npc(&self) -> Result<Character, EncounterError> {
        let mut npc =
            Character::npc(&self.id, &self.name, self.max_hp, self.stats, &self.damage_dice)?;
        for (key, node) in &self.dialogue {
            npc = npc.with_dialogue(key, node.clone());
        }
        Ok(npc)
    }
}

fn default_action() -> String {
    "attack".to_string()
}

/// A fight to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub player: CombatantDef,
    pub npcs: Vec<CombatantDef>,
    /// Command the player issues every turn
    #[serde(default = "default_action")]
    pub player_action: String,
}

impl Encounter {
    /// Read an encounter from a TOML file
    pub fn load(path: &Path) -> Result<Self, EncounterError> {
        if !path.is_file() {
            return Err(EncounterError::Missing(path.to_path_buf()));
        }
        let encounter: Encounter = Figment::from(Toml::file(path)).extract()?;
        Ok(encounter)
    }

    /// A hero in full kit against a goblin chief and a grunt
    pub fn demo() -> Self {
        let mut hero = CombatantDef::new(
            "hero_main",
            "MainHero",
            75,
            "1d6",
            CombatStats {
                armor_class: 12,
                attack_bonus: 4,
                damage_bonus: 2,
                initiative_bonus: 3,
            },
        );
        hero.equipment = vec![
            "long_sword".into(),
            "leather_armor".into(),
            "wooden_shield".into(),
        ];
        hero.abilities = AbilityScores::from_iter([
            (Ability::Strength, 15),
            (Ability::Dexterity, 14),
            (Ability::Constitution, 13),
            (Ability::Intelligence, 10),
            (Ability::Wisdom, 12),
            (Ability::Charisma, 8),
        ]);
        hero.proficiencies = vec!["athletics".into(), "stealth".into()];
        hero.spell_slots = vec![SlotGrant { level: 1, slots: 2 }];

        let mut chief = CombatantDef::new(
            "goblin_chief",
            "Goblin Chief",
            40,
            "1d8",
            CombatStats {
                armor_class: 14,
                attack_bonus: 3,
                damage_bonus: 1,
                initiative_bonus: 0,
            },
        );
        chief.dialogue.insert(
            "greeting".into(),
            serde_json::json!({"text": "You dare enter my cave?"}),
        );

        let grunt = CombatantDef::new(
            "goblin_grunt",
            "Goblin Grunt",
            12,
            "1d6",
            CombatStats {
                armor_class: 12,
                attack_bonus: 2,
                damage_bonus: 0,
                initiative_bonus: 2,
            },
        );

        Self {
            player: hero,
            npcs: vec![chief, grunt],
            player_action: default_action(),
        }
    }

    /// Create the characters, equipping the player from `catalog`
    pub fn build(
        &self,
        catalog: &ItemCatalog,
    ) -> Result<(SharedCharacter, Vec<SharedCharacter>), EncounterError> {
        if self.npcs.is_empty() {
            return Err(EncounterError::NoNpcs);
        }
        let player = self.player.build_player(catalog)?.into_shared();
        let npcs = self
            .npcs
            .iter()
            .map(|def| def.build_npc().map(Character::into_shared))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((player, npcs))
    }
}
