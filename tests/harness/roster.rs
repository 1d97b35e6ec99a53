//! CharacterBuilder - fluent construction of test combatants

#![allow(dead_code)]

use skirmish::combat::{Ability, Character, CombatStats, ItemCatalog, SharedCharacter};

/// Builds a player or NPC with sensible test defaults
///
/// Defaults: 20 hp, all stats 0, `1d6` damage dice, no equipment.
pub struct CharacterBuilder {
    id: String,
    name: String,
    player: bool,
    max_hp: u32,
    stats: CombatStats,
    dice: String,
    equipment: Vec<String>,
    spell_slots: Vec<(u8, u32)>,
    abilities: Vec<(Ability, i32)>,
    proficiencies: Vec<String>,
}

impl CharacterBuilder {
    fn new(id: &str, name: &str, player: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            player,
            max_hp: 20,
            stats: CombatStats::default(),
            dice: "1d6".to_string(),
            equipment: Vec::new(),
            spell_slots: Vec::new(),
            abilities: Vec::new(),
            proficiencies: Vec::new(),
        }
    }

    pub fn player(id: &str, name: &str) -> Self {
        Self::new(id, name, true)
    }

    pub fn npc(id: &str, name: &str) -> Self {
        Self::new(id, name, false)
    }

    pub fn hp(mut self, max_hp: u32) -> Self {
        self.max_hp = max_hp;
        self
    }

    pub fn ac(mut self, armor_class: i32) -> Self {
        self.stats.armor_class = armor_class;
        self
    }

    pub fn attack(mut self, attack_bonus: i32) -> Self {
        self.stats.attack_bonus = attack_bonus;
        self
    }

    pub fn damage(mut self, damage_bonus: i32) -> Self {
        self.stats.damage_bonus = damage_bonus;
        self
    }

    pub fn initiative(mut self, initiative_bonus: i32) -> Self {
        self.stats.initiative_bonus = initiative_bonus;
        self
    }

    pub fn dice(mut self, dice: &str) -> Self {
        self.dice = dice.to_string();
        self
    }

    /// Equip a built-in catalog item (players only)
    pub fn equip(mut self, item_id: &str) -> Self {
        self.equipment.push(item_id.to_string());
        self
    }

    pub fn spell_slots(mut self, level: u8, slots: u32) -> Self {
        self.spell_slots.push((level, slots));
        self
    }

    pub fn ability(mut self, ability: Ability, score: i32) -> Self {
        self.abilities.push((ability, score));
        self
    }

    pub fn proficient(mut self, skill: &str) -> Self {
        self.proficiencies.push(skill.to_string());
        self
    }

    pub fn build(self) -> Character {
        let mut character = if self.player {
            Character::player(&self.id, &self.name, self.max_hp, self.stats, &self.dice)
        } else {
            Character::npc(&self.id, &self.name, self.max_hp, self.stats, &self.dice)
        }
        .expect("valid test character");

        let catalog = ItemCatalog::builtin();
        for item in &self.equipment {
            character.equip(item, &catalog).expect("equippable test item");
        }
        for (level, slots) in self.spell_slots {
            character = character.with_spell_slots(level, slots);
        }
        for (ability, score) in self.abilities {
            character = character.with_ability_score(ability, score);
        }
        for skill in &self.proficiencies {
            character = character.with_proficiency(skill);
        }
        character
    }

    pub fn shared(self) -> SharedCharacter {
        self.build().into_shared()
    }
}
