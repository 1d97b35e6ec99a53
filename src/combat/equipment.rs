//! Equipment model
//!
//! Items live in a read-only [`ItemCatalog`] keyed by id. A player's
//! [`Loadout`] holds one item id per slot and is resolved against the
//! catalog into effective armor class and attack modifiers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::character::Character;

/// Equipment slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Weapon,
    Armor,
    Shield,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Weapon, Slot::Armor, Slot::Shield];
}

impl FromStr for Slot {
    type Err = EquipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weapon" | "main_hand" => Ok(Slot::Weapon),
            "armor" | "armour" | "body" => Ok(Slot::Armor),
            "shield" | "off_hand" => Ok(Slot::Shield),
            other => Err(EquipError::UnknownSlot(other.to_string())),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Slot::Weapon => "weapon",
            Slot::Armor => "armor",
            Slot::Shield => "shield",
        };
        write!(f, "{}", s)
    }
}

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub slot: Slot,
    #[serde(default)]
    pub attack_bonus: i32,
    #[serde(default)]
    pub damage_bonus: i32,
    #[serde(default)]
    pub ac_bonus: i32,
    /// Damage dice, weapons only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_dice: Option<String>,
}

impl Item {
    /// Create a weapon entry
    pub fn weapon(id: &str, name: &str, dice: &str, attack_bonus: i32, damage_bonus: i32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            slot: Slot::Weapon,
            attack_bonus,
            damage_bonus,
            ac_bonus: 0,
            damage_dice: Some(dice.to_string()),
        }
    }

    /// Create an armor or shield entry
    pub fn protective(id: &str, name: &str, slot: Slot, ac_bonus: i32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            slot,
            attack_bonus: 0,
            damage_bonus: 0,
            ac_bonus,
            damage_dice: None,
        }
    }
}

static BUILTIN: LazyLock<Arc<ItemCatalog>> = LazyLock::new(|| {
    Arc::new(ItemCatalog::from_items([
        Item::weapon("short_sword", "Short Sword", "1d6", 1, 0),
        Item::weapon("long_sword", "Long Sword", "1d8", 1, 1),
        Item::protective("leather_armor", "Leather Armor", Slot::Armor, 2),
        Item::protective("wooden_shield", "Wooden Shield", Slot::Shield, 1),
        Item::protective("steel_shield", "Steel Shield", Slot::Shield, 2),
    ]))
});

/// Item id to item lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemCatalog {
    items: BTreeMap<String, Item>,
}

impl ItemCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog shared by every session
    pub fn builtin() -> Arc<ItemCatalog> {
        Arc::clone(&BUILTIN)
    }

    /// Build a catalog from items; later ids replace earlier ones
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut catalog = Self::new();
        catalog.extend(items);
        catalog
    }

    /// Add or replace entries
    pub fn extend(&mut self, items: impl IntoIterator<Item = Item>) {
        for item in items {
            self.items.insert(item.id.clone(), item);
        }
    }

    /// Look up an item by id
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }
}

/// Item ids currently equipped, one per slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Loadout {
    pub weapon: Option<String>,
    pub armor: Option<String>,
    pub shield: Option<String>,
}

impl Loadout {
    /// Item id in a slot
    pub fn get(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Weapon => self.weapon.as_deref(),
            Slot::Armor => self.armor.as_deref(),
            Slot::Shield => self.shield.as_deref(),
        }
    }

    /// Put an item id in a slot, returning what was there
    pub fn set(&mut self, slot: Slot, item_id: Option<String>) -> Option<String> {
        let entry = match slot {
            Slot::Weapon => &mut self.weapon,
            Slot::Armor => &mut self.armor,
            Slot::Shield => &mut self.shield,
        };
        std::mem::replace(entry, item_id)
    }

    /// Resolve a slot against the catalog
    fn resolve<'c>(&self, slot: Slot, catalog: &'c ItemCatalog) -> Option<&'c Item> {
        let id = self.get(slot)?;
        let item = catalog.get(id);
        if item.is_none() {
            warn!("equipped {} '{}' is not in the item catalog", slot, id);
        }
        item
    }
}

/// Errors from changing equipment
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquipError {
    #[error("unknown item '{0}'")]
    UnknownItem(String),

    #[error("unknown equipment slot '{0}'")]
    UnknownSlot(String),

    #[error("item '{item}' is a {actual} and cannot go in the {slot} slot")]
    WrongSlot { item: String, slot: Slot, actual: Slot },

    #[error("{0} cannot carry equipment")]
    NotAPlayer(String),
}

/// Offensive numbers for one attack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackModifiers {
    pub attack_bonus: i32,
    pub damage_bonus: i32,
    pub damage_dice: String,
}

/// Base armor class plus armor and shield bonuses
///
/// NPCs carry no equipment and resolve to their base armor class.
pub fn effective_armor_class(character: &Character, catalog: &ItemCatalog) -> i32 {
    let base = character.combat_stats.armor_class;
    let Some(player) = character.player_data() else {
        return base;
    };

    [Slot::Armor, Slot::Shield]
        .into_iter()
        .filter_map(|slot| player.equipment.resolve(slot, catalog))
        .fold(base, |ac, item| ac + item.ac_bonus)
}

/// Base attack/damage bonuses plus the equipped weapon's
///
/// The weapon's dice replace the base dice when the weapon has any.
pub fn effective_attack_modifiers(character: &Character, catalog: &ItemCatalog) -> AttackModifiers {
    let stats = &character.combat_stats;
    let mut modifiers = AttackModifiers {
        attack_bonus: stats.attack_bonus,
        damage_bonus: stats.damage_bonus,
        damage_dice: character.base_damage_dice().to_string(),
    };

    let weapon = character
        .player_data()
        .and_then(|player| player.equipment.resolve(Slot::Weapon, catalog));
    if let Some(weapon) = weapon {
        modifiers.attack_bonus += weapon.attack_bonus;
        modifiers.damage_bonus += weapon.damage_bonus;
        if let Some(dice) = &weapon.damage_dice {
            modifiers.damage_dice = dice.clone();
        }
    }

    modifiers
}

impl Character {
    /// Equip an item into its own slot, returning the id it replaced
    pub fn equip(
        &mut self,
        item_id: &str,
        catalog: &ItemCatalog,
    ) -> Result<Option<String>, EquipError> {
        let item = catalog
            .get(item_id)
            .ok_or_else(|| EquipError::UnknownItem(item_id.to_string()))?;
        self.equip_in(item.slot, item_id, catalog)
    }

    /// Equip an item into a named slot, which must match the item's slot
    pub fn equip_in(
        &mut self,
        slot: Slot,
        item_id: &str,
        catalog: &ItemCatalog,
    ) -> Result<Option<String>, EquipError> {
        let item = catalog
            .get(item_id)
            .ok_or_else(|| EquipError::UnknownItem(item_id.to_string()))?;
        if item.slot != slot {
            return Err(EquipError::WrongSlot {
                item: item_id.to_string(),
                slot,
                actual: item.slot,
            });
        }

        let name = self.name().to_string();
        let player = self.player_data_mut().ok_or(EquipError::NotAPlayer(name))?;
        let previous = player.equipment.set(slot, Some(item_id.to_string()));
        debug!("{} equipped {} in {} slot", self.name(), item.name, slot);
        Ok(previous)
    }

    /// Empty a slot, returning the id that was there
    pub fn unequip(&mut self, slot: Slot) -> Option<String> {
        self.player_data_mut()?.equipment.set(slot, None)
    }
}
