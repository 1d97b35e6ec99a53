//! Ability scores and skill checks
//!
//! A player's ability scores give modifiers of `(score - 10) / 2`, rounded
//! down. Modifiers feed spell amounts and skill checks:
//! - a skill check rolls d20 + the skill's ability modifier
//! - proficient skills add [`PROFICIENCY_BONUS`]
//! - the check succeeds when the total meets the DC

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::character::{Character, Role};
use super::dice::DiceRoller;

/// Bonus added to checks in skills the player is proficient in
pub const PROFICIENCY_BONUS: i32 = 2;

/// The six abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    /// Short form used in roll breakdowns, e.g. `WIS`
    pub fn abbreviation(self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbilityError {
    #[error("unknown ability '{0}'")]
    UnknownAbility(String),
}

impl FromStr for Ability {
    type Err = AbilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Ability::ALL
            .into_iter()
            .find(|a| a.to_string() == name || a.abbreviation().eq_ignore_ascii_case(&name))
            .ok_or_else(|| AbilityError::UnknownAbility(s.to_string()))
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Ability::Strength => "strength",
            Ability::Dexterity => "dexterity",
            Ability::Constitution => "constitution",
            Ability::Intelligence => "intelligence",
            Ability::Wisdom => "wisdom",
            Ability::Charisma => "charisma",
        };
        write!(f, "{}", s)
    }
}

/// Modifier for a raw ability score, rounded toward negative infinity
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Ability scores by ability; missing abilities have no modifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityScores {
    scores: BTreeMap<Ability, i32>,
}

impl AbilityScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, ability: Ability, score: i32) {
        self.scores.insert(ability, score);
    }

    pub fn get(&self, ability: Ability) -> Option<i32> {
        self.scores.get(&ability).copied()
    }

    /// Modifier for an ability, 0 when it has no score
    pub fn modifier(&self, ability: Ability) -> i32 {
        self.get(ability).map_or(0, ability_modifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ability, i32)> + '_ {
        self.scores.iter().map(|(ability, score)| (*ability, *score))
    }
}

impl FromIterator<(Ability, i32)> for AbilityScores {
    fn from_iter<I: IntoIterator<Item = (Ability, i32)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

const SKILLS: [(&str, Ability); 18] = [
    ("athletics", Ability::Strength),
    ("acrobatics", Ability::Dexterity),
    ("sleight_of_hand", Ability::Dexterity),
    ("stealth", Ability::Dexterity),
    ("arcana", Ability::Intelligence),
    ("history", Ability::Intelligence),
    ("investigation", Ability::Intelligence),
    ("nature", Ability::Intelligence),
    ("religion", Ability::Intelligence),
    ("animal_handling", Ability::Wisdom),
    ("insight", Ability::Wisdom),
    ("medicine", Ability::Wisdom),
    ("perception", Ability::Wisdom),
    ("survival", Ability::Wisdom),
    ("deception", Ability::Charisma),
    ("intimidation", Ability::Charisma),
    ("performance", Ability::Charisma),
    ("persuasion", Ability::Charisma),
];

/// Canonical skill name: lowercase with underscores
pub fn normalize_skill(skill: &str) -> String {
    skill.trim().to_lowercase().replace([' ', '-'], "_")
}

/// The ability a skill is checked with
pub fn skill_ability(skill: &str) -> Option<Ability> {
    let skill = normalize_skill(skill);
    SKILLS
        .iter()
        .find(|(name, _)| *name == skill)
        .map(|(_, ability)| *ability)
}

/// Result of one skill check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillCheck {
    pub skill: String,
    /// `None` for skills with no governing ability
    pub ability: Option<Ability>,
    pub roll: u32,
    pub ability_modifier: i32,
    pub proficiency_bonus: i32,
    pub total: i32,
    pub dc: i32,
    pub success: bool,
}

impl fmt::Display for SkillCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d20({}) + ", self.roll)?;
        match self.ability {
            Some(ability) => {
                write!(f, "{}_MOD({})", ability.abbreviation(), self.ability_modifier)?
            }
            None => write!(f, "N/A_MOD(N/A)")?,
        }
        write!(
            f,
            " + PROF_BONUS({}) = {} vs DC({}). {}",
            self.proficiency_bonus,
            self.total,
            self.dc,
            if self.success { "SUCCESS!" } else { "FAILURE!" }
        )
    }
}

impl Character {
    /// Set a player's ability score
    pub fn with_ability_score(mut self, ability: Ability, score: i32) -> Self {
        match self.player_data_mut() {
            Some(player) => player.ability_scores.set(ability, score),
            None => warn!("{} is not a player; ignoring ability score", self.name()),
        }
        self
    }

    /// Make a player proficient in a skill
    pub fn with_proficiency(mut self, skill: &str) -> Self {
        let skill = normalize_skill(skill);
        match self.player_data_mut() {
            Some(player) if !player.proficiencies.contains(&skill) => {
                player.proficiencies.push(skill)
            }
            Some(_) => {}
            None => warn!("{} is not a player; ignoring proficiency", self.name()),
        }
        self
    }

    /// Modifier for one of the character's abilities; NPCs have none
    pub fn ability_modifier(&self, ability: Ability) -> i32 {
        match self.role() {
            Role::Player(player) => player.ability_scores.modifier(ability),
            Role::Npc(_) => 0,
        }
    }

    pub fn is_proficient(&self, skill: &str) -> bool {
        let skill = normalize_skill(skill);
        self.player_data()
            .is_some_and(|player| player.proficiencies.contains(&skill))
    }

    /// Roll d20 + ability modifier + proficiency against `dc`
    pub fn skill_check(&self, skill: &str, dc: i32, rng: &mut dyn DiceRoller) -> SkillCheck {
        let roll = rng.d20();
        let ability = skill_ability(skill);
        if ability.is_none() {
            debug!("{} has no governing ability for skill '{}'", self.name(), skill);
        }
        let ability_modifier = ability.map_or(0, |a| self.ability_modifier(a));
        let proficiency_bonus = if self.is_proficient(skill) {
            PROFICIENCY_BONUS
        } else {
            0
        };
        let total = roll as i32 + ability_modifier + proficiency_bonus;

        SkillCheck {
            skill: normalize_skill(skill),
            ability,
            roll,
            ability_modifier,
            proficiency_bonus,
            total,
            dc,
            success: total >= dc,
        }
    }
}
