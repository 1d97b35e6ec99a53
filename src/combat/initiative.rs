//! Initiative: who acts first

use tracing::debug;

use super::character::Character;
use super::dice::DiceRoller;

/// One participant's initiative result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiativeRoll {
    pub id: String,
    pub roll: u32,
    pub bonus: i32,
    pub score: i32,
}

/// Roll d20 + initiative bonus for each participant, best first
///
/// Rolls are made in input order. The sort is stable, so tied scores keep
/// their input order.
pub fn roll_initiative<'a>(
    participants: impl IntoIterator<Item = &'a Character>,
    rng: &mut dyn DiceRoller,
) -> Vec<InitiativeRoll> {
    let mut rolls: Vec<InitiativeRoll> = participants
        .into_iter()
        .map(|c| {
            let roll = rng.d20();
            let bonus = c.combat_stats.initiative_bonus;
            debug!("{} rolls initiative {} + {}", c.name(), roll, bonus);
            InitiativeRoll {
                id: c.id().to_string(),
                roll,
                bonus,
                score: roll as i32 + bonus,
            }
        })
        .collect();

    rolls.sort_by(|a, b| b.score.cmp(&a.score));
    rolls
}

/// Turn order as participant ids
pub fn determine_initiative<'a>(
    participants: impl IntoIterator<Item = &'a Character>,
    rng: &mut dyn DiceRoller,
) -> Vec<String> {
    roll_initiative(participants, rng)
        .into_iter()
        .map(|r| r.id)
        .collect()
}
