//! Dice notation and the randomness source
//!
//! Parses damage dice like "2d6" or "d8" and rolls them through an
//! injectable [`DiceRoller`]:
//! - [`ThreadRoller`] for ordinary play
//! - [`SeededRoller`] for reproducible runs
//! - [`ScriptedRoller`] for tests that need exact rolls

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Errors from parsing dice notation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("invalid dice notation '{0}', expected XdY or dY")]
    InvalidFormat(String),

    #[error("dice notation '{0}' is missing the sides component")]
    MissingSidesComponent(String),

    #[error("dice notation '{0}' must have a positive count and sides")]
    NonPositiveDiceSpec(String),

    #[error(
        "dice notation '{0}' exceeds {count} dice or {sides} sides",
        count = MAX_DICE_COUNT,
        sides = MAX_DICE_SIDES
    )]
    TooManyDice(String),
}

/// Most dice a single notation may roll
pub const MAX_DICE_COUNT: u32 = 100;
/// Most sides a single die may have
pub const MAX_DICE_SIDES: u32 = 1000;

impl DiceError {
    /// The notation string that failed to parse
    pub fn notation(&self) -> &str {
        match self {
            DiceError::InvalidFormat(s)
            | DiceError::MissingSidesComponent(s)
            | DiceError::NonPositiveDiceSpec(s)
            | DiceError::TooManyDice(s) => s,
        }
    }
}

/// A parsed dice specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiceSpec {
    /// Number of dice to roll
    pub count: u32,
    /// Number of sides per die
    pub sides: u32,
}

impl DiceSpec {
    /// Create a new dice spec
    pub fn new(count: u32, sides: u32) -> Self {
        Self { count, sides }
    }

    /// Roll the dice through the given source and return the sum
    pub fn roll(&self, rng: &mut dyn DiceRoller) -> u32 {
        rng.roll(self.sides, self.count)
    }

    /// Get the minimum possible result
    pub fn min(&self) -> u32 {
        self.count
    }

    /// Get the maximum possible result
    pub fn max(&self) -> u32 {
        self.count.saturating_mul(self.sides)
    }
}

impl FromStr for DiceSpec {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dice(s)
    }
}

impl fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

/// Parse a dice notation string like "2d6" or "d20"
///
/// Leading/trailing whitespace and letter case are ignored. A missing
/// count means one die.
pub fn parse_dice(notation: &str) -> Result<DiceSpec, DiceError> {
    let normalized = notation.trim().to_lowercase();
    let invalid = || DiceError::InvalidFormat(notation.to_string());

    let (count_str, sides_str) = normalized.split_once('d').ok_or_else(invalid)?;
    if sides_str.contains('d') {
        return Err(invalid());
    }
    if sides_str.is_empty() {
        return Err(DiceError::MissingSidesComponent(notation.to_string()));
    }

    let count: i64 = if count_str.is_empty() {
        1
    } else {
        count_str.parse().map_err(|_| invalid())?
    };
    let sides: i64 = sides_str.parse().map_err(|_| invalid())?;

    if count <= 0 || sides <= 0 {
        return Err(DiceError::NonPositiveDiceSpec(notation.to_string()));
    }
    if count > i64::from(MAX_DICE_COUNT) || sides > i64::from(MAX_DICE_SIDES) {
        return Err(DiceError::TooManyDice(notation.to_string()));
    }

    Ok(DiceSpec {
        count: u32::try_from(count).map_err(|_| invalid())?,
        sides: u32::try_from(sides).map_err(|_| invalid())?,
    })
}

/// Source of die rolls and percentage checks
pub trait DiceRoller {
    /// Sum of `count` independent uniform rolls in `[1, sides]`
    fn roll(&mut self, sides: u32, count: u32) -> u32;

    /// Percentage check in `[1, 100]`
    fn percent(&mut self) -> u32 {
        self.roll(100, 1)
    }

    /// Roll a single d20
    fn d20(&mut self) -> u32 {
        self.roll(20, 1)
    }
}

fn roll_with<R: Rng + ?Sized>(rng: &mut R, sides: u32, count: u32) -> u32 {
    if sides == 0 {
        return 0;
    }
    (0..count).fold(0u32, |total, _| {
        total.saturating_add(rng.random_range(1..=sides))
    })
}

/// Rolls with the thread-local generator
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRoller;

impl DiceRoller for ThreadRoller {
    fn roll(&mut self, sides: u32, count: u32) -> u32 {
        roll_with(&mut rand::rng(), sides, count)
    }
}

/// Rolls with a seeded generator; the same seed yields the same sequence
#[derive(Debug, Clone)]
pub struct SeededRoller {
    rng: StdRng,
}

impl SeededRoller {
    /// Create a roller from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DiceRoller for SeededRoller {
    fn roll(&mut self, sides: u32, count: u32) -> u32 {
        roll_with(&mut self.rng, sides, count)
    }
}

/// A roller that replays a fixed script of results
///
/// Every request (die roll or percentage check) consumes the next scripted
/// value as its total. Requests are recorded as `(sides, count)` pairs.
///
/// # Panics
///
/// Panics when the script is exhausted and no fallback was set.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoller {
    script: VecDeque<u32>,
    fallback: Option<u32>,
    requests: Vec<(u32, u32)>,
}

impl ScriptedRoller {
    /// Create a roller that returns `values` in order
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            script: values.into_iter().collect(),
            fallback: None,
            requests: Vec::new(),
        }
    }

    /// Value returned once the script runs out
    pub fn with_fallback(mut self, value: u32) -> Self {
        self.fallback = Some(value);
        self
    }

    /// Append more values to the script
    pub fn push(&mut self, values: impl IntoIterator<Item = u32>) {
        self.script.extend(values);
    }

    /// Values not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Every request served so far, as `(sides, count)`
    pub fn requests(&self) -> &[(u32, u32)] {
        &self.requests
    }
}

impl DiceRoller for ScriptedRoller {
    fn roll(&mut self, sides: u32, count: u32) -> u32 {
        self.requests.push((sides, count));
        match self.script.pop_front().or(self.fallback) {
            Some(value) => value,
            None => panic!("scripted roller exhausted on a {count}d{sides} request"),
        }
    }
}
