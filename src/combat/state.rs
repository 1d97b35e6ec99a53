//! Combat session
//!
//! A [`CombatSession`] runs one fight between a player and a list of NPCs:
//! - rolls initiative when combat starts
//! - tracks whose turn it is and the round number
//! - resolves one turn per [`CombatSession::process_turn`] call
//! - reports when either side has been wiped out
//!
//! Participants are shared handles, so damage dealt in the session is
//! visible to whoever else holds them.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::character::SharedCharacter;
use super::dice::{DiceError, DiceRoller, ThreadRoller};
use super::equipment::ItemCatalog;
use super::initiative::determine_initiative;
use super::notify::{NotifyContext, Notifier};
use super::rules::{CombatContext, CombatRules};
use super::spells::{check_cast, CastError, Spellbook};

/// Errors from running combat
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("error parsing damage dice for {character}: {source}")]
    MalformedDice { character: String, source: DiceError },

    #[error("no combat in progress")]
    NotInCombat,

    #[error("'{0}' is not part of this combat")]
    UnknownParticipant(String),

    #[error("'{0}' is not a player character")]
    NotAPlayer(String),

    #[error("'{0}' is a player character, not an NPC")]
    NotAnNpc(String),

    #[error("participant id '{0}' appears more than once")]
    DuplicateParticipant(String),

    #[error("no combatant named '{0}'")]
    UnknownTarget(String),

    #[error("{0} cannot target themselves")]
    SelfTarget(String),

    #[error("{0} is already defeated")]
    TargetDefeated(String),

    #[error("{0} has no one left to attack")]
    NoTarget(String),

    #[error(transparent)]
    Cast(#[from] CastError),
}

/// A player's turn command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    Pass,
    Attack { target: Option<String> },
    Cast { spell: String, target: Option<String> },
}

impl PlayerAction {
    /// Parse a command
    ///
    /// - `pass`
    /// - `cast <spell> [on <target>]`
    /// - `attack [target]`
    ///
    /// Anything else is an attack on the default target.
    pub fn parse(input: &str) -> Self {
        let words: Vec<&str> = input.split_whitespace().collect();
        let Some((verb, rest)) = words.split_first() else {
            return PlayerAction::Attack { target: None };
        };

        if verb.eq_ignore_ascii_case("pass") && rest.is_empty() {
            PlayerAction::Pass
        } else if verb.eq_ignore_ascii_case("cast") {
            match rest.iter().position(|w| w.eq_ignore_ascii_case("on")) {
                Some(split) => PlayerAction::Cast {
                    spell: rest[..split].join(" "),
                    target: join_nonempty(&rest[split + 1..]),
                },
                None => PlayerAction::Cast {
                    spell: rest.join(" "),
                    target: None,
                },
            }
        } else if verb.eq_ignore_ascii_case("attack") {
            PlayerAction::Attack {
                target: join_nonempty(rest),
            }
        } else {
            PlayerAction::Attack { target: None }
        }
    }
}

fn join_nonempty(words: &[&str]) -> Option<String> {
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// How a combat ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatEnd {
    PlayerDefeated { id: String, name: String },
    NpcsDefeated { names: Vec<String> },
}

impl CombatEnd {
    pub fn player_won(&self) -> bool {
        matches!(self, CombatEnd::NpcsDefeated { .. })
    }
}

impl fmt::Display for CombatEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatEnd::PlayerDefeated { id, name } => {
                write!(f, "Player {} ({}) has been defeated! Combat ends.", name, id)
            }
            CombatEnd::NpcsDefeated { names } => {
                write!(f, "All NPCs ({}) defeated! Combat ends.", names.join(", "))
            }
        }
    }
}

/// A validated player action, ready to resolve
enum Plan {
    Pass,
    Attack(SharedCharacter),
    Cast {
        spell: String,
        target: Option<SharedCharacter>,
    },
}

/// One fight's turn order and progress
pub struct CombatSession<R = ThreadRoller> {
    in_combat: bool,
    participants: Vec<SharedCharacter>,
    turn_order: Vec<String>,
    current_turn_id: Option<String>,
    round: u32,
    rng: R,
    catalog: Arc<ItemCatalog>,
    spellbook: Arc<Spellbook>,
    rules: CombatRules,
}

impl Default for CombatSession {
    fn default() -> Self {
        Self::new(ThreadRoller)
    }
}

impl<R: DiceRoller> CombatSession<R> {
    /// Create an idle session using the built-in catalog and spellbook
    pub fn new(rng: R) -> Self {
        Self {
            in_combat: false,
            participants: Vec::new(),
            turn_order: Vec::new(),
            current_turn_id: None,
            round: 0,
            rng,
            catalog: ItemCatalog::builtin(),
            spellbook: Spellbook::builtin(),
            rules: CombatRules::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<ItemCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_spellbook(mut self, spellbook: Arc<Spellbook>) -> Self {
        self.spellbook = spellbook;
        self
    }

    pub fn with_rules(mut self, rules: CombatRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn is_in_combat(&self) -> bool {
        self.in_combat
    }

    /// Player first, then NPCs in the order given to `start`
    pub fn participants(&self) -> &[SharedCharacter] {
        &self.participants
    }

    pub fn turn_order(&self) -> &[String] {
        &self.turn_order
    }

    pub fn current_turn_id(&self) -> Option<&str> {
        self.current_turn_id.as_deref()
    }

    /// Rounds start at 1 and advance each time the turn order wraps
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn rules(&self) -> &CombatRules {
        &self.rules
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Find a participant by id
    pub fn participant(&self, id: &str) -> Option<&SharedCharacter> {
        self.participants.iter().find(|p| p.borrow().id() == id)
    }

    /// The participant whose turn it is
    pub fn current_actor(&self) -> Option<&SharedCharacter> {
        self.participant(self.current_turn_id.as_deref()?)
    }

    fn context(&mut self) -> CombatContext<'_> {
        CombatContext::new(&mut self.rng, &self.catalog, &self.spellbook, &self.rules)
    }

    /// Begin combat, rolling initiative for everyone
    pub fn start(
        &mut self,
        player: &SharedCharacter,
        npcs: &[SharedCharacter],
    ) -> Result<String, CombatError> {
        {
            let player = player.borrow();
            if !player.is_player() {
                return Err(CombatError::NotAPlayer(player.id().to_string()));
            }
        }

        let participants: Vec<SharedCharacter> = std::iter::once(player)
            .chain(npcs)
            .cloned()
            .collect();

        let mut seen = HashSet::new();
        for (index, participant) in participants.iter().enumerate() {
            let participant = participant.borrow();
            if index > 0 && participant.is_player() {
                return Err(CombatError::NotAnNpc(participant.id().to_string()));
            }
            if !seen.insert(participant.id().to_string()) {
                return Err(CombatError::DuplicateParticipant(participant.id().to_string()));
            }
        }

        if self.in_combat {
            warn!("starting a new combat while one is in progress");
        }

        let turn_order = {
            let borrowed: Vec<_> = participants.iter().map(|p| p.borrow()).collect();
            determine_initiative(borrowed.iter().map(|c| &**c), &mut self.rng)
        };

        self.participants = participants;
        self.turn_order = turn_order;
        self.current_turn_id = self.turn_order.first().cloned();
        self.in_combat = true;
        self.round = 1;

        let names: Vec<String> = self
            .turn_order
            .iter()
            .map(|id| self.name_of(id))
            .collect();
        let first_id = self.current_turn_id.clone().unwrap_or_default();
        info!("combat started: {}", names.join(", "));

        Ok(format!(
            "Combat started! Turn order: {}. First up: {} ({}).",
            names.join(", "),
            self.name_of(&first_id),
            first_id
        ))
    }

    /// Move to the next participant, wrapping to the top of the order
    pub fn advance_turn(&mut self) -> Result<&str, CombatError> {
        let current = self
            .current_turn_id
            .as_deref()
            .ok_or(CombatError::NotInCombat)?;
        let index = self
            .turn_order
            .iter()
            .position(|id| id == current)
            .ok_or_else(|| CombatError::UnknownParticipant(current.to_string()))?;

        let next = (index + 1) % self.turn_order.len();
        if next == 0 {
            self.round += 1;
            debug!("round {} begins", self.round);
        }
        self.current_turn_id = Some(self.turn_order[next].clone());
        Ok(&self.turn_order[next])
    }

    /// Resolve the current participant's turn and advance
    ///
    /// `action` is only read on a player's turn. An invalid player action
    /// is rejected before anything changes. Status effect ticks and NPC
    /// attacks are also sent to `notifier`.
    pub fn process_turn(
        &mut self,
        action: &str,
        notifier: &mut dyn Notifier,
    ) -> Result<String, CombatError> {
        if !self.in_combat {
            return Err(CombatError::NotInCombat);
        }
        let actor_id = self
            .current_turn_id
            .clone()
            .ok_or(CombatError::NotInCombat)?;
        let actor = self
            .participant(&actor_id)
            .cloned()
            .ok_or_else(|| CombatError::UnknownParticipant(actor_id.clone()))?;

        let (is_player, alive_before) = {
            let actor = actor.borrow();
            (actor.is_player(), actor.is_alive())
        };
        let plan = if is_player && alive_before {
            Some(self.plan_player_action(&actor, action)?)
        } else {
            None
        };

        let ticks = actor.borrow_mut().tick_status_effects();
        let ctx = NotifyContext {
            actor_id: &actor_id,
            round: self.round,
        };
        for message in &ticks {
            notifier.notify(ctx, message);
        }

        let alive = actor.borrow().is_alive();
        let own = if !alive {
            let name = self.name_of(&actor_id);
            debug!("{} is down and skips the turn", name);
            format!("{} cannot take further actions this turn.", name)
        } else if let Some(plan) = plan {
            self.resolve_player_action(&actor, plan)?
        } else {
            self.resolve_npc_turn(&actor, notifier)?
        };

        let next_id = self.advance_turn()?.to_string();
        Ok(format!("{}\nNext up: {}.", own, self.name_of(&next_id)))
    }

    /// Check whether either side is wiped out, ending combat if so
    ///
    /// An idle session has nothing to end. An empty NPC list never counts
    /// as defeated.
    pub fn check_end_condition(
        &mut self,
        player: &SharedCharacter,
        npcs: &[SharedCharacter],
    ) -> Option<CombatEnd> {
        if !self.in_combat {
            return None;
        }
        let player_alive = player.borrow().is_alive();
        let end = if !player_alive {
            let player = player.borrow();
            Some(CombatEnd::PlayerDefeated {
                id: player.id().to_string(),
                name: player.name().to_string(),
            })
        } else if !npcs.is_empty() && npcs.iter().all(|npc| !npc.borrow().is_alive()) {
            Some(CombatEnd::NpcsDefeated {
                names: npcs.iter().map(|npc| npc.borrow().name().to_string()).collect(),
            })
        } else {
            None
        };

        if let Some(end) = &end {
            info!("{}", end);
            self.reset();
        }
        end
    }

    /// Drop all combat state
    pub fn reset(&mut self) {
        self.in_combat = false;
        self.participants.clear();
        self.turn_order.clear();
        self.current_turn_id = None;
        self.round = 0;
    }

    fn name_of(&self, id: &str) -> String {
        match self.participant(id) {
            Some(p) => p.borrow().name().to_string(),
            None => id.to_string(),
        }
    }

    /// Match a participant by id or case-insensitive name
    fn find_named(&self, name: &str) -> Result<SharedCharacter, CombatError> {
        self.participants
            .iter()
            .find(|p| {
                let p = p.borrow();
                p.id() == name || p.name().eq_ignore_ascii_case(name)
            })
            .cloned()
            .ok_or_else(|| CombatError::UnknownTarget(name.to_string()))
    }

    fn first_living_npc(&self) -> Option<SharedCharacter> {
        self.turn_order
            .iter()
            .filter_map(|id| self.participant(id))
            .find(|p| {
                let p = p.borrow();
                !p.is_player() && p.is_alive()
            })
            .cloned()
    }

    fn plan_player_action(
        &self,
        actor: &SharedCharacter,
        input: &str,
    ) -> Result<Plan, CombatError> {
        let actor_name = actor.borrow().name().to_string();

        match PlayerAction::parse(input) {
            PlayerAction::Pass => Ok(Plan::Pass),
            PlayerAction::Attack { target: None } => self
                .first_living_npc()
                .map(Plan::Attack)
                .ok_or(CombatError::NoTarget(actor_name)),
            PlayerAction::Attack { target: Some(name) } => {
                let target = self.find_named(&name)?;
                if Rc::ptr_eq(&target, actor) {
                    return Err(CombatError::SelfTarget(actor_name));
                }
                ensure_alive(&target)?;
                Ok(Plan::Attack(target))
            }
            PlayerAction::Cast { spell, target } => {
                let spell = self
                    .spellbook
                    .get(&spell)
                    .ok_or(CastError::UnknownSpell(spell))?;
                let target = match target {
                    Some(name) => {
                        let target = self.find_named(&name)?;
                        ensure_alive(&target)?;
                        (!Rc::ptr_eq(&target, actor)).then_some(target)
                    }
                    None => None,
                };
                check_cast(&actor.borrow(), spell, target.is_some())?;
                Ok(Plan::Cast {
                    spell: spell.name.clone(),
                    target,
                })
            }
        }
    }

    fn resolve_player_action(
        &mut self,
        actor: &SharedCharacter,
        plan: Plan,
    ) -> Result<String, CombatError> {
        match plan {
            Plan::Pass => Ok(format!("{} passes their turn.", actor.borrow().name())),
            Plan::Attack(target) => {
                let attacker = actor.borrow();
                let mut defender = target.borrow_mut();
                let outcome = attacker.attack(&mut defender, &mut self.context())?;
                Ok(outcome.to_string())
            }
            Plan::Cast { spell, target } => {
                let mut caster = actor.borrow_mut();
                match target {
                    Some(target) => {
                        let mut target = target.borrow_mut();
                        caster.cast_spell(&spell, Some(&mut *target), &mut self.context())
                    }
                    None => caster.cast_spell(&spell, None, &mut self.context()),
                }
            }
        }
    }

    fn resolve_npc_turn(
        &mut self,
        actor: &SharedCharacter,
        notifier: &mut dyn Notifier,
    ) -> Result<String, CombatError> {
        let player = self
            .participants
            .first()
            .cloned()
            .ok_or(CombatError::NotInCombat)?;
        let actor_id = actor.borrow().id().to_string();

        if !player.borrow().is_alive() {
            let npc = actor.borrow();
            let player = player.borrow();
            return Ok(format!(
                "{} sees that {} is defeated and finds no one else to fight.",
                npc.name(),
                player.name()
            ));
        }

        let outcome = {
            let npc = actor.borrow();
            let mut target = player.borrow_mut();
            npc.attack(&mut target, &mut self.context())?
        };
        let message = outcome.to_string();
        notifier.notify(
            NotifyContext {
                actor_id: &actor_id,
                round: self.round,
            },
            &message,
        );
        Ok(message)
    }
}

fn ensure_alive(target: &SharedCharacter) -> Result<(), CombatError> {
    let target = target.borrow();
    if target.is_alive() {
        Ok(())
    } else {
        Err(CombatError::TargetDefeated(target.name().to_string()))
    }
}

impl<R> fmt::Debug for CombatSession<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombatSession")
            .field("in_combat", &self.in_combat)
            .field("turn_order", &self.turn_order)
            .field("current_turn_id", &self.current_turn_id)
            .field("round", &self.round)
            .finish_non_exhaustive()
    }
}
