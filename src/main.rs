//! skirmish - run a combat encounter to completion

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use skirmish::combat::{Character, CombatError, CombatSession, SeededRoller, TracingNotifier};
use skirmish::{Config, Encounter};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Turn-based combat runner
#[derive(Parser, Debug)]
#[command(name = "skirmish", version, about = "Run a turn-based combat encounter")]
struct Args {
    /// Encounter file (TOML); the built-in demo is used when omitted
    #[arg(short, long)]
    encounter: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dice seed, overriding the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Command the player issues every turn, overriding the encounter
    #[arg(long)]
    action: Option<String>,

    /// Print a JSON summary instead of the combat log
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct CombatantSummary {
    id: String,
    name: String,
    hp: u32,
    max_hp: u32,
    effects: Vec<String>,
}

impl CombatantSummary {
    fn of(c: &Character) -> Self {
        Self {
            id: c.id().to_string(),
            name: c.name().to_string(),
            hp: c.current_hp(),
            max_hp: c.max_hp(),
            effects: c.status_effects().iter().map(|e| e.name.clone()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    rounds: u32,
    /// Final message, or why the fight was cut short
    outcome: String,
    player_won: Option<bool>,
    combatants: Vec<CombatantSummary>,
    log: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref()).context("failed to load configuration")?;

    // Initialize tracing; combat output owns stdout
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter.as_str().into());
    let json_layer = config
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!config.log_json)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    let encounter = match &args.encounter {
        Some(path) => Encounter::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => Encounter::demo(),
    };
    let action = args.action.clone().unwrap_or_else(|| encounter.player_action.clone());
    let seed = args.seed.or(config.seed).unwrap_or_else(rand::random);
    info!("using dice seed {}", seed);

    let summary = run(&config, &encounter, &action, seed)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for entry in &summary.log {
            println!("{}", entry);
        }
        println!("{}", summary.outcome);
    }

    Ok(())
}

fn run(config: &Config, encounter: &Encounter, action: &str, seed: u64) -> Result<Summary> {
    let catalog = config.catalog();
    let (player, npcs) = encounter.build(&catalog)?;

    let mut session = CombatSession::new(SeededRoller::new(seed))
        .with_catalog(catalog)
        .with_rules(config.rules.clone());
    let mut notifier = TracingNotifier;
    let mut log = vec![session.start(&player, &npcs)?];
    let mut rounds = session.round();

    let end = loop {
        if let Some(end) = session.check_end_condition(&player, &npcs) {
            break Some(end);
        }
        if session.round() > config.max_rounds {
            warn!("no winner after {} rounds", config.max_rounds);
            break None;
        }
        rounds = session.round();

        let is_player_turn = session
            .current_actor()
            .map(|actor| actor.borrow().is_player())
            .unwrap_or(false);
        let action = if is_player_turn { action } else { "" };

        let text = match session.process_turn(action, &mut notifier) {
            Ok(text) => text,
            Err(err @ CombatError::MalformedDice { .. }) => return Err(err.into()),
            Err(err) => {
                warn!("player action '{}' rejected: {}; attacking instead", action, err);
                session.process_turn("attack", &mut notifier)?
            }
        };
        log.push(text);
    };

    let outcome = match &end {
        Some(end) => end.to_string(),
        None => format!("The fight is called off after {} rounds.", config.max_rounds),
    };

    Ok(Summary {
        seed,
        rounds,
        outcome,
        player_won: end.as_ref().map(|end| end.player_won()),
        combatants: std::iter::once(&player)
            .chain(&npcs)
            .map(|c| CombatantSummary::of(&c.borrow()))
            .collect(),
        log,
    })
}
