//! Operator CLI for huntbot profiles.
//!
//! # Examples
//!
//! ```sh
//! # How would the profile judge this creature during a battle?
//! huntbot judge --profile profiles/emerald --creature beldum.json --battle
//!
//! # Same, with an active roamer (personality value : species id)
//! huntbot judge --profile profiles/emerald --creature latios.json --roamer 0x1A2B3C4D:381
//!
//! # Validate custom_catch_filters.json
//! huntbot check-filters --profile profiles/emerald
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use huntbot::bridge::memory::MemoryGame;
use huntbot::encounter::filter::{FILTER_FILE, RuleFilter};
use huntbot::notify::LogNotifier;
use huntbot::prelude::*;
use huntbot::stats::{ArtifactStore, EncounterLog};
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "huntbot", version, about = "Encounter judging and scripted modes for emulated games")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a creature snapshot and print the decision, without touching
    /// the profile's logs or creature files.
    Judge {
        /// Profile directory.
        #[arg(long)]
        profile: PathBuf,

        /// Creature snapshot (JSON).
        #[arg(long)]
        creature: PathBuf,

        /// Active roamer as `PERSONALITY_VALUE:SPECIES_ID`. Accepts decimal
        /// or `0x` hex for the personality value.
        #[arg(long, value_parser = parse_roamer)]
        roamer: Option<RoamerState>,

        /// Pretend a battle is running.
        #[arg(long)]
        battle: bool,

        /// Judge as a gift: never auto-catch.
        #[arg(long)]
        no_auto_catch: bool,

        /// Game the snapshot comes from.
        #[arg(long, value_parser = parse_version, default_value = "emerald")]
        game: GameVersion,
    },
    /// Load and validate the profile's custom catch filter.
    CheckFilters {
        /// Profile directory.
        #[arg(long)]
        profile: PathBuf,
    },
}

fn parse_roamer(value: &str) -> std::result::Result<RoamerState, String> {
    let (pv, species) = value
        .split_once(':')
        .ok_or_else(|| format!("expected PV:SPECIES_ID, got '{value}'"))?;
    let personality_value = match pv.strip_prefix("0x").or_else(|| pv.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => pv.parse(),
    }
    .map_err(|e| format!("invalid personality value '{pv}': {e}"))?;
    let species_id = species
        .parse()
        .map_err(|e| format!("invalid species id '{species}': {e}"))?;
    Ok(RoamerState {
        personality_value,
        species_id,
    })
}

fn parse_version(value: &str) -> std::result::Result<GameVersion, String> {
    match value.to_ascii_lowercase().as_str() {
        "rs" | "ruby" | "sapphire" => Ok(GameVersion::RubySapphire),
        "e" | "emerald" => Ok(GameVersion::Emerald),
        "frlg" | "firered" | "leafgreen" => Ok(GameVersion::FireRedLeafGreen),
        other => Err(format!("unknown game '{other}' (expected rs, emerald or frlg)")),
    }
}

/// Swallows log entries during a dry run.
struct DiscardLog;

impl EncounterLog for DiscardLog {
    fn log_encounter(
        &mut self,
        _encounter: &ActiveEncounter,
        _action: Option<BattleAction>,
    ) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Reports where a creature file would have gone during a dry run.
struct DiscardArtifacts;

impl ArtifactStore for DiscardArtifacts {
    fn persist(&mut self, creature: &CreatureSnapshot) -> std::result::Result<PathBuf, String> {
        Ok(PathBuf::from(huntbot::stats::JsonArtifactStore::file_name(
            creature,
        )))
    }
}

fn judge(
    profile: &Path,
    creature: &Path,
    roamer: Option<RoamerState>,
    battle: bool,
    no_auto_catch: bool,
    game_version: GameVersion,
) -> huntbot::Result<()> {
    let data = std::fs::read_to_string(creature).map_err(|e| {
        BotError::Config(format!("failed to read {}: {e}", creature.display()))
    })?;
    let snapshot: CreatureSnapshot = serde_json::from_str(&data).map_err(|e| {
        BotError::Config(format!("failed to parse {}: {e}", creature.display()))
    })?;

    let mut bot = BotContext::load(profile)?
        .with_notifier(LogNotifier)
        .with_encounter_log(DiscardLog)
        .with_artifact_store(DiscardArtifacts)
        .with_event_handler(LoggingHandler);

    let mut game = MemoryGame::new(game_version);
    game.roamer = roamer;
    game.phase = if battle {
        GamePhase::Battle
    } else {
        GamePhase::Overworld
    };

    let mut cx = FrameContext::new(&mut game, &mut bot);
    let encounter = ActiveEncounter::classify(&mut cx, snapshot, EncounterType::Wild)?;
    let classification = encounter.classification;
    let filter_message = encounter.filter_message.clone();
    let action = handle_encounter(
        &mut cx,
        encounter,
        EncounterOptions {
            disable_auto_catch: no_auto_catch,
            ..Default::default()
        },
    )?;

    println!("classification: {classification}");
    if let Some(message) = filter_message {
        println!("filter:         {message}");
    }
    println!("decision:       {action:?}");
    println!("manual mode:    {}", if bot.is_driving() { "no" } else { "yes" });
    for suffix in &game.savestates {
        println!("savestate:      {suffix}");
    }
    println!();
    println!("{}", bot.message);
    Ok(())
}

fn check_filters(profile: &Path) -> huntbot::Result<()> {
    let path = profile.join(FILTER_FILE);
    if !path.is_file() {
        println!("{} not found, the no-op filter will be used", path.display());
        return Ok(());
    }
    let filter = RuleFilter::load(&path)?;
    println!("{}: {} rule(s) OK", path.display(), filter.rules.len());
    for (index, rule) in filter.rules.iter().enumerate() {
        let label = rule.message.as_deref().unwrap_or("(no message)");
        println!("  #{} {label}", index + 1);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Command::Judge {
            profile,
            creature,
            roamer,
            battle,
            no_auto_catch,
            game,
        } => judge(&profile, &creature, roamer, battle, no_auto_catch, game),
        Command::CheckFilters { profile } => check_filters(&profile),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
