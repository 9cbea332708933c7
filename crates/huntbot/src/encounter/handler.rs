//! Reactions to a classified encounter.
//!
//! | Classification | Creature file | Notify | Decision in battle | Otherwise |
//! |---|---|---|---|---|
//! | Shiny | `shiny` toggle | yes | Catch if auto-catch, else manual | manual |
//! | CustomFilterMatch | `custom` toggle | yes | Catch if auto-catch, else manual | manual |
//! | RoamerMatch | `roamer` toggle, first sighting only | yes | Catch if auto-catch, else manual | manual |
//! | ShinyBlocked | `shiny` toggle | no | Fight if auto-battle, else run | same |
//! | RoamerBlocked, Trash | never | no | Fight if auto-battle, else run | same |
//!
//! With `save_pk3.all` every logged encounter gets a creature file instead.
//! Encounters worth catching also get a savestate.

use tracing::{debug, info, warn};

use super::{ActiveEncounter, BattleAction, EncounterClassification};
use crate::context::FrameContext;
use crate::creature::{CreatureSnapshot, make_string_safe_for_file_name};
use crate::error::Result;
use crate::events::BotEvent;

/// Per-call overrides of the battle config.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncounterOptions {
    /// Never throw balls, even with `battle.auto_catch` on.
    pub disable_auto_catch: bool,
    /// Fight uninteresting encounters even with `battle.auto_battle` off.
    pub enable_auto_battle: bool,
    /// Log the encounter without the chosen action.
    pub do_not_log_battle_action: bool,
}

/// React to an encounter and decide what to do in battle.
///
/// Side effects: creature files, a notification, a savestate and manual
/// mode for encounters of interest, and exactly one log entry per distinct
/// creature.
pub fn handle_encounter(
    cx: &mut FrameContext<'_>,
    mut encounter: ActiveEncounter,
    options: EncounterOptions,
) -> Result<BattleAction> {
    let classification = encounter.classification;
    let save_pk3 = cx.bot.config.logging.save_pk3.clone();
    let species = encounter.creature.species_name.clone();

    let alert = match classification {
        EncounterClassification::Shiny => {
            info!("Shiny {species} found!");
            if !save_pk3.all && save_pk3.shiny {
                persist_artifact(cx, &mut encounter);
            }
            Some((
                "Shiny found!".to_string(),
                format!("Found a ✨shiny {species}✨! 🥳"),
            ))
        }
        EncounterClassification::CustomFilterMatch => {
            info!(
                "Custom filter triggered for {species}: '{}'",
                encounter.filter_message.as_deref().unwrap_or_default()
            );
            if !save_pk3.all && save_pk3.custom {
                persist_artifact(cx, &mut encounter);
            }
            Some((
                "Custom filter triggered!".to_string(),
                format!("Found a {species} that matched one of your filters."),
            ))
        }
        EncounterClassification::RoamerMatch => {
            info!("Roaming {species} found!");
            let first_sighting = !cx.game.species_seen(encounter.creature.species_id);
            if first_sighting && !save_pk3.all && save_pk3.roamer {
                persist_artifact(cx, &mut encounter);
            }
            Some((
                "Roaming Pokémon found!".to_string(),
                format!("Encountered a roaming {species}."),
            ))
        }
        EncounterClassification::ShinyBlocked => {
            info!("{species} is on the catch block list, skipping encounter...");
            if !save_pk3.all && save_pk3.shiny {
                persist_artifact(cx, &mut encounter);
            }
            None
        }
        EncounterClassification::RoamerBlocked => {
            info!("{species} is on the catch block list, skipping encounter...");
            None
        }
        EncounterClassification::Trash => None,
    };

    if let Some((title, message)) = alert {
        let icon = cx
            .bot
            .profile
            .sprites_dir
            .join("pokemon")
            .join(if encounter.creature.is_shiny {
                "shiny"
            } else {
                "normal"
            })
            .join(format!("{species}.png"));
        cx.bot.notifier.notify(&title, &message, Some(&icon));
    }

    let battle_active = cx.game.game_phase().is_battle();
    let auto_catch = cx.bot.config.battle.auto_catch && !options.disable_auto_catch;
    let auto_battle = cx.bot.config.battle.auto_battle || options.enable_auto_battle;

    let decision = if classification.is_of_interest() {
        let suffix = format!(
            "{}_{}",
            classification.name(),
            make_string_safe_for_file_name(encounter.creature.stats_name())
        );
        match cx.game.create_save_state(&suffix) {
            Ok(path) => cx.bot.emit(&BotEvent::SavestateCreated { path: &path }),
            Err(e) => warn!("Could not create savestate '{suffix}': {e}"),
        }

        if auto_catch && battle_active {
            BattleAction::Catch
        } else {
            cx.bot
                .request_manual_mode(format!("{classification} {species} encountered"));
            BattleAction::CustomAction
        }
    } else if auto_battle {
        BattleAction::Fight
    } else {
        BattleAction::RunAway
    };

    let logged_action = if options.do_not_log_battle_action || !battle_active {
        None
    } else {
        Some(decision)
    };
    log_encounter(cx, encounter, logged_action);

    Ok(decision)
}

/// Record an encounter, unless it is the one logged last.
///
/// Updates the operator message and [`BotContext::last_encounter`].
///
/// [`BotContext::last_encounter`]: crate::BotContext::last_encounter
pub fn log_encounter(
    cx: &mut FrameContext<'_>,
    mut encounter: ActiveEncounter,
    action: Option<BattleAction>,
) {
    if cx
        .bot
        .last_encounter
        .as_ref()
        .is_some_and(|last| last.creature.personality_value == encounter.creature.personality_value)
    {
        debug!(
            "Encounter {:08X} already logged",
            encounter.creature.personality_value
        );
        return;
    }

    if let Err(e) = cx.bot.encounter_log.log_encounter(&encounter, action) {
        warn!("Could not log encounter: {e}");
    }
    if cx.bot.config.logging.save_pk3.all {
        persist_artifact(cx, &mut encounter);
    }

    cx.bot.set_message(encounter_message(&encounter.creature, action));
    cx.bot.plugins.encounter_logged(&encounter, action);
    cx.bot.emit(&BotEvent::EncounterLogged {
        encounter: &encounter,
        action,
    });
    cx.bot.last_encounter = Some(encounter);
}

/// `Encountered <name><action>` followed by a line of fun facts.
pub fn encounter_message(creature: &CreatureSnapshot, action: Option<BattleAction>) -> String {
    let mut facts = vec![
        format!("Nature:\u{a0}{}", creature.nature),
        format!("Ability:\u{a0}{}", creature.ability),
        format!(
            "Item:\u{a0}{}",
            creature.held_item.as_deref().unwrap_or("-")
        ),
        format!("IV\u{a0}sum:\u{a0}{}", creature.ivs.sum()),
        format!("SV:\u{a0}{}", thousands(creature.shiny_value)),
    ];
    if creature.species_name == "Wurmple"
        && let Some(evolution) = &creature.wurmple_evolution
    {
        facts.push(format!("Evo: {}", title_case(evolution)));
    }

    let action = match action {
        Some(BattleAction::Catch) => ", catching...",
        Some(BattleAction::CustomAction) => ", switched to manual mode so you can catch it.",
        Some(BattleAction::Fight) => ", FIGHT!",
        Some(BattleAction::RunAway) => ", running away...",
        None => ".",
    };

    format!(
        "Encountered {}{action}\n\n{}",
        creature.display_name(),
        facts.join(" | ")
    )
}

fn persist_artifact(cx: &mut FrameContext<'_>, encounter: &mut ActiveEncounter) {
    match cx.bot.artifacts.persist(&encounter.creature) {
        Ok(path) => {
            cx.bot.emit(&BotEvent::ArtifactPersisted { path: &path });
            encounter.attach_artifact(path);
        }
        Err(e) => warn!("Could not save {}: {e}", encounter.creature.species_name),
    }
}

fn thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
