//! Encounter classification.
//!
//! Checks run in a fixed order and the first that applies decides:
//!
//! 1. shiny (blocked or not)
//! 2. custom filter, then plugins
//! 3. active roamer with the same personality value and species (blocked or not)
//! 4. everything else is trash
//!
//! The block list is re-read from the profile right before it is consulted.

use tracing::debug;

use super::EncounterClassification;
use super::filter::FilterVerdict;
use crate::context::FrameContext;
use crate::creature::CreatureSnapshot;
use crate::error::{BotError, Result};

/// Classify a creature.
pub fn classify(
    cx: &mut FrameContext<'_>,
    creature: &CreatureSnapshot,
) -> Result<EncounterClassification> {
    judge(cx, creature).map(|(classification, _)| classification)
}

/// Classify a creature and return the filter message when a custom filter
/// or plugin matched.
pub fn judge(
    cx: &mut FrameContext<'_>,
    creature: &CreatureSnapshot,
) -> Result<(EncounterClassification, Option<String>)> {
    if creature.is_shiny {
        let classification = if is_blocked(cx, creature)? {
            EncounterClassification::ShinyBlocked
        } else {
            EncounterClassification::Shiny
        };
        return Ok((classification, None));
    }

    let verdict = run_custom_filters(cx, creature)?;
    if let Some(message) = verdict.message() {
        debug!(
            "Custom filter matched {}: {message}",
            creature.species_name
        );
        return Ok((EncounterClassification::CustomFilterMatch, Some(message)));
    }

    if let Some(roamer) = cx.game.roamer()
        && roamer.personality_value == creature.personality_value
        && roamer.species_id == creature.species_id
    {
        let classification = if is_blocked(cx, creature)? {
            EncounterClassification::RoamerBlocked
        } else {
            EncounterClassification::RoamerMatch
        };
        return Ok((classification, None));
    }

    Ok((EncounterClassification::Trash, None))
}

/// The profile's custom filter, falling back to the plugins when it does
/// not match.
pub fn run_custom_filters(
    cx: &mut FrameContext<'_>,
    creature: &CreatureSnapshot,
) -> Result<FilterVerdict> {
    let verdict = cx
        .bot
        .filter
        .evaluate(creature)
        .map_err(BotError::ClassificationFailure)?;
    if verdict.is_match() {
        return Ok(verdict);
    }
    cx.bot.plugins.judge_encounter(creature)
}

fn is_blocked(cx: &mut FrameContext<'_>, creature: &CreatureSnapshot) -> Result<bool> {
    let block_list = cx.bot.config.reload_catch_block()?;
    Ok(block_list.is_blocked(&creature.species_name, creature.stats_name()))
}
