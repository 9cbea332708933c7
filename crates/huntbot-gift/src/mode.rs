//! The static gift soft-reset loop.

use std::cell::Cell;
use std::rc::Rc;

use huntbot::bridge::{Button, GameVersion, MapLocation, SaveData};
use huntbot::encounter::{ActiveEncounter, EncounterOptions, EncounterType, handle_encounter};
use huntbot::runtime::actions::{open_party_summary, patrol, soft_reset, walk_to};
use huntbot::runtime::wait::{
    event_flag_set, no_script_running, player_controllable, script_start_and_finish,
    task_active, task_inactive, task_start_and_finish, unique_rng_value, until,
};
use huntbot::runtime::{BotMode, BoxedSequence, Defer, Once, RepeatWhile, Script, Sequence, Step};
use huntbot::{BotError, FrameContext, Result};
use tracing::{info, warn};

use crate::targets::{self, GiftTarget};

const HATCH_SPEED_ABILITIES: [&str; 2] = ["Flame Body", "Magma Armor"];

/// Soft-resets in front of a gift NPC until the creature received is worth
/// keeping.
///
/// Eggs (Wynaut, Togepi) are hatched by cycling between two tiles. The host
/// reports the hatch through
/// [`FrameScheduler::notify_egg_hatched`](huntbot::runtime::FrameScheduler::notify_egg_hatched)
/// and the mode judges the hatchling itself. Everything else is judged from
/// the party summary screen.
pub struct StaticGiftResetsMode {
    egg_hatched: Rc<Cell<bool>>,
    script: Option<BoxedSequence>,
}

impl StaticGiftResetsMode {
    pub fn new() -> Self {
        Self {
            egg_hatched: Rc::new(Cell::new(false)),
            script: None,
        }
    }

    /// Whether the player is facing a tile this mode can reset for.
    pub fn is_selectable(cx: &FrameContext<'_>) -> bool {
        targets::targeted_gift(&*cx.game).is_some()
    }
}

impl Default for StaticGiftResetsMode {
    fn default() -> Self {
        Self::new()
    }
}

impl BotMode for StaticGiftResetsMode {
    fn name(&self) -> &str {
        "Static Gift Resets"
    }

    fn start(&mut self, cx: &mut FrameContext<'_>) -> Result<()> {
        let target = check_preconditions(cx)?;
        let version = cx.game.game_version();
        info!("Resetting for {target}");

        let hatched = Rc::clone(&self.egg_hatched);
        let resets = RepeatWhile::new(
            |cx: &mut FrameContext<'_>| cx.bot.is_driving(),
            move |_cx: &mut FrameContext<'_>| {
                Ok(Box::new(attempt(target, version, Rc::clone(&hatched))) as BoxedSequence)
            },
        );
        self.script = Some(Box::new(resets) as BoxedSequence);
        Ok(())
    }

    fn step(&mut self, cx: &mut FrameContext<'_>) -> Result<Step> {
        match self.script.as_mut() {
            Some(script) => script.poll(cx),
            None => Ok(Step::Done),
        }
    }

    fn on_egg_hatched(
        &mut self,
        cx: &mut FrameContext<'_>,
        encounter: &ActiveEncounter,
        party_index: usize,
    ) -> Result<()> {
        // The gift egg was picked up last, so it sits in the last slot. Any
        // other egg the player carried hatching does not count.
        if party_index + 1 != cx.game.party().len() {
            return Ok(());
        }
        handle_encounter(cx, encounter.clone(), gift_options())?;
        // A hatchling worth keeping has already asked for manual control.
        if !encounter.is_of_interest() {
            self.egg_hatched.set(true);
        }
        Ok(())
    }
}

// ── Preconditions ──────────────────────────────────────────────────

fn check_preconditions(cx: &mut FrameContext<'_>) -> Result<GiftTarget> {
    let Some((target, map)) = targets::targeted_gift(&*cx.game) else {
        return Err(BotError::precondition(
            "You are not facing the NPC or tile that gives you the gift encounter.",
        ));
    };

    let Some(save) = cx.game.save_data() else {
        return Err(BotError::precondition(
            "There is no saved game. Cannot soft reset.",
        ));
    };

    if save.map != map {
        return Err(BotError::precondition(
            "The targeted encounter is not in the current map. Cannot soft reset.",
        ));
    }

    let version = cx.game.game_version();

    if target == GiftTarget::Wynaut {
        require_registered(
            &save,
            "Mach Bike",
            "You need to register the Mach Bike for the Select button, then save again.",
        )?;
        if save.event_flag("RECEIVED_LAVARIDGE_EGG") {
            return Err(BotError::precondition(
                "You have already received the Wynaut egg in your saved game.",
            ));
        }
    }

    if version.is_emerald()
        && target.is_egg()
        && !save
            .party
            .iter()
            .any(|c| HATCH_SPEED_ABILITIES.contains(&c.ability.as_str()))
    {
        let message = "None of your Pokémon has the Flame Body / Magma Armor ability. \
                       Hatching will take twice as long this way.";
        warn!("{message}");
        cx.bot.warn(message);
    }

    if target == GiftTarget::Togepi {
        if save.event_flag("GOT_TOGEPI_EGG") {
            return Err(BotError::precondition(
                "You have already received the Togepi egg in your saved game.",
            ));
        }
        require_registered(
            &save,
            "Bicycle",
            "You need to register the Bicycle for the Select button, then save again.",
        )?;
        if save.party.first().is_none_or(|lead| lead.friendship < 255) {
            return Err(BotError::precondition(
                "The first Pokémon in your party in the saved game must have max friendship (255) to receive the egg.",
            ));
        }
    }

    if target.is_fossil() {
        check_fossil_state(cx, &save)?;
    }

    if !save.has_empty_party_slot() {
        return Err(BotError::precondition(
            "This mode requires at least one empty party slot, but your party is full.",
        ));
    }

    Ok(target)
}

fn require_registered(save: &SaveData, item: &str, message: &str) -> Result<()> {
    if save.registered_item.as_deref() == Some(item) {
        Ok(())
    } else {
        Err(BotError::precondition(message))
    }
}

/// The revival state is checked in the saved game and in live memory. Both
/// checks overlap and each combination has its own advice.
fn check_fossil_state(cx: &FrameContext<'_>, save: &SaveData) -> Result<()> {
    let var = targets::fossil_state_var(cx.game.game_version());
    let saved = save.event_var(var);
    let live = cx.game.event_var(var).unwrap_or(0);

    if saved == 0 || live == 0 {
        return Err(BotError::precondition(if live == 0 {
            "You need to first give a Fossil to the Scientist, then re-enter the room, and then save the game before using this mode."
        } else {
            "You need to save the game after giving a Fossil to the Scientist before using this mode."
        }));
    }
    if saved == 1 {
        return Err(BotError::precondition(if live == 1 {
            "The Scientist is not ready yet. Try leaving the room and coming back, then save the game before using this mode."
        } else {
            "You need to save the game before using this mode."
        }));
    }
    Ok(())
}

// ── One attempt ────────────────────────────────────────────────────

/// Reset, receive the gift, and either hatch it or judge it.
fn attempt(target: GiftTarget, version: GameVersion, hatched: Rc<Cell<bool>>) -> Script {
    let message_box = targets::message_box_task(version);
    let frlg = version.is_frlg();
    let hitmon = matches!(target, GiftTarget::Hitmonchan | GiftTarget::Hitmonlee);

    let mut script = Script::new()
        .then(soft_reset(true))
        .then(unique_rng_value())
        .then(task_active(message_box, Some(Button::A)))
        .then(task_inactive(message_box, Some(Button::B)));

    // Accept
    if target.asks_yes_no() {
        if version.is_rse() {
            script.push(task_start_and_finish("Task_HandleYesNoInput", Some(Button::A)));
            script.push(task_start_and_finish("Task_Fanfare", Some(Button::B)));
        } else {
            script.push(task_start_and_finish("Task_YesNoMenu_HandleInput", Some(Button::A)));
            script.push(task_start_and_finish("Task_Fanfare", Some(Button::B)));
            script.push(task_start_and_finish("Task_DrawFieldMessageBox", Some(Button::B)));
        }
    }
    if version.is_rs() && target == GiftTarget::HoennFossils {
        script.push(event_flag_set("RECEIVED_FOSSIL_MON", Some(Button::A)));
    }

    // Decline the nickname
    if frlg && target != GiftTarget::Togepi {
        if hitmon {
            script.push(event_flag_set("GOT_HITMON_FROM_DOJO", Some(Button::B)));
        }
        script.push(task_start_and_finish("Task_YesNoMenu_HandleInput", Some(Button::B)));
    } else if frlg {
        script.push(event_flag_set("GOT_TOGEPI_EGG", Some(Button::B)));
        script.push(script_start_and_finish("Std_MsgboxDefault", Some(Button::B)));
    }
    if version.is_emerald() && target != GiftTarget::Wynaut {
        script.push(task_start_and_finish("Task_DrawFieldMessage", Some(Button::B)));
        script.push(task_start_and_finish("Task_HandleYesNoInput", Some(Button::B)));
    }
    if version.is_rs() && matches!(target, GiftTarget::Beldum | GiftTarget::HoennFossils) {
        script.push(task_start_and_finish("Task_HandleYesNoInput", Some(Button::B)));
    }

    match target {
        GiftTarget::Lapras => {
            script.push(event_flag_set("GOT_LAPRAS_FROM_SILPH", Some(Button::B)));
        }
        GiftTarget::Castform => {
            script.push(event_flag_set("RECEIVED_CASTFORM", Some(Button::B)));
            script.push(no_script_running(Some(Button::B)));
        }
        _ => {}
    }

    match target.hatching_route() {
        Some(route) => {
            script.push(task_inactive("Task_Fanfare", Some(Button::B)));
            script.push(until("egg in party", Some(Button::B), |cx| eggs_in_party(cx) > 0));
            script.push(RepeatWhile::new(
                |cx: &mut FrameContext<'_>| eggs_in_party(cx) > 0,
                move |_cx: &mut FrameContext<'_>| {
                    Ok(Box::new(hatch_egg(route.clone(), Rc::clone(&hatched))) as BoxedSequence)
                },
            ));
        }
        None => {
            script.push(Defer::new(|cx: &mut FrameContext<'_>| {
                let last = cx.game.party().len().saturating_sub(1);
                Ok(Box::new(open_party_summary(last)) as BoxedSequence)
            }));
            script.push(Once::new(judge_gift));
        }
    }
    script
}

fn eggs_in_party(cx: &FrameContext<'_>) -> usize {
    cx.game.party().iter().filter(|c| c.is_egg).count()
}

/// Cycle between the two route tiles on the bike until the gift egg hatches.
fn hatch_egg(
    (a, b): (MapLocation, MapLocation),
    hatched: Rc<Cell<bool>>,
) -> Script {
    let reset = Rc::clone(&hatched);
    Script::new()
        .then(player_controllable(None))
        .then(Once::new(move |_cx: &mut FrameContext<'_>| {
            reset.set(false);
            Ok(())
        }))
        .then(walk_to(a.clone()))
        .then(Once::new(|cx: &mut FrameContext<'_>| {
            if cx.game.player().is_some_and(|p| !p.on_bike) {
                cx.game.press_button(Button::Select);
            }
            Ok(())
        }))
        .then(patrol(a, b, move |_cx| hatched.get()))
}

fn judge_gift(cx: &mut FrameContext<'_>) -> Result<()> {
    let Some(creature) = cx.game.party().pop() else {
        return Err(BotError::Mode("The party is empty after receiving the gift.".into()));
    };
    let encounter = ActiveEncounter::classify(cx, creature, EncounterType::Gift)?;
    handle_encounter(cx, encounter, gift_options())?;
    Ok(())
}

fn gift_options() -> EncounterOptions {
    EncounterOptions {
        disable_auto_catch: true,
        ..Default::default()
    }
}
