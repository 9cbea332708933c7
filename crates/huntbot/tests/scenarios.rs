//! End-to-end encounter scenarios driven through the scheduler and an
//! in-memory game.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use huntbot::bridge::memory::MemoryGame;
use huntbot::prelude::*;

fn creature(species: &str, personality_value: u32) -> CreatureSnapshot {
    CreatureSnapshot {
        species_id: 25,
        species_name: species.into(),
        species_name_for_stats: String::new(),
        personality_value,
        is_shiny: false,
        gender: None,
        held_item: None,
        ability: "Static".into(),
        nature: "Timid".into(),
        ivs: Ivs::default(),
        shiny_value: 12_345,
        friendship: 70,
        is_egg: false,
        unown_letter: None,
        wurmple_evolution: None,
    }
}

struct Fixture {
    dir: tempfile::TempDir,
    game: MemoryGame,
    bot: BotContext,
    events: Arc<Mutex<Vec<String>>>,
}

/// A profile directory with the given JSON sections written into it.
fn fixture(sections: &[(&str, &str)]) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    for (file, body) in sections {
        std::fs::write(dir.path().join(file), body).unwrap();
    }
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let bot = BotContext::load(dir.path())
        .unwrap()
        .with_event_handler(EventObserver::new(move |event| {
            let label = match event {
                BotEvent::ModeStarted { name } => format!("started {name}"),
                BotEvent::ModeFinished { name } => format!("finished {name}"),
                BotEvent::ModeFailed { name, .. } => format!("failed {name}"),
                BotEvent::SwitchedToManual { .. } => "manual".to_string(),
                BotEvent::EncounterLogged { encounter, .. } => {
                    format!("logged {}", encounter.creature.species_name)
                }
                BotEvent::SavestateCreated { .. } => "savestate".to_string(),
                BotEvent::ArtifactPersisted { .. } => "artifact".to_string(),
                BotEvent::Message(_) | BotEvent::Warning(_) => return,
            };
            sink.lock().unwrap().push(label);
        }));
    Fixture {
        dir,
        game: MemoryGame::new(GameVersion::Emerald),
        bot,
        events,
    }
}

/// A mode that meets one creature and records the decision.
fn encounter_mode(
    snapshot: CreatureSnapshot,
    decision: Rc<Cell<Option<BattleAction>>>,
) -> impl BotMode {
    ScriptedMode::new("Encounter", move || {
        Box::new(Once::new(move |cx: &mut FrameContext<'_>| {
            let encounter = ActiveEncounter::classify(cx, snapshot, EncounterType::Wild)?;
            let action = handle_encounter(cx, encounter, EncounterOptions::default())?;
            decision.set(Some(action));
            Ok(())
        })) as BoxedSequence
    })
}

fn run(fx: &mut Fixture, mode: impl BotMode + 'static) -> AdvanceOutcome {
    let mut scheduler = FrameScheduler::new();
    scheduler.push(mode);
    let outcome = scheduler.advance(&mut fx.game, &mut fx.bot);
    assert!(scheduler.is_manual());
    outcome
}

// ── Scenarios ──

#[test]
fn scenario_a_trash_fights_when_auto_battle_is_on() {
    let mut fx = fixture(&[("battle.json", r#"{"auto_battle": true}"#)]);
    fx.game.phase = GamePhase::Battle;
    let decision = Rc::new(Cell::new(None));

    let outcome = run(&mut fx, encounter_mode(creature("Zigzagoon", 1), decision.clone()));

    assert_eq!(outcome, AdvanceOutcome::ModeFinished("Encounter".into()));
    assert_eq!(decision.get(), Some(BattleAction::Fight));
    assert_eq!(
        fx.bot.last_encounter.as_ref().unwrap().classification,
        EncounterClassification::Trash
    );
    assert!(fx.game.savestates.is_empty());
    assert!(fx.bot.is_driving());
    assert!(fx.bot.message.starts_with("Encountered Zigzagoon, FIGHT!"));

    let log = std::fs::read_to_string(fx.dir.path().join("encounters.jsonl")).unwrap();
    assert_eq!(log.lines().count(), 1);
    assert!(log.contains(r#""action":"Fight""#));
}

#[test]
fn scenario_b_unblocked_shiny_hands_control_to_the_operator() {
    let mut fx = fixture(&[("catch_block.json", r#"{"block_list": ["Zubat"]}"#)]);
    fx.game.phase = GamePhase::Battle;
    let mut shiny = creature("Pikachu", 2);
    shiny.is_shiny = true;
    let decision = Rc::new(Cell::new(None));

    let outcome = run(&mut fx, encounter_mode(shiny, decision.clone()));

    assert_eq!(outcome, AdvanceOutcome::SwitchedToManual);
    assert_eq!(decision.get(), Some(BattleAction::CustomAction));
    assert_eq!(
        fx.bot.last_encounter.as_ref().unwrap().classification,
        EncounterClassification::Shiny
    );
    assert_eq!(fx.game.savestates, vec!["Shiny_Pikachu".to_string()]);
    assert_eq!(
        *fx.events.lock().unwrap(),
        vec![
            "started Encounter",
            "savestate",
            "logged Pikachu",
            "finished Encounter",
            "manual",
        ]
    );
}

#[test]
fn scenario_c_roamer_artifact_follows_the_roamer_toggle() {
    for (toggle, expect_artifact) in [(false, false), (true, true)] {
        let logging = format!(r#"{{"save_pk3": {{"roamer": {toggle}}}}}"#);
        let mut fx = fixture(&[("logging.json", logging.as_str())]);
        let latios = creature("Latios", 0xBEEF);
        fx.game.roamer = Some(RoamerState {
            personality_value: 0xBEEF,
            species_id: latios.species_id,
        });
        let decision = Rc::new(Cell::new(None));

        run(&mut fx, encounter_mode(latios, decision.clone()));

        let last = fx.bot.last_encounter.as_ref().unwrap();
        assert_eq!(last.classification, EncounterClassification::RoamerMatch);
        assert_eq!(last.artifact_path.is_some(), expect_artifact);
        assert_eq!(fx.dir.path().join("pokemon").is_dir(), expect_artifact);
        assert_eq!(decision.get(), Some(BattleAction::CustomAction));
        assert_eq!(fx.game.savestates, vec!["RoamerMatch_Latios".to_string()]);
    }
}

#[test]
fn roamer_seen_before_gets_no_artifact() {
    let mut fx = fixture(&[("logging.json", r#"{"save_pk3": {"roamer": true}}"#)]);
    let latias = creature("Latias", 7);
    fx.game.roamer = Some(RoamerState {
        personality_value: 7,
        species_id: latias.species_id,
    });
    fx.game.seen_species.insert(latias.species_id);

    run(&mut fx, encounter_mode(latias, Rc::new(Cell::new(None))));

    assert!(fx.bot.last_encounter.as_ref().unwrap().artifact_path.is_none());
}

// ── Modes ──

#[test]
fn failed_precondition_never_steps_or_resets() {
    let mut fx = fixture(&[]);
    let stepped = Rc::new(Cell::new(false));
    let flag = stepped.clone();
    let mode = ScriptedMode::new("Resetter", move || {
        Box::new(
            Script::new()
                .then(Once::new(move |_cx: &mut FrameContext<'_>| {
                    flag.set(true);
                    Ok(())
                }))
                .then(actions::soft_reset(true)),
        ) as BoxedSequence
    })
    .with_check(|_cx| Err(BotError::precondition("There is no saved game.")));

    let outcome = run(&mut fx, mode);

    assert_eq!(outcome, AdvanceOutcome::ModeFailed("Resetter".into()));
    assert!(!stepped.get());
    assert_eq!(fx.game.soft_resets, 0);
    assert!(fx.game.presses.is_empty());
    assert_eq!(*fx.events.lock().unwrap(), vec!["failed Resetter"]);
}

#[test]
fn same_creature_twice_is_logged_once() {
    let mut fx = fixture(&[]);
    let mut scheduler = FrameScheduler::new();
    for pv in [10, 10, 11] {
        scheduler.push(encounter_mode(creature("Wurmple", pv), Rc::new(Cell::new(None))));
        scheduler.advance(&mut fx.game, &mut fx.bot);
    }
    let logged = fx
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.starts_with("logged"))
        .count();
    assert_eq!(logged, 2);
}

#[test]
fn wait_gives_up_after_the_configured_budget() {
    let mut fx = fixture(&[("scheduler.json", r#"{"wait_timeout_frames": 3}"#)]);
    let mut scheduler = FrameScheduler::new();
    scheduler.push(ScriptedMode::new("Waiter", || {
        Box::new(wait::event_flag_set("BADGE08_GET", Some(Button::A))) as BoxedSequence
    }));

    let mut outcomes = Vec::new();
    while !scheduler.is_manual() {
        outcomes.push(scheduler.advance(&mut fx.game, &mut fx.bot));
    }

    assert_eq!(
        outcomes.last(),
        Some(&AdvanceOutcome::ModeFailed("Waiter".into()))
    );
    assert_eq!(fx.game.press_count(Button::A), 3);
}
