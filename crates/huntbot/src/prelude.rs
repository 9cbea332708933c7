//! Convenience re-exports for writing modes and hosts.
//!
//! ```ignore
//! use huntbot::prelude::*;
//! ```

// ── Bridge ──────────────────────────────────────────────────────────
pub use crate::bridge::{
    Button, Direction, Emulator, GamePhase, GameStateBridge, GameVersion, InputSink, MapLocation,
    PlayerAvatar, RoamerState, SaveData, SavestateProvider,
};

// ── Context, config, errors ─────────────────────────────────────────
pub use crate::config::Config;
pub use crate::creature::{CreatureSnapshot, Gender, Ivs};
pub use crate::{BotContext, BotError, FrameContext, Profile, Result};

// ── Encounters ──────────────────────────────────────────────────────
pub use crate::encounter::{
    ActiveEncounter, BattleAction, EncounterClassification, EncounterFilter, EncounterOptions,
    EncounterType, FilterVerdict, classify, handle_encounter,
};

// ── Events and plugins ──────────────────────────────────────────────
pub use crate::events::{
    BotEvent, CompositeEventHandler, EventHandler, EventObserver, EventResponse, FnEventHandler,
    LoggingHandler, NoopHandler,
};
pub use crate::plugins::BotPlugin;

// ── Runtime ─────────────────────────────────────────────────────────
pub use crate::runtime::{
    AdvanceOutcome, BotMode, BoxedSequence, Defer, FrameScheduler, Frames, Once, RepeatWhile,
    Script, ScriptedMode, Sequence, Step, Suspension, actions, wait,
};
