//! Encounter judging and reactions.
//!
//! A freshly observed creature goes through [`classify`] (one verdict from a
//! closed set) and then [`handle_encounter`], which persists artifacts,
//! notifies the operator, picks a battle action and logs the encounter once.

pub mod classify;
pub mod filter;
pub mod handler;

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::FrameContext;
use crate::creature::CreatureSnapshot;
use crate::error::Result;

pub use classify::classify;
pub use filter::{EncounterFilter, FilterVerdict, NoopFilter, RuleFilter};
pub use handler::{EncounterOptions, handle_encounter};

/// How the creature was met.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncounterType {
    Wild,
    Gift,
    Hatched,
    Static,
    Roamer,
    Fishing,
}

/// Verdict on an encounter. Exactly one per encounter.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncounterClassification {
    Shiny,
    ShinyBlocked,
    RoamerMatch,
    RoamerBlocked,
    CustomFilterMatch,
    Trash,
}

impl EncounterClassification {
    /// Whether the operator wants this creature.
    pub fn is_of_interest(self) -> bool {
        matches!(
            self,
            EncounterClassification::Shiny
                | EncounterClassification::CustomFilterMatch
                | EncounterClassification::RoamerMatch
        )
    }

    /// Stable name, used in savestate file names.
    pub fn name(self) -> &'static str {
        match self {
            EncounterClassification::Shiny => "Shiny",
            EncounterClassification::ShinyBlocked => "ShinyBlocked",
            EncounterClassification::RoamerMatch => "RoamerMatch",
            EncounterClassification::RoamerBlocked => "RoamerBlocked",
            EncounterClassification::CustomFilterMatch => "CustomFilterMatch",
            EncounterClassification::Trash => "Trash",
        }
    }
}

impl fmt::Display for EncounterClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the bot does about an encounter.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattleAction {
    Catch,
    /// Hand control to the operator.
    CustomAction,
    Fight,
    RunAway,
}

/// A classified encounter.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ActiveEncounter {
    pub creature: CreatureSnapshot,
    pub encountered_at: DateTime<Utc>,
    pub trigger: EncounterType,
    pub classification: EncounterClassification,
    /// Message of the custom filter or plugin that matched.
    pub filter_message: Option<String>,
    /// Creature file written for this encounter, if any.
    pub artifact_path: Option<PathBuf>,
}

impl ActiveEncounter {
    /// Classify `creature` and stamp the result with the current time.
    pub fn classify(
        cx: &mut FrameContext<'_>,
        creature: CreatureSnapshot,
        trigger: EncounterType,
    ) -> Result<Self> {
        let (classification, filter_message) = classify::judge(cx, &creature)?;
        Ok(Self {
            creature,
            encountered_at: Utc::now(),
            trigger,
            classification,
            filter_message,
            artifact_path: None,
        })
    }

    pub fn is_of_interest(&self) -> bool {
        self.classification.is_of_interest()
    }

    pub fn attach_artifact(&mut self, path: PathBuf) {
        self.artifact_path = Some(path);
    }
}
