//! Encounter log and creature artifacts.
//!
//! Both sinks are append-only and best-effort: the encounter handler logs
//! their failures and carries on.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::creature::{CreatureSnapshot, make_string_safe_for_file_name};
use crate::encounter::{ActiveEncounter, BattleAction};

// ── Encounter log ──────────────────────────────────────────────────

pub trait EncounterLog {
    fn log_encounter(
        &mut self,
        encounter: &ActiveEncounter,
        action: Option<BattleAction>,
    ) -> Result<(), String>;
}

#[derive(Serialize)]
struct LogLine<'a> {
    timestamp: String,
    species_id: u16,
    species: &'a str,
    personality_value: u32,
    shiny: bool,
    shiny_value: u32,
    iv_sum: u16,
    trigger: crate::encounter::EncounterType,
    classification: crate::encounter::EncounterClassification,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter_message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<BattleAction>,
}

/// One JSON object per line.
pub struct JsonlEncounterLog {
    path: PathBuf,
}

impl JsonlEncounterLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EncounterLog for JsonlEncounterLog {
    fn log_encounter(
        &mut self,
        encounter: &ActiveEncounter,
        action: Option<BattleAction>,
    ) -> Result<(), String> {
        let creature = &encounter.creature;
        let line = LogLine {
            timestamp: encounter.encountered_at.to_rfc3339(),
            species_id: creature.species_id,
            species: creature.stats_name(),
            personality_value: creature.personality_value,
            shiny: creature.is_shiny,
            shiny_value: creature.shiny_value,
            iv_sum: creature.ivs.sum(),
            trigger: encounter.trigger,
            classification: encounter.classification,
            filter_message: encounter.filter_message.as_deref(),
            action,
        };
        let json = serde_json::to_string(&line)
            .map_err(|e| format!("failed to serialize encounter: {e}"))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| format!("failed to open {}: {e}", self.path.display()))?;
        writeln!(file, "{json}").map_err(|e| format!("failed to append encounter: {e}"))?;
        Ok(())
    }
}

// ── Artifacts ──────────────────────────────────────────────────────

pub trait ArtifactStore {
    /// Write a file describing `creature` and return its path.
    fn persist(&mut self, creature: &CreatureSnapshot) -> Result<PathBuf, String>;
}

/// Writes a pretty-printed JSON snapshot per creature.
pub struct JsonArtifactStore {
    dir: PathBuf,
}

impl JsonArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `025 ★ - Pikachu - Timid [142] - 1A2B3C4D.json`
    pub fn file_name(creature: &CreatureSnapshot) -> String {
        let star = if creature.is_shiny { " ★" } else { "" };
        format!(
            "{:03}{star} - {} - {} [{}] - {:08X}.json",
            creature.species_id,
            make_string_safe_for_file_name(creature.stats_name()),
            make_string_safe_for_file_name(&creature.nature),
            creature.ivs.sum(),
            creature.personality_value
        )
    }
}

impl ArtifactStore for JsonArtifactStore {
    fn persist(&mut self, creature: &CreatureSnapshot) -> Result<PathBuf, String> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| format!("failed to create {}: {e}", self.dir.display()))?;
        let path = self.dir.join(Self::file_name(creature));
        let data = serde_json::to_string_pretty(creature)
            .map_err(|e| format!("failed to serialize creature: {e}"))?;
        std::fs::write(&path, data).map_err(|e| format!("failed to write creature: {e}"))?;
        debug!("Saved {} to {}", creature.species_name, path.display());
        Ok(path)
    }
}
