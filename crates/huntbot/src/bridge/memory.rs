//! In-memory game double.
//!
//! State is plain public fields that tests (or a dry-run driver) edit between
//! frames. Inputs are recorded instead of injected.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use super::{
    Button, GamePhase, GameStateBridge, GameVersion, InputSink, PlayerAvatar, RoamerState,
    SaveData, SavestateProvider,
};
use crate::creature::CreatureSnapshot;

#[derive(Debug, Clone)]
pub struct MemoryGame {
    pub version: GameVersion,
    pub phase: GamePhase,
    pub vars: BTreeMap<String, u16>,
    pub flags: BTreeSet<String>,
    pub active_tasks: BTreeSet<String>,
    pub active_scripts: BTreeSet<String>,
    pub rng: u32,
    pub party: Vec<CreatureSnapshot>,
    pub player: Option<PlayerAvatar>,
    pub save: Option<SaveData>,
    pub roamer: Option<RoamerState>,
    pub seen_species: BTreeSet<u16>,
    pub menu_cursor: Option<u8>,

    /// Every single-frame press, in order.
    pub presses: Vec<Button>,
    /// Buttons currently held.
    pub held: Vec<Button>,
    pub soft_resets: u32,
    /// Suffixes of every savestate written.
    pub savestates: Vec<String>,
    /// Make `create_save_state` fail.
    pub fail_savestates: bool,
}

impl MemoryGame {
    pub fn new(version: GameVersion) -> Self {
        Self {
            version,
            phase: GamePhase::Overworld,
            vars: BTreeMap::new(),
            flags: BTreeSet::new(),
            active_tasks: BTreeSet::new(),
            active_scripts: BTreeSet::new(),
            rng: 0,
            party: Vec::new(),
            player: None,
            save: None,
            roamer: None,
            seen_species: BTreeSet::new(),
            menu_cursor: None,
            presses: Vec::new(),
            held: Vec::new(),
            soft_resets: 0,
            savestates: Vec::new(),
            fail_savestates: false,
        }
    }

    pub fn set_task(&mut self, name: &str, active: bool) {
        if active {
            self.active_tasks.insert(name.to_string());
        } else {
            self.active_tasks.remove(name);
        }
    }

    pub fn set_flag(&mut self, name: &str) {
        self.flags.insert(name.to_string());
    }

    /// Number of times `button` was pressed.
    pub fn press_count(&self, button: Button) -> usize {
        self.presses.iter().filter(|b| **b == button).count()
    }
}

impl GameStateBridge for MemoryGame {
    fn game_version(&self) -> GameVersion {
        self.version
    }

    fn game_phase(&self) -> GamePhase {
        self.phase
    }

    fn event_var(&self, name: &str) -> Option<u16> {
        self.vars.get(name).copied()
    }

    fn event_flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    fn task_active(&self, name: &str) -> bool {
        self.active_tasks.contains(name)
    }

    fn script_active(&self, name: &str) -> bool {
        self.active_scripts.contains(name)
    }

    fn any_script_active(&self) -> bool {
        !self.active_scripts.is_empty()
    }

    fn rng_value(&self) -> u32 {
        self.rng
    }

    fn party(&self) -> Vec<CreatureSnapshot> {
        self.party.clone()
    }

    fn player(&self) -> Option<PlayerAvatar> {
        self.player.clone()
    }

    fn save_data(&self) -> Option<SaveData> {
        self.save.clone()
    }

    fn roamer(&self) -> Option<RoamerState> {
        self.roamer.clone()
    }

    fn species_seen(&self, species_id: u16) -> bool {
        self.seen_species.contains(&species_id)
    }

    fn menu_cursor(&self) -> Option<u8> {
        self.menu_cursor
    }
}

impl InputSink for MemoryGame {
    fn press_button(&mut self, button: Button) {
        self.presses.push(button);
    }

    fn hold_buttons(&mut self, buttons: &[Button]) {
        self.held = buttons.to_vec();
    }

    fn release_all(&mut self) {
        self.held.clear();
    }

    fn soft_reset(&mut self) {
        self.soft_resets += 1;
        self.phase = GamePhase::TitleScreen;
        self.held.clear();
    }
}

impl SavestateProvider for MemoryGame {
    fn create_save_state(&mut self, suffix: &str) -> Result<PathBuf, String> {
        if self.fail_savestates {
            return Err("savestate slot unavailable".into());
        }
        self.savestates.push(suffix.to_string());
        Ok(PathBuf::from(format!("states/{suffix}.ss1")))
    }
}
