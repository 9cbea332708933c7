//! Traits the bot uses to look into and drive the emulated game.
//!
//! The emulator host implements these. Everything behind them (memory
//! decoding, the frame loop, raw input injection) lives outside this crate.
//! [`memory::MemoryGame`] is an in-memory implementation for tests and dry
//! runs.

pub mod memory;

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::creature::CreatureSnapshot;

// ── Game vocabulary ────────────────────────────────────────────────

/// Which generation-3 game is running.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameVersion {
    RubySapphire,
    Emerald,
    FireRedLeafGreen,
}

impl GameVersion {
    pub fn is_rs(self) -> bool {
        self == GameVersion::RubySapphire
    }

    pub fn is_emerald(self) -> bool {
        self == GameVersion::Emerald
    }

    /// Ruby, Sapphire or Emerald.
    pub fn is_rse(self) -> bool {
        !self.is_frlg()
    }

    pub fn is_frlg(self) -> bool {
        self == GameVersion::FireRedLeafGreen
    }
}

/// Coarse game phase as reported by the host.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    TitleScreen,
    Overworld,
    BattleStarting,
    Battle,
    BattleEnding,
    StartMenu,
    PartyMenu,
    Summary,
    Other,
}

impl GamePhase {
    /// Whether a battle is starting, running or ending.
    pub fn is_battle(self) -> bool {
        matches!(
            self,
            GamePhase::BattleStarting | GamePhase::Battle | GamePhase::BattleEnding
        )
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
    L,
    R,
}

/// Direction the player avatar is facing.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn button(self) -> Button {
        match self {
            Direction::Up => Button::Up,
            Direction::Down => Button::Down,
            Direction::Left => Button::Left,
            Direction::Right => Button::Right,
        }
    }

    fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// A tile on a named map.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MapLocation {
    pub map: String,
    pub x: i32,
    pub y: i32,
}

impl MapLocation {
    pub fn new(map: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            map: map.into(),
            x,
            y,
        }
    }
}

/// The player's overworld avatar.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlayerAvatar {
    pub location: MapLocation,
    /// Width and height of the current map in tiles.
    pub map_size: (i32, i32),
    pub facing: Direction,
    #[serde(default)]
    pub on_bike: bool,
    /// Accepting movement input (no script, menu or forced move running).
    #[serde(default)]
    pub controllable: bool,
}

impl PlayerAvatar {
    /// The tile the player is looking at, or `None` when that tile lies
    /// outside the current map.
    pub fn facing_tile(&self) -> Option<MapLocation> {
        let (dx, dy) = self.facing.offset();
        let x = self.location.x + dx;
        let y = self.location.y + dy;
        let (width, height) = self.map_size;
        if (0..width).contains(&x) && (0..height).contains(&y) {
            Some(MapLocation::new(self.location.map.clone(), x, y))
        } else {
            None
        }
    }
}

/// The in-cartridge saved game as it was last written.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SaveData {
    /// Map the player saved on.
    pub map: String,
    #[serde(default)]
    pub party: Vec<CreatureSnapshot>,
    /// Item registered to the Select button.
    #[serde(default)]
    pub registered_item: Option<String>,
    #[serde(default)]
    pub flags: BTreeSet<String>,
    #[serde(default)]
    pub vars: BTreeMap<String, u16>,
}

impl SaveData {
    pub fn event_flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// Saved value of an event variable, `0` when unset.
    pub fn event_var(&self, name: &str) -> u16 {
        self.vars.get(name).copied().unwrap_or(0)
    }

    pub fn has_empty_party_slot(&self) -> bool {
        self.party.len() < PARTY_SIZE
    }
}

pub const PARTY_SIZE: usize = 6;

/// The currently active roaming creature.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RoamerState {
    pub personality_value: u32,
    pub species_id: u16,
}

// ── Bridge traits ──────────────────────────────────────────────────

/// Point-in-time queries into emulated state.
///
/// Every call reflects the frame the host last emulated. Wait primitives
/// call these once per frame, so implementations should be cheap.
pub trait GameStateBridge {
    fn game_version(&self) -> GameVersion;
    fn game_phase(&self) -> GamePhase;
    /// Live value of an event variable, `None` if the name is unknown.
    fn event_var(&self, name: &str) -> Option<u16>;
    fn event_flag(&self, name: &str) -> bool;
    fn task_active(&self, name: &str) -> bool;
    fn script_active(&self, name: &str) -> bool;
    fn any_script_active(&self) -> bool;
    fn rng_value(&self) -> u32;
    fn party(&self) -> Vec<CreatureSnapshot>;
    fn player(&self) -> Option<PlayerAvatar>;
    fn save_data(&self) -> Option<SaveData>;
    fn roamer(&self) -> Option<RoamerState>;
    fn species_seen(&self, species_id: u16) -> bool;
    /// Cursor index of whichever menu is open.
    fn menu_cursor(&self) -> Option<u8>;
}

/// Input injection. Calls are fire-and-forget and take effect on the next
/// emulated frame.
pub trait InputSink {
    /// Press a button for a single frame.
    fn press_button(&mut self, button: Button);
    /// Hold a set of buttons until [`release_all`](Self::release_all).
    fn hold_buttons(&mut self, buttons: &[Button]);
    fn release_all(&mut self);
    fn soft_reset(&mut self);
}

pub trait SavestateProvider {
    /// Write an emulator savestate whose file name ends in `suffix`.
    fn create_save_state(&mut self, suffix: &str) -> Result<PathBuf, String>;
}

/// Everything a running mode needs from the host.
pub trait Emulator: GameStateBridge + InputSink + SavestateProvider {}

impl<T: GameStateBridge + InputSink + SavestateProvider> Emulator for T {}

#[cfg(test)]
mod tests {
    use super::*;

    fn avatar(x: i32, y: i32, facing: Direction) -> PlayerAvatar {
        PlayerAvatar {
            location: MapLocation::new("LAVARIDGE_TOWN", x, y),
            map_size: (20, 20),
            facing,
            on_bike: false,
            controllable: true,
        }
    }

    #[test]
    fn facing_tile_stays_on_map() {
        let tile = avatar(4, 8, Direction::Up).facing_tile();
        assert_eq!(tile, Some(MapLocation::new("LAVARIDGE_TOWN", 4, 7)));
    }

    #[test]
    fn facing_tile_off_map_is_none() {
        assert!(avatar(0, 5, Direction::Left).facing_tile().is_none());
        assert!(avatar(5, 19, Direction::Down).facing_tile().is_none());
    }

    #[test]
    fn battle_phases() {
        assert!(GamePhase::BattleStarting.is_battle());
        assert!(GamePhase::BattleEnding.is_battle());
        assert!(!GamePhase::Summary.is_battle());
    }

    #[test]
    fn save_data_defaults() {
        let save = SaveData::default();
        assert_eq!(save.event_var("FOSSIL_RESURRECTION_STATE"), 0);
        assert!(save.has_empty_party_slot());
    }
}
