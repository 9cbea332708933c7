//! Profile configuration.
//!
//! Each section is an optional JSON file in the profile directory. A missing
//! file means defaults; a malformed one is a [`BotError::Config`].
//!
//! | File | Section |
//! |------|---------|
//! | `battle.json` | [`BattleConfig`] |
//! | `logging.json` | [`LoggingConfig`] |
//! | `catch_block.json` | [`CatchBlockConfig`] (re-read before every block check) |
//! | `notifications.json` | [`NotificationsConfig`] |
//! | `scheduler.json` | [`SchedulerConfig`] |
//!
//! Programmatic use goes through the builder methods:
//!
//! ```ignore
//! let config = Config::default()
//!     .with_auto_catch(true)
//!     .with_block_list(["Zubat"]);
//! ```

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BotError, Result};

// ── Sections ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Throw balls at encounters of interest when a battle is running.
    pub auto_catch: bool,
    /// Fight uninteresting encounters instead of running away.
    pub auto_battle: bool,
}

/// Which encounters get a creature file written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SavePk3Config {
    pub all: bool,
    pub shiny: bool,
    pub custom: bool,
    pub roamer: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub save_pk3: SavePk3Config,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchBlockConfig {
    /// Species names (either the stats name or the plain species name).
    pub block_list: Vec<String>,
}

impl CatchBlockConfig {
    pub fn is_blocked(&self, species_name: &str, stats_name: &str) -> bool {
        self.block_list
            .iter()
            .any(|name| name == species_name || name == stats_name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Shell command run for each notification. Unset means notifications
    /// only go to the log.
    pub command: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Frames a wait primitive may poll before it gives up. `0` disables
    /// the limit.
    pub wait_timeout_frames: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        // Five minutes of emulated time at 60 fps.
        Self {
            wait_timeout_frames: 18_000,
        }
    }
}

// ── Config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Directory the sections were loaded from. `None` for configs built in
    /// code, in which case [`reload_catch_block`](Self::reload_catch_block)
    /// keeps the in-memory list.
    pub profile_dir: Option<PathBuf>,
    pub battle: BattleConfig,
    pub logging: LoggingConfig,
    pub catch_block: CatchBlockConfig,
    pub notifications: NotificationsConfig,
    pub scheduler: SchedulerConfig,
}

impl Config {
    /// Load every section from `profile_dir`.
    pub fn load(profile_dir: &Path) -> Result<Self> {
        let config = Self {
            profile_dir: Some(profile_dir.to_path_buf()),
            battle: load_section(profile_dir, "battle.json")?,
            logging: load_section(profile_dir, "logging.json")?,
            catch_block: load_section(profile_dir, "catch_block.json")?,
            notifications: load_section(profile_dir, "notifications.json")?,
            scheduler: load_section(profile_dir, "scheduler.json")?,
        };
        debug!(
            "Loaded config from {} (auto_catch={}, auto_battle={}, {} blocked)",
            profile_dir.display(),
            config.battle.auto_catch,
            config.battle.auto_battle,
            config.catch_block.block_list.len()
        );
        Ok(config)
    }

    /// Re-read `catch_block.json` so edits made while the bot runs apply to
    /// the next check.
    pub fn reload_catch_block(&mut self) -> Result<&CatchBlockConfig> {
        if let Some(dir) = &self.profile_dir {
            self.catch_block = load_section(dir, "catch_block.json")?;
        }
        Ok(&self.catch_block)
    }

    pub fn with_auto_catch(mut self, enabled: bool) -> Self {
        self.battle.auto_catch = enabled;
        self
    }

    pub fn with_auto_battle(mut self, enabled: bool) -> Self {
        self.battle.auto_battle = enabled;
        self
    }

    pub fn with_save_pk3(mut self, save_pk3: SavePk3Config) -> Self {
        self.logging.save_pk3 = save_pk3;
        self
    }

    pub fn with_block_list<I, S>(mut self, species: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.catch_block.block_list = species.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_notify_command(mut self, command: impl Into<String>) -> Self {
        self.notifications.command = Some(command.into());
        self
    }

    pub fn with_wait_timeout(mut self, frames: u32) -> Self {
        self.scheduler.wait_timeout_frames = frames;
        self
    }
}

/// Read one JSON section, falling back to defaults when the file is absent.
pub(crate) fn load_section<T: DeserializeOwned + Default>(dir: &Path, file: &str) -> Result<T> {
    let path = dir.join(file);
    if !path.exists() {
        return Ok(T::default());
    }
    let data = std::fs::read_to_string(&path)
        .map_err(|e| BotError::Config(format!("failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&data)
        .map_err(|e| BotError::Config(format!("failed to parse {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(!config.battle.auto_catch);
        assert!(config.catch_block.block_list.is_empty());
        assert_eq!(config.scheduler.wait_timeout_frames, 18_000);
        assert!(config.notifications.command.is_none());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("logging.json"),
            r#"{"save_pk3": {"shiny": true}}"#,
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.logging.save_pk3.shiny);
        assert!(!config.logging.save_pk3.all);
    }

    #[test]
    fn malformed_section_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("battle.json"), "{ not json").unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(err, BotError::Config(_)));
        assert!(err.to_string().contains("battle.json"));
    }

    #[test]
    fn reload_picks_up_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catch_block.json");
        std::fs::write(&path, r#"{"block_list": ["Zubat"]}"#).unwrap();
        let mut config = Config::load(dir.path()).unwrap();
        assert!(config.catch_block.is_blocked("Zubat", "Zubat"));

        std::fs::write(&path, r#"{"block_list": []}"#).unwrap();
        assert!(!config.reload_catch_block().unwrap().is_blocked("Zubat", "Zubat"));
    }

    #[test]
    fn in_memory_config_survives_reload() {
        let mut config = Config::default().with_block_list(["Unown (B)"]);
        let list = config.reload_catch_block().unwrap();
        assert!(list.is_blocked("Unown", "Unown (B)"));
        assert!(!list.is_blocked("Unown", "Unown (C)"));
    }

    #[test]
    fn builders_set_fields() {
        let config = Config::default()
            .with_auto_catch(true)
            .with_auto_battle(true)
            .with_notify_command("notify-send")
            .with_wait_timeout(0);
        assert!(config.battle.auto_catch);
        assert!(config.battle.auto_battle);
        assert_eq!(config.notifications.command.as_deref(), Some("notify-send"));
        assert_eq!(config.scheduler.wait_timeout_frames, 0);
    }
}
