//! Process-wide bot state and the per-frame context handed to modes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bridge::Emulator;
use crate::config::{Config, load_section};
use crate::encounter::filter::{self, EncounterFilter};
use crate::encounter::ActiveEncounter;
use crate::error::Result;
use crate::events::{BotEvent, CompositeEventHandler, EventHandler, EventResponse};
use crate::notify::{self, Notifier};
use crate::plugins::{BotPlugin, PluginHost};
use crate::stats::{ArtifactStore, EncounterLog, JsonArtifactStore, JsonlEncounterLog};

// ── Profile ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ProfileFile {
    name: Option<String>,
    sprites_dir: Option<PathBuf>,
}

/// The directory a bot run reads its configuration from and writes its
/// logs, savestates and creature files into.
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub path: PathBuf,
    pub sprites_dir: PathBuf,
}

impl Profile {
    /// Load `profile.json` from `path` if present. The name defaults to the
    /// directory name and sprites to `<path>/sprites`.
    pub fn load(path: &Path) -> Result<Self> {
        let file: ProfileFile = load_section(path, "profile.json")?;
        let name = file.name.unwrap_or_else(|| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "default".to_string())
        });
        let sprites_dir = match file.sprites_dir {
            Some(dir) if dir.is_relative() => path.join(dir),
            Some(dir) => dir,
            None => path.join("sprites"),
        };
        debug!("Loaded profile '{name}' from {}", path.display());
        Ok(Self {
            name,
            path: path.to_path_buf(),
            sprites_dir,
        })
    }

    pub fn encounter_log_path(&self) -> PathBuf {
        self.path.join("encounters.jsonl")
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.path.join("pokemon")
    }
}

// ── BotContext ─────────────────────────────────────────────────────

/// State shared by every mode for the lifetime of the process.
///
/// Created once at startup and passed explicitly to the scheduler, which
/// lends it to the running mode through [`FrameContext`].
pub struct BotContext {
    pub profile: Profile,
    pub config: Config,
    /// Custom catch filter, resolved once from the profile.
    pub filter: Box<dyn EncounterFilter>,
    pub plugins: PluginHost,
    pub events: CompositeEventHandler,
    pub notifier: Box<dyn Notifier>,
    pub encounter_log: Box<dyn EncounterLog>,
    pub artifacts: Box<dyn ArtifactStore>,
    /// Most recently logged encounter.
    pub last_encounter: Option<ActiveEncounter>,
    /// Operator-facing status line.
    pub message: String,
    seen_rng_values: HashSet<u32>,
    manual_request: Option<String>,
}

impl BotContext {
    /// Build a context for `profile` with the default sinks: a JSONL
    /// encounter log and JSON creature files inside the profile directory,
    /// and the notifier configured in `notifications.json`.
    pub fn new(profile: Profile, config: Config) -> Result<Self> {
        let filter = filter::resolve_filter(&profile.path)?;
        let notifier = notify::from_config(&config.notifications);
        let encounter_log = Box::new(JsonlEncounterLog::new(profile.encounter_log_path()));
        let artifacts = Box::new(JsonArtifactStore::new(profile.artifacts_dir()));
        info!("Bot context ready for profile '{}'", profile.name);
        Ok(Self {
            profile,
            config,
            filter,
            plugins: PluginHost::new(),
            events: CompositeEventHandler::new(),
            notifier,
            encounter_log,
            artifacts,
            last_encounter: None,
            message: String::new(),
            seen_rng_values: HashSet::new(),
            manual_request: None,
        })
    }

    /// Load profile and config from `path` and build a context.
    pub fn load(path: &Path) -> Result<Self> {
        let profile = Profile::load(path)?;
        let config = Config::load(path)?;
        Self::new(profile, config)
    }

    pub fn with_filter(mut self, filter: impl EncounterFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn with_plugin(mut self, plugin: impl BotPlugin + 'static) -> Self {
        self.plugins.register(plugin);
        self
    }

    pub fn with_event_handler(mut self, handler: impl EventHandler + 'static) -> Self {
        self.events = std::mem::take(&mut self.events).with(handler);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_encounter_log(mut self, log: impl EncounterLog + 'static) -> Self {
        self.encounter_log = Box::new(log);
        self
    }

    pub fn with_artifact_store(mut self, store: impl ArtifactStore + 'static) -> Self {
        self.artifacts = Box::new(store);
        self
    }

    /// Dispatch an event. A handler answering with
    /// [`EventResponse::SwitchToManual`] requests manual control.
    pub fn emit(&mut self, event: &BotEvent<'_>) {
        if let Some(EventResponse::SwitchToManual(reason)) = self.events.on_event(event) {
            self.request_manual_mode(reason);
        }
    }

    /// Set the operator message and announce it.
    pub fn set_message(&mut self, message: String) {
        self.emit(&BotEvent::Message(&message));
        self.message = message;
    }

    pub fn warn(&mut self, message: &str) {
        self.emit(&BotEvent::Warning(message));
    }

    /// Ask the scheduler to hand control to the operator after the current
    /// step. The first request wins.
    pub fn request_manual_mode(&mut self, reason: impl Into<String>) {
        if self.manual_request.is_none() {
            self.manual_request = Some(reason.into());
        }
    }

    /// `false` once manual control has been requested. Mode loops check
    /// this at the top of every iteration.
    pub fn is_driving(&self) -> bool {
        self.manual_request.is_none()
    }

    pub(crate) fn take_manual_request(&mut self) -> Option<String> {
        self.manual_request.take()
    }

    /// Record an RNG value. Returns `false` if it was seen before.
    pub fn remember_rng_value(&mut self, value: u32) -> bool {
        self.seen_rng_values.insert(value)
    }
}

// ── FrameContext ───────────────────────────────────────────────────

/// What a mode gets to work with during one frame.
pub struct FrameContext<'a> {
    pub game: &'a mut dyn Emulator,
    pub bot: &'a mut BotContext,
}

impl<'a> FrameContext<'a> {
    pub fn new(game: &'a mut dyn Emulator, bot: &'a mut BotContext) -> Self {
        Self { game, bot }
    }

    /// Frame budget for a single wait, `None` when unlimited.
    pub fn wait_timeout(&self) -> Option<u32> {
        match self.bot.config.scheduler.wait_timeout_frames {
            0 => None,
            frames => Some(frames),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::FnEventHandler;

    #[test]
    fn profile_defaults_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::load(dir.path()).unwrap();
        assert_eq!(
            profile.name,
            dir.path().file_name().unwrap().to_string_lossy()
        );
        assert_eq!(profile.sprites_dir, dir.path().join("sprites"));
    }

    #[test]
    fn profile_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("profile.json"),
            r#"{"name": "emerald-main", "sprites_dir": "assets"}"#,
        )
        .unwrap();
        let profile = Profile::load(dir.path()).unwrap();
        assert_eq!(profile.name, "emerald-main");
        assert_eq!(profile.sprites_dir, dir.path().join("assets"));
    }

    #[test]
    fn manual_request_first_wins_and_is_taken_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut bot = BotContext::load(dir.path()).unwrap();
        assert!(bot.is_driving());
        bot.request_manual_mode("shiny");
        bot.request_manual_mode("other");
        assert!(!bot.is_driving());
        assert_eq!(bot.take_manual_request().as_deref(), Some("shiny"));
        assert!(bot.is_driving());
    }

    #[test]
    fn event_response_requests_manual() {
        let dir = tempfile::tempdir().unwrap();
        let mut bot = BotContext::load(dir.path())
            .unwrap()
            .with_event_handler(FnEventHandler::new(|event| match event {
                BotEvent::Warning(_) => Some(EventResponse::SwitchToManual("stop".into())),
                _ => None,
            }));
        bot.set_message("hello".into());
        assert!(bot.is_driving());
        assert_eq!(bot.message, "hello");
        bot.warn("no Flame Body");
        assert!(!bot.is_driving());
    }

    #[test]
    fn rng_values_are_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let mut bot = BotContext::load(dir.path()).unwrap();
        assert!(bot.remember_rng_value(42));
        assert!(!bot.remember_rng_value(42));
        assert!(bot.remember_rng_value(43));
    }
}
