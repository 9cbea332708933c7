//! Plugin hooks.
//!
//! [`BotPlugin`] has a named method for each point the bot calls out to.
//! Every method has a no-op default, so a plugin implements only what it
//! needs. [`PluginHost`] holds the registered plugins in order.
//!
//! ```ignore
//! struct WantsSynchronize;
//!
//! impl BotPlugin for WantsSynchronize {
//!     fn judge_encounter(&self, creature: &CreatureSnapshot) -> Result<FilterVerdict, String> {
//!         Ok(if creature.ability == "Synchronize" {
//!             FilterVerdict::Reason("Synchronize lead candidate".into())
//!         } else {
//!             FilterVerdict::NoMatch
//!         })
//!     }
//! }
//! ```

use crate::creature::CreatureSnapshot;
use crate::encounter::{ActiveEncounter, BattleAction, FilterVerdict};
use crate::error::{BotError, Result};

pub trait BotPlugin: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &str {
        "plugin"
    }

    /// Second opinion on a creature the custom filter did not match.
    fn judge_encounter(
        &self,
        _creature: &CreatureSnapshot,
    ) -> std::result::Result<FilterVerdict, String> {
        Ok(FilterVerdict::NoMatch)
    }

    /// Called once per logged encounter.
    fn on_encounter_logged(&self, _encounter: &ActiveEncounter, _action: Option<BattleAction>) {}

    /// Called when a mode passes its setup checks.
    fn on_mode_started(&self, _mode: &str) {}

    /// Called when the bot hands control back to the operator.
    fn on_manual_mode(&self, _reason: &str) {}
}

#[derive(Default)]
pub struct PluginHost {
    plugins: Vec<Box<dyn BotPlugin>>,
}

impl PluginHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: impl BotPlugin + 'static) {
        self.plugins.push(Box::new(plugin));
    }

    /// First non-`NoMatch` verdict among the plugins. A plugin error stops
    /// classification.
    pub fn judge_encounter(&self, creature: &CreatureSnapshot) -> Result<FilterVerdict> {
        for plugin in &self.plugins {
            let verdict = plugin.judge_encounter(creature).map_err(|e| {
                BotError::ClassificationFailure(format!("plugin '{}': {e}", plugin.name()))
            })?;
            if verdict.is_match() {
                return Ok(verdict);
            }
        }
        Ok(FilterVerdict::NoMatch)
    }

    pub fn encounter_logged(&self, encounter: &ActiveEncounter, action: Option<BattleAction>) {
        for plugin in &self.plugins {
            plugin.on_encounter_logged(encounter, action);
        }
    }

    pub fn mode_started(&self, mode: &str) {
        for plugin in &self.plugins {
            plugin.on_mode_started(mode);
        }
    }

    pub fn manual_mode(&self, reason: &str) {
        for plugin in &self.plugins {
            plugin.on_manual_mode(reason);
        }
    }
}
