//! Custom catch filters.
//!
//! A profile may ship `custom_catch_filters.json`, an ordered list of rules.
//! The filter is resolved once when the [`BotContext`](crate::BotContext) is
//! built; without the file every creature gets [`FilterVerdict::NoMatch`].
//!
//! ```json
//! {
//!   "rules": [
//!     { "species": ["Ralts"], "min_iv_sum": 170, "message": "Strong Ralts" },
//!     { "perfect_ivs": 3 },
//!     { "natures": ["Adamant", "Jolly"], "species": ["Beldum"] }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::creature::{CreatureSnapshot, Gender};
use crate::error::{BotError, Result};

pub const FILTER_FILE: &str = "custom_catch_filters.json";

/// Message used when a filter matches without saying why.
pub const DEFAULT_MATCH_MESSAGE: &str = "Matched a custom catch filter";

/// Outcome of running a filter on one creature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterVerdict {
    NoMatch,
    Matched,
    Reason(String),
}

impl FilterVerdict {
    pub fn is_match(&self) -> bool {
        !matches!(self, FilterVerdict::NoMatch)
    }

    /// Operator-facing message for a match, `None` for `NoMatch`.
    pub fn message(&self) -> Option<String> {
        match self {
            FilterVerdict::NoMatch => None,
            FilterVerdict::Matched => Some(DEFAULT_MATCH_MESSAGE.to_string()),
            FilterVerdict::Reason(reason) => Some(reason.clone()),
        }
    }
}

/// Decides whether a non-shiny creature is still worth catching.
pub trait EncounterFilter: Send + Sync {
    fn evaluate(&self, creature: &CreatureSnapshot) -> std::result::Result<FilterVerdict, String>;
}

/// Matches nothing.
pub struct NoopFilter;

impl EncounterFilter for NoopFilter {
    fn evaluate(&self, _creature: &CreatureSnapshot) -> std::result::Result<FilterVerdict, String> {
        Ok(FilterVerdict::NoMatch)
    }
}

/// One rule. Every criterion that is present must hold.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatchRule {
    pub message: Option<String>,
    pub species: Vec<String>,
    pub min_iv_sum: Option<u16>,
    pub max_iv_sum: Option<u16>,
    /// Minimum number of IVs at 31.
    pub perfect_ivs: Option<usize>,
    pub natures: Vec<String>,
    pub max_shiny_value: Option<u32>,
    pub genders: Vec<Gender>,
    pub held_items: Vec<String>,
}

impl CatchRule {
    pub fn matches(&self, creature: &CreatureSnapshot) -> bool {
        let iv_sum = creature.ivs.sum();
        (self.species.is_empty()
            || self
                .species
                .iter()
                .any(|s| s == &creature.species_name || s == creature.stats_name()))
            && self.min_iv_sum.is_none_or(|min| iv_sum >= min)
            && self.max_iv_sum.is_none_or(|max| iv_sum <= max)
            && self
                .perfect_ivs
                .is_none_or(|n| creature.ivs.perfect_count() >= n)
            && (self.natures.is_empty() || self.natures.contains(&creature.nature))
            && self
                .max_shiny_value
                .is_none_or(|max| creature.shiny_value <= max)
            && (self.genders.is_empty()
                || creature.gender.is_some_and(|g| self.genders.contains(&g)))
            && (self.held_items.is_empty()
                || creature
                    .held_item
                    .as_ref()
                    .is_some_and(|item| self.held_items.contains(item)))
    }

    fn is_empty(&self) -> bool {
        self.species.is_empty()
            && self.min_iv_sum.is_none()
            && self.max_iv_sum.is_none()
            && self.perfect_ivs.is_none()
            && self.natures.is_empty()
            && self.max_shiny_value.is_none()
            && self.genders.is_empty()
            && self.held_items.is_empty()
    }
}

/// Declarative filter loaded from the profile. First matching rule wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFilter {
    pub rules: Vec<CatchRule>,
}

impl RuleFilter {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            BotError::ClassificationFailure(format!("failed to read {}: {e}", path.display()))
        })?;
        let filter: RuleFilter = serde_json::from_str(&data).map_err(|e| {
            BotError::ClassificationFailure(format!("failed to parse {}: {e}", path.display()))
        })?;
        filter.validate()?;
        Ok(filter)
    }

    /// Reject rules that could never be meant literally.
    pub fn validate(&self) -> Result<()> {
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.is_empty() {
                return Err(BotError::ClassificationFailure(format!(
                    "catch rule #{} has no criteria and would match every creature",
                    index + 1
                )));
            }
            if let (Some(min), Some(max)) = (rule.min_iv_sum, rule.max_iv_sum)
                && min > max
            {
                return Err(BotError::ClassificationFailure(format!(
                    "catch rule #{}: min_iv_sum {min} is greater than max_iv_sum {max}",
                    index + 1
                )));
            }
            if rule.perfect_ivs.is_some_and(|n| n > 6) {
                return Err(BotError::ClassificationFailure(format!(
                    "catch rule #{}: perfect_ivs must be between 0 and 6",
                    index + 1
                )));
            }
        }
        Ok(())
    }
}

impl EncounterFilter for RuleFilter {
    fn evaluate(&self, creature: &CreatureSnapshot) -> std::result::Result<FilterVerdict, String> {
        Ok(self
            .rules
            .iter()
            .find(|rule| rule.matches(creature))
            .map(|rule| match &rule.message {
                Some(message) => FilterVerdict::Reason(message.clone()),
                None => FilterVerdict::Matched,
            })
            .unwrap_or(FilterVerdict::NoMatch))
    }
}

/// Pick the filter for a profile directory.
pub fn resolve_filter(profile_dir: &Path) -> Result<Box<dyn EncounterFilter>> {
    let path = profile_dir.join(FILTER_FILE);
    if path.is_file() {
        let filter = RuleFilter::load(&path)?;
        info!(
            "Loaded {} custom catch rule(s) from {}",
            filter.rules.len(),
            path.display()
        );
        Ok(Box::new(filter))
    } else {
        debug!("No {FILTER_FILE} in {}, using no-op filter", profile_dir.display());
        Ok(Box::new(NoopFilter))
    }
}
