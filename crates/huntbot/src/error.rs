//! Error type shared by the scheduler, the wait primitives, and the encounter
//! pipeline.
//!
//! Collaborators that are best-effort by contract (notifier, artifact store,
//! savestates, encounter log) keep returning `Result<_, String>` and have
//! their failures logged instead of converted into a [`BotError`].

use thiserror::Error;

/// Fatal errors raised while a mode is running.
///
/// Every variant ends the failing mode. The scheduler reports it, pops the
/// mode off the controller stack and hands control back to whatever is
/// beneath it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BotError {
    /// A mode's setup check failed. Raised before any game state is touched.
    #[error("{0}")]
    PreconditionFailed(String),

    /// A wait primitive was never satisfied within the frame budget.
    #[error("timed out after {frames} frames waiting for {waiting_for}")]
    SynchronizationTimeout { waiting_for: String, frames: u32 },

    /// The custom catch filter or a plugin hook could not be resolved or
    /// raised while judging a creature.
    #[error("encounter classification failed: {0}")]
    ClassificationFailure(String),

    /// A configuration section could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Any other mode-level failure.
    #[error("{0}")]
    Mode(String),
}

impl BotError {
    /// Shorthand for [`BotError::PreconditionFailed`].
    pub fn precondition(message: impl Into<String>) -> Self {
        BotError::PreconditionFailed(message.into())
    }

    /// Whether this error came from a failed setup check.
    pub fn is_precondition(&self) -> bool {
        matches!(self, BotError::PreconditionFailed(_))
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, BotError>;
