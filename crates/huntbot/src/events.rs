//! Events the bot reports while it runs.
//!
//! The scheduler and the encounter handler communicate with the host through
//! [`BotEvent`] variants. Hosts implement [`EventHandler`] to observe them
//! for logging, overlays, statistics, or to take control back from the bot.
//!
//! # Choosing an event handler
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or headless runs |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Closures that may answer with an [`EventResponse`] |
//! | [`EventObserver`] | Closures that only observe |
//! | [`CompositeEventHandler`] | Compose multiple handlers in order |

use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::encounter::{ActiveEncounter, BattleAction};
use crate::error::BotError;

// ── Events ─────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum BotEvent<'a> {
    /// A mode passed its setup checks and is about to take its first step.
    ModeStarted { name: &'a str },
    /// A mode ran to completion.
    ModeFinished { name: &'a str },
    /// A mode raised an error and was removed from the controller stack.
    ModeFailed {
        name: &'a str,
        error: &'a BotError,
    },
    /// Every mode was aborted and the operator has control.
    SwitchedToManual { reason: &'a str },
    /// An encounter was classified and logged.
    EncounterLogged {
        encounter: &'a ActiveEncounter,
        action: Option<BattleAction>,
    },
    /// Operator-facing status line.
    Message(&'a str),
    /// Something worth the operator's attention that does not stop the mode.
    Warning(&'a str),
    SavestateCreated { path: &'a Path },
    ArtifactPersisted { path: &'a Path },
}

/// Response from an event handler.
///
/// Most events return `None`. Any event may be answered with
/// [`SwitchToManual`](EventResponse::SwitchToManual), which the scheduler
/// applies once the current step returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResponse {
    SwitchToManual(String),
}

/// Handler for bot events.
///
/// # Example
///
/// ```ignore
/// struct StopOnShiny;
///
/// impl EventHandler for StopOnShiny {
///     fn on_event(&self, event: &BotEvent<'_>) -> Option<EventResponse> {
///         if let BotEvent::EncounterLogged { encounter, .. } = event
///             && encounter.creature.is_shiny
///         {
///             return Some(EventResponse::SwitchToManual("shiny found".into()));
///         }
///         None
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &BotEvent<'_>) -> Option<EventResponse> {
        let _ = event;
        None
    }
}

/// A handler that ignores everything.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// An event handler backed by a closure.
pub struct FnEventHandler<F>(F)
where
    F: Fn(&BotEvent<'_>) -> Option<EventResponse> + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&BotEvent<'_>) -> Option<EventResponse> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&BotEvent<'_>) -> Option<EventResponse> + Send + Sync,
{
    fn on_event(&self, event: &BotEvent<'_>) -> Option<EventResponse> {
        (self.0)(event)
    }
}

/// Adapts an observation-only closure into an [`EventHandler`].
///
/// ```ignore
/// let handler = EventObserver::new(|event| {
///     if let BotEvent::Message(text) = event { overlay.set(text); }
/// });
/// ```
pub struct EventObserver<F>(F)
where
    F: Fn(&BotEvent<'_>) + Send + Sync;

impl<F> EventObserver<F>
where
    F: Fn(&BotEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for EventObserver<F>
where
    F: Fn(&BotEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &BotEvent<'_>) -> Option<EventResponse> {
        (self.0)(event);
        None
    }
}

/// Dispatches to multiple handlers in registration order. The first
/// non-`None` response wins, but every handler still sees the event.
///
/// ```ignore
/// let handler = CompositeEventHandler::new()
///     .with(LoggingHandler)
///     .with_if(overlay_enabled, OverlayHandler::new())
///     .with_opt(stats_handler);
/// ```
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Add a handler to the chain.
    pub fn with(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Add a handler only when `condition` holds.
    pub fn with_if(self, condition: bool, handler: impl EventHandler + 'static) -> Self {
        if condition { self.with(handler) } else { self }
    }

    /// Add a handler from an `Option`. `None` is a no-op.
    pub fn with_opt(self, handler: Option<impl EventHandler + 'static>) -> Self {
        match handler {
            Some(h) => self.with(h),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for CompositeEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for CompositeEventHandler {
    fn on_event(&self, event: &BotEvent<'_>) -> Option<EventResponse> {
        let mut first = None;
        for handler in &self.handlers {
            let response = handler.on_event(event);
            if first.is_none() {
                first = response;
            }
        }
        first
    }
}

/// Mirrors events into `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &BotEvent<'_>) -> Option<EventResponse> {
        match event {
            BotEvent::ModeStarted { name } => info!("Mode started: {name}"),
            BotEvent::ModeFinished { name } => info!("Mode finished: {name}"),
            BotEvent::ModeFailed { name, error: err } => {
                error!("Mode '{name}' failed: {err}");
            }
            BotEvent::SwitchedToManual { reason } => info!("Switched to manual mode ({reason})"),
            BotEvent::EncounterLogged { encounter, action } => {
                info!(
                    species = %encounter.creature.species_name,
                    pv = encounter.creature.personality_value,
                    classification = encounter.classification.name(),
                    action = ?action,
                    "Encounter logged"
                );
            }
            BotEvent::Message(text) => info!("{text}"),
            BotEvent::Warning(text) => warn!("{text}"),
            BotEvent::SavestateCreated { path } => {
                debug!("Savestate created: {}", path.display());
            }
            BotEvent::ArtifactPersisted { path } => {
                debug!("Creature saved to {}", path.display());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    // ── Composition ──

    #[test]
    fn composite_calls_every_handler() {
        let count = Arc::new(AtomicUsize::new(0));
        let a = count.clone();
        let b = count.clone();
        let handler = CompositeEventHandler::new()
            .with(EventObserver::new(move |_| {
                a.fetch_add(1, Ordering::SeqCst);
            }))
            .with(EventObserver::new(move |_| {
                b.fetch_add(1, Ordering::SeqCst);
            }));

        assert!(handler.on_event(&BotEvent::Message("hello")).is_none());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn composite_returns_first_response_but_keeps_dispatching() {
        let seen = Arc::new(AtomicUsize::new(0));
        let s = seen.clone();
        let handler = CompositeEventHandler::new()
            .with(FnEventHandler::new(|_| {
                Some(EventResponse::SwitchToManual("first".into()))
            }))
            .with(FnEventHandler::new(|_| {
                Some(EventResponse::SwitchToManual("second".into()))
            }))
            .with(EventObserver::new(move |_| {
                s.fetch_add(1, Ordering::SeqCst);
            }));

        let response = handler.on_event(&BotEvent::Warning("careful"));
        assert_eq!(response, Some(EventResponse::SwitchToManual("first".into())));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn with_if_and_with_opt() {
        let handler = CompositeEventHandler::new()
            .with_if(false, LoggingHandler)
            .with_opt(None::<NoopHandler>);
        assert!(handler.is_empty());

        let handler = CompositeEventHandler::new()
            .with_if(true, LoggingHandler)
            .with_opt(Some(NoopHandler));
        assert!(!handler.is_empty());
    }

    #[test]
    fn logging_handler_never_responds() {
        let err = BotError::Mode("boom".into());
        let event = BotEvent::ModeFailed {
            name: "Static Gift Resets",
            error: &err,
        };
        assert!(LoggingHandler.on_event(&event).is_none());
    }
}
