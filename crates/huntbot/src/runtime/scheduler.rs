//! The frame scheduler.
//!
//! The host calls [`FrameScheduler::advance`] once per emulated frame. The
//! scheduler drives the mode on top of the controller stack by exactly one
//! step and reports what happened as an [`AdvanceOutcome`]. An empty stack
//! means the operator is in control.

use tracing::{debug, error, info, warn};

use super::mode::BotMode;
use super::sequence::{Step, Suspension};
use crate::bridge::Emulator;
use crate::context::{BotContext, FrameContext};
use crate::encounter::ActiveEncounter;
use crate::error::BotError;
use crate::events::BotEvent;

/// What one call to [`FrameScheduler::advance`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// No mode is running.
    Idle,
    /// The top mode suspended until the next frame.
    Suspended(Suspension),
    /// The named mode completed and was popped.
    ModeFinished(String),
    /// The named mode failed (setup check or step) and was popped.
    ModeFailed(String),
    /// Every mode was aborted and the operator has control.
    SwitchedToManual,
}

struct StackEntry {
    mode: Box<dyn BotMode>,
    started: bool,
}

/// Owns the controller stack. The top entry is the running mode.
#[derive(Default)]
pub struct FrameScheduler {
    stack: Vec<StackEntry>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a mode on top of the stack. It starts on the next `advance`.
    pub fn push(&mut self, mode: impl BotMode + 'static) {
        self.push_boxed(Box::new(mode));
    }

    pub fn push_boxed(&mut self, mode: Box<dyn BotMode>) {
        debug!("Pushed mode '{}'", mode.name());
        self.stack.push(StackEntry {
            mode,
            started: false,
        });
    }

    /// Whether the operator is in control.
    pub fn is_manual(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current_mode(&self) -> Option<&str> {
        self.stack.last().map(|entry| entry.mode.name())
    }

    /// Drive the top mode by one frame.
    pub fn advance(&mut self, game: &mut dyn Emulator, bot: &mut BotContext) -> AdvanceOutcome {
        let Some(entry) = self.stack.last_mut() else {
            return AdvanceOutcome::Idle;
        };
        let mut cx = FrameContext::new(game, bot);

        if !entry.started {
            if let Err(err) = entry.mode.start(&mut cx) {
                return self.fail_top(game, bot, err);
            }
            entry.started = true;
            let name = entry.mode.name().to_string();
            info!("Starting mode '{name}'");
            cx.bot.plugins.mode_started(&name);
            cx.bot.emit(&BotEvent::ModeStarted { name: &name });
        }

        let outcome = match entry.mode.step(&mut cx) {
            Ok(Step::Pending(suspension)) => AdvanceOutcome::Suspended(suspension),
            Ok(Step::Done) => {
                let name = entry.mode.name().to_string();
                self.stack.pop();
                info!("Mode '{name}' finished");
                bot.emit(&BotEvent::ModeFinished { name: &name });
                AdvanceOutcome::ModeFinished(name)
            }
            Err(err) => self.fail_top(game, bot, err),
        };

        match bot.take_manual_request() {
            Some(reason) => {
                self.abort_all(game, bot, &reason);
                AdvanceOutcome::SwitchedToManual
            }
            None => outcome,
        }
    }

    /// Abort every mode and hand control to the operator.
    pub fn switch_to_manual(&mut self, game: &mut dyn Emulator, bot: &mut BotContext, reason: &str) {
        bot.take_manual_request();
        self.abort_all(game, bot, reason);
    }

    /// Tell the running mode that an egg hatched in `party_index`.
    ///
    /// The mode decides whether the hatchling matters. If handling it asks
    /// for manual control, the switch happens on the next
    /// [`advance`](Self::advance).
    pub fn notify_egg_hatched(
        &mut self,
        game: &mut dyn Emulator,
        bot: &mut BotContext,
        encounter: &ActiveEncounter,
        party_index: usize,
    ) {
        let Some(entry) = self.stack.last_mut() else {
            return;
        };
        let mut cx = FrameContext::new(game, bot);
        if let Err(err) = entry.mode.on_egg_hatched(&mut cx, encounter, party_index) {
            self.fail_top(game, bot, err);
        }
    }

    fn fail_top(
        &mut self,
        game: &mut dyn Emulator,
        bot: &mut BotContext,
        err: BotError,
    ) -> AdvanceOutcome {
        let name = self
            .stack
            .pop()
            .map(|entry| entry.mode.name().to_string())
            .unwrap_or_default();
        game.release_all();
        if err.is_precondition() {
            warn!("Mode '{name}' cannot run: {err}");
        } else {
            error!("Mode '{name}' failed: {err}");
        }
        bot.emit(&BotEvent::ModeFailed {
            name: &name,
            error: &err,
        });
        if self.stack.is_empty() {
            info!("No mode left, operator has control");
        }
        AdvanceOutcome::ModeFailed(name)
    }

    fn abort_all(&mut self, game: &mut dyn Emulator, bot: &mut BotContext, reason: &str) {
        while let Some(mut entry) = self.stack.pop() {
            let mut cx = FrameContext::new(game, bot);
            entry.mode.on_abort(&mut cx);
            debug!("Aborted mode '{}'", entry.mode.name());
        }
        game.release_all();
        info!("Switched to manual mode: {reason}");
        bot.plugins.manual_mode(reason);
        bot.emit(&BotEvent::SwitchedToManual { reason });
    }
}
