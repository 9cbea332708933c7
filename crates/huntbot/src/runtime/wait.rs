//! Wait primitives.
//!
//! Each primitive evaluates its predicate at most once per frame. While the
//! predicate is false it optionally presses a button (to advance text boxes
//! and the like) and suspends with [`Suspension::Awaiting`]. Once a wait has
//! polled for longer than `scheduler.wait_timeout_frames` it fails with
//! [`BotError::SynchronizationTimeout`].
//!
//! [`Suspension::Awaiting`]: super::sequence::Suspension::Awaiting

use tracing::trace;

use super::sequence::{Script, Sequence, Step};
use crate::bridge::Button;
use crate::context::FrameContext;
use crate::error::{BotError, Result};

/// Suspends until `predicate` holds.
pub struct WaitUntil<P> {
    label: String,
    predicate: P,
    button: Option<Button>,
    frames: u32,
}

impl<P> WaitUntil<P>
where
    P: FnMut(&mut FrameContext<'_>) -> bool,
{
    pub fn new(label: impl Into<String>, button: Option<Button>, predicate: P) -> Self {
        Self {
            label: label.into(),
            predicate,
            button,
            frames: 0,
        }
    }
}

impl<P> Sequence for WaitUntil<P>
where
    P: FnMut(&mut FrameContext<'_>) -> bool,
{
    fn poll(&mut self, cx: &mut FrameContext<'_>) -> Result<Step> {
        if (self.predicate)(cx) {
            trace!("'{}' satisfied after {} frame(s)", self.label, self.frames);
            return Ok(Step::Done);
        }
        if let Some(limit) = cx.wait_timeout()
            && self.frames >= limit
        {
            return Err(BotError::SynchronizationTimeout {
                waiting_for: self.label.clone(),
                frames: self.frames,
            });
        }
        self.frames += 1;
        if let Some(button) = self.button {
            cx.game.press_button(button);
        }
        Ok(Step::awaiting(self.label.as_str()))
    }
}

pub fn until<P>(label: impl Into<String>, button: Option<Button>, predicate: P) -> WaitUntil<P>
where
    P: FnMut(&mut FrameContext<'_>) -> bool,
{
    WaitUntil::new(label, button, predicate)
}

pub fn task_active(
    task: &str,
    button: Option<Button>,
) -> WaitUntil<impl FnMut(&mut FrameContext<'_>) -> bool + use<>> {
    let name = task.to_string();
    until(format!("task {task} active"), button, move |cx| {
        cx.game.task_active(&name)
    })
}

pub fn task_inactive(
    task: &str,
    button: Option<Button>,
) -> WaitUntil<impl FnMut(&mut FrameContext<'_>) -> bool + use<>> {
    let name = task.to_string();
    until(format!("task {task} inactive"), button, move |cx| {
        !cx.game.task_active(&name)
    })
}

/// Waits for a task to start, then for it to finish.
pub fn task_start_and_finish(task: &str, button: Option<Button>) -> Script {
    Script::new()
        .then(task_active(task, button))
        .then(task_inactive(task, button))
}

pub fn script_start_and_finish(script: &str, button: Option<Button>) -> Script {
    let started = script.to_string();
    let finished = script.to_string();
    Script::new()
        .then(until(
            format!("script {script} active"),
            button,
            move |cx: &mut FrameContext<'_>| cx.game.script_active(&started),
        ))
        .then(until(
            format!("script {script} finished"),
            button,
            move |cx: &mut FrameContext<'_>| !cx.game.script_active(&finished),
        ))
}

pub fn no_script_running(
    button: Option<Button>,
) -> WaitUntil<impl FnMut(&mut FrameContext<'_>) -> bool + use<>> {
    until("no script running", button, |cx| !cx.game.any_script_active())
}

pub fn event_flag_set(
    flag: &str,
    button: Option<Button>,
) -> WaitUntil<impl FnMut(&mut FrameContext<'_>) -> bool + use<>> {
    let name = flag.to_string();
    until(format!("event flag {flag}"), button, move |cx| {
        cx.game.event_flag(&name)
    })
}

pub fn player_controllable(
    button: Option<Button>,
) -> WaitUntil<impl FnMut(&mut FrameContext<'_>) -> bool + use<>> {
    until("player avatar controllable", button, |cx| {
        cx.game.player().is_some_and(|p| p.controllable)
    })
}

/// Waits until the RNG shows a value this process has not seen before.
///
/// Used right after a soft reset to make sure the new attempt does not
/// replay an earlier one.
pub fn unique_rng_value() -> WaitUntil<impl FnMut(&mut FrameContext<'_>) -> bool + use<>> {
    until("unique RNG value", None, |cx| {
        let value = cx.game.rng_value();
        cx.bot.remember_rng_value(value)
    })
}
