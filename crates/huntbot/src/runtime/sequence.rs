//! Resumable sequences.
//!
//! A [`Sequence`] is a state machine polled once per frame. Each poll either
//! suspends (the sequence wants to be polled again next frame) or completes.
//! Sequences nest: a parent forwards its child's suspension unchanged, so a
//! long interaction reads as a flat list of steps.
//!
//! ```ignore
//! let script = Script::new()
//!     .then(wait::task_active("Task_DrawFieldMessage", Some(Button::A)))
//!     .then(wait::task_inactive("Task_DrawFieldMessage", Some(Button::B)))
//!     .then(Once::new(|cx| {
//!         cx.game.press_button(Button::B);
//!         Ok(())
//!     }));
//! ```

use std::collections::VecDeque;

use crate::context::FrameContext;
use crate::error::Result;

/// Why a sequence suspended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suspension {
    /// Plain single-frame yield.
    Frame,
    /// Blocked on a wait primitive.
    Awaiting(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Pending(Suspension),
    Done,
}

impl Step {
    pub fn frame() -> Self {
        Step::Pending(Suspension::Frame)
    }

    pub fn awaiting(label: impl Into<String>) -> Self {
        Step::Pending(Suspension::Awaiting(label.into()))
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Step::Done)
    }
}

pub trait Sequence {
    /// Advance by one frame.
    fn poll(&mut self, cx: &mut FrameContext<'_>) -> Result<Step>;
}

pub type BoxedSequence = Box<dyn Sequence>;

impl Sequence for BoxedSequence {
    fn poll(&mut self, cx: &mut FrameContext<'_>) -> Result<Step> {
        (**self).poll(cx)
    }
}

// ── Combinators ────────────────────────────────────────────────────

/// Runs children in order. When a child completes the next one is polled
/// in the same frame.
#[derive(Default)]
pub struct Script {
    steps: VecDeque<BoxedSequence>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: impl Sequence + 'static) -> Self {
        self.steps.push_back(Box::new(step));
        self
    }

    pub fn push(&mut self, step: impl Sequence + 'static) {
        self.steps.push_back(Box::new(step));
    }
}

impl Sequence for Script {
    fn poll(&mut self, cx: &mut FrameContext<'_>) -> Result<Step> {
        while let Some(current) = self.steps.front_mut() {
            match current.poll(cx)? {
                Step::Done => {
                    self.steps.pop_front();
                }
                pending => return Ok(pending),
            }
        }
        Ok(Step::Done)
    }
}

/// Runs a closure once and completes in the same frame.
pub struct Once<F>(Option<F>);

impl<F> Once<F>
where
    F: FnOnce(&mut FrameContext<'_>) -> Result<()>,
{
    pub fn new(f: F) -> Self {
        Self(Some(f))
    }
}

impl<F> Sequence for Once<F>
where
    F: FnOnce(&mut FrameContext<'_>) -> Result<()>,
{
    fn poll(&mut self, cx: &mut FrameContext<'_>) -> Result<Step> {
        if let Some(f) = self.0.take() {
            f(cx)?;
        }
        Ok(Step::Done)
    }
}

/// Builds its inner sequence on first poll, from the state at that frame.
pub struct Defer<F> {
    factory: Option<F>,
    inner: Option<BoxedSequence>,
}

impl<F> Defer<F>
where
    F: FnOnce(&mut FrameContext<'_>) -> Result<BoxedSequence>,
{
    pub fn new(factory: F) -> Self {
        Self {
            factory: Some(factory),
            inner: None,
        }
    }
}

impl<F> Sequence for Defer<F>
where
    F: FnOnce(&mut FrameContext<'_>) -> Result<BoxedSequence>,
{
    fn poll(&mut self, cx: &mut FrameContext<'_>) -> Result<Step> {
        if let Some(factory) = self.factory.take() {
            self.inner = Some(factory(cx)?);
        }
        match &mut self.inner {
            Some(inner) => inner.poll(cx),
            None => Ok(Step::Done),
        }
    }
}

/// Re-runs a body while a condition holds.
///
/// The condition is checked before each iteration. A finished iteration
/// always yields one frame before the next check, so a body that completes
/// without suspending cannot spin within a single frame.
pub struct RepeatWhile<C, F> {
    condition: C,
    body: F,
    current: Option<BoxedSequence>,
}

impl<C, F> RepeatWhile<C, F>
where
    C: FnMut(&mut FrameContext<'_>) -> bool,
    F: FnMut(&mut FrameContext<'_>) -> Result<BoxedSequence>,
{
    pub fn new(condition: C, body: F) -> Self {
        Self {
            condition,
            body,
            current: None,
        }
    }
}

impl<C, F> Sequence for RepeatWhile<C, F>
where
    C: FnMut(&mut FrameContext<'_>) -> bool,
    F: FnMut(&mut FrameContext<'_>) -> Result<BoxedSequence>,
{
    fn poll(&mut self, cx: &mut FrameContext<'_>) -> Result<Step> {
        if self.current.is_none() {
            if !(self.condition)(cx) {
                return Ok(Step::Done);
            }
            self.current = Some((self.body)(cx)?);
        }
        let Some(current) = self.current.as_mut() else {
            return Ok(Step::Done);
        };
        match current.poll(cx)? {
            Step::Done => {
                self.current = None;
                Ok(Step::frame())
            }
            pending => Ok(pending),
        }
    }
}

/// Suspends for a fixed number of frames.
pub struct Frames(u32);

impl Frames {
    pub fn new(count: u32) -> Self {
        Self(count)
    }
}

impl Sequence for Frames {
    fn poll(&mut self, _cx: &mut FrameContext<'_>) -> Result<Step> {
        if self.0 == 0 {
            return Ok(Step::Done);
        }
        self.0 -= 1;
        Ok(Step::frame())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::bridge::memory::MemoryGame;
    use crate::bridge::{Button, GameVersion};
    use crate::context::BotContext;
    use crate::error::BotError;

    fn fixture() -> (tempfile::TempDir, MemoryGame, BotContext) {
        let dir = tempfile::tempdir().unwrap();
        let bot = BotContext::load(dir.path()).unwrap();
        (dir, MemoryGame::new(GameVersion::Emerald), bot)
    }

    // ── Script ──

    #[test]
    fn script_runs_immediate_steps_in_one_frame() {
        let (_dir, mut game, mut bot) = fixture();
        let mut script = Script::new()
            .then(Once::new(|cx: &mut FrameContext<'_>| {
                cx.game.press_button(Button::A);
                Ok(())
            }))
            .then(Once::new(|cx: &mut FrameContext<'_>| {
                cx.game.press_button(Button::B);
                Ok(())
            }));
        let mut cx = FrameContext::new(&mut game, &mut bot);
        assert_eq!(script.poll(&mut cx).unwrap(), Step::Done);
        assert_eq!(game.presses, vec![Button::A, Button::B]);
    }

    #[test]
    fn script_forwards_suspension() {
        let (_dir, mut game, mut bot) = fixture();
        let mut script = Script::new()
            .then(Frames::new(2))
            .then(Once::new(|cx: &mut FrameContext<'_>| {
                cx.game.press_button(Button::Start);
                Ok(())
            }));
        let mut cx = FrameContext::new(&mut game, &mut bot);
        assert_eq!(script.poll(&mut cx).unwrap(), Step::frame());
        assert_eq!(script.poll(&mut cx).unwrap(), Step::frame());
        assert_eq!(script.poll(&mut cx).unwrap(), Step::Done);
        assert_eq!(game.presses, vec![Button::Start]);
    }

    #[test]
    fn script_propagates_errors() {
        let (_dir, mut game, mut bot) = fixture();
        let mut script = Script::new().then(Once::new(|_cx: &mut FrameContext<'_>| {
            Err(BotError::Mode("boom".into()))
        }));
        let mut cx = FrameContext::new(&mut game, &mut bot);
        assert_eq!(
            script.poll(&mut cx).unwrap_err(),
            BotError::Mode("boom".into())
        );
    }

    // ── Defer / RepeatWhile ──

    #[test]
    fn defer_builds_from_state_at_first_poll() {
        let (_dir, mut game, mut bot) = fixture();
        let mut seq = Defer::new(|cx: &mut FrameContext<'_>| {
            let frames = cx.game.rng_value();
            Ok(Box::new(Frames::new(frames)) as BoxedSequence)
        });
        game.rng = 1;
        let mut cx = FrameContext::new(&mut game, &mut bot);
        assert_eq!(seq.poll(&mut cx).unwrap(), Step::frame());
        assert_eq!(seq.poll(&mut cx).unwrap(), Step::Done);
    }

    #[test]
    fn repeat_while_yields_between_iterations() {
        let (_dir, mut game, mut bot) = fixture();
        let runs = Rc::new(Cell::new(0));
        let r = runs.clone();
        let mut seq = RepeatWhile::new(
            move |_cx: &mut FrameContext<'_>| r.get() < 3,
            {
                let runs = runs.clone();
                move |_cx: &mut FrameContext<'_>| {
                    let runs = runs.clone();
                    Ok(Box::new(Once::new(move |_cx: &mut FrameContext<'_>| {
                        runs.set(runs.get() + 1);
                        Ok(())
                    })) as BoxedSequence)
                }
            },
        );
        let mut cx = FrameContext::new(&mut game, &mut bot);
        let mut frames = 0;
        while !seq.poll(&mut cx).unwrap().is_done() {
            frames += 1;
        }
        assert_eq!(runs.get(), 3);
        assert_eq!(frames, 3);
    }
}
