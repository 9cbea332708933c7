//! Bot modes: named, resumable scripts run by the
//! [`FrameScheduler`](super::scheduler::FrameScheduler).

use super::sequence::{BoxedSequence, Sequence, Step};
use crate::context::FrameContext;
use crate::encounter::ActiveEncounter;
use crate::error::Result;

/// A mode the scheduler can run.
///
/// The lifecycle is:
/// 1. [`start`](Self::start) runs on the first frame. It performs the
///    mode's setup checks and must not touch game input; an error here
///    removes the mode without a single [`step`](Self::step).
/// 2. [`step`](Self::step) runs once per frame until it returns
///    [`Step::Done`] or an error.
/// 3. [`on_abort`](Self::on_abort) runs if the operator (or an encounter
///    of interest) takes control while the mode is still on the stack.
pub trait BotMode {
    fn name(&self) -> &str;

    fn start(&mut self, cx: &mut FrameContext<'_>) -> Result<()> {
        let _ = cx;
        Ok(())
    }

    fn step(&mut self, cx: &mut FrameContext<'_>) -> Result<Step>;

    fn on_abort(&mut self, cx: &mut FrameContext<'_>) {
        cx.game.release_all();
    }

    /// An egg in the party hatched. `party_index` is the slot it hatched in.
    ///
    /// A mode that cares about the hatchling judges it here. An error
    /// fails the mode the same way a failed [`step`](Self::step) does.
    fn on_egg_hatched(
        &mut self,
        cx: &mut FrameContext<'_>,
        encounter: &ActiveEncounter,
        party_index: usize,
    ) -> Result<()> {
        let _ = (cx, encounter, party_index);
        Ok(())
    }
}

/// A mode made from a name, an optional setup check and a sequence.
///
/// ```ignore
/// let mode = ScriptedMode::new("Mash A", || {
///     Box::new(RepeatWhile::new(
///         |cx| cx.bot.is_driving(),
///         |_| Ok(Box::new(Once::new(|cx| Ok(cx.game.press_button(Button::A)))) as BoxedSequence),
///     )) as BoxedSequence
/// });
/// ```
pub struct ScriptedMode<B> {
    name: String,
    build: Option<B>,
    check: Option<Box<dyn FnMut(&mut FrameContext<'_>) -> Result<()>>>,
    script: Option<BoxedSequence>,
}

impl<B> ScriptedMode<B>
where
    B: FnOnce() -> BoxedSequence,
{
    pub fn new(name: impl Into<String>, build: B) -> Self {
        Self {
            name: name.into(),
            build: Some(build),
            check: None,
            script: None,
        }
    }

    /// Setup check run before the script is built.
    pub fn with_check(
        mut self,
        check: impl FnMut(&mut FrameContext<'_>) -> Result<()> + 'static,
    ) -> Self {
        self.check = Some(Box::new(check));
        self
    }
}

impl<B> BotMode for ScriptedMode<B>
where
    B: FnOnce() -> BoxedSequence,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self, cx: &mut FrameContext<'_>) -> Result<()> {
        if let Some(check) = self.check.as_mut() {
            check(cx)?;
        }
        if let Some(build) = self.build.take() {
            self.script = Some(build());
        }
        Ok(())
    }

    fn step(&mut self, cx: &mut FrameContext<'_>) -> Result<Step> {
        match self.script.as_mut() {
            Some(script) => script.poll(cx),
            None => Ok(Step::Done),
        }
    }
}
