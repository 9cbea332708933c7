//! Frame-synchronised scripting: sequences, wait primitives, game actions,
//! modes and the scheduler that drives them.

pub mod actions;
pub mod mode;
pub mod scheduler;
pub mod sequence;
pub mod wait;

pub use mode::{BotMode, ScriptedMode};
pub use scheduler::{AdvanceOutcome, FrameScheduler};
pub use sequence::{BoxedSequence, Defer, Frames, Once, RepeatWhile, Script, Sequence, Step, Suspension};
