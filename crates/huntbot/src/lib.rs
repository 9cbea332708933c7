//! Frame-synchronised automation for generation-3 creature-collection games
//! running under emulation.
//!
//! `huntbot` watches the emulated game through a small set of bridge traits,
//! judges every creature it meets, and drives long scripted interactions
//! (soft-reset loops, gift pickups, egg hatching) one frame at a time. The
//! emulator host owns the frame loop and calls
//! [`FrameScheduler::advance()`](runtime::FrameScheduler::advance) once per
//! frame.
//!
//! # Getting started
//!
//! ```ignore
//! use huntbot::prelude::*;
//!
//! let mut bot = BotContext::load(Path::new("profiles/emerald"))?
//!     .with_event_handler(LoggingHandler);
//! let mut scheduler = FrameScheduler::new();
//! scheduler.push(my_mode);
//!
//! loop {
//!     emulator.run_frame();
//!     match scheduler.advance(&mut emulator, &mut bot) {
//!         AdvanceOutcome::Idle | AdvanceOutcome::SwitchedToManual => break,
//!         _ => {}
//!     }
//! }
//! ```
//!
//! # Where to find things
//!
//! - **Connect an emulator:** implement [`GameStateBridge`](bridge::GameStateBridge),
//!   [`InputSink`](bridge::InputSink) and
//!   [`SavestateProvider`](bridge::SavestateProvider). Tests use
//!   [`MemoryGame`](bridge::memory::MemoryGame).
//!
//! - **Write a mode:** implement [`BotMode`](runtime::BotMode) and compose
//!   its steps from [`Script`](runtime::Script), [`runtime::wait`] and
//!   [`runtime::actions`].
//!
//! - **Judge creatures:** see [`encounter::classify`] and
//!   [`encounter::handle_encounter`]. Profiles add rules through
//!   `custom_catch_filters.json` ([`RuleFilter`](encounter::RuleFilter));
//!   code adds them through [`BotPlugin`](plugins::BotPlugin).
//!
//! - **Observe the bot:** implement [`EventHandler`](events::EventHandler)
//!   or compose the built-in handlers with
//!   [`CompositeEventHandler`](events::CompositeEventHandler).

pub mod bridge;
pub mod config;
pub mod context;
pub mod creature;
pub mod encounter;
pub mod error;
pub mod events;
pub mod notify;
pub mod plugins;
pub mod prelude;
pub mod runtime;
pub mod stats;

pub use context::{BotContext, FrameContext, Profile};
pub use error::{BotError, Result};
