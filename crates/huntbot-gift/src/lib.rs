//! Static gift soft-resets for huntbot.
//!
//! Stand in front of an NPC (or fossil scientist, or egg-giving hiker) that
//! hands out a creature, save the game, and push
//! [`StaticGiftResetsMode`] onto the scheduler. The mode resets, accepts the
//! gift, judges it and repeats until something of interest shows up.
//!
//! ```ignore
//! use huntbot::prelude::*;
//! use huntbot_gift::StaticGiftResetsMode;
//!
//! let mut scheduler = FrameScheduler::new();
//! scheduler.push(StaticGiftResetsMode::new());
//! ```

pub mod mode;
pub mod targets;

pub use mode::StaticGiftResetsMode;
pub use targets::GiftTarget;
