//! Higher-level game actions built from wait primitives and raw input.

use tracing::debug;

use super::sequence::{Sequence, Step};
use crate::bridge::{Button, Direction, GamePhase, MapLocation};
use crate::context::FrameContext;
use crate::error::{BotError, Result};

/// Start-menu entry index of the party screen when the Pokédex is owned.
const START_MENU_POKEMON_WITH_DEX: u8 = 1;
/// First entry of the party-slot action menu.
const PARTY_ACTION_SUMMARY: u8 = 0;

/// Counts polls against the configured wait budget.
struct FrameBudget {
    label: &'static str,
    frames: u32,
}

impl FrameBudget {
    fn new(label: &'static str) -> Self {
        Self { label, frames: 0 }
    }

    fn tick(&mut self, cx: &FrameContext<'_>) -> Result<()> {
        if let Some(limit) = cx.wait_timeout()
            && self.frames >= limit
        {
            return Err(BotError::SynchronizationTimeout {
                waiting_for: self.label.to_string(),
                frames: self.frames,
            });
        }
        self.frames += 1;
        Ok(())
    }
}

// ── Soft reset ─────────────────────────────────────────────────────

/// Soft-resets the game and waits until the player is back in the
/// overworld and controllable.
///
/// With `mash_random_keys` a directional key picked from the current RNG
/// value is pressed on every boot frame, so consecutive resets diverge.
pub struct SoftReset {
    mash_random_keys: bool,
    reset_sent: bool,
    budget: FrameBudget,
}

pub fn soft_reset(mash_random_keys: bool) -> SoftReset {
    SoftReset {
        mash_random_keys,
        reset_sent: false,
        budget: FrameBudget::new("game to boot into the overworld"),
    }
}

impl Sequence for SoftReset {
    fn poll(&mut self, cx: &mut FrameContext<'_>) -> Result<Step> {
        if !self.reset_sent {
            cx.game.release_all();
            cx.game.soft_reset();
            self.reset_sent = true;
            debug!("Soft reset");
            return Ok(Step::frame());
        }

        let phase = cx.game.game_phase();
        if phase == GamePhase::Overworld && cx.game.player().is_some_and(|p| p.controllable) {
            return Ok(Step::Done);
        }
        self.budget.tick(cx)?;

        match phase {
            GamePhase::TitleScreen => {
                let button = if self.budget.frames % 2 == 0 {
                    Button::Start
                } else {
                    Button::A
                };
                cx.game.press_button(button);
            }
            GamePhase::Overworld => {}
            _ => cx.game.press_button(Button::A),
        }
        if self.mash_random_keys {
            let keys = [Button::Left, Button::Right, Button::Up];
            let index = (cx.game.rng_value() % keys.len() as u32) as usize;
            cx.game.press_button(keys[index]);
        }
        Ok(Step::awaiting("game to boot into the overworld"))
    }
}

// ── Walking ────────────────────────────────────────────────────────

/// Holds the direction towards `target` until the player stands on it.
/// Moves along x first, then y. Releases the held buttons on arrival.
pub struct WalkTo {
    target: MapLocation,
    budget: FrameBudget,
}

pub fn walk_to(target: MapLocation) -> WalkTo {
    WalkTo {
        target,
        budget: FrameBudget::new("player to reach the target tile"),
    }
}

fn direction_towards(from: &MapLocation, to: &MapLocation) -> Option<Direction> {
    if from.x < to.x {
        Some(Direction::Right)
    } else if from.x > to.x {
        Some(Direction::Left)
    } else if from.y < to.y {
        Some(Direction::Down)
    } else if from.y > to.y {
        Some(Direction::Up)
    } else {
        None
    }
}

impl Sequence for WalkTo {
    fn poll(&mut self, cx: &mut FrameContext<'_>) -> Result<Step> {
        let Some(player) = cx.game.player() else {
            self.budget.tick(cx)?;
            return Ok(Step::awaiting("player avatar"));
        };
        if player.location.map != self.target.map {
            cx.game.release_all();
            return Err(BotError::Mode(format!(
                "Player is on {} but should be walking to a tile on {}.",
                player.location.map, self.target.map
            )));
        }
        match direction_towards(&player.location, &self.target) {
            None => {
                cx.game.release_all();
                Ok(Step::Done)
            }
            Some(direction) => {
                self.budget.tick(cx)?;
                cx.game.hold_buttons(&[direction.button()]);
                Ok(Step::awaiting(format!(
                    "walk to ({}, {})",
                    self.target.x, self.target.y
                )))
            }
        }
    }
}

/// Walks back and forth between two tiles until `stop` returns true, then
/// releases every held button.
pub struct Patrol<S> {
    ends: [MapLocation; 2],
    heading: usize,
    leg: WalkTo,
    stop: S,
}

pub fn patrol<S>(a: MapLocation, b: MapLocation, stop: S) -> Patrol<S>
where
    S: FnMut(&mut FrameContext<'_>) -> bool,
{
    Patrol {
        leg: walk_to(b.clone()),
        ends: [a, b],
        heading: 1,
        stop,
    }
}

impl<S> Sequence for Patrol<S>
where
    S: FnMut(&mut FrameContext<'_>) -> bool,
{
    fn poll(&mut self, cx: &mut FrameContext<'_>) -> Result<Step> {
        if (self.stop)(cx) {
            cx.game.release_all();
            return Ok(Step::Done);
        }
        if self.leg.poll(cx)?.is_done() {
            self.heading = 1 - self.heading;
            self.leg = walk_to(self.ends[self.heading].clone());
        }
        Ok(Step::awaiting("patrol"))
    }
}

// ── Menus ──────────────────────────────────────────────────────────

/// Opens the summary screen of a party slot from the overworld.
pub struct OpenPartySummary {
    slot: u8,
    slot_chosen: bool,
    budget: FrameBudget,
}

pub fn open_party_summary(slot: usize) -> OpenPartySummary {
    OpenPartySummary {
        slot: u8::try_from(slot).unwrap_or(u8::MAX),
        slot_chosen: false,
        budget: FrameBudget::new("party summary screen"),
    }
}

impl Sequence for OpenPartySummary {
    fn poll(&mut self, cx: &mut FrameContext<'_>) -> Result<Step> {
        let phase = cx.game.game_phase();
        if phase == GamePhase::Summary {
            return Ok(Step::Done);
        }
        self.budget.tick(cx)?;
        let cursor = cx.game.menu_cursor();
        match phase {
            GamePhase::Overworld => cx.game.press_button(Button::Start),
            GamePhase::StartMenu => {
                let entry = if cx.game.event_flag("SYS_POKEDEX_GET") {
                    START_MENU_POKEMON_WITH_DEX
                } else {
                    0
                };
                press_towards(cx, cursor, entry);
            }
            GamePhase::PartyMenu if !self.slot_chosen => {
                if cursor == Some(self.slot) {
                    cx.game.press_button(Button::A);
                    self.slot_chosen = true;
                } else {
                    press_towards(cx, cursor, self.slot);
                }
            }
            GamePhase::PartyMenu => press_towards(cx, cursor, PARTY_ACTION_SUMMARY),
            _ => cx.game.press_button(Button::B),
        }
        Ok(Step::awaiting("party summary screen"))
    }
}

/// Moves a vertical menu cursor one entry towards `target`, or confirms
/// with A when it is already there.
fn press_towards(cx: &mut FrameContext<'_>, cursor: Option<u8>, target: u8) {
    match cursor {
        Some(c) if c == target => cx.game.press_button(Button::A),
        Some(c) if c > target => cx.game.press_button(Button::Up),
        _ => cx.game.press_button(Button::Down),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::memory::MemoryGame;
    use crate::bridge::{GameVersion, PlayerAvatar};
    use crate::context::BotContext;

    fn fixture() -> (tempfile::TempDir, MemoryGame, BotContext) {
        let dir = tempfile::tempdir().unwrap();
        let bot = BotContext::load(dir.path()).unwrap();
        (dir, MemoryGame::new(GameVersion::Emerald), bot)
    }

    fn avatar(x: i32, y: i32) -> PlayerAvatar {
        PlayerAvatar {
            location: MapLocation::new("LAVARIDGE_TOWN", x, y),
            map_size: (25, 25),
            facing: Direction::Down,
            on_bike: true,
            controllable: true,
        }
    }

    /// Moves the avatar one tile in the held direction, like the game would.
    fn step_held(game: &mut MemoryGame) {
        let Some(held) = game.held.first().copied() else {
            return;
        };
        if let Some(player) = game.player.as_mut() {
            match held {
                Button::Left => player.location.x -= 1,
                Button::Right => player.location.x += 1,
                Button::Up => player.location.y -= 1,
                Button::Down => player.location.y += 1,
                _ => {}
            }
        }
    }

    // ── Soft reset ──

    #[test]
    fn soft_reset_waits_for_overworld() {
        let (_dir, mut game, mut bot) = fixture();
        game.player = Some(avatar(4, 8));
        let mut reset = soft_reset(false);

        assert_eq!(
            reset.poll(&mut FrameContext::new(&mut game, &mut bot)).unwrap(),
            Step::frame()
        );
        assert_eq!(game.soft_resets, 1);
        assert_eq!(game.phase, GamePhase::TitleScreen);

        assert!(
            !reset
                .poll(&mut FrameContext::new(&mut game, &mut bot))
                .unwrap()
                .is_done()
        );
        assert_eq!(game.presses.len(), 1);

        game.phase = GamePhase::Overworld;
        assert!(
            reset
                .poll(&mut FrameContext::new(&mut game, &mut bot))
                .unwrap()
                .is_done()
        );
    }

    #[test]
    fn soft_reset_mashes_directions() {
        let (_dir, mut game, mut bot) = fixture();
        game.rng = 4;
        let mut reset = soft_reset(true);
        reset.poll(&mut FrameContext::new(&mut game, &mut bot)).unwrap();
        reset.poll(&mut FrameContext::new(&mut game, &mut bot)).unwrap();
        assert_eq!(game.presses.last(), Some(&Button::Right));
    }

    // ── Walking ──

    #[test]
    fn walk_moves_x_then_y_and_releases() {
        let (_dir, mut game, mut bot) = fixture();
        game.player = Some(avatar(4, 9));
        let mut walk = walk_to(MapLocation::new("LAVARIDGE_TOWN", 6, 10));
        let mut held = Vec::new();
        loop {
            let step = walk.poll(&mut FrameContext::new(&mut game, &mut bot)).unwrap();
            if step.is_done() {
                break;
            }
            held.push(game.held[0]);
            step_held(&mut game);
        }
        assert_eq!(held, vec![Button::Right, Button::Right, Button::Down]);
        assert!(game.held.is_empty());
    }

    #[test]
    fn walk_on_wrong_map_fails() {
        let (_dir, mut game, mut bot) = fixture();
        game.player = Some(avatar(4, 9));
        let mut walk = walk_to(MapLocation::new("ROUTE_112", 1, 1));
        let err = walk
            .poll(&mut FrameContext::new(&mut game, &mut bot))
            .unwrap_err();
        assert!(matches!(err, BotError::Mode(_)));
    }

    #[test]
    fn patrol_turns_around_and_stops() {
        let (_dir, mut game, mut bot) = fixture();
        game.player = Some(avatar(4, 9));
        let mut patrol = patrol(
            MapLocation::new("LAVARIDGE_TOWN", 4, 9),
            MapLocation::new("LAVARIDGE_TOWN", 6, 9),
            |cx: &mut FrameContext<'_>| cx.game.event_flag("EGG_HATCHED"),
        );
        let mut xs = Vec::new();
        for _ in 0..8 {
            patrol.poll(&mut FrameContext::new(&mut game, &mut bot)).unwrap();
            step_held(&mut game);
            xs.push(game.player.as_ref().unwrap().location.x);
        }
        assert!(xs.contains(&6));
        assert!(xs.iter().rev().take(3).any(|x| *x < 6));

        game.set_flag("EGG_HATCHED");
        game.held = vec![Button::Left];
        assert!(
            patrol
                .poll(&mut FrameContext::new(&mut game, &mut bot))
                .unwrap()
                .is_done()
        );
        assert!(game.held.is_empty());
    }

    // ── Menus ──

    #[test]
    fn party_summary_navigation() {
        let (_dir, mut game, mut bot) = fixture();
        game.set_flag("SYS_POKEDEX_GET");
        let mut open = open_party_summary(2);

        open.poll(&mut FrameContext::new(&mut game, &mut bot)).unwrap();
        assert_eq!(game.presses.last(), Some(&Button::Start));

        game.phase = GamePhase::StartMenu;
        game.menu_cursor = Some(0);
        open.poll(&mut FrameContext::new(&mut game, &mut bot)).unwrap();
        assert_eq!(game.presses.last(), Some(&Button::Down));
        game.menu_cursor = Some(1);
        open.poll(&mut FrameContext::new(&mut game, &mut bot)).unwrap();
        assert_eq!(game.presses.last(), Some(&Button::A));

        game.phase = GamePhase::PartyMenu;
        game.menu_cursor = Some(2);
        open.poll(&mut FrameContext::new(&mut game, &mut bot)).unwrap();
        assert_eq!(game.presses.last(), Some(&Button::A));

        game.menu_cursor = Some(0);
        open.poll(&mut FrameContext::new(&mut game, &mut bot)).unwrap();
        assert_eq!(game.presses.last(), Some(&Button::A));

        game.phase = GamePhase::Summary;
        assert!(
            open.poll(&mut FrameContext::new(&mut game, &mut bot))
                .unwrap()
                .is_done()
        );
    }
}
