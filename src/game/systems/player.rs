//! Player pilot: pointer steering, score accrual and the growth popup.

use serde::{Deserialize, Serialize};

use crate::game::constants::scoring::{
    POINTS_PER_ABSORBED_MASS, POINTS_PER_FUEL, POINTS_PER_SECOND, POPUP_DURATION,
};
use crate::game::state::{Arena, Fighter, FuelSource};
use crate::game::systems::steering::Steering;
use crate::util::timer::Countdown;
use crate::util::vec2::{look_at, Vec2};

/// Top-down orthographic mapping between screen pixels and the arena plane.
///
/// Screen y grows downward, world z grows upward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScreenProjection {
    pub width: f32,
    pub height: f32,
    /// World point under the screen center
    pub center: Vec2,
    pub pixels_per_unit: f32,
}

impl ScreenProjection {
    /// Viewport of `width` x `height` pixels showing the whole arena
    pub fn fit_arena(width: f32, height: f32, arena_size: f32) -> Self {
        let pixels_per_unit = if arena_size > 0.0 {
            width.min(height) / arena_size
        } else {
            1.0
        };
        Self {
            width,
            height,
            center: Vec2::ZERO,
            pixels_per_unit,
        }
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let ppu = self.pixels_per_unit.max(f32::EPSILON);
        Vec2::new(
            self.center.x + (screen.x - self.width / 2.0) / ppu,
            self.center.z - (screen.z - self.height / 2.0) / ppu,
        )
    }
}

impl Default for ScreenProjection {
    fn default() -> Self {
        Self::fit_arena(1280.0, 720.0, crate::game::constants::arena::SIZE)
    }
}

/// Pilot and scoreboard of the human-controlled fighter
#[derive(Debug, Clone)]
pub struct PlayerPilot {
    projection: ScreenProjection,
    /// Latest pointer position in screen pixels
    pointer: Option<Vec2>,
    score: u32,
    /// Time toward the next per-second award
    second_progress: f32,
    popup: Countdown,
    popup_amount: u32,
}

impl PlayerPilot {
    pub fn new(projection: ScreenProjection) -> Self {
        Self {
            projection,
            pointer: None,
            score: 0,
            second_progress: 0.0,
            popup: Countdown::idle(),
            popup_amount: 0,
        }
    }

    pub fn set_pointer(&mut self, screen: Option<Vec2>) {
        self.pointer = screen;
    }

    pub fn pointer_world(&self) -> Option<Vec2> {
        self.pointer.map(|p| self.projection.screen_to_world(p))
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Award points for every full second survived
    pub fn accrue(&mut self, dt: f32) {
        self.second_progress += dt;
        while self.second_progress >= 1.0 {
            self.second_progress -= 1.0;
            self.score += POINTS_PER_SECOND;
        }
    }

    /// Score a growth event and (re)start the popup. Returns the points earned.
    pub fn on_growth(&mut self, amount: u32, source: FuelSource) -> u32 {
        let mut points = amount * POINTS_PER_FUEL;
        if let FuelSource::Fighter { mass, .. } = source {
            points += (mass * POINTS_PER_ABSORBED_MASS).trunc().max(0.0) as u32;
        }
        self.score += points;
        self.popup_amount = amount;
        self.popup.start(POPUP_DURATION);
        points
    }

    /// Fuel amount shown by the popup while it is visible
    pub fn popup(&self) -> Option<u32> {
        self.popup.is_running().then_some(self.popup_amount)
    }

    pub fn tick_popup(&mut self, dt: f32) {
        self.popup.tick(dt);
    }
}

impl Default for PlayerPilot {
    fn default() -> Self {
        Self::new(ScreenProjection::default())
    }
}

impl Steering for PlayerPilot {
    fn choose_heading(&mut self, me: &Fighter, _arena: &Arena, _now: f32) -> Option<f32> {
        let target = self.pointer_world()?;
        look_at(me.position(), target)
    }
}
