//! Heading selection seam shared by the player and autonomous pilots.

use crate::game::state::{Arena, Fighter};

/// Chooses where a fighter wants to face.
///
/// Implementations only read the arena; the round applies the returned yaw
/// through `Fighter::turn_toward`.
pub trait Steering {
    /// Desired yaw for `me` at simulation time `now`, or `None` to keep the
    /// current heading.
    fn choose_heading(&mut self, me: &Fighter, arena: &Arena, now: f32) -> Option<f32>;
}

/// Fraction of the remaining yaw error closed during one tick
#[inline]
pub fn blend_factor(rotation_rate: f32, dt: f32) -> f32 {
    (rotation_rate * dt).clamp(0.0, 1.0)
}
