//! Platform geometry: initial spawn circle, edge limit and central safe zone.

use rand::Rng;
use std::f32::consts::TAU;

use crate::config::EdgeCheck;
use crate::util::vec2::{look_at, Vec2};

/// One slot on the spawn circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Slot index `k`; the slot angle is `k * 2π / N`
    pub slot: usize,
    pub position: Vec2,
    /// Yaw facing the arena center
    pub yaw: f32,
}

/// Place `count` fighters evenly on a circle of radius `distance`.
///
/// Slot `k` sits at angle `k * 2π / count`, measured from +z toward +x.
/// Every placement faces the arena center.
pub fn spawn_circle(count: usize, distance: f32) -> Vec<Placement> {
    if count == 0 {
        return Vec::new();
    }
    let step = TAU / count as f32;
    (0..count)
        .map(|slot| {
            let angle = slot as f32 * step;
            let position = Vec2::from_yaw(angle) * distance;
            let yaw = look_at(position, Vec2::ZERO).unwrap_or(angle);
            Placement {
                slot,
                position,
                yaw,
            }
        })
        .collect()
}

/// Pick the player's slot uniformly among `count` slots
pub fn pick_player_slot<R: Rng + ?Sized>(rng: &mut R, count: usize) -> usize {
    if count == 0 {
        0
    } else {
        rng.gen_range(0..count)
    }
}

/// Coordinate beyond which an autonomous pilot abandons its plan
#[inline]
pub fn edge_limit(arena_size: f32, min_safe_distance_from_edge: f32) -> f32 {
    arena_size / 2.0 - min_safe_distance_from_edge
}

/// Half-width of the central safe square
#[inline]
pub fn safe_zone_half_width(arena_size: f32, safe_zone_ratio: f32) -> f32 {
    arena_size * safe_zone_ratio
}

pub fn is_near_edge(position: Vec2, edge_limit: f32, check: EdgeCheck) -> bool {
    match check {
        EdgeCheck::DepthAxisOnly => position.z.abs() >= edge_limit,
        EdgeCheck::BothAxes => position.x.abs() >= edge_limit || position.z.abs() >= edge_limit,
    }
}

/// Uniform point in the square `[-half_width, half_width]²`
pub fn random_point_in_square<R: Rng + ?Sized>(rng: &mut R, half_width: f32) -> Vec2 {
    if half_width <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        rng.gen_range(-half_width..=half_width),
        rng.gen_range(-half_width..=half_width),
    )
}

/// Whether a position has left the platform
#[inline]
pub fn is_off_platform(position: Vec2, half_size: f32) -> bool {
    position.x.abs() > half_size || position.z.abs() > half_size
}
