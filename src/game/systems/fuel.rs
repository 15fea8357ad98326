//! Fuel tank spawning and removal.
//!
//! Tanks are placed by rejection sampling in the platform's bounding square,
//! keeping every live tank at least `min_distance` from every other.

use rand::Rng;
use smallvec::SmallVec;

use crate::config::FuelConfig;
use crate::game::state::{Arena, FuelTank};
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PlacementError {
    #[error("no free position found after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Sample a position in `[-half_size, half_size]²` that keeps `min_distance`
/// from every point in `occupied`.
pub fn find_position<R: Rng + ?Sized>(
    rng: &mut R,
    half_size: f32,
    min_distance: f32,
    occupied: &[Vec2],
    max_attempts: u32,
) -> Result<Vec2, PlacementError> {
    let min_sq = min_distance * min_distance;
    for _ in 0..max_attempts {
        let candidate = Vec2::new(
            rng.gen_range(-half_size..=half_size),
            rng.gen_range(-half_size..=half_size),
        );
        if occupied.iter().all(|p| p.distance_sq_to(candidate) >= min_sq) {
            return Ok(candidate);
        }
    }
    Err(PlacementError::Exhausted {
        attempts: max_attempts,
    })
}

/// Spawn tanks until the arena holds `max_count`. Returns how many were added.
///
/// A tank whose placement budget runs out is skipped.
pub fn top_up<R: Rng + ?Sized>(
    arena: &mut Arena,
    config: &FuelConfig,
    half_size: f32,
    rng: &mut R,
) -> usize {
    let missing = config.max_count.saturating_sub(arena.tanks.len());
    let mut occupied: Vec<Vec2> = arena.tanks.iter().map(|t| t.position).collect();
    let mut spawned = 0;

    for _ in 0..missing {
        match find_position(
            rng,
            half_size,
            config.min_distance,
            &occupied,
            config.max_placement_attempts,
        ) {
            Ok(position) => {
                arena.spawn_tank(position, config.capacity);
                occupied.push(position);
                spawned += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping fuel tank spawn: {}", e);
            }
        }
    }

    if spawned > 0 {
        tracing::debug!("Spawned {} fuel tanks ({} live)", spawned, arena.tanks.len());
    }
    spawned
}

/// Advance removal countdowns of consumed tanks and take out those that expired
pub fn collect_expired(arena: &mut Arena, dt: f32) -> SmallVec<[FuelTank; 4]> {
    let mut expired = SmallVec::new();
    let mut i = 0;
    while i < arena.tanks.len() {
        if arena.tanks[i].removal.tick(dt) {
            expired.push(arena.tanks.remove(i));
        } else {
            i += 1;
        }
    }
    expired
}
