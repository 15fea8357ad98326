//! Default tuning values. Every value here can be overridden through `RoundConfig`.

/// Arena/platform constants
pub mod arena {
    /// Side length of the square platform
    pub const SIZE: f32 = 30.0;
    /// Platform area budgeted per fighter: fighter count = round(SIZE² / AREA_PER_FIGHTER)
    pub const AREA_PER_FIGHTER: f32 = 100.0;
    /// Spawn circle radius as a fraction of the half-size
    pub const DISTANCE_FROM_CENTER_RATIO: f32 = 0.6;
    /// Minimum number of fighters in a round (player + one opponent)
    pub const MIN_FIGHTERS: usize = 2;
}

/// Fighter body and growth constants
pub mod fighter {
    /// Propulsion acceleration; force applied is SPEED_MULTIPLIER * mass
    pub const SPEED_MULTIPLIER: f32 = 4.0;
    /// Linear drag per second. Terminal speed = SPEED_MULTIPLIER / DRAG
    pub const DRAG: f32 = 1.0;
    /// Fraction of the remaining yaw error closed per second
    pub const ROTATION_RATE: f32 = 4.0;
    /// Impulse multiplier on head-on collisions
    pub const COLLISION_BOUNCINESS: f32 = 3.0;
    /// Fuel every fighter starts with (paid out on destruction)
    pub const INITIAL_FUEL: u32 = 10;
    /// Mass at spawn
    pub const INITIAL_MASS: f32 = 1.0;
    /// Visual scale at spawn
    pub const INITIAL_SCALE: f32 = 1.0;
    /// Mass gained per unit of fuel
    pub const MASS_PER_UNIT_FUEL: f32 = 0.1;
    /// Scale gained per unit of fuel
    pub const SCALE_PER_UNIT_FUEL: f32 = 0.02;
    /// Collision radius at scale 1.0
    pub const BASE_RADIUS: f32 = 0.5;
}

/// Fuel tank constants
pub mod fuel {
    /// Fuel units granted by one tank
    pub const CAPACITY: u32 = 5;
    /// Minimum distance between two live tanks
    pub const MIN_DISTANCE: f32 = 3.0;
    /// Tank population the spawner tops up to
    pub const MAX_COUNT: usize = 12;
    /// Seconds between spawner top-ups
    pub const SPAWN_INTERVAL: f32 = 1.5;
    /// Delay between first contact and removal (shrink animation length)
    pub const REMOVAL_DELAY: f32 = 10.0 / 30.0;
    /// Pickup radius of a tank
    pub const PICKUP_RADIUS: f32 = 0.4;
    /// Rejection-sampling budget per tank before the spawn is skipped
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 30;
}

/// Autonomous pilot constants
pub mod ai {
    /// Minimum time between two decisions
    pub const DECISION_INTERVAL: f32 = 0.8;
    /// Distance at which the current target counts as reached
    pub const TARGET_TOLERANCE: f32 = 0.05;
    /// Distance from the platform edge where the edge override kicks in
    pub const MIN_SAFE_DISTANCE_FROM_EDGE: f32 = 2.0;
    /// Half-width of the central safe square as a fraction of the arena size
    pub const SAFE_ZONE_RATIO: f32 = 0.2;
    pub const ESCAPE_CONSTANT: f32 = 3.0;
    pub const ATTACK_CONSTANT: f32 = 2.0;
    pub const SCAVENGE_CONSTANT: f32 = 1.0;
    /// How far behind self the flee target is placed
    pub const FLEE_DISTANCE: f32 = 2.5;
    /// Distance floor for utility scores
    pub const MIN_SCORE_DISTANCE: f32 = 1e-3;
}

/// Round timing constants (seconds)
pub mod round {
    /// Countdown before fighters are released
    pub const START_TIME: f32 = 3.0;
    /// Round time budget
    pub const ROUND_TIME: f32 = 60.0;
    /// How long results are shown before the arena is reseeded
    pub const RESULT_SCREEN_TIME: f32 = 5.0;
}

/// Player scoring constants
pub mod scoring {
    /// Awarded for every full second survived
    pub const POINTS_PER_SECOND: u32 = 50;
    /// Awarded per unit of fuel consumed
    pub const POINTS_PER_FUEL: u32 = 2;
    /// Awarded per unit of mass of an absorbed fighter
    pub const POINTS_PER_ABSORBED_MASS: f32 = 15.0;
    /// Score popup visibility window
    pub const POPUP_DURATION: f32 = 1.5;
}

/// Runner tick rates
pub mod tick {
    /// Variable-rate simulation tick (decisions, timers)
    pub const SIMULATION_RATE: u32 = 60;
    /// Fixed-rate physics tick (propulsion, contacts)
    pub const PHYSICS_RATE: u32 = 50;
    pub const PHYSICS_DT: f32 = 1.0 / PHYSICS_RATE as f32;
}

/// Expected fighter count for a square platform. Halves round to even.
#[inline]
pub fn fighter_count(arena_size: f32, area_per_fighter: f32) -> usize {
    (arena_size * arena_size / area_per_fighter)
        .round_ties_even()
        .max(0.0) as usize
}

/// Collision radius for a fighter of the given visual scale
#[inline]
pub fn scale_to_radius(scale: f32) -> f32 {
    scale * fighter::BASE_RADIUS
}
