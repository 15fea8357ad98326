//! Entity state: fighters, fuel tanks, round phase and population snapshots.
//!
//! `Arena` is the per-round entity store. It owns the live lists; everything
//! else only sees the snapshots built from it.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::FighterConfig;
use crate::game::constants::scale_to_radius;
use crate::game::systems::physics::Body;
use crate::util::timer::Countdown;
use crate::util::vec2::{lerp_yaw, Vec2};

/// Unique fighter identifier
pub type FighterId = Uuid;

/// Identifier for fuel tanks (monotonic within a round)
pub type ResourceId = u64;

/// Who decides where a fighter goes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FighterKind {
    Player,
    Autonomous,
}

/// Where a growth event's fuel came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FuelSource {
    Tank(ResourceId),
    /// Residual fuel of a destroyed fighter, with its mass at destruction
    Fighter { id: FighterId, mass: f32 },
}

/// Fighter state shared by player and autonomous fighters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fighter {
    // === HOT FIELDS (every tick) ===
    pub body: Body,
    /// Yaw on the horizontal plane
    pub yaw: f32,
    pub alive: bool,
    /// Frozen fighters neither steer nor propel (countdown)
    pub active: bool,

    // === WARM FIELDS (collisions / growth) ===
    pub fuel: u32,
    /// Visual scale; collision radius follows it
    pub scale: f32,
    /// Fighter that receives this one's residual fuel on destruction.
    /// Single slot: each new collision overwrites it.
    pub pending_beneficiary: Option<FighterId>,

    // === COLD FIELDS ===
    pub id: FighterId,
    pub kind: FighterKind,
    pub name: String,
}

impl Fighter {
    pub fn new(
        id: FighterId,
        name: String,
        kind: FighterKind,
        position: Vec2,
        yaw: f32,
        config: &FighterConfig,
    ) -> Self {
        Self {
            body: Body::new(position, config.initial_mass, config.drag),
            yaw,
            alive: true,
            active: false,
            fuel: config.initial_fuel,
            scale: config.initial_scale,
            pending_beneficiary: None,
            id,
            kind,
            name,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.body.mass
    }

    #[inline]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_yaw(self.yaw)
    }

    pub fn radius(&self) -> f32 {
        scale_to_radius(self.scale)
    }

    pub fn is_player(&self) -> bool {
        self.kind == FighterKind::Player
    }

    /// Blend the heading toward `desired` by `t` of the remaining arc.
    /// `None` keeps the current heading.
    pub fn turn_toward(&mut self, desired: Option<f32>, t: f32) {
        if let Some(target) = desired {
            self.yaw = lerp_yaw(self.yaw, target, t);
        }
    }

    /// Record `other` as the recipient of this fighter's residual fuel.
    /// Replaces any previous registration and returns it.
    pub fn register_collision(&mut self, other: FighterId) -> Option<FighterId> {
        if other == self.id {
            return self.pending_beneficiary;
        }
        self.pending_beneficiary.replace(other)
    }

    /// Impulse this fighter pushes onto a fighter at `other_position`.
    ///
    /// Only head-on hits count: the direction to the other fighter must lie
    /// within 90° of `forward`. The result is applied to the other fighter and
    /// its negation to self.
    pub fn collision_impulse(&self, other_position: Vec2, bounciness: f32) -> Option<Vec2> {
        let forward = self.forward();
        let to_other = other_position - self.position();
        if to_other.length_sq() <= f32::EPSILON {
            return None;
        }
        let angle = to_other.angle_between(forward);
        if angle < std::f32::consts::FRAC_PI_2 {
            Some(forward * (self.mass() * bounciness * angle.cos()))
        } else {
            None
        }
    }

    /// Add fuel; mass and scale grow proportionally.
    pub fn grow(&mut self, amount: u32, config: &FighterConfig) {
        self.fuel = self.fuel.saturating_add(amount);
        self.scale += amount as f32 * config.scale_per_unit_fuel;
        self.body.mass += amount as f32 * config.mass_per_unit_fuel;
    }

    pub fn snapshot(&self) -> FighterSnapshot {
        FighterSnapshot {
            id: self.id,
            mass: self.mass(),
        }
    }
}

/// Single-use fuel pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelTank {
    pub id: ResourceId,
    pub position: Vec2,
    pub capacity: u32,
    pub consumed: bool,
    /// First fighter that touched the tank; never changes once set
    pub beneficiary: Option<FighterId>,
    /// Shrink delay between consumption and removal
    pub removal: Countdown,
}

impl FuelTank {
    pub fn new(id: ResourceId, position: Vec2, capacity: u32) -> Self {
        Self {
            id,
            position,
            capacity,
            consumed: false,
            beneficiary: None,
            removal: Countdown::idle(),
        }
    }

    /// Register `fighter` as the sole beneficiary. The first registrant wins;
    /// later calls return false and change nothing.
    pub fn consume(&mut self, fighter: FighterId, removal_delay: f32) -> bool {
        if self.consumed {
            return false;
        }
        self.consumed = true;
        self.beneficiary = Some(fighter);
        self.removal.start(removal_delay);
        true
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            id: self.id,
            position: self.position,
        }
    }
}

/// Round phase
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoundPhase {
    /// Countdown before fighters are released
    #[default]
    Starting,
    /// Round in progress
    Continuing,
    /// Results are shown; the arena is reseeded afterwards
    Ending,
}

/// Entry of the live-fighter broadcast
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FighterSnapshot {
    pub id: FighterId,
    /// Mass at broadcast time
    pub mass: f32,
}

/// Entry of the live-resource broadcast
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ResourceSnapshot {
    pub id: ResourceId,
    pub position: Vec2,
}

/// Entities of one round
#[derive(Debug, Clone, Default)]
pub struct Arena {
    pub fighters: HashMap<FighterId, Fighter>,
    /// Live fighters in placement order
    order: Vec<FighterId>,
    /// Live tanks in spawn order (consumed tanks stay until removed)
    pub tanks: Vec<FuelTank>,
    pub player_id: Option<FighterId>,
    next_resource_id: ResourceId,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fighter to the live list; the first player added becomes the player
    pub fn add_fighter(&mut self, fighter: Fighter) {
        if fighter.is_player() && self.player_id.is_none() {
            self.player_id = Some(fighter.id);
        }
        self.order.push(fighter.id);
        self.fighters.insert(fighter.id, fighter);
    }

    /// Mark a fighter dead and drop it from the live list.
    /// The entity stays readable until the arena is rebuilt.
    pub fn remove_fighter(&mut self, id: FighterId) -> Option<&Fighter> {
        let fighter = self.fighters.get_mut(&id)?;
        if !fighter.alive {
            return None;
        }
        fighter.alive = false;
        fighter.active = false;
        self.order.retain(|f| *f != id);
        self.fighters.get(&id)
    }

    pub fn get_fighter(&self, id: FighterId) -> Option<&Fighter> {
        self.fighters.get(&id)
    }

    pub fn get_fighter_mut(&mut self, id: FighterId) -> Option<&mut Fighter> {
        self.fighters.get_mut(&id)
    }

    /// Live fighter lookup; dead fighters are invisible
    pub fn live_fighter(&self, id: FighterId) -> Option<&Fighter> {
        self.fighters.get(&id).filter(|f| f.alive)
    }

    pub fn player(&self) -> Option<&Fighter> {
        self.player_id.and_then(|id| self.fighters.get(&id))
    }

    pub fn live_ids(&self) -> &[FighterId] {
        &self.order
    }

    /// Live fighters in placement order
    pub fn live_fighters(&self) -> impl Iterator<Item = &Fighter> {
        self.order.iter().filter_map(|id| self.fighters.get(id))
    }

    pub fn live_count(&self) -> usize {
        self.order.len()
    }

    pub fn spawn_tank(&mut self, position: Vec2, capacity: u32) -> ResourceId {
        let id = self.next_resource_id;
        self.next_resource_id += 1;
        self.tanks.push(FuelTank::new(id, position, capacity));
        id
    }

    pub fn tank(&self, id: ResourceId) -> Option<&FuelTank> {
        self.tanks.iter().find(|t| t.id == id)
    }

    pub fn tank_mut(&mut self, id: ResourceId) -> Option<&mut FuelTank> {
        self.tanks.iter_mut().find(|t| t.id == id)
    }

    pub fn remove_tank(&mut self, id: ResourceId) -> Option<FuelTank> {
        let index = self.tanks.iter().position(|t| t.id == id)?;
        Some(self.tanks.remove(index))
    }

    pub fn fighter_snapshot(&self) -> Vec<FighterSnapshot> {
        self.live_fighters().map(Fighter::snapshot).collect()
    }

    pub fn resource_snapshot(&self) -> Vec<ResourceSnapshot> {
        self.tanks.iter().map(FuelTank::snapshot).collect()
    }
}
