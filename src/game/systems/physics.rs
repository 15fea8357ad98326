//! Stand-in rigid-body integration.
//!
//! The core only talks to bodies through `add_force` / `add_impulse`; everything
//! else in this module is the minimal solver the headless runner needs.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game::state::Arena;
use crate::util::vec2::Vec2;

/// Rigid body on the horizontal plane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
    /// Linear drag per second
    pub drag: f32,
    /// Force accumulated since the last integration step
    #[serde(skip)]
    force: Vec2,
}

impl Body {
    pub fn new(position: Vec2, mass: f32, drag: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            mass,
            drag,
            force: Vec2::ZERO,
        }
    }

    /// Continuous force, applied over the next integration step
    #[inline]
    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Instant change of momentum
    #[inline]
    pub fn add_impulse(&mut self, impulse: Vec2) {
        if self.mass > 0.0 {
            self.velocity += impulse * (1.0 / self.mass);
        }
    }

    /// Semi-implicit Euler step with linear drag
    pub fn integrate(&mut self, dt: f32) {
        if self.mass > 0.0 {
            self.velocity += self.force * (dt / self.mass);
        }
        self.velocity *= (1.0 - self.drag * dt).max(0.0);
        self.position += self.velocity * dt;
        self.force = Vec2::ZERO;
    }

    #[inline]
    pub fn pending_force(&self) -> Vec2 {
        self.force
    }
}

/// Apply propulsion to every active fighter and integrate all bodies.
///
/// Propulsion is `forward * speed_multiplier * mass`, so every fighter reaches
/// the same terminal speed `speed_multiplier / drag` regardless of its mass.
pub fn update(arena: &mut Arena, speed_multiplier: f32, dt: f32) {
    arena.fighters.par_values_mut().for_each(|fighter| {
        if !fighter.alive {
            return;
        }
        if fighter.active {
            let thrust = fighter.forward() * (speed_multiplier * fighter.body.mass);
            fighter.body.add_force(thrust);
        }
        fighter.body.integrate(dt);
    });
}

/// Terminal speed reached under constant propulsion
pub fn terminal_speed(speed_multiplier: f32, drag: f32) -> f32 {
    if drag > 0.0 {
        speed_multiplier / drag
    } else {
        f32::INFINITY
    }
}
