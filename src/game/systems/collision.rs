//! Stand-in contact detection: circle overlaps between fighters and tanks,
//! plus the drop detector for fighters that leave the platform.
//!
//! Fighter pairs only report on the step their overlap begins.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::game::state::{Arena, FighterId, ResourceId};
use crate::game::systems::arena::is_off_platform;

/// Contact reported to the round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Two fighters started touching
    Fighters(FighterId, FighterId),
    /// A fighter touches an unconsumed tank
    Resource(FighterId, ResourceId),
    /// A fighter left the platform
    Dropped(FighterId),
}

pub type Contacts = SmallVec<[Contact; 8]>;

/// Fighter pairs that overlapped on the previous step
#[derive(Debug, Clone, Default)]
pub struct ContactTracker {
    touching: FxHashSet<(FighterId, FighterId)>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touching_pairs(&self) -> usize {
        self.touching.len()
    }

    /// Detect all contacts for the current body positions
    pub fn detect(&mut self, arena: &Arena, half_size: f32, pickup_radius: f32) -> Contacts {
        let mut contacts = Contacts::new();
        let mut touching = FxHashSet::default();

        let live: SmallVec<[_; 16]> = arena.live_fighters().collect();

        for (i, a) in live.iter().enumerate() {
            for b in &live[i + 1..] {
                let reach = a.radius() + b.radius();
                if a.position().distance_sq_to(b.position()) <= reach * reach {
                    let pair = ordered(a.id, b.id);
                    if !self.touching.contains(&pair) {
                        contacts.push(Contact::Fighters(a.id, b.id));
                    }
                    touching.insert(pair);
                }
            }
        }

        for fighter in &live {
            let reach = fighter.radius() + pickup_radius;
            for tank in arena.tanks.iter().filter(|t| !t.consumed) {
                if fighter.position().distance_sq_to(tank.position) <= reach * reach {
                    contacts.push(Contact::Resource(fighter.id, tank.id));
                }
            }
        }

        for fighter in &live {
            if is_off_platform(fighter.position(), half_size) {
                contacts.push(Contact::Dropped(fighter.id));
            }
        }

        self.touching = touching;
        contacts
    }
}

fn ordered(a: FighterId, b: FighterId) -> (FighterId, FighterId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
