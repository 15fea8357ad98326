use hashbrown::HashMap;
use rand::rngs::SmallRng;
#[cfg(feature = "parallel_ai")]
use rayon::prelude::*;

use crate::config::{AiConfig, EdgeCheck};
use crate::game::constants::ai::MIN_SCORE_DISTANCE;
use crate::game::state::{Arena, Fighter, FighterId, FighterSnapshot, ResourceSnapshot};
use crate::game::systems::arena::{
    edge_limit, is_near_edge, random_point_in_square, safe_zone_half_width,
};
use crate::game::systems::steering::Steering;
use crate::util::vec2::{look_at, Vec2};

/// What a decision settled on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Head back toward the safe zone
    Retreat,
    /// Grab a fuel tank
    Scavenge,
    /// Ram a lighter fighter
    Attack,
    /// Run from a heavier fighter
    Escape,
}

/// Pilot parameters derived once per round
#[derive(Debug, Clone, Copy)]
pub struct PilotTuning {
    pub decision_interval: f32,
    pub target_tolerance: f32,
    pub edge_limit: f32,
    pub safe_half_width: f32,
    pub edge_check: EdgeCheck,
    pub escape_constant: f32,
    pub attack_constant: f32,
    pub scavenge_constant: f32,
    pub flee_distance: f32,
}

impl PilotTuning {
    pub fn new(config: &AiConfig, arena_size: f32) -> Self {
        Self {
            decision_interval: config.decision_interval,
            target_tolerance: config.target_tolerance,
            edge_limit: edge_limit(arena_size, config.min_safe_distance_from_edge),
            safe_half_width: safe_zone_half_width(arena_size, config.safe_zone_ratio),
            edge_check: config.edge_check,
            escape_constant: config.escape_constant,
            attack_constant: config.attack_constant,
            scavenge_constant: config.scavenge_constant,
            flee_distance: config.flee_distance,
        }
    }
}

/// Utility-scoring pilot for an autonomous fighter.
///
/// Threat and prey lists are partitioned at broadcast time; positions and
/// masses are re-read from the arena when scoring.
#[derive(Debug, Clone)]
pub struct UtilityPilot {
    id: FighterId,
    tuning: PilotTuning,
    threats: Vec<FighterId>,
    preys: Vec<FighterId>,
    resources: Vec<ResourceSnapshot>,
    target: Vec2,
    intent: Option<Intent>,
    last_decision: Option<f32>,
    rng: SmallRng,
}

impl UtilityPilot {
    pub fn new(id: FighterId, tuning: PilotTuning, rng: SmallRng) -> Self {
        Self {
            id,
            tuning,
            threats: Vec::new(),
            preys: Vec::new(),
            resources: Vec::new(),
            target: Vec2::ZERO,
            intent: None,
            last_decision: None,
            rng,
        }
    }

    pub fn id(&self) -> FighterId {
        self.id
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn intent(&self) -> Option<Intent> {
        self.intent
    }

    pub fn last_decision(&self) -> Option<f32> {
        self.last_decision
    }

    pub fn threats(&self) -> &[FighterId] {
        &self.threats
    }

    pub fn preys(&self) -> &[FighterId] {
        &self.preys
    }

    pub fn resources(&self) -> &[ResourceSnapshot] {
        &self.resources
    }

    /// Cache a fighter broadcast, split by mass relative to self
    pub fn observe_fighters(&mut self, fighters: &[FighterSnapshot]) {
        self.threats.clear();
        self.preys.clear();

        let Some(own_mass) = fighters.iter().find(|f| f.id == self.id).map(|f| f.mass) else {
            return;
        };

        for fighter in fighters {
            if fighter.id == self.id {
                continue;
            }
            if fighter.mass > own_mass {
                self.threats.push(fighter.id);
            } else {
                self.preys.push(fighter.id);
            }
        }
    }

    pub fn observe_resources(&mut self, resources: &[ResourceSnapshot]) {
        self.resources.clear();
        self.resources.extend_from_slice(resources);
    }

    fn needs_decision(&self, position: Vec2, now: f32) -> bool {
        match self.last_decision {
            None => true,
            Some(at) => {
                now - at >= self.tuning.decision_interval
                    || position.distance_to(self.target) <= self.tuning.target_tolerance
            }
        }
    }

    /// Score every cached candidate and pick a target.
    /// Returns `None` and keeps the old target when nothing is cached.
    fn decide(&mut self, me: &Fighter, arena: &Arena) -> Option<Intent> {
        let position = me.position();
        let own_mass = me.mass();

        let mut escape: Option<(f32, Vec2)> = None;
        for threat in self.threats.iter().filter_map(|id| arena.live_fighter(*id)) {
            let distance = position.distance_to(threat.position()).max(MIN_SCORE_DISTANCE);
            let score = self.tuning.escape_constant * (threat.mass() / own_mass) / distance;
            if escape.map_or(true, |(best, _)| score > best) {
                let away = position - threat.position().normalize() * self.tuning.flee_distance;
                escape = Some((score, away));
            }
        }

        let mut attack: Option<(f32, Vec2)> = None;
        for prey in self.preys.iter().filter_map(|id| arena.live_fighter(*id)) {
            let distance = position.distance_to(prey.position()).max(MIN_SCORE_DISTANCE);
            let score = self.tuning.attack_constant / ((prey.mass() / own_mass) * distance);
            if attack.map_or(true, |(best, _)| score > best) {
                attack = Some((score, prey.position()));
            }
        }

        let mut scavenge: Option<(f32, Vec2)> = None;
        for resource in &self.resources {
            let distance = position.distance_to(resource.position).max(MIN_SCORE_DISTANCE);
            let score = self.tuning.scavenge_constant / distance;
            if scavenge.map_or(true, |(best, _)| score > best) {
                scavenge = Some((score, resource.position));
            }
        }

        // Earlier entries win ties
        let ranked = [
            (Intent::Scavenge, scavenge),
            (Intent::Attack, attack),
            (Intent::Escape, escape),
        ];
        let mut pick: Option<(Intent, f32, Vec2)> = None;
        for (intent, best) in ranked {
            if let Some((score, target)) = best {
                if pick.map_or(true, |(_, top, _)| score > top) {
                    pick = Some((intent, score, target));
                }
            }
        }

        let (intent, score, target) = pick?;
        self.target = target;
        tracing::debug!(
            fighter = %self.id,
            ?intent,
            score,
            "Decision: target ({:.2}, {:.2})",
            target.x,
            target.z
        );
        Some(intent)
    }
}

impl Steering for UtilityPilot {
    fn choose_heading(&mut self, me: &Fighter, arena: &Arena, now: f32) -> Option<f32> {
        let position = me.position();

        if is_near_edge(position, self.tuning.edge_limit, self.tuning.edge_check) {
            self.target = random_point_in_square(&mut self.rng, self.tuning.safe_half_width);
            self.intent = Some(Intent::Retreat);
            self.last_decision = Some(now);
            return look_at(position, self.target);
        }

        // Heading only changes on decision ticks
        if !self.needs_decision(position, now) {
            return None;
        }
        self.last_decision = Some(now);
        let intent = self.decide(me, arena)?;
        self.intent = Some(intent);
        look_at(position, self.target)
    }
}

/// All autonomous pilots of a round, keyed by fighter
#[derive(Debug, Default)]
pub struct PilotRegistry {
    pilots: HashMap<FighterId, UtilityPilot>,
}

impl PilotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, pilot: UtilityPilot) {
        self.pilots.insert(pilot.id(), pilot);
    }

    /// Detach a pilot from future broadcasts
    pub fn unregister(&mut self, id: FighterId) -> Option<UtilityPilot> {
        self.pilots.remove(&id)
    }

    pub fn get(&self, id: FighterId) -> Option<&UtilityPilot> {
        self.pilots.get(&id)
    }

    pub fn len(&self) -> usize {
        self.pilots.len()
    }

    pub fn broadcast_fighters(&mut self, fighters: &[FighterSnapshot]) {
        for pilot in self.pilots.values_mut() {
            pilot.observe_fighters(fighters);
        }
        tracing::debug!("Broadcast {} fighters to {} pilots", fighters.len(), self.pilots.len());
    }

    pub fn broadcast_resources(&mut self, resources: &[ResourceSnapshot]) {
        for pilot in self.pilots.values_mut() {
            pilot.observe_resources(resources);
        }
        tracing::debug!("Broadcast {} resources to {} pilots", resources.len(), self.pilots.len());
    }

    /// Run one decision pass over every active pilot.
    ///
    /// Pilots only read the arena, so with `parallel_ai` they are evaluated
    /// with rayon. Headings are returned for the caller to apply.
    pub fn decide_all(&mut self, arena: &Arena, now: f32) -> Vec<(FighterId, Option<f32>)> {
        #[cfg(feature = "parallel_ai")]
        let pilots = self.pilots.par_values_mut();
        #[cfg(not(feature = "parallel_ai"))]
        let pilots = self.pilots.values_mut();

        pilots
            .filter_map(|pilot| {
                let me = arena.live_fighter(pilot.id())?;
                if !me.active {
                    return None;
                }
                Some((pilot.id(), pilot.choose_heading(me, arena, now)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FighterConfig;
    use crate::game::state::FighterKind;
    use rand::SeedableRng;
    use uuid::Uuid;

    const ARENA_SIZE: f32 = 30.0;

    fn tuning(check: EdgeCheck) -> PilotTuning {
        let config = AiConfig {
            edge_check: check,
            ..Default::default()
        };
        PilotTuning::new(&config, ARENA_SIZE)
    }

    fn add_fighter(arena: &mut Arena, position: Vec2, mass: f32) -> FighterId {
        let mut fighter = Fighter::new(
            Uuid::new_v4(),
            "Robot".to_string(),
            FighterKind::Autonomous,
            position,
            0.0,
            &FighterConfig::default(),
        );
        fighter.body.mass = mass;
        fighter.active = true;
        let id = fighter.id;
        arena.add_fighter(fighter);
        id
    }

    fn pilot_for(id: FighterId, check: EdgeCheck) -> UtilityPilot {
        UtilityPilot::new(id, tuning(check), SmallRng::seed_from_u64(7))
    }

    fn heading_of(pilot: &mut UtilityPilot, arena: &Arena, id: FighterId, now: f32) -> Option<f32> {
        let me = arena.get_fighter(id).unwrap().clone();
        pilot.choose_heading(&me, arena, now)
    }

    #[test]
    fn test_partition_by_mass() {
        let mut arena = Arena::new();
        let me = add_fighter(&mut arena, Vec2::ZERO, 2.0);
        let heavy = add_fighter(&mut arena, Vec2::new(3.0, 0.0), 3.0);
        let equal = add_fighter(&mut arena, Vec2::new(-3.0, 0.0), 2.0);
        let light = add_fighter(&mut arena, Vec2::new(0.0, 3.0), 1.0);

        let mut pilot = pilot_for(me, EdgeCheck::DepthAxisOnly);
        pilot.observe_fighters(&arena.fighter_snapshot());

        assert_eq!(pilot.threats(), &[heavy]);
        assert_eq!(pilot.preys(), &[equal, light]);
    }

    #[test]
    fn test_observe_without_self_clears() {
        let mut arena = Arena::new();
        add_fighter(&mut arena, Vec2::ZERO, 1.0);
        let mut pilot = pilot_for(Uuid::new_v4(), EdgeCheck::DepthAxisOnly);
        pilot.observe_fighters(&arena.fighter_snapshot());
        assert!(pilot.threats().is_empty());
        assert!(pilot.preys().is_empty());
    }

    #[test]
    fn test_scavenge_wins_tie_with_attack() {
        let mut arena = Arena::new();
        let me = add_fighter(&mut arena, Vec2::ZERO, 1.0);
        // attack = 2 / (1 * 4) = 0.5, scavenge = 1 / 2 = 0.5
        add_fighter(&mut arena, Vec2::new(4.0, 0.0), 1.0);
        let tank = arena.spawn_tank(Vec2::new(-2.0, 0.0), 5);

        let mut pilot = pilot_for(me, EdgeCheck::DepthAxisOnly);
        pilot.observe_fighters(&arena.fighter_snapshot());
        pilot.observe_resources(&arena.resource_snapshot());
        heading_of(&mut pilot, &arena, me, 0.0);

        assert_eq!(pilot.intent(), Some(Intent::Scavenge));
        assert_eq!(pilot.target(), arena.tank(tank).unwrap().position);
    }

    #[test]
    fn test_attack_wins_tie_with_escape() {
        let mut arena = Arena::new();
        let me = add_fighter(&mut arena, Vec2::ZERO, 1.0);
        // escape = 3 * 2 / 6 = 1.0, attack = 2 / (1 * 2) = 1.0
        add_fighter(&mut arena, Vec2::new(6.0, 0.0), 2.0);
        let prey = add_fighter(&mut arena, Vec2::new(0.0, 2.0), 1.0);

        let mut pilot = pilot_for(me, EdgeCheck::DepthAxisOnly);
        pilot.observe_fighters(&arena.fighter_snapshot());
        heading_of(&mut pilot, &arena, me, 0.0);

        assert_eq!(pilot.intent(), Some(Intent::Attack));
        assert_eq!(pilot.target(), arena.get_fighter(prey).unwrap().position());
    }

    #[test]
    fn test_escape_target_formula() {
        let mut arena = Arena::new();
        let me = add_fighter(&mut arena, Vec2::new(1.0, 1.0), 1.0);
        add_fighter(&mut arena, Vec2::new(4.0, 1.0), 10.0);

        let mut pilot = pilot_for(me, EdgeCheck::DepthAxisOnly);
        pilot.observe_fighters(&arena.fighter_snapshot());
        heading_of(&mut pilot, &arena, me, 0.0);

        assert_eq!(pilot.intent(), Some(Intent::Escape));
        let threat = Vec2::new(4.0, 1.0);
        let expected = Vec2::new(1.0, 1.0) - threat.normalize() * 2.5;
        assert!(pilot.target().approx_eq(expected, 1e-5));
    }

    #[test]
    fn test_closest_tank_preferred() {
        let mut arena = Arena::new();
        let me = add_fighter(&mut arena, Vec2::ZERO, 1.0);
        arena.spawn_tank(Vec2::new(5.0, 0.0), 5);
        let near = arena.spawn_tank(Vec2::new(0.0, -2.0), 5);

        let mut pilot = pilot_for(me, EdgeCheck::DepthAxisOnly);
        pilot.observe_resources(&arena.resource_snapshot());
        let heading = heading_of(&mut pilot, &arena, me, 0.0).unwrap();

        assert_eq!(pilot.target(), arena.tank(near).unwrap().position);
        assert!(Vec2::from_yaw(heading).approx_eq(Vec2::new(0.0, -1.0), 1e-5));
    }

    #[test]
    fn test_empty_lists_hold_heading() {
        let mut arena = Arena::new();
        let me = add_fighter(&mut arena, Vec2::ZERO, 1.0);
        let mut pilot = pilot_for(me, EdgeCheck::DepthAxisOnly);
        pilot.observe_fighters(&arena.fighter_snapshot());

        assert!(heading_of(&mut pilot, &arena, me, 0.0).is_none());
        assert!(pilot.intent().is_none());
        assert_eq!(pilot.last_decision(), Some(0.0));
    }

    #[test]
    fn test_coincident_positions_stay_finite() {
        let mut arena = Arena::new();
        let me = add_fighter(&mut arena, Vec2::ZERO, 1.0);
        add_fighter(&mut arena, Vec2::ZERO, 1.0);
        arena.spawn_tank(Vec2::ZERO, 5);

        let mut pilot = pilot_for(me, EdgeCheck::DepthAxisOnly);
        pilot.observe_fighters(&arena.fighter_snapshot());
        pilot.observe_resources(&arena.resource_snapshot());
        heading_of(&mut pilot, &arena, me, 0.0);

        assert!(pilot.target().x.is_finite() && pilot.target().z.is_finite());
    }

    #[test]
    fn test_holds_decision_between_intervals() {
        let mut arena = Arena::new();
        let me = add_fighter(&mut arena, Vec2::ZERO, 1.0);
        let first = arena.spawn_tank(Vec2::new(3.0, 0.0), 5);

        let mut pilot = pilot_for(me, EdgeCheck::DepthAxisOnly);
        pilot.observe_resources(&arena.resource_snapshot());
        heading_of(&mut pilot, &arena, me, 0.0);
        assert_eq!(pilot.target(), Vec2::new(3.0, 0.0));

        // A closer tank appears; the pilot keeps its plan until the interval passes
        arena.remove_tank(first);
        arena.spawn_tank(Vec2::new(-1.0, 0.0), 5);
        pilot.observe_resources(&arena.resource_snapshot());

        heading_of(&mut pilot, &arena, me, 0.5);
        assert_eq!(pilot.target(), Vec2::new(3.0, 0.0));
        assert_eq!(pilot.last_decision(), Some(0.0));

        heading_of(&mut pilot, &arena, me, 0.8);
        assert_eq!(pilot.target(), Vec2::new(-1.0, 0.0));
        assert_eq!(pilot.last_decision(), Some(0.8));
    }

    #[test]
    fn test_heading_only_on_decision_ticks() {
        let mut arena = Arena::new();
        let me = add_fighter(&mut arena, Vec2::ZERO, 1.0);
        arena.spawn_tank(Vec2::new(5.0, 0.0), 5);

        let mut pilot = pilot_for(me, EdgeCheck::DepthAxisOnly);
        pilot.observe_resources(&arena.resource_snapshot());

        let decided = heading_of(&mut pilot, &arena, me, 0.0).unwrap();
        assert!((decided - std::f32::consts::FRAC_PI_2).abs() < 1e-5);

        // Target still far and the interval not elapsed: keep the current rotation
        assert!(heading_of(&mut pilot, &arena, me, 0.4).is_none());
        assert_eq!(pilot.intent(), Some(Intent::Scavenge));

        assert!(heading_of(&mut pilot, &arena, me, 0.8).is_some());
    }

    #[test]
    fn test_redecides_when_target_reached() {
        let mut arena = Arena::new();
        let me = add_fighter(&mut arena, Vec2::ZERO, 1.0);
        arena.spawn_tank(Vec2::new(0.0, 0.01), 5);

        let mut pilot = pilot_for(me, EdgeCheck::DepthAxisOnly);
        pilot.observe_resources(&arena.resource_snapshot());
        heading_of(&mut pilot, &arena, me, 0.0);
        heading_of(&mut pilot, &arena, me, 0.1);
        assert_eq!(pilot.last_decision(), Some(0.1));
    }

    #[test]
    fn test_edge_override_rerolls_every_tick() {
        let mut arena = Arena::new();
        let me = add_fighter(&mut arena, Vec2::new(0.0, 14.0), 1.0);
        arena.spawn_tank(Vec2::new(0.0, 14.5), 5);

        let mut pilot = pilot_for(me, EdgeCheck::DepthAxisOnly);
        pilot.observe_resources(&arena.resource_snapshot());

        let mut targets = Vec::new();
        for step in 0..5 {
            heading_of(&mut pilot, &arena, me, step as f32 * 0.01);
            assert_eq!(pilot.intent(), Some(Intent::Retreat));
            let target = pilot.target();
            assert!(target.x.abs() <= 6.0 && target.z.abs() <= 6.0);
            targets.push(target);
        }
        targets.dedup();
        assert!(targets.len() > 1);
    }

    #[test]
    fn test_depth_only_ignores_side_edge() {
        let mut arena = Arena::new();
        let me = add_fighter(&mut arena, Vec2::new(14.0, 0.0), 1.0);
        arena.spawn_tank(Vec2::new(14.0, 2.0), 5);

        let mut depth = pilot_for(me, EdgeCheck::DepthAxisOnly);
        depth.observe_resources(&arena.resource_snapshot());
        heading_of(&mut depth, &arena, me, 0.0);
        assert_eq!(depth.intent(), Some(Intent::Scavenge));

        let mut both = pilot_for(me, EdgeCheck::BothAxes);
        both.observe_resources(&arena.resource_snapshot());
        heading_of(&mut both, &arena, me, 0.0);
        assert_eq!(both.intent(), Some(Intent::Retreat));
    }

    #[test]
    fn test_dead_fighters_are_skipped() {
        let mut arena = Arena::new();
        let me = add_fighter(&mut arena, Vec2::ZERO, 1.0);
        let prey = add_fighter(&mut arena, Vec2::new(1.0, 0.0), 0.5);

        let mut pilot = pilot_for(me, EdgeCheck::DepthAxisOnly);
        pilot.observe_fighters(&arena.fighter_snapshot());
        arena.remove_fighter(prey);

        assert!(heading_of(&mut pilot, &arena, me, 0.0).is_none());
    }

    #[test]
    fn test_registry_broadcast_and_unregister() {
        let mut arena = Arena::new();
        let a = add_fighter(&mut arena, Vec2::new(-3.0, 0.0), 1.0);
        let b = add_fighter(&mut arena, Vec2::new(3.0, 0.0), 2.0);

        let mut registry = PilotRegistry::new();
        registry.register(pilot_for(a, EdgeCheck::DepthAxisOnly));
        registry.register(pilot_for(b, EdgeCheck::DepthAxisOnly));
        registry.broadcast_fighters(&arena.fighter_snapshot());

        assert_eq!(registry.get(a).unwrap().threats(), &[b]);
        assert_eq!(registry.get(b).unwrap().preys(), &[a]);

        assert!(registry.unregister(b).is_some());
        arena.remove_fighter(b);
        registry.broadcast_fighters(&arena.fighter_snapshot());
        assert_eq!(registry.len(), 1);
        assert!(registry.get(a).unwrap().threats().is_empty());
    }

    #[test]
    fn test_decide_all_skips_frozen() {
        let mut arena = Arena::new();
        let a = add_fighter(&mut arena, Vec2::ZERO, 1.0);
        let b = add_fighter(&mut arena, Vec2::new(5.0, 0.0), 1.0);
        arena.get_fighter_mut(b).unwrap().active = false;
        arena.spawn_tank(Vec2::new(0.0, 3.0), 5);

        let mut registry = PilotRegistry::new();
        registry.register(pilot_for(a, EdgeCheck::DepthAxisOnly));
        registry.register(pilot_for(b, EdgeCheck::DepthAxisOnly));
        registry.broadcast_resources(&arena.resource_snapshot());

        let headings = registry.decide_all(&arena, 0.0);
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].0, a);
        assert!(headings[0].1.is_some());
        assert!(registry.get(b).unwrap().last_decision().is_none());
    }
}
