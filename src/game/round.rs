//! Round orchestrator
//!
//! Owns the per-round context (fighters, tanks, pilots, contact bookkeeping),
//! runs the Starting → Continuing → Ending state machine and keeps every
//! autonomous pilot's view of the population current.
//!
//! Two entry points advance a round:
//! - `tick(dt)`: state machine, decisions, heading blend, cosmetic timers
//! - `physics_tick(dt)`: propulsion, integration and contact dispatch
//!
//! Both return the `RoundEvent`s produced since the previous call. While the
//! round is paused neither advances anything.

use rand::rngs::{SmallRng, StdRng};
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Builder;

use crate::config::RoundConfig;
use crate::game::input_buffer::{InputBuffer, InputSender};
use crate::game::match_result::{
    check_last_standing, elimination_rank, timeout_rank, EndReason, RoundResult,
};
use crate::game::state::{
    Arena, Fighter, FighterId, FighterKind, FuelSource, ResourceId, RoundPhase,
};
use crate::game::systems::ai::{PilotRegistry, PilotTuning, UtilityPilot};
use crate::game::systems::arena::{pick_player_slot, spawn_circle};
use crate::game::systems::collision::{Contact, ContactTracker};
use crate::game::systems::player::{PlayerPilot, ScreenProjection};
use crate::game::systems::steering::{blend_factor, Steering};
use crate::game::systems::{fuel, physics};
use crate::util::vec2::Vec2;

/// Notifications for the UI collaborator
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundEvent {
    /// Countdown finished; fighters are released
    RoundStarted,
    RoundEnded {
        rank: usize,
        score: u32,
        reason: EndReason,
    },
    /// The player grew
    FuelGrowth { amount: u32, new_scale: f32 },
    PopulationChanged { fighters: usize, resources: usize },
    FighterRemoved { id: FighterId },
    /// Arena was reseeded for a new round
    RoundReset,
}

/// Everything that lives exactly one round
pub struct RoundContext {
    pub arena: Arena,
    pub pilots: PilotRegistry,
    pub player: PlayerPilot,
    pub contacts: ContactTracker,
}

impl RoundContext {
    /// Seed a fresh population: fighters on the spawn circle, pilots for every
    /// autonomous fighter and an initial set of fuel tanks.
    pub fn seed(config: &RoundConfig, rng: &mut StdRng) -> Self {
        let count = config.arena.fighter_count();
        let player_slot = pick_player_slot(rng, count);
        let tuning = PilotTuning::new(&config.ai, config.arena.size);

        let mut arena = Arena::new();
        let mut pilots = PilotRegistry::new();
        let mut robot_number = 0;

        for placement in spawn_circle(count, config.arena.spawn_distance()) {
            let id = Builder::from_random_bytes(rng.gen()).into_uuid();
            if placement.slot == player_slot {
                arena.add_fighter(Fighter::new(
                    id,
                    "Player".to_string(),
                    FighterKind::Player,
                    placement.position,
                    placement.yaw,
                    &config.fighter,
                ));
            } else {
                robot_number += 1;
                arena.add_fighter(Fighter::new(
                    id,
                    format!("Robot #{}", robot_number),
                    FighterKind::Autonomous,
                    placement.position,
                    placement.yaw,
                    &config.fighter,
                ));
                pilots.register(UtilityPilot::new(
                    id,
                    tuning,
                    SmallRng::seed_from_u64(rng.gen()),
                ));
            }
        }

        fuel::top_up(&mut arena, &config.fuel, config.arena.half_size(), rng);
        pilots.broadcast_fighters(&arena.fighter_snapshot());
        pilots.broadcast_resources(&arena.resource_snapshot());

        Self {
            arena,
            pilots,
            player: PlayerPilot::new(ScreenProjection::fit_arena(1280.0, 720.0, config.arena.size)),
            contacts: ContactTracker::new(),
        }
    }
}

/// A running sequence of rounds
pub struct Round {
    config: RoundConfig,
    rng: StdRng,
    phase: RoundPhase,
    /// Time spent in the current phase
    phase_time: f32,
    /// Time spent in Continuing
    elapsed: f32,
    spawn_timer: f32,
    /// Monotonic simulation clock, used for decision timestamps
    sim_time: f32,
    round_index: u64,
    paused: bool,
    context: RoundContext,
    input: InputBuffer,
    result: Option<RoundResult>,
    events: Vec<RoundEvent>,
}

impl Round {
    pub fn new(config: RoundConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let context = RoundContext::seed(&config, &mut rng);
        info!(
            "Round seeded: {} fighters, {} fuel tanks",
            context.arena.live_count(),
            context.arena.tanks.len()
        );

        Self {
            config,
            rng,
            phase: RoundPhase::Starting,
            phase_time: 0.0,
            elapsed: 0.0,
            spawn_timer: 0.0,
            sim_time: 0.0,
            round_index: 0,
            paused: false,
            context,
            input: InputBuffer::default(),
            result: None,
            events: Vec::new(),
        }
    }

    /// Advance the state machine, pilots and timers by `dt`
    pub fn tick(&mut self, dt: f32) -> Vec<RoundEvent> {
        if self.paused {
            return std::mem::take(&mut self.events);
        }
        if !(dt > 0.0) {
            debug!("Ignoring tick with dt={}", dt);
            return std::mem::take(&mut self.events);
        }

        if let Some(sample) = self.input.latest() {
            self.context.player.set_pointer(sample.screen);
        }

        self.sim_time += dt;
        self.phase_time += dt;

        match self.phase {
            RoundPhase::Starting => {
                if self.phase_time >= self.config.timing.game_start_time {
                    self.begin_play();
                }
            }
            RoundPhase::Continuing => self.tick_play(dt),
            RoundPhase::Ending => {
                if self.phase_time >= self.config.timing.result_screen_time {
                    self.reset();
                    return std::mem::take(&mut self.events);
                }
            }
        }

        self.steer(dt);
        self.remove_expired_tanks(dt);
        self.context.player.tick_popup(dt);

        std::mem::take(&mut self.events)
    }

    /// Apply propulsion, integrate bodies and dispatch the contacts that result
    pub fn physics_tick(&mut self, dt: f32) -> Vec<RoundEvent> {
        if self.paused {
            return std::mem::take(&mut self.events);
        }
        if !(dt > 0.0) {
            debug!("Ignoring physics tick with dt={}", dt);
            return std::mem::take(&mut self.events);
        }

        physics::update(
            &mut self.context.arena,
            self.config.fighter.speed_multiplier,
            dt,
        );

        let contacts = self.context.contacts.detect(
            &self.context.arena,
            self.config.arena.half_size(),
            self.config.fuel.pickup_radius,
        );
        for contact in contacts {
            match contact {
                Contact::Fighters(a, b) => self.on_fighter_contact(a, b),
                Contact::Resource(fighter, tank) => self.on_resource_contact(fighter, tank),
                Contact::Dropped(fighter) => self.on_fighter_dropped(fighter),
            }
        }

        std::mem::take(&mut self.events)
    }

    /// Two fighters started touching.
    ///
    /// Each records the other as its pending beneficiary, and each pushes the
    /// other if it hit head-on.
    pub fn on_fighter_contact(&mut self, a: FighterId, b: FighterId) {
        if a == b {
            return;
        }
        let arena = &mut self.context.arena;
        let (Some(fa), Some(fb)) = (arena.live_fighter(a), arena.live_fighter(b)) else {
            debug!("Ignoring contact between {} and {}: not both alive", a, b);
            return;
        };

        let bounciness = self.config.fighter.collision_bounciness;
        let from_a = fa.collision_impulse(fb.position(), bounciness);
        let from_b = fb.collision_impulse(fa.position(), bounciness);

        for (id, other, pushed_by_other, own_push) in [(a, b, from_b, from_a), (b, a, from_a, from_b)] {
            if let Some(fighter) = arena.get_fighter_mut(id) {
                fighter.register_collision(other);
                if let Some(impulse) = pushed_by_other {
                    fighter.body.add_impulse(impulse);
                }
                if let Some(impulse) = own_push {
                    fighter.body.add_impulse(-impulse);
                }
            }
        }
    }

    /// A fighter touched a tank; the first toucher becomes its beneficiary
    pub fn on_resource_contact(&mut self, fighter: FighterId, tank: ResourceId) {
        if self.context.arena.live_fighter(fighter).is_none() {
            debug!("Ignoring tank contact from dead fighter {}", fighter);
            return;
        }
        let removal_delay = self.config.fuel.removal_delay;
        match self.context.arena.tank_mut(tank) {
            Some(t) => {
                if t.consume(fighter, removal_delay) {
                    debug!("Tank {} consumed by {}", tank, fighter);
                }
            }
            None => debug!("Ignoring contact with unknown tank {}", tank),
        }
    }

    /// A fighter left the platform: remove it, pay out its residual fuel and
    /// end the round if that settles it.
    pub fn on_fighter_dropped(&mut self, id: FighterId) {
        let standing = self.context.arena.live_count();
        let (beneficiary, fuel, mass, was_player) = match self.context.arena.remove_fighter(id) {
            Some(f) => (f.pending_beneficiary, f.fuel, f.mass(), f.is_player()),
            None => {
                debug!("Ignoring drop of {}: not alive", id);
                return;
            }
        };
        self.context.pilots.unregister(id);
        self.events.push(RoundEvent::FighterRemoved { id });
        info!(
            "Fighter {} dropped, {} left",
            id,
            self.context.arena.live_count()
        );

        if let Some(beneficiary) = beneficiary {
            self.grant_fuel(beneficiary, fuel, FuelSource::Fighter { id, mass });
        }

        self.broadcast_fighters();

        if self.phase != RoundPhase::Continuing {
            return;
        }
        if was_player {
            self.end_round(EndReason::PlayerEliminated, elimination_rank(standing));
        } else if let Some(reason) = check_last_standing(&self.context.arena) {
            self.end_round(reason, 1);
        }
    }

    /// Freeze the round: ticks become no-ops until `resume`
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            info!("Round {} paused in {:?}", self.round_index, self.phase);
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            info!("Round {} resumed", self.round_index);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Abandon the current round from any phase and reseed a fresh one.
    /// The new round starts unpaused, in its countdown.
    pub fn restart(&mut self) {
        info!("Restarting round {} from {:?}", self.round_index, self.phase);
        self.paused = false;
        self.reset();
    }

    /// Latest pointer position in screen pixels
    pub fn set_pointer(&mut self, screen: Option<Vec2>) {
        self.context.player.set_pointer(screen);
    }

    /// Handle for feeding pointer samples from another thread
    pub fn input_sender(&self) -> InputSender {
        self.input.sender()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn round_time(&self) -> f32 {
        self.config.timing.round_time
    }

    pub fn start_time(&self) -> f32 {
        self.config.timing.game_start_time
    }

    pub fn arena_size(&self) -> f32 {
        self.config.arena.size
    }

    pub fn live_fighter_count(&self) -> usize {
        self.context.arena.live_count()
    }

    pub fn player_score(&self) -> u32 {
        self.context.player.score()
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Fuel shown by the growth popup while it is visible
    pub fn score_popup(&self) -> Option<u32> {
        self.context.player.popup()
    }

    /// Seconds left in the countdown, during Starting only
    pub fn countdown_remaining(&self) -> Option<f32> {
        (self.phase == RoundPhase::Starting)
            .then(|| (self.config.timing.game_start_time - self.phase_time).max(0.0))
    }

    /// Seconds left in the round, during Continuing only
    pub fn time_remaining(&self) -> Option<f32> {
        (self.phase == RoundPhase::Continuing)
            .then(|| (self.config.timing.round_time - self.elapsed).max(0.0))
    }

    /// Result of the round being shown, during Ending only
    pub fn result(&self) -> Option<&RoundResult> {
        self.result.as_ref()
    }

    pub fn round_index(&self) -> u64 {
        self.round_index
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn arena(&self) -> &Arena {
        &self.context.arena
    }

    pub fn pilots(&self) -> &PilotRegistry {
        &self.context.pilots
    }

    fn begin_play(&mut self) {
        self.phase = RoundPhase::Continuing;
        self.phase_time = 0.0;
        self.elapsed = 0.0;
        self.spawn_timer = 0.0;

        for id in self.context.arena.live_ids().to_vec() {
            if let Some(fighter) = self.context.arena.get_fighter_mut(id) {
                fighter.active = true;
            }
        }

        info!("Round {} started", self.round_index);
        self.events.push(RoundEvent::RoundStarted);
        self.broadcast_fighters();
        self.broadcast_resources();
    }

    fn tick_play(&mut self, dt: f32) {
        self.elapsed += dt;

        let player_alive = self
            .context
            .arena
            .player()
            .map_or(false, |p| p.alive);
        if player_alive {
            self.context.player.accrue(dt);
        }

        let interval = self.config.fuel.spawn_interval;
        self.spawn_timer += dt;
        if self.spawn_timer >= interval {
            self.spawn_timer %= interval;
            fuel::top_up(
                &mut self.context.arena,
                &self.config.fuel,
                self.config.arena.half_size(),
                &mut self.rng,
            );
            self.broadcast_resources();
        }

        if self.elapsed >= self.config.timing.round_time {
            let rank = match self.context.arena.player_id {
                Some(player) => timeout_rank(&self.context.arena, player),
                None => 1,
            };
            self.end_round(EndReason::Timeout, rank);
        }
    }

    fn steer(&mut self, dt: f32) {
        if self.phase == RoundPhase::Starting {
            return;
        }
        let t = blend_factor(self.config.fighter.rotation_rate, dt);
        let now = self.sim_time;
        let RoundContext {
            arena,
            pilots,
            player,
            ..
        } = &mut self.context;

        for (id, heading) in pilots.decide_all(arena, now) {
            if let Some(fighter) = arena.get_fighter_mut(id) {
                fighter.turn_toward(heading, t);
            }
        }

        if let Some(player_id) = arena.player_id {
            let heading = match arena.live_fighter(player_id) {
                Some(me) if me.active => player.choose_heading(me, arena, now),
                _ => None,
            };
            if let Some(me) = arena.get_fighter_mut(player_id) {
                me.turn_toward(heading, t);
            }
        }
    }

    fn remove_expired_tanks(&mut self, dt: f32) {
        let expired = fuel::collect_expired(&mut self.context.arena, dt);
        if expired.is_empty() {
            return;
        }
        for tank in &expired {
            if let Some(beneficiary) = tank.beneficiary {
                self.grant_fuel(beneficiary, tank.capacity, FuelSource::Tank(tank.id));
            }
        }
        self.broadcast_resources();
    }

    /// Grow a live fighter; dead beneficiaries get nothing
    fn grant_fuel(&mut self, beneficiary: FighterId, amount: u32, source: FuelSource) {
        let Some(fighter) = self
            .context
            .arena
            .get_fighter_mut(beneficiary)
            .filter(|f| f.alive)
        else {
            debug!("Dropping {} fuel for dead fighter {}", amount, beneficiary);
            return;
        };

        fighter.grow(amount, &self.config.fighter);
        if !fighter.is_player() {
            return;
        }

        let new_scale = fighter.scale;
        if self.phase == RoundPhase::Continuing {
            self.context.player.on_growth(amount, source);
        }
        self.events.push(RoundEvent::FuelGrowth { amount, new_scale });
    }

    fn broadcast_fighters(&mut self) {
        let snapshot = self.context.arena.fighter_snapshot();
        self.context.pilots.broadcast_fighters(&snapshot);
        self.push_population();
    }

    fn broadcast_resources(&mut self) {
        let snapshot = self.context.arena.resource_snapshot();
        self.context.pilots.broadcast_resources(&snapshot);
        self.push_population();
    }

    fn push_population(&mut self) {
        self.events.push(RoundEvent::PopulationChanged {
            fighters: self.context.arena.live_count(),
            resources: self.context.arena.tanks.len(),
        });
    }

    fn end_round(&mut self, reason: EndReason, rank: usize) {
        let score = self.context.player.score();
        let player_mass = self.context.arena.player().map_or(0.0, |p| p.mass());

        self.phase = RoundPhase::Ending;
        self.phase_time = 0.0;
        self.result = Some(RoundResult {
            reason,
            rank,
            score,
            survivors: self.context.arena.live_count(),
            duration: self.elapsed,
            player_mass,
        });

        info!(
            "Round {} ended ({:?}): rank {}, score {}",
            self.round_index, reason, rank, score
        );
        self.events.push(RoundEvent::RoundEnded {
            rank,
            score,
            reason,
        });
    }

    /// Drop the context and reseed the arena
    fn reset(&mut self) {
        self.context = RoundContext::seed(&self.config, &mut self.rng);
        self.phase = RoundPhase::Starting;
        self.phase_time = 0.0;
        self.elapsed = 0.0;
        self.spawn_timer = 0.0;
        self.result = None;
        self.round_index += 1;

        info!(
            "Round {} reseeded with {} fighters",
            self.round_index,
            self.context.arena.live_count()
        );
        self.events.push(RoundEvent::RoundReset);
        self.push_population();
    }
}
