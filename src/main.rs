use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use robot_arena::config::RoundConfig;
use robot_arena::game::constants::tick::{PHYSICS_DT, PHYSICS_RATE, SIMULATION_RATE};
use robot_arena::game::round::{Round, RoundEvent};
use robot_arena::game::state::RoundPhase;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Robot Arena v{}", env!("CARGO_PKG_VERSION"));

    let config = RoundConfig::load_or_default();
    config.validate()?;
    info!(
        "Configuration loaded: arena {}x{}, {} fighters, round {}s",
        config.arena.size,
        config.arena.size,
        config.arena.fighter_count(),
        config.timing.round_time
    );

    // Stop after this many finished rounds (0 runs until Ctrl+C)
    let max_rounds: u64 = match std::env::var("RUNNER_MAX_ROUNDS") {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid RUNNER_MAX_ROUNDS '{}', running until stopped", raw);
            0
        }),
        Err(_) => 0,
    };

    let mut round = Round::new(config);

    let sim_period = Duration::from_secs_f32(1.0 / SIMULATION_RATE as f32);
    let mut sim_interval = interval(sim_period);
    sim_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut physics_interval = interval(Duration::from_secs_f32(1.0 / PHYSICS_RATE as f32));
    physics_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut finished = 0u64;
    let mut last_sim = tokio::time::Instant::now();

    loop {
        let events = tokio::select! {
            now = sim_interval.tick() => {
                let dt = now.duration_since(last_sim).as_secs_f32().max(sim_period.as_secs_f32());
                last_sim = now;
                round.tick(dt)
            }
            _ = physics_interval.tick() => round.physics_tick(PHYSICS_DT),
            result = &mut shutdown => {
                result?;
                info!("Shutdown signal received");
                break;
            }
        };

        for event in events {
            if let RoundEvent::RoundEnded { .. } = event {
                finished += 1;
                if let Some(result) = round.result() {
                    info!("Round result: {}", serde_json::to_string(result)?);
                }
            }
        }

        if max_rounds > 0 && finished >= max_rounds && round.phase() != RoundPhase::Ending {
            info!("Finished {} rounds", finished);
            break;
        }
    }

    info!("Runner stopped");
    Ok(())
}
