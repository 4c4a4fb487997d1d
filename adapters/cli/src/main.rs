#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless Curve Defence matches.
//!
//! The binary drives a world with fixed ticks while playing the part of the
//! outside services: wave catalogues come from a JSON file and weather
//! fetches are answered by a scripted feed. The final score is printed to
//! stdout as JSON; everything else goes to stderr through `tracing`.

mod wave_store;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use curve_defence_core::{
    Command, Event, FieldPoint, SimulationConfig, TowerKind, WeatherFetchOutcome,
};
use curve_defence_world::{self as world, query, World};
use rand::{Rng as _, SeedableRng as _};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

/// Simulated time fed to the world per driven tick.
const TICK: Duration = Duration::from_millis(16);

/// Opening build placed before the first wave starts.
///
/// Both spots sit off the default road by more than the required clearance
/// while keeping the road inside firing range.
const OPENING_BUILD: [(TowerKind, f32, f32); 2] = [
    (TowerKind::Basic, 360.0, 210.0),
    (TowerKind::Rapid, 730.0, 430.0),
];

/// Runs a headless Curve Defence match and reports the final score.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Wave catalogue JSON file shaped like `{"waves": [...]}`.
    #[arg(long, value_name = "FILE")]
    waves: Option<PathBuf>,

    /// Seed for the spawn jitter stream. Picked at random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Weather code reported by the scripted feed on every fetch.
    #[arg(long, value_name = "CODE")]
    weather_code: Option<u16>,

    /// Tick budget before an undecided match is abandoned.
    #[arg(long, default_value_t = 36_000)]
    max_ticks: u32,

    /// Log every simulation event instead of only the milestones.
    #[arg(long)]
    verbose: bool,
}

/// Entry point for the Curve Defence headless runner.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let seed = cli.seed.unwrap_or_else(|| ChaCha8Rng::from_entropy().gen());
    tracing::info!(seed, "starting match");

    let config = SimulationConfig {
        seed,
        ..SimulationConfig::default()
    };
    let mut world = World::new(config).context("building the world")?;
    let mut events = Vec::new();

    if let Some(path) = cli.waves.as_deref() {
        match wave_store::load(path) {
            Ok(waves) => {
                world::apply(&mut world, Command::InstallWaveCatalog { waves }, &mut events);
            }
            Err(error) => {
                tracing::warn!(
                    error = %format!("{error:#}"),
                    "wave catalogue unavailable, staying on the built-in waves"
                );
            }
        }
    }

    for (kind, x, y) in OPENING_BUILD {
        let at = FieldPoint::new(x, y);
        world::apply(&mut world, Command::PlaceTower { kind, at }, &mut events);
    }

    world::apply(&mut world, Command::SetAutoWaves { enabled: true }, &mut events);
    world::apply(&mut world, Command::StartWave, &mut events);
    report(&events);
    events.clear();

    let feed = match cli.weather_code {
        Some(code) => WeatherFetchOutcome::Observed { code },
        None => WeatherFetchOutcome::Unavailable,
    };

    let mut ticks = 0;
    while query::is_running(&world) && ticks < cli.max_ticks {
        world::apply(&mut world, Command::Tick { elapsed: TICK }, &mut events);
        ticks += 1;

        let fetch_due = events
            .iter()
            .any(|event| matches!(event, Event::WeatherFetchRequested));
        report(&events);
        events.clear();

        if fetch_due {
            world::apply(&mut world, Command::SubmitWeather { outcome: feed }, &mut events);
            report(&events);
            events.clear();
        }
    }

    if query::is_running(&world) {
        tracing::warn!(ticks, "tick budget exhausted before the match resolved");
    }

    let score = query::score(&world);
    tracing::info!(
        phase = ?query::phase(&world),
        ticks,
        final_score = score.final_score,
        "match finished"
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&score).context("serialising the final score")?
    );
    Ok(())
}

/// Routes logs to stderr so stdout stays reserved for the score payload.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Logs the milestone events at info and everything else at debug.
fn report(events: &[Event]) {
    for event in events {
        match event {
            Event::WaveCatalogInstalled { total_waves } => {
                tracing::info!(total_waves, "wave catalogue installed");
            }
            Event::WaveCatalogRejected { reason } => {
                tracing::warn!(?reason, "wave catalogue rejected");
            }
            Event::TowerPlaced { tower, kind, .. } => {
                tracing::info!(tower = tower.get(), ?kind, "tower placed");
            }
            Event::TowerPlacementRejected { kind, reason, .. } => {
                tracing::warn!(?kind, ?reason, "tower placement rejected");
            }
            Event::WaveStarted {
                wave_number,
                total_waves,
                enemy_count,
                boss_wave,
            } => {
                tracing::info!(wave_number, total_waves, enemy_count, boss_wave, "wave started");
            }
            Event::WaveCompleted {
                wave_number,
                gold_reward,
            } => {
                tracing::info!(wave_number, gold_reward, "wave completed");
            }
            Event::EnemyReachedBase { lives, .. } => {
                tracing::warn!(lives, "an enemy reached the base");
            }
            Event::WeatherChanged { kind } => {
                tracing::info!(?kind, "weather changed");
            }
            Event::GameOver { reason, score } => {
                tracing::info!(?reason, final_score = score.final_score, "defeat");
            }
            Event::Victory { score } => {
                tracing::info!(final_score = score.final_score, "victory");
            }
            other => {
                tracing::debug!(event = ?other, "event");
            }
        }
    }
}
