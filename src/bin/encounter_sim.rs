//! Headless encounter runner
//!
//! Drives a scripted boss fight - a pacing player, periodic strikes, the
//! occasional critical hit - and prints a summary or the full signal
//! transcript as JSON.

use clap::Parser;

use cloakfall::core::config::EncounterConfig;
use cloakfall::core::types::{PlayerView, Vec2, TICKS_PER_SECOND};
use cloakfall::events::{Signal, SignalKind};
use cloakfall::simulation::Encounter;

/// Headless boss-fight runner
#[derive(Parser, Debug)]
#[command(name = "encounter_sim")]
#[command(about = "Run a scripted boss fight and dump the signal transcript")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum ticks before giving up (default ten minutes of fight time)
    #[arg(long, default_value_t = 36_000)]
    max_ticks: u64,

    /// Optional TOML config path
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Ticks between scripted player strikes
    #[arg(long, default_value_t = 90)]
    strike_interval: u64,

    /// Damage per scripted strike
    #[arg(long, default_value_t = 12)]
    strike_damage: i32,

    /// Ticks between scripted critical hits
    #[arg(long, default_value_t = 1800)]
    critical_interval: u64,

    /// Output the full signal transcript as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> cloakfall::core::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let config = match &args.config {
        Some(path) => EncounterConfig::from_path(path)?,
        None => EncounterConfig::default(),
    };

    tracing::info!(seed, "starting scripted encounter");

    let mut fight = Encounter::with_seed(config.clone(), Vec2::new(0.0, 3.0), seed)?;
    fight.handle_signal(Signal::DialogEnded {
        dialog_id: config.activation_dialog_id,
    });

    // The scripted player paces the arena floor
    let mut player_x = 0.0f32;
    let mut direction = 1.0f32;

    let mut tick = 0u64;
    while tick < args.max_ticks && !fight.is_defeated() {
        tick += 1;

        player_x += direction * 3.0 / TICKS_PER_SECOND as f32;
        if player_x.abs() > 8.0 {
            direction = -direction;
        }
        let player = PlayerView {
            position: Vec2::new(player_x, config.arena.ground_y + 0.5),
        };

        fight.tick(Some(player));

        if tick % args.strike_interval == 0 {
            fight.apply_damage(args.strike_damage);
        }

        if tick % args.critical_interval == 0 {
            fight.handle_signal(Signal::CriticalHitLanded {
                damage: args.strike_damage,
            });
        }

        // Hammer finishing hits while the boss lies weak
        if fight.ai().is_some_and(|ai| ai.is_in_weak_state()) && tick % 15 == 0 {
            fight.finishing_hit();
        }

        // The pacing player is grounded; phase pauses need to hear it
        if tick % (TICKS_PER_SECOND * 2) == 0 {
            fight.handle_signal(Signal::PlayerGrounded);
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(fight.bus().history())?);
        return Ok(());
    }

    let bus = fight.bus();
    println!("=== Encounter summary (seed {seed}) ===");
    println!("ticks elapsed:     {}", fight.now());
    println!(
        "outcome:           {}",
        if fight.is_defeated() {
            "boss defeated"
        } else {
            "timeout"
        }
    );
    println!("final phase:       {}", fight.current_phase());
    println!(
        "final health:      {}/{}",
        fight.health().current_health(),
        fight.health().max_health()
    );
    println!(
        "phase changes:     {}",
        bus.count(SignalKind::BossPhaseChanged)
    );
    println!(
        "weak states:       {}",
        bus.count(SignalKind::BossEnteredWeakState)
    );
    println!("player hits:       {}", bus.count(SignalKind::PlayerHit));
    println!(
        "control toggles:   {}",
        bus.count(SignalKind::PlayerControlToggled)
    );
    println!("camera shakes:     {}", bus.count(SignalKind::CameraShake));

    Ok(())
}
