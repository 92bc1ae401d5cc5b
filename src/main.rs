use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use posedash::{
    events::SessionEvent,
    game::{phase::Phase, Game, GameConfig},
};
use tracing::{debug, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// A jump started this far ahead of an obstacle peaks right as it passes.
const AUTOPILOT_JUMP_DISTANCE: f32 = 12.0;

/// Plays a full session headlessly and prints the resulting gameplay submission.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Frames simulated per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Sleep between frames instead of simulating as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Seed for wall pose selection; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Let the autopilot jump obstacles and strike the wall's pose
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    autopilot: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn setup_tracing(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "posedash=debug" } else { "posedash=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(subscriber).context("Could not set global default")
}

/// Presses whatever key a decent player would press this frame.
fn autopilot(game: &mut Game) {
    match game.phase() {
        Phase::Active => {
            let grounded = game.player_position().is_some_and(|p| p.0.y <= 0.0);
            let incoming = game
                .nearest_obstacle_distance()
                .is_some_and(|distance| (0.0..=AUTOPILOT_JUMP_DISTANCE).contains(&distance));
            if grounded && incoming {
                game.key_pressed("ArrowUp");
            }
        }
        Phase::Freezing => {
            if let Some((wall, _)) = game.wall() {
                let key = wall.target.to_string().to_lowercase();
                game.key_pressed(&key);
            }
        }
        Phase::Preparation | Phase::Break => {}
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_tracing(args.verbose)?;

    let config = GameConfig {
        seed: args.seed.unwrap_or_else(rand::random),
        ..GameConfig::default()
    };
    let mut game = Game::new(config).context("Could not create game session")?;

    let frame_time = Duration::from_secs(1) / args.fps.max(1);
    let dt = frame_time.as_secs_f32();
    let started = Instant::now();

    info!(fps = args.fps, realtime = args.realtime, "Starting session");
    while !game.is_completed() {
        let frame_start = Instant::now();

        if args.autopilot {
            autopilot(&mut game);
        }
        if game.advance(dt) {
            info!("Exit requested");
            break;
        }

        for event in game.drain_session_events() {
            match event {
                SessionEvent::BlockCompleted(block) => {
                    let progress = game.progress();
                    info!(
                        block = block.block_id,
                        succeeded = block.jumps_succeeded,
                        failed = block.jumps_failed,
                        accuracy = format!("{:.1}", block.average_pose_accuracy),
                        time_left = progress.time_left,
                        "Block finished"
                    );
                }
                SessionEvent::GameCompleted(submission) => {
                    debug!(score = submission.score, "Session finished");
                }
            }
        }

        if args.realtime {
            if let Some(remaining) = frame_time.checked_sub(frame_start.elapsed()) {
                spin_sleep::sleep(remaining);
            }
        }
    }

    info!(elapsed = ?started.elapsed(), "Session over");
    if let Some(submission) = game.result() {
        println!("{}", serde_json::to_string_pretty(&submission)?);
    }
    Ok(())
}
