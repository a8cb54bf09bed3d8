//! Minigolf course runner.
//!
//! A headless driver for the course, written in Rust using:
//! - **rapier3d** for rigid-body simulation
//! - **bevy_ecs** for resources, systems, messages and observers
//!
//! # Main Loop
//!
//! 1. Load `course.ini` (defaults when missing)
//! 2. Build the course once
//! 3. Run the per-step schedule `--steps` times, pushing the club every
//!    `--push-every` steps with `--force`
//! 4. Optionally print a JSON snapshot of every actor and the game state
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --steps 1200 --force 6 --snapshot
//! ```

use bevy_ecs::prelude::*;
use clap::Parser;
use log::{error, info};
use minigolf::game::{self, Course};
use minigolf::resources::gameconfig::GameConfig;
use minigolf::resources::gamestate::GameState;
use minigolf::resources::physicsworld::PhysicsWorld;
use minigolf::resources::worldtime::WorldTime;
use std::path::PathBuf;

/// Minigolf course
#[derive(Parser)]
#[command(version, about = "Physics-driven minigolf course with a trampoline, spinners and a swinging club.")]
struct Cli {
    /// Configuration file.
    #[arg(long, value_name = "PATH", default_value = "./course.ini")]
    config: PathBuf,

    /// Number of simulation steps to run.
    #[arg(long, default_value_t = 600)]
    steps: u64,

    /// Applied club force (clamped to the configured limit).
    #[arg(long, default_value_t = 8.0, allow_negative_numbers = true)]
    force: f32,

    /// Push the club every N steps (0 disables pushing).
    #[arg(long, default_value_t = 120)]
    push_every: u64,

    /// Move the hole to a random slot before the first step.
    #[arg(long)]
    shuffle_hole: bool,

    /// Seed for hole shuffling.
    #[arg(long)]
    seed: Option<u64>,

    /// Print a JSON snapshot of the course when done.
    #[arg(long)]
    snapshot: bool,
}

fn print_snapshot(world: &World) {
    let state = world.resource::<GameState>();
    let time = world.resource::<WorldTime>();
    let snapshot = serde_json::json!({
        "steps": time.steps,
        "elapsed": time.elapsed,
        "applied_force": state.applied_force(),
        "trigger_active": state.trigger_active(),
        "has_won": state.has_won(),
        "actors": world.resource::<PhysicsWorld>().snapshot(),
    });
    match serde_json::to_string_pretty(&snapshot) {
        Ok(text) => println!("{}", text),
        Err(e) => error!("Failed to serialize snapshot: {}", e),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = GameConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        info!("{} ({}), using defaults", e, cli.config.display());
    }

    // --------------- ECS world + course ---------------
    let mut world = World::new();
    world.insert_resource(config);
    if let Err(e) = game::setup(&mut world) {
        error!("Course setup failed: {}", e);
        std::process::exit(1);
    }

    if cli.shuffle_hole {
        let mut rng = match cli.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        world.resource_scope(|world, mut course: Mut<Course>| {
            let mut physics = world.resource_mut::<PhysicsWorld>();
            course.switch_hole_position(&mut physics, &mut rng);
        });
    }

    world.resource_mut::<GameState>().set_applied_force(cli.force);

    let mut schedule = game::step_schedule();

    // --------------- Main loop ---------------
    for step in 1..=cli.steps {
        if cli.push_every > 0 && step % cli.push_every == 0 {
            game::push(&mut world);
        }
        game::run_step(&mut world, &mut schedule);

        world.clear_trackers();
    }

    let state = world.resource::<GameState>();
    info!(
        "Finished {} steps: force={}, has_won={}",
        cli.steps,
        state.applied_force(),
        state.has_won()
    );

    if cli.snapshot {
        print_snapshot(&world);
    }
}
