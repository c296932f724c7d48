use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use clap::Parser;
use fieldnav::components::{ActorId, MoveState};
use fieldnav::config::{load_settings, load_settings_from};
use fieldnav::game_logic::errors::{NavError, NavResult};
use fieldnav::map::SceneDefinition;
use fieldnav::navigation::Navigator;
use fieldnav::plugins::{MoveCommand, NavigationPlugin};
use std::path::PathBuf;
use std::time::Duration;

mod navsim {
    pub mod cli_utils;
    pub mod scatter;
}

use navsim::cli_utils::*;
use navsim::scatter::scatter_rocks;

#[derive(Parser, Clone)]
#[command(name = "navsim")]
#[command(about = "Simulate a click-to-move request in a scene file, headless")]
struct Args {
    /// Scene file (TOML); bare names are looked up in ./scenes
    scene: PathBuf,

    /// Destination (format: X,Y)
    #[arg(long)]
    goal: String,

    /// Actor to move (defaults to the player)
    #[arg(long)]
    actor: Option<u32>,

    /// Run instead of walk
    #[arg(long)]
    run: bool,

    /// Plan on the calling thread instead of a background worker
    #[arg(long)]
    sync: bool,

    /// Maximum number of ticks to simulate
    #[arg(long, default_value = "3000")]
    ticks: usize,

    /// Tick length in milliseconds
    #[arg(long, default_value = "16.67")]
    tick_ms: f32,

    /// Print the actor's position every N ticks
    #[arg(long, default_value = "30")]
    every: usize,

    /// Navigation config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of random rocks to scatter into the scene
    #[arg(long, default_value = "0")]
    scatter: usize,

    /// Random seed for reproducible scattering
    #[arg(long, default_value = "1")]
    seed: u64,

    /// Log planner and commit decisions
    #[arg(long)]
    verbose: bool,
}

fn main() -> NavResult<()> {
    let args = Args::parse();

    let goal = parse_point(&args.goal)?;
    let settings = match &args.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings(),
    };
    let scene = if args.scene.exists() {
        SceneDefinition::load_from_file(&args.scene)?
    } else {
        SceneDefinition::load_named(&args.scene)?
    };
    let mut navigator = Navigator::from_scene(&scene, settings)?;

    if args.scatter > 0 {
        let placed = scatter_rocks(&mut navigator, args.scatter, args.seed);
        println!("Scattered {placed} rocks (seed {})", args.seed);
    }

    let actor = match args.actor {
        Some(id) => ActorId(id),
        None => navigator.player().ok_or(NavError::InvalidSceneData {
            reason: "Scene has no player".to_string(),
        })?,
    };
    let start = navigator.position(actor)?;

    let mut app = App::new();
    app.add_plugins(LogPlugin {
        level: if args.verbose { Level::DEBUG } else { Level::INFO },
        ..default()
    })
    .init_resource::<Time>()
    .insert_resource(navigator)
    .add_plugins(NavigationPlugin);

    app.world_mut().send_event(MoveCommand {
        actor,
        goal,
        state: moving_state(args.run),
        run_async: !args.sync,
    });

    println!(
        "Moving {actor} in '{}' from ({:.1}, {:.1}) to ({:.1}, {:.1})",
        scene.name, start.x, start.y, goal.x, goal.y
    );

    let tick = Duration::from_secs_f32(args.tick_ms.max(0.1) / 1000.0);
    let every = args.every.max(1);
    for frame in 1..=args.ticks {
        app.world_mut().resource_mut::<Time>().advance_by(tick);
        app.update();

        let navigator = app.world().resource::<Navigator>();
        let position = navigator.position(actor)?;
        let state = navigator.state(actor)?;
        if frame % every == 0 {
            println!(
                "  tick {frame:>5}: ({:8.2}, {:8.2}) {state} facing {}",
                position.x,
                position.y,
                navigator.facing(actor)?
            );
        }
        if state == MoveState::Standing && navigator.plans_in_flight() == 0 {
            print_summary(frame, start, position, goal);
            return Ok(());
        }
    }

    let position = app.world().resource::<Navigator>().position(actor)?;
    println!("Still moving after {} ticks at ({:.2}, {:.2})", args.ticks, position.x, position.y);
    Ok(())
}

fn print_summary(frame: usize, start: Vec2, end: Vec2, goal: Vec2) {
    println!("Stopped after {frame} ticks");
    println!("  Start: ({:.2}, {:.2})", start.x, start.y);
    println!("  End:   ({:.2}, {:.2})", end.x, end.y);
    println!("  Travelled {:.2} units, {:.2} short of the goal", start.distance(end), end.distance(goal));
}
