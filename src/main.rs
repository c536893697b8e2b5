//! Headless ability sandbox.
//!
//! Loads a level, a base stat store and a directory of ability sets, spawns
//! one character driven by a scripted timeline or a seeded wandering AI, and
//! runs the frame/fixed pipeline for a fixed number of seconds, logging a
//! trace of the character once per second.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --config assets/config.ini --script assets/scripts/demo_input.json
//! cargo run --release -- --ai 42 --set runner --swap-at 3:flyer --seconds 8
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use abilitykit::components::controlinput::{InputDriver, InputScript, WanderBrain};
use abilitykit::game::{CharacterSpawn, Simulation, load_config};
use abilitykit::resources::levelgeometry::LevelGeometry;
use abilitykit::stats::StatStore;
use clap::Parser;
use log::{error, info, warn};

/// A scheduled ability set swap, written `SECONDS:SET_ID`.
#[derive(Debug, Clone)]
struct SwapAt {
    at: f32,
    set_id: String,
}

impl FromStr for SwapAt {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (at, set_id) = s
            .split_once(':')
            .ok_or_else(|| format!("expected SECONDS:SET_ID, got '{}'", s))?;
        let at = at
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("bad time '{}': {}", at, e))?;
        Ok(SwapAt {
            at,
            set_id: set_id.trim().to_owned(),
        })
    }
}

/// Ability composition sandbox
#[derive(Parser)]
#[command(version, about = "Runs the ability pipeline headless and logs a character trace.")]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "assets/config.ini")]
    config: PathBuf,

    /// Level JSON, overriding the config.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,

    /// Base stat store JSON, overriding the config.
    #[arg(long, value_name = "PATH")]
    stats: Option<PathBuf>,

    /// Directory of ability set JSON files, overriding the config.
    #[arg(long, value_name = "DIR")]
    abilities: Option<PathBuf>,

    /// Ability set to equip at spawn, overriding the config.
    #[arg(long, value_name = "ID")]
    set: Option<String>,

    /// Scripted input timeline JSON.
    #[arg(long, value_name = "PATH", conflicts_with = "ai")]
    script: Option<PathBuf>,

    /// Drive the character with the wandering AI using this seed.
    #[arg(long, value_name = "SEED")]
    ai: Option<u64>,

    /// Simulated seconds to run.
    #[arg(long, default_value_t = 5.0)]
    seconds: f32,

    /// Swap ability sets at a given time, e.g. `3.5:flyer`. Repeatable.
    #[arg(long = "swap-at", value_name = "SECONDS:SET")]
    swap_at: Vec<SwapAt>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = load_config(&cli.config);
    // Command line paths are relative to the working directory, not the config.
    let cwd_relative = |p: PathBuf| std::env::current_dir().map(|d| d.join(&p)).unwrap_or(p);
    if let Some(level) = cli.level {
        config.level_path = Some(cwd_relative(level));
    }
    if let Some(dir) = cli.abilities {
        config.ability_sets_dir = Some(cwd_relative(dir));
    }
    if let Some(stats) = cli.stats {
        config.base_stats_path = Some(cwd_relative(stats));
    }
    if let Some(set) = cli.set {
        config.initial_set = Some(set);
    }

    let driver = match (&cli.script, cli.ai) {
        (Some(path), _) => match InputScript::load(path) {
            Ok(script) => InputDriver::Scripted(script),
            Err(e) => {
                error!("Input script unusable: {}", e);
                std::process::exit(1);
            }
        },
        (None, Some(seed)) => InputDriver::Wander(WanderBrain::new(seed)),
        (None, None) => {
            warn!("No --script or --ai given, the character will stand still");
            InputDriver::Idle
        }
    };

    let mut sim = Simulation::from_config(config);
    info!("Ability sets available: {:?}", sim.ability_sets().ids());

    let base_stats: StatStore = sim.configured_base_stats();
    let initial_set = sim
        .config()
        .initial_set
        .clone()
        .and_then(|id| match sim.ability_sets().get(&id) {
            Some(set) => Some(set),
            None => {
                warn!("Initial ability set '{}' not found, spawning without one", id);
                None
            }
        });
    let spawn_point = sim.world.resource::<LevelGeometry>().spawn;
    let player = sim.spawn_character(CharacterSpawn {
        position: spawn_point,
        base_stats: Some(base_stats),
        initial_set,
        driver: Some(driver),
        ..CharacterSpawn::default()
    });

    let mut swaps = cli.swap_at;
    swaps.sort_by(|a, b| a.at.total_cmp(&b.at));
    let mut swaps = swaps.into_iter().peekable();

    let frame_time = sim.config().frame_time;
    let mut next_trace = 0.0;
    while sim.elapsed() < cli.seconds {
        while let Some(swap) = swaps.next_if(|s| s.at <= sim.elapsed()) {
            info!("t={:.2}: swapping to '{}'", sim.elapsed(), swap.set_id);
            sim.request_equip(player, Some(&swap.set_id));
        }

        sim.step(frame_time);

        if sim.elapsed() >= next_trace {
            next_trace += 1.0;
            if let Some(status) = sim.status(player) {
                let position = sim.position(player).unwrap_or_default();
                let mut flags: Vec<_> = status.flags.iter().copied().collect();
                flags.sort_unstable();
                info!(
                    "t={:.2} pos=({:.2}, {:.2}) vel=({:.2}, {:.2}) grounded={} slope={:?} set={:?} flags={:?}",
                    sim.elapsed(),
                    position.x,
                    position.y,
                    status.velocity.x,
                    status.velocity.y,
                    status.grounded,
                    status.slope_class,
                    status.equipped_set,
                    flags
                );
            }
        }
    }
    info!("Simulation finished after {:.2}s", sim.elapsed());
}
