mod simulate;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use simulate::{Format, Schedule, Simulation};
use skywalk_common::Config;
use skywalk_input::{Key, KeyBindings};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skywalk-cli", about = "Headless tools for the skywalk viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, crate and key binding info
    Info,
    /// Print the effective configuration as YAML
    Config {
        /// YAML config file; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run the movement controller headless at a fixed step
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "120")]
        frames: u64,
        /// Seconds per frame
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,
        /// Key codes held from the first frame, e.g. KeyW ShiftLeft
        #[arg(long, num_args = 1..)]
        hold: Vec<String>,
        /// Frames at which Space is tapped
        #[arg(long, num_args = 1..)]
        jump_at: Vec<u64>,
        /// Frame at which the held keys are released
        #[arg(long)]
        release_at: Option<u64>,
        /// Initial heading in degrees; 0 faces +X
        #[arg(long, default_value_t = 0.0)]
        yaw: f32,
        /// Emit one JSON object per frame instead of text
        #[arg(long)]
        json: bool,
        /// YAML config file; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn parse_keys(codes: &[String]) -> anyhow::Result<Vec<Key>> {
    codes
        .iter()
        .map(|code| match Key::from_code(code) {
            Some(key) => Ok(key),
            None => {
                let known: Vec<&str> = Key::ALL.iter().map(|k| k.code()).collect();
                bail!("unknown key code `{code}` (expected one of: {})", known.join(", "))
            }
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("skywalk-cli v{}", env!("CARGO_PKG_VERSION"));
            let movement = Config::default().movement;
            println!(
                "movement: speed={} sprint=x{} jump={} gravity={} damping={} ground={}",
                movement.base_speed,
                movement.sprint_multiplier,
                movement.jump_speed,
                movement.gravity,
                movement.damping,
                movement.ground_height
            );
            println!("bindings:");
            let bindings = KeyBindings::default();
            for key in Key::ALL {
                if let Some(action) = bindings.action(key) {
                    println!("  {key:<10} -> {action:?}");
                }
            }
        }
        Commands::Config { config } => {
            let config = load_config(config.as_deref())?;
            print!("{}", config.to_yaml()?);
        }
        Commands::Simulate {
            frames,
            dt,
            hold,
            jump_at,
            release_at,
            yaw,
            json,
            config,
        } => {
            if !(dt.is_finite() && dt > 0.0) {
                bail!("--dt must be a positive number of seconds, got {dt}");
            }
            let config = load_config(config.as_deref())?;
            let schedule = Schedule {
                hold: parse_keys(&hold)?,
                jump_at: jump_at.into_iter().collect(),
                release_at,
            };
            let format = if json { Format::Json } else { Format::Text };
            tracing::info!(frames, dt, ?schedule, "simulating");

            let sim = Simulation::new(
                config.movement,
                yaw,
                schedule,
                frames,
                format,
                std::io::stdout().lock(),
            );
            let (summary, _) = sim.run(dt).context("failed to write frames")?;
            tracing::info!(
                frames = summary.frames,
                position = ?summary.position,
                velocity = ?summary.velocity,
                grounded = summary.grounded,
                "simulation finished"
            );
        }
    }

    Ok(())
}
