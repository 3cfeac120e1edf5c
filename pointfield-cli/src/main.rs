mod bench;
mod logging;
mod viewer;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pointfield_core::config::{DEFAULT_HEIGHT, DEFAULT_PARTICLE_COUNT, DEFAULT_WIDTH};
use pointfield_core::SimulationConfig;

#[derive(Parser)]
#[command(name = "pointfield")]
#[command(about = "pointfield - a million particles drawn straight into a pixel buffer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a window and animate the field; hold the left button to attract
    Run {
        #[command(flatten)]
        field: FieldArgs,
    },
    /// Run the frame loop headless and report frame times
    Bench {
        #[command(flatten)]
        field: FieldArgs,

        /// Number of frames to render
        #[arg(long, default_value_t = 600)]
        frames: u64,

        /// Target frame rate; 0 runs unthrottled
        #[arg(long, default_value_t = 0.0)]
        fps: f32,

        /// Seed for the initial particle layout
        #[arg(long)]
        seed: Option<u64>,

        /// Hold the pointer pressed at X Y for the whole run
        #[arg(long, num_args = 2, value_names = ["X", "Y"])]
        attract: Option<Vec<f32>>,
    },
}

#[derive(Args)]
struct FieldArgs {
    /// Number of particles
    #[arg(long, default_value_t = DEFAULT_PARTICLE_COUNT)]
    particles: usize,

    /// Surface width in pixels
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Surface height in pixels
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,

    /// Run every pass on the calling thread instead of the rayon pool
    #[arg(long)]
    serial: bool,
}

impl FieldArgs {
    fn config(&self) -> SimulationConfig {
        SimulationConfig {
            particle_count: self.particles,
            width: self.width,
            height: self.height,
            parallel: !self.serial,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let _logger = logging::setup().context("failed to start logging")?;

    match cli.command {
        Commands::Run { field } => viewer::open(field.config()),
        Commands::Bench {
            field,
            frames,
            fps,
            seed,
            attract,
        } => {
            // clap enforces exactly two values
            let attract = attract.map(|xy| (xy[0], xy[1]));
            bench::run(&field.config(), frames, fps, seed, attract)
        }
    }
}
