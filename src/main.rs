//! OVERGROWTH - CLI Entry Point
//!
//! Grows a pattern from a photograph and saves the result.

use clap::{Parser, Subcommand};
use overgrowth::stats::{GrowthStats, StatsHistory};
use overgrowth::{benchmark, Config, ExecutionStrategy, QualityMode, SimulationRun, SourceImage, StepEngine};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "overgrowth")]
#[command(version)]
#[command(about = "Stochastic growth simulation seeded from a photograph")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow a pattern from an image
    Run {
        /// Source image (PNG or JPEG)
        #[arg(short, long)]
        input: PathBuf,

        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Output image (PNG)
        #[arg(short, long, default_value = "growth.png")]
        output: PathBuf,

        /// Stop after this many ticks even if not stable
        #[arg(short, long, default_value = "5000")]
        max_ticks: u64,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Cap the simulation resolution at the configured max dimension
        #[arg(long)]
        reduced: bool,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run performance benchmark
    Benchmark {
        /// Grid width
        #[arg(long, default_value = "512")]
        width: usize,

        /// Grid height
        #[arg(long, default_value = "512")]
        height: usize,

        /// Number of ticks
        #[arg(short, long, default_value = "200")]
        ticks: u64,

        /// Use the single-threaded pass
        #[arg(long)]
        sequential: bool,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            config,
            output,
            max_ticks,
            seed,
            reduced,
            quiet,
        } => run_growth(input, config, output, max_ticks, seed, reduced, quiet),

        Commands::Benchmark {
            width,
            height,
            ticks,
            sequential,
        } => run_benchmark(width, height, ticks, sequential),

        Commands::Init { output } => generate_config(output),
    }
}

fn load_image(path: &PathBuf) -> Result<SourceImage, Box<dyn std::error::Error>> {
    let decoded = image::open(path)?.to_rgb8();
    let (width, height) = decoded.dimensions();
    Ok(SourceImage::from_rgb8(
        width as usize,
        height as usize,
        decoded.as_raw(),
    )?)
}

fn run_growth(
    input: PathBuf,
    config_path: PathBuf,
    output: PathBuf,
    max_ticks: u64,
    seed: Option<u64>,
    reduced: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let mut config = if config_path.exists() {
        println!("Loading config from: {:?}", config_path);
        Config::from_file(&config_path)?
    } else {
        println!("Using default configuration");
        Config::default()
    };
    if reduced {
        config.quality.mode = QualityMode::Reduced;
    }
    init_logging(&config.logging.log_level);

    let image = load_image(&input)?;
    let seed = seed.unwrap_or_else(rand::random);
    let mut run = SimulationRun::seed(&image, &config, seed)?;
    let engine = StepEngine::new(config.scheduler.strategy);

    let grid = run.current_grid()?;
    println!("Starting growth");
    println!("  Source: {:?} ({}x{})", input, image.width(), image.height());
    println!("  Grid size: {}x{}", grid.width(), grid.height());
    println!("  Seeded: {} cells", grid.occupied_count());
    println!("  Seed: {}", seed);
    println!();

    let mut history = StatsHistory::new(config.logging.stats_interval);
    history.record(GrowthStats::from_run(&run, None));
    let start = Instant::now();

    while run.tick_count() < max_ticks {
        let report = run.tick(&engine)?;
        let stats = GrowthStats::from_run(&run, Some(&report));

        if history.maybe_record(&stats) && !quiet {
            println!("{}", stats.summary());
        }

        if run.is_stable() {
            println!("\nStable at tick {}", run.tick_count());
            history.record(stats);
            break;
        }
    }

    let elapsed = start.elapsed();
    let grid = run.current_grid()?;

    println!();
    println!("=== Growth Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Ticks: {}", run.tick_count());
    println!(
        "Speed: {:.1} ticks/s",
        run.tick_count() as f64 / elapsed.as_secs_f64()
    );
    println!("Coverage: {:.1}%", grid.coverage() * 100.0);
    println!("Stable: {}", run.is_stable());

    let pixels = run.export_pixels()?;
    let buffer = image::RgbaImage::from_raw(grid.width() as u32, grid.height() as u32, pixels)
        .ok_or("export buffer does not match grid size")?;
    buffer.save(&output)?;
    println!("Output image: {:?}", output);

    let stats_path = output.with_extension("stats.json");
    history.save(&stats_path.to_string_lossy())?;
    println!("Stats history: {:?}", stats_path);

    Ok(())
}

fn run_benchmark(
    width: usize,
    height: usize,
    ticks: u64,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let strategy = if sequential {
        ExecutionStrategy::Sequential
    } else {
        ExecutionStrategy::Parallel
    };

    init_logging("info");

    println!("=== OVERGROWTH Benchmark ===");
    println!("Grid: {}x{}", width, height);
    println!("Ticks: {}", ticks);
    println!();

    let result = benchmark(ticks, width, height, strategy)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    init_logging("info");
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
