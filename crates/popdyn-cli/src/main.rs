use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use popdyn_core::coefficients::{DispersionCoefficients, InteractionMatrix};
use popdyn_core::config::{BoundaryCondition, DiffusionMethod, SimConfig};
use popdyn_core::constants::{MAX_BOARD_DIM, MAX_SPECIES};
use popdyn_core::grid::PopulationGrid;
use popdyn_core::presets::{find_preset, presets, Scenario};
use popdyn_core::seeding::{apply_all, SeedShape};
use popdyn_core::simulation::{RunOutput, Simulation};
use popdyn_core::trajectory::Trajectory;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

const BENCHMARK_SEED: u64 = 42;
const BENCHMARK_COEFFICIENT: f64 = 0.2;

#[derive(Parser)]
#[command(name = "popdyn")]
#[command(about = "Spatial population dynamics (reaction-diffusion) CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single simulation from a scenario file
    Run {
        /// Path to scenario file (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Output directory for summaries (optional)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run a built-in preset by index or name
    Preset {
        /// Preset index, name, or slug
        name: String,

        #[arg(long, default_value_t = 10)]
        width: usize,

        #[arg(long, default_value_t = 10)]
        height: usize,

        /// Seed for noise-based presets
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Also record explicit-only and ADI-only trajectories
        #[arg(long)]
        compare: bool,

        /// Output directory for summaries (optional)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the built-in presets
    ListPresets,
    /// Dump the default scenario to stdout
    DumpDefaultConfig,
    /// Time full runs at the largest supported board and species count
    Benchmark {
        /// Steps per run (default: 200)
        #[arg(long, default_value_t = 200)]
        steps: usize,
    },
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let file = File::open(path).context("failed to open scenario file")?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).context("failed to parse scenario")
}

fn write_summary(path: &Path, trajectory: &Trajectory) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create summary file {}", path.display()))?;
    serde_json::to_writer_pretty(file, &trajectory.summary()).context("failed to write summary")
}

fn report(scenario: &Scenario, output: &RunOutput, out: Option<PathBuf>) -> Result<()> {
    let summary = output.primary.summary();
    println!(
        "Run complete: {} steps, density range [{:.4}, {:.4}]",
        summary.steps, summary.min_density, summary.max_density
    );
    for (species, total) in scenario.species.iter().zip(&summary.final_totals) {
        println!("  {:<12} final total {total:.4}", species.name);
    }

    if let Some(out_dir) = out {
        std::fs::create_dir_all(&out_dir).context("failed to create output directory")?;
        write_summary(&out_dir.join("summary.json"), &output.primary)?;
        if let Some(explicit) = &output.explicit {
            write_summary(&out_dir.join("summary_explicit.json"), explicit)?;
        }
        if let Some(adi) = &output.adi {
            write_summary(&out_dir.join("summary_adi.json"), adi)?;
        }
        println!("Results saved to {:?}", out_dir);
    }
    Ok(())
}

fn run_scenario(scenario: &Scenario, out: Option<PathBuf>) -> Result<()> {
    let sim = scenario
        .to_simulation()
        .context("Scenario validation error")?;
    let output = sim.prepare_calculations();
    report(scenario, &output, out)
}

fn benchmark_simulation(
    method: DiffusionMethod,
    boundary: BoundaryCondition,
    steps: usize,
) -> Result<Simulation> {
    let mut grid = PopulationGrid::new(MAX_BOARD_DIM, MAX_BOARD_DIM, MAX_SPECIES);
    let shapes: Vec<SeedShape> = (0..MAX_SPECIES)
        .map(|species| SeedShape::Noise {
            species,
            amplitude: 30.0,
        })
        .collect();
    apply_all(&shapes, &mut grid, BENCHMARK_SEED);
    let self_limiting = vec![-0.01; MAX_SPECIES];
    let config = SimConfig {
        method,
        boundary,
        dt: 1.0,
        steps,
        compare_methods: false,
    };
    Simulation::try_new(
        grid,
        InteractionMatrix::diagonal(&self_limiting),
        DispersionCoefficients::uniform(MAX_SPECIES, BENCHMARK_COEFFICIENT),
        config,
    )
    .context("Benchmark config validation error")
}

fn run_benchmark(steps: usize) -> Result<()> {
    println!(
        "=== {MAX_BOARD_DIM}x{MAX_BOARD_DIM} board, {MAX_SPECIES} species, {steps} steps ==="
    );
    for method in [DiffusionMethod::Explicit, DiffusionMethod::Adi] {
        for boundary in [BoundaryCondition::Dirichlet, BoundaryCondition::Neumann] {
            let sim = benchmark_simulation(method, boundary, steps)?;
            let started = Instant::now();
            let trajectory = sim.run_trajectory(sim.config());
            let elapsed = started.elapsed();
            let per_step_us = elapsed.as_secs_f64() * 1_000_000.0 / steps as f64;
            println!(
                "  {:<8} {:<9} total {:>8.1} ms  ({per_step_us:.0} us/step, {} frames)",
                format!("{method:?}"),
                format!("{boundary:?}"),
                elapsed.as_secs_f64() * 1000.0,
                trajectory.len()
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig => {
            println!("{}", Scenario::default().to_json_pretty()?);
        }
        Commands::ListPresets => {
            for (i, preset) in presets().iter().enumerate() {
                println!("{i}  {:<32} {}", preset.name, preset.description);
            }
        }
        Commands::Benchmark { steps } => {
            if cfg!(debug_assertions) {
                eprintln!("WARNING: running in debug mode. Results are not representative.");
                eprintln!("         Use: cargo run -p popdyn-cli --release -- benchmark");
                eprintln!();
            }
            run_benchmark(steps.clamp(1, SimConfig::MAX_STEPS))?;
        }
        Commands::Run { config, out } => {
            let scenario = load_scenario(&config)?;
            log::info!("loaded scenario from {:?}", config);
            run_scenario(&scenario, out)?;
        }
        Commands::Preset {
            name,
            width,
            height,
            seed,
            compare,
            out,
        } => {
            let preset = find_preset(&name).ok_or_else(|| anyhow!("unknown preset '{name}'"))?;
            println!("Preset: {} ({})", preset.name, preset.description);
            let mut scenario = preset.to_scenario(width, height, seed);
            scenario.config.compare_methods = compare;
            run_scenario(&scenario, out)?;
        }
    }
    Ok(())
}
