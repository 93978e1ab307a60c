use clap::{Parser, Subcommand};
use impression_pacing::io::reporting;
use impression_pacing::logger;
use impression_pacing::model::slot::{SLOTS_PER_HOUR, SLOT_DURATION_MINUTES};
use impression_pacing::simulation::config::SimulationConfig;
use impression_pacing::simulation::delivery::DEFAULT_VARIATION_FACTOR;
use impression_pacing::strategy::algorithms::DistributionAlgorithm;
use impression_pacing::strategy::patterns::TrafficPattern;
use impression_pacing::strategy::traits::CatalogEntry;
use impression_pacing::{PacingSimulation, Result};
use log::LevelFilter;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "impression-pacing",
    about = "Simulate how an impression budget is paced across a day of 10-minute slots",
    version
)]
struct Cli {
    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LevelFilter>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulated day
    Run {
        /// Total impressions for the day
        #[arg(long, default_value_t = 1_000_000)]
        budget: u64,

        /// Distribution algorithm tag (see `catalog`)
        #[arg(long, default_value = "equal")]
        algorithm: String,

        /// Customer traffic pattern tag (see `catalog`)
        #[arg(long, default_value = "uniform")]
        pattern: String,

        /// Seed for reproducible delivery
        #[arg(long)]
        seed: Option<u64>,

        /// Playback speed multiplier (only used with --realtime)
        #[arg(long, default_value_t = 1.0)]
        speed: f64,

        /// Maximum fractional under-delivery per slot
        #[arg(long, default_value_t = DEFAULT_VARIATION_FACTOR)]
        variation: f64,

        /// Pause between ticks like a live dashboard would
        #[arg(long)]
        realtime: bool,

        /// Write the final slots to CSV
        #[arg(long)]
        slots_csv: Option<PathBuf>,

        /// Write the per-tick history to CSV
        #[arg(long)]
        history_csv: Option<PathBuf>,

        /// Print the final chart series as JSON
        #[arg(long)]
        chart_json: bool,
    },

    /// List distribution algorithms and traffic patterns
    Catalog,

    /// Print a traffic pattern's weight per slot
    Preview {
        #[arg(long)]
        pattern: String,

        #[arg(long, default_value_t = 144)]
        slots: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.log_level, cli.log_file.as_deref());

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            budget,
            algorithm,
            pattern,
            seed,
            speed,
            variation,
            realtime,
            slots_csv,
            history_csv,
            chart_json,
        } => {
            let config = SimulationConfig {
                total_budget: budget,
                algorithm,
                pattern,
                seed,
                speed,
                variation_factor: variation,
                ..SimulationConfig::default()
            };
            let mut sim = PacingSimulation::new(config)?;

            if realtime {
                while !sim.is_finished() {
                    sim.step()?;
                    std::thread::sleep(sim.tick_interval());
                }
            } else {
                sim.run()?;
            }

            let stats = sim.stats();
            println!("=== {} / {} ===", sim.algorithm().name(), sim.pattern().name());
            println!("Completed slots: {} / {}", stats.completed_slots, stats.total_slots);
            println!("Actual impressions: {}", stats.actual_delivered);
            println!("Planned impressions: {}", stats.planned_for_completed);
            println!("Efficiency: {:.1}%", stats.efficiency_pct);

            if let Some(path) = slots_csv {
                reporting::write_slots_csv(&path, sim.slots())?;
            }
            if let Some(path) = history_csv {
                reporting::write_history_csv(&path, sim.history())?;
            }
            if chart_json {
                println!("{}", reporting::chart_json(&sim.chart_data(sim.slots().len()))?);
            }
            Ok(())
        }
        Commands::Catalog => {
            println!("Algorithms:");
            for algorithm in DistributionAlgorithm::ALL {
                println!(
                    "  {:<14} {:<20} {}",
                    algorithm.tag(),
                    algorithm.name(),
                    algorithm.description()
                );
            }
            println!("Patterns:");
            for pattern in TrafficPattern::ALL {
                println!(
                    "  {:<14} {:<20} {}",
                    pattern.tag(),
                    pattern.name(),
                    pattern.description()
                );
            }
            Ok(())
        }
        Commands::Preview { pattern, slots } => {
            let pattern: TrafficPattern = pattern.parse()?;
            for (i, weight) in pattern.preview(slots).iter().enumerate() {
                let hour = (i / SLOTS_PER_HOUR) % 24;
                let minute = (i % SLOTS_PER_HOUR) as i64 * SLOT_DURATION_MINUTES;
                println!("{:>3} {:02}:{:02} {:.3}", i, hour, minute, weight);
            }
            Ok(())
        }
    }
}
