use clap::{Parser, Subcommand};
use log::info;
use siting::config::SitingConfig;
use siting::instance::Instance;
use siting::models::siting::{SitingModel, Weights};
use siting::models::toy::{ToyLp, REFERENCE_WEIGHTS};
use siting::plot::{PlotConfig, SitingPlot, ToyPlot};
use siting::report::{self, RunInfo, SitingReport, ToyReport};
use siting::solver;
use siting::Result;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about = "Weighted-sum multi-objective LP and MILP examples")]
struct Cli {
    /// Solver backend (`microlp`, or `gurobi` when built with the feature)
    #[clap(long, global = true)]
    solver: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve the three variable toy LP
    Toy {
        /// Objective weights w0,w1,w2
        #[clap(long, value_delimiter = ',', allow_hyphen_values = true)]
        weights: Option<Vec<f64>>,
        /// Write the report as JSON
        #[clap(long)]
        output: Option<PathBuf>,
        /// Write an SVG of the feasible region and the optimum
        #[clap(long)]
        plot: Option<PathBuf>,
    },
    /// Site waste processing facilities
    Site {
        /// JSON configuration, defaults are used for missing fields
        #[clap(long)]
        config: Option<PathBuf>,
        /// Solve this instance instead of generating one
        #[clap(long)]
        instance: Option<PathBuf>,
        /// Seed of the instance generator
        #[clap(long)]
        seed: Option<u64>,
        /// Objective weights transport,safety,water,investment
        #[clap(long, value_delimiter = ',', allow_hyphen_values = true)]
        weights: Option<Vec<f64>>,
        /// Write the report as JSON
        #[clap(long)]
        output: Option<PathBuf>,
        /// Write an SVG of the solution
        #[clap(long)]
        plot: Option<PathBuf>,
    },
    /// Generate an instance and write it as JSON
    Generate {
        #[clap(long)]
        config: Option<PathBuf>,
        #[clap(long)]
        seed: Option<u64>,
        #[clap(long)]
        output: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<SitingConfig> {
    match path {
        Some(path) => SitingConfig::load(path),
        None => Ok(SitingConfig::default()),
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Toy {
            weights,
            output,
            plot,
        } => {
            let weights = weights.unwrap_or_else(|| REFERENCE_WEIGHTS.to_vec());
            let weights: [f64; 3] = weights.as_slice().try_into().map_err(|_| {
                siting::Error::InvalidInstance(format!(
                    "expected 3 weights, got {}",
                    weights.len()
                ))
            })?;
            let solver = solver::by_name(cli.solver.as_deref().unwrap_or("microlp"))?;

            let result = ToyLp::build(weights).solve(solver.as_ref())?;
            let report = ToyReport {
                run: RunInfo::new(solver.name()),
                result,
            };
            println!("{}", report);

            if let Some(path) = plot {
                ToyPlot::new(PlotConfig::new("toy LP"), &report.result).write_to_file(&path)?;
                info!("Plot written to {}", path.display());
            }
            if let Some(path) = output {
                report::write_json(&report, &path)?;
                info!("Report written to {}", path.display());
            }
        }
        Command::Site {
            config,
            instance,
            seed,
            weights,
            output,
            plot,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(weights) = weights {
                config.weights = Weights::from_slice(&weights)?;
            }
            if let Some(name) = cli.solver {
                config.solver = name;
            }

            let (instance, seed) = match instance {
                Some(path) => (Instance::load(path)?, None),
                None => (Instance::random(config.counts, config.seed), Some(config.seed)),
            };
            let solver = solver::by_name(&config.solver)?;

            let result = SitingModel::from_instance(&instance, config.facilities, config.weights)?
                .solve(solver.as_ref())?;
            let report = SitingReport {
                run: RunInfo::new(solver.name()),
                seed,
                weights: config.weights,
                instance,
                result,
            };
            println!("{}", report);

            if let Some(path) = plot {
                SitingPlot::new(PlotConfig::new("facility siting"), &report.instance, &report.result)
                    .write_to_file(&path)?;
                info!("Plot written to {}", path.display());
            }
            if let Some(path) = output {
                report::write_json(&report, &path)?;
                info!("Report written to {}", path.display());
            }
        }
        Command::Generate {
            config,
            seed,
            output,
        } => {
            let config = load_config(config.as_ref())?;
            let instance = Instance::random(config.counts, seed.unwrap_or(config.seed));
            instance.save(&output)?;
            info!("Instance written to {}", output.display());
        }
    }

    Ok(())
}

pub fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run(Cli::parse())
}
