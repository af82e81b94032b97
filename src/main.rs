use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{bail, Context, Result};
use blackout::{
    analysis::Analyzer,
    config::Config,
    gml,
    plot,
    report::to_json,
    sabotage::{Removal, Strategy},
};
use clap::{ArgAction, Parser, Subcommand};
use itertools::Itertools;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "blackout",
    version,
    about = "Analyse a power grid's topology and its robustness to targeted attacks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase logging verbosity (-v info, -vv debug)"
    )]
    verbose: u8,

    #[arg(long, global = true, help = "Configuration file path (TOML)")]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Worker threads for betweenness and closeness"
    )]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Measure the network and run the configured attacks")]
    Analyze {
        #[arg(help = "GML file describing the network")]
        file: PathBuf,

        #[arg(
            long = "fraction",
            help = "Share of vertices to remove, may be repeated (default 0.05 and 0.10)"
        )]
        fractions: Vec<f64>,

        #[arg(
            long = "strategy",
            value_enum,
            help = "Strategy to attack with, may be repeated (default degree, katz, eigenvector)"
        )]
        strategies: Vec<Strategy>,

        #[arg(long, help = "How many top ranked vertices to list per strategy")]
        top: Option<usize>,

        #[arg(long, help = "Print JSON instead of text")]
        json: bool,

        #[arg(short, long, help = "Write the report to a file instead of stdout")]
        output: Option<PathBuf>,

        #[arg(long, help = "Render SVG charts into this directory")]
        plot_dir: Option<PathBuf>,
    },

    #[command(about = "Remove the most important vertices and report the fragmentation")]
    Sabotage {
        #[arg(help = "GML file describing the network")]
        file: PathBuf,

        #[arg(long, value_enum, help = "Centrality used to rank the vertices")]
        strategy: Strategy,

        #[arg(
            long,
            conflicts_with = "count",
            required_unless_present = "count",
            help = "Share of vertices to remove"
        )]
        fraction: Option<f64>,

        #[arg(long, help = "Number of vertices to remove")]
        count: Option<usize>,

        #[arg(long, help = "Print JSON instead of text")]
        json: bool,
    },

    #[command(about = "Count the walks of a given length from one vertex")]
    Walks {
        #[arg(help = "GML file describing the network")]
        file: PathBuf,

        #[arg(long, help = "GML id of the starting vertex")]
        source: gml::NodeId,

        #[arg(long, help = "Number of steps")]
        length: u32,

        #[arg(long, default_value = "10", help = "How many vertices to list")]
        top: usize,

        #[arg(long, help = "Print JSON instead of text")]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(threads) = cli.threads {
        config.analysis.threads = threads;
    }

    match cli.command {
        Commands::Analyze {
            file,
            fractions,
            strategies,
            top,
            json,
            output,
            plot_dir,
        } => {
            override_analysis(&mut config, fractions, strategies, top);
            config.validate().context("invalid configuration")?;

            let mut analyzer = load(&file, config)?;
            let report = analyzer.run().context("analysis failed")?;

            if let Some(dir) = plot_dir {
                plot::render(&report, &dir)
                    .with_context(|| format!("failed to plot into {}", dir.display()))?;
            }

            let rendered = if json {
                to_json(&report, true)?
            } else {
                report.to_string()
            };

            match output {
                Some(path) => {
                    fs::write(&path, rendered + "\n")
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("report written to {}", path.display());
                }
                None => println!("{rendered}"),
            }
        }
        Commands::Sabotage {
            file,
            strategy,
            fraction,
            count,
            json,
        } => {
            let removal = match (fraction, count) {
                (Some(fraction), None) => Removal::Fraction(fraction),
                (None, Some(count)) => Removal::Count(count),
                _ => bail!("exactly one of --fraction and --count is required"),
            };

            let start = Instant::now();
            let mut analyzer = load(&file, config)?;
            let attack = analyzer
                .attack(strategy, removal)
                .with_context(|| format!("{strategy} attack failed"))?;

            if json {
                println!("{}", to_json(&attack, true)?);
            } else {
                let network = analyzer.network();
                println!("{attack}");
                println!(
                    "Removed labels: {}",
                    attack.removed.iter().map(|&id| network.name(id)).join(", ")
                );
                println!("duration: {:.3}s", start.elapsed().as_secs_f64());
            }
        }
        Commands::Walks {
            file,
            source,
            length,
            top,
            json,
        } => {
            let mut analyzer = load(&file, config)?;
            let walks = analyzer
                .walks(source, length, top)
                .with_context(|| format!("failed to count walks from {source}"))?;

            if json {
                println!("{}", to_json(&walks, true)?);
            } else {
                println!("Walks of length {length} from {source}:");
                for walk in walks {
                    println!("  {} (id {})  {}", walk.label, walk.id, walk.walks);
                }
            }
        }
    }

    Ok(())
}

/// Flags given on the command line replace the matching config file values.
fn override_analysis(
    config: &mut Config,
    fractions: Vec<f64>,
    strategies: Vec<Strategy>,
    top: Option<usize>,
) {
    if !fractions.is_empty() {
        config.analysis.fractions = fractions;
    }
    if !strategies.is_empty() {
        config.analysis.strategies = strategies;
    }
    if let Some(top) = top {
        config.analysis.top = top;
    }
}

fn load(file: &Path, config: Config) -> Result<Analyzer> {
    let network =
        gml::read(file).with_context(|| format!("failed to load {}", file.display()))?;

    Ok(Analyzer::new(network, config))
}

/// Logs go to stderr. `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
