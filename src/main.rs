use anyhow::{Context, Result};
use clap::Parser;
use secret_santa::io::{self, FamilyGraph, Format};
use secret_santa::{GeneratorConfig, solve};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "secret-santa")]
#[command(about = "Draw Secret Santa pairs without gifts inside a household")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Family file (.json) or forbidden-pair graph (.gml)")]
    input: PathBuf,
    #[arg(
        long,
        default_value = ".",
        help = "Directory where the graph built from a .json input is saved"
    )]
    output: PathBuf,
    #[arg(long, help = "Random picks per attempt [default: 1000]")]
    max_steps: Option<usize>,
    #[arg(long, help = "Attempts per worker before giving up [default: 100]")]
    attempts: Option<usize>,
    #[arg(long, help = "Seed for a reproducible draw")]
    seed: Option<u64>,
    #[arg(long, help = "Workers racing independent attempts [default: 1]")]
    workers: Option<usize>,
    #[arg(long, short, help = "Log progress to stderr")]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> GeneratorConfig {
        let defaults = GeneratorConfig::default();
        GeneratorConfig {
            max_steps: self.max_steps.unwrap_or(defaults.max_steps),
            attempts: self.attempts.unwrap_or(defaults.attempts),
            seed: self.seed.or(defaults.seed),
            workers: self.workers.unwrap_or(defaults.workers),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let graph = load(cli)?;

    let assignment = solve(&graph.forbidden, graph.participant_count(), &cli.config())
        .context("could not draw an assignment")?;

    print!("{}", io::render::render(&assignment, &graph.roster));
    Ok(())
}

fn load(cli: &Cli) -> Result<FamilyGraph> {
    let input = &cli.input;
    match Format::from_path(input)? {
        Format::Json => {
            tracing::warn!(
                "reading JSON as a list of households; each household becomes a forbidden group"
            );
            let family = io::read_family(input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let graph = FamilyGraph::from(family);

            let output = io::graph_path(input, &cli.output);
            io::write_graph(&output, &graph)
                .with_context(|| format!("failed to write {}", output.display()))?;
            Ok(graph)
        }
        Format::Gml => io::read_graph(input)
            .with_context(|| format!("failed to read {}", input.display())),
    }
}
