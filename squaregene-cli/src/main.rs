//! SQUAREGENE CLI - Command-line interface
//!
//! Commands:
//! - evolve: Evolve piece-square genomes through round-robin self-play
//! - match: Replay one pairing between two genomes of a report

mod evolve;
mod match_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "squaregene")]
#[command(about = "Evolve chess piece-square tables by self-play", version)]
struct Cli {
    /// Seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the genetic algorithm
    Evolve(evolve::EvolveArgs),
    /// Play one match between two individuals of a report
    Match(match_cmd::MatchArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Evolve(args) => evolve::run(args, cli.seed),
        Commands::Match(args) => match_cmd::run(args),
    }
}

/// Install the fmt subscriber, honouring RUST_LOG when set
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
