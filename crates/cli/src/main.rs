use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use movie_store::config::smallest_prime_above;
use movie_store::{HashParams, MovieStore, StoreConfig, UserId};
use rand::Rng;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

mod driver;
mod events;
mod report;

use driver::Driver;
use report::Report;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// ReelStore - in-memory movie catalog and rating store
#[derive(Parser)]
#[command(name = "reel-store")]
#[command(about = "Replays catalog and rating events against an in-memory store", long_about = None)]
struct Cli {
    /// Number of hash buckets for user records
    #[arg(long, env = "REEL_BUCKETS", default_value = "16", global = true)]
    buckets: usize,

    /// Largest accepted user id
    #[arg(long, env = "REEL_MAX_USER_ID", default_value = "1000", global = true)]
    max_user_id: UserId,

    /// Hash multiplier, random in [1, p) when omitted
    #[arg(long, env = "REEL_HASH_A", global = true)]
    hash_a: Option<u64>,

    /// Hash offset, random in [0, p) when omitted
    #[arg(long, env = "REEL_HASH_B", global = true)]
    hash_b: Option<u64>,

    /// Hash prime, smallest prime above the max user id when omitted
    #[arg(long, env = "REEL_HASH_P", global = true)]
    hash_p: Option<u64>,

    /// Cap on catalog nodes, to exercise out-of-memory handling
    #[arg(long, env = "REEL_NODE_BUDGET", global = true)]
    node_budget: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    format: Format,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay an event file
    Run {
        /// Event file, standard input when omitted
        #[arg(long)]
        events: Option<PathBuf>,
    },

    /// Print the resolved store configuration as JSON
    Config,
}

fn main() -> Result<()> {
    // Logs go to stderr so reports on stdout stay machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = build_config(&cli, &mut rand::rng())?;

    match &cli.command {
        Commands::Run { events } => handle_run(config, events.as_ref(), cli.format)?,
        Commands::Config => handle_config(&config)?,
    }

    Ok(())
}

/// Resolve the store configuration from flags and environment.
fn build_config(cli: &Cli, rng: &mut impl Rng) -> Result<StoreConfig> {
    let p = cli
        .hash_p
        .unwrap_or_else(|| smallest_prime_above(u64::from(cli.max_user_id)));
    if p < 2 {
        return Err(anyhow!("Hash prime must be at least 2, got {}", p));
    }
    let a = cli.hash_a.unwrap_or_else(|| rng.random_range(1..p));
    let b = cli.hash_b.unwrap_or_else(|| rng.random_range(0..p));

    let mut config =
        StoreConfig::new(cli.buckets, cli.max_user_id).with_hash(HashParams::new(a, b, p));
    if let Some(budget) = cli.node_budget {
        config = config.with_node_budget(budget);
    }
    config.validate().context("Invalid store configuration")?;
    Ok(config)
}

/// Handle the 'run' command
fn handle_run(config: StoreConfig, events: Option<&PathBuf>, format: Format) -> Result<()> {
    let input = match events {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read events from standard input")?;
            buffer
        }
    };

    let store = MovieStore::new(config).context("Failed to create store")?;
    let mut driver = Driver::new(store);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let start = Instant::now();
    let summary = driver.run(&input, |report| print_report(&mut out, report, format))?;
    out.flush().context("Failed to flush output")?;

    tracing::info!(
        "Replayed {} events in {:?} ({} ignored, {} movies published)",
        summary.events,
        start.elapsed(),
        summary.ignored,
        driver.store().catalog().len()
    );
    if format == Format::Text && summary.ignored > 0 {
        eprintln!(
            "{} {} of {} events were ignored",
            "!".yellow(),
            summary.ignored,
            summary.events
        );
    }
    Ok(())
}

/// Handle the 'config' command
fn handle_config(config: &StoreConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
    println!("{}", json);
    Ok(())
}

fn print_report(out: &mut impl Write, report: &Report, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let line = serde_json::to_string(report).context("Failed to serialize report")?;
            writeln!(out, "{}", line)?;
        }
        Format::Text => {
            if report.is_ignored() {
                write!(out, "{}", report.to_string().red())?;
            } else {
                write!(out, "{report}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}
