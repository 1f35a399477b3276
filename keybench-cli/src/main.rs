//! Keybench CLI — benchmark RSA and ECC signature operations with a live
//! terminal chart.

mod commands;
mod render;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Keybench: RSA vs ECC signature benchmarks
#[derive(Parser, Debug)]
#[command(name = "keybench", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (searched for `.keybench/config.toml`)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Repetitions per phase (overrides configuration)
    #[arg(short = 'n', long)]
    iterations: Option<usize>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List the built-in algorithm catalog
    List,
    /// Benchmark one algorithm with a live chart
    Run {
        /// Algorithm id (e.g. rsa2048, p256)
        id: String,
    },
    /// Benchmark two algorithms concurrently, side by side
    Compare {
        /// Algorithm id for side A
        a: String,
        /// Algorithm id for side B
        b: String,
    },
    /// Generate a key pair and export it as PEM
    Keygen {
        /// Algorithm id (e.g. rsa2048, p256)
        id: String,
        /// Write PEM files to this directory instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Measure security bits delivered per millisecond of computation
    Efficiency {
        /// Algorithm id (e.g. rsa2048, p256)
        id: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create a default workspace configuration file
    Init,
    /// Show the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging. The
    // default stays at `warn` so the live chart isn't interleaved with
    // run lifecycle logs.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Human-readable layer for stderr (always active)
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    // JSON file layer for structured logging
    let log_dir = directories::ProjectDirs::from("dev", "keybench", "keybench")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "keybench.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // Resolve workspace
    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    commands::handle_command(cli.command, &workspace, cli.iterations).await
}
