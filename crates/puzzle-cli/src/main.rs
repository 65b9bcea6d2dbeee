//! Puzzle pack mining pipeline front end.
//!
//! Subcommands cover the full pipeline: `split` partitions a raw PGN
//! corpus by opening code, `annotate` runs live engine analysis over a
//! corpus, `make` mines evaluated games into a distributable pack, and
//! `stats` reports partition sizes.

mod annotate;
mod make;
mod pack;
mod split;
mod stats;

use annotate::EngineKind;
use clap::{Parser, Subcommand};
use puzzle_stream::Shutdown;
use std::path::PathBuf;
use tokio::signal;

#[derive(Parser)]
#[command(name = "puzzle-packs")]
#[command(about = "Mines chess puzzle packs from game corpora")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate games from a PGN corpus with engine judgments
    Annotate {
        /// Input corpus: a .pgn path, a .zst path, an http(s) URL, or - for stdin
        pgn: String,
        /// Output NDJSON file of annotated games
        #[arg(short, long, default_value = "annotated.ndjson")]
        out: PathBuf,
        /// Search depth per evaluated position
        #[arg(short, long, default_value = "12")]
        depth: u32,
        /// Worker thread count (pool) or engine thread option (uci)
        #[arg(short, long, default_value = "4")]
        threads: usize,
        /// Evaluation backend
        #[arg(long, value_enum, default_value = "pool")]
        engine: EngineKind,
        /// Path to the UCI engine binary
        #[arg(long, default_value = "stockfish")]
        engine_path: String,
    },
    /// Build a puzzle pack for one opening code from evaluated games
    Make {
        /// ECO code the pack covers, e.g. B01
        eco: String,
        /// Evaluated games corpus: an NDJSON path, a .zst path, an http(s) URL, or - for stdin
        source: String,
        /// Directory receiving the pack
        #[arg(short, long, default_value = "dist")]
        out: PathBuf,
        /// Scan at most this many games
        #[arg(long, default_value = "1000")]
        max_games: usize,
        /// Keep at most this many puzzles (uniform sample)
        #[arg(short, long, default_value = "1000")]
        limit: usize,
    },
    /// Partition a PGN corpus into per-opening-code NDJSON files
    Split {
        /// Input corpus: a .pgn path, a .zst path, an http(s) URL, or - for stdin
        pgn: String,
        /// Directory receiving one file per opening code
        #[arg(short, long, default_value = "partitions")]
        out: PathBuf,
        /// Only keep games whose code starts with this prefix
        #[arg(long)]
        eco_prefix: Option<String>,
        /// Stop after this many games
        #[arg(short, long)]
        limit: Option<u64>,
    },
    /// Report per-file game counts for a partition directory
    Stats {
        /// Partition directory to inspect
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let shutdown = Shutdown::new();
    let flag = shutdown.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            flag.trigger();
        }
    });

    match cli.command {
        Commands::Annotate {
            pgn,
            out,
            depth,
            threads,
            engine,
            engine_path,
        } => annotate::run(&pgn, &out, depth, threads, engine, &engine_path, shutdown).await,
        Commands::Make {
            eco,
            source,
            out,
            max_games,
            limit,
        } => make::run(&eco, &source, &out, max_games, limit, shutdown).await,
        Commands::Split {
            pgn,
            out,
            eco_prefix,
            limit,
        } => split::run(&pgn, out, eco_prefix, limit, shutdown).await,
        Commands::Stats { dir } => stats::run(&dir).await,
    }
}
