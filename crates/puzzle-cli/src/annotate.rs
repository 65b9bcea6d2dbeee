//! The `annotate` subcommand: live engine analysis over a PGN corpus.

use anyhow::Context;
use clap::ValueEnum;
use puzzle_engine::{Engine, PoolEngine, UciEngine};
use puzzle_mine::{AnnotateError, GameAnnotator};
use puzzle_stream::{open_corpus, PgnStream, Shutdown};
use std::path::Path;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Which evaluation backend drives the annotation.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EngineKind {
    /// In-process worker pool with a shallow material search
    Pool,
    /// External UCI engine subprocess
    Uci,
}

pub async fn run(
    pgn: &str,
    out: &Path,
    depth: u32,
    threads: usize,
    kind: EngineKind,
    engine_path: &str,
    shutdown: Shutdown,
) -> anyhow::Result<()> {
    // An unusable engine is fatal before any game is read.
    let engine: Box<dyn Engine> = match kind {
        EngineKind::Pool => Box::new(PoolEngine::new(threads)),
        EngineKind::Uci => Box::new(
            UciEngine::spawn(engine_path, threads)
                .await
                .with_context(|| format!("Failed to start engine '{}'", engine_path))?,
        ),
    };

    let result = annotate_corpus(pgn, out, depth, engine.as_ref(), &shutdown).await;
    engine.shutdown().await;
    result
}

async fn annotate_corpus(
    pgn: &str,
    out: &Path,
    depth: u32,
    engine: &dyn Engine,
    shutdown: &Shutdown,
) -> anyhow::Result<()> {
    let reader = open_corpus(pgn)
        .await
        .with_context(|| format!("Failed to open corpus '{}'", pgn))?;
    let mut games = PgnStream::new(reader);
    let annotator = GameAnnotator::new(engine, depth);

    let file = tokio::fs::File::create(out)
        .await
        .with_context(|| format!("Failed to create '{}'", out.display()))?;
    let mut writer = BufWriter::new(file);

    let mut scanned = 0u64;
    let mut written = 0u64;
    while let Some(game) = games.next_game().await? {
        if shutdown.is_triggered() {
            tracing::info!("Stopping annotation on shutdown");
            break;
        }
        scanned += 1;
        match annotator.annotate(&game).await {
            Ok(Some(annotated)) => {
                let line = serde_json::to_string(&annotated)?;
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                written += 1;
            }
            Ok(None) => {}
            // A dead engine poisons every later game; bail out.
            Err(AnnotateError::Engine(e)) => {
                writer.flush().await?;
                return Err(e).context("Engine failed during annotation");
            }
            Err(e @ AnnotateError::IllegalMove { .. }) => {
                tracing::warn!(game = scanned, error = %e, "skipping unreplayable game");
            }
        }
        if scanned % 100 == 0 {
            tracing::info!(scanned, written, "annotation progress");
        }
    }
    writer.flush().await?;

    tracing::info!(scanned, written, "annotation complete");
    println!("Annotated {} of {} games -> {}", written, scanned, out.display());
    Ok(())
}
