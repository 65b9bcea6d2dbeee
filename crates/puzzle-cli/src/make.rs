//! The `make` subcommand: mine evaluated games into a puzzle pack.

use crate::pack;
use anyhow::Context;
use puzzle_core::PuzzleCandidate;
use puzzle_mine::{mine_game, Deduper, Reservoir};
use puzzle_stream::{open_corpus, NdjsonStream, Shutdown};
use std::path::Path;

pub async fn run(
    eco: &str,
    source: &str,
    out: &Path,
    max_games: usize,
    limit: usize,
    shutdown: Shutdown,
) -> anyhow::Result<()> {
    let puzzles = mine_corpus(eco, source, max_games, limit, &shutdown).await?;
    let dir = pack::write_pack(out, eco, &puzzles).await?;
    pack::fetch_cover(&dir, &puzzles).await;
    println!("Wrote {} puzzles -> {}", puzzles.len(), dir.display());
    Ok(())
}

/// Scans the corpus for qualifying swings, deduplicates by candidate id,
/// and keeps a uniform sample of at most `limit` puzzles.
async fn mine_corpus(
    eco: &str,
    source: &str,
    max_games: usize,
    limit: usize,
    shutdown: &Shutdown,
) -> anyhow::Result<Vec<PuzzleCandidate>> {
    let reader = open_corpus(source)
        .await
        .with_context(|| format!("Failed to open corpus '{}'", source))?;
    let mut games = NdjsonStream::with_limit(reader, max_games);

    let mut deduper = Deduper::new();
    let mut reservoir = Reservoir::new(limit);
    let mut scanned = 0u64;
    let mut mined = 0u64;

    while let Some(game) = games.next_game().await? {
        if shutdown.is_triggered() {
            tracing::info!("Stopping mining on shutdown");
            break;
        }
        scanned += 1;
        match mine_game(&game, eco) {
            Ok(Some(candidate)) => {
                if let Some(candidate) = deduper.filter(candidate) {
                    mined += 1;
                    reservoir.push(candidate);
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(game = scanned, error = %e, "skipping unreplayable game");
            }
        }
        if scanned % 1000 == 0 {
            tracing::info!(scanned, mined, "mining progress");
        }
    }

    let puzzles = reservoir.into_items();
    tracing::info!(scanned, mined, kept = puzzles.len(), "mining complete");
    Ok(puzzles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_corpus(dir: &Path) -> std::path::PathBuf {
        let source = dir.join("evals.ndjson");
        // Two games with the same triggering position collapse to one
        // puzzle; the third is outside the requested opening.
        std::fs::write(
            &source,
            concat!(
                r#"{"id":"g1","opening":{"eco":"B01","name":"Scandinavian"},"moves":"e4 d5 exd5","evals":[10,30,280]}"#,
                "\n",
                r#"{"id":"g2","opening":{"eco":"B01","name":"Scandinavian"},"moves":"e4 d5 exd5","evals":[10,20,300]}"#,
                "\n",
                r#"{"id":"g3","opening":{"eco":"C20","name":"Other"},"moves":"e4 e5","evals":[10,300]}"#,
                "\n",
            ),
        )
        .unwrap();
        source
    }

    #[tokio::test]
    async fn test_mining_dedupes_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_corpus(dir.path());

        let puzzles = mine_corpus("B01", source.to_str().unwrap(), 100, 10, &Shutdown::new())
            .await
            .unwrap();

        assert_eq!(puzzles.len(), 1);
        assert_eq!(puzzles[0].eco, "B01");
        assert_eq!(puzzles[0].src.game, "g1");
    }

    #[tokio::test]
    async fn test_mined_corpus_packs_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_corpus(dir.path());
        let out = dir.path().join("dist");

        let puzzles = mine_corpus("B01", source.to_str().unwrap(), 100, 10, &Shutdown::new())
            .await
            .unwrap();
        let pack_dir = pack::write_pack(&out, "B01", &puzzles).await.unwrap();

        assert_eq!(pack_dir, out.join("pack_B01_v1"));
        let lines = std::fs::read_to_string(pack_dir.join("puzzles.ndjson")).unwrap();
        assert_eq!(lines.lines().count(), 1);
        assert!(pack_dir.join("pack_meta.json").exists());
        assert!(pack_dir.join("LICENSE.txt").exists());
    }

    #[tokio::test]
    async fn test_scan_cap_bounds_input() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_corpus(dir.path());

        // Cap of 1 stops before the g2 duplicate is ever read.
        let puzzles = mine_corpus("B01", source.to_str().unwrap(), 1, 10, &Shutdown::new())
            .await
            .unwrap();
        assert_eq!(puzzles.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_corpus_yields_no_puzzles() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("evals.ndjson");
        std::fs::write(&source, "").unwrap();

        let puzzles = mine_corpus("B01", source.to_str().unwrap(), 100, 10, &Shutdown::new())
            .await
            .unwrap();
        assert!(puzzles.is_empty());
    }
}
