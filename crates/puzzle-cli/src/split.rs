//! The `split` subcommand: per-opening-code corpus partitioning.

use anyhow::Context;
use puzzle_stream::{open_corpus, EcoPartitioner, PartitionConfig, PgnStream, Shutdown};
use std::path::PathBuf;

pub async fn run(
    pgn: &str,
    out: PathBuf,
    eco_prefix: Option<String>,
    limit: Option<u64>,
    shutdown: Shutdown,
) -> anyhow::Result<()> {
    let reader = open_corpus(pgn)
        .await
        .with_context(|| format!("Failed to open corpus '{}'", pgn))?;
    let mut games = PgnStream::new(reader);
    let mut partitioner = EcoPartitioner::create(PartitionConfig {
        out_dir: out,
        eco_prefix,
        limit,
    })
    .await?;

    while let Some(game) = games.next_game().await? {
        if shutdown.is_triggered() {
            tracing::info!("Stopping partitioning on shutdown");
            break;
        }
        if !partitioner.write_game(&game).await? {
            break;
        }
    }

    let summary = partitioner.finish().await?;
    println!("Files written: {}", summary.files);
    println!("Total games:   {}", summary.total);
    if let Some((eco, count)) = &summary.largest {
        println!("Largest file:  {}.ndjson ({} games)", eco, count);
    }
    println!("Elapsed:       {:.1}s", summary.elapsed.as_secs_f64());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = "\
[Event \"A\"]\n[ECO \"B01\"]\n\n1. e4 d5 1-0\n\n\
[Event \"B\"]\n[ECO \"B01\"]\n\n1. e4 d5 2. exd5 0-1\n\n\
[Event \"C\"]\n[ECO \"C20\"]\n\n1. e4 e5 1/2-1/2\n\n";

    #[tokio::test]
    async fn test_split_fans_out_by_code() {
        let dir = tempfile::tempdir().unwrap();
        let pgn = dir.path().join("corpus.pgn");
        std::fs::write(&pgn, CORPUS).unwrap();
        let out = dir.path().join("partitions");

        run(
            pgn.to_str().unwrap(),
            out.clone(),
            None,
            None,
            Shutdown::new(),
        )
        .await
        .unwrap();

        let b01 = std::fs::read_to_string(out.join("B01.ndjson")).unwrap();
        assert_eq!(b01.lines().count(), 2);
        assert!(b01.lines().next().unwrap().contains("\"moves\":\"e4 d5\""));
        assert_eq!(
            std::fs::read_to_string(out.join("C20.ndjson"))
                .unwrap()
                .lines()
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_split_honors_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let pgn = dir.path().join("corpus.pgn");
        std::fs::write(&pgn, CORPUS).unwrap();
        let out = dir.path().join("partitions");

        let shutdown = Shutdown::new();
        shutdown.trigger();
        run(pgn.to_str().unwrap(), out.clone(), None, None, shutdown)
            .await
            .unwrap();

        assert!(!out.join("B01.ndjson").exists());
    }
}
