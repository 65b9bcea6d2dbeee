//! Per-opening-code corpus fan-out.

use crate::StreamError;
use puzzle_core::GameRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWriteExt, BufWriter};

/// How often (in processed games) a progress line is emitted.
const PROGRESS_INTERVAL: u64 = 1000;

/// Settings for a partitioning run.
#[derive(Debug, Clone)]
pub struct PartitionConfig {
    /// Directory receiving one `<eco>.ndjson` file per code.
    pub out_dir: PathBuf,
    /// Only partition games whose code starts with this prefix.
    pub eco_prefix: Option<String>,
    /// Stop after this many games in total.
    pub limit: Option<u64>,
}

/// Outcome of a partitioning run.
#[derive(Debug)]
pub struct PartitionSummary {
    /// Number of distinct codes (and therefore files) written.
    pub files: usize,
    /// Total games written across all codes.
    pub total: u64,
    /// The code with the most games, with its count.
    pub largest: Option<(String, u64)>,
    /// Wall time of the run.
    pub elapsed: Duration,
}

#[derive(Serialize)]
struct PartitionRecord<'a> {
    eco: &'a str,
    moves: String,
}

/// Fans a game stream out to one append-only NDJSON file per opening
/// code.
///
/// Files are created lazily on the first game of each code and opened in
/// append mode, so repeated runs accumulate. [`finish`](Self::finish)
/// flushes every writer; the driving loop calls it on normal completion
/// and on shutdown alike.
pub struct EcoPartitioner {
    config: PartitionConfig,
    writers: HashMap<String, BufWriter<tokio::fs::File>>,
    counts: HashMap<String, u64>,
    total: u64,
    started: Instant,
}

impl EcoPartitioner {
    /// Creates the output directory and an empty partitioner.
    pub async fn create(config: PartitionConfig) -> Result<Self, StreamError> {
        tokio::fs::create_dir_all(&config.out_dir).await?;
        Ok(Self {
            config,
            writers: HashMap::new(),
            counts: HashMap::new(),
            total: 0,
            started: Instant::now(),
        })
    }

    /// Routes one game to its per-code file.
    ///
    /// Returns `false` once the configured limit is reached, signalling
    /// the caller to stop consuming input. Games without a code, or
    /// outside the prefix filter, are skipped.
    pub async fn write_game(&mut self, game: &GameRecord) -> Result<bool, StreamError> {
        let Some(eco) = game.eco() else {
            return Ok(true);
        };
        if let Some(prefix) = &self.config.eco_prefix {
            if !eco.starts_with(prefix.as_str()) {
                return Ok(true);
            }
        }

        let eco = eco.to_string();
        if !self.writers.contains_key(&eco) {
            let path = self.config.out_dir.join(format!("{}.ndjson", eco));
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await?;
            self.writers.insert(eco.clone(), BufWriter::new(file));
        }
        let record = PartitionRecord {
            eco: &eco,
            moves: game.moves.join(" "),
        };
        let line = serde_json::to_string(&record)?;
        // contains_key guard above guarantees presence.
        if let Some(writer) = self.writers.get_mut(&eco) {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }

        *self.counts.entry(eco).or_insert(0) += 1;
        self.total += 1;
        if self.total % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                total = self.total,
                codes = self.counts.len(),
                "partitioning progress"
            );
        }

        Ok(self.config.limit.is_none_or(|limit| self.total < limit))
    }

    /// Flushes every open file and reports the run summary.
    pub async fn finish(mut self) -> Result<PartitionSummary, StreamError> {
        for writer in self.writers.values_mut() {
            writer.flush().await?;
        }
        let largest = self
            .counts
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(eco, count)| (eco.clone(), *count));
        Ok(PartitionSummary {
            files: self.counts.len(),
            total: self.total,
            largest,
            elapsed: self.started.elapsed(),
        })
    }
}
