//! Pack assembly: the on-disk directory artifact produced by `make`.

use anyhow::Context;
use chrono::Utc;
use puzzle_core::PuzzleCandidate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Pack format revision, encoded in the directory name and metadata.
const PACK_VERSION: &str = "v1";

const LICENSE_TEXT: &str = "\
CC0 1.0 Universal

The puzzles in this pack are derived from publicly available game data
and are dedicated to the public domain. To the extent possible under
law, the authors waive all copyright and related rights to this work.
";

#[derive(Serialize)]
struct PackMeta<'a> {
    eco: &'a str,
    version: &'a str,
    puzzles: usize,
    build: String,
}

/// Writes a `pack_<eco>_<version>/` directory under `out` containing the
/// metadata file, the puzzle lines, and the license.
pub async fn write_pack(
    out: &Path,
    eco: &str,
    puzzles: &[PuzzleCandidate],
) -> anyhow::Result<PathBuf> {
    let dir = out.join(format!("pack_{}_{}", eco, PACK_VERSION));
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create '{}'", dir.display()))?;

    let meta = PackMeta {
        eco,
        version: PACK_VERSION,
        puzzles: puzzles.len(),
        build: Utc::now().to_rfc3339(),
    };
    tokio::fs::write(dir.join("pack_meta.json"), serde_json::to_vec_pretty(&meta)?).await?;

    let mut lines = String::new();
    for puzzle in puzzles {
        lines.push_str(&serde_json::to_string(puzzle)?);
        lines.push('\n');
    }
    tokio::fs::write(dir.join("puzzles.ndjson"), lines).await?;
    tokio::fs::write(dir.join("LICENSE.txt"), LICENSE_TEXT).await?;

    Ok(dir)
}

/// Fetches a board image of the first puzzle as `cover.png`.
///
/// The cover is decoration; any failure is logged and the pack stays
/// valid without it.
pub async fn fetch_cover(dir: &Path, puzzles: &[PuzzleCandidate]) {
    let Some(first) = puzzles.first() else {
        return;
    };
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::debug!(error = %e, "cover image skipped");
            return;
        }
    };
    let response = client
        .get("https://lichess1.org/export/fen.png")
        .query(&[("fen", first.fen.as_str())])
        .send()
        .await;
    match response {
        Ok(response) if response.status().is_success() => match response.bytes().await {
            Ok(bytes) => {
                if let Err(e) = tokio::fs::write(dir.join("cover.png"), &bytes).await {
                    tracing::debug!(error = %e, "cover image skipped");
                }
            }
            Err(e) => tracing::debug!(error = %e, "cover image skipped"),
        },
        Ok(response) => {
            tracing::debug!(status = %response.status(), "cover image skipped");
        }
        Err(e) => tracing::debug!(error = %e, "cover image skipped"),
    }
}
