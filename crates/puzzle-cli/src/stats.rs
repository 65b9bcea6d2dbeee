//! The `stats` subcommand: partition directory report.

use anyhow::Context;
use std::path::Path;

pub async fn run(dir: &Path) -> anyhow::Result<()> {
    let counts = collect(dir).await?;
    let total: u64 = counts.iter().map(|(_, count)| count).sum();

    for (eco, count) in &counts {
        println!("{:<10} {:>10}", eco, count);
    }
    println!("{:<10} {:>10}", "total", total);
    Ok(())
}

/// Counts games per `.ndjson` partition file, largest first.
async fn collect(dir: &Path) -> anyhow::Result<Vec<(String, u64)>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read '{}'", dir.display()))?;

    let mut counts = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("ndjson") {
            continue;
        }
        let Some(eco) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let contents = tokio::fs::read_to_string(&path).await?;
        let games = contents.lines().filter(|l| !l.trim().is_empty()).count() as u64;
        counts.push((eco.to_string(), games));
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_sorted_by_size() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A00.ndjson"), "{}\n{}\n").unwrap();
        std::fs::write(dir.path().join("B01.ndjson"), "{}\n{}\n{}\n").unwrap();
        std::fs::write(dir.path().join("C20.ndjson"), "{}\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored\n").unwrap();

        let counts = collect(dir.path()).await.unwrap();
        assert_eq!(
            counts,
            vec![
                ("B01".to_string(), 3),
                ("A00".to_string(), 2),
                ("C20".to_string(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_ties_break_by_code() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("B01.ndjson"), "{}\n").unwrap();
        std::fs::write(dir.path().join("A00.ndjson"), "{}\n").unwrap();

        let counts = collect(dir.path()).await.unwrap();
        assert_eq!(counts[0].0, "A00");
        assert_eq!(counts[1].0, "B01");
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        assert!(collect(Path::new("/no/such/dir")).await.is_err());
    }
}
