//! Line-delimited JSON game streams.

use crate::StreamError;
use puzzle_core::EvaluatedGame;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// A lazy stream of pre-evaluated games, one JSON object per line.
///
/// Blank lines are skipped; a malformed line is a hard error, unlike the
/// PGN stream's buffering, because NDJSON lines are self-delimiting.
pub struct NdjsonStream<R> {
    lines: Lines<R>,
    limit: Option<usize>,
    yielded: usize,
}

impl<R: AsyncBufRead + Unpin> NdjsonStream<R> {
    /// Wraps a buffered reader producing NDJSON games.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            limit: None,
            yielded: 0,
        }
    }

    /// Caps the stream at `max_games` records.
    pub fn with_limit(reader: R, max_games: usize) -> Self {
        Self {
            lines: reader.lines(),
            limit: Some(max_games),
            yielded: 0,
        }
    }

    /// Produces the next game, or `None` at end of input or once the cap
    /// is reached.
    pub async fn next_game(&mut self) -> Result<Option<EvaluatedGame>, StreamError> {
        if self.limit.is_some_and(|max| self.yielded >= max) {
            return Ok(None);
        }
        loop {
            match self.lines.next_line().await? {
                None => return Ok(None),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => {
                    let game: EvaluatedGame = serde_json::from_str(&line)?;
                    self.yielded += 1;
                    return Ok(Some(game));
                }
            }
        }
    }
}
