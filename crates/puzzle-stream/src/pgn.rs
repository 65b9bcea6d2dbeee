//! Incremental PGN parsing.
//!
//! Games are assembled line by line: input accumulates in a buffer until
//! a blank-line boundary, at which point a full-game parse is attempted.
//! A failed attempt is an expected signal that more input is needed, not
//! an error; the buffer simply keeps growing. At end of input the buffer
//! is flushed through one final attempt, and trailing data that still
//! does not parse is dropped.

use crate::StreamError;
use puzzle_core::GameRecord;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// Game termination markers; a movetext section without one is still
/// incomplete.
const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r#"^\[(\w+)\s+"(.*)"\]\s*$"#).expect("valid tag regex"))
}

/// Why a buffered fragment failed to parse as a complete game.
#[derive(Debug, PartialEq, Eq)]
enum ParseFailure {
    /// Nothing but whitespace so far.
    Empty,
    /// Movetext has not reached a result marker yet.
    MissingResult,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty fragment"),
            Self::MissingResult => write!(f, "movetext has no result marker"),
        }
    }
}

/// A lazy, non-restartable stream of [`GameRecord`]s parsed from PGN
/// text.
pub struct PgnStream<R> {
    lines: Lines<R>,
    buffer: String,
    exhausted: bool,
}

impl<R: AsyncBufRead + Unpin> PgnStream<R> {
    /// Wraps a buffered reader producing PGN text.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            buffer: String::new(),
            exhausted: false,
        }
    }

    /// Produces the next complete game, or `None` at end of input.
    ///
    /// Only I/O failures surface as errors. Parse failures on partial
    /// input keep buffering; unparseable trailing data at end of stream
    /// is dropped with a debug trace.
    pub async fn next_game(&mut self) -> Result<Option<GameRecord>, StreamError> {
        if self.exhausted {
            return Ok(None);
        }
        loop {
            let Some(line) = self.lines.next_line().await? else {
                self.exhausted = true;
                let tail = std::mem::take(&mut self.buffer);
                match parse_game(&tail) {
                    Ok(game) => return Ok(Some(game)),
                    Err(ParseFailure::Empty) => return Ok(None),
                    Err(failure) => {
                        tracing::debug!(%failure, "dropping unparseable trailing data");
                        return Ok(None);
                    }
                }
            };

            self.buffer.push_str(&line);
            self.buffer.push('\n');

            if line.trim().is_empty() {
                match parse_game(&self.buffer) {
                    Ok(game) => {
                        self.buffer.clear();
                        return Ok(Some(game));
                    }
                    // Incomplete: keep buffering until the next boundary.
                    Err(_) => continue,
                }
            }
        }
    }
}

/// Attempts to parse one complete game from a buffered fragment.
fn parse_game(fragment: &str) -> Result<GameRecord, ParseFailure> {
    if fragment.trim().is_empty() {
        return Err(ParseFailure::Empty);
    }

    let mut headers = BTreeMap::new();
    let mut movetext = String::new();
    for line in fragment.lines() {
        if let Some(captures) = tag_pattern().captures(line) {
            headers.insert(captures[1].to_string(), captures[2].to_string());
        } else {
            movetext.push_str(line);
            movetext.push('\n');
        }
    }

    let moves = parse_movetext(&movetext)?;
    Ok(GameRecord::new(headers, moves))
}

/// Tokenizes a movetext section into bare move tokens, requiring a
/// terminal result marker.
fn parse_movetext(movetext: &str) -> Result<Vec<String>, ParseFailure> {
    let clean = strip_annotations(movetext);
    let mut moves = Vec::new();
    let mut terminated = false;
    for token in clean.split_whitespace() {
        if RESULT_TOKENS.contains(&token) {
            terminated = true;
            break;
        }
        // Move numbers ("1.", "3...") and NAGs ("$2") are not moves.
        if token.ends_with('.') || token.contains("...") || token.starts_with('$') {
            continue;
        }
        let bare = token.trim_end_matches(['!', '?']);
        if !bare.is_empty() {
            moves.push(bare.to_string());
        }
    }

    if terminated {
        Ok(moves)
    } else {
        Err(ParseFailure::MissingResult)
    }
}

/// Removes `{...}` comments and `(...)` variations, tracking nesting.
fn strip_annotations(movetext: &str) -> String {
    let mut out = String::with_capacity(movetext.len());
    let mut comment_depth = 0usize;
    let mut variation_depth = 0usize;
    for c in movetext.chars() {
        match c {
            '{' => comment_depth += 1,
            '}' => comment_depth = comment_depth.saturating_sub(1),
            '(' if comment_depth == 0 => variation_depth += 1,
            ')' if comment_depth == 0 => variation_depth = variation_depth.saturating_sub(1),
            _ if comment_depth == 0 && variation_depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const GAME: &str = "[Event \"Casual\"]\n[ECO \"C20\"]\n\n1. e4 e5 2. Nf3 1-0\n\n";

    async fn collect(pgn: &str) -> Vec<GameRecord> {
        let mut stream = PgnStream::new(Cursor::new(pgn.as_bytes().to_vec()));
        let mut games = Vec::new();
        while let Some(game) = stream.next_game().await.unwrap() {
            games.push(game);
        }
        games
    }

    #[tokio::test]
    async fn test_single_game() {
        let games = collect(GAME).await;
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].eco(), Some("C20"));
        assert_eq!(games[0].moves, vec!["e4", "e5", "Nf3"]);
    }

    #[tokio::test]
    async fn test_header_boundary_keeps_buffering() {
        // The blank line after the tag section triggers a parse attempt
        // that must fail quietly; the game only completes at the second
        // boundary, after the movetext.
        let games = collect(GAME).await;
        assert_eq!(games.len(), 1);
    }

    #[tokio::test]
    async fn test_multiple_games() {
        let pgn = format!("{}[Event \"Second\"]\n\n1. d4 d5 1/2-1/2\n\n", GAME);
        let games = collect(&pgn).await;
        assert_eq!(games.len(), 2);
        assert_eq!(games[1].moves, vec!["d4", "d5"]);
    }

    #[tokio::test]
    async fn test_flush_at_end_of_input_without_trailing_blank() {
        let pgn = "[Event \"X\"]\n\n1. e4 e5 0-1";
        let games = collect(pgn).await;
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].moves, vec!["e4", "e5"]);
    }

    #[tokio::test]
    async fn test_malformed_trailing_data_dropped() {
        let pgn = format!("{}[Event \"Truncated\"]\n\n1. e4 e5", GAME);
        let games = collect(&pgn).await;
        assert_eq!(games.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_input() {
        assert!(collect("").await.is_empty());
        assert!(collect("\n\n\n").await.is_empty());
    }

    #[tokio::test]
    async fn test_comments_variations_and_nags_stripped() {
        let pgn = "[Event \"X\"]\n\n1. e4 {best by test} e5 (1... c5 2. Nf3) 2. Nf3! $2 Nc6?? 1-0\n\n";
        let games = collect(pgn).await;
        assert_eq!(games[0].moves, vec!["e4", "e5", "Nf3", "Nc6"]);
    }

    #[tokio::test]
    async fn test_multiline_comment_spans_boundary() {
        let pgn = "[Event \"X\"]\n\n1. e4 {a comment\n\nwith blank lines} e5 *\n\n";
        let games = collect(pgn).await;
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].moves, vec!["e4", "e5"]);
    }

    #[test]
    fn test_parse_movetext_requires_result() {
        assert_eq!(
            parse_movetext("1. e4 e5"),
            Err(ParseFailure::MissingResult)
        );
        assert_eq!(parse_movetext("1. e4 e5 *"), Ok(vec!["e4".to_string(), "e5".to_string()]));
    }

    #[test]
    fn test_game_with_no_moves() {
        let game = parse_game("[Event \"Forfeit\"]\n\n*\n").unwrap();
        assert!(game.moves.is_empty());
        assert_eq!(game.header("Event"), Some("Forfeit"));
    }
}
