//! UCI subprocess engine.
//!
//! Spawns a single long-lived UCI engine (e.g. Stockfish) and talks the
//! line-oriented protocol over its stdin/stdout. Those pipes are owned
//! exclusively here; access is serialized so only one evaluation is in
//! flight at a time.

use crate::{Engine, EngineError};
use async_trait::async_trait;
use puzzle_core::{mate_score, EvalResult};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

/// Maximum number of lines to read before giving up on a UCI response.
pub const MAX_UCI_LINES: usize = 10_000;

struct UciSession {
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
}

impl UciSession {
    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        self.stdin.write_all(cmd.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, EngineError> {
        match self.lines.next_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(EngineError::Closed),
        }
    }

    /// `uci` → `uciok` handshake, capturing the engine name, followed by
    /// `isready` → `readyok`. The engine accepts no evaluation requests
    /// before this completes.
    async fn handshake(&mut self) -> Result<String, EngineError> {
        self.send("uci").await?;
        let mut name = String::new();
        for _ in 0..MAX_UCI_LINES {
            let line = self.read_line().await?;
            if let Some(rest) = line.strip_prefix("id name ") {
                name = rest.to_string();
            }
            if line == "uciok" {
                self.send("isready").await?;
                for _ in 0..MAX_UCI_LINES {
                    if self.read_line().await? == "readyok" {
                        return Ok(name);
                    }
                }
                return Err(EngineError::InitFailed);
            }
        }
        Err(EngineError::InitFailed)
    }

    /// Drives one `go depth N` search to its terminal `bestmove` line,
    /// keeping the last score seen on the way.
    async fn run_search(&mut self, depth: u32) -> Result<EvalResult, EngineError> {
        self.send(&format!("go depth {}", depth)).await?;

        let mut score = 0;
        for _ in 0..MAX_UCI_LINES {
            let line = self.read_line().await?;
            if line.contains("upperbound") || line.contains("lowerbound") {
                continue;
            }
            if let Some(s) = parse_score(&line) {
                score = s;
            }
            if let Some(rest) = line.strip_prefix("bestmove") {
                // Terminal positions report "bestmove (none)".
                let best = match rest.split_whitespace().next() {
                    Some("(none)") | None => String::new(),
                    Some(token) => token.to_string(),
                };
                return Ok(EvalResult::new(score, best));
            }
        }
        Err(EngineError::InvalidResponse(
            "no bestmove before line limit".to_string(),
        ))
    }
}

/// Extracts a `score (cp|mate) <value>` token from a UCI info line,
/// remapping mate distances to the centipawn-comparable encoding.
fn parse_score(line: &str) -> Option<i32> {
    let mut parts = line.split_whitespace();
    while let Some(word) = parts.next() {
        if word != "score" {
            continue;
        }
        let kind = parts.next()?;
        let value: i32 = parts.next()?.parse().ok()?;
        return match kind {
            "cp" => Some(value),
            "mate" => Some(mate_score(value)),
            _ => None,
        };
    }
    None
}

/// An [`Engine`] backed by a persistent UCI subprocess.
pub struct UciEngine {
    session: Mutex<UciSession>,
    name: String,
}

impl UciEngine {
    /// Spawns the engine, performs the UCI handshake, and configures its
    /// thread count.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Spawn`] if the executable cannot be
    /// started (typically not installed) and [`EngineError::InitFailed`]
    /// if the handshake does not complete.
    pub async fn spawn(path: &str, threads: usize) -> Result<Self, EngineError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take().ok_or(EngineError::InitFailed)?;
        let stdout = child.stdout.take().ok_or(EngineError::InitFailed)?;

        let mut session = UciSession {
            child,
            stdin,
            lines: BufReader::new(stdout).lines(),
        };

        let name = session.handshake().await?;
        session
            .send(&format!("setoption name Threads value {}", threads))
            .await?;
        tracing::info!(engine = %name, threads, "UCI engine ready");

        Ok(Self {
            session: Mutex::new(session),
            name,
        })
    }

    /// The engine's name as reported during the handshake.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl Engine for UciEngine {
    async fn evaluate(&self, fen: &str, depth: u32) -> Result<EvalResult, EngineError> {
        // One request in flight system-wide: the session lock is the
        // serialization point.
        let mut session = self.session.lock().await;
        session.send("ucinewgame").await?;
        session.send(&format!("position fen {}", fen)).await?;
        session.run_search(depth).await
    }

    async fn shutdown(&self) {
        let mut session = self.session.lock().await;
        let _ = session.send("quit").await;
        let _ = session.child.kill().await;
    }
}
