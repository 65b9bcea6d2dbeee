//! Live engine annotation of games.

use crate::san::{apply_san, fen_of};
use chrono::Utc;
use puzzle_core::{
    game_fingerprint, is_decided, AnnotatedGame, AnnotatedOpening, AnnotationEntry, GameRecord,
    Judgment, JudgmentKind,
};
use puzzle_engine::{Engine, EngineError};
use shakmaty::Chess;
use std::collections::BTreeMap;
use thiserror::Error;

/// Hard cap on analyzed plies; deeper play is not evaluated.
pub const MAX_ANALYZED_PLIES: usize = 40;

/// Errors that can occur while annotating a single game.
#[derive(Error, Debug)]
pub enum AnnotateError {
    /// Error from the evaluation engine.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    /// The rules component rejected a move from the record.
    #[error("Illegal move '{token}' at ply {ply}")]
    IllegalMove { token: String, ply: usize },
}

/// Walks a game's moves against an evaluation engine, looking for the
/// first qualifying evaluation swing.
///
/// The annotator is engine-agnostic: it sees only the [`Engine`]
/// capability, never which variant is behind it. Evaluation calls within
/// one game are strictly sequential since each ply's position depends on
/// applying the previous move.
pub struct GameAnnotator<'e> {
    engine: &'e dyn Engine,
    depth: u32,
}

impl<'e> GameAnnotator<'e> {
    /// Creates an annotator searching to `depth` on each ply.
    pub fn new(engine: &'e dyn Engine, depth: u32) -> Self {
        Self { engine, depth }
    }

    /// Annotates one game.
    ///
    /// Evaluates the starting position, then each ply up to
    /// [`MAX_ANALYZED_PLIES`]. The first swing of at least 15 centipawns
    /// past the first ply earns a judgment and terminates analysis; once
    /// either adjacent evaluation reaches the mate ceiling, analysis
    /// also stops (the position is already decided). Returns `None` when
    /// no ply was judged.
    pub async fn annotate(
        &self,
        game: &GameRecord,
    ) -> Result<Option<AnnotatedGame>, AnnotateError> {
        let mut pos = Chess::default();
        let mut analysis: Vec<AnnotationEntry> = Vec::new();
        let mut judged = false;

        let mut prev = self.engine.evaluate(&fen_of(&pos), self.depth).await?;

        for (ply, token) in game.moves.iter().take(MAX_ANALYZED_PLIES).enumerate() {
            apply_san(&mut pos, token).map_err(|_| AnnotateError::IllegalMove {
                token: token.clone(),
                ply,
            })?;
            let cur = self.engine.evaluate(&fen_of(&pos), self.depth).await?;

            let mut entry = AnnotationEntry {
                eval: cur.score,
                best: cur.best_move.clone(),
                judgment: None,
            };

            let swing = prev.score.saturating_sub(cur.score).saturating_abs();
            // Never judge the first ply: there is no prior context and
            // the comparison against the opening evaluation is noise.
            if ply > 0 {
                if let Some(kind) = JudgmentKind::from_swing(swing) {
                    entry.judgment = Some(Judgment::new(kind, &cur.best_move));
                    analysis.push(entry);
                    judged = true;
                    break;
                }
            }
            analysis.push(entry);

            if is_decided(cur.score) || is_decided(prev.score) {
                break;
            }
            prev = cur;
        }

        if !judged {
            return Ok(None);
        }

        Ok(Some(AnnotatedGame {
            id: game_fingerprint(game),
            created_at: created_at_millis(&game.headers),
            opening: AnnotatedOpening {
                eco: game.header("ECO").map(str::to_string),
                name: game.header("Opening").map(str::to_string),
                variation: game.header("Variation").map(str::to_string),
            },
            moves: game.moves.join(" "),
            analysis,
        }))
    }
}

/// Derives a timestamp from the game's date and time headers, falling
/// back to now for absent or unparseable values (e.g. `????.??.??`).
fn created_at_millis(headers: &BTreeMap<String, String>) -> i64 {
    let date = headers
        .get("UTCDate")
        .or_else(|| headers.get("Date"))
        .map(String::as_str)
        .unwrap_or("");
    let time = headers
        .get("UTCTime")
        .or_else(|| headers.get("Time"))
        .map(String::as_str)
        .unwrap_or("00:00:00");

    let stamp = format!("{}T{}", date.replace('.', "-"), time.replace('.', ":"));
    chrono::NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%dT%H:%M:%S")
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_else(|_| Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use puzzle_core::EvalResult;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Engine returning a scripted sequence of scores, then zeros.
    struct ScriptedEngine {
        scores: Mutex<VecDeque<i32>>,
        calls: AtomicUsize,
    }

    impl ScriptedEngine {
        fn new(scores: &[i32]) -> Self {
            Self {
                scores: Mutex::new(scores.iter().copied().collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Engine for ScriptedEngine {
        async fn evaluate(&self, _fen: &str, _depth: u32) -> Result<EvalResult, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let score = self.scores.lock().unwrap().pop_front().unwrap_or(0);
            Ok(EvalResult::new(score, "e2e4"))
        }

        async fn shutdown(&self) {}
    }

    fn game(moves: &[&str]) -> GameRecord {
        let mut headers = BTreeMap::new();
        headers.insert("ECO".to_string(), "C20".to_string());
        headers.insert("Opening".to_string(), "King's Pawn".to_string());
        GameRecord::new(headers, moves.iter().map(|m| m.to_string()).collect())
    }

    /// Legal filler: knights shuffling out and back.
    fn shuffle_moves(plies: usize) -> Vec<&'static str> {
        ["Nf3", "Nf6", "Ng1", "Ng8"]
            .into_iter()
            .cycle()
            .take(plies)
            .collect()
    }

    #[tokio::test]
    async fn test_swing_at_second_ply_is_judged() {
        // start=0, after e4=0, after e5=-120: blunder on ply 1.
        let engine = ScriptedEngine::new(&[0, 0, -120]);
        let annotator = GameAnnotator::new(&engine, 8);
        let result = annotator.annotate(&game(&["e4", "e5", "Nf3"])).await.unwrap();

        let annotated = result.expect("swing should yield a puzzle");
        assert_eq!(annotated.analysis.len(), 2);
        let judgment = annotated.analysis[1].judgment.as_ref().unwrap();
        assert_eq!(judgment.name, JudgmentKind::Blunder);
        assert_eq!(judgment.comment, "Blunder. e2e4 was best.");
        assert_eq!(annotated.moves, "e4 e5 Nf3");
        assert_eq!(annotated.opening.eco.as_deref(), Some("C20"));
    }

    #[tokio::test]
    async fn test_classification_boundaries() {
        for (swing, expected) in [
            (15, Some(JudgmentKind::Inaccuracy)),
            (50, Some(JudgmentKind::Mistake)),
            (100, Some(JudgmentKind::Blunder)),
            (14, None),
        ] {
            let engine = ScriptedEngine::new(&[0, 0, -swing]);
            let annotator = GameAnnotator::new(&engine, 8);
            let result = annotator.annotate(&game(&["e4", "e5"])).await.unwrap();
            match expected {
                Some(kind) => {
                    let annotated = result.expect("swing should be judged");
                    assert_eq!(annotated.analysis[1].judgment.as_ref().unwrap().name, kind);
                }
                None => assert!(result.is_none(), "swing {} must not be judged", swing),
            }
        }
    }

    #[tokio::test]
    async fn test_first_ply_guard() {
        // A huge swing on ply 0 is never judged.
        let engine = ScriptedEngine::new(&[0, 500, 500]);
        let annotator = GameAnnotator::new(&engine, 8);
        let result = annotator.annotate(&game(&["e4", "e5"])).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_ply_cap_enforced() {
        // Level for 41 evaluations (start + 40 plies); a spike afterwards
        // would qualify, but lies beyond the cap.
        let mut scores = vec![0; 41];
        scores.push(500);
        let engine = ScriptedEngine::new(&scores);
        let annotator = GameAnnotator::new(&engine, 8);
        let result = annotator.annotate(&game(&shuffle_moves(52))).await.unwrap();
        assert!(result.is_none());
        assert_eq!(engine.calls(), 41);
    }

    #[tokio::test]
    async fn test_mate_ceiling_stops_analysis() {
        // Decided after the first ply; the remaining moves are never
        // evaluated and no judgment is produced.
        let engine = ScriptedEngine::new(&[0, 30_000, 0, 0]);
        let annotator = GameAnnotator::new(&engine, 8);
        let result = annotator
            .annotate(&game(&shuffle_moves(8)))
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(engine.calls(), 2);
    }

    #[tokio::test]
    async fn test_id_deterministic_across_runs() {
        let record = game(&["e4", "e5"]);
        let mut ids = Vec::new();
        for _ in 0..2 {
            let engine = ScriptedEngine::new(&[0, 0, -200]);
            let annotator = GameAnnotator::new(&engine, 8);
            let annotated = annotator.annotate(&record).await.unwrap().unwrap();
            ids.push(annotated.id);
        }
        assert_eq!(ids[0], ids[1]);
    }

    #[tokio::test]
    async fn test_illegal_move_surfaces() {
        let engine = ScriptedEngine::new(&[0]);
        let annotator = GameAnnotator::new(&engine, 8);
        let result = annotator.annotate(&game(&["e4", "Ra5"])).await;
        assert!(matches!(
            result,
            Err(AnnotateError::IllegalMove { ply: 1, .. })
        ));
    }

    #[test]
    fn test_created_at_from_headers() {
        let mut headers = BTreeMap::new();
        headers.insert("UTCDate".to_string(), "2024.03.01".to_string());
        headers.insert("UTCTime".to_string(), "12:30:00".to_string());
        assert_eq!(created_at_millis(&headers), 1_709_296_200_000);
    }

    #[test]
    fn test_created_at_falls_back_to_now() {
        let mut headers = BTreeMap::new();
        headers.insert("Date".to_string(), "????.??.??".to_string());
        let before = Utc::now().timestamp_millis();
        let millis = created_at_millis(&headers);
        assert!(millis >= before);
    }
}
