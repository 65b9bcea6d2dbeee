//! Mining pre-evaluated games for large swings.

use crate::san::{apply_san, fen_of};
use puzzle_core::{puzzle_fingerprint, EvaluatedGame, PuzzleCandidate, PuzzleSource, SideToMove};
use shakmaty::{Chess, Color, Position};
use thiserror::Error;

/// Minimum absolute swing (in centipawns) that qualifies as a mined
/// mistake.
pub const MINE_SWING: i32 = 200;

/// Errors that can occur while mining a single game.
#[derive(Error, Debug)]
pub enum MineError {
    /// The rules component rejected a move while replaying the game.
    #[error("Illegal move '{token}' at ply {ply} of game {game}")]
    IllegalMove {
        token: String,
        ply: usize,
        game: String,
    },
}

/// Scans one pre-evaluated game for its first large swing.
///
/// Games whose opening code does not exactly match `eco`, or that carry
/// no evaluation trace, yield nothing. The trace and the move list are
/// walked in lockstep over their overlapping prefix, starting against a
/// synthetic zero baseline; the first ply past the first whose swing
/// reaches [`MINE_SWING`] produces the game's single candidate: the
/// position *before* the triggering move, the move itself, and the side
/// to move at that point.
pub fn mine_game(game: &EvaluatedGame, eco: &str) -> Result<Option<PuzzleCandidate>, MineError> {
    let Some(opening) = &game.opening else {
        return Ok(None);
    };
    if opening.eco != eco {
        return Ok(None);
    }
    let Some(evals) = &game.evals else {
        return Ok(None);
    };

    let mut pos = Chess::default();
    let mut prev_eval = 0i32;

    for (ply, (token, &eval)) in game.move_tokens().iter().zip(evals.iter()).enumerate() {
        // Saturating: trace values come from an untrusted corpus and may
        // sit at the i32 extremes.
        if ply > 0 && eval.saturating_sub(prev_eval).saturating_abs() >= MINE_SWING {
            let fen = fen_of(&pos);
            let side = if pos.turn() == Color::White {
                SideToMove::White
            } else {
                SideToMove::Black
            };
            return Ok(Some(PuzzleCandidate {
                id: puzzle_fingerprint(&fen, token),
                fen,
                best: token.to_string(),
                side,
                eco: opening.eco.clone(),
                opening: opening.name.clone(),
                eval_before: prev_eval,
                eval_after: eval,
                tags: Vec::new(),
                src: PuzzleSource {
                    game: game.id.clone(),
                    ply,
                },
            }));
        }
        apply_san(&mut pos, token).map_err(|_| MineError::IllegalMove {
            token: token.to_string(),
            ply,
            game: game.id.clone(),
        })?;
        prev_eval = eval;
    }

    Ok(None)
}
