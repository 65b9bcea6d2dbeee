//! In-process position evaluation.
//!
//! A shallow material negamax over `shakmaty` positions. This is the
//! evaluator behind [`PoolEngine`](crate::PoolEngine); it trades strength
//! for being embeddable and dependency-free, which is enough to surface
//! the large swings the miner looks for.

use crate::EngineError;
use puzzle_core::{EvalResult, MATE_CEILING};
use shakmaty::fen::Fen;
use shakmaty::{Board, CastlingMode, Chess, Color, Position, Role};

/// Depth ceiling for the in-process search. Deeper requests are clamped;
/// the material evaluation gains nothing past a few plies.
pub const MAX_SEARCH_DEPTH: u32 = 3;

const PIECE_VALUES: [(Role, i32); 5] = [
    (Role::Pawn, 100),
    (Role::Knight, 300),
    (Role::Bishop, 300),
    (Role::Rook, 500),
    (Role::Queen, 900),
];

/// Evaluates a FEN position at the requested depth.
///
/// The score is in centipawns from the side to move's perspective, with
/// mate distances remapped near [`MATE_CEILING`] like a UCI engine's
/// `score mate` output. The best move is returned in UCI notation, empty
/// when the position has no legal moves.
pub fn evaluate(fen: &str, depth: u32) -> Result<EvalResult, EngineError> {
    let parsed: Fen = fen
        .parse()
        .map_err(|_| EngineError::InvalidPosition(fen.to_string()))?;
    let pos: Chess = parsed
        .into_position(CastlingMode::Standard)
        .map_err(|_| EngineError::InvalidPosition(fen.to_string()))?;

    let depth = depth.clamp(1, MAX_SEARCH_DEPTH);

    let mut best_score = -MATE_CEILING;
    let mut best_move = String::new();
    for m in pos.legal_moves() {
        let mut child = pos.clone();
        child.play_unchecked(m);
        let score = -negamax(&child, depth - 1, 1);
        if score > best_score || best_move.is_empty() {
            best_score = score;
            best_move = m.to_uci(CastlingMode::Standard).to_string();
        }
    }

    if best_move.is_empty() {
        // No legal moves: mated or stalemated right where we stand.
        best_score = terminal_score(&pos, 0);
    }

    Ok(EvalResult::new(best_score, best_move))
}

fn negamax(pos: &Chess, depth: u32, ply: u32) -> i32 {
    let moves = pos.legal_moves();
    if moves.is_empty() {
        return terminal_score(pos, ply);
    }
    if pos.is_insufficient_material() {
        return 0;
    }
    if depth == 0 {
        return material_balance(pos);
    }

    let mut best = -MATE_CEILING;
    for m in moves {
        let mut child = pos.clone();
        child.play_unchecked(m);
        best = best.max(-negamax(&child, depth - 1, ply + 1));
    }
    best
}

/// Score for a position with no legal moves: mated side sees a mate
/// distance, stalemate is dead level.
fn terminal_score(pos: &Chess, ply: u32) -> i32 {
    if pos.is_checkmate() {
        -(MATE_CEILING - ply as i32)
    } else {
        0
    }
}

fn material_balance(pos: &Chess) -> i32 {
    let board = pos.board();
    side_material(board, pos.turn()) - side_material(board, !pos.turn())
}

fn side_material(board: &Board, color: Color) -> i32 {
    let mine = board.by_color(color);
    PIECE_VALUES
        .iter()
        .map(|&(role, value)| (mine & board.by_role(role)).count() as i32 * value)
        .sum()
}
