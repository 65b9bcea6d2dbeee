//! Move application against the rules component.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{Chess, EnPassantMode, Position};

/// Applies one SAN token to the position.
pub(crate) fn apply_san(pos: &mut Chess, token: &str) -> Result<(), ()> {
    let san: SanPlus = token.parse().map_err(|_| ())?;
    let m = san.san.to_move(pos).map_err(|_| ())?;
    pos.play_unchecked(m);
    Ok(())
}

/// FEN of the current position.
pub(crate) fn fen_of(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}
