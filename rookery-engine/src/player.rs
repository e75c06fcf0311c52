//! Players and how they pick their moves.

use rand::Rng;

use crate::coretypes::{PieceKind, Side};
use crate::error;
use crate::movegen;
use crate::pieces::{MoveTemplate, PieceId, TemplateList};
use crate::position::Position;

/// One side of a game.
/// Owns nothing itself: `pieces` and `captured` refer into the Position's arena.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Player {
    pub(crate) side: Side,
    pub(crate) in_check: bool,
    pub(crate) pieces: Vec<PieceId>,
    pub(crate) captured: Vec<PieceId>,
}

/// How a player picks a move when none is supplied from outside.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Strategy {
    /// Uniformly random piece among those that can move, then a uniformly
    /// random move of that piece.
    #[default]
    UniformRandom,
}

impl Player {
    pub(crate) fn new(side: Side) -> Self {
        Self {
            side,
            in_check: false,
            pieces: Vec::new(),
            captured: Vec::new(),
        }
    }

    // Immutable Getters
    pub fn side(&self) -> Side {
        self.side
    }
    pub fn in_check(&self) -> bool {
        self.in_check
    }
    pub fn pieces(&self) -> &[PieceId] {
        &self.pieces
    }
    pub fn captured(&self) -> &[PieceId] {
        &self.captured
    }

    /// This player's king, if it has one.
    pub fn king(&self, position: &Position) -> Option<PieceId> {
        self.pieces
            .iter()
            .copied()
            .find(|&id| position[id].kind() == PieceKind::King)
    }

    /// Total material value of the opposing pieces this player captured.
    pub fn captured_value(&self, position: &Position) -> u32 {
        self.captured.iter().map(|&id| position[id].value()).sum()
    }
}

/// Every piece of side with at least one legal move, paired with those moves.
pub fn legal_moves(
    position: &mut Position,
    side: Side,
) -> error::Result<Vec<(PieceId, TemplateList)>> {
    player_moves(position, side, true)
}

// Also used by check detection with check safety disabled.
pub(crate) fn player_moves(
    position: &mut Position,
    side: Side,
    enforce_check_safety: bool,
) -> error::Result<Vec<(PieceId, TemplateList)>> {
    let pieces = position.player(side).pieces().to_vec();
    let mut moves = Vec::with_capacity(pieces.len());
    for id in pieces {
        let piece_moves = movegen::legal_moves_with(position, id, enforce_check_safety)?;
        if !piece_moves.is_empty() {
            moves.push((id, piece_moves));
        }
    }
    Ok(moves)
}

/// Picks a move for side following strategy.
/// Returns None when side has no legal move at all.
pub fn choose_move<R: Rng + ?Sized>(
    position: &mut Position,
    side: Side,
    strategy: Strategy,
    rng: &mut R,
) -> error::Result<Option<(PieceId, MoveTemplate)>> {
    let moves = legal_moves(position, side)?;
    if moves.is_empty() {
        return Ok(None);
    }

    match strategy {
        Strategy::UniformRandom => {
            let (id, templates) = &moves[rng.gen_range(0..moves.len())];
            let template = templates[rng.gen_range(0..templates.len())];
            Ok(Some((*id, template)))
        }
    }
}

/// Relocates a piece by a template and marks it as moved.
/// Captures, castling rooks and the rest of a turn are the Game's business.
pub fn apply_move(
    position: &mut Position,
    id: PieceId,
    template: MoveTemplate,
) -> error::Result<()> {
    let origin = position[id].coordinate();
    let to = template
        .destination(origin)
        .ok_or_else(|| error::Error::from((error::ErrorKind::NoSuchMove, template)))?;
    position.relocate(id, to);
    position.set_moved(id, true);
    Ok(())
}
