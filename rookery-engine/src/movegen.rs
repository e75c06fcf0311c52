//! Legal move generation.
//!
//! A template is legal for a piece when every one of its conditions holds,
//! the castling preconditions hold for castling templates, and, when check
//! safety is enforced, playing it does not leave the mover's own king attacked.
//! The last part is answered by playing the move on the real Position inside a
//! `Simulation`, which reverts it on drop.

use log::trace;

use crate::check;
use crate::coretypes::{CastlingSide, Coordinate, Offset, PieceKind, KING_FILE};
use crate::error;
use crate::pieces::{
    theoretical_moves, Condition, MoveTemplate, Piece, PieceId, TemplateList, MAX_TEMPLATES,
};
use crate::position::{Captures, Position};

/// Lazily yields the legal templates of one piece.
/// Each call to `next` may simulate a move, so the iterator holds the
/// Position mutably and cannot be restarted.
pub struct LegalMoves<'a> {
    position: &'a mut Position,
    id: Option<PieceId>,
    origin: Coordinate,
    candidates: arrayvec::IntoIter<MoveTemplate, MAX_TEMPLATES>,
    enforce_check_safety: bool,
}

impl<'a> LegalMoves<'a> {
    fn new(position: &'a mut Position, id: PieceId, enforce_check_safety: bool) -> Self {
        let piece = position[id];
        Self {
            position,
            id: Some(id),
            origin: piece.coordinate(),
            candidates: theoretical_moves(&piece).into_iter(),
            enforce_check_safety,
        }
    }

    /// Square the moves start from.
    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    /// Destinations of the remaining legal moves.
    pub fn destinations(self) -> impl Iterator<Item = error::Result<Coordinate>> + 'a {
        let origin = self.origin;
        self.filter_map(move |result| match result {
            Ok(template) => template.destination(origin).map(Ok),
            Err(err) => Some(Err(err)),
        })
    }
}

impl Iterator for LegalMoves<'_> {
    type Item = error::Result<MoveTemplate>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.id?;
        for template in self.candidates.by_ref() {
            match is_legal(self.position, id, template, self.enforce_check_safety) {
                Ok(true) => return Some(Ok(template)),
                Ok(false) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
        None
    }
}

/// Lazily generates the legal moves of a piece.
pub fn legal_moves_iter(position: &mut Position, id: PieceId) -> LegalMoves<'_> {
    LegalMoves::new(position, id, true)
}

/// Lazily generates the legal moves of whatever piece stands on coordinate.
/// Yields nothing for an empty square.
pub fn legal_moves_from(position: &mut Position, coordinate: Coordinate) -> LegalMoves<'_> {
    match position.piece_at(coordinate) {
        Some(id) => LegalMoves::new(position, id, true),
        None => LegalMoves {
            position,
            id: None,
            origin: coordinate,
            candidates: TemplateList::new().into_iter(),
            enforce_check_safety: true,
        },
    }
}

impl Position {
    /// Lazily generates the legal moves of the piece on coordinate.
    /// Recomputed on every call, see `legal_moves_from`.
    pub fn legal_moves_from(&mut self, coordinate: Coordinate) -> LegalMoves<'_> {
        legal_moves_from(self, coordinate)
    }
}

/// All legal moves of a piece.
pub fn legal_moves(position: &mut Position, id: PieceId) -> error::Result<TemplateList> {
    legal_moves_with(position, id, true)
}

pub(crate) fn legal_moves_with(
    position: &mut Position,
    id: PieceId,
    enforce_check_safety: bool,
) -> error::Result<TemplateList> {
    LegalMoves::new(position, id, enforce_check_safety).collect()
}

/// Returns true if template is a legal move of piece id.
///
/// Conditions are checked in template order and the first failure rejects the
/// move. With `enforce_check_safety`, the move is then played hypothetically and
/// rejected if the mover's king ends up attacked. The Position is identical
/// before and after this call whatever the outcome.
pub fn is_legal(
    position: &mut Position,
    id: PieceId,
    template: MoveTemplate,
    enforce_check_safety: bool,
) -> error::Result<bool> {
    let piece = position[id];
    let to = match template.destination(piece.coordinate()) {
        Some(to) => to,
        None => return Ok(false),
    };

    for &condition in template.conditions() {
        if !condition_holds(position, &piece, template.offset(), to, condition) {
            return Ok(false);
        }
    }

    let rook = match template.castling() {
        Some(castling_side) => match castling_rook(position, &piece, castling_side) {
            Some(rook) => Some(rook),
            None => return Ok(false),
        },
        None => None,
    };

    if enforce_check_safety {
        let captures = resolve_captures(position, &piece, template, to);
        let mut simulated = position.simulate(id, to, captures, rook);
        let check = check::is_in_check(&mut simulated, piece.side(), !piece.side())?;
        if check.in_check {
            trace!("{piece} {template} rejected, king attacked by {:?}", check.attackers);
            return Ok(false);
        }
    }

    Ok(true)
}

fn condition_holds(
    position: &Position,
    piece: &Piece,
    offset: Offset,
    to: Coordinate,
    condition: Condition,
) -> bool {
    match condition {
        Condition::FirstMove => !piece.has_moved(),
        Condition::Empty => position.real_piece_at(to).is_none(),
        Condition::EmptyOrAdversary => match position.real_piece_at(to) {
            Some(target) => position[target].side() != piece.side(),
            None => true,
        },
        // Ghosts count here, that is what makes en passant possible.
        Condition::AdversaryOrEnPassant => match position.piece_at(to) {
            Some(target) => position[target].side() != piece.side(),
            None => false,
        },
        Condition::EmptyRow => {
            (offset.dx == 0 || offset.dy == 0) && is_path_clear(position, piece.coordinate(), offset)
        }
        Condition::EmptyDiag => {
            offset.dx.abs() == offset.dy.abs() && is_path_clear(position, piece.coordinate(), offset)
        }
    }
}

/// Returns true if no real piece stands strictly between origin and origin + offset.
fn is_path_clear(position: &Position, origin: Coordinate, offset: Offset) -> bool {
    let step = offset.step();
    (1..offset.distance()).all(|i| {
        origin
            .offset(Offset::new(step.dx * i, step.dy * i))
            .map_or(false, |square| position.real_piece_at(square).is_none())
    })
}

/// Checks the castling preconditions in order and returns the partner rook
/// with its destination if they all hold. Only a king on its start square castles.
fn castling_rook(
    position: &Position,
    king: &Piece,
    castling_side: CastlingSide,
) -> Option<(PieceId, Coordinate)> {
    if position.player(king.side()).in_check() || king.has_moved() {
        return None;
    }

    let origin = king.coordinate();
    if origin != Coordinate::new_unchecked(KING_FILE, king.side().home_rank()) {
        return None;
    }
    let rook_square = Coordinate::new(castling_side.rook_file(), origin.rank()).ok()?;
    let towards_rook = Offset::new(castling_side.rook_file() as i8 - origin.file() as i8, 0);
    if !is_path_clear(position, origin, towards_rook) {
        return None;
    }

    let rook_id = position.real_piece_at(rook_square)?;
    let rook = &position[rook_id];
    if rook.kind() != PieceKind::Rook || rook.side() != king.side() || rook.has_moved() {
        return None;
    }
    let rook_to = rook_square.offset(castling_side.rook_offset())?;
    Some((rook_id, rook_to))
}

/// Pieces that leave play when piece moves by template to `to`.
///
/// A ghost on the destination is always discarded. An opposing real piece on
/// the destination is captured. A pawn moving diagonally onto an opposing ghost
/// captures en passant: the victim is the opposing pawn beside it, on the
/// destination's file and the pawn's own rank.
pub(crate) fn resolve_captures(
    position: &Position,
    piece: &Piece,
    template: MoveTemplate,
    to: Coordinate,
) -> Captures {
    let mut captures = Captures::default();
    let target_id = match position.piece_at(to) {
        Some(target_id) => target_id,
        None => return captures,
    };
    let target = &position[target_id];

    if !target.is_ghost() {
        if target.side() != piece.side() {
            captures.victim = Some(target_id);
        }
        return captures;
    }

    captures.ghost = Some(target_id);
    let is_pawn_capture = piece.kind() == PieceKind::Pawn && template.offset().dx != 0;
    if is_pawn_capture && target.side() != piece.side() {
        let beside = Coordinate::new(to.file(), piece.coordinate().rank()).ok();
        let victim = beside.and_then(|square| position.real_piece_at(square));
        if let Some(victim) = victim {
            let victim_piece = &position[victim];
            if victim_piece.kind() == PieceKind::Pawn && victim_piece.side() != piece.side() {
                captures.victim = Some(victim);
                captures.en_passant = true;
            }
        }
    }
    captures
}

/// Partner rook of a castling template for the king id, with its destination.
pub(crate) fn castling_partner(
    position: &Position,
    id: PieceId,
    castling_side: CastlingSide,
) -> Option<(PieceId, Coordinate)> {
    let king = &position[id];
    let rook_square = Coordinate::new(castling_side.rook_file(), king.coordinate().rank()).ok()?;
    let rook_id = position.real_piece_at(rook_square)?;
    Some((rook_id, rook_square.offset(castling_side.rook_offset())?))
}
