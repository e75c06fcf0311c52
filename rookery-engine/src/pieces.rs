//! Pieces and the candidate move templates each kind of piece produces.
//!
//! Templates are a pure function of a piece's kind, side and moved-flag.
//! They know nothing of board occupancy: whether a template is playable is
//! decided by evaluating its conditions in `movegen`.

use std::fmt::{self, Display};

use arrayvec::ArrayVec;

use crate::coretypes::{CastlingSide, Coordinate, Offset, PieceKind, Side};

/// The most templates any single piece produces, a queen's 8 rays of 7 squares.
pub const MAX_TEMPLATES: usize = 56;

/// Fixed capacity list holding all templates of one piece.
pub type TemplateList = ArrayVec<MoveTemplate, MAX_TEMPLATES>;

/// Stable handle of a piece inside a Position's arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PieceId(pub(crate) usize);

/// A single piece. Its coordinate and moved-flag are only ever changed by
/// Position, which keeps the Board in lockstep.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Piece {
    pub(crate) kind: PieceKind,
    pub(crate) side: Side,
    pub(crate) coordinate: Coordinate,
    pub(crate) moved: bool,
}

/// Legality predicates attached to a template, evaluated in order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Condition {
    /// The piece has never moved.
    FirstMove,
    /// Destination holds no real piece.
    Empty,
    /// Destination holds no real piece, or an opposing one.
    EmptyOrAdversary,
    /// Destination holds an opposing real piece, or an opposing ghost.
    AdversaryOrEnPassant,
    /// Squares strictly between origin and destination along a rank or file are empty.
    EmptyRow,
    /// Squares strictly between origin and destination along a diagonal are empty.
    EmptyDiag,
}

use Condition::*;

const EMPTY: &[Condition] = &[Empty];
const CAPTURE: &[Condition] = &[AdversaryOrEnPassant];
const DOUBLE_STEP: &[Condition] = &[Empty, EmptyRow, FirstMove];
const STEP: &[Condition] = &[EmptyOrAdversary];
const SLIDE_ROW: &[Condition] = &[EmptyOrAdversary, EmptyRow];
const SLIDE_DIAG: &[Condition] = &[EmptyOrAdversary, EmptyDiag];

const KNIGHT_OFFSETS: [Offset; 8] = [
    Offset::new(-2, 1),
    Offset::new(-2, -1),
    Offset::new(2, 1),
    Offset::new(2, -1),
    Offset::new(1, -2),
    Offset::new(1, 2),
    Offset::new(-1, 2),
    Offset::new(-1, -2),
];

const KING_OFFSETS: [Offset; 8] = [
    Offset::new(0, 1),
    Offset::new(0, -1),
    Offset::new(1, 0),
    Offset::new(1, 1),
    Offset::new(1, -1),
    Offset::new(-1, 0),
    Offset::new(-1, 1),
    Offset::new(-1, -1),
];

const DIAGONALS: [Offset; 4] = [
    Offset::new(1, 1),
    Offset::new(1, -1),
    Offset::new(-1, 1),
    Offset::new(-1, -1),
];

const ORTHOGONALS: [Offset; 4] = [
    Offset::new(0, 1),
    Offset::new(0, -1),
    Offset::new(1, 0),
    Offset::new(-1, 0),
];

/// A candidate relative move with the conditions that make it legal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MoveTemplate {
    offset: Offset,
    conditions: &'static [Condition],
    castling: Option<CastlingSide>,
}

impl MoveTemplate {
    const fn new(dx: i8, dy: i8, conditions: &'static [Condition]) -> Self {
        Self {
            offset: Offset::new(dx, dy),
            conditions,
            castling: None,
        }
    }

    const fn castle(castling_side: CastlingSide) -> Self {
        Self {
            offset: castling_side.king_offset(),
            conditions: &[],
            castling: Some(castling_side),
        }
    }

    pub const fn offset(&self) -> Offset {
        self.offset
    }

    pub const fn conditions(&self) -> &'static [Condition] {
        self.conditions
    }

    /// Castling payload, if this template moves a king and rook together.
    pub const fn castling(&self) -> Option<CastlingSide> {
        self.castling
    }

    /// Destination when applied from origin, None if it leaves the board.
    pub fn destination(&self, origin: Coordinate) -> Option<Coordinate> {
        origin.offset(self.offset)
    }
}

impl Display for MoveTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.castling {
            Some(castling_side) => f.write_str(castling_side.symbol()),
            None => write!(f, "({:+}, {:+})", self.offset.dx, self.offset.dy),
        }
    }
}

impl Piece {
    /// Creates an unmoved piece.
    pub const fn new(kind: PieceKind, side: Side, coordinate: Coordinate) -> Self {
        Self {
            kind,
            side,
            coordinate,
            moved: false,
        }
    }

    /// Same piece with the given moved-flag.
    pub const fn with_moved(mut self, moved: bool) -> Self {
        self.moved = moved;
        self
    }

    // Immutable Getters
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }
    pub const fn side(&self) -> Side {
        self.side
    }
    pub const fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
    pub const fn has_moved(&self) -> bool {
        self.moved
    }

    pub const fn is_ghost(&self) -> bool {
        matches!(self.kind, PieceKind::Ghost)
    }

    /// Material value, see `PieceKind::value`.
    pub const fn value(&self) -> u32 {
        self.kind.value()
    }

    /// Kind letter followed by side letter, `Nw` or `Pb`.
    pub fn label(&self) -> String {
        format!("{}{}", self.kind.to_char(), self.side.to_char())
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {:?} {}", self.side, self.kind, self.coordinate)
    }
}

/// All candidate templates of a piece, in a fixed order per kind.
pub fn templates(piece: &Piece) -> TemplateList {
    let mut list = TemplateList::new();
    match piece.kind {
        PieceKind::Pawn => {
            let way = piece.side.forward();
            list.push(MoveTemplate::new(0, way, EMPTY));
            list.push(MoveTemplate::new(1, way, CAPTURE));
            list.push(MoveTemplate::new(-1, way, CAPTURE));
            if !piece.moved {
                list.push(MoveTemplate::new(0, 2 * way, DOUBLE_STEP));
            }
        }
        PieceKind::Knight => {
            list.extend(KNIGHT_OFFSETS.iter().map(|o| MoveTemplate::new(o.dx, o.dy, STEP)));
        }
        PieceKind::Bishop => push_slides(&mut list, &DIAGONALS, SLIDE_DIAG),
        PieceKind::Rook => push_slides(&mut list, &ORTHOGONALS, SLIDE_ROW),
        PieceKind::Queen => {
            for distance in 1..=7 {
                for ray in DIAGONALS {
                    list.push(MoveTemplate::new(ray.dx * distance, ray.dy * distance, SLIDE_DIAG));
                }
                for ray in ORTHOGONALS {
                    list.push(MoveTemplate::new(ray.dx * distance, ray.dy * distance, SLIDE_ROW));
                }
            }
        }
        PieceKind::King => {
            list.extend(KING_OFFSETS.iter().map(|o| MoveTemplate::new(o.dx, o.dy, STEP)));
            list.extend(CastlingSide::ALL.into_iter().map(MoveTemplate::castle));
        }
        PieceKind::Ghost => (),
    }
    list
}

// Distances grow in the outer loop so nearer squares come first, as for the queen.
fn push_slides(list: &mut TemplateList, rays: &[Offset; 4], conditions: &'static [Condition]) {
    for distance in 1..=7 {
        for ray in rays {
            list.push(MoveTemplate::new(ray.dx * distance, ray.dy * distance, conditions));
        }
    }
}

/// Templates of a piece whose destination stays on the board.
/// A cheap prefilter before any condition is evaluated.
pub fn theoretical_moves(piece: &Piece) -> TemplateList {
    let origin = piece.coordinate;
    templates(piece)
        .into_iter()
        .filter(|template| template.destination(origin).is_some())
        .collect()
}
