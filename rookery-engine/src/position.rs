//! Holds Position struct, the most important data structure for the engine.
//!
//! A Position owns every piece in an append-only arena and keeps two views of
//! them: the square-centric Board and the side-centric Player collections.
//! Both views hold `PieceId`s only, and every mutation goes through the
//! methods in this module which update both in lockstep.

use std::ops::{Deref, DerefMut, Index};

use arrayvec::ArrayVec;
use log::trace;

use crate::board::{Board, DisplayGrid};
use crate::coretypes::{Coordinate, PieceKind, Side, KING_FILE, NUM_FILES};
use crate::error::{self, ErrorKind};
use crate::pieces::{Piece, PieceId};
use crate::player::Player;

/// struct Position
/// The complete piece placement of a game.
/// # Members:
/// * pieces - arena of every piece ever created, indexed by PieceId.
/// * board - square-centric references into the arena.
/// * players - side-centric references into the arena, indexed by `Side::idx`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Position {
    pieces: Vec<Piece>,
    board: Board,
    players: [Player; 2],
}

/// Pieces removed from the board by a move, see `movegen::resolve_captures`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub(crate) struct Captures {
    /// Ghost standing on the destination, discarded without being captured.
    pub(crate) ghost: Option<PieceId>,
    /// Real piece taken by the move.
    pub(crate) victim: Option<PieceId>,
    /// Victim was taken en passant, beside the destination rather than on it.
    pub(crate) en_passant: bool,
}

/// Everything needed to revert a hypothetical move.
#[derive(Debug)]
pub(crate) struct Undo {
    mover: PieceId,
    origin: Coordinate,
    rook: Option<(PieceId, Coordinate)>,
    // (id, index in owner's collection, captured by mover)
    removed: ArrayVec<(PieceId, usize, bool), 2>,
}

/// A hypothetical move applied to a Position.
/// The move is reverted when the Simulation is dropped, on every exit path.
pub(crate) struct Simulation<'a> {
    position: &'a mut Position,
    undo: Option<Undo>,
}

impl Position {
    /// A position without any pieces.
    pub fn empty() -> Self {
        Self {
            pieces: Vec::new(),
            board: Board::new(),
            players: [Player::new(Side::White), Player::new(Side::Black)],
        }
    }

    /// Standard chess start position.
    pub fn start_position() -> Self {
        use PieceKind::*;
        const BACK_RANK: [(PieceKind, &[u8]); 5] = [
            (Rook, &[1, 8]),
            (Knight, &[2, 7]),
            (Bishop, &[3, 6]),
            (Queen, &[4]),
            (King, &[KING_FILE]),
        ];

        let mut position = Self::empty();
        for side in Side::ALL {
            let home = side.home_rank();
            let pawn_rank = side.pawn_rank();

            for file in 1..=NUM_FILES {
                let coordinate = Coordinate::new_unchecked(file, pawn_rank);
                position.push_piece(Piece::new(Pawn, side, coordinate));
            }
            for (kind, files) in BACK_RANK {
                for &file in files {
                    let coordinate = Coordinate::new_unchecked(file, home);
                    position.push_piece(Piece::new(kind, side, coordinate));
                }
            }
        }
        position
    }

    /// Adds a new piece to the arena, board, and its side's collection.
    /// Fails if the square already holds a real piece.
    /// A pawn away from its start rank is marked as moved.
    pub fn insert(&mut self, mut piece: Piece) -> error::Result<PieceId> {
        if let Some(occupant) = self.real_piece_at(piece.coordinate) {
            return Err((
                ErrorKind::IllegalOperation,
                format!("{} is occupied by {}", piece.coordinate, self[occupant]),
            )
                .into());
        }
        if let Some(ghost) = self.board.get(piece.coordinate) {
            self.detach(ghost);
        }
        if piece.kind == PieceKind::Pawn && piece.coordinate.rank() != piece.side.pawn_rank() {
            piece.moved = true;
        }
        Ok(self.push_piece(piece))
    }

    fn push_piece(&mut self, piece: Piece) -> PieceId {
        let id = PieceId(self.pieces.len());
        self.pieces.push(piece);
        self.board.place(id, piece.coordinate);
        self.players[piece.side.idx()].pieces.push(id);
        id
    }

    /// Const getters.
    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn player(&self, side: Side) -> &Player {
        &self.players[side.idx()]
    }
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.0]
    }

    /// Piece referenced by the board at coordinate, ghosts included.
    pub fn piece_at(&self, coordinate: Coordinate) -> Option<PieceId> {
        self.board.get(coordinate)
    }

    /// Piece at coordinate unless it is a ghost.
    pub fn real_piece_at(&self, coordinate: Coordinate) -> Option<PieceId> {
        self.board
            .get(coordinate)
            .filter(|&id| !self[id].is_ghost())
    }

    /// Returns the king of a side. A side without a king is not a playable position.
    pub fn king(&self, side: Side) -> error::Result<PieceId> {
        self.player(side)
            .king(self)
            .ok_or_else(|| (ErrorKind::IllegalOperation, format!("{side} has no king")).into())
    }

    /// Renderer-facing labels of every square.
    pub fn display_grid(&self) -> DisplayGrid {
        self.board.to_display_grid(self)
    }

    /// Returns true if Board and both Players agree on the placement of every piece:
    /// every collected piece is on the board at its own coordinate, belongs to the
    /// collecting side, and the board references nothing else.
    pub fn is_consistent(&self) -> bool {
        let mut collected = 0;
        for player in &self.players {
            for &id in player.pieces() {
                let piece = &self[id];
                if piece.side != player.side() || self.board.get(piece.coordinate) != Some(id) {
                    return false;
                }
                collected += 1;
            }
        }
        collected == self.board.occupied().count()
    }

    ///////////////////////////////
    // Transactional mutators    //
    ///////////////////////////////

    /// Takes a piece off the board and out of its owner's collection.
    /// Returns its index in the collection so it can be restored in place.
    pub(crate) fn detach(&mut self, id: PieceId) -> usize {
        let piece = self.pieces[id.0];
        self.board.remove(id, piece.coordinate);
        let collection = &mut self.players[piece.side.idx()].pieces;
        match collection.iter().position(|&other| other == id) {
            Some(index) => {
                collection.remove(index);
                index
            }
            None => collection.len(),
        }
    }

    /// Reverse of `detach`.
    pub(crate) fn attach(&mut self, id: PieceId, index: usize) {
        let piece = self.pieces[id.0];
        let collection = &mut self.players[piece.side.idx()].pieces;
        collection.insert(index.min(collection.len()), id);
        self.board.place(id, piece.coordinate);
    }

    /// Moves a piece to a new coordinate on both the board and the piece itself.
    pub(crate) fn relocate(&mut self, id: PieceId, to: Coordinate) {
        let from = self.pieces[id.0].coordinate;
        self.board.remove(id, from);
        self.pieces[id.0].coordinate = to;
        self.board.place(id, to);
    }

    pub(crate) fn set_moved(&mut self, id: PieceId, moved: bool) {
        self.pieces[id.0].moved = moved;
    }

    pub(crate) fn set_in_check(&mut self, side: Side, in_check: bool) {
        self.players[side.idx()].in_check = in_check;
    }

    /// Removes a piece from play and credits it to the captor.
    pub(crate) fn capture(&mut self, captor: Side, id: PieceId) -> usize {
        let index = self.detach(id);
        self.players[captor.idx()].captured.push(id);
        index
    }

    /// Reverse of `capture`.
    fn release(&mut self, captor: Side, id: PieceId, index: usize) {
        let captured = &mut self.players[captor.idx()].captured;
        if let Some(position) = captured.iter().rposition(|&other| other == id) {
            captured.remove(position);
        }
        self.attach(id, index);
    }

    /// Replaces a piece with a new one on the same square, keeping its place
    /// in the owner's collection. Used for promotion.
    pub(crate) fn replace(&mut self, id: PieceId, kind: PieceKind) -> PieceId {
        let old = self.pieces[id.0];
        let index = self.detach(id);
        let new_id = PieceId(self.pieces.len());
        self.pieces.push(Piece::new(kind, old.side, old.coordinate).with_moved(true));
        self.attach(new_id, index);
        new_id
    }

    /// Creates a ghost for side at coordinate.
    pub(crate) fn spawn_ghost(&mut self, side: Side, coordinate: Coordinate) -> PieceId {
        self.push_piece(Piece::new(PieceKind::Ghost, side, coordinate).with_moved(true))
    }

    /// Removes every ghost owned by side. Returns how many were removed.
    pub(crate) fn discard_ghosts(&mut self, side: Side) -> usize {
        let ghosts: Vec<PieceId> = self
            .player(side)
            .pieces()
            .iter()
            .copied()
            .filter(|&id| self[id].is_ghost())
            .collect();
        for &ghost in &ghosts {
            self.detach(ghost);
        }
        ghosts.len()
    }

    /// Applies a move for the sake of inspection: captures are credited to the
    /// mover, the mover and a castling rook are relocated, moved-flags are untouched.
    pub(crate) fn make(
        &mut self,
        mover: PieceId,
        to: Coordinate,
        captures: Captures,
        rook: Option<(PieceId, Coordinate)>,
    ) -> Undo {
        let captor = self[mover].side;
        let mut removed = ArrayVec::new();
        if let Some(ghost) = captures.ghost {
            removed.push((ghost, self.detach(ghost), false));
        }
        if let Some(victim) = captures.victim {
            removed.push((victim, self.capture(captor, victim), true));
        }

        let origin = self[mover].coordinate;
        self.relocate(mover, to);
        let rook = rook.map(|(rook, rook_to)| {
            let rook_from = self[rook].coordinate;
            self.relocate(rook, rook_to);
            (rook, rook_from)
        });

        Undo {
            mover,
            origin,
            rook,
            removed,
        }
    }

    /// Reverts a move applied with `make`, in reverse order.
    pub(crate) fn unmake(&mut self, undo: Undo) {
        if let Some((rook, rook_from)) = undo.rook {
            self.relocate(rook, rook_from);
        }
        self.relocate(undo.mover, undo.origin);

        let captor = self[undo.mover].side;
        for &(id, index, captured) in undo.removed.iter().rev() {
            if captured {
                self.release(captor, id, index);
            } else {
                self.attach(id, index);
            }
        }
    }

    /// Applies a hypothetical move that is reverted when the guard drops.
    pub(crate) fn simulate(
        &mut self,
        mover: PieceId,
        to: Coordinate,
        captures: Captures,
        rook: Option<(PieceId, Coordinate)>,
    ) -> Simulation<'_> {
        trace!("simulate {} to {to}", self[mover]);
        let undo = self.make(mover, to, captures, rook);
        Simulation {
            position: self,
            undo: Some(undo),
        }
    }
}

/// Defaults to standard chess start position.
impl Default for Position {
    fn default() -> Self {
        Self::start_position()
    }
}

impl Index<PieceId> for Position {
    type Output = Piece;
    fn index(&self, id: PieceId) -> &Self::Output {
        &self.pieces[id.0]
    }
}

impl Deref for Simulation<'_> {
    type Target = Position;
    fn deref(&self) -> &Self::Target {
        self.position
    }
}

impl DerefMut for Simulation<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.position
    }
}

impl Drop for Simulation<'_> {
    fn drop(&mut self) {
        if let Some(undo) = self.undo.take() {
            self.position.unmake(undo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PieceKind::*;
    use Side::*;

    fn sq(location: &str) -> Coordinate {
        location.parse().unwrap()
    }

    #[test]
    fn start_position_layout() {
        let position = Position::start_position();
        assert!(position.is_consistent());
        assert_eq!(position.player(White).pieces().len(), 16);
        assert_eq!(position.player(Black).pieces().len(), 16);

        let e1 = position.piece_at(sq("e1")).unwrap();
        assert_eq!(position[e1].kind(), King);
        assert_eq!(position.king(White).unwrap(), e1);
        let d8 = position.piece_at(sq("d8")).unwrap();
        assert_eq!((position[d8].kind(), position[d8].side()), (Queen, Black));
        assert_eq!(position[position.piece_at(sq("h7")).unwrap()].kind(), Pawn);
        assert!(position.piece_at(sq("e4")).is_none());

        let grid = position.display_grid();
        assert_eq!(grid[0][0].as_deref(), Some("Rb"));
        assert_eq!(grid[7][4].as_deref(), Some("Kw"));
        assert_eq!(grid[6][3].as_deref(), Some("Pw"));
        assert_eq!(grid[4][4], None);
    }

    #[test]
    fn insert_rejects_occupied_square() {
        let mut position = Position::empty();
        position.insert(Piece::new(Rook, White, sq("a1"))).unwrap();
        let err = position.insert(Piece::new(Knight, Black, sq("a1"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalOperation);
        assert!(position.is_consistent());
    }

    #[test]
    fn inserted_pawn_off_start_rank_has_moved() {
        let mut position = Position::empty();
        let b5 = position.insert(Piece::new(Pawn, White, sq("b5"))).unwrap();
        let b2 = position.insert(Piece::new(Pawn, White, sq("b2"))).unwrap();
        let g7 = position.insert(Piece::new(Pawn, Black, sq("g7"))).unwrap();
        let g2 = position.insert(Piece::new(Pawn, Black, sq("g2"))).unwrap();
        let knight = position.insert(Piece::new(Knight, White, sq("c5"))).unwrap();
        assert!(position[b5].has_moved());
        assert!(!position[b2].has_moved());
        assert!(!position[g7].has_moved());
        assert!(position[g2].has_moved());
        assert!(!position[knight].has_moved());
    }

    #[test]
    fn missing_king_is_illegal() {
        let mut position = Position::empty();
        position.insert(Piece::new(King, White, sq("e1"))).unwrap();
        assert!(position.king(White).is_ok());
        assert_eq!(position.king(Black).unwrap_err().kind(), ErrorKind::IllegalOperation);
    }

    #[test]
    fn relocate_keeps_board_in_lockstep() {
        let mut position = Position::start_position();
        let pawn = position.piece_at(sq("e2")).unwrap();
        position.relocate(pawn, sq("e4"));
        assert_eq!(position.piece_at(sq("e4")), Some(pawn));
        assert!(position.piece_at(sq("e2")).is_none());
        assert_eq!(position[pawn].coordinate(), sq("e4"));
        assert!(position.is_consistent());
    }

    #[test]
    fn simulation_reverts_on_drop() {
        let mut position = Position::empty();
        let rook = position.insert(Piece::new(Rook, White, sq("a1"))).unwrap();
        let knight = position.insert(Piece::new(Knight, Black, sq("a5"))).unwrap();
        let ghost = position.spawn_ghost(Black, sq("a3"));
        let before = position.clone();

        {
            let captures = Captures {
                ghost: None,
                victim: Some(knight),
                en_passant: false,
            };
            let simulated = position.simulate(rook, sq("a5"), captures, None);
            assert_eq!(simulated.piece_at(sq("a5")), Some(rook));
            assert_eq!(simulated.player(White).captured(), &[knight]);
            assert!(simulated.player(Black).pieces().iter().all(|&id| id != knight));
            assert!(simulated.is_consistent());
        }
        assert_eq!(position, before);

        {
            let captures = Captures {
                ghost: Some(ghost),
                victim: None,
                en_passant: false,
            };
            let _simulated = position.simulate(rook, sq("a3"), captures, None);
        }
        assert_eq!(position, before);
    }

    #[test]
    fn replace_and_ghosts() {
        let mut position = Position::empty();
        let pawn = position.insert(Piece::new(Pawn, White, sq("b8"))).unwrap();
        let queen = position.replace(pawn, Queen);
        assert_ne!(pawn, queen);
        assert_eq!(position.piece_at(sq("b8")), Some(queen));
        assert!(position[queen].has_moved());
        assert_eq!(position.player(White).pieces(), &[queen]);

        position.spawn_ghost(White, sq("c3"));
        position.spawn_ghost(White, sq("d3"));
        assert!(position.real_piece_at(sq("c3")).is_none());
        assert!(position.piece_at(sq("c3")).is_some());
        assert_eq!(position.discard_ghosts(White), 2);
        assert!(position.piece_at(sq("c3")).is_none());
        assert!(position.is_consistent());
    }
}
