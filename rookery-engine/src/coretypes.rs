//! The fundamental and simple types of `rookery_engine`.

use std::fmt::{self, Display, Write};
use std::ops::Not;
use std::str::FromStr;

use crate::error::{self, ErrorKind};

///////////////
// Constants //
///////////////
pub const NUM_FILES: u8 = 8; // a, b, c, d, e, f, g, h
pub const NUM_RANKS: u8 = 8; // 1, 2, 3, 4, 5, 6, 7, 8
pub const NUM_SQUARES: usize = NUM_FILES as usize * NUM_RANKS as usize;
/// File both kings start on, and the only file they may castle from.
pub const KING_FILE: u8 = 5;

const FILE_NAMES: [char; NUM_FILES as usize] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];
const RANK_NAMES: [char; NUM_RANKS as usize] = ['1', '2', '3', '4', '5', '6', '7', '8'];

/////////////////////////
// Data and Structures //
/////////////////////////

/// Counter for full moves. Starts at 1 and increments when White is to move again.
pub type MoveCount = u16;

/// Side can represent the color of a piece, or a player.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Side {
    White,
    Black,
}

/// Every kind of occupant a square can hold.
/// Ghost is not a real chess piece: it marks the square skipped by a pawn's
/// double step for exactly one opposing turn.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
    Ghost,
}

/// A square on the board as a 1-based (file, rank) pair.
/// File 1 is the `a` file, rank 1 is White's home rank.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Coordinate {
    file: u8,
    rank: u8,
}

/// A relative displacement applied to a Coordinate.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Offset {
    pub dx: i8,
    pub dy: i8,
}

/// The two ways a king may castle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CastlingSide {
    QueenSide,
    KingSide,
}

/// Move
/// Pure coordinate form of moving a single chess piece, `e2e4` or `a7a8q`.
/// This is how collaborators name a move; the engine resolves it against
/// the legal moves of the piece on `from`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Move {
    pub(crate) from: Coordinate,
    pub(crate) to: Coordinate,
    pub(crate) promotion: Option<PieceKind>,
}

/// Enum describing the kind of a committed move.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MoveKind {
    /// Moved to an empty square.
    Quiet,
    /// Move resulted in a capture of the given kind.
    Capture(PieceKind),
    /// Pawn captured a pawn en passant.
    EnPassant,
    /// King castled, the rook moved along with it.
    Castle(CastlingSide),
}

/// MoveInfo describes a move after it was committed to a game.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MoveInfo {
    /// Original square of moving piece.
    pub(crate) from: Coordinate,
    /// Target square of moving piece.
    pub(crate) to: Coordinate,
    /// Kind of the piece that was moved.
    pub(crate) piece_kind: PieceKind,
    /// Flag if move was a regular or special move.
    pub(crate) move_kind: MoveKind,
    /// Kind the pawn was promoted to, if any.
    pub(crate) promotion: Option<PieceKind>,
}

////////////////////////////
// Coordinate conversions //
////////////////////////////

/// Parses algebraic location text such as `e4` into a Coordinate.
pub fn location_to_coordinate(text: &str) -> error::Result<Coordinate> {
    let mut chars = text.chars();
    let (file_ch, rank_ch) = match (chars.next(), chars.next(), chars.next()) {
        (Some(file_ch), Some(rank_ch), None) => (file_ch, rank_ch),
        _ => return Err((ErrorKind::InvalidLocation, text.escape_debug()).into()),
    };

    let file = FILE_NAMES.iter().position(|&name| name == file_ch);
    let rank = RANK_NAMES.iter().position(|&name| name == rank_ch);
    match (file, rank) {
        (Some(file), Some(rank)) => Ok(Coordinate {
            file: file as u8 + 1,
            rank: rank as u8 + 1,
        }),
        _ => Err((ErrorKind::InvalidLocation, text.escape_debug()).into()),
    }
}

/// Formats a raw (file, rank) pair as algebraic location text.
pub fn coordinate_to_location(file: i8, rank: i8) -> error::Result<String> {
    let coordinate = Coordinate::try_from_signed(file, rank)?;
    Ok(coordinate.to_string())
}

/// Maps a Coordinate onto a zero-based (row, col) grid index.
/// Rank 8 is row 0, so the grid reads top to bottom like a printed board.
pub const fn coordinate_to_grid_index(coordinate: Coordinate) -> (usize, usize) {
    (
        (NUM_RANKS - coordinate.rank) as usize,
        (coordinate.file - 1) as usize,
    )
}

/// Inverse of `coordinate_to_grid_index`.
pub fn grid_index_to_coordinate(row: usize, col: usize) -> error::Result<Coordinate> {
    if row >= NUM_RANKS as usize || col >= NUM_FILES as usize {
        return Err((ErrorKind::OutOfRange, format!("grid index ({row}, {col})")).into());
    }
    Ok(Coordinate {
        file: col as u8 + 1,
        rank: NUM_RANKS - row as u8,
    })
}

//////////////////////
/// Implementations //
//////////////////////

impl Side {
    pub const ALL: [Side; 2] = [Side::White, Side::Black];

    /// Array index of a side, for per-side tables.
    pub const fn idx(&self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 1,
        }
    }

    /// Rank direction pawns of this side advance in.
    pub const fn forward(&self) -> i8 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }

    /// Rank where this side's king and rooks start.
    pub const fn home_rank(&self) -> u8 {
        match self {
            Side::White => 1,
            Side::Black => NUM_RANKS,
        }
    }

    /// Rank where this side's pawns start.
    pub const fn pawn_rank(&self) -> u8 {
        (self.home_rank() as i8 + self.forward()) as u8
    }

    /// Rank where this side's pawns promote.
    pub const fn promotion_rank(&self) -> u8 {
        match self {
            Side::White => NUM_RANKS,
            Side::Black => 1,
        }
    }

    pub const fn to_char(&self) -> char {
        match self {
            Side::White => 'w',
            Side::Black => 'b',
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

impl Not for Side {
    type Output = Self;
    fn not(self) -> Self::Output {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PieceKind {
    /// Single character label, `P` for pawns and a space for ghosts.
    pub const fn to_char(&self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
            PieceKind::Ghost => ' ',
        }
    }

    /// Letter used in move notation. Pawns and ghosts have none.
    pub const fn letter(&self) -> Option<char> {
        match self {
            PieceKind::Pawn | PieceKind::Ghost => None,
            _ => Some(self.to_char()),
        }
    }

    /// Fixed material value, only used to total up captured pieces.
    pub const fn value(&self) -> u32 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Knight | PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King | PieceKind::Ghost => 0,
        }
    }

    /// Returns true for kinds a pawn may be promoted to.
    pub const fn is_promotable(&self) -> bool {
        matches!(
            self,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }
}

/// Parses a promotion letter in either case: `q`, `r`, `b`, `n`, `Q`...
impl TryFrom<char> for PieceKind {
    type Error = error::Error;
    fn try_from(ch: char) -> error::Result<Self> {
        match ch.to_ascii_uppercase() {
            'P' => Ok(PieceKind::Pawn),
            'N' => Ok(PieceKind::Knight),
            'B' => Ok(PieceKind::Bishop),
            'R' => Ok(PieceKind::Rook),
            'Q' => Ok(PieceKind::Queen),
            'K' => Ok(PieceKind::King),
            _ => Err((ErrorKind::ParsePieceMalformed, "char is not in PNBRQKpnbrqk").into()),
        }
    }
}

impl FromStr for PieceKind {
    type Err = error::Error;
    fn from_str(s: &str) -> error::Result<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => PieceKind::try_from(ch),
            _ => Err((ErrorKind::ParsePieceMalformed, "expected a single letter").into()),
        }
    }
}

impl Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char(self.to_char())
    }
}

impl Coordinate {
    /// Creates a Coordinate from a 1-based (file, rank) pair.
    pub fn new(file: u8, rank: u8) -> error::Result<Self> {
        if (1..=NUM_FILES).contains(&file) && (1..=NUM_RANKS).contains(&rank) {
            Ok(Self { file, rank })
        } else {
            Err((ErrorKind::OutOfRange, format!("({file}, {rank})")).into())
        }
    }

    /// Creates a Coordinate the caller knows lies on the board.
    pub(crate) const fn new_unchecked(file: u8, rank: u8) -> Self {
        debug_assert!(file >= 1 && file <= NUM_FILES && rank >= 1 && rank <= NUM_RANKS);
        Self { file, rank }
    }

    fn try_from_signed(file: i8, rank: i8) -> error::Result<Self> {
        if file < 1 || rank < 1 {
            return Err((ErrorKind::OutOfRange, format!("({file}, {rank})")).into());
        }
        Self::new(file as u8, rank as u8)
    }

    pub const fn file(&self) -> u8 {
        self.file
    }

    pub const fn rank(&self) -> u8 {
        self.rank
    }

    /// Letter of this coordinate's file, `a` through `h`.
    pub const fn file_char(&self) -> char {
        FILE_NAMES[(self.file - 1) as usize]
    }

    /// Returns the Coordinate displaced by offset, or None if it leaves the board.
    pub fn offset(&self, offset: Offset) -> Option<Self> {
        let file = self.file as i8 + offset.dx;
        let rank = self.rank as i8 + offset.dy;
        Self::try_from_signed(file, rank).ok()
    }

    /// Iterates over all 64 coordinates, a1, b1, ... h8.
    pub fn iter() -> impl Iterator<Item = Coordinate> {
        (1..=NUM_RANKS).flat_map(|rank| (1..=NUM_FILES).map(move |file| Coordinate { file, rank }))
    }
}

/// Location ::= <fileLetter><rankNumber>
impl FromStr for Coordinate {
    type Err = error::Error;
    fn from_str(s: &str) -> error::Result<Self> {
        location_to_coordinate(s)
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char(self.file_char())?;
        f.write_char(RANK_NAMES[(self.rank - 1) as usize])
    }
}

impl Offset {
    pub const fn new(dx: i8, dy: i8) -> Self {
        Self { dx, dy }
    }

    /// Unit step towards this offset along each axis.
    pub const fn step(&self) -> Self {
        Self::new(self.dx.signum(), self.dy.signum())
    }

    /// Number of squares covered when walking in unit steps.
    pub fn distance(&self) -> i8 {
        self.dx.abs().max(self.dy.abs())
    }
}

impl CastlingSide {
    pub const ALL: [CastlingSide; 2] = [CastlingSide::QueenSide, CastlingSide::KingSide];

    /// Displacement of the king.
    pub const fn king_offset(&self) -> Offset {
        match self {
            CastlingSide::QueenSide => Offset::new(-2, 0),
            CastlingSide::KingSide => Offset::new(2, 0),
        }
    }

    /// File the partner rook starts on.
    pub const fn rook_file(&self) -> u8 {
        match self {
            CastlingSide::QueenSide => 1,
            CastlingSide::KingSide => NUM_FILES,
        }
    }

    /// Displacement of the partner rook.
    pub const fn rook_offset(&self) -> Offset {
        match self {
            CastlingSide::QueenSide => Offset::new(3, 0),
            CastlingSide::KingSide => Offset::new(-2, 0),
        }
    }

    /// Notation symbol.
    pub const fn symbol(&self) -> &'static str {
        match self {
            CastlingSide::QueenSide => "0-0-0",
            CastlingSide::KingSide => "0-0",
        }
    }
}

impl Move {
    pub const fn new(from: Coordinate, to: Coordinate, promotion: Option<PieceKind>) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }

    // Immutable Getters
    pub const fn from(&self) -> Coordinate {
        self.from
    }
    pub const fn to(&self) -> Coordinate {
        self.to
    }
    pub const fn promotion(&self) -> Option<PieceKind> {
        self.promotion
    }
}

/// Parses `Pure Algebraic Coordinate Notation`, `e2e4` or `e7e8q`.
impl FromStr for Move {
    type Err = error::Error;
    fn from_str(s: &str) -> error::Result<Self> {
        let s = s.trim();
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err((ErrorKind::ParseMoveMalformed, s.escape_debug()).into());
        }

        let from = location_to_coordinate(&s[0..2])?;
        let to = location_to_coordinate(&s[2..4])?;
        let promotion = match s.chars().nth(4) {
            Some(ch) => {
                let kind = PieceKind::try_from(ch)?;
                if !kind.is_promotable() {
                    return Err((ErrorKind::ParseMoveMalformed, "cannot promote to that kind").into());
                }
                Some(kind)
            }
            None => None,
        };

        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

/// # Example
/// Move { from: a7, to: a8, promotion: Some(Queen) } -> `a7a8q`.
impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece_kind) = self.promotion {
            f.write_char(piece_kind.to_char().to_ascii_lowercase())?;
        }
        Ok(())
    }
}

impl MoveInfo {
    // Immutable Getters
    pub const fn from(&self) -> Coordinate {
        self.from
    }
    pub const fn to(&self) -> Coordinate {
        self.to
    }
    pub const fn piece_kind(&self) -> PieceKind {
        self.piece_kind
    }
    pub const fn move_kind(&self) -> MoveKind {
        self.move_kind
    }
    pub const fn promotion(&self) -> Option<PieceKind> {
        self.promotion
    }

    /// Get this MoveInfo as a plain Move.
    pub const fn move_(&self) -> Move {
        Move::new(self.from, self.to, self.promotion)
    }

    /// Returns true if this MoveInfo came from a capturing move.
    pub fn is_capture(&self) -> bool {
        matches!(self.move_kind, MoveKind::Capture(_) | MoveKind::EnPassant)
    }

    /// Move in history notation: `Nf3`, `e4`, `Bxg5`, `exd5`, `0-0` or `e8+Q`.
    /// A promotion outranks a capture, which outranks castling.
    pub fn notation(&self) -> String {
        let letter = self.piece_kind.letter();
        if let Some(promotion) = self.promotion {
            format!("{}+{}", self.to, promotion.to_char())
        } else if self.is_capture() {
            // Pawns are named by the file they left.
            let prefix = letter.unwrap_or_else(|| self.from.file_char());
            format!("{prefix}x{}", self.to)
        } else if let MoveKind::Castle(castling_side) = self.move_kind {
            castling_side.symbol().to_string()
        } else {
            match letter {
                Some(letter) => format!("{letter}{}", self.to),
                None => self.to.to_string(),
            }
        }
    }

    /// Returns the piece kind of the captured piece, if any.
    pub fn captured(&self) -> Option<PieceKind> {
        match self.move_kind {
            MoveKind::Capture(piece_kind) => Some(piece_kind),
            MoveKind::EnPassant => Some(PieceKind::Pawn),
            MoveKind::Quiet | MoveKind::Castle(_) => None,
        }
    }
}
