pub mod board;
pub mod check;
pub mod coretypes;
pub mod error;
pub mod game;
pub mod movegen;
pub mod perft;
pub mod pieces;
pub mod player;
pub mod position;

pub use coretypes::{Coordinate, Move, MoveInfo, MoveKind, PieceKind, Side};
pub use error::{Error, ErrorKind};
pub use game::{Game, GameConfig, GameState, Outcome, PromotionPolicy};
pub use pieces::{Piece, PieceId};
pub use player::Strategy;
pub use position::Position;
