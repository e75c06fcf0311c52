//! Rookery Engine error type.

use std::error;
use std::fmt::{self, Display};
use std::result;

/// Rookery Engine generic result type.
pub type Result<T> = result::Result<T, Error>;

/// A list specifying general errors for Rookery engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Algebraic location text is malformed or names a square off the board.
    InvalidLocation,
    /// A file, rank or grid index lies outside of the 8x8 board.
    OutOfRange,
    /// A requested move is not among the legal moves of the piece.
    NoSuchMove,
    /// The position is in a state the rules cannot operate on, such as a side without a king.
    IllegalOperation,
    /// A turn was requested after the game already reached a terminal state.
    GameFinished,

    /// Piece parse string malformed.
    ParsePieceMalformed,
    /// Move parse string malformed.
    ParseMoveMalformed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidLocation => "invalid location",
            ErrorKind::OutOfRange => "out of range",
            ErrorKind::NoSuchMove => "no such move",
            ErrorKind::IllegalOperation => "illegal operation",
            ErrorKind::GameFinished => "game finished",

            ErrorKind::ParsePieceMalformed => "parse piece malformed",
            ErrorKind::ParseMoveMalformed => "parse move malformed",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The primary and general error type for the Rookery Engine.
#[derive(Debug)]
pub enum Error {
    Simple(ErrorKind),
    Message(ErrorKind, String),
    Custom(ErrorKind, Box<dyn error::Error + Send + Sync>),
}

impl Error {
    pub fn new<E>(error_kind: ErrorKind, inner_error: E) -> Self
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Self::Custom(error_kind, inner_error.into())
    }

    /// Returns the kind of this error, regardless of any attached context.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Simple(error_kind)
            | Error::Message(error_kind, _)
            | Error::Custom(error_kind, _) => *error_kind,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Simple(error_kind) => {
                write!(f, "{error_kind}")
            }
            Error::Message(error_kind, string) => {
                write!(f, "{error_kind}: {string}")
            }
            Error::Custom(error_kind, ref box_error) => {
                write!(f, "{error_kind}, error: {}", *box_error)
            }
        }
    }
}

impl error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(error_kind: ErrorKind) -> Self {
        Self::Simple(error_kind)
    }
}

impl<S: ToString> From<(ErrorKind, S)> for Error {
    fn from((error_kind, stringable): (ErrorKind, S)) -> Self {
        Self::Message(error_kind, stringable.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_survives_context() {
        let simple = Error::from(ErrorKind::NoSuchMove);
        let message = Error::from((ErrorKind::InvalidLocation, "z9"));
        assert_eq!(simple.kind(), ErrorKind::NoSuchMove);
        assert_eq!(message.kind(), ErrorKind::InvalidLocation);
        assert_eq!(message.to_string(), "invalid location: z9");
    }
}
