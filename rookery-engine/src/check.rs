//! Check detection.

use crate::coretypes::Side;
use crate::error;
use crate::pieces::PieceId;
use crate::player;
use crate::position::Position;

/// Result of asking whether a king is attacked.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Check {
    pub in_check: bool,
    /// Pieces of the attacking side that can move onto the king's square.
    pub attackers: Vec<PieceId>,
}

/// Finds whether defender's king is attacked by any piece of attacker.
///
/// Attacks are the attacker's moves generated without check safety, so a piece
/// pinned against its own king still gives check. The Position is left as it was.
pub fn is_in_check(
    position: &mut Position,
    defender: Side,
    attacker: Side,
) -> error::Result<Check> {
    let king = position.king(defender)?;
    let target = position[king].coordinate();

    let attackers: Vec<PieceId> = player::player_moves(position, attacker, false)?
        .into_iter()
        .filter(|(id, templates)| {
            let origin = position[*id].coordinate();
            templates.iter().any(|t| t.destination(origin) == Some(target))
        })
        .map(|(id, _)| id)
        .collect();

    Ok(Check {
        in_check: !attackers.is_empty(),
        attackers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::{Coordinate, PieceKind::*};
    use crate::error::ErrorKind;
    use crate::pieces::Piece;
    use Side::*;

    fn sq(location: &str) -> Coordinate {
        location.parse().unwrap()
    }

    #[test]
    fn start_position_is_quiet() {
        let mut position = Position::start_position();
        assert_eq!(is_in_check(&mut position, White, Black).unwrap(), Check::default());
        assert!(!is_in_check(&mut position, Black, White).unwrap().in_check);
    }

    #[test]
    fn reports_every_attacker() {
        let mut position = Position::empty();
        position.insert(Piece::new(King, White, sq("e1"))).unwrap();
        position.insert(Piece::new(King, Black, sq("a8"))).unwrap();
        let rook = position.insert(Piece::new(Rook, Black, sq("e7"))).unwrap();
        let knight = position.insert(Piece::new(Knight, Black, sq("d3"))).unwrap();
        position.insert(Piece::new(Bishop, Black, sq("h8"))).unwrap();

        let check = is_in_check(&mut position, White, Black).unwrap();
        assert!(check.in_check);
        assert_eq!(check.attackers, vec![rook, knight]);
    }

    #[test]
    fn pinned_attacker_still_gives_check() {
        let mut position = Position::empty();
        position.insert(Piece::new(King, White, sq("e1"))).unwrap();
        position.insert(Piece::new(Rook, White, sq("c1"))).unwrap();
        position.insert(Piece::new(King, Black, sq("c8"))).unwrap();
        // Pinned along the c file, yet attacks e1 diagonally.
        let bishop = position.insert(Piece::new(Bishop, Black, sq("c3"))).unwrap();
        assert_eq!(is_in_check(&mut position, White, Black).unwrap().attackers, vec![bishop]);
    }

    #[test]
    fn missing_king_is_an_error() {
        let mut position = Position::empty();
        position.insert(Piece::new(King, Black, sq("e8"))).unwrap();
        let err = is_in_check(&mut position, White, Black).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalOperation);
    }
}
