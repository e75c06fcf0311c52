//! Game
//!
//! Tests for promotion policies, seeded play and the game's public record.

use rookery_engine::coretypes::{Coordinate, PieceKind::*, Side::*};
use rookery_engine::*;

fn sq(location: &str) -> Coordinate {
    location.parse().unwrap()
}

/// White pawn one step from promoting, with a rook to capture on a8.
fn promotion_game(config: GameConfig) -> Game {
    let mut position = Position::empty();
    for (kind, side, location) in [
        (King, White, "e1"),
        (Pawn, White, "b7"),
        (Rook, Black, "a8"),
        (King, Black, "h7"),
    ] {
        position.insert(Piece::new(kind, side, sq(location))).unwrap();
    }
    Game::from_position(position, White, config).unwrap()
}

fn manual() -> GameConfig {
    GameConfig {
        promotion: PromotionPolicy {
            auto: false,
            default_kind: Queen,
        },
        ..Default::default()
    }
}

fn seeded(seed: u64) -> GameConfig {
    GameConfig {
        seed: Some(seed),
        ..Default::default()
    }
}

#[inline(always)]
fn promotion_tester(config: GameConfig, move_: &str, expected: PieceKind) -> Game {
    let mut game = promotion_game(config);
    let info = game.apply_turn(Some(move_.parse().unwrap())).unwrap().unwrap();
    assert_eq!(info.promotion(), Some(expected));
    assert_eq!(info.piece_kind(), Pawn);

    let position = game.position();
    let promoted = position.piece_at(info.to()).unwrap();
    assert_eq!(position[promoted].kind(), expected);
    assert_eq!(position[promoted].side(), White);
    assert!(position[promoted].has_moved());
    assert!(position.player(White).pieces().contains(&promoted));
    assert!(position.is_consistent());
    game
}

#[test]
fn auto_promotion_to_queen() {
    let game = promotion_tester(GameConfig::default(), "b7b8", Queen);
    assert_eq!(game.history_text(" "), "1. b8+Q");
    // Queen on b8 sees h8 but not h7.
    assert!(!game.in_check(Black));
}

#[test]
fn auto_promotion_ignores_choice() {
    promotion_tester(GameConfig::default(), "b7b8n", Queen);
}

#[test]
fn manual_promotion_uses_choice() {
    let game = promotion_tester(manual(), "b7b8n", Knight);
    assert_eq!(game.history().last().unwrap().notation, "b8+N");
    promotion_tester(manual(), "b7b8r", Rook);
}

#[test]
fn manual_promotion_falls_back_to_default() {
    let mut config = manual();
    config.promotion.default_kind = Bishop;
    promotion_tester(config, "b7b8", Bishop);
}

#[test]
fn capture_with_promotion() {
    let game = promotion_tester(GameConfig::default(), "b7a8", Queen);
    let info = game.history().last().unwrap().info;
    assert_eq!(info.move_kind(), MoveKind::Capture(Rook));
    assert_eq!(game.history().last().unwrap().notation, "a8+Q");
    assert_eq!(game.player(White).captured_value(game.position()), 5);
}

#[test]
fn manual_promotion_lists_every_kind() {
    let mut game = promotion_game(manual());
    let promotions: Vec<Move> = game
        .legal_moves()
        .unwrap()
        .into_iter()
        .filter(|move_| move_.from() == sq("b7"))
        .collect();
    // Two destinations, four kinds each.
    assert_eq!(promotions.len(), 8);
    assert!(promotions.contains(&"b7a8n".parse().unwrap()));

    let mut game = promotion_game(GameConfig::default());
    let promotions = game
        .legal_moves()
        .unwrap()
        .into_iter()
        .filter(|move_| move_.from() == sq("b7"))
        .count();
    assert_eq!(promotions, 2);
}

#[test]
fn black_promotes_on_first_rank() {
    let mut position = Position::empty();
    for (kind, side, location) in [
        (King, White, "e3"),
        (Rook, White, "a1"),
        (Pawn, Black, "b2"),
        (King, Black, "h8"),
    ] {
        position.insert(Piece::new(kind, side, sq(location))).unwrap();
    }

    let mut game = Game::from_position(position.clone(), Black, GameConfig::default()).unwrap();
    let info = game.apply_turn(Some("b2b1".parse().unwrap())).unwrap().unwrap();
    assert_eq!(info.promotion(), Some(Queen));
    assert_eq!(game.history_text(" "), "1. ... b1+Q");
    let promoted = game.position().piece_at(sq("b1")).unwrap();
    assert_eq!(game.position()[promoted].kind(), Queen);
    assert_eq!(game.position()[promoted].side(), Black);
    assert!(game.position().piece_at(sq("b2")).is_none());

    let mut game = Game::from_position(position, Black, manual()).unwrap();
    let info = game.apply_turn(Some("b2a1n".parse().unwrap())).unwrap().unwrap();
    assert_eq!(info.move_kind(), MoveKind::Capture(Rook));
    assert_eq!(info.promotion(), Some(Knight));
    assert_eq!(game.history().last().unwrap().notation, "a1+N");
    let position = game.position();
    let promoted = position.piece_at(sq("a1")).unwrap();
    assert_eq!((position[promoted].kind(), position[promoted].side()), (Knight, Black));
    assert_eq!(position.player(Black).captured_value(position), 5);
    assert!(position.is_consistent());
}

#[test]
fn rejected_promotion_leaves_position_untouched() {
    let mut position = Position::empty();
    for (kind, side, location) in [
        (King, White, "e1"),
        (Pawn, White, "b7"),
        (Pawn, White, "g2"),
        (King, Black, "h7"),
    ] {
        position.insert(Piece::new(kind, side, sq(location))).unwrap();
    }
    let mut game = Game::from_position(position, White, manual()).unwrap();
    for move_ in ["g2g4", "h7h6"] {
        game.apply_turn(Some(move_.parse().unwrap())).unwrap();
    }
    let ghost = game.position().piece_at(sq("g3")).unwrap();
    assert!(game.position()[ghost].is_ghost());
    let before = game.position().clone();

    for kind in [Pawn, King] {
        let move_ = Move::new(sq("b7"), sq("b8"), Some(kind));
        let err = game.apply_turn(Some(move_)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoSuchMove);
        assert_eq!(game.position(), &before);
        assert_eq!(game.side_to_move(), White);
        assert_eq!(game.history().len(), 2);
    }

    let info = game.apply_turn(Some("b7b8r".parse().unwrap())).unwrap().unwrap();
    assert_eq!(info.promotion(), Some(Rook));
    assert!(game.position().piece_at(sq("g3")).is_none());
    assert!(game.position().is_consistent());
}

#[test]
fn unpromotable_default_fails_construction() {
    let mut config = manual();
    config.promotion.default_kind = Pawn;
    assert_eq!(Game::new(config).unwrap_err().kind(), ErrorKind::IllegalOperation);

    let mut position = Position::empty();
    position.insert(Piece::new(King, White, sq("e1"))).unwrap();
    position.insert(Piece::new(King, Black, sq("e8"))).unwrap();
    let err = Game::from_position(position, White, config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalOperation);
}

#[test]
fn seeded_games_replay_identically() {
    let mut first = Game::new(seeded(42)).unwrap();
    let mut second = Game::new(seeded(42)).unwrap();
    for _ in 0..80 {
        let a = first.apply_turn(None);
        let b = second.apply_turn(None);
        match (a, b) {
            (Ok(a), Ok(b)) => assert_eq!(a, b),
            (Err(a), Err(b)) => assert_eq!(a.kind(), b.kind()),
            _ => panic!("seeded games diverged"),
        }
    }
    assert_eq!(first.history(), second.history());
    assert_eq!(first.position(), second.position());

    // Reset reseeds, so the same game is played again.
    let history = first.history().to_vec();
    first.reset();
    for _ in 0..history.len() {
        first.apply_turn(None).unwrap();
    }
    assert_eq!(first.history(), history.as_slice());
}

#[test]
fn games_are_independent_values() {
    let mut game = Game::new(seeded(9)).unwrap();
    game.apply_turn(Some("e2e4".parse().unwrap())).unwrap();
    let snapshot = game.clone();
    game.apply_turn(Some("e7e5".parse().unwrap())).unwrap();

    assert_eq!(snapshot.history().len(), 1);
    assert_eq!(snapshot.side_to_move(), Black);
    assert_eq!(game.side_to_move(), White);
    assert_eq!(game.move_number(), 2);

    let handle = std::thread::spawn(move || snapshot.history_text(" "));
    assert_eq!(handle.join().unwrap(), "1. e4");
}

#[test]
fn captures_are_recorded() {
    let mut game = Game::default();
    for move_ in ["e2e4", "d7d5", "e4d5", "d8d5", "b1c3"] {
        game.apply_turn(Some(move_.parse().unwrap())).unwrap();
    }
    assert_eq!(game.history_text("\n"), "1. e4 d5\n2. exd5 Qxd5\n3. Nc3");
    let position = game.position();
    assert_eq!(position.player(White).captured_value(position), 1);
    assert_eq!(position.player(Black).captured_value(position), 1);
    assert_eq!(position.player(White).captured().len(), 1);
    assert_eq!(position.player(White).pieces().len(), 15);
    assert_eq!(position.player(Black).pieces().len(), 15);
}

#[test]
fn from_position_needs_both_kings() {
    let mut position = Position::empty();
    position.insert(Piece::new(King, White, sq("e1"))).unwrap();
    let err = Game::from_position(position, White, GameConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalOperation);
}

#[test]
fn explicit_move_must_belong_to_side_to_move() {
    let mut game = Game::default();
    let err = game.apply_turn(Some("e7e5".parse().unwrap())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoSuchMove);
    assert_eq!(game.side_to_move(), White);
    assert!(game.history().is_empty());
}
