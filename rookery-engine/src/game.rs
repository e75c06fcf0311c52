//! Game structure and the turn state machine.

use std::fmt::{self, Display};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::check;
use crate::coretypes::{Move, MoveCount, MoveInfo, MoveKind, Offset, PieceKind, Side};
use crate::error::{self, ErrorKind};
use crate::movegen;
use crate::pieces::{MoveTemplate, PieceId};
use crate::player::{self, Player, Strategy};
use crate::position::Position;

/// How pawns reaching the farthest rank are promoted.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PromotionPolicy {
    /// Always promote to `default_kind`, ignoring any choice carried by a move.
    pub auto: bool,
    /// Kind used by automatic promotion, and by manual promotion without a choice.
    pub default_kind: PieceKind,
}

impl PromotionPolicy {
    /// Fails unless the default kind is one a pawn may become.
    pub fn validate(&self) -> error::Result<()> {
        if self.default_kind.is_promotable() {
            Ok(())
        } else {
            let message = format!("cannot promote to {:?}", self.default_kind);
            Err((ErrorKind::IllegalOperation, message).into())
        }
    }
}

impl Default for PromotionPolicy {
    fn default() -> Self {
        Self {
            auto: true,
            default_kind: PieceKind::Queen,
        }
    }
}

/// Configuration of a Game.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct GameConfig {
    pub promotion: PromotionPolicy,
    pub strategy: Strategy,
    /// Seed of the random source, None seeds from entropy.
    pub seed: Option<u64>,
}

/// How a finished game ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Outcome {
    Win(Side),
    Draw,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GameState {
    InProgress,
    /// Absorbing, no further turn is accepted.
    Finished(Outcome),
}

/// One committed turn.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HistoryEntry {
    pub move_number: MoveCount,
    pub side: Side,
    pub notation: String,
    pub info: MoveInfo,
}

/// A game of chess between two players.
/// All rules of a turn are applied by `apply_turn`, everything else only reads.
#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    side_to_move: Side,
    move_number: MoveCount,
    state: GameState,
    history: Vec<HistoryEntry>,
    config: GameConfig,
    rng: StdRng,
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl Game {
    /// New game in the standard start position, White to move.
    /// Fails if the promotion policy names a kind a pawn cannot become.
    pub fn new(config: GameConfig) -> error::Result<Self> {
        config.promotion.validate()?;
        Ok(Self::build(Position::start_position(), Side::White, config))
    }

    fn build(position: Position, side_to_move: Side, config: GameConfig) -> Self {
        Self {
            position,
            side_to_move,
            move_number: 1,
            state: GameState::InProgress,
            history: Vec::new(),
            config,
            rng: make_rng(config.seed),
        }
    }

    /// New game continuing from an arbitrary position.
    /// Both sides need a king. Check flags are recomputed for both sides.
    pub fn from_position(
        mut position: Position,
        side_to_move: Side,
        config: GameConfig,
    ) -> error::Result<Self> {
        config.promotion.validate()?;
        for side in Side::ALL {
            position.king(side)?;
        }
        for side in Side::ALL {
            let check = check::is_in_check(&mut position, side, !side)?;
            position.set_in_check(side, check.in_check);
        }

        Ok(Self::build(position, side_to_move, config))
    }

    /// Back to the standard start position with empty history.
    /// The random source is reseeded, so a seeded game replays identically.
    pub fn reset(&mut self) {
        *self = Self::build(Position::start_position(), Side::White, self.config);
    }

    /// Plays one turn for the side to move.
    ///
    /// With an explicit move, that move is played if it is legal, otherwise
    /// `NoSuchMove` is returned and the game is untouched. Without one, the
    /// side's strategy picks the move. If the side has no legal move at all the
    /// game finishes, as a win for the opponent when the side is in check and as
    /// a draw otherwise, and `Ok(None)` is returned.
    pub fn apply_turn(&mut self, explicit: Option<Move>) -> error::Result<Option<MoveInfo>> {
        if let GameState::Finished(outcome) = self.state {
            return Err((ErrorKind::GameFinished, outcome).into());
        }
        let side = self.side_to_move;

        // Everything that can reject an explicit move runs before any mutation.
        let resolved = match explicit {
            Some(move_) => {
                let (id, template) = self.resolve(move_)?;
                let promotion = self.promotion_for(id, template, move_.promotion())?;
                Some((id, template, promotion))
            }
            None => None,
        };

        let discarded = self.position.discard_ghosts(side);
        if discarded > 0 {
            debug!("{side} ghost expired");
        }

        let (id, template, promotion) = match resolved {
            Some(resolved) => resolved,
            None => {
                let strategy = self.config.strategy;
                match player::choose_move(&mut self.position, side, strategy, &mut self.rng)? {
                    Some((id, template)) => (id, template, self.promotion_for(id, template, None)?),
                    None => return self.finish_without_moves().map(|_| None),
                }
            }
        };

        let info = self.commit(id, template, promotion)?;
        Ok(Some(info))
    }

    /// Finds the piece and template an explicit move names.
    fn resolve(&mut self, move_: Move) -> error::Result<(PieceId, MoveTemplate)> {
        let side = self.side_to_move;
        let no_such_move = || error::Error::from((ErrorKind::NoSuchMove, move_));

        let id = self
            .position
            .real_piece_at(move_.from())
            .filter(|&id| self.position[id].side() == side)
            .ok_or_else(no_such_move)?;
        if let Some(kind) = move_.promotion() {
            if !kind.is_promotable() {
                return Err(no_such_move());
            }
        }

        movegen::legal_moves(&mut self.position, id)?
            .into_iter()
            .find(|template| template.destination(move_.from()) == Some(move_.to()))
            .map(|template| (id, template))
            .ok_or_else(no_such_move)
    }

    fn finish_without_moves(&mut self) -> error::Result<()> {
        let side = self.side_to_move;
        let check = check::is_in_check(&mut self.position, side, !side)?;
        let outcome = if check.in_check {
            Outcome::Win(!side)
        } else {
            Outcome::Draw
        };
        self.state = GameState::Finished(outcome);
        info!("{side} has no legal move, {outcome}");
        Ok(())
    }

    /// Kind the piece becomes by playing template, None unless a pawn reaches
    /// the farthest rank.
    fn promotion_for(
        &self,
        id: PieceId,
        template: MoveTemplate,
        choice: Option<PieceKind>,
    ) -> error::Result<Option<PieceKind>> {
        let piece = &self.position[id];
        let promotes = piece.kind() == PieceKind::Pawn
            && template
                .destination(piece.coordinate())
                .map_or(false, |to| to.rank() == piece.side().promotion_rank());
        if promotes {
            self.promotion_kind(choice).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Kind a pawn reaching the farthest rank becomes.
    fn promotion_kind(&self, choice: Option<PieceKind>) -> error::Result<PieceKind> {
        let policy = self.config.promotion;
        let kind = match (policy.auto, choice) {
            (false, Some(kind)) => kind,
            _ => policy.default_kind,
        };
        if kind.is_promotable() {
            Ok(kind)
        } else {
            Err((ErrorKind::NoSuchMove, format!("cannot promote to {kind:?}")).into())
        }
    }

    /// Commits a legal move and closes the turn.
    fn commit(
        &mut self,
        id: PieceId,
        template: MoveTemplate,
        promotion: Option<PieceKind>,
    ) -> error::Result<MoveInfo> {
        let side = self.side_to_move;
        let piece = self.position[id];
        let from = piece.coordinate();
        let to = template
            .destination(from)
            .ok_or_else(|| error::Error::from((ErrorKind::NoSuchMove, template)))?;

        let is_pawn = piece.kind() == PieceKind::Pawn;

        // Captures
        let captures = movegen::resolve_captures(&self.position, &piece, template, to);
        if let Some(ghost) = captures.ghost {
            self.position.detach(ghost);
        }
        let mut move_kind = MoveKind::Quiet;
        if let Some(victim) = captures.victim {
            let victim_kind = self.position[victim].kind();
            self.position.capture(side, victim);
            debug!("{piece} captures {}", self.position[victim]);
            move_kind = if captures.en_passant {
                MoveKind::EnPassant
            } else {
                MoveKind::Capture(victim_kind)
            };
        }

        // Relocation, with the partner rook when castling.
        let castling = template.castling().and_then(|castling_side| {
            movegen::castling_partner(&self.position, id, castling_side)
                .map(|rook| (castling_side, rook))
        });
        player::apply_move(&mut self.position, id, template)?;
        if let Some((castling_side, (rook, rook_to))) = castling {
            self.position.relocate(rook, rook_to);
            self.position.set_moved(rook, true);
            move_kind = MoveKind::Castle(castling_side);
        }

        // Double step leaves a ghost behind.
        let dy = template.offset().dy;
        if is_pawn && dy.abs() == 2 {
            if let Some(skipped) = from.offset(Offset::new(0, dy / 2)) {
                self.position.spawn_ghost(side, skipped);
                debug!("{side} ghost on {skipped}");
            }
        }

        if let Some(kind) = promotion {
            self.position.replace(id, kind);
            debug!("{side} pawn on {to} promoted to {kind:?}");
        }

        // The mover cannot be in check after a legal move.
        self.position.set_in_check(side, false);
        let check = check::is_in_check(&mut self.position, !side, side)?;
        self.position.set_in_check(!side, check.in_check);
        if check.in_check {
            debug!("{} in check by {} piece(s)", !side, check.attackers.len());
        }

        let info = MoveInfo {
            from,
            to,
            piece_kind: piece.kind(),
            move_kind,
            promotion,
        };
        let notation = info.notation();
        info!("{}. {side} {notation}", self.move_number);
        self.history.push(HistoryEntry {
            move_number: self.move_number,
            side,
            notation,
            info,
        });

        self.side_to_move = !side;
        if self.side_to_move == Side::White {
            self.move_number += 1;
        }
        Ok(info)
    }

    /// Every legal move of the side to move.
    /// Under manual promotion, a promoting move is listed once per promotable kind.
    pub fn legal_moves(&mut self) -> error::Result<Vec<Move>> {
        const PROMOTABLE: [PieceKind; 4] = [
            PieceKind::Queen,
            PieceKind::Rook,
            PieceKind::Bishop,
            PieceKind::Knight,
        ];
        let side = self.side_to_move;
        let mut moves = Vec::new();
        for (id, templates) in player::legal_moves(&mut self.position, side)? {
            let piece = &self.position[id];
            let from = piece.coordinate();
            let is_pawn = piece.kind() == PieceKind::Pawn;
            for to in templates.iter().filter_map(|t| t.destination(from)) {
                let promotes = is_pawn && to.rank() == side.promotion_rank();
                if promotes && !self.config.promotion.auto {
                    moves.extend(PROMOTABLE.iter().map(|&kind| Move::new(from, to, Some(kind))));
                } else {
                    moves.push(Move::new(from, to, None));
                }
            }
        }
        Ok(moves)
    }

    /// Destinations of the piece on location, as location text.
    /// Empty for an empty square.
    pub fn legal_destinations(&mut self, location: &str) -> error::Result<Vec<String>> {
        let coordinate = location.parse()?;
        self.position
            .legal_moves_from(coordinate)
            .destinations()
            .map(|destination| destination.map(|coordinate| coordinate.to_string()))
            .collect()
    }

    /// History as numbered lines joined by delimiter, `1. e4 e5`.
    pub fn history_text(&self, delimiter: &str) -> String {
        let mut lines: Vec<String> = Vec::new();
        // Last line holds a White move still waiting for Black's reply.
        let mut open = false;
        for entry in &self.history {
            match (entry.side, lines.last_mut()) {
                (Side::White, _) => {
                    lines.push(format!("{}. {}", entry.move_number, entry.notation));
                    open = true;
                }
                (Side::Black, Some(line)) if open => {
                    line.push(' ');
                    line.push_str(&entry.notation);
                    open = false;
                }
                (Side::Black, _) => {
                    lines.push(format!("{}. ... {}", entry.move_number, entry.notation));
                }
            }
        }
        lines.join(delimiter)
    }

    // Immutable Getters
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }
    pub fn state(&self) -> GameState {
        self.state
    }
    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }
    pub fn move_number(&self) -> MoveCount {
        self.move_number
    }
    pub fn position(&self) -> &Position {
        &self.position
    }
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
    pub fn player(&self, side: Side) -> &Player {
        self.position.player(side)
    }
    pub fn in_check(&self, side: Side) -> bool {
        self.player(side).in_check()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, GameState::Finished(_))
    }

    /// Winning side of a finished game.
    pub fn winner(&self) -> Option<Side> {
        match self.state {
            GameState::Finished(Outcome::Win(side)) => Some(side),
            _ => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.state == GameState::Finished(Outcome::Draw)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::build(Position::start_position(), Side::White, GameConfig::default())
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Win(side) => write!(f, "{side} wins"),
            Outcome::Draw => f.write_str("draw"),
        }
    }
}

impl Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameState::InProgress => f.write_str("in progress"),
            GameState::Finished(outcome) => write!(f, "finished, {outcome}"),
        }
    }
}
