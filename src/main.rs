//! Self-play driver for the Rookery engine.
//!
//! Plays uniformly random turns for both sides until the game finishes or the
//! turn limit is reached, then prints the move history and the outcome.
//! Set `RUST_LOG=debug` to follow captures, checks and promotions.

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use rookery_engine::coretypes::PieceKind;
use rookery_engine::{Game, GameConfig, GameState, PromotionPolicy};

#[derive(Parser, Debug)]
#[command(name = "rookery", version, about = "Play a random game of chess against itself")]
struct Args {
    /// Seed of the random source, a random seed is used when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many turns even if the game is not over.
    #[arg(long, default_value_t = 200)]
    max_moves: u32,

    /// Promote using the move's own choice instead of always the default kind.
    #[arg(long)]
    manual_promotion: bool,

    /// Default promotion kind: q, r, b or n.
    #[arg(long, default_value = "q", value_parser = parse_promotion)]
    promote_to: PieceKind,
}

fn parse_promotion(s: &str) -> Result<PieceKind, String> {
    let kind = s.parse::<PieceKind>().map_err(|err| err.to_string())?;
    if kind.is_promotable() {
        Ok(kind)
    } else {
        Err(format!("cannot promote to {s}, expected one of q, r, b, n"))
    }
}

impl Args {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            promotion: PromotionPolicy {
                auto: !self.manual_promotion,
                default_kind: self.promote_to,
            },
            seed: self.seed,
            ..Default::default()
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut game = match Game::new(args.game_config()) {
        Ok(game) => game,
        Err(err) => {
            error!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!("playing up to {} turns", args.max_moves);

    let mut turns = 0;
    while !game.is_finished() && turns < args.max_moves {
        if let Err(err) = game.apply_turn(None) {
            error!("turn {turns} failed: {err}");
            return ExitCode::FAILURE;
        }
        turns += 1;
    }

    println!("{}", game.history_text("\n"));
    match game.state() {
        GameState::Finished(outcome) => println!("{outcome}"),
        GameState::InProgress => println!("unfinished after {turns} turns"),
    }
    ExitCode::SUCCESS
}
