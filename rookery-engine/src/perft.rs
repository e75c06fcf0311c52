//! Performance Test
//!
//! [Perft](https://www.chessprogramming.org/Perft)
//!
//! A simple debugging and testing function used to count
//! the number of nodes at a specific depth.
//!
//! Under automatic promotion a promoting move counts once, not once per
//! promotable kind. Counts match the published tables until promotions appear.

use std::ops::{Add, AddAssign};
use std::panic;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use crate::coretypes::Move;
use crate::error;
use crate::game::Game;

/// Depth of a perft run, in plies.
pub type PlyKind = u8;

/// Debugging information about results of perft test.
/// nodes: Number of nodes at lowest depth of perft.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PerftInfo {
    pub nodes: u64,
}

impl PerftInfo {
    fn new(nodes: u64) -> Self {
        PerftInfo { nodes }
    }
}

impl Add for PerftInfo {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        PerftInfo {
            nodes: self.nodes + rhs.nodes,
        }
    }
}

impl AddAssign for PerftInfo {
    fn add_assign(&mut self, rhs: Self) {
        self.nodes += rhs.nodes;
    }
}

// Count the number of nodes at a certain depth.
// This ignores higher terminal nodes.
// In other words, it counts the number of paths to the given depth.
pub fn perft(game: &Game, ply: PlyKind, threads: usize) -> error::Result<PerftInfo> {
    let mut game = game.clone();
    // Guard easy to calculate inputs.
    if ply == 0 {
        // Ever only 1 position at 0 ply.
        return Ok(PerftInfo::new(1));
    } else if ply <= 2 || threads <= 1 {
        // Simple enough to not require threads, or single threaded.
        return perft_recurse(&mut game, ply);
    }

    let legal_moves = game.legal_moves()?;
    // Guard no moves to search.
    if legal_moves.is_empty() {
        return Ok(PerftInfo::new(0));
    }

    let legal_moves = Arc::new(Mutex::new(legal_moves));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let game = game.clone();
            let legal_moves = legal_moves.clone();
            thread::spawn(move || perft_executor(game, ply, legal_moves))
        })
        .collect();

    let mut total = PerftInfo::new(0);
    for handle in handles {
        total += handle.join().unwrap_or_else(|err| panic::resume_unwind(err))?;
    }
    Ok(total)
}

/// perft_executor works by stealing one move at a time from given moves list and running perft on that move.
/// When there are no moves left to steal, it returns the nodes it counted.
/// params:
/// game - game to play moves on.
/// ply - ply of provided game. Must be greater than 1.
/// moves - synchronous access to list of moves to steal from. Moves must be legal for given game.
fn perft_executor(
    game: Game,
    ply: PlyKind,
    moves: Arc<Mutex<Vec<Move>>>,
) -> error::Result<PerftInfo> {
    debug_assert!(ply > 1);
    let steal = || moves.lock().unwrap_or_else(PoisonError::into_inner).pop();
    let mut perft_info = PerftInfo::new(0);

    while let Some(move_) = steal() {
        let mut child = game.clone();
        child.apply_turn(Some(move_))?;
        perft_info += perft_recurse(&mut child, ply - 1)?;
    }
    Ok(perft_info)
}

/// Ply must be non-zero.
fn perft_recurse(game: &mut Game, ply: PlyKind) -> error::Result<PerftInfo> {
    debug_assert_ne!(ply, 0);
    let legal_moves = game.legal_moves()?;
    if ply == 1 {
        // If we reach the depth before the end,
        // return the count of legal moves.
        return Ok(PerftInfo::new(legal_moves.len() as u64));
    }

    let mut perft_info = PerftInfo::new(0);
    for legal_move in legal_moves {
        let mut child = game.clone();
        child.apply_turn(Some(legal_move))?;
        perft_info += perft_recurse(&mut child, ply - 1)?;
    }
    Ok(perft_info)
}
