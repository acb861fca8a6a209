//! Synchronous random playouts. Used by the playout runner and the law tests.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::engine::models::Seat;
use crate::engine::plugin::TurnBasedGame;
use crate::error::GameError;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayoutOutcome {
    pub seed: u64,
    pub moves: usize,
    pub passes: usize,
    pub winner: Option<Seat>,
    pub captures: usize,
    /// Stopped by `max_actions` before anyone won.
    pub capped: bool,
    /// Times undo failed to restore the exact prior state.
    pub undo_violations: usize,
    pub duration_ms: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct PlayoutParams {
    pub max_actions: usize,
    /// Undo and replay every move, then unwind the whole game at the end,
    /// comparing snapshots each time.
    pub check_undo: bool,
}

impl Default for PlayoutParams {
    fn default() -> Self {
        Self {
            max_actions: 400,
            check_undo: true,
        }
    }
}

/// Play uniformly random legal moves until the game ends or the action cap is
/// reached. Seats with no legal move pass.
pub fn random_playout<G: TurnBasedGame>(
    game: &mut G,
    seed: u64,
    params: PlayoutParams,
) -> Result<PlayoutOutcome, GameError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let t0 = Instant::now();
    let initial = game.snapshot();
    let start_material = game.material();

    let mut moves = 0;
    let mut passes = 0;
    let mut undo_violations = 0;

    while !game.is_over() && moves + passes < params.max_actions {
        let legal = game.legal_moves();
        let Some(mv) = legal.choose(&mut rng).cloned() else {
            game.pass();
            passes += 1;
            continue;
        };

        if params.check_undo {
            let before = game.snapshot();
            if game.play(&mv)? {
                game.undo();
                if game.snapshot() != before {
                    undo_violations += 1;
                    tracing::warn!(seed, step = moves + passes, "undo did not restore the previous state");
                }
            }
        }

        if game.play(&mv)? {
            moves += 1;
        } else {
            tracing::warn!(seed, seat = game.current_seat(), "listed move was refused, passing");
            game.pass();
            passes += 1;
        }
    }

    let winner = game.winner();
    let captures = start_material.saturating_sub(game.material());
    let capped = winner.is_none();

    if params.check_undo {
        while game.undo() {}
        if game.snapshot() != initial {
            undo_violations += 1;
            tracing::warn!(seed, "unwinding the game did not restore the initial state");
        }
    }

    let outcome = PlayoutOutcome {
        seed,
        moves,
        passes,
        winner,
        captures,
        capped,
        undo_violations,
        duration_ms: t0.elapsed().as_secs_f64() * 1000.0,
    };
    tracing::debug!(
        seed,
        moves,
        passes,
        captures,
        winner = ?outcome.winner,
        "playout finished"
    );
    Ok(outcome)
}
