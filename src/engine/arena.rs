//! Parallel playout runner and its aggregated report.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;

use crate::engine::models::PlayerId;
use crate::engine::plugin::{GameFactory, TurnBasedGame};
use crate::engine::simulator::{random_playout, PlayoutOutcome, PlayoutParams};
use crate::error::GameError;

/// Aggregated results from a batch of playouts.
#[derive(Debug, Clone, Default)]
pub struct PlayoutReport {
    pub num_games: usize,
    pub wins: BTreeMap<PlayerId, usize>,
    /// Games stopped by the action cap.
    pub capped: usize,
    pub lengths: Vec<usize>,
    pub captures: usize,
    pub undo_violations: usize,
    pub game_durations_ms: Vec<f64>,
    pub wall_time_ms: f64,
}

impl PlayoutReport {
    pub fn win_rate(&self, player: &str) -> f64 {
        *self.wins.get(player).unwrap_or(&0) as f64 / self.num_games.max(1) as f64
    }

    pub fn avg_length(&self) -> f64 {
        if self.lengths.is_empty() {
            return 0.0;
        }
        self.lengths.iter().sum::<usize>() as f64 / self.lengths.len() as f64
    }

    /// Wilson score interval for a player's win rate.
    pub fn confidence_interval_95(&self, player: &str) -> (f64, f64) {
        let n = self.num_games;
        if n == 0 {
            return (0.0, 0.0);
        }
        let p = self.win_rate(player);
        let z = 1.96_f64;
        let denom = 1.0 + z * z / n as f64;
        let center = (p + z * z / (2.0 * n as f64)) / denom;
        let margin = z * ((p * (1.0 - p) + z * z / (4.0 * n as f64)) / n as f64).sqrt() / denom;
        ((center - margin).max(0.0), (center + margin).min(1.0))
    }

    fn record(&mut self, outcome: &PlayoutOutcome, winner: Option<PlayerId>) {
        match winner {
            Some(id) => *self.wins.entry(id).or_insert(0) += 1,
            None => self.capped += 1,
        }
        self.lengths.push(outcome.moves);
        self.captures += outcome.captures;
        self.undo_violations += outcome.undo_violations;
        self.game_durations_ms.push(outcome.duration_ms);
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Playout Results ({} games)", self.num_games)];
        lines.push("=".repeat(60));
        for (name, wins) in &self.wins {
            let (ci_lo, ci_hi) = self.confidence_interval_95(name);
            lines.push(format!(
                "  {:>12}: {:4} wins ({:5.1}%)  [95% CI: {:.1}%-{:.1}%]",
                name,
                wins,
                self.win_rate(name) * 100.0,
                ci_lo * 100.0,
                ci_hi * 100.0,
            ));
        }
        lines.push(format!("  {:>12}: {}", "Capped", self.capped));
        lines.push(format!(
            "  Avg length: {:.1} moves  |  Captures: {}  |  Undo violations: {}",
            self.avg_length(),
            self.captures,
            self.undo_violations
        ));
        if !self.game_durations_ms.is_empty() {
            let avg_ms = self.game_durations_ms.iter().sum::<f64>() / self.game_durations_ms.len() as f64;
            lines.push(format!(
                "  Avg game: {:.2}ms  |  Wall: {:.1}s",
                avg_ms,
                self.wall_time_ms / 1000.0
            ));
        }
        lines.join("\n")
    }
}

/// Run `num_games` independent playouts in parallel, one fresh game per task.
/// Game `i` uses seed `base_seed + i`.
pub fn run_playouts<F: GameFactory>(
    factory: &F,
    num_games: usize,
    base_seed: u64,
    params: PlayoutParams,
    progress_callback: Option<&(dyn Fn(usize, usize) + Sync)>,
) -> Result<PlayoutReport, GameError> {
    let t0 = Instant::now();
    let done = AtomicUsize::new(0);

    let results: Vec<Result<(PlayoutOutcome, Option<PlayerId>), GameError>> = (0..num_games)
        .into_par_iter()
        .map(|i| {
            let mut game = factory.create_game()?;
            let outcome = random_playout(&mut game, base_seed + i as u64, params)?;
            let winner = outcome.winner.and_then(|seat| game.player_id(seat).cloned());
            if let Some(cb) = progress_callback {
                cb(done.fetch_add(1, Ordering::Relaxed) + 1, num_games);
            }
            Ok((outcome, winner))
        })
        .collect();

    let mut report = PlayoutReport {
        num_games,
        ..Default::default()
    };
    for result in results {
        let (outcome, winner) = result?;
        report.record(&outcome, winner);
    }
    report.wall_time_ms = t0.elapsed().as_secs_f64() * 1000.0;

    tracing::info!(
        game_id = factory.game_id(),
        games = num_games,
        capped = report.capped,
        undo_violations = report.undo_violations,
        "playouts finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::jungle::JungleFactory;

    #[test]
    fn test_run_playouts_counts_every_game() {
        let factory = JungleFactory::standard();
        let params = PlayoutParams {
            max_actions: 60,
            check_undo: true,
        };
        let report = run_playouts(&factory, 6, 100, params, None).unwrap();
        assert_eq!(report.num_games, 6);
        assert_eq!(report.wins.values().sum::<usize>() + report.capped, 6);
        assert_eq!(report.lengths.len(), 6);
        assert_eq!(report.undo_violations, 0);
        assert!(report.summary().contains("Playout Results (6 games)"));
    }

    #[test]
    fn test_progress_callback_sees_all_games() {
        let factory = JungleFactory::standard();
        let seen = AtomicUsize::new(0);
        let cb: &(dyn Fn(usize, usize) + Sync) = &|_done, total| {
            assert_eq!(total, 4);
            seen.fetch_add(1, Ordering::Relaxed);
        };
        let params = PlayoutParams {
            max_actions: 20,
            check_undo: false,
        };
        run_playouts(&factory, 4, 0, params, Some(cb)).unwrap();
        assert_eq!(seen.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_empty_report() {
        let report = PlayoutReport::default();
        assert_eq!(report.win_rate("p1"), 0.0);
        assert_eq!(report.avg_length(), 0.0);
        assert_eq!(report.confidence_interval_95("p1"), (0.0, 0.0));
    }
}
