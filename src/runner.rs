//! Batch execution of simulated games. One `BatchRunner` drives a fixed
//! matchup for a fixed number of rounds; hosts may run it to completion or
//! step it game by game to interleave with other work.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::games::skipbo::{EventKind, EventSink, GameResult, SkipBoGame, Strategy};

/// Running totals over a set of finished games. Folding results in is
/// commutative, so chunked or out-of-order accumulation gives the same
/// summary as one large batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub games: u32,
    pub wins_p1: u32,
    pub wins_p2: u32,
    pub ties: u32,
    pub total_turns: u64,
    pub total_wilds: u64,
    pub results: Vec<GameResult>,
}

impl BatchSummary {
    pub fn record(&mut self, result: GameResult) {
        self.games += 1;
        match result.winner {
            Some(0) => self.wins_p1 += 1,
            Some(_) => self.wins_p2 += 1,
            None => self.ties += 1,
        }
        self.total_turns += result.turns as u64;
        self.total_wilds += result.wilds_played as u64;
        self.results.push(result);
    }

    pub fn merge(&mut self, other: BatchSummary) {
        self.games += other.games;
        self.wins_p1 += other.wins_p1;
        self.wins_p2 += other.wins_p2;
        self.ties += other.ties;
        self.total_turns += other.total_turns;
        self.total_wilds += other.total_wilds;
        self.results.extend(other.results);
    }

    pub fn win_rate_p1(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.wins_p1 as f64 / self.games as f64
    }

    pub fn average_turns(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.games as f64
    }

    pub fn average_wilds(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_wilds as f64 / self.games as f64
    }

    /// Turn counts of every recorded game, for distribution statistics.
    pub fn turn_series(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.turns as f64).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRunner {
    pub strategy_p1: Strategy,
    pub strategy_p2: Strategy,
    pub target_games: u32,
    pub summary: BatchSummary,
}

impl BatchRunner {
    pub fn new(strategy_p1: Strategy, strategy_p2: Strategy, target_games: u32) -> Self {
        Self {
            strategy_p1,
            strategy_p2,
            target_games,
            summary: BatchSummary::default(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.summary.games >= self.target_games
    }

    /// Runs a single game and folds its result into the summary. Returns the
    /// result, or None when the batch target has been reached. Stopping
    /// between calls leaves the summary intact, so hosts may cancel a long
    /// batch at any game boundary.
    pub fn run_next(
        &mut self,
        rng: &mut impl Rng,
        sink: &mut dyn EventSink,
    ) -> Option<GameResult> {
        if self.is_finished() {
            return None;
        }
        if self.summary.games == 0 {
            sink.emit(
                EventKind::Start,
                &format!(
                    "Starting {} rounds: {} vs {}.",
                    self.target_games,
                    self.strategy_p1.label(),
                    self.strategy_p2.label()
                ),
            );
        }
        let mut game = SkipBoGame::new(self.strategy_p1, self.strategy_p2);
        let result = game.run(rng, sink);
        self.summary.record(result.clone());
        Some(result)
    }

    /// Drops all accumulated results and starts the batch over.
    pub fn reset(&mut self, sink: &mut dyn EventSink) {
        self.summary = BatchSummary::default();
        sink.emit(EventKind::Reset, "Simulation reset. Ready to restart.");
    }
}

/// Convenience wrapper: runs the whole batch in one call.
pub fn run_batch(
    strategy_p1: Strategy,
    strategy_p2: Strategy,
    count: u32,
    rng: &mut impl Rng,
    sink: &mut dyn EventSink,
) -> BatchSummary {
    let mut runner = BatchRunner::new(strategy_p1, strategy_p2, count);
    while runner.run_next(rng, sink).is_some() {}
    runner.summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::skipbo::NullSink;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_batch_accounts_for_every_game() {
        let mut rng = StdRng::seed_from_u64(21);
        let summary = run_batch(
            Strategy::Optimiert,
            Strategy::Zufall,
            30,
            &mut rng,
            &mut NullSink,
        );
        assert_eq!(summary.games, 30);
        assert_eq!(summary.results.len(), 30);
        assert_eq!(summary.wins_p1 + summary.wins_p2 + summary.ties, 30);
        assert!(summary.total_turns > 0);
    }

    #[test]
    fn test_stepped_execution_matches_target() {
        let mut rng = StdRng::seed_from_u64(22);
        let mut runner = BatchRunner::new(Strategy::Spontan, Strategy::Fortgeschritten, 10);
        let mut steps = 0;
        while runner.run_next(&mut rng, &mut NullSink).is_some() {
            steps += 1;
            assert_eq!(runner.summary.games, steps);
        }
        assert!(runner.is_finished());
        assert_eq!(steps, 10);
        assert!(runner.run_next(&mut rng, &mut NullSink).is_none());
    }

    #[test]
    fn test_merge_is_commutative() {
        let mut rng = StdRng::seed_from_u64(23);
        let a = run_batch(
            Strategy::Optimiert,
            Strategy::Spontan,
            8,
            &mut rng,
            &mut NullSink,
        );
        let b = run_batch(
            Strategy::Optimiert,
            Strategy::Spontan,
            8,
            &mut rng,
            &mut NullSink,
        );

        let mut ab = a.clone();
        ab.merge(b.clone());
        let mut ba = b;
        ba.merge(a);

        assert_eq!(ab.games, ba.games);
        assert_eq!(ab.wins_p1, ba.wins_p1);
        assert_eq!(ab.wins_p2, ba.wins_p2);
        assert_eq!(ab.ties, ba.ties);
        assert_eq!(ab.total_turns, ba.total_turns);
        assert_eq!(ab.total_wilds, ba.total_wilds);
        assert_eq!(ab.games as usize, ab.results.len());
    }

    #[test]
    fn test_single_games_sum_like_a_batch() {
        // Same seed, same matchup: per-game stepping and the one-shot batch
        // consume the RNG identically and land on identical totals.
        let batched = {
            let mut rng = StdRng::seed_from_u64(24);
            run_batch(
                Strategy::Zufall,
                Strategy::Zufall,
                12,
                &mut rng,
                &mut NullSink,
            )
        };
        let stepped = {
            let mut rng = StdRng::seed_from_u64(24);
            let mut summary = BatchSummary::default();
            for _ in 0..12 {
                let mut game = SkipBoGame::new(Strategy::Zufall, Strategy::Zufall);
                summary.record(game.run(&mut rng, &mut NullSink));
            }
            summary
        };
        assert_eq!(batched.wins_p1, stepped.wins_p1);
        assert_eq!(batched.wins_p2, stepped.wins_p2);
        assert_eq!(batched.total_turns, stepped.total_turns);
        assert_eq!(batched.total_wilds, stepped.total_wilds);
    }

    #[test]
    fn test_reset_clears_summary() {
        let mut rng = StdRng::seed_from_u64(25);
        let mut runner = BatchRunner::new(Strategy::Optimiert, Strategy::Optimiert, 3);
        while runner.run_next(&mut rng, &mut NullSink).is_some() {}
        runner.reset(&mut NullSink);
        assert_eq!(runner.summary.games, 0);
        assert!(runner.summary.results.is_empty());
        assert!(!runner.is_finished());
    }
}
