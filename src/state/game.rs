use std::time::SystemTime;

/// A yes/no question about a movie poster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Encoded poster image.
    pub image_data: Vec<u8>,
    /// Question shown next to the poster.
    pub text: String,
    /// Whether "yes" is the right answer.
    pub correct_answer: bool,
}

/// Outcome of one completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    /// Questions answered correctly.
    pub correct: u32,
    /// Questions asked during the round.
    pub total: u32,
    /// When the round finished.
    pub played_at: SystemTime,
}

impl GameResult {
    /// Build a result for a round that just finished.
    pub fn new(correct: u32, total: u32, played_at: SystemTime) -> Self {
        Self {
            correct,
            total,
            played_at,
        }
    }

    /// Only the correct count matters; ties keep the earlier result.
    pub fn is_better_than(&self, other: &GameResult) -> bool {
        self.correct > other.correct
    }
}

/// Cumulative statistics across every recorded round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateStatistics {
    /// Rounds completed so far.
    pub games_played: u64,
    /// Correct answers summed over all rounds.
    pub total_correct: u64,
    /// Questions asked summed over all rounds.
    pub total_questions: u64,
    /// Best round recorded so far.
    pub best_game: GameResult,
}

impl AggregateStatistics {
    /// Zeroed statistics, with the (empty) best game dated `now`.
    pub fn empty(now: SystemTime) -> Self {
        Self {
            games_played: 0,
            total_correct: 0,
            total_questions: 0,
            best_game: GameResult::new(0, 0, now),
        }
    }

    /// Fold a finished round into the aggregate.
    ///
    /// Returns the updated aggregate and whether `result` became the new best game.
    pub fn record(self, result: GameResult) -> (Self, bool) {
        let replaces_best = result.is_better_than(&self.best_game);
        let next = Self {
            games_played: self.games_played.saturating_add(1),
            total_correct: self.total_correct.saturating_add(u64::from(result.correct)),
            total_questions: self.total_questions.saturating_add(u64::from(result.total)),
            best_game: if replaces_best {
                result
            } else {
                self.best_game
            },
        };
        (next, replaces_best)
    }

    /// Share of correct answers in percent, `0.0` before any question was asked.
    pub fn accuracy_percent(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        100.0 * self.total_correct as f64 / self.total_questions as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn better_than_is_strict() {
        let first = GameResult::new(7, 10, at(1));
        let tie = GameResult::new(7, 10, at(2));
        let better = GameResult::new(8, 10, at(3));

        assert!(!tie.is_better_than(&first));
        assert!(better.is_better_than(&first));
        assert!(!first.is_better_than(&better));
    }

    #[test]
    fn recording_accumulates_counters() {
        let stats = AggregateStatistics::empty(at(0));
        let (stats, replaced) = stats.record(GameResult::new(7, 10, at(1)));
        assert!(replaced);
        let (stats, replaced) = stats.record(GameResult::new(5, 10, at(2)));
        assert!(!replaced);

        assert_eq!(stats.games_played, 2);
        assert_eq!(stats.total_correct, 12);
        assert_eq!(stats.total_questions, 20);
        assert_eq!(stats.best_game, GameResult::new(7, 10, at(1)));
    }

    #[test]
    fn tie_keeps_first_best_game() {
        let (stats, _) = AggregateStatistics::empty(at(0)).record(GameResult::new(6, 10, at(1)));
        let (stats, replaced) = stats.record(GameResult::new(6, 10, at(2)));

        assert!(!replaced);
        assert_eq!(stats.best_game.played_at, at(1));
    }

    #[test]
    fn zero_score_round_does_not_replace_empty_best() {
        let (stats, replaced) = AggregateStatistics::empty(at(0)).record(GameResult::new(0, 10, at(1)));
        assert!(!replaced);
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.total_questions, 10);
    }

    #[test]
    fn accuracy_handles_empty_and_partial_totals() {
        assert_eq!(AggregateStatistics::empty(at(0)).accuracy_percent(), 0.0);

        let (stats, _) = AggregateStatistics::empty(at(0)).record(GameResult::new(7, 10, at(1)));
        let (stats, _) = stats.record(GameResult::new(5, 10, at(2)));
        assert_eq!(stats.accuracy_percent(), 60.0);
    }
}
