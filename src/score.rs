/// One mutation of the ledger, kept for score displays to pick up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChange {
    pub delta: i32,
    pub total: i32,
}

/// Team score for the running match. Every mutation goes through
/// [`ScoreLedger::add_points`] so observers see a consistent stream.
#[derive(Debug, Default)]
pub struct ScoreLedger {
    total: i32,
    pending: Vec<ScoreChange>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_points(&mut self, delta: i32) {
        self.total += delta;
        self.pending.push(ScoreChange {
            delta,
            total: self.total,
        });
        log::info!("Score {delta:+} -> {}", self.total);
    }

    pub fn total_points(&self) -> i32 {
        self.total
    }

    pub fn reset(&mut self) {
        self.total = 0;
        self.pending.clear();
    }

    /// Take every change recorded since the last drain, oldest first.
    pub fn drain_changes(&mut self) -> impl Iterator<Item = ScoreChange> + '_ {
        self.pending.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_reset() {
        let mut ledger = ScoreLedger::new();
        ledger.add_points(100);
        ledger.add_points(-50);
        assert_eq!(ledger.total_points(), 50);

        let changes: Vec<_> = ledger.drain_changes().collect();
        assert_eq!(
            changes,
            vec![
                ScoreChange { delta: 100, total: 100 },
                ScoreChange { delta: -50, total: 50 },
            ]
        );
        assert_eq!(ledger.drain_changes().count(), 0);

        ledger.reset();
        assert_eq!(ledger.total_points(), 0);
    }
}
