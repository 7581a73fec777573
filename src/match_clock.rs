//! Countdown, match timer, and win condition.

use crate::config::MatchConfig;
use crate::timer::StateTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The ledger reached the win threshold.
    CleanersWin,
    /// Time ran out first.
    AnimalsWin,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::CleanersWin => "Cleaners win",
            Outcome::AnimalsWin => "Animals win",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// Pre-match countdown; the simulation is paused.
    Countdown,
    Running,
    Over(Outcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEvent {
    Started,
    Ended(Outcome),
}

pub struct MatchClock {
    phase: MatchPhase,
    timer: StateTimer,
    duration: f32,
    win_points: i32,
}

impl MatchClock {
    pub fn new(rules: &MatchConfig) -> Self {
        Self {
            phase: MatchPhase::Countdown,
            timer: StateTimer::start(rules.countdown),
            duration: rules.duration,
            win_points: rules.win_points,
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == MatchPhase::Running
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, MatchPhase::Over(_))
    }

    /// Seconds left in the current phase (zero once over).
    pub fn remaining(&self) -> f32 {
        match self.phase {
            MatchPhase::Over(_) => 0.0,
            _ => self.timer.remaining(),
        }
    }

    /// Advance by `dt`. The win threshold is checked before the clock so a
    /// score reached on the final tick still counts.
    pub fn update(&mut self, dt: f32, total_points: i32) -> Option<MatchEvent> {
        match self.phase {
            MatchPhase::Countdown => {
                self.timer.tick(dt);
                if !self.timer.expired() {
                    return None;
                }
                self.phase = MatchPhase::Running;
                self.timer = StateTimer::start(self.duration);
                Some(MatchEvent::Started)
            }
            MatchPhase::Running => {
                if total_points >= self.win_points {
                    return Some(self.finish(Outcome::CleanersWin));
                }
                self.timer.tick(dt);
                if self.timer.expired() {
                    return Some(self.finish(Outcome::AnimalsWin));
                }
                None
            }
            MatchPhase::Over(_) => None,
        }
    }

    fn finish(&mut self, outcome: Outcome) -> MatchEvent {
        self.phase = MatchPhase::Over(outcome);
        MatchEvent::Ended(outcome)
    }
}
