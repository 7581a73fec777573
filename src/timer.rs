use glam::Vec2;

/// Smallest deadline a timed state may draw. Keeps zero-length ranges from
/// producing a deadline that is already expired at entry.
pub const MIN_DEADLINE: f32 = 1.0e-3;

/// Monotonic simulation clock in seconds, advanced once per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimClock {
    now: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn advance(&mut self, dt: f32) {
        self.now += dt as f64;
    }
}

/// Elapsed time against a deadline drawn when the timer started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateTimer {
    pub elapsed: f32,
    pub deadline: f32,
}

impl StateTimer {
    pub fn start(deadline: f32) -> Self {
        Self {
            elapsed: 0.0,
            deadline: deadline.max(MIN_DEADLINE),
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    pub fn expired(&self) -> bool {
        self.elapsed >= self.deadline
    }

    pub fn remaining(&self) -> f32 {
        (self.deadline - self.elapsed).max(0.0)
    }
}

/// Uniform draw in `[min, max]`. Degenerate ranges return `min`.
pub fn range_f32(rng: &mut fastrand::Rng, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    min + rng.f32() * (max - min)
}

/// Bernoulli trial. `p <= 0` never fires, `p >= 1` always does.
pub fn chance(rng: &mut fastrand::Rng, p: f32) -> bool {
    rng.f32() < p
}

/// Uniform point inside the unit disc.
pub fn inside_unit_circle(rng: &mut fastrand::Rng) -> Vec2 {
    let angle = rng.f32() * std::f32::consts::TAU;
    let r = rng.f32().sqrt();
    Vec2::new(angle.cos(), angle.sin()) * r
}
