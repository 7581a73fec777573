/// Below this speed an animal counts as standing still.
const SPEED_THRESHOLD: f32 = 0.1;
/// Smoothing time for animator parameters (seconds).
const SMOOTH_TIME: f32 = 0.1;

/// Smoothed animator parameters for one animal.
///
/// `vertical` is forward speed normalized to the gait's top speed, `gait`
/// blends 0 = walk, 1 = run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationState {
    pub vertical: f32,
    pub gait: f32,
    vertical_vel: f32,
    gait_vel: f32,
}

impl AnimationState {
    pub fn update(&mut self, speed: f32, running: bool, walk_speed: f32, run_speed: f32, dt: f32) {
        let (target_vertical, target_gait) = if speed > SPEED_THRESHOLD {
            let max_speed = if running { run_speed } else { walk_speed };
            let vertical = if max_speed > 0.0 {
                (speed / max_speed).clamp(0.0, 1.0)
            } else {
                0.0
            };
            (vertical, if running { 1.0 } else { 0.0 })
        } else {
            (0.0, 0.0)
        };

        self.vertical = smooth_damp(self.vertical, target_vertical, &mut self.vertical_vel, SMOOTH_TIME, dt);
        self.gait = smooth_damp(self.gait, target_gait, &mut self.gait_vel, SMOOTH_TIME, dt);
    }
}

/// Critically damped spring toward `target`. Never overshoots.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(1.0e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = (output - target) / dt;
    }
    output
}
