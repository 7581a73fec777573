use glam::{Vec2, Vec3};

use crate::collab::{Gait, MoveIntent};
use crate::ecs::components::{AnimalState, Brain, Effects, Mover, Position};

/// Intent magnitude while a distracted animal edges toward its threat.
const DISTRACTED_DAMPING: f32 = 0.5;

/// Intent for the animal's current state. Idle and MakingMess stand still.
pub fn intent_for(brain: &Brain, pos: Vec3) -> MoveIntent {
    let look_target = brain.threat.or(brain.target).unwrap_or(pos);
    let axis = match brain.state {
        AnimalState::Wandering | AnimalState::Herded => {
            brain.target.map_or(Vec2::ZERO, |t| planar_direction(pos, t))
        }
        AnimalState::Distracted => brain
            .threat
            .map_or(Vec2::ZERO, |t| planar_direction(pos, t) * DISTRACTED_DAMPING),
        AnimalState::Idle | AnimalState::MakingMess => Vec2::ZERO,
    };
    MoveIntent {
        axis,
        look_target,
        running: brain.state == AnimalState::Wandering && brain.is_running,
    }
}

/// Forward intents to every animal's locomotion, then sync positions and
/// report motion to the effects sink. Runs after the behavior update so the
/// intent always reflects this tick's state.
pub fn update(world: &mut hecs::World, dt: f32) {
    for (_, (brain, mover, effects, pos)) in
        world.query_mut::<(&Brain, &mut Mover, &mut Effects, &mut Position)>()
    {
        let intent = intent_for(brain, pos.0);
        mover.0.set_intent(intent);
        mover.0.advance(dt);
        pos.0 = mover.0.position();

        let speed = mover.0.velocity().length();
        let gait = if intent.running { Gait::Run } else { Gait::Walk };
        effects.motion(speed, gait);
    }
}

fn planar_direction(from: Vec3, to: Vec3) -> Vec2 {
    Vec2::new(to.x - from.x, to.z - from.z).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::StateTimer;

    fn brain(state: AnimalState) -> Brain {
        let mut b = Brain::new(StateTimer::start(1.0), 0.0);
        b.state = state;
        b
    }

    #[test]
    fn wandering_heads_for_target() {
        let mut b = brain(AnimalState::Wandering);
        b.target = Some(Vec3::new(0.0, 5.0, 4.0));
        b.is_running = true;
        let intent = intent_for(&b, Vec3::ZERO);
        assert!((intent.axis - Vec2::new(0.0, 1.0)).length() < 1e-5);
        assert!(intent.running);
    }

    #[test]
    fn distracted_moves_at_half_toward_threat() {
        let mut b = brain(AnimalState::Distracted);
        b.threat = Some(Vec3::new(-3.0, 0.0, 0.0));
        b.is_running = true;
        let intent = intent_for(&b, Vec3::ZERO);
        assert!((intent.axis - Vec2::new(-0.5, 0.0)).length() < 1e-5);
        assert!(!intent.running);
        assert_eq!(intent.look_target, Vec3::new(-3.0, 0.0, 0.0));
    }

    #[test]
    fn herded_walks() {
        let mut b = brain(AnimalState::Herded);
        b.target = Some(Vec3::X);
        b.is_running = true;
        let intent = intent_for(&b, Vec3::ZERO);
        assert_eq!(intent.axis, Vec2::X);
        assert!(!intent.running);
    }

    #[test]
    fn stationary_states_send_zero() {
        for state in [AnimalState::Idle, AnimalState::MakingMess] {
            let mut b = brain(state);
            b.target = Some(Vec3::X);
            assert_eq!(intent_for(&b, Vec3::ZERO).axis, Vec2::ZERO);
        }
    }
}
