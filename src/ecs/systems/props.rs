use glam::Vec3;

use super::behavior::PendingKnock;
use crate::ecs::components::{Knockable, Position, Velocity};

/// Outward speed given to a prop caught by a mess.
pub const KNOCK_IMPULSE: f32 = 5.0;
/// Per-tick velocity damping.
const FRICTION: f32 = 0.92;
/// Below this speed a prop comes to rest.
const MIN_VELOCITY: f32 = 0.05;

/// Shove each knocked prop away from its mess origin on the ground plane.
/// Props sitting exactly on the origin get a random direction.
pub fn apply_knocks(world: &mut hecs::World, knocks: &[PendingKnock], rng: &mut fastrand::Rng) {
    for knock in knocks {
        let Ok((pos, vel, _)) = world.query_one_mut::<(&Position, &mut Velocity, &Knockable)>(knock.prop)
        else {
            continue;
        };
        let away = Vec3::new(pos.0.x - knock.origin.x, 0.0, pos.0.z - knock.origin.z);
        let dir = away.try_normalize().unwrap_or_else(|| {
            let angle = rng.f32() * std::f32::consts::TAU;
            Vec3::new(angle.cos(), 0.0, angle.sin())
        });
        vel.0 += dir * KNOCK_IMPULSE;
    }
}

/// Integrate prop velocity with friction.
pub fn update(world: &mut hecs::World, dt: f32) {
    for (_, (pos, vel, _)) in world.query_mut::<(&mut Position, &mut Velocity, &Knockable)>() {
        pos.0 += vel.0 * dt;
        vel.0 *= FRICTION;
        if vel.0.length_squared() < MIN_VELOCITY * MIN_VELOCITY {
            vel.0 = Vec3::ZERO;
        }
    }
}
