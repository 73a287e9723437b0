//! Kinematic-слой: гравитация, ground check, интеграция velocity
//!
//! Полноценная физика — снаружи; здесь ровно столько, чтобы headless-арена
//! вела себя как 2D-платформер: тела прижаты к полу, velocity интегрируем
//! сами в Transform.

use bevy::prelude::*;

use crate::ai::Frozen;
use crate::components::{BodyCollider, KinematicBody};
use crate::world::{probe, PhysicsWorld};

/// Платформерная гравитация (м/с²), намеренно злее земной
const GRAVITY: f32 = -25.0;

/// Запас ground probe под нижней кромкой коллайдера
const GROUND_PROBE_DISTANCE: f32 = 0.1;

/// Система: ground check (луч вниз от нижней кромки)
pub fn update_grounded(
    physics: Res<PhysicsWorld>,
    mut query: Query<(Entity, &Transform, &BodyCollider, &mut KinematicBody)>,
) {
    for (entity, transform, collider, mut body) in query.iter_mut() {
        let center = collider.center(transform.translation.truncate());
        let bottom = center - Vec2::new(0.0, collider.half_extents.y - 0.02);
        body.grounded = probe::ground_below(&physics, bottom, GROUND_PROBE_DISTANCE, entity);
    }
}

/// Система: гравитация к velocity; на земле вертикаль гасится
pub fn apply_gravity(time: Res<Time<Fixed>>, mut query: Query<&mut KinematicBody>) {
    let delta = time.delta_secs();

    for mut body in query.iter_mut() {
        if body.grounded {
            if body.velocity.y < 0.0 {
                body.velocity.y = 0.0;
            }
        } else {
            body.velocity.y += GRAVITY * delta;
        }
    }
}

/// Система: заморозка глушит любое движение, состояние не трогает
pub fn suppress_frozen_motion(mut query: Query<&mut KinematicBody, With<Frozen>>) {
    for mut body in query.iter_mut() {
        body.velocity = Vec2::ZERO;
    }
}

/// Система: интеграция velocity → Transform (position += velocity * dt)
pub fn integrate_velocity(
    time: Res<Time<Fixed>>,
    mut query: Query<(&KinematicBody, &mut Transform)>,
) {
    let delta = time.delta_secs();

    for (body, mut transform) in query.iter_mut() {
        transform.translation += body.velocity.extend(0.0) * delta;
    }
}
