//! Составные пробы поверх [`PhysicsWorld`]: стены, земля, видимость, атака
//!
//! Многолучевые проверки дают вердикт по простому большинству — один луч
//! слишком хрупок на тонких краях тайлов.

use bevy::prelude::*;

use super::{LayerMask, PhysicsWorld};
use crate::components::{ResolvedAttackShape, SightPolicy};

const RAY_EPSILON: f32 = 1e-3;

/// Вертикальный веер точек: `count` смещений в пределах ±spread/2
fn fan_offsets(count: u32, spread: f32) -> Vec<f32> {
    let count = count.max(1);
    if count == 1 || spread <= 0.0 {
        return vec![0.0];
    }
    (0..count)
        .map(|i| -spread * 0.5 + spread * i as f32 / (count - 1) as f32)
        .collect()
}

/// Стена впереди: веер горизонтальных лучей, вердикт по большинству
pub fn wall_ahead(
    world: &PhysicsWorld,
    origin: Vec2,
    dir_sign: f32,
    distance: f32,
    rays: u32,
    spread: f32,
    exclude: Entity,
) -> bool {
    let dir = Vec2::new(dir_sign.signum(), 0.0);
    let offsets = fan_offsets(rays, spread);

    let blocked = offsets
        .iter()
        .filter(|off| {
            world
                .raycast_first(
                    origin + Vec2::new(0.0, **off),
                    dir,
                    distance,
                    LayerMask::GROUND,
                    Some(exclude),
                )
                .is_some()
        })
        .count();

    blocked * 2 > offsets.len()
}

/// Земля под ногами (короткий луч вниз от нижней кромки коллайдера)
pub fn ground_below(world: &PhysicsWorld, bottom_center: Vec2, distance: f32, exclude: Entity) -> bool {
    world
        .raycast_first(
            bottom_center,
            -Vec2::Y,
            distance,
            LayerMask::GROUND,
            Some(exclude),
        )
        .is_some()
}

/// Line of sight от точки глаз до цели
///
/// Перекрытием считается любое попадание не в саму цель. Multi-ray вариант
/// целится в несколько точек по высоте коллайдера цели и принимает вердикт
/// по большинству — точность меняем на устойчивость к частичному перекрытию.
/// Цели без тела в мире не видны (коллаборатор ещё не готов).
pub fn line_of_sight(
    world: &PhysicsWorld,
    origin: Vec2,
    observer: Entity,
    target: Entity,
    policy: SightPolicy,
) -> bool {
    let Some(body) = world.body(target) else {
        return false;
    };

    let sample_points: Vec<Vec2> = match policy {
        SightPolicy::SingleRay => vec![body.center],
        SightPolicy::MultiRay { rays } => {
            let rays = rays.max(1);
            // Точки чуть внутри коллайдера, чтобы не целиться ровно в кромку
            let span = body.half_extents.y * 0.9;
            fan_offsets(rays, span * 2.0)
                .into_iter()
                .map(|off| body.center + Vec2::new(0.0, off))
                .collect()
        }
    };

    let mask = LayerMask::GROUND | LayerMask::PLAYER | LayerMask::ENEMY;
    let clear = sample_points
        .iter()
        .filter(|point| {
            let to_point = **point - origin;
            let dist = to_point.length();
            if dist < RAY_EPSILON {
                return true;
            }
            match world.raycast_first(origin, to_point, dist, mask, Some(observer)) {
                // Первым задели саму цель — путь свободен
                Some(hit) => hit.entity == Some(target),
                // До точки вообще ничего нет (луч закончился внутри цели)
                None => true,
            }
        })
        .count();

    clear * 2 > sample_points.len()
}

/// Цели, накрытые формой атаки
pub fn attack_targets(
    world: &PhysicsWorld,
    shape: &ResolvedAttackShape,
    mask: LayerMask,
    attacker: Entity,
) -> Vec<Entity> {
    match *shape {
        ResolvedAttackShape::Circle { center, radius } => {
            world.overlap_circle(center, radius, mask, Some(attacker))
        }
        ResolvedAttackShape::Box {
            center,
            size,
            angle_deg,
        } => world.overlap_box(center, size, angle_deg, mask, Some(attacker)),
    }
}
