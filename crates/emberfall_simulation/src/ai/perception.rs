//! Восприятие: эллипс обнаружения + line of sight

use bevy::prelude::*;

use crate::ai::PerceptionState;
use crate::components::{Enemy, EnemyConfig};
use crate::world::locator::{locate_center, PrimaryTarget};
use crate::world::{probe, PhysicsWorld};

/// Система: оценка видимости цели для каждого врага
///
/// Видимость = цель внутри эллипса обнаружения И line of sight не перекрыт.
/// Пересчитывается с нуля каждый тик — никакой памяти о прошлом кадре,
/// поэтому пропавшая видимость действует немедленно.
pub fn perceive_targets(
    physics: Res<PhysicsWorld>,
    target: Res<PrimaryTarget>,
    transforms: Query<&Transform>,
    mut enemies: Query<(Entity, &Transform, &EnemyConfig, &mut PerceptionState), With<Enemy>>,
) {
    let target_entity = target.entity;

    for (entity, transform, config, mut perception) in enemies.iter_mut() {
        let visible = match target_entity {
            // Локатор ещё не нашёл игрока — никого не видим
            None => false,
            Some(target_entity) => {
                let position = transform.translation.truncate();
                let center =
                    locate_center(&physics, transforms.get(target_entity).ok(), target_entity);

                match center {
                    None => false,
                    Some(center) => {
                        let d = center - position;
                        let a = config.detection_half_width;
                        let b = config.detection_half_height;
                        let inside =
                            (d.x / a) * (d.x / a) + (d.y / b) * (d.y / b) <= 1.0;

                        inside
                            && probe::line_of_sight(
                                &physics,
                                position + Vec2::new(0.0, config.sight_origin_y),
                                entity,
                                target_entity,
                                config.sight_policy,
                            )
                    }
                }
            }
        };

        if perception.visible != visible {
            if visible {
                crate::logger::log(&format!("👁️ {:?} spotted target", entity));
            } else {
                crate::logger::log(&format!("👻 {:?} lost sight of target", entity));
            }
        }
        perception.visible = visible;
    }
}
