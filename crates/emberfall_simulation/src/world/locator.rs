//! Target locator: поиск и кэширование игрока
//!
//! Игрока ищем один раз и держим Entity в resource; если entity пропал
//! (смена сцены, despawn) — лениво ищем заново. Никакого сканирования
//! мира на каждый запрос.

use bevy::prelude::*;

use super::PhysicsWorld;
use crate::components::Player;

/// Закэшированная цель всех врагов
#[derive(Resource, Debug, Default)]
pub struct PrimaryTarget {
    pub entity: Option<Entity>,
}

/// Система: валидация кэша и ленивый повторный поиск
///
/// Минимальный entity index при нескольких кандидатах — стабильный выбор.
pub fn resolve_primary_target(
    mut target: ResMut<PrimaryTarget>,
    players: Query<Entity, With<Player>>,
) {
    if let Some(entity) = target.entity {
        if players.get(entity).is_ok() {
            return;
        }
        crate::logger::log_warning("🎯 Primary target lost, re-resolving player");
        target.entity = None;
    }

    target.entity = players.iter().min_by_key(|e| e.index());
    if let Some(entity) = target.entity {
        crate::logger::log(&format!("🎯 Primary target resolved: {:?}", entity));
    }
}

/// Collision-center цели: тело в physics world, иначе сырой Transform
pub fn locate_center(
    physics: &PhysicsWorld,
    fallback: Option<&Transform>,
    entity: Entity,
) -> Option<Vec2> {
    if let Some(body) = physics.body(entity) {
        return Some(body.center);
    }
    fallback.map(|t| t.translation.truncate())
}
