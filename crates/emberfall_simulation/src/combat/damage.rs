//! Применение урона и смерть
//!
//! Единственная точка входа урона в атрибуты: DamageRequest. Отсюда
//! расходятся уведомления DamageDealt / EntityDied, на которые реагирует
//! state machine (см. ai::reactions).

use bevy::prelude::*;
use rand::Rng;

use crate::components::Attribute;
use crate::DeterministicRng;

/// Запрос на применение урона (CombatResolver → attribute-модуль)
#[derive(Event, Debug, Clone)]
pub struct DamageRequest {
    pub attacker: Entity,
    pub target: Entity,
    /// Базовый урон до модификаторов
    pub amount: u32,
    pub crit_rate: f32,
    pub crit_multiplier: f32,
}

/// Уведомление: урон применён
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    /// Фактически снятое здоровье (после защиты)
    pub damage: u32,
    pub target_died: bool,
}

/// Уведомление: entity умер (health == 0)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Деспавн entity после таймаута (труп доигрывает death-анимацию)
#[derive(Component, Debug, Clone, Copy)]
pub struct DespawnAfter {
    /// Оставшееся время (секунды)
    pub remaining: f32,
}

/// Урон атакующей стороны: крит-бросок поверх базового значения.
/// Защита цели применяется уже внутри Attribute.
pub fn calculate_damage(base: u32, is_crit: bool, crit_multiplier: f32) -> u32 {
    if is_crit {
        (base as f32 * crit_multiplier.max(1.0)).round() as u32
    } else {
        base
    }
}

/// Система: DamageRequest → Attribute → DamageDealt / EntityDied
pub fn apply_damage_requests(
    mut requests: EventReader<DamageRequest>,
    mut dealt_events: EventWriter<DamageDealt>,
    mut died_events: EventWriter<EntityDied>,
    mut rng: ResMut<DeterministicRng>,
    mut targets: Query<&mut Attribute>,
) {
    for request in requests.read() {
        if request.attacker == request.target {
            continue;
        }
        let Ok(mut attribute) = targets.get_mut(request.target) else {
            crate::logger::log_warning(&format!(
                "WARN: DamageRequest target {:?} has no Attribute",
                request.target
            ));
            continue;
        };
        if !attribute.is_alive() {
            continue;
        }

        let is_crit = request.crit_rate > 0.0 && rng.rng.gen::<f32>() < request.crit_rate;
        let raw = calculate_damage(request.amount, is_crit, request.crit_multiplier);
        let applied = attribute.take_damage(raw);
        let died = !attribute.is_alive();

        crate::logger::log(&format!(
            "💥 {:?} → {:?}: {} dmg{} (HP {}/{})",
            request.attacker,
            request.target,
            applied,
            if is_crit { " CRIT" } else { "" },
            attribute.health,
            attribute.max_health
        ));

        dealt_events.write(DamageDealt {
            attacker: request.attacker,
            target: request.target,
            damage: applied,
            target_died: died,
        });

        if died {
            died_events.write(EntityDied {
                entity: request.target,
                killer: Some(request.attacker),
            });
            crate::logger::log_info(&format!(
                "☠️ {:?} killed by {:?}",
                request.target, request.attacker
            ));
        }
    }
}

/// Система: уборка трупов по истечении таймера
///
/// Despawn снимает все компоненты, включая AnimationBridge — ссылка на
/// аниматор отпускается вместе с entity, висячих подписок не остаётся.
pub fn despawn_after_timeout(
    time: Res<Time<Fixed>>,
    mut commands: Commands,
    mut query: Query<(Entity, &mut DespawnAfter)>,
) {
    let delta = time.delta_secs();

    for (entity, mut despawn) in query.iter_mut() {
        despawn.remaining -= delta;
        if despawn.remaining <= 0.0 {
            crate::logger::log(&format!("⚰️ Despawning {:?} (timeout)", entity));
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_damage_normal() {
        assert_eq!(calculate_damage(10, false, 1.5), 10);
    }

    #[test]
    fn test_calculate_damage_crit() {
        assert_eq!(calculate_damage(10, true, 1.5), 15);
        // Множитель ниже 1.0 не может ослабить крит
        assert_eq!(calculate_damage(10, true, 0.5), 10);
    }
}
