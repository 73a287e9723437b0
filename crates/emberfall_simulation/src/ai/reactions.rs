//! Реакции AI на внешние уведомления: урон и смерть
//!
//! HealthBridge-сторона state machine: события от attribute-модуля
//! превращаются в переходы Hurt / Dead с приоритетным вытеснением.

use bevy::prelude::*;

use crate::ai::{EnemyState, EscapePlan, Frozen};
use crate::animation::{AnimRole, AnimationBridge};
use crate::combat::{AttackSequence, DamageDealt, DespawnAfter, EntityDied};
use crate::components::{Enemy, EnemyConfig, KinematicBody};

/// Система: нелетальный урон → Hurt
///
/// Повторный урон во время Hurt таймер НЕ перезапускает (иначе анимация
/// дёргается при граде мелких ударов). Урон во время Knockback тоже не
/// вытесняет: тир Hurt/Knockback занят первым писателем до конца действия.
/// Прерывание атаки здесь же: если удар пришёл до hit window — урона по
/// цели в этом цикле не будет.
pub fn react_to_damage(
    mut damage_events: EventReader<DamageDealt>,
    mut commands: Commands,
    mut enemies: Query<
        (&mut EnemyState, &mut KinematicBody, &EnemyConfig, &AnimationBridge),
        With<Enemy>,
    >,
) {
    for event in damage_events.read() {
        // Летальный урон обрабатывает react_to_death
        if event.target_died {
            continue;
        }
        let Ok((mut state, mut body, config, bridge)) = enemies.get_mut(event.target) else {
            continue;
        };

        match *state {
            EnemyState::Dead => continue,
            EnemyState::Hurt { .. } => {
                crate::logger::log(&format!(
                    "💢 {:?} damaged while hurting — re-entry suppressed",
                    event.target
                ));
                continue;
            }
            EnemyState::Knockback { .. } => continue,
            _ => {}
        }

        if matches!(*state, EnemyState::Attack) {
            commands.entity(event.target).remove::<AttackSequence>();
            bridge.reset_trigger(AnimRole::Attack);
            crate::logger::log(&format!("✋ {:?} attack interrupted by damage", event.target));
        }

        body.velocity.x = 0.0;
        crate::logger::log(&format!(
            "💢 {:?} {} → Hurt ({} dmg from {:?})",
            event.target,
            state.label(),
            event.damage,
            event.attacker
        ));
        *state = EnemyState::Hurt {
            timer: config.hurt_duration,
        };
    }
}

/// Система: смерть → терминальный Dead
///
/// Гасим все остальные таймеры/последовательности сразу; entity живёт ещё
/// death_despawn_delay секунд, чтобы death-анимация успела проиграться.
pub fn react_to_death(
    mut death_events: EventReader<EntityDied>,
    mut commands: Commands,
    mut enemies: Query<
        (&mut EnemyState, &mut KinematicBody, &EnemyConfig, &AnimationBridge),
        With<Enemy>,
    >,
) {
    for event in death_events.read() {
        let Ok((mut state, mut body, config, bridge)) = enemies.get_mut(event.entity) else {
            continue;
        };
        if state.is_dead() {
            continue;
        }

        *state = EnemyState::Dead;
        body.velocity = Vec2::ZERO;
        bridge.reset_trigger(AnimRole::Attack);

        commands
            .entity(event.entity)
            .remove::<AttackSequence>()
            .remove::<EscapePlan>()
            .remove::<Frozen>()
            .insert(DespawnAfter {
                remaining: config.death_despawn_delay,
            });

        crate::logger::log(&format!(
            "💀 {:?} died (killer: {:?}), despawn in {:.1}s",
            event.entity, event.killer, config.death_despawn_delay
        ));
    }
}
