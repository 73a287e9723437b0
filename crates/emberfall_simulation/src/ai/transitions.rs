//! StateController: арбитраж Patrol / Chase / Attack + таймер Hurt
//!
//! Приоритеты (сверху вниз): Dead > Hurt/Knockback > Attack > Chase > Patrol.
//! Dead и Hurt/Knockback сюда приходят уже выставленными реакциями
//! (reactions.rs) и knockback-системой; здесь — нижняя половина пирамиды.

use bevy::prelude::*;

use crate::ai::{EnemyState, PerceptionState};
use crate::combat::{AttackSequence, ATTACK_FALLBACK_CLIP};
use crate::components::{AttackShape, Enemy, EnemyConfig, Facing, KinematicBody};
use crate::world::{probe, LayerMask, PhysicsWorld};

/// Система: тик cooldown'ов разворота (единственный писатель Facing.cooldown)
pub fn tick_facing_cooldowns(mut query: Query<&mut Facing>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();
    for mut facing in query.iter_mut() {
        facing.tick(delta);
    }
}

/// Система: переходы состояний
pub fn tick_enemy_states(
    physics: Res<PhysicsWorld>,
    time: Res<Time<Fixed>>,
    mut commands: Commands,
    mut enemies: Query<
        (
            Entity,
            &mut EnemyState,
            &mut KinematicBody,
            &PerceptionState,
            &EnemyConfig,
            &AttackShape,
            &Facing,
            &Transform,
            Option<&AttackSequence>,
            &crate::animation::AnimationBridge,
        ),
        With<Enemy>,
    >,
) {
    let delta = time.delta_secs();

    for (entity, mut state, mut body, perception, config, shape, facing, transform, sequence, bridge) in
        enemies.iter_mut()
    {
        let next = match &mut *state {
            EnemyState::Dead => continue,
            // Knockback ведёт своя система до конца таймера
            EnemyState::Knockback { .. } => continue,

            EnemyState::Hurt { timer } => {
                *timer -= delta;
                // Hurt владеет горизонтальной скоростью: стоим весь stagger
                body.velocity.x = 0.0;
                if *timer > 0.0 {
                    continue;
                }
                if perception.visible {
                    EnemyState::Chase
                } else {
                    EnemyState::Patrol
                }
            }

            EnemyState::Attack => {
                if sequence.is_some() {
                    continue;
                }
                // Attack без последовательности — рассинхрон, защитный откат
                crate::logger::log_warning(&format!(
                    "⚠️ {:?} in Attack without sequence — recovering",
                    entity
                ));
                if perception.visible {
                    EnemyState::Chase
                } else {
                    EnemyState::Patrol
                }
            }

            EnemyState::Patrol | EnemyState::Chase => {
                let origin = transform.translation.truncate();
                let resolved = shape.resolve(origin, facing.sign);
                // Старт атаки: цель видна, форма атаки при ТЕКУЩЕМ facing
                // кого-то накрывает, и атака ещё не в полёте
                let can_attack = perception.visible
                    && sequence.is_none()
                    && !probe::attack_targets(&physics, &resolved, LayerMask::PLAYER, entity)
                        .is_empty();

                if can_attack {
                    body.velocity.x = 0.0;
                    commands.entity(entity).insert(AttackSequence::new(config));
                    if !bridge.telegraph_attack(ATTACK_FALLBACK_CLIP) {
                        // Аниматор не отозвался — едем по таймерам, игру не блокируем
                        crate::logger::log(&format!(
                            "🎬 {:?} attack telegraph without animation",
                            entity
                        ));
                    }
                    EnemyState::Attack
                } else if perception.visible {
                    EnemyState::Chase
                } else {
                    EnemyState::Patrol
                }
            }
        };

        if *state != next {
            crate::logger::log(&format!(
                "🔀 {:?} {} → {}",
                entity,
                state.label(),
                next.label()
            ));
            *state = next;
        }
    }
}
