//! Melee-атака: telegraph → hit window → recovery
//!
//! Тайминг: telegraph и recovery — по половине attack_delay, запрос урона
//! ровно в середине. Watchdog (1.5× attack_delay) страхует от зависшего
//! animation callback'а: по его истечении последовательность сбрасывается.

use bevy::prelude::*;

use crate::ai::{EnemyState, PerceptionState};
use crate::animation::{AnimRole, AnimationBridge, AnimationCallback};
use crate::combat::DamageRequest;
use crate::components::{AttackShape, Enemy, EnemyConfig, Facing, KinematicBody};
use crate::world::{probe, LayerMask, PhysicsWorld};

/// Клип прямого запуска, если у аниматора нет attack-параметра
pub const ATTACK_FALLBACK_CLIP: &str = "attack01";

/// Фазы атаки
#[derive(Debug, Clone, PartialEq, Reflect)]
pub enum AttackPhase {
    /// Замах (виден противнику, урона ещё нет)
    Telegraph { timer: f32 },
    /// Добив анимации после hit window
    Recovery { timer: f32 },
}

/// Активная последовательность атаки (на entity только во время атаки)
#[derive(Component, Debug, Clone, Reflect)]
pub struct AttackSequence {
    pub phase: AttackPhase,
    /// Аварийный таймер всей последовательности
    pub watchdog: f32,
    /// Hit window уже отработал (урон заявлен)
    pub hit_done: bool,
}

impl AttackSequence {
    pub fn new(config: &EnemyConfig) -> Self {
        Self {
            phase: AttackPhase::Telegraph {
                timer: config.attack_delay * 0.5,
            },
            watchdog: config.attack_watchdog(),
            hit_done: false,
        }
    }
}

/// Завершение атаки: снять последовательность, вернуть управление FSM,
/// принудительно пересинхронизировать анимацию (Attack её глушил)
fn finish_attack(
    commands: &mut Commands,
    entity: Entity,
    state: &mut EnemyState,
    bridge: &mut AnimationBridge,
    visible: bool,
) {
    commands.entity(entity).remove::<AttackSequence>();
    bridge.reset_trigger(AnimRole::Attack);
    bridge.invalidate_cache();

    *state = if visible {
        EnemyState::Chase
    } else {
        EnemyState::Patrol
    };
    crate::logger::log(&format!("✅ {:?} attack finished → {}", entity, state.label()));
}

/// Система: продвижение фаз атаки
pub fn advance_attack_sequences(
    physics: Res<PhysicsWorld>,
    time: Res<Time<Fixed>>,
    mut commands: Commands,
    mut damage_requests: EventWriter<DamageRequest>,
    mut enemies: Query<
        (
            Entity,
            &mut AttackSequence,
            &mut EnemyState,
            &mut KinematicBody,
            &mut AnimationBridge,
            &PerceptionState,
            &EnemyConfig,
            &AttackShape,
            &Facing,
            &Transform,
        ),
        With<Enemy>,
    >,
) {
    let delta = time.delta_secs();

    for (
        entity,
        mut sequence,
        mut state,
        mut body,
        mut bridge,
        perception,
        config,
        shape,
        facing,
        transform,
    ) in enemies.iter_mut()
    {
        // Прерванная атака (Hurt/Knockback/Dead уже переключили состояние):
        // осиротевшую последовательность просто убираем, hit window не случится
        if !matches!(*state, EnemyState::Attack) {
            commands.entity(entity).remove::<AttackSequence>();
            continue;
        }

        // Attack владеет скоростью на всю длительность
        body.velocity.x = 0.0;

        sequence.watchdog -= delta;
        if sequence.watchdog <= 0.0 {
            crate::logger::log_warning(&format!(
                "⏱️ {:?} attack watchdog fired — aborting sequence",
                entity
            ));
            finish_attack(&mut commands, entity, &mut state, &mut bridge, perception.visible);
            continue;
        }

        // Тик текущей фазы
        let phase_elapsed = {
            let (AttackPhase::Telegraph { timer } | AttackPhase::Recovery { timer }) =
                &mut sequence.phase;
            *timer -= delta;
            *timer <= 0.0
        };
        if !phase_elapsed {
            continue;
        }

        if matches!(sequence.phase, AttackPhase::Telegraph { .. }) {
            // Hit window: запрос формы при текущем facing, по разу на цель
            let origin = transform.translation.truncate();
            let resolved = shape.resolve(origin, facing.sign);
            let targets = probe::attack_targets(&physics, &resolved, LayerMask::PLAYER, entity);

            for target in &targets {
                damage_requests.write(DamageRequest {
                    attacker: entity,
                    target: *target,
                    amount: config.attack_damage,
                    crit_rate: config.crit_rate,
                    crit_multiplier: config.crit_multiplier,
                });
            }
            crate::logger::log(&format!(
                "💥 {:?} hit window: {} target(s)",
                entity,
                targets.len()
            ));

            sequence.hit_done = true;
            sequence.phase = AttackPhase::Recovery {
                timer: config.attack_delay * 0.5,
            };
        } else {
            finish_attack(&mut commands, entity, &mut state, &mut bridge, perception.visible);
        }
    }
}

/// Система: animation callback'и от аниматора
///
/// Идемпотентность с таймерами: кто первый завершил — тот и завершил,
/// второй путь видит уже снятую последовательность и молчит.
/// AttackEnd до hit window означает оборванную анимацию: цикл закрывается
/// без урона.
pub fn apply_animation_callbacks(
    mut callbacks: EventReader<AnimationCallback>,
    mut commands: Commands,
    mut enemies: Query<
        (
            &mut EnemyState,
            &mut AnimationBridge,
            &PerceptionState,
            Option<&AttackSequence>,
        ),
        With<Enemy>,
    >,
) {
    for callback in callbacks.read() {
        match callback {
            AnimationCallback::AttackStart { entity } => {
                crate::logger::log(&format!("🎬 {:?} attack animation started", entity));
            }

            AnimationCallback::AttackEnd { entity } => {
                let Ok((mut state, mut bridge, perception, sequence)) = enemies.get_mut(*entity)
                else {
                    continue;
                };
                let Some(sequence) = sequence else {
                    // Таймер успел первым — callback молчит
                    continue;
                };
                if matches!(*state, EnemyState::Attack) {
                    crate::logger::log(&format!(
                        "🎬 {:?} attack ended by animator (hit applied: {})",
                        entity, sequence.hit_done
                    ));
                    finish_attack(&mut commands, *entity, &mut state, &mut bridge, perception.visible);
                }
            }

            AnimationCallback::HurtStart { .. } => {}

            AnimationCallback::HurtEnd { entity } => {
                let Ok((mut state, _, perception, _)) = enemies.get_mut(*entity) else {
                    continue;
                };
                if matches!(*state, EnemyState::Hurt { .. }) {
                    *state = if perception.visible {
                        EnemyState::Chase
                    } else {
                        EnemyState::Patrol
                    };
                    crate::logger::log(&format!(
                        "🎬 {:?} hurt ended by animator → {}",
                        entity,
                        state.label()
                    ));
                }
            }
        }
    }
}
