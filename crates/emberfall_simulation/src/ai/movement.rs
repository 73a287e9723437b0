//! MovementDriver: скорость из состояния (Patrol / Chase)
//!
//! Пока активен Patrol или Chase, горизонтальную скорость пишет только эта
//! система. Attack/Hurt/Knockback/Dead владеют скоростью сами — взаимное
//! исключение по состоянию, без блокировок.

use bevy::prelude::*;

use crate::ai::{EnemyState, EscapePlan, Frozen, PerceptionState};
use crate::components::{AttackShape, BodyCollider, Enemy, EnemyConfig, Facing, KinematicBody, Player};
use crate::world::locator::{locate_center, PrimaryTarget};
use crate::world::{probe, PhysicsWorld};

/// Система: Patrol / Chase → горизонтальная скорость
pub fn drive_movement(
    physics: Res<PhysicsWorld>,
    target: Res<PrimaryTarget>,
    player_transforms: Query<&Transform, With<Player>>,
    mut commands: Commands,
    mut enemies: Query<
        (
            Entity,
            &EnemyState,
            &mut KinematicBody,
            &mut Facing,
            &EnemyConfig,
            &AttackShape,
            &Transform,
            &BodyCollider,
            &PerceptionState,
            Option<&EscapePlan>,
            Option<&Frozen>,
        ),
        With<Enemy>,
    >,
) {
    for (
        entity,
        state,
        mut body,
        mut facing,
        config,
        shape,
        transform,
        collider,
        perception,
        escape,
        frozen,
    ) in enemies.iter_mut()
    {
        if !matches!(state, EnemyState::Patrol | EnemyState::Chase) {
            continue;
        }
        if frozen.is_some() {
            body.velocity.x = 0.0;
            continue;
        }

        let center = collider.center(transform.translation.truncate());
        // Длина луча: от центра тела, значит прибавляем полуширину
        let wall_distance = collider.half_extents.x + config.wall_check_distance;

        match state {
            EnemyState::Patrol => {
                let wall = probe::wall_ahead(
                    &physics,
                    center,
                    facing.sign,
                    wall_distance,
                    config.wall_rays,
                    config.wall_ray_spread,
                    entity,
                );
                if wall && facing.try_flip(config.flip_cooldown) {
                    crate::logger::log(&format!("🧱 {:?} patrol wall — flip", entity));
                }
                body.velocity.x = facing.sign * config.patrol_speed;
            }

            EnemyState::Chase => {
                // Видимость пропала между оценками — стоим, transitions отпустит Chase
                if !perception.visible {
                    body.velocity.x = 0.0;
                    continue;
                }
                let Some(target_entity) = target.entity else {
                    body.velocity.x = 0.0;
                    continue;
                };
                let Some(target_center) = locate_center(
                    &physics,
                    player_transforms.get(target_entity).ok(),
                    target_entity,
                ) else {
                    body.velocity.x = 0.0;
                    continue;
                };

                let dx = target_center.x - center.x;

                // Разворот к цели: мёртвая зона против дёргания при перекрытии
                let mut flipped = false;
                if dx.abs() > config.flip_dead_zone && dx.signum() != facing.sign {
                    flipped = facing.try_flip(config.flip_cooldown);
                }

                // Дистанция атаки достигнута: стоим (но не сразу после flip,
                // иначе конец погони превращается в осцилляцию)
                if dx.abs() <= config.stop_range(shape) && !flipped {
                    body.velocity.x = 0.0;
                    continue;
                }

                let forward_blocked = probe::wall_ahead(
                    &physics,
                    center,
                    facing.sign,
                    wall_distance,
                    config.wall_rays,
                    config.wall_ray_spread,
                    entity,
                );

                if forward_blocked {
                    if facing.sign == dx.signum() {
                        // Стена на пути к цели: пробуем обратное направление
                        let alt_blocked = probe::wall_ahead(
                            &physics,
                            center,
                            -facing.sign,
                            wall_distance,
                            config.wall_rays,
                            config.wall_ray_spread,
                            entity,
                        );
                        if !alt_blocked {
                            if facing.try_flip(config.flip_cooldown) {
                                crate::logger::log(&format!(
                                    "🔄 {:?} chase blocked — going around",
                                    entity
                                ));
                                body.velocity.x = facing.sign * config.chase_speed;
                            } else {
                                body.velocity.x = 0.0;
                            }
                        } else {
                            // Тупик: стоим и планируем отложенный разворот
                            body.velocity.x = 0.0;
                            if escape.is_none() {
                                commands.entity(entity).insert(EscapePlan {
                                    timer: config.escape_delay,
                                });
                                crate::logger::log(&format!(
                                    "🚧 {:?} dead end — escape scheduled in {:.1}s",
                                    entity, config.escape_delay
                                ));
                            }
                        }
                    } else {
                        // Стена сзади относительно цели: не ломимся в неё
                        body.velocity.x = 0.0;
                    }
                } else {
                    body.velocity.x = dx.signum() * config.chase_speed;
                }
            }

            _ => unreachable!(),
        }
    }
}

/// Система: отложенный принудительный разворот из тупика
///
/// План живёт только в Chase; если состояние сменилось — план устарел.
/// Если после разворота тупик остался, движение запланирует новый план —
/// враг в худшем случае просто стоит (fail-stationary).
pub fn tick_escape_plans(
    time: Res<Time<Fixed>>,
    mut commands: Commands,
    mut query: Query<(Entity, &mut EscapePlan, &mut Facing, &EnemyState, &EnemyConfig), With<Enemy>>,
) {
    let delta = time.delta_secs();

    for (entity, mut plan, mut facing, state, config) in query.iter_mut() {
        if !matches!(state, EnemyState::Chase) {
            commands.entity(entity).remove::<EscapePlan>();
            continue;
        }

        plan.timer -= delta;
        if plan.timer > 0.0 {
            continue;
        }

        // Принудительный flip: cooldown игнорируем, но взводим заново
        facing.flip(config.flip_cooldown);
        commands.entity(entity).remove::<EscapePlan>();
        crate::logger::log(&format!("🏃 {:?} escape flip (now facing {})", entity, facing.sign));
    }
}
