//! Knockback: принудительный снос с учётом стен
//!
//! Скорость выводится из силы: force / duration. Смещение проверяет стену
//! каждый тик тем же многолучевым способом, что и wall-check; при упоре
//! смещение останавливается, но таймер дотекает до конца — только после
//! этого управление возвращается обычному арбитражу состояний.

use bevy::prelude::*;

use crate::ai::{EnemyState, PerceptionState};
use crate::animation::{AnimRole, AnimationBridge};
use crate::combat::AttackSequence;
use crate::components::{BodyCollider, Enemy, EnemyConfig, KinematicBody};
use crate::world::{probe, PhysicsWorld};

/// Внешний запрос сноса (элементальный эффект, взрыв)
#[derive(Event, Debug, Clone)]
pub struct KnockbackRequest {
    pub target: Entity,
    /// Сила (метры суммарного смещения при свободном полёте)
    pub force: f32,
    /// true — снос вправо, false — влево
    pub to_right: bool,
}

/// Система: KnockbackRequest → состояние Knockback
///
/// Dead не трогаем. Повторный запрос во время действующего сноса
/// игнорируется (первый писатель владеет тиром до конца), как и запрос
/// во время Hurt. Атаку в полёте прерываем до hit window.
pub fn apply_knockback_requests(
    mut requests: EventReader<KnockbackRequest>,
    mut commands: Commands,
    mut enemies: Query<
        (&mut EnemyState, &mut KinematicBody, &EnemyConfig, &AnimationBridge),
        With<Enemy>,
    >,
) {
    for request in requests.read() {
        let Ok((mut state, mut body, config, bridge)) = enemies.get_mut(request.target) else {
            continue;
        };

        match *state {
            EnemyState::Dead => continue,
            EnemyState::Knockback { .. } => {
                crate::logger::log(&format!(
                    "💨 {:?} knockback ignored (already airborne)",
                    request.target
                ));
                continue;
            }
            EnemyState::Hurt { .. } => continue,
            _ => {}
        }

        if matches!(*state, EnemyState::Attack) {
            commands.entity(request.target).remove::<AttackSequence>();
            bridge.reset_trigger(AnimRole::Attack);
        }

        let duration = config.knockback_duration;
        let speed = (request.force / duration).abs();
        let dir = if request.to_right { 1.0 } else { -1.0 };

        body.velocity.x = 0.0;
        crate::logger::log(&format!(
            "💨 {:?} {} → Knockback (force {:.1}, dir {})",
            request.target,
            state.label(),
            request.force,
            dir
        ));
        *state = EnemyState::Knockback {
            timer: duration,
            speed,
            dir,
            blocked: false,
        };
    }
}

/// Система: ведение активного сноса
pub fn drive_knockback(
    physics: Res<PhysicsWorld>,
    time: Res<Time<Fixed>>,
    mut enemies: Query<
        (
            Entity,
            &mut EnemyState,
            &mut KinematicBody,
            &EnemyConfig,
            &BodyCollider,
            &PerceptionState,
            &Transform,
        ),
        With<Enemy>,
    >,
) {
    let delta = time.delta_secs();

    for (entity, mut state, mut body, config, collider, perception, transform) in
        enemies.iter_mut()
    {
        let EnemyState::Knockback {
            timer,
            speed,
            dir,
            blocked,
        } = &mut *state
        else {
            continue;
        };

        *timer -= delta;

        if !*blocked {
            let center = collider.center(transform.translation.truncate());
            // Смотрим на шаг вперёд: полуширина тела + путь за тик
            let lookahead =
                collider.half_extents.x + (*speed * delta).max(config.wall_check_distance);
            if probe::wall_ahead(
                &physics,
                center,
                *dir,
                lookahead,
                config.wall_rays,
                config.wall_ray_spread,
                entity,
            ) {
                *blocked = true;
                crate::logger::log(&format!("🧱 {:?} knockback hit wall — displacement stopped", entity));
            }
        }

        body.velocity.x = if *blocked { 0.0 } else { *dir * *speed };

        if *timer <= 0.0 {
            body.velocity.x = 0.0;
            let next = if perception.visible {
                EnemyState::Chase
            } else {
                EnemyState::Patrol
            };
            crate::logger::log(&format!(
                "💨 {:?} knockback over → {}",
                entity,
                next.label()
            ));
            *state = next;
        }
    }
}
