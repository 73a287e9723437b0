//! Синхронизация состояния AI → параметры аниматора + self-heal рассинхрона

use bevy::prelude::*;

use super::{AnimRole, AnimationBridge};
use crate::ai::EnemyState;
use crate::components::{Enemy, KinematicBody};

/// Период проверки рассинхрона аниматора (секунды)
pub const DESYNC_CHECK_PERIOD: f32 = 1.0;

/// Клип, которым глушим зависшую анимацию
const IDLE_CLIP: &str = "idle";

/// Система: push текущего состояния в параметры аниматора
///
/// Attack не трогаем — trigger уходит в момент telegraph'а, а не каждый тик.
pub fn push_animation_state(
    mut query: Query<(&EnemyState, &KinematicBody, &mut AnimationBridge), With<Enemy>>,
) {
    for (state, body, mut bridge) in query.iter_mut() {
        let walking = matches!(state, EnemyState::Patrol | EnemyState::Chase)
            && body.velocity.x.abs() > 0.01;

        bridge.set_bool(AnimRole::Walk, walking);
        bridge.set_bool(AnimRole::Hurt, matches!(state, EnemyState::Hurt { .. }));
        bridge.set_bool(AnimRole::Dead, matches!(state, EnemyState::Dead));
    }
}

/// Система: периодическая проверка зависшего animation state
///
/// Аниматор может застрять в hurt-клипе на полном прогрессе, когда внутренний
/// флаг уже снят (пропавший callback, прерванный переход). Лечим локально:
/// принудительный idle-клип + сброс hurt-флага. Наружу не сообщаем.
pub fn heal_animation_desync(
    mut query: Query<(Entity, &EnemyState, &mut AnimationBridge), With<Enemy>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, state, mut bridge) in query.iter_mut() {
        bridge.desync_timer -= delta;
        if bridge.desync_timer > 0.0 {
            continue;
        }
        bridge.desync_timer = DESYNC_CHECK_PERIOD;

        let Some((clip, progress)) = bridge.current_state() else {
            continue;
        };

        let hurt_clip = bridge
            .bindings
            .hurt
            .as_deref()
            .map_or(false, |name| clip.eq_ignore_ascii_case(name))
            || clip.to_lowercase().contains("hurt");

        if hurt_clip && progress >= 1.0 && !matches!(state, EnemyState::Hurt { .. }) {
            crate::logger::log_warning(&format!(
                "🩹 {:?} animator stuck in '{}' at progress {:.2} — forcing idle",
                entity, clip, progress
            ));
            bridge.invalidate_cache();
            bridge.play_clip(IDLE_CLIP);
            bridge.set_bool(AnimRole::Hurt, false);
        }
    }
}
