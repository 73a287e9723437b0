//! Статус-эффекты: заморозка
//!
//! Frozen — не состояние FSM, а ортогональный флаг: любое движение глушится
//! (см. physics::suppress_frozen_motion), таймеры состояний идут своим чередом.

use bevy::prelude::*;

use crate::ai::{EnemyState, Frozen};
use crate::components::Enemy;

/// Внешний запрос заморозки (ледяной элемент)
#[derive(Event, Debug, Clone)]
pub struct FreezeRequest {
    pub target: Entity,
    pub duration: f32,
}

/// Система: FreezeRequest → Frozen
///
/// Повторная заморозка продлевает до большего из таймеров, не складывается.
pub fn apply_freeze_requests(
    mut requests: EventReader<FreezeRequest>,
    mut commands: Commands,
    states: Query<&EnemyState, With<Enemy>>,
    mut already_frozen: Query<&mut Frozen>,
) {
    for request in requests.read() {
        let Ok(state) = states.get(request.target) else {
            continue;
        };
        if state.is_dead() {
            continue;
        }

        let duration = request.duration.max(0.05);
        if let Ok(mut frozen) = already_frozen.get_mut(request.target) {
            frozen.timer = frozen.timer.max(duration);
        } else {
            commands
                .entity(request.target)
                .insert(Frozen { timer: duration });
            crate::logger::log(&format!(
                "❄️ {:?} frozen for {:.1}s",
                request.target, duration
            ));
        }
    }
}

/// Система: оттаивание
pub fn tick_frozen(
    time: Res<Time<Fixed>>,
    mut commands: Commands,
    mut query: Query<(Entity, &mut Frozen)>,
) {
    let delta = time.delta_secs();

    for (entity, mut frozen) in query.iter_mut() {
        frozen.timer -= delta;
        if frozen.timer <= 0.0 {
            commands.entity(entity).remove::<Frozen>();
            crate::logger::log(&format!("❄️ {:?} thawed", entity));
        }
    }
}
