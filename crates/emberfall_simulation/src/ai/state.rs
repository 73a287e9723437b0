//! Состояния enemy AI и сопутствующие маркеры

use bevy::prelude::*;

/// Состояние врага (иерархический FSM)
///
/// В каждый тик активен ровно один вариант. Приоритет при арбитраже:
/// Dead > Hurt/Knockback > Attack > Chase > Patrol.
/// Dead — терминальное: из него выхода нет до конца жизни entity.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub enum EnemyState {
    /// Патруль: ходим в сторону взгляда, у стены разворачиваемся
    Patrol,
    /// Погоня за игроком (виден и не в радиусе атаки)
    Chase,
    /// Атака в процессе (последовательность ведёт AttackSequence)
    Attack,
    /// Получили урон: стоим, ждём окончания stagger'а
    Hurt {
        /// Оставшееся время (секунды)
        timer: f32,
    },
    /// Принудительный снос (элементальный эффект и т.п.)
    Knockback {
        timer: f32,
        /// Скорость сноса (force / duration)
        speed: f32,
        /// Направление: ±1
        dir: f32,
        /// Упёрлись в стену: смещение остановлено, таймер дотекает
        blocked: bool,
    },
    /// Труп. AI выключен, ждём DespawnAfter
    Dead,
}

impl Default for EnemyState {
    fn default() -> Self {
        Self::Patrol
    }
}

impl EnemyState {
    pub fn is_dead(&self) -> bool {
        matches!(self, Self::Dead)
    }

    /// Короткое имя для логов
    pub fn label(&self) -> &'static str {
        match self {
            Self::Patrol => "Patrol",
            Self::Chase => "Chase",
            Self::Attack => "Attack",
            Self::Hurt { .. } => "Hurt",
            Self::Knockback { .. } => "Knockback",
            Self::Dead => "Dead",
        }
    }
}

/// Crowd-control: заморозка. Не состояние, а ортогональный флаг —
/// глушит любое движение, пока висит на entity.
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct Frozen {
    pub timer: f32,
}

/// Отложенный принудительный разворот при тупике в погоне
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct EscapePlan {
    pub timer: f32,
}

/// Результат последней оценки восприятия (без гистерезиса:
/// потеря line of sight видна уже на следующем тике)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PerceptionState {
    pub visible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_patrol() {
        assert!(matches!(EnemyState::default(), EnemyState::Patrol));
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(EnemyState::Patrol.label(), "Patrol");
        assert_eq!(EnemyState::Hurt { timer: 0.4 }.label(), "Hurt");
        assert!(EnemyState::Dead.is_dead());
        assert!(!EnemyState::Chase.is_dead());
    }
}
