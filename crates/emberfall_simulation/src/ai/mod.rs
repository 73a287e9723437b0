//! Enemy AI: восприятие, FSM, движение
//!
//! Порядок в тике (см. SimulationPlugin):
//! 1. perceive_targets — эллипс + line of sight → PerceptionState
//! 2. react_to_death / react_to_damage — внешние уведомления → Dead / Hurt
//! 3. tick_facing_cooldowns, tick_enemy_states — арбитраж состояний
//! 4. drive_movement, tick_escape_plans — состояние → скорость

pub mod movement;
pub mod perception;
pub mod reactions;
pub mod state;
pub mod transitions;

// Re-export основных типов
pub use state::{EnemyState, EscapePlan, Frozen, PerceptionState};
