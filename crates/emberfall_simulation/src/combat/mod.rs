//! Combat: атака, урон, knockback, статус-эффекты
//!
//! ECS ответственность:
//! - фазы атаки и hit window (attack)
//! - применение урона к Attribute + уведомления (damage)
//! - принудительный снос и заморозка (knockback, status)
//!
//! Анимация атаки — на стороне animation bridge (telegraph/триггеры),
//! сам бой от успеха анимации не зависит.

pub mod attack;
pub mod damage;
pub mod knockback;
pub mod status;

// Re-export основных типов
pub use attack::{AttackPhase, AttackSequence, ATTACK_FALLBACK_CLIP};
pub use damage::{calculate_damage, DamageDealt, DamageRequest, DespawnAfter, EntityDied};
pub use knockback::KnockbackRequest;
pub use status::FreezeRequest;
