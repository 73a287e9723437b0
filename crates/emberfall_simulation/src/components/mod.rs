//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики (faction, attribute, player marker)
//! - body: кинематика (KinematicBody, BodyCollider, Facing)
//! - enemy: конфигурация врага и форма атаки

pub mod actor;
pub mod body;
pub mod enemy;

// Re-exports для удобного импорта
pub use actor::*;
pub use body::*;
pub use enemy::*;
