//! Кинематика 2D-актора: тело, коллайдер, направление взгляда

use bevy::prelude::*;

use crate::world::LayerMask;

/// Кинематическое тело (velocity интегрируем сами, физдвижок — коллаборатор)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct KinematicBody {
    /// Текущая скорость (m/s)
    pub velocity: Vec2,
    /// На земле ли актор (ground probe каждый тик)
    pub grounded: bool,
}

/// AABB-коллайдер тела для spatial-запросов
///
/// Каждый тик синхронизируется в [`crate::world::PhysicsWorld`].
/// `center_offset` — смещение collision-center от Transform (спрайт у ног и т.п.).
#[derive(Component, Debug, Clone, Copy)]
pub struct BodyCollider {
    pub half_extents: Vec2,
    pub center_offset: Vec2,
    pub layers: LayerMask,
}

impl BodyCollider {
    pub fn new(half_extents: Vec2, layers: LayerMask) -> Self {
        Self {
            half_extents,
            center_offset: Vec2::ZERO,
            layers,
        }
    }

    /// Collision-center в мировых координатах
    pub fn center(&self, translation: Vec2) -> Vec2 {
        translation + self.center_offset
    }
}

/// Направление взгляда: +1 вправо, −1 влево
///
/// Flip ограничен cooldown'ом — иначе враг дёргается, когда цель прямо над ним.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Facing {
    /// Всегда ±1.0
    pub sign: f32,
    /// Оставшийся cooldown до следующего разрешённого flip (секунды)
    pub cooldown: f32,
}

impl Default for Facing {
    fn default() -> Self {
        Self {
            sign: 1.0,
            cooldown: 0.0,
        }
    }
}

impl Facing {
    /// Горизонтальный орт взгляда
    pub fn dir(&self) -> Vec2 {
        Vec2::new(self.sign, 0.0)
    }

    pub fn tick(&mut self, delta: f32) {
        if self.cooldown > 0.0 {
            self.cooldown -= delta;
        }
    }

    /// Разворот с учётом cooldown. Возвращает true если flip принят.
    pub fn try_flip(&mut self, cooldown: f32) -> bool {
        if self.cooldown > 0.0 {
            return false;
        }
        self.flip(cooldown);
        true
    }

    /// Безусловный разворот (escape из тупика). Cooldown всё равно взводится.
    pub fn flip(&mut self, cooldown: f32) {
        self.sign = -self.sign;
        self.cooldown = cooldown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_respects_cooldown() {
        let mut facing = Facing::default();
        assert_eq!(facing.sign, 1.0);

        assert!(facing.try_flip(0.3));
        assert_eq!(facing.sign, -1.0);

        // Второй flip сразу после первого отклоняется
        assert!(!facing.try_flip(0.3));
        assert_eq!(facing.sign, -1.0);

        // После истечения cooldown — снова можно
        facing.tick(0.3);
        assert!(facing.try_flip(0.3));
        assert_eq!(facing.sign, 1.0);
    }

    #[test]
    fn test_forced_flip_rearms_cooldown() {
        let mut facing = Facing::default();
        facing.try_flip(0.3);

        // Принудительный flip игнорирует cooldown, но взводит его заново
        facing.flip(0.3);
        assert_eq!(facing.sign, 1.0);
        assert!(!facing.try_flip(0.3));
    }

    #[test]
    fn test_collider_center_offset() {
        let mut collider = BodyCollider::new(Vec2::new(0.4, 0.9), LayerMask::ENEMY);
        collider.center_offset = Vec2::new(0.0, 0.9);

        let center = collider.center(Vec2::new(3.0, 0.0));
        assert_eq!(center, Vec2::new(3.0, 0.9));
    }
}
