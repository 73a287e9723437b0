//! Базовые компоненты акторов: Actor, Attribute, Player

use bevy::prelude::*;

/// Актор (игрок, враг) — базовый компонент для живых существ
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Actor {
    /// Stable ID фракции (враги атакуют только чужие фракции)
    pub faction_id: u64,
}

/// Маркер игрока (единственная цель enemy AI)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Боевые атрибуты актора: здоровье, атака, защита
///
/// Инвариант: 0 ≤ health ≤ max_health.
/// Защита режет урон по 1% за очко, пол 10% (так считал attribute-модуль игры).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Attribute {
    pub health: u32,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
}

impl Default for Attribute {
    fn default() -> Self {
        Self::new(100, 10, 0)
    }
}

impl Attribute {
    pub fn new(max_health: u32, attack: u32, defense: u32) -> Self {
        Self {
            health: max_health,
            max_health,
            attack,
            defense,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Урон с учётом защиты. Возвращает фактически снятое здоровье.
    ///
    /// Мёртвый актор урон не получает (возвращает 0).
    pub fn take_damage(&mut self, raw: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        let reduced = (raw as f32 * self.damage_multiplier()).round() as u32;
        self.apply_loss(reduced)
    }

    /// Урон без учёта защиты (физические атаки пробивают броню)
    pub fn take_true_damage(&mut self, raw: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        self.apply_loss(raw)
    }

    pub fn heal(&mut self, amount: u32) {
        if self.is_alive() {
            self.health = (self.health + amount).min(self.max_health);
        }
    }

    pub fn health_percent(&self) -> f32 {
        if self.max_health == 0 {
            0.0
        } else {
            self.health as f32 / self.max_health as f32
        }
    }

    fn damage_multiplier(&self) -> f32 {
        (1.0 - self.defense as f32 * 0.01).clamp(0.1, 1.0)
    }

    fn apply_loss(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_sub(amount);
        before - self.health
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_no_defense() {
        let mut attr = Attribute::new(100, 10, 0);
        let applied = attr.take_damage(30);
        assert_eq!(applied, 30);
        assert_eq!(attr.health, 70);
        assert!(attr.is_alive());
    }

    #[test]
    fn test_damage_with_defense() {
        // 20 defense → множитель 0.8 → 30 * 0.8 = 24
        let mut attr = Attribute::new(100, 10, 20);
        let applied = attr.take_damage(30);
        assert_eq!(applied, 24);
        assert_eq!(attr.health, 76);
    }

    #[test]
    fn test_defense_floor() {
        // 200 defense не обнуляет урон: пол 10%
        let mut attr = Attribute::new(100, 10, 200);
        let applied = attr.take_damage(100);
        assert_eq!(applied, 10);
    }

    #[test]
    fn test_true_damage_ignores_defense() {
        let mut attr = Attribute::new(100, 10, 50);
        let applied = attr.take_true_damage(40);
        assert_eq!(applied, 40);
        assert_eq!(attr.health, 60);
    }

    #[test]
    fn test_dead_takes_no_damage() {
        let mut attr = Attribute::new(50, 10, 0);
        attr.take_damage(50);
        assert!(!attr.is_alive());

        assert_eq!(attr.take_damage(10), 0);
        assert_eq!(attr.take_true_damage(10), 0);
        assert_eq!(attr.health, 0);
    }

    #[test]
    fn test_heal_clamped_to_max() {
        let mut attr = Attribute::new(100, 10, 0);
        attr.take_damage(50);
        attr.heal(30);
        assert_eq!(attr.health, 80);

        attr.heal(100);
        assert_eq!(attr.health, 100);
    }
}
