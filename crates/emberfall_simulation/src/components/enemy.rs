//! Enemy-специфичные компоненты: конфиг, форма атаки

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Маркер врага (hostile NPC под управлением enemy AI)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Enemy;

/// Политика line-of-sight проверки
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SightPolicy {
    /// Один луч в collision-center цели; любое постороннее попадание = перекрыто
    SingleRay,
    /// Несколько лучей в разные точки цели по вертикали; видимость по простому
    /// большинству. Устойчивее к частичному перекрытию тонкими краями.
    MultiRay { rays: u32 },
}

/// Статическая конфигурация врага (archetype data)
///
/// Загружается из данных, поэтому только скалярные поля.
/// Все значения прогоняются через [`EnemyConfig::sanitized`] при спавне.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyConfig {
    /// Скорость патруля (m/s)
    pub patrol_speed: f32,
    /// Скорость погони (m/s)
    pub chase_speed: f32,

    /// Полуоси эллипса обнаружения (ширина/высота от центра врага)
    pub detection_half_width: f32,
    pub detection_half_height: f32,
    /// Смещение точки глаз от Transform (откуда идут лучи видимости)
    pub sight_origin_y: f32,
    pub sight_policy: SightPolicy,

    /// Полная длительность атаки: telegraph = delay/2, recovery = delay/2,
    /// hit window — ровно в середине
    pub attack_delay: f32,
    pub attack_damage: u32,
    /// Шанс и множитель крита (бросок на детерминированном RNG)
    pub crit_rate: f32,
    pub crit_multiplier: f32,

    pub hurt_duration: f32,
    pub knockback_duration: f32,
    /// Задержка до удаления трупа (даёт проиграться death-анимации)
    pub death_despawn_delay: f32,

    /// Минимальный интервал между разворотами
    pub flip_cooldown: f32,
    /// Мёртвая зона по X: ближе этого к цели не разворачиваемся (анти-дёргание)
    pub flip_dead_zone: f32,
    /// Доля от reach формы атаки, на которой погоня останавливается
    pub stop_range_multiplier: f32,

    /// Дальность лучей проверки стены перед собой
    pub wall_check_distance: f32,
    /// Число лучей wall-check (вердикт по большинству)
    pub wall_rays: u32,
    /// Вертикальный разброс лучей wall-check (полная высота веера)
    pub wall_ray_spread: f32,

    /// Задержка принудительного разворота при тупике в погоне
    pub escape_delay: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            patrol_speed: 3.0,
            chase_speed: 4.5,
            detection_half_width: 10.0,
            detection_half_height: 4.0,
            sight_origin_y: 0.5,
            sight_policy: SightPolicy::MultiRay { rays: 3 },
            attack_delay: 0.5,
            attack_damage: 10,
            crit_rate: 0.1,
            crit_multiplier: 1.5,
            hurt_duration: 0.4,
            knockback_duration: 0.25,
            death_despawn_delay: 2.0,
            flip_cooldown: 0.3,
            flip_dead_zone: 0.5,
            stop_range_multiplier: 0.8,
            wall_check_distance: 0.2,
            wall_rays: 3,
            wall_ray_spread: 0.8,
            escape_delay: 0.8,
        }
    }
}

impl EnemyConfig {
    /// Приводит конфиг к безопасным значениям вместо ошибки.
    ///
    /// Кривые данные (нулевые лучи, отрицательные дистанции) — не повод
    /// ронять спавн: зажимаем и логируем.
    pub fn sanitized(self) -> Self {
        let mut cfg = self.clone();
        cfg.patrol_speed = cfg.patrol_speed.max(0.0);
        cfg.chase_speed = cfg.chase_speed.max(0.0);
        cfg.detection_half_width = cfg.detection_half_width.max(0.1);
        cfg.detection_half_height = cfg.detection_half_height.max(0.1);
        cfg.attack_delay = cfg.attack_delay.max(0.1);
        cfg.crit_rate = cfg.crit_rate.clamp(0.0, 1.0);
        cfg.crit_multiplier = cfg.crit_multiplier.max(1.0);
        cfg.hurt_duration = cfg.hurt_duration.max(0.05);
        cfg.knockback_duration = cfg.knockback_duration.max(0.05);
        cfg.death_despawn_delay = cfg.death_despawn_delay.max(0.0);
        cfg.flip_cooldown = cfg.flip_cooldown.max(0.0);
        cfg.flip_dead_zone = cfg.flip_dead_zone.max(0.0);
        cfg.stop_range_multiplier = cfg.stop_range_multiplier.clamp(0.1, 1.0);
        cfg.wall_check_distance = cfg.wall_check_distance.max(0.05);
        cfg.wall_rays = cfg.wall_rays.max(1);
        cfg.wall_ray_spread = cfg.wall_ray_spread.max(0.0);
        cfg.escape_delay = cfg.escape_delay.max(0.1);
        if let SightPolicy::MultiRay { rays } = &mut cfg.sight_policy {
            *rays = (*rays).max(1);
        }
        if cfg != self {
            crate::logger::log_warning("⚙️ EnemyConfig had out-of-range values — clamped to safe minimums");
        }
        cfg
    }

    /// Дистанция остановки погони перед атакой
    pub fn stop_range(&self, shape: &AttackShape) -> f32 {
        shape.reach() * self.stop_range_multiplier
    }

    /// Watchdog атаки: 1.5× полной длительности
    pub fn attack_watchdog(&self) -> f32 {
        self.attack_delay * 1.5
    }
}

/// Форма melee-атаки относительно attack origin
#[derive(Component, Debug, Clone, Reflect)]
pub enum AttackShape {
    Circle {
        offset: Vec2,
        radius: f32,
    },
    Box {
        offset: Vec2,
        size: Vec2,
        angle_deg: f32,
        /// Зеркалить offset.x и угол при взгляде влево
        mirror_with_facing: bool,
    },
}

/// Форма атаки, приведённая к мировым координатам с учётом facing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedAttackShape {
    Circle { center: Vec2, radius: f32 },
    Box { center: Vec2, size: Vec2, angle_deg: f32 },
}

impl AttackShape {
    /// Мировая форма атаки для данного origin и направления взгляда
    pub fn resolve(&self, origin: Vec2, facing_sign: f32) -> ResolvedAttackShape {
        match *self {
            AttackShape::Circle { offset, radius } => ResolvedAttackShape::Circle {
                // X-смещение всегда следует за взглядом
                center: origin + Vec2::new(offset.x * facing_sign, offset.y),
                radius: radius.max(0.05),
            },
            AttackShape::Box {
                offset,
                size,
                angle_deg,
                mirror_with_facing,
            } => {
                let (off_x, angle) = if mirror_with_facing {
                    (offset.x * facing_sign, angle_deg * facing_sign)
                } else {
                    (offset.x, angle_deg)
                };
                ResolvedAttackShape::Box {
                    center: origin + Vec2::new(off_x, offset.y),
                    size: size.max(Vec2::splat(0.1)),
                    angle_deg: angle,
                }
            }
        }
    }

    /// Горизонтальный "вылет" формы — база для stop-to-attack радиуса
    pub fn reach(&self) -> f32 {
        match *self {
            AttackShape::Circle { offset, radius } => offset.x.abs() + radius,
            AttackShape::Box { offset, size, .. } => offset.x.abs() + size.x * 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_clamps_bad_values() {
        let config = EnemyConfig {
            wall_rays: 0,
            detection_half_width: -5.0,
            attack_delay: 0.0,
            stop_range_multiplier: 7.0,
            sight_policy: SightPolicy::MultiRay { rays: 0 },
            ..Default::default()
        }
        .sanitized();

        assert_eq!(config.wall_rays, 1);
        assert!(config.detection_half_width > 0.0);
        assert!(config.attack_delay >= 0.1);
        assert!(config.stop_range_multiplier <= 1.0);
        assert!(matches!(config.sight_policy, SightPolicy::MultiRay { rays: 1 }));
    }

    #[test]
    fn test_circle_offset_mirrors_with_facing() {
        let shape = AttackShape::Circle {
            offset: Vec2::new(1.0, 0.2),
            radius: 0.5,
        };

        let right = shape.resolve(Vec2::ZERO, 1.0);
        let left = shape.resolve(Vec2::ZERO, -1.0);

        assert_eq!(
            right,
            ResolvedAttackShape::Circle {
                center: Vec2::new(1.0, 0.2),
                radius: 0.5
            }
        );
        assert_eq!(
            left,
            ResolvedAttackShape::Circle {
                center: Vec2::new(-1.0, 0.2),
                radius: 0.5
            }
        );
    }

    #[test]
    fn test_box_mirror_flag() {
        let mirrored = AttackShape::Box {
            offset: Vec2::new(1.0, 0.0),
            size: Vec2::new(2.0, 1.0),
            angle_deg: 15.0,
            mirror_with_facing: true,
        };
        let fixed = AttackShape::Box {
            offset: Vec2::new(1.0, 0.0),
            size: Vec2::new(2.0, 1.0),
            angle_deg: 15.0,
            mirror_with_facing: false,
        };

        match mirrored.resolve(Vec2::ZERO, -1.0) {
            ResolvedAttackShape::Box { center, angle_deg, .. } => {
                assert_eq!(center.x, -1.0);
                assert_eq!(angle_deg, -15.0);
            }
            _ => unreachable!(),
        }

        match fixed.resolve(Vec2::ZERO, -1.0) {
            ResolvedAttackShape::Box { center, angle_deg, .. } => {
                assert_eq!(center.x, 1.0);
                assert_eq!(angle_deg, 15.0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_shape_reach() {
        let circle = AttackShape::Circle {
            offset: Vec2::new(1.0, 0.0),
            radius: 0.5,
        };
        let boxy = AttackShape::Box {
            offset: Vec2::new(0.5, 0.0),
            size: Vec2::new(2.0, 1.0),
            angle_deg: 0.0,
            mirror_with_facing: true,
        };

        assert_eq!(circle.reach(), 1.5);
        assert_eq!(boxy.reach(), 1.5);
    }
}
