//! Physics world коллаборатор (2D spatial queries)
//!
//! Симуляция не владеет полноценной физикой — ей нужны только read-only
//! запросы: raycast, overlap circle/box. Хост может заменить геометрию на
//! свою (тайлмапа уровня), ECS-тела синхронизируются сюда каждый тик.
//!
//! - statics: неподвижная геометрия уровня (пол, стены) как AABB
//! - bodies: коллайдеры акторов, пересобираются системой `sync_bodies`

use bevy::prelude::*;
use bitflags::bitflags;

use crate::components::BodyCollider;

pub mod locator;
pub mod probe;

bitflags! {
    /// Слои коллизий (аналог физических layer'ов движка)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LayerMask: u32 {
        const GROUND = 1 << 0;
        const PLAYER = 1 << 1;
        const ENEMY  = 1 << 2;
    }
}

/// Осепараллельный прямоугольник
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_half(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }
}

/// Неподвижный коллайдер уровня
#[derive(Debug, Clone, Copy)]
pub struct StaticCollider {
    pub aabb: Aabb,
    pub layers: LayerMask,
}

/// Снапшот коллайдера актора (синхронизируется из ECS каждый тик)
#[derive(Debug, Clone, Copy)]
pub struct WorldBody {
    pub entity: Entity,
    pub center: Vec2,
    pub half_extents: Vec2,
    pub layers: LayerMask,
}

impl WorldBody {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_half(self.center, self.half_extents)
    }
}

/// Результат raycast: что задели и где
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    /// None — статическая геометрия уровня
    pub entity: Option<Entity>,
    pub distance: f32,
    pub point: Vec2,
}

/// Мир spatial-запросов (resource)
#[derive(Resource, Debug, Default)]
pub struct PhysicsWorld {
    statics: Vec<StaticCollider>,
    bodies: Vec<WorldBody>,
}

impl PhysicsWorld {
    pub fn add_static(&mut self, aabb: Aabb, layers: LayerMask) {
        self.statics.push(StaticCollider { aabb, layers });
    }

    pub fn set_bodies(&mut self, bodies: Vec<WorldBody>) {
        self.bodies = bodies;
    }

    pub fn body(&self, entity: Entity) -> Option<&WorldBody> {
        self.bodies.iter().find(|b| b.entity == entity)
    }

    /// Ближайшее попадание луча по маске слоёв
    pub fn raycast_first(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
        exclude: Option<Entity>,
    ) -> Option<Hit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec2::ZERO || max_distance <= 0.0 {
            return None;
        }

        let mut best: Option<Hit> = None;

        let mut consider = |entity: Option<Entity>, t: f32| {
            if best.map_or(true, |b| t < b.distance) {
                best = Some(Hit {
                    entity,
                    distance: t,
                    point: origin + dir * t,
                });
            }
        };

        for collider in &self.statics {
            if !collider.layers.intersects(mask) {
                continue;
            }
            if let Some(t) = ray_aabb(origin, dir, max_distance, &collider.aabb) {
                consider(None, t);
            }
        }

        for body in &self.bodies {
            if Some(body.entity) == exclude || !body.layers.intersects(mask) {
                continue;
            }
            if let Some(t) = ray_aabb(origin, dir, max_distance, &body.aabb()) {
                consider(Some(body.entity), t);
            }
        }

        best
    }

    /// Акторы, задетые кругом
    pub fn overlap_circle(
        &self,
        center: Vec2,
        radius: f32,
        mask: LayerMask,
        exclude: Option<Entity>,
    ) -> Vec<Entity> {
        self.bodies
            .iter()
            .filter(|b| Some(b.entity) != exclude && b.layers.intersects(mask))
            .filter(|b| circle_aabb_overlap(center, radius, &b.aabb()))
            .map(|b| b.entity)
            .collect()
    }

    /// Акторы, задетые повёрнутым прямоугольником
    pub fn overlap_box(
        &self,
        center: Vec2,
        size: Vec2,
        angle_deg: f32,
        mask: LayerMask,
        exclude: Option<Entity>,
    ) -> Vec<Entity> {
        self.bodies
            .iter()
            .filter(|b| Some(b.entity) != exclude && b.layers.intersects(mask))
            .filter(|b| obb_aabb_overlap(center, size, angle_deg, &b.aabb()))
            .map(|b| b.entity)
            .collect()
    }
}

/// Система: пересборка списка тел из ECS
///
/// Сортировка по entity index — стабильный порядок перебора в запросах.
pub fn sync_bodies(
    mut world: ResMut<PhysicsWorld>,
    query: Query<(Entity, &Transform, &BodyCollider)>,
) {
    let mut bodies: Vec<WorldBody> = query
        .iter()
        .map(|(entity, transform, collider)| WorldBody {
            entity,
            center: collider.center(transform.translation.truncate()),
            half_extents: collider.half_extents,
            layers: collider.layers,
        })
        .collect();
    bodies.sort_by_key(|b| b.entity.index());
    world.set_bodies(bodies);
}

// ============================================================================
// Геометрия
// ============================================================================

/// Slab-тест луча против AABB. Возвращает дистанцию до входа (0 если внутри).
fn ray_aabb(origin: Vec2, dir: Vec2, max_distance: f32, aabb: &Aabb) -> Option<f32> {
    let mut t_min = 0.0f32;
    let mut t_max = max_distance;

    for axis in 0..2 {
        let (o, d, lo, hi) = if axis == 0 {
            (origin.x, dir.x, aabb.min.x, aabb.max.x)
        } else {
            (origin.y, dir.y, aabb.min.y, aabb.max.y)
        };

        if d.abs() < 1e-6 {
            // Луч параллелен оси: либо внутри слэба, либо мимо
            if o < lo || o > hi {
                return None;
            }
        } else {
            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
    }

    Some(t_min)
}

fn circle_aabb_overlap(center: Vec2, radius: f32, aabb: &Aabb) -> bool {
    let closest = center.clamp(aabb.min, aabb.max);
    closest.distance_squared(center) <= radius * radius
}

/// SAT по четырём осям: X, Y и две оси OBB
fn obb_aabb_overlap(center: Vec2, size: Vec2, angle_deg: f32, aabb: &Aabb) -> bool {
    let ax = Vec2::from_angle(angle_deg.to_radians());
    let ay = ax.perp();
    let half = size * 0.5;

    let obb_corners = [
        center + ax * half.x + ay * half.y,
        center + ax * half.x - ay * half.y,
        center - ax * half.x + ay * half.y,
        center - ax * half.x - ay * half.y,
    ];
    let aabb_corners = aabb.corners();

    for axis in [Vec2::X, Vec2::Y, ax, ay] {
        let (a_lo, a_hi) = project(&obb_corners, axis);
        let (b_lo, b_hi) = project(&aabb_corners, axis);
        if a_hi < b_lo || b_hi < a_lo {
            return false;
        }
    }
    true
}

fn project(corners: &[Vec2; 4], axis: Vec2) -> (f32, f32) {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for corner in corners {
        let d = corner.dot(axis);
        lo = lo.min(d);
        hi = hi.max(d);
    }
    (lo, hi)
}
