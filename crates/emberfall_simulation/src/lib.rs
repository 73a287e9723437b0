//! EMBERFALL Simulation Core
//!
//! ECS-симуляция поведения врагов для 2D action-платформера (strategic layer).
//! Рендер, настоящая физика и animation player — внешние коллабораторы:
//! симуляция общается с ними через узкие интерфейсы (PhysicsWorld queries,
//! AnimatorHost trait, события урона) и продолжает работать, когда их нет.
//!
//! Весь behavioral-тик живёт в FixedUpdate (60Hz), системы выстроены в явную
//! цепочку — порядок фаз и детерминизм важнее параллелизма.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

// Публичные модули
pub mod ai;
pub mod animation;
pub mod combat;
pub mod components;
pub mod logger;
pub mod physics;
pub mod world;

// Re-export базовых типов для удобства
pub use ai::{EnemyState, EscapePlan, Frozen, PerceptionState};
pub use animation::{
    discover_bindings, AnimRole, AnimationBridge, AnimationCallback, AnimatorHost, ParamKind,
    RoleBindings,
};
pub use combat::{
    calculate_damage, AttackPhase, AttackSequence, DamageDealt, DamageRequest, DespawnAfter,
    EntityDied, FreezeRequest, KnockbackRequest,
};
pub use components::*;
pub use world::locator::{locate_center, PrimaryTarget};
pub use world::{Aabb, Hit, LayerMask, PhysicsWorld, StaticCollider, WorldBody};

/// Seed по умолчанию, если хост не вставил свой RNG
const DEFAULT_SEED: u64 = 42;

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        logger::init_logger();

        // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
        app.insert_resource(Time::<Fixed>::from_hz(60.0));

        // Детерминистичный RNG: уважаем уже вставленный хостом seed
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(DEFAULT_SEED));
        }

        app.init_resource::<PhysicsWorld>()
            .init_resource::<PrimaryTarget>();

        // События (коллабораторы и внутренние уведомления)
        app.add_event::<DamageRequest>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .add_event::<KnockbackRequest>()
            .add_event::<FreezeRequest>()
            .add_event::<AnimationCallback>();

        // Один behavioral-тик. Последовательное выполнение для детерминизма.
        app.add_systems(
            FixedUpdate,
            (
                // Фаза 1: синхронизация мира и восприятие
                (
                    world::sync_bodies,
                    world::locator::resolve_primary_target,
                    ai::perception::perceive_targets,
                )
                    .chain(),
                // Фаза 2: внешние уведомления → приоритетные состояния
                (
                    ai::reactions::react_to_death,
                    ai::reactions::react_to_damage,
                    combat::knockback::apply_knockback_requests,
                    combat::status::apply_freeze_requests,
                )
                    .chain(),
                // Фаза 3: арбитраж состояний и движение
                (
                    ai::transitions::tick_facing_cooldowns,
                    ai::transitions::tick_enemy_states,
                    ai::movement::drive_movement,
                    ai::movement::tick_escape_plans,
                )
                    .chain(),
                // Фаза 4: бой и статусы
                (
                    combat::attack::advance_attack_sequences,
                    combat::attack::apply_animation_callbacks,
                    combat::knockback::drive_knockback,
                    combat::status::tick_frozen,
                )
                    .chain(),
                // Фаза 5: урон и уборка трупов
                (
                    combat::damage::apply_damage_requests,
                    combat::damage::despawn_after_timeout,
                )
                    .chain(),
                // Фаза 6: кинематика
                (
                    physics::update_grounded,
                    physics::apply_gravity,
                    physics::suppress_frozen_motion,
                    physics::integrate_velocity,
                )
                    .chain(),
                // Фаза 7: push в аниматор + self-heal рассинхрона
                (
                    animation::sync::push_animation_state,
                    animation::sync::heal_animation_desync,
                )
                    .chain(),
            )
                .chain(),
        );
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Spawn врага с полным набором компонентов
///
/// `animator: None` — допустимый режим: все анимационные вызовы no-op,
/// бой работает чисто по таймерам.
pub fn spawn_enemy(
    world: &mut World,
    position: Vec2,
    config: EnemyConfig,
    shape: AttackShape,
    animator: Option<Arc<dyn AnimatorHost>>,
) -> Entity {
    let config = config.sanitized();
    let bridge = match animator {
        Some(host) => AnimationBridge::new(host),
        None => AnimationBridge::disconnected(),
    };

    world
        .spawn((
            Enemy,
            Actor { faction_id: 2 },
            Attribute::new(50, config.attack_damage, 0),
            EnemyState::default(),
            PerceptionState::default(),
            Facing::default(),
            KinematicBody::default(),
            BodyCollider::new(Vec2::new(0.4, 0.9), LayerMask::ENEMY),
            Transform::from_translation(position.extend(0.0)),
            config,
            shape,
            bridge,
        ))
        .id()
}

/// Spawn игрока-цели (движение игрока — вне этого ядра)
pub fn spawn_player(world: &mut World, position: Vec2) -> Entity {
    world
        .spawn((
            Player,
            Actor { faction_id: 1 },
            Attribute::new(100, 10, 0),
            KinematicBody::default(),
            BodyCollider::new(Vec2::new(0.4, 0.9), LayerMask::PLAYER),
            Transform::from_translation(position.extend(0.0)),
        ))
        .id()
}
