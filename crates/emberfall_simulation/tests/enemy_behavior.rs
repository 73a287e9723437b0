//! Поведенческие тесты enemy AI на headless-арене
//!
//! Тикаем FixedUpdate вручную (advance_by + run_schedule): никакого wall
//! clock, каждый тест полностью детерминирован.

use bevy::prelude::*;
use emberfall_simulation::*;

// --- Helpers ---

/// Один fixed-тик симуляции
fn tick(app: &mut App) {
    let timestep = app.world().resource::<Time<Fixed>>().timestep();
    app.world_mut()
        .resource_mut::<Time<Fixed>>()
        .advance_by(timestep);
    app.world_mut().run_schedule(FixedUpdate);
}

fn tick_n(app: &mut App, n: u32) {
    for _ in 0..n {
        tick(app);
    }
}

/// App с плоским полом во всю арену
fn build_app() -> App {
    let mut app = create_headless_app(7);
    app.add_plugins(SimulationPlugin);
    {
        let mut physics = app.world_mut().resource_mut::<PhysicsWorld>();
        physics.add_static(
            Aabb::new(Vec2::new(-30.0, -1.0), Vec2::new(30.0, 0.0)),
            LayerMask::GROUND,
        );
    }
    app
}

/// Конфиг без критов — урон предсказуем до единицы
fn test_config() -> EnemyConfig {
    EnemyConfig {
        crit_rate: 0.0,
        ..Default::default()
    }
}

fn test_shape() -> AttackShape {
    AttackShape::Circle {
        offset: Vec2::new(0.8, 0.0),
        radius: 0.6,
    }
}

fn enemy_state(app: &App, entity: Entity) -> EnemyState {
    app.world()
        .get::<EnemyState>(entity)
        .expect("enemy should have a state")
        .clone()
}

fn player_health(app: &App, player: Entity) -> u32 {
    app.world().get::<Attribute>(player).unwrap().health
}

fn velocity_x(app: &App, entity: Entity) -> f32 {
    app.world().get::<KinematicBody>(entity).unwrap().velocity.x
}

fn hit_enemy(app: &mut App, attacker: Entity, enemy: Entity, amount: u32) {
    app.world_mut().send_event(DamageRequest {
        attacker,
        target: enemy,
        amount,
        crit_rate: 0.0,
        crit_multiplier: 1.0,
    });
}

// --- Scenario A: обнаружение ---

#[test]
fn test_patrol_to_chase_within_one_tick() {
    let mut app = build_app();
    spawn_player(app.world_mut(), Vec2::new(5.0, 0.9));
    let enemy = spawn_enemy(
        app.world_mut(),
        Vec2::new(0.0, 0.9),
        test_config(),
        test_shape(),
        None,
    );

    assert!(matches!(enemy_state(&app, enemy), EnemyState::Patrol));

    // Игрок в эллипсе, line of sight чистый, до атаки далеко
    tick(&mut app);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Chase));
    assert!(velocity_x(&app, enemy) > 0.0, "chase должен двигать к цели");
}

#[test]
fn test_out_of_range_target_not_chased() {
    let mut app = build_app();
    spawn_player(app.world_mut(), Vec2::new(25.0, 0.9)); // за эллипсом (a=10)
    let enemy = spawn_enemy(
        app.world_mut(),
        Vec2::new(0.0, 0.9),
        test_config(),
        test_shape(),
        None,
    );

    tick_n(&mut app, 5);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Patrol));
}

#[test]
fn test_lost_line_of_sight_drops_chase() {
    let mut app = build_app();
    // Высокая стена между врагом и игроком
    {
        let mut physics = app.world_mut().resource_mut::<PhysicsWorld>();
        physics.add_static(
            Aabb::new(Vec2::new(2.5, 0.0), Vec2::new(3.0, 6.0)),
            LayerMask::GROUND,
        );
    }
    spawn_player(app.world_mut(), Vec2::new(6.0, 0.9));
    let enemy = spawn_enemy(
        app.world_mut(),
        Vec2::new(0.0, 0.9),
        test_config(),
        test_shape(),
        None,
    );

    // В эллипсе, но за стеной: видимости нет, патрулируем
    tick_n(&mut app, 3);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Patrol));
}

// --- Scenario B: атака и hit window ---

#[test]
fn test_attack_applies_damage_once_per_cycle() {
    let mut app = build_app();
    let player = spawn_player(app.world_mut(), Vec2::new(1.2, 0.9));
    let enemy = spawn_enemy(
        app.world_mut(),
        Vec2::new(0.0, 0.9),
        test_config(),
        test_shape(),
        None,
    );

    // Цель сразу в форме атаки → Attack на первом тике
    tick(&mut app);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Attack));
    assert_eq!(player_health(&app, player), 100, "в telegraph урона нет");

    // Глубоко в telegraph урона всё ещё нет
    tick_n(&mut app, 12);
    assert_eq!(player_health(&app, player), 100);

    // Hit window в середине attack_delay (0.25s ≈ 15 тиков, ±1 на округление)
    tick_n(&mut app, 4);
    assert_eq!(player_health(&app, player), 90);

    // До конца recovery второй раз не бьёт
    tick_n(&mut app, 8);
    assert_eq!(player_health(&app, player), 90);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Attack));

    // Recovery кончился, мог начаться новый цикл — его hit window ещё впереди
    tick_n(&mut app, 9);
    assert_eq!(player_health(&app, player), 90);

    // Второй цикл бьёт ровно один раз в своё hit window
    tick_n(&mut app, 15);
    assert_eq!(player_health(&app, player), 80);
}

// --- Scenario C: смерть посреди атаки ---

#[test]
fn test_death_mid_attack_cancels_hit_and_schedules_despawn() {
    let mut app = build_app();
    let player = spawn_player(app.world_mut(), Vec2::new(1.2, 0.9));
    let enemy = spawn_enemy(
        app.world_mut(),
        Vec2::new(0.0, 0.9),
        test_config(),
        test_shape(),
        None,
    );

    tick(&mut app);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Attack));

    // Убиваем в telegraph (HP врага = 50)
    tick_n(&mut app, 4);
    hit_enemy(&mut app, player, enemy, 999);
    tick_n(&mut app, 2); // урон → EntityDied → react_to_death

    assert!(matches!(enemy_state(&app, enemy), EnemyState::Dead));
    assert!(app.world().get::<AttackSequence>(enemy).is_none());
    assert!(app.world().get::<DespawnAfter>(enemy).is_some());

    // Hit window так и не случается
    tick_n(&mut app, 20);
    assert_eq!(player_health(&app, player), 100);

    // Dead терминален до самого despawn
    for _ in 0..100 {
        tick(&mut app);
        if app.world().get::<EnemyState>(enemy).is_none() {
            break;
        }
        assert!(matches!(enemy_state(&app, enemy), EnemyState::Dead));
    }

    // Таймаут despawn (2.0s = 120 тиков) истёк — entity убран
    tick_n(&mut app, 10);
    assert!(app.world().get::<EnemyState>(enemy).is_none());
}

// --- Scenario D: тупик в погоне ---

#[test]
fn test_dead_end_halts_and_schedules_escape() {
    let mut app = build_app();
    // Низкий коридор: стены с двух сторон, игрок виден поверх них
    {
        let mut physics = app.world_mut().resource_mut::<PhysicsWorld>();
        physics.add_static(
            Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.2)),
            LayerMask::GROUND,
        );
        physics.add_static(
            Aabb::new(Vec2::new(2.0, 0.0), Vec2::new(3.0, 1.2)),
            LayerMask::GROUND,
        );
    }
    spawn_player(app.world_mut(), Vec2::new(6.0, 0.9));
    let enemy = spawn_enemy(
        app.world_mut(),
        Vec2::new(1.5, 0.9),
        test_config(),
        test_shape(),
        None,
    );

    tick(&mut app);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Chase));
    assert_eq!(velocity_x(&app, enemy), 0.0, "в тупике стоим");
    assert!(
        app.world().get::<EscapePlan>(enemy).is_some(),
        "запланирован отложенный разворот"
    );
    // Немедленного второго flip нет
    assert_eq!(app.world().get::<Facing>(enemy).unwrap().sign, 1.0);

    // После escape_delay (0.8s = 48 тиков) — принудительный разворот
    tick_n(&mut app, 50);
    assert_eq!(app.world().get::<Facing>(enemy).unwrap().sign, -1.0);
}

// --- Hurt: подавление повторного входа ---

#[test]
fn test_hurt_reentry_does_not_restart_timer() {
    let mut app = build_app();
    let player = spawn_player(app.world_mut(), Vec2::new(25.0, 0.9)); // вне эллипса
    let enemy = spawn_enemy(
        app.world_mut(),
        Vec2::new(0.0, 0.9),
        test_config(),
        test_shape(),
        None,
    );

    hit_enemy(&mut app, player, enemy, 5);
    tick_n(&mut app, 2);
    let EnemyState::Hurt { timer: first } = enemy_state(&app, enemy) else {
        panic!("должен быть Hurt");
    };

    // Второй удар, пока stagger идёт
    hit_enemy(&mut app, player, enemy, 5);
    tick_n(&mut app, 2);
    let EnemyState::Hurt { timer: second } = enemy_state(&app, enemy) else {
        panic!("Hurt не должен прерваться");
    };

    assert!(
        second < first,
        "таймер не перезапущен: {} должен быть меньше {}",
        second,
        first
    );

    // Stagger кончился → назад в Patrol (игрока не видно)
    tick_n(&mut app, 30);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Patrol));
}

// --- Прерывание атаки уроном до hit window ---

#[test]
fn test_damage_during_telegraph_cancels_hit() {
    let mut app = build_app();
    let player = spawn_player(app.world_mut(), Vec2::new(1.2, 0.9));
    let enemy = spawn_enemy(
        app.world_mut(),
        Vec2::new(0.0, 0.9),
        test_config(),
        test_shape(),
        None,
    );

    tick(&mut app);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Attack));

    // Удар строго между telegraph и hit window
    tick_n(&mut app, 4);
    hit_enemy(&mut app, player, enemy, 5);
    tick_n(&mut app, 2);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Hurt { .. }));

    // Далеко за момент несостоявшегося hit window: урона по игроку нет
    tick_n(&mut app, 30);
    assert_eq!(player_health(&app, player), 100);
}

// --- Knockback ---

#[test]
fn test_knockback_stops_at_wall_but_keeps_duration() {
    let mut app = build_app();
    {
        let mut physics = app.world_mut().resource_mut::<PhysicsWorld>();
        physics.add_static(
            Aabb::new(Vec2::new(3.0, 0.0), Vec2::new(4.0, 3.0)),
            LayerMask::GROUND,
        );
    }
    spawn_player(app.world_mut(), Vec2::new(-25.0, 0.9)); // невидим
    let enemy = spawn_enemy(
        app.world_mut(),
        Vec2::new(0.0, 0.9),
        test_config(),
        test_shape(),
        None,
    );

    app.world_mut().send_event(KnockbackRequest {
        target: enemy,
        force: 5.0,
        to_right: true,
    });
    tick(&mut app);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Knockback { .. }));

    // Повторный запрос в полёте игнорируется (направление не меняется)
    app.world_mut().send_event(KnockbackRequest {
        target: enemy,
        force: 5.0,
        to_right: false,
    });
    tick_n(&mut app, 2);
    match enemy_state(&app, enemy) {
        EnemyState::Knockback { dir, .. } => assert_eq!(dir, 1.0),
        other => panic!("ожидался Knockback, а не {:?}", other),
    }

    // Упёрлись в стену: смещение остановлено, таймер дотекает
    tick_n(&mut app, 7);
    let x_blocked = app.world().get::<Transform>(enemy).unwrap().translation.x;
    assert!(x_blocked < 2.7, "в стену не въехали: x = {}", x_blocked);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Knockback { .. }));

    // Полная длительность (0.25s = 15 тиков) истекла → обычный арбитраж
    tick_n(&mut app, 8);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Patrol));
    let x_after = app.world().get::<Transform>(enemy).unwrap().translation.x;
    assert!(x_after < 2.7);
}

// --- Freeze: движение глушится, состояние нет ---

#[test]
fn test_freeze_suppresses_motion_without_changing_state() {
    let mut app = build_app();
    spawn_player(app.world_mut(), Vec2::new(-25.0, 0.9));
    let enemy = spawn_enemy(
        app.world_mut(),
        Vec2::new(0.0, 0.9),
        test_config(),
        test_shape(),
        None,
    );

    tick_n(&mut app, 3); // патруль разогнался
    assert!(velocity_x(&app, enemy) != 0.0);

    app.world_mut().send_event(FreezeRequest {
        target: enemy,
        duration: 0.5,
    });
    tick_n(&mut app, 2);
    assert!(app.world().get::<Frozen>(enemy).is_some());

    let x_frozen = app.world().get::<Transform>(enemy).unwrap().translation.x;
    tick_n(&mut app, 10);
    let x_later = app.world().get::<Transform>(enemy).unwrap().translation.x;
    assert_eq!(x_frozen, x_later, "замороженный не движется");
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Patrol));

    // Оттаял — снова патрулирует
    tick_n(&mut app, 30);
    assert!(app.world().get::<Frozen>(enemy).is_none());
    assert!(velocity_x(&app, enemy) != 0.0);
}

// --- Анимационный мост на живом «аниматоре» ---

mod recording {
    use super::*;
    use std::sync::{Arc, Mutex};

    pub struct RecordingAnimator {
        params: Vec<(String, ParamKind)>,
        pub calls: Mutex<Vec<String>>,
    }

    impl RecordingAnimator {
        pub fn new(params: &[(&str, ParamKind)]) -> Arc<Self> {
            Arc::new(Self {
                params: params.iter().map(|(n, k)| (n.to_string(), *k)).collect(),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    impl AnimatorHost for RecordingAnimator {
        fn list_parameters(&self) -> Vec<(String, ParamKind)> {
            self.params.clone()
        }
        fn set_bool(&self, name: &str, value: bool) {
            self.calls.lock().unwrap().push(format!("set_bool {} {}", name, value));
        }
        fn set_trigger(&self, name: &str) {
            self.calls.lock().unwrap().push(format!("trigger {}", name));
        }
        fn reset_trigger(&self, name: &str) {
            self.calls.lock().unwrap().push(format!("reset {}", name));
        }
        fn play_clip(&self, name: &str) -> bool {
            self.calls.lock().unwrap().push(format!("play {}", name));
            true
        }
        fn current_state(&self) -> Option<(String, f32)> {
            None
        }
    }
}

#[test]
fn test_animator_receives_hurt_and_attack_but_not_dead() {
    use recording::RecordingAnimator;

    let mut app = build_app();
    let player = spawn_player(app.world_mut(), Vec2::new(1.2, 0.9));

    // У аниматора есть hurt и attack, роли Dead нет вообще
    let animator = RecordingAnimator::new(&[
        ("isHurt", ParamKind::Bool),
        ("AttackTrigger", ParamKind::Trigger),
    ]);
    let enemy = spawn_enemy(
        app.world_mut(),
        Vec2::new(0.0, 0.9),
        test_config(),
        test_shape(),
        Some(animator.clone()),
    );

    // Атака → trigger по найденному имени
    tick(&mut app);
    assert!(animator
        .calls
        .lock()
        .unwrap()
        .iter()
        .any(|c| c == "trigger AttackTrigger"));

    // Урон → Hurt bool
    tick_n(&mut app, 2);
    hit_enemy(&mut app, player, enemy, 5);
    tick_n(&mut app, 3);
    assert!(animator
        .calls
        .lock()
        .unwrap()
        .iter()
        .any(|c| c == "set_bool isHurt true"));

    // Смерть: Dead-роль не привязана — никаких мутаций с "dead"
    hit_enemy(&mut app, player, enemy, 999);
    tick_n(&mut app, 5);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Dead));
    let calls = animator.calls.lock().unwrap();
    assert!(
        !calls.iter().any(|c| c.to_lowercase().contains("dead")),
        "небазированные вызовы: {:?}",
        calls
    );
}

// --- Animation callback'и: кто первый завершил, тот и завершил ---

#[test]
fn test_attack_end_callback_closes_cycle_without_damage() {
    let mut app = build_app();
    let player = spawn_player(app.world_mut(), Vec2::new(1.2, 0.9));
    let enemy = spawn_enemy(
        app.world_mut(),
        Vec2::new(0.0, 0.9),
        test_config(),
        test_shape(),
        None,
    );

    tick(&mut app);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Attack));
    tick_n(&mut app, 3);

    // Аниматор оборвал атаку до hit window
    app.world_mut()
        .send_event(AnimationCallback::AttackEnd { entity: enemy });
    tick(&mut app);

    assert!(matches!(enemy_state(&app, enemy), EnemyState::Chase));
    assert!(app.world().get::<AttackSequence>(enemy).is_none());

    // Оборванный цикл не нанёс урона (новый ещё не дошёл до hit window)
    tick_n(&mut app, 10);
    assert_eq!(player_health(&app, player), 100);
}

#[test]
fn test_hurt_end_callback_recovers_early() {
    let mut app = build_app();
    let player = spawn_player(app.world_mut(), Vec2::new(25.0, 0.9)); // невидим
    let enemy = spawn_enemy(
        app.world_mut(),
        Vec2::new(0.0, 0.9),
        test_config(),
        test_shape(),
        None,
    );

    hit_enemy(&mut app, player, enemy, 5);
    tick_n(&mut app, 2);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Hurt { .. }));

    // Hurt-анимация закончилась раньше таймера (0.4s ещё далеко)
    app.world_mut()
        .send_event(AnimationCallback::HurtEnd { entity: enemy });
    tick(&mut app);
    assert!(matches!(enemy_state(&app, enemy), EnemyState::Patrol));
}

// --- Долгий прогон без паники + инварианты ---

#[test]
fn test_long_run_invariants() {
    let mut app = build_app();
    let player = spawn_player(app.world_mut(), Vec2::new(4.0, 0.9));
    let enemy = spawn_enemy(
        app.world_mut(),
        Vec2::new(-4.0, 0.9),
        test_config(),
        test_shape(),
        None,
    );

    for tick_no in 0..600 {
        tick(&mut app);

        if let Some(attr) = app.world().get::<Attribute>(player) {
            assert!(
                attr.health <= attr.max_health,
                "tick {}: health инвариант игрока сломан",
                tick_no
            );
        }
        if let Some(attr) = app.world().get::<Attribute>(enemy) {
            assert!(attr.health <= attr.max_health);
        }
        if let Some(facing) = app.world().get::<Facing>(enemy) {
            assert!(facing.sign == 1.0 || facing.sign == -1.0);
        }
    }
}
