//! Headless арена EMBERFALL
//!
//! Пол, две стены, игрок и враг: смотрим глазами на переходы состояний
//! без рендера и без реального времени.

use bevy::prelude::*;
use emberfall_simulation::*;

fn main() {
    let seed = 42;
    println!("Starting EMBERFALL headless arena (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);

    // Арена: пол y ∈ [-1, 0] и стены по краям
    {
        let mut physics = app.world_mut().resource_mut::<PhysicsWorld>();
        physics.add_static(
            Aabb::new(Vec2::new(-20.0, -1.0), Vec2::new(20.0, 0.0)),
            LayerMask::GROUND,
        );
        physics.add_static(
            Aabb::new(Vec2::new(-13.0, 0.0), Vec2::new(-12.0, 4.0)),
            LayerMask::GROUND,
        );
        physics.add_static(
            Aabb::new(Vec2::new(12.0, 0.0), Vec2::new(13.0, 4.0)),
            LayerMask::GROUND,
        );
    }

    spawn_player(app.world_mut(), Vec2::new(6.0, 0.9));
    spawn_enemy(
        app.world_mut(),
        Vec2::new(-4.0, 0.9),
        EnemyConfig::default(),
        AttackShape::Circle {
            offset: Vec2::new(0.8, 0.0),
            radius: 0.6,
        },
        None,
    );

    // Тикаем вручную: advance_by(timestep) + FixedUpdate, без wall clock
    let timestep = app.world().resource::<Time<Fixed>>().timestep();
    for tick in 0..900u32 {
        app.world_mut()
            .resource_mut::<Time<Fixed>>()
            .advance_by(timestep);
        app.world_mut().run_schedule(FixedUpdate);

        if tick % 60 == 0 {
            let mut query = app.world_mut().query::<(Entity, &EnemyState, &Transform)>();
            for (entity, state, transform) in query.iter(app.world()) {
                println!(
                    "tick {:>3}: {:?} {} at x={:.2}",
                    tick,
                    entity,
                    state.label(),
                    transform.translation.x
                );
            }
        }
    }

    println!("Arena run complete");
}
