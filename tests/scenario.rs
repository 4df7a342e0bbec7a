//! End-to-end simulation scenarios.

use glam::{Vec2, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reverie::render::software::SoftwareBackend;
use reverie::render::RenderPipeline;
use reverie::{Driver, Emitter, ForceField, ParticlePool, ReverieConfig};

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_three_particles_expire_after_twelve_and_a_half_seconds() {
    let mut pool = ParticlePool::new(100).with_force(ForceField::default());
    for _ in 0..3 {
        assert!(pool.spawn(Vec2::ZERO, Vec2::ZERO, Vec4::ONE, 5.0, 3.0));
    }

    for step in 0..5 {
        pool.update(2.5);
        if step == 0 {
            assert_eq!(pool.len(), 3);
        }
    }

    assert_eq!(pool.len(), 0);
    assert!(pool.particles().next().is_none());
    assert_eq!(pool.stats().expired, 3);
    assert!((pool.time() - 12.5).abs() < 1e-6);
}

#[test]
fn test_capacity_plus_one() {
    let capacity = 32;
    let mut pool = ParticlePool::new(capacity);
    for i in 0..=capacity {
        pool.spawn(Vec2::splat(i as f32), Vec2::ZERO, Vec4::ONE, 1.0, 1.0);
    }
    assert_eq!(pool.len(), capacity);
    assert_eq!(pool.stats().dropped, 1);
}

#[test]
fn test_velocity_integration_without_force() {
    let mut pool = ParticlePool::new(1);
    let start = Vec2::new(5.0, -3.0);
    pool.spawn(start, Vec2::new(10.0, 0.0), Vec4::ONE, 10.0, 2.0);
    pool.update(1.0);

    let p = pool.particles().next().unwrap();
    assert!((p.position - (start + Vec2::new(10.0, 0.0))).length() < 1e-5);
    assert!((p.lifetime - 9.0).abs() < 1e-6);
}

#[test]
fn test_expiry_across_uneven_steps() {
    let mut pool = ParticlePool::new(4);
    pool.spawn(Vec2::ZERO, Vec2::ZERO, Vec4::ONE, 1.0, 1.0);
    for dt in [0.3, 0.3, 0.3] {
        pool.update(dt);
        assert_eq!(pool.len(), 1);
    }
    pool.update(0.2);
    assert!(pool.is_empty());
}

// ============================================================================
// Randomized invariants
// ============================================================================

#[test]
fn test_random_spawn_update_sequences_respect_capacity() {
    let mut rng = StdRng::seed_from_u64(0xDEC0DE);
    let capacity = 50;
    let mut pool = ParticlePool::new(capacity)
        .with_force(ForceField::default())
        .with_force(ForceField::Vortex {
            center: Vec2::new(100.0, 100.0),
            attraction: 400.0,
            spiral: 250.0,
        });

    for _ in 0..500 {
        if rng.gen_bool(0.7) {
            let pos = Vec2::new(rng.gen_range(0.0..200.0), rng.gen_range(0.0..200.0));
            let vel = Vec2::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0));
            pool.spawn(pos, vel, Vec4::ONE, rng.gen_range(0.1..3.0), 2.0);
        } else {
            let before: Vec<f32> = pool.particles().map(|p| p.lifetime).collect();
            let dt = rng.gen_range(0.01..0.5);
            pool.update(dt);
            assert!(pool.particles().all(|p| p.is_alive()));
            // Every survivor lost exactly dt.
            let lost_dt = pool
                .particles()
                .all(|p| before.iter().any(|&l| (l - dt - p.lifetime).abs() < 1e-5));
            assert!(lost_dt);
        }
        assert!(pool.len() <= capacity);
    }
}

// ============================================================================
// Full frame loop
// ============================================================================

#[test]
fn test_driver_reaches_steady_state_under_capacity() {
    let config = ReverieConfig::default()
        .with_size(128, 72)
        .with_capacity(500)
        .with_emitters(vec![
            Emitter::new(Vec2::ZERO).with_lifetime(0.5),
            Emitter::new(Vec2::new(64.0, 0.0)).with_lifetime(0.5),
        ]);
    let mut driver = Driver::from_config(&config);
    let mut backend = SoftwareBackend::new();
    let mut pipeline = RenderPipeline::new(config.width, config.height)
        .with_background(config.background_color());

    for _ in 0..120 {
        driver.step(1.0 / 60.0);
        driver.render(&mut pipeline, &mut backend).unwrap();
    }

    // 10 spawns per frame with a half-second lifetime stays near 300 live.
    let live = driver.pool().len();
    assert!(live > 250 && live <= 310, "live = {live}");
    assert_eq!(driver.pool().stats().dropped, 0);
    assert_eq!(backend.frames_presented(), 120);
}
