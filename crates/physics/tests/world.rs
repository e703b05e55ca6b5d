#![cfg(feature = "rapier")]

use anyhow::Result;
use glam::{Mat4, Vec3};
use physics::{PhysicsWorld, RapierEngine, WorldParams};

fn rapier_world(bodies: usize) -> Result<PhysicsWorld> {
    let params = WorldParams::new(bodies, 1.0, 10.0, 10.0).with_seed(42);
    Ok(PhysicsWorld::initialize(Box::new(RapierEngine::new()), &params)?)
}

#[test]
fn one_step_returns_every_tube() -> Result<()> {
    let mut world = rapier_world(3)?;
    let out = world.step(16.0, 16.0);
    assert_eq!(out.transforms.len(), 3);
    assert!(out.transforms.iter().all(|m| *m != Mat4::IDENTITY));
    Ok(())
}

#[test]
fn tubes_fall_under_gravity() {
    let mut world = rapier_world(1).unwrap();
    let before = world.body_position(0).unwrap();
    for frame in 1..=10 {
        world.step(16.0, f64::from(frame) * 16.0);
    }
    let after = world.body_position(0).unwrap();
    assert!(after.y < before.y, "{before:?} -> {after:?}");
}

#[test]
fn a_long_hitch_integrates_no_more_than_the_ceiling() {
    let mut hitched = rapier_world(1).unwrap();
    let mut capped = rapier_world(1).unwrap();
    hitched.step(500.0, 500.0);
    capped.step(32.0, 32.0);
    let a = hitched.body_position(0).unwrap();
    let b = capped.body_position(0).unwrap();
    assert!((a - b).length() < 1e-4, "{a:?} vs {b:?}");
}

#[test]
fn rays_pass_through_the_arena_planes() {
    let world = rapier_world(0).unwrap();
    let bounds = *world.bounds();
    // Every direction from the centre eventually crosses a plane.
    for i in 0..32 {
        let angle = i as f32 / 32.0 * std::f32::consts::TAU;
        let dir = Vec3::new(angle.cos(), (i as f32 * 0.37).sin(), angle.sin());
        let start = Vec3::new(0.0, bounds.height * 0.5, 0.0);
        assert_eq!(world.ray_hit_test(start, start + dir * 100.0), None);
    }
    assert_eq!(world.ray_hit_test(Vec3::new(0.0, 30.0, 0.0), Vec3::new(0.0, -30.0, 0.0)), None);
}

#[test]
fn rays_find_tubes_from_above() {
    let mut world = rapier_world(1).unwrap();
    world.step(16.0, 16.0);
    let p = world.body_position(0).unwrap();
    let hit = world
        .ray_hit_test(Vec3::new(p.x, 40.0, p.z), Vec3::new(p.x, -1.0, p.z))
        .expect("tube below the ray");
    assert_eq!(world.body_index_of(hit.body), Some(0));
    assert!(hit.point.y >= p.y - 1e-3);
}

#[test]
fn impulses_move_tubes() -> Result<()> {
    let mut world = rapier_world(1)?;
    world.step(16.0, 16.0);
    let handle = world.body_handle(0).unwrap();
    let before = world.body_position(0).unwrap();
    world.apply_impulse(handle, Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0))?;
    world.step(16.0, 32.0);
    let after = world.body_position(0).unwrap();
    assert!(after.x > before.x + 1e-3, "{before:?} -> {after:?}");
    Ok(())
}
