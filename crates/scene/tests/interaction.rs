mod common;

use common::RecordingAudio;
use glam::{Vec2, Vec3};
use physics::{MockEngine, PhysicsWorld, RayHit, WorldParams};
use render::{Camera, CameraState, ImpulseRing};
use scene::{ClickInput, InteractionController};

fn top_down() -> CameraState {
    CameraState::new(Camera::top_down(20.0, 45f32.to_radians(), 1.0, 50.0), 800, 600)
}

fn world(mock: &MockEngine, bodies: usize) -> PhysicsWorld {
    let params = WorldParams::new(bodies, 1.0, 10.0, 10.0);
    PhysicsWorld::initialize(Box::new(mock.clone()), &params).unwrap()
}

fn centre_click(now_ms: f64) -> ClickInput {
    ClickInput {
        ndc: Vec2::ZERO,
        screen: Vec2::new(0.5, 0.5),
        now_ms,
    }
}

#[test]
fn near_body_gets_a_stronger_shockwave_than_far_body() {
    let mock = MockEngine::new();
    let mut world = world(&mock, 2);
    let a = world.body_handle(0).unwrap();
    let b = world.body_handle(1).unwrap();
    mock.set_position(a, Vec3::new(1.0, 0.0, 0.0));
    mock.set_position(b, Vec3::new(0.0, 0.0, 20.0));

    let mut ring = ImpulseRing::default();
    let mut audio = RecordingAudio::default();
    let outcome = InteractionController::default().handle_click(
        &centre_click(100.0),
        &top_down(),
        &mut world,
        &mut ring,
        &mut audio,
    );

    assert_eq!(outcome.hit, None);
    let ground = outcome.ground_point.unwrap();
    assert!(ground.length() < 1e-3, "{ground:?}");

    let near = outcome.impulse_for(0).unwrap().impulse;
    let far = outcome.impulse_for(1).unwrap().impulse;
    assert!(near.length() > far.length());
    assert!(near.x > 0.0, "pushed away from the centre: {near:?}");
    assert!(far.z > 0.0, "pushed away from the centre: {far:?}");

    let recorded = mock.impulses();
    assert_eq!(recorded.len(), 2);
    assert!(recorded.iter().all(|r| r.local_position == Vec3::ZERO));
    assert!(mock.bodies().iter().all(|b| b.awake));
}

#[test]
fn a_miss_still_records_the_effect_and_plays_the_click() {
    let mock = MockEngine::new();
    let mut world = world(&mock, 3);
    let mut ring = ImpulseRing::default();
    let mut audio = RecordingAudio::default();
    let input = ClickInput {
        ndc: Vec2::new(0.2, -0.4),
        screen: Vec2::new(0.6, 0.7),
        now_ms: 42.0,
    };

    let outcome =
        InteractionController::default().handle_click(&input, &top_down(), &mut world, &mut ring, &mut audio);

    assert_eq!(outcome.hit, None);
    assert_eq!(outcome.ring_slot, 0);
    assert_eq!(ring.pointer(), 1);
    assert_eq!(ring.records()[0].screen, Vec2::new(0.6, 0.7));
    assert_eq!(ring.records()[0].start_ms, 42.0);
    assert_eq!(audio.clicks(), 1);
    assert_eq!(audio.impacts(), 0);
    assert_eq!(outcome.impulses.len(), 3);
}

#[test]
fn hit_body_gets_the_direct_impulse_only() {
    let mock = MockEngine::new();
    let mut world = world(&mock, 3);
    let target = world.body_handle(1).unwrap();
    let position = world.body_position(1).unwrap();
    mock.set_ray_hit(Some(RayHit { body: target, point: position }));

    let controller = InteractionController::default();
    let camera = top_down();
    let mut ring = ImpulseRing::default();
    let mut audio = RecordingAudio::default();
    let outcome = controller.handle_click(&centre_click(0.0), &camera, &mut world, &mut ring, &mut audio);

    assert_eq!(outcome.hit, Some(1));
    assert_eq!(outcome.hit_point, Some(position));
    let direct = outcome.impulse_for(1).unwrap();
    assert!(direct.local_position.length() < 1e-4);
    let expected = Vec3::NEG_Y * controller.direct_impulse_magnitude(world.scale_factor());
    assert!((direct.impulse - expected).length() < 1e-4, "{:?}", direct.impulse);
    assert_eq!(outcome.impulses.iter().filter(|i| i.body_index == 1).count(), 1);
    assert_eq!(outcome.impulses.len(), 3);
}

#[test]
fn hits_on_static_planes_are_treated_as_misses() {
    let mock = MockEngine::new();
    let mut world = world(&mock, 2);
    let floor = mock.planes()[0].handle;
    mock.set_ray_hit(Some(RayHit { body: floor, point: Vec3::ZERO }));

    let mut ring = ImpulseRing::default();
    let mut audio = RecordingAudio::default();
    let outcome = InteractionController::default().handle_click(
        &centre_click(0.0),
        &top_down(),
        &mut world,
        &mut ring,
        &mut audio,
    );

    assert_eq!(outcome.hit, None);
    assert_eq!(outcome.impulses.len(), 2);
}

#[test]
fn ray_parallel_to_the_floor_skips_the_shockwave() {
    let mock = MockEngine::new();
    let mut world = world(&mock, 2);
    let camera = CameraState::new(
        Camera {
            eye: Vec3::new(0.0, 5.0, 0.0),
            target: Vec3::new(10.0, 5.0, 0.0),
            up: Vec3::Y,
            fovy: 45f32.to_radians(),
            znear: 1.0,
            zfar: 50.0,
        },
        800,
        600,
    );
    let mut ring = ImpulseRing::default();
    let mut audio = RecordingAudio::default();

    let outcome =
        InteractionController::default().handle_click(&centre_click(0.0), &camera, &mut world, &mut ring, &mut audio);

    assert_eq!(outcome.ground_point, None);
    assert!(outcome.impulses.is_empty());
    assert!(mock.impulses().is_empty());
    assert_eq!(audio.clicks(), 1);
    assert_eq!(ring.pointer(), 1);
}
