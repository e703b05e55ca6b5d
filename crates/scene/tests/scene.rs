mod common;

use common::{RecordingAudio, Sound};
use glam::Vec3;
use physics::{ContactManifold, MockEngine};
use scene::{FrameContext, Scene, SceneConfig};

fn scene(mock: &MockEngine, audio: &RecordingAudio, bodies: usize) -> Scene {
    let config = SceneConfig {
        body_count: bodies,
        ..SceneConfig::default()
    };
    Scene::initialize(config, Box::new(mock.clone()), Box::new(audio.clone()), 800, 600).unwrap()
}

fn front_contact(scene: &Scene, index: usize) -> ContactManifold {
    ContactManifold {
        body_a: scene.world().front_plane(),
        body_b: scene.world().body_handle(index).unwrap(),
        point_count: 1,
    }
}

#[test]
fn tick_returns_every_transform_and_the_ring() {
    let mock = MockEngine::new();
    let audio = RecordingAudio::default();
    let mut scene = scene(&mock, &audio, 4);

    let frame = FrameContext::start(0.0).advance(16.0, true);
    let snapshot = scene.tick(&frame).unwrap();

    assert_eq!(snapshot.transforms.len(), 4);
    assert_eq!(snapshot.frames, 1.0);
    assert!(snapshot.impulses.iter().all(|s| s.x == -10.0 && s.age == 1.0));
    let inputs = scene.frame_inputs(&snapshot);
    assert_eq!(inputs.transforms.len(), 4);
    assert_eq!(mock.steps().len(), 1);
}

#[test]
fn destroyed_scene_stops_ticking_and_ignores_clicks() {
    let mock = MockEngine::new();
    let audio = RecordingAudio::default();
    let mut scene = scene(&mock, &audio, 2);

    scene.destroy();
    assert!(scene.is_destroyed());
    assert!(scene.tick(&FrameContext::start(0.0).advance(16.0, true)).is_none());
    assert!(scene.click(400.0, 300.0, 20.0).is_none());
    assert!(mock.steps().is_empty());
    assert_eq!(audio.clicks(), 0);
}

#[test]
fn impacts_are_voiced_once_per_debounce_window() {
    let mock = MockEngine::new();
    let audio = RecordingAudio::default();
    let mut scene = scene(&mock, &audio, 2);
    let body = scene.world().body_handle(0).unwrap();
    mock.set_velocity(body, Vec3::new(0.0, 9.0, 0.0));
    mock.set_manifolds(vec![front_contact(&scene, 0)]);

    let mut frame = FrameContext::start(1000.0);
    for now in [1016.0, 1066.0, 1250.0] {
        frame = frame.advance(now, true);
        scene.tick(&frame).unwrap();
    }

    assert_eq!(audio.impacts(), 2);
    assert_eq!(scene.stats().impact_sounds, 2);
    assert!(matches!(audio.sounds.borrow()[0], Sound::Impact(s) if s == 9.0));
}

#[test]
fn click_mutes_collision_sounds_briefly() {
    let mock = MockEngine::new();
    let audio = RecordingAudio::default();
    let mut scene = scene(&mock, &audio, 2);

    let outcome = scene.click(400.0, 300.0, 1000.0).unwrap();
    assert_eq!(outcome.ring_slot, 0);
    assert_eq!(audio.clicks(), 1);

    let body = scene.world().body_handle(0).unwrap();
    mock.set_velocity(body, Vec3::new(0.0, 12.0, 0.0));
    mock.set_manifolds(vec![front_contact(&scene, 0)]);

    let frame = FrameContext::start(1000.0).advance(1016.0, true);
    scene.tick(&frame).unwrap();
    assert_eq!(audio.impacts(), 0);
    assert_eq!(scene.stats().muted_impacts, 1);

    let frame = frame.advance(1300.0, true);
    scene.tick(&frame).unwrap();
    assert_eq!(audio.impacts(), 1);
}

#[test]
fn click_effect_decays_in_later_snapshots() {
    let mock = MockEngine::new();
    let audio = RecordingAudio::default();
    let mut scene = scene(&mock, &audio, 1);

    scene.click(200.0, 150.0, 0.0).unwrap();
    let frame = FrameContext::start(0.0).advance(16.0, true);
    let snapshot = scene.tick(&frame).unwrap();

    let slot = snapshot.impulses[0];
    assert_eq!((slot.x, slot.y), (0.25, 0.25));
    assert!(slot.age > 0.0 && slot.age < 0.02);
    assert_eq!(snapshot.impulses[1].age, 1.0);
}

#[test]
fn resize_keeps_the_arena() {
    let mock = MockEngine::new();
    let audio = RecordingAudio::default();
    let mut scene = scene(&mock, &audio, 1);
    let bounds = *scene.world().bounds();

    scene.resize(1920, 1080);

    assert_eq!(scene.camera().size(), (1920, 1080));
    assert_eq!(*scene.world().bounds(), bounds);
}

#[test]
fn failing_engine_surfaces_as_a_physics_error() {
    let audio = RecordingAudio::default();
    let result = Scene::initialize(
        SceneConfig::default(),
        Box::new(MockEngine::failing()),
        Box::new(audio),
        800,
        600,
    );
    assert!(matches!(result, Err(scene::SceneError::Physics(_))));
}

#[test]
fn config_file_drives_the_scene() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join(format!("tubes-scene-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "body_count": 5, "click_mute_ms": 0.0 }"#)?;
    let config = SceneConfig::from_json_file(&path)?;
    std::fs::remove_file(&path)?;

    let mock = MockEngine::new();
    let scene = Scene::initialize(config, Box::new(mock.clone()), Box::new(RecordingAudio::default()), 640, 480)?;
    assert_eq!(scene.world().body_count(), 5);
    assert_eq!(mock.bodies().len(), 5);
    Ok(())
}
