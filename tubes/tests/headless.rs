use scene::SceneConfig;
use tubes::run_headless;

#[test]
fn headless_run_ticks_every_frame_and_clicks_periodically() {
    let config = SceneConfig {
        body_count: 6,
        ..SceneConfig::default()
    };

    let summary = run_headless(config, 250).unwrap();

    assert_eq!(summary.frames, 250);
    assert_eq!(summary.clicks, 2);
    assert_eq!(summary.bodies, 6);
}

#[test]
fn zero_frames_is_a_valid_run() {
    let summary = run_headless(SceneConfig::default(), 0).unwrap();
    assert_eq!(summary.frames, 0);
    assert_eq!(summary.clicks, 0);
}

#[test]
fn invalid_configuration_fails_before_the_loop() {
    let config = SceneConfig {
        body_mass: -1.0,
        ..SceneConfig::default()
    };
    assert!(run_headless(config, 10).is_err());
}
