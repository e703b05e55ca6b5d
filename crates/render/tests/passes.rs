use std::collections::HashSet;

use render::passes::{Pass, Target, FRAME_PASSES};

#[test]
fn passes_run_geometry_blur_blur_composite() {
    assert_eq!(
        FRAME_PASSES,
        [Pass::Geometry, Pass::BlurHorizontal, Pass::BlurVertical, Pass::ImpulseComposite]
    );
}

#[test]
fn every_read_was_written_earlier_in_the_frame() {
    let mut written = HashSet::new();
    for pass in FRAME_PASSES {
        for target in pass.reads() {
            assert!(written.contains(target), "{} reads {target:?} before it is written", pass.label());
        }
        written.extend(pass.writes().iter().copied());
    }
}

#[test]
fn only_the_last_pass_reaches_the_surface() {
    let passes = FRAME_PASSES;
    let (last, rest) = passes.split_last().unwrap();
    assert_eq!(last.writes(), &[Target::Surface]);
    assert!(rest.iter().all(|p| !p.writes().contains(&Target::Surface)));
}

#[test]
fn no_pass_reads_its_own_output() {
    for pass in FRAME_PASSES {
        assert!(pass.reads().iter().all(|t| !pass.writes().contains(t)), "{pass:?}");
    }
}

#[test]
fn each_full_screen_pass_samples_its_predecessor_colour() {
    for pair in FRAME_PASSES.windows(2) {
        let (previous, pass) = (pair[0], pair[1]);
        assert_eq!(
            pass.reads().first(),
            previous.writes().first(),
            "{} must sample what {} drew",
            pass.label(),
            previous.label()
        );
    }
}
