use approx::assert_relative_eq;
use hero_wasm::{compute_progress, frame_index, TrackGeometry};

const TOTAL: usize = 264;

#[test]
fn partially_scrolled_track() {
    let progress = compute_progress(-500.0, 3000.0, 800.0);
    assert_relative_eq!(progress, 500.0 / 2200.0);
    assert_eq!(frame_index(progress, TOTAL), 59);
}

#[test]
fn track_top_at_viewport_top_is_first_frame() {
    let progress = TrackGeometry::new(0.0, 3000.0, 800.0).progress();
    assert_eq!(progress, 0.0);
    assert_eq!(frame_index(progress, TOTAL), 0);
}

#[test]
fn scrolled_to_track_end_is_last_frame() {
    let progress = compute_progress(-(3000.0 - 800.0), 3000.0, 800.0);
    assert_eq!(progress, 1.0);
    assert_eq!(frame_index(progress, TOTAL), TOTAL - 1);
}

#[test]
fn boundaries_map_to_first_and_last_frame() {
    for total in [1, 2, 3, 10, TOTAL] {
        assert_eq!(frame_index(0.0, total), 0);
        assert_eq!(frame_index(1.0, total), total - 1);
    }
}

#[test]
fn progress_is_clamped() {
    let samples = [
        (500.0, 3000.0, 800.0),
        (-10_000.0, 3000.0, 800.0),
        (-2200.5, 3000.0, 800.0),
        (1e300, 2.0, 1.0),
        (-1e300, 2.0, 1.0),
        (-3.0, 1e-9 + 1.0, 1.0),
    ];
    for (top, height, viewport) in samples {
        let p = compute_progress(top, height, viewport);
        assert!((0.0..=1.0).contains(&p), "progress {p} for {top} {height} {viewport}");
    }
}

#[test]
fn short_track_yields_zero() {
    for top in [-1000.0, -1.0, 0.0, 1.0, 1000.0] {
        assert_eq!(compute_progress(top, 800.0, 800.0), 0.0);
        assert_eq!(compute_progress(top, 400.0, 800.0), 0.0);
    }
}

#[test]
fn non_finite_geometry_yields_zero() {
    assert_eq!(compute_progress(f64::NAN, 3000.0, 800.0), 0.0);
    assert_eq!(compute_progress(-100.0, f64::INFINITY, 800.0), 0.0);
    assert_eq!(compute_progress(-100.0, f64::NAN, 800.0), 0.0);
}

#[test]
fn frame_mapping_is_monotonic() {
    let steps = 10_000;
    let mut previous = 0;
    for step in 0..=steps {
        let progress = step as f64 / steps as f64;
        let index = frame_index(progress, TOTAL);
        assert!(index >= previous, "frame went back at progress {progress}");
        assert!(index < TOTAL);
        previous = index;
    }
    assert_eq!(previous, TOTAL - 1);
}

#[test]
fn out_of_range_progress_is_clamped_before_mapping() {
    assert_eq!(frame_index(-0.5, TOTAL), 0);
    assert_eq!(frame_index(7.0, TOTAL), TOTAL - 1);
    assert_eq!(frame_index(f64::NAN, TOTAL), 0);
    assert_eq!(frame_index(0.5, 0), 0);
}

#[test]
fn last_frame_only_at_full_progress() {
    assert_eq!(frame_index(0.9999, TOTAL), TOTAL - 2);
}
