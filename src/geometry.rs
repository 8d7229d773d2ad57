//! Scroll and drawing geometry.
//!
//! Everything here is a pure function of its inputs so it can run on every
//! scroll event and be tested on the host.

/// Position of the scroll track relative to the viewport, sampled on one
/// scroll or resize event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackGeometry {
    /// Distance from the viewport top to the track's top edge. Negative once
    /// the track has scrolled past the top.
    pub track_top: f64,
    pub track_height: f64,
    pub viewport_height: f64,
}

impl TrackGeometry {
    pub fn new(track_top: f64, track_height: f64, viewport_height: f64) -> Self {
        Self {
            track_top,
            track_height,
            viewport_height,
        }
    }

    pub fn progress(&self) -> f64 {
        compute_progress(self.track_top, self.track_height, self.viewport_height)
    }
}

/// Fraction of the track scrolled through, clamped to `[0, 1]`.
///
/// A track no taller than the viewport cannot be scrolled through and yields 0.
pub fn compute_progress(track_top: f64, track_height: f64, viewport_height: f64) -> f64 {
    let scrollable = track_height - viewport_height;
    if !(scrollable > 0.0) || !scrollable.is_finite() {
        return 0.0;
    }
    let progress = -track_top / scrollable;
    if progress.is_nan() {
        return 0.0;
    }
    progress.clamp(0.0, 1.0)
}

/// Frame shown at `progress`: `floor(progress * (total - 1))`.
///
/// Floors rather than rounds, so the last frame only appears at exactly 1.0.
pub fn frame_index(progress: f64, total_frames: usize) -> usize {
    let Some(last) = total_frames.checked_sub(1) else {
        return 0;
    };
    let progress = if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    };
    ((progress * last as f64).floor() as usize).min(last)
}

/// Destination rectangle for a draw call, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Scale an image to cover the whole canvas, centred, keeping its aspect ratio.
///
/// Returns `None` when either rectangle has no area.
pub fn cover_fit(
    canvas_width: f64,
    canvas_height: f64,
    image_width: f64,
    image_height: f64,
) -> Option<DrawRect> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !(positive(canvas_width)
        && positive(canvas_height)
        && positive(image_width)
        && positive(image_height))
    {
        return None;
    }

    let image_ratio = image_width / image_height;
    let canvas_ratio = canvas_width / canvas_height;

    let rect = if image_ratio > canvas_ratio {
        let width = canvas_height * image_ratio;
        DrawRect {
            x: (canvas_width - width) / 2.0,
            y: 0.0,
            width,
            height: canvas_height,
        }
    } else {
        let height = canvas_width / image_ratio;
        DrawRect {
            x: 0.0,
            y: (canvas_height - height) / 2.0,
            width: canvas_width,
            height,
        }
    };
    Some(rect)
}
