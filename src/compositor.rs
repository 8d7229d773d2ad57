//! Paints the frame selected by scroll progress onto a drawing surface.

use std::cell::Cell;
use std::rc::Rc;

use log::debug;

use crate::frames::FrameSet;
use crate::geometry::{cover_fit, frame_index, DrawRect};

/// A decodable image with intrinsic pixel dimensions.
pub trait FrameImage {
    fn natural_size(&self) -> (f64, f64);
}

/// Drawing target owned exclusively by the compositor.
pub trait Surface {
    type Image: FrameImage;

    /// Current pixel size.
    fn size(&self) -> (u32, u32);

    /// Resize the pixel buffer. Resizing discards existing content.
    fn set_size(&mut self, width: u32, height: u32);

    fn clear(&mut self);

    fn draw(&mut self, image: &Self::Image, rect: DrawRect);
}

/// Shared "needs repaint" flag. Any number of requests between two ticks
/// result in a single paint.
#[derive(Clone, Debug, Default)]
pub struct RepaintFlag(Rc<Cell<bool>>);

impl RepaintFlag {
    pub fn request(&self) {
        self.0.set(true);
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintOutcome {
    Painted(usize),
    /// Target frame not loaded; the surface keeps what it showed before.
    NotReady(usize),
    /// Surface or image has no area; nothing drawn.
    Degenerate(usize),
}

#[derive(Debug)]
pub struct Compositor<S> {
    surface: S,
    repaint: RepaintFlag,
    last_painted: Option<usize>,
}

impl<S: Surface> Compositor<S> {
    pub fn new(surface: S) -> Self {
        let repaint = RepaintFlag::default();
        repaint.request();
        Self {
            surface,
            repaint,
            last_painted: None,
        }
    }

    pub fn repaint_flag(&self) -> RepaintFlag {
        self.repaint.clone()
    }

    /// Match the surface to the viewport. The next tick repaints.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.set_size(width, height);
        self.last_painted = None;
        self.repaint.request();
    }

    /// Paint if a repaint was requested since the last tick.
    pub fn tick(&mut self, progress: f64, frames: &FrameSet<S::Image>) -> Option<PaintOutcome> {
        if self.repaint.take() {
            Some(self.paint(progress, frames))
        } else {
            None
        }
    }

    /// Clear and redraw the frame for `progress`, unless it is not ready.
    pub fn paint(&mut self, progress: f64, frames: &FrameSet<S::Image>) -> PaintOutcome {
        let index = frame_index(progress, frames.len());
        let image = match frames.image(index) {
            Some(image) if frames.is_ready(index) => image,
            _ => return PaintOutcome::NotReady(index),
        };

        let (width, height) = self.surface.size();
        let (image_width, image_height) = image.natural_size();
        let Some(rect) = cover_fit(width as f64, height as f64, image_width, image_height) else {
            return PaintOutcome::Degenerate(index);
        };

        self.surface.clear();
        self.surface.draw(image, rect);
        self.last_painted = Some(index);
        debug!("painted frame {index}");
        PaintOutcome::Painted(index)
    }

    /// Frame currently shown on the surface, if any.
    pub fn last_painted(&self) -> Option<usize> {
        self.last_painted
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}
