//! Scroll progress through the hero track.

use crate::geometry::TrackGeometry;

/// Something that can report where the scroll track currently sits.
pub trait TrackSource {
    /// Current geometry, or `None` once the track is no longer in the document.
    fn geometry(&self) -> Option<TrackGeometry>;
}

impl<F> TrackSource for F
where
    F: Fn() -> Option<TrackGeometry>,
{
    fn geometry(&self) -> Option<TrackGeometry> {
        self()
    }
}

type Listener = Box<dyn FnMut(f64)>;

pub struct ScrollTracker<S> {
    source: S,
    progress: f64,
    listeners: Vec<Listener>,
}

impl<S: TrackSource> ScrollTracker<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            progress: 0.0,
            listeners: Vec::new(),
        }
    }

    /// Register a listener called with the progress after every recompute.
    pub fn subscribe(&mut self, listener: impl FnMut(f64) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Sample the track and notify listeners. Called at mount and on every
    /// scroll or resize. Emits even when the value did not change.
    pub fn recompute(&mut self) -> f64 {
        let Some(geometry) = self.source.geometry() else {
            return self.progress;
        };
        self.progress = geometry.progress();
        for listener in &mut self.listeners {
            listener(self.progress);
        }
        self.progress
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }
}

impl<S> std::fmt::Debug for ScrollTracker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollTracker")
            .field("progress", &self.progress)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
