//! Frame set loading state.
//!
//! The set owns every frame slot. Load callbacks never touch it directly:
//! they post a [`FrameEvent`] through a [`FrameNotifier`], and the events are
//! applied in [`FrameSet::drain`], the only place slot state changes.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, info, warn};

use crate::config::SequenceConfig;
use crate::error::{SequenceError, SequenceResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// Not requested yet (only while loads are throttled).
    Pending,
    Loading,
    /// Decoded and safe to draw. Terminal.
    Ready,
    /// Fetch or decode failed. Terminal; never retried.
    Failed,
}

impl LoadState {
    fn is_terminal(self) -> bool {
        matches!(self, LoadState::Ready | LoadState::Failed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameEvent {
    Loaded(usize),
    Failed(usize),
}

/// Cloneable handle that load callbacks use to report completion.
#[derive(Clone, Debug)]
pub struct FrameNotifier {
    tx: Sender<FrameEvent>,
}

impl FrameNotifier {
    pub fn loaded(&self, index: usize) {
        self.send(FrameEvent::Loaded(index));
    }

    pub fn failed(&self, index: usize) {
        self.send(FrameEvent::Failed(index));
    }

    pub fn send(&self, event: FrameEvent) {
        // A closed channel means the set is gone; late completions are dropped.
        let _ = self.tx.send(event);
    }
}

#[derive(Debug)]
pub struct FrameSlot<I> {
    index: usize,
    url: String,
    image: I,
    state: LoadState,
}

impl<I> FrameSlot<I> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn image(&self) -> &I {
        &self.image
    }

    pub fn state(&self) -> LoadState {
        self.state
    }
}

/// Result of applying queued load events.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSetUpdate {
    /// Frames that turned ready during this drain.
    pub newly_ready: Vec<usize>,
    /// Frames that failed during this drain.
    pub newly_failed: Vec<usize>,
    /// Frames the caller must start loading now.
    pub to_request: Vec<usize>,
}

impl FrameSetUpdate {
    /// Whether any frame's readiness changed, which calls for a repaint.
    pub fn readiness_changed(&self) -> bool {
        !self.newly_ready.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.newly_ready.is_empty() && self.newly_failed.is_empty() && self.to_request.is_empty()
    }
}

#[derive(Debug)]
pub struct FrameSet<I> {
    slots: Vec<FrameSlot<I>>,
    queue: VecDeque<usize>,
    max_in_flight: Option<usize>,
    in_flight: usize,
    ready: usize,
    failed: usize,
    tx: Sender<FrameEvent>,
    rx: Receiver<FrameEvent>,
}

impl<I> FrameSet<I> {
    /// Create every slot up front. `make_image` builds the (not yet loaded)
    /// handle for each index.
    pub fn new(
        config: &SequenceConfig,
        mut make_image: impl FnMut(usize) -> I,
    ) -> SequenceResult<Self> {
        Self::try_new(config, |index| Ok(make_image(index)))
    }

    /// Like [`FrameSet::new`] for handles whose creation can fail.
    pub fn try_new<E>(
        config: &SequenceConfig,
        mut make_image: impl FnMut(usize) -> Result<I, E>,
    ) -> Result<Self, E>
    where
        E: From<SequenceError>,
    {
        config.validate()?;
        let slots = (0..config.total_frames)
            .map(|index| -> Result<FrameSlot<I>, E> {
                Ok(FrameSlot {
                    index,
                    url: config.frame_url(index),
                    image: make_image(index)?,
                    state: LoadState::Pending,
                })
            })
            .collect::<Result<Vec<_>, E>>()?;
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            slots,
            queue: (0..config.total_frames).collect(),
            max_in_flight: config.max_in_flight,
            in_flight: 0,
            ready: 0,
            failed: 0,
            tx,
            rx,
        })
    }

    pub fn notifier(&self) -> FrameNotifier {
        FrameNotifier {
            tx: self.tx.clone(),
        }
    }

    /// Indices to start loading at initialization: all of them, or the first
    /// `max_in_flight` when throttled.
    pub fn begin(&mut self) -> Vec<usize> {
        self.admit()
    }

    /// Apply every queued load event.
    pub fn drain(&mut self) -> FrameSetUpdate {
        let mut update = FrameSetUpdate::default();
        while let Ok(event) = self.rx.try_recv() {
            self.apply(event, &mut update);
        }
        if !update.newly_ready.is_empty() || !update.newly_failed.is_empty() {
            update.to_request = self.admit();
            if self.is_settled() {
                info!(
                    "frame sequence settled: {} ready, {} failed",
                    self.ready, self.failed
                );
            }
        }
        update
    }

    fn apply(&mut self, event: FrameEvent, update: &mut FrameSetUpdate) {
        let (index, next) = match event {
            FrameEvent::Loaded(index) => (index, LoadState::Ready),
            FrameEvent::Failed(index) => (index, LoadState::Failed),
        };
        let Some(slot) = self.slots.get_mut(index) else {
            debug!("ignoring event for unknown frame {index}");
            return;
        };
        if slot.state.is_terminal() {
            return;
        }
        if slot.state == LoadState::Loading {
            self.in_flight -= 1;
        } else {
            // Completed before we asked for it; it no longer needs a request.
            self.queue.retain(|&queued| queued != index);
        }
        slot.state = next;
        match next {
            LoadState::Ready => {
                self.ready += 1;
                debug!("frame {index} ready");
                update.newly_ready.push(index);
            }
            _ => {
                self.failed += 1;
                warn!("frame {index} failed to load from {}", slot.url);
                update.newly_failed.push(index);
            }
        }
    }

    fn admit(&mut self) -> Vec<usize> {
        let room = match self.max_in_flight {
            Some(limit) => limit.saturating_sub(self.in_flight),
            None => self.queue.len(),
        };
        let count = room.min(self.queue.len());
        let admitted: Vec<usize> = self.queue.drain(..count).collect();
        for &index in &admitted {
            self.slots[index].state = LoadState::Loading;
        }
        self.in_flight += admitted.len();
        admitted
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_ready(&self, index: usize) -> bool {
        self.state(index) == Some(LoadState::Ready)
    }

    pub fn state(&self, index: usize) -> Option<LoadState> {
        self.slots.get(index).map(|slot| slot.state)
    }

    /// Image handle for `index`. Exists from creation; only safe to draw once ready.
    pub fn image(&self, index: usize) -> Option<&I> {
        self.slots.get(index).map(|slot| &slot.image)
    }

    pub fn url(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(|slot| slot.url.as_str())
    }

    pub fn slots(&self) -> impl Iterator<Item = &FrameSlot<I>> {
        self.slots.iter()
    }

    pub fn ready_count(&self) -> usize {
        self.ready
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Fraction of frames ready, for a preloader indicator.
    pub fn load_fraction(&self) -> f64 {
        if self.slots.is_empty() {
            return 0.0;
        }
        self.ready as f64 / self.slots.len() as f64
    }

    /// No frame is still pending or loading.
    pub fn is_settled(&self) -> bool {
        self.ready + self.failed == self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(total: usize, max_in_flight: Option<usize>) -> SequenceConfig {
        SequenceConfig {
            total_frames: total,
            max_in_flight,
            ..SequenceConfig::default()
        }
    }

    #[test]
    fn unthrottled_requests_everything_in_order() {
        let mut set = FrameSet::new(&config(5, None), |i| i).unwrap();
        assert_eq!(set.begin(), vec![0, 1, 2, 3, 4]);
        assert_eq!(set.in_flight(), 5);
        assert!(set.begin().is_empty());
        assert_eq!(set.image(3), Some(&3));
        assert_eq!(set.url(3), Some("/webp-sequence/frame_003.webp"));
    }

    #[test]
    fn throttled_set_refills_as_frames_settle() {
        let mut set = FrameSet::new(&config(5, Some(2)), |_| ()).unwrap();
        assert_eq!(set.begin(), vec![0, 1]);
        assert_eq!(set.state(2), Some(LoadState::Pending));

        let notifier = set.notifier();
        notifier.failed(1);
        let update = set.drain();
        assert_eq!(update.newly_failed, vec![1]);
        assert!(!update.readiness_changed());
        assert_eq!(update.to_request, vec![2]);

        notifier.loaded(0);
        notifier.loaded(2);
        let update = set.drain();
        assert_eq!(update.newly_ready, vec![0, 2]);
        assert_eq!(update.to_request, vec![3, 4]);
        assert_eq!(set.in_flight(), 2);
    }

    #[test]
    fn readiness_never_reverts() {
        let mut set = FrameSet::new(&config(2, None), |_| ()).unwrap();
        set.begin();
        let notifier = set.notifier();
        notifier.loaded(0);
        notifier.failed(0);
        notifier.loaded(0);
        let update = set.drain();
        assert_eq!(update.newly_ready, vec![0]);
        assert!(update.newly_failed.is_empty());
        assert!(set.is_ready(0));
        assert_eq!(set.ready_count(), 1);
        assert_eq!(set.in_flight(), 1);
    }

    #[test]
    fn failure_is_isolated() {
        let mut set = FrameSet::new(&config(3, None), |_| ()).unwrap();
        set.begin();
        let notifier = set.notifier();
        notifier.loaded(0);
        notifier.failed(1);
        notifier.loaded(2);
        set.drain();
        assert!(set.is_ready(0));
        assert_eq!(set.state(1), Some(LoadState::Failed));
        assert!(set.is_ready(2));
        assert!(set.is_settled());
        assert_eq!(set.ready_count(), 2);
        assert_eq!(set.failed_count(), 1);
        assert!((set.load_fraction() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_indices_are_ignored() {
        let mut set = FrameSet::new(&config(2, None), |_| ()).unwrap();
        set.begin();
        set.notifier().loaded(99);
        assert!(set.drain().is_empty());
        assert!(!set.is_ready(99));
        assert_eq!(set.image(99), None);
    }

    #[test]
    fn notifier_outliving_the_set_is_harmless() {
        let set = FrameSet::new(&config(1, None), |_| ()).unwrap();
        let notifier = set.notifier();
        drop(set);
        notifier.loaded(0);
    }
}
