use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::{debug, info};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, AddEventListenerOptions, CanvasRenderingContext2d, Element, Event, HtmlCanvasElement,
    Window,
};

use super::images::{self, LoadHandlers, WebImage};
use crate::compositor::{Compositor, Surface};
use crate::config::SequenceConfig;
use crate::error::SequenceError;
use crate::frames::FrameSet;
use crate::geometry::{frame_index, DrawRect, TrackGeometry};
use crate::tracker::{ScrollTracker, TrackSource};

/// The hero canvas with its 2d context.
pub(crate) struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub(crate) fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or(SequenceError::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SequenceError::ContextUnavailable)?;
        Ok(Self { canvas, ctx })
    }
}

impl Surface for CanvasSurface {
    type Image = WebImage;

    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
    }

    fn draw(&mut self, image: &WebImage, rect: DrawRect) {
        if let Err(err) = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            image.element(),
            rect.x,
            rect.y,
            rect.width,
            rect.height,
        ) {
            debug!("drawImage failed: {err:?}");
        }
    }
}

/// Reads the scroll track's position from the live document.
pub(crate) struct ElementTrack {
    element: Element,
}

impl TrackSource for ElementTrack {
    fn geometry(&self) -> Option<TrackGeometry> {
        if !self.element.is_connected() {
            return None;
        }
        let window = window()?;
        let viewport_height = window.inner_height().ok()?.as_f64()?;
        let rect = self.element.get_bounding_client_rect();
        Some(TrackGeometry::new(rect.top(), rect.height(), viewport_height))
    }
}

pub(crate) struct PlayerState {
    frames: FrameSet<WebImage>,
    tracker: ScrollTracker<ElementTrack>,
    compositor: Compositor<CanvasSurface>,
}

impl PlayerState {
    pub(crate) fn progress(&self) -> f64 {
        self.tracker.progress()
    }

    pub(crate) fn target_frame(&self) -> usize {
        frame_index(self.tracker.progress(), self.frames.len())
    }

    pub(crate) fn last_painted(&self) -> Option<usize> {
        self.compositor.last_painted()
    }

    pub(crate) fn load_fraction(&self) -> f64 {
        self.frames.load_fraction()
    }

    fn resize_to_viewport(&mut self, window: &Window) {
        if let Some((w, h)) = viewport_size(window) {
            self.compositor.resize(w, h);
        }
        self.tracker.recompute();
    }
}

struct Listener {
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

/// Everything a mounted player owns. Browser callbacks only hold weak
/// references, so once the last strong handle is dropped they do nothing.
pub(crate) struct Runtime {
    state: RefCell<PlayerState>,
    raf: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    raf_handle: Cell<Option<i32>>,
    listeners: RefCell<Vec<Listener>>,
    loaders: RefCell<Vec<LoadHandlers>>,
}

impl Runtime {
    pub(crate) fn state(&self) -> std::cell::Ref<'_, PlayerState> {
        self.state.borrow()
    }

    /// Request one animation frame, unless one is already pending.
    pub(crate) fn schedule(&self) {
        if self.raf_handle.get().is_some() {
            return;
        }
        let Some(window) = window() else { return };
        let raf = self.raf.borrow();
        let Some(callback) = raf.as_ref() else { return };
        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(handle) => self.raf_handle.set(Some(handle)),
            Err(err) => debug!("requestAnimationFrame failed: {err:?}"),
        }
    }

    /// One animation frame: apply load events, start any further loads, and
    /// paint once if anything asked for it.
    fn tick(&self) {
        self.raf_handle.set(None);
        let mut guard = self.state.borrow_mut();
        let PlayerState {
            frames,
            tracker,
            compositor,
        } = &mut *guard;

        let update = frames.drain();
        for &index in &update.to_request {
            images::request(frames, index);
        }
        if update.readiness_changed() {
            compositor.repaint_flag().request();
        }
        compositor.tick(tracker.progress(), frames);
    }

    fn on_scroll(&self) {
        self.state.borrow_mut().tracker.recompute();
        self.schedule();
    }

    fn on_resize(&self) {
        if let Some(window) = window() {
            self.state.borrow_mut().resize_to_viewport(&window);
        }
        self.schedule();
    }

    fn listen(
        self: &Rc<Self>,
        window: &Window,
        kind: &'static str,
        handler: fn(&Runtime),
    ) -> Result<(), JsValue> {
        let weak = Rc::downgrade(self);
        let closure = Closure::wrap(Box::new(move |_event: Event| {
            if let Some(runtime) = weak.upgrade() {
                handler(&runtime);
            }
        }) as Box<dyn FnMut(Event)>);

        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        window.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        self.listeners.borrow_mut().push(Listener { kind, closure });
        Ok(())
    }

    /// Detach every browser callback. Safe to call more than once.
    pub(crate) fn shutdown(&self) {
        if let Some(window) = window() {
            if let Some(handle) = self.raf_handle.take() {
                let _ = window.cancel_animation_frame(handle);
            }
            for listener in self.listeners.borrow_mut().drain(..) {
                let _ = window.remove_event_listener_with_callback(
                    listener.kind,
                    listener.closure.as_ref().unchecked_ref(),
                );
            }
        }
        for loader in self.loaders.borrow_mut().drain(..) {
            loader.detach();
        }
        self.raf.borrow_mut().take();
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.shutdown();
        info!("hero player unmounted");
    }
}

/// Wire a player to `canvas` and `track` and start loading frames.
pub(crate) fn mount(
    canvas: HtmlCanvasElement,
    track: Element,
    config: &SequenceConfig,
) -> Result<Rc<Runtime>, JsValue> {
    let window = window().ok_or(SequenceError::Missing("window"))?;

    let compositor = Compositor::new(CanvasSurface::new(canvas)?);
    let frames = FrameSet::try_new(config, |_| WebImage::new())?;
    let mut tracker = ScrollTracker::new(ElementTrack { element: track });
    let repaint = compositor.repaint_flag();
    tracker.subscribe(move |_| repaint.request());

    let runtime = Rc::new(Runtime {
        state: RefCell::new(PlayerState {
            frames,
            tracker,
            compositor,
        }),
        raf: RefCell::new(None),
        raf_handle: Cell::new(None),
        listeners: RefCell::new(Vec::new()),
        loaders: RefCell::new(Vec::new()),
    });
    let weak: Weak<Runtime> = Rc::downgrade(&runtime);

    *runtime.raf.borrow_mut() = Some({
        let weak = weak.clone();
        Closure::wrap(Box::new(move |_ts_ms: f64| {
            if let Some(runtime) = weak.upgrade() {
                runtime.tick();
            }
        }) as Box<dyn FnMut(f64)>)
    });

    {
        let mut state = runtime.state.borrow_mut();
        let notifier = state.frames.notifier();
        let loaders = state
            .frames
            .slots()
            .map(|slot| {
                LoadHandlers::attach(slot.image(), slot.index(), notifier.clone(), weak.clone())
            })
            .collect();
        *runtime.loaders.borrow_mut() = loaders;

        for index in state.frames.begin() {
            images::request(&state.frames, index);
        }
        state.resize_to_viewport(&window);
    }

    runtime.listen(&window, "scroll", Runtime::on_scroll)?;
    runtime.listen(&window, "resize", Runtime::on_resize)?;
    runtime.schedule();

    info!(
        "hero player mounted: {} frames from {}",
        config.total_frames,
        config.frame_url(0)
    );
    Ok(runtime)
}

fn viewport_size(window: &Window) -> Option<(u32, u32)> {
    let w = window.inner_width().ok()?.as_f64()?;
    let h = window.inner_height().ok()?.as_f64()?;
    Some((w as u32, h as u32))
}
