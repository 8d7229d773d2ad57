use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlCanvasElement};

use crate::config::SequenceConfig;
use crate::error::{SequenceError, SequenceResult};

mod images;
mod render;

const CANVAS_ID: &str = "hero-canvas";
const TRACK_ID: &str = "hero-track";
const CONFIG_ATTR: &str = "data-sequence";

impl From<SequenceError> for JsValue {
    fn from(err: SequenceError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

thread_local! {
    static AUTO_PLAYER: RefCell<Option<HeroPlayer>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    if let Some(player) = auto_mount(document()) {
        AUTO_PLAYER.with(|slot| *slot.borrow_mut() = Some(player));
    }
    Ok(())
}

/// Mount on the page's hero elements. Pages without them, or without a
/// document at all, are skipped with a log line instead of an error.
fn auto_mount(document: SequenceResult<Document>) -> Option<HeroPlayer> {
    let document = match document {
        Ok(document) => document,
        Err(err) => {
            info!("{err}, hero player not mounted");
            return None;
        }
    };
    if document.get_element_by_id(CANVAS_ID).is_none() {
        info!("no #{CANVAS_ID} on this page, hero player not mounted");
        return None;
    }
    Some(HeroPlayer::mount(CANVAS_ID, TRACK_ID, JsValue::UNDEFINED))
}

/// Scroll-synchronised frame sequence drawn onto a canvas.
///
/// A player that failed to mount is inert: every query returns its zero
/// value and nothing is drawn.
#[wasm_bindgen]
pub struct HeroPlayer {
    runtime: Option<Rc<render::Runtime>>,
}

#[wasm_bindgen]
impl HeroPlayer {
    /// Mount on the canvas and scroll track with the given ids. `config` is an
    /// optional object in `SequenceConfig` shape; when absent the track's
    /// `data-sequence` attribute is used, then the defaults.
    pub fn mount(canvas_id: &str, track_id: &str, config: JsValue) -> HeroPlayer {
        match try_mount(canvas_id, track_id, config) {
            Ok(runtime) => HeroPlayer {
                runtime: Some(runtime),
            },
            Err(err) => {
                warn!("hero player inactive: {err:?}");
                HeroPlayer { runtime: None }
            }
        }
    }

    /// Scroll progress through the track, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.runtime
            .as_ref()
            .map_or(0.0, |rt| rt.state().progress())
    }

    /// Frame the current progress maps to.
    #[wasm_bindgen(js_name = frameIndex)]
    pub fn frame_index(&self) -> usize {
        self.runtime
            .as_ref()
            .map_or(0, |rt| rt.state().target_frame())
    }

    /// Frame currently on the canvas, if any has been painted.
    #[wasm_bindgen(js_name = lastPainted)]
    pub fn last_painted(&self) -> Option<usize> {
        self.runtime.as_ref().and_then(|rt| rt.state().last_painted())
    }

    /// Fraction of frames loaded so far.
    #[wasm_bindgen(js_name = loadProgress)]
    pub fn load_progress(&self) -> f64 {
        self.runtime
            .as_ref()
            .map_or(0.0, |rt| rt.state().load_fraction())
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.runtime.is_some()
    }

    /// Detach all listeners and stop painting. Loads still in flight finish
    /// without effect.
    pub fn destroy(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown();
        }
    }
}

fn try_mount(
    canvas_id: &str,
    track_id: &str,
    config: JsValue,
) -> Result<Rc<render::Runtime>, JsValue> {
    let document = document()?;
    let canvas: HtmlCanvasElement = element_by_id(&document, canvas_id)?;
    let track: Element = element_by_id(&document, track_id)?;
    let config = resolve_config(&track, config)?;
    render::mount(canvas, track, &config)
}

fn resolve_config(track: &Element, config: JsValue) -> Result<SequenceConfig, JsValue> {
    if !config.is_undefined() && !config.is_null() {
        let config: SequenceConfig = serde_wasm_bindgen::from_value(config)?;
        config.validate()?;
        return Ok(config);
    }
    match track.get_attribute(CONFIG_ATTR) {
        Some(json) => Ok(SequenceConfig::from_json(&json)?),
        None => Ok(SequenceConfig::default()),
    }
}

fn document() -> SequenceResult<Document> {
    web_sys::window()
        .ok_or(SequenceError::Missing("window"))?
        .document()
        .ok_or(SequenceError::Missing("document"))
}

fn element_by_id<T: JsCast>(document: &Document, id: &str) -> SequenceResult<T> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| SequenceError::ElementNotFound(id.to_string()))?
        .dyn_into::<T>()
        .map_err(|_| SequenceError::ElementType(id.to_string()))
}
