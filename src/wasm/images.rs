use std::rc::Weak;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::HtmlImageElement;

use super::render::Runtime;
use crate::compositor::FrameImage;
use crate::frames::{FrameNotifier, FrameSet};

/// Frame image backed by an `<img>` element that is never attached to the DOM.
pub(crate) struct WebImage(HtmlImageElement);

impl WebImage {
    pub(crate) fn new() -> Result<Self, JsValue> {
        let img = HtmlImageElement::new()?;
        img.set_decoding("async");
        Ok(Self(img))
    }

    pub(crate) fn element(&self) -> &HtmlImageElement {
        &self.0
    }
}

impl FrameImage for WebImage {
    fn natural_size(&self) -> (f64, f64) {
        (self.0.natural_width() as f64, self.0.natural_height() as f64)
    }
}

/// Load callbacks for one frame. They must stay alive as long as the image
/// can still fire, and are detached before being dropped.
pub(crate) struct LoadHandlers {
    image: HtmlImageElement,
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

impl LoadHandlers {
    pub(crate) fn attach(
        image: &WebImage,
        index: usize,
        notifier: FrameNotifier,
        runtime: Weak<Runtime>,
    ) -> Self {
        let onload = {
            let notifier = notifier.clone();
            let runtime = runtime.clone();
            Closure::wrap(Box::new(move || {
                notifier.loaded(index);
                if let Some(runtime) = runtime.upgrade() {
                    runtime.schedule();
                }
            }) as Box<dyn FnMut()>)
        };
        let onerror = Closure::wrap(Box::new(move || {
            notifier.failed(index);
            if let Some(runtime) = runtime.upgrade() {
                runtime.schedule();
            }
        }) as Box<dyn FnMut()>);

        let img = image.element().clone();
        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        Self {
            image: img,
            _onload: onload,
            _onerror: onerror,
        }
    }

    pub(crate) fn detach(&self) {
        self.image.set_onload(None);
        self.image.set_onerror(None);
    }
}

/// Point the frame's image at its URL, which starts the fetch.
pub(crate) fn request(frames: &FrameSet<WebImage>, index: usize) {
    if let (Some(image), Some(url)) = (frames.image(index), frames.url(index)) {
        image.element().set_src(url);
    }
}
