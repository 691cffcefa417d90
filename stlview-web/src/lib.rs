/// stlview Web - browser STL viewer drawing to a 2D canvas
///
/// `StlViewer` mounts into a container element, fetches the model URL and
/// drives the shared viewer from DOM events and animation frames. Dropping
/// (or `free()`-ing) the handle unmounts it.
pub mod painter;

#[cfg(target_arch = "wasm32")]
mod engine;
#[cfg(target_arch = "wasm32")]
mod fetch;
#[cfg(target_arch = "wasm32")]
mod host;

#[cfg(target_arch = "wasm32")]
pub use engine::{CanvasEngine, CanvasError};
#[cfg(target_arch = "wasm32")]
pub use fetch::GlooFetcher;
#[cfg(target_arch = "wasm32")]
pub use host::{WebHost, WebViewer};

#[cfg(target_arch = "wasm32")]
use std::{cell::RefCell, rc::Rc};
#[cfg(target_arch = "wasm32")]
use stlview_core::{Overlay, Viewer, ViewerConfig};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::*, JsCast};
#[cfg(target_arch = "wasm32")]
use web_sys::{HtmlCanvasElement, HtmlElement};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("stlview wasm initialized");
}

/// Readable text for a thrown JS value
#[cfg(target_arch = "wasm32")]
pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

#[cfg(target_arch = "wasm32")]
fn js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

/// Interactive STL viewer mounted into a DOM element
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct StlViewer {
    inner: Rc<RefCell<WebViewer>>,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl StlViewer {
    /// Mount into the element with id `container_id` and start loading `url`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container_id: &str,
        url: Option<String>,
        class_name: Option<String>,
        dark: Option<bool>,
    ) -> Result<StlViewer, JsValue> {
        let window = web_sys::window().ok_or_else(|| js_error("no global window"))?;
        let document = window.document().ok_or_else(|| js_error("no document"))?;

        let container = document
            .get_element_by_id(container_id)
            .ok_or_else(|| js_error(format!("element #{container_id} not found")))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| js_error(format!("element #{container_id} is not an HTML element")))?;
        if let Some(class_name) = class_name {
            let classes = format!("{} {class_name}", container.class_name());
            container.set_class_name(classes.trim());
        }

        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_error("failed to create canvas"))?;

        let config = ViewerConfig {
            dark_theme: dark.unwrap_or(false),
            ..ViewerConfig::default()
        };
        let engine = CanvasEngine::new(container.clone(), canvas.clone());
        let inner = Rc::new_cyclic(|weak| {
            let host = WebHost::new(weak.clone(), window, document, container, canvas);
            RefCell::new(Viewer::new(config, engine, host))
        });

        {
            let mut viewer = inner.borrow_mut();
            if let Some(url) = url {
                viewer.set_source(&url);
            }
            viewer.mount().map_err(js_error)?;
        }
        Ok(StlViewer { inner })
    }

    /// Load a different model. Any load still in flight is superseded.
    pub fn set_url(&self, url: &str) {
        self.inner.borrow_mut().set_source(url);
    }

    pub fn mount(&self) -> Result<(), JsValue> {
        self.inner.borrow_mut().mount().map_err(js_error)
    }

    pub fn unmount(&self) {
        self.inner.borrow_mut().unmount();
    }

    pub fn zoom_in(&self) {
        self.inner.borrow_mut().zoom_in();
    }

    pub fn zoom_out(&self) {
        self.inner.borrow_mut().zoom_out();
    }

    /// Returns whether auto-rotate is now on.
    pub fn toggle_auto_rotate(&self) -> bool {
        self.inner.borrow_mut().toggle_auto_rotate()
    }

    /// Returns whether the dark theme is now active.
    pub fn toggle_theme(&self) -> bool {
        self.inner.borrow_mut().toggle_theme().is_dark()
    }

    pub fn reset_view(&self) {
        self.inner.borrow_mut().reset_view();
    }

    /// Retry the current URL after a failed load.
    pub fn retry(&self) {
        self.inner.borrow_mut().retry();
    }

    #[wasm_bindgen(getter)]
    pub fn status_text(&self) -> String {
        self.inner.borrow().status().pill
    }

    #[wasm_bindgen(getter)]
    pub fn is_loading(&self) -> bool {
        self.inner.borrow().state().loading
    }

    /// Detailed error for the overlay, if the last load failed.
    #[wasm_bindgen(getter)]
    pub fn error_message(&self) -> Option<String> {
        match self.inner.borrow().status().overlay {
            Overlay::Error { detail, .. } => Some(detail),
            _ => None,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn zoom_percent(&self) -> u32 {
        self.inner.borrow().status().zoom_percent
    }

    #[wasm_bindgen(getter)]
    pub fn triangle_count(&self) -> Option<u32> {
        self.inner.borrow().status().triangles.map(|n| n as u32)
    }

    #[wasm_bindgen(getter)]
    pub fn is_dark(&self) -> bool {
        self.inner.borrow().state().theme.is_dark()
    }

    #[wasm_bindgen(getter)]
    pub fn auto_rotate(&self) -> bool {
        self.inner.borrow().state().auto_rotate
    }
}
