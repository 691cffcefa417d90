/// Browser host: DOM listeners, animation frames and fetches.
///
/// Every callback holds a weak reference to the viewer, so a callback that
/// fires after the viewer is gone does nothing.
use std::cell::RefCell;
use std::rc::Weak;

use stlview_core::engine::{InputKind, ListenerTarget};
use stlview_core::{fetch_completion, Host, HostError, InputEvent, LoadTicket, Viewer};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Event, EventTarget, HtmlCanvasElement, HtmlElement, MouseEvent, ResizeObserver, WheelEvent, Window,
};

use crate::engine::CanvasEngine;
use crate::fetch::GlooFetcher;

pub type WebViewer = Viewer<CanvasEngine, WebHost>;

/// A registered DOM listener or resize observer. Dropping the handle drops its closure.
pub enum ListenerHandle {
    Event {
        target: EventTarget,
        event: &'static str,
        closure: Closure<dyn FnMut(Event)>,
    },
    Observer {
        observer: ResizeObserver,
        _closure: Closure<dyn FnMut(JsValue)>,
    },
}

pub struct WebHost {
    viewer: Weak<RefCell<WebViewer>>,
    window: Window,
    document: Document,
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    /// Created on first use and reused for every frame request.
    frame_callback: Option<Closure<dyn FnMut()>>,
}

impl WebHost {
    pub fn new(
        viewer: Weak<RefCell<WebViewer>>,
        window: Window,
        document: Document,
        container: HtmlElement,
        canvas: HtmlCanvasElement,
    ) -> Self {
        Self {
            viewer,
            window,
            document,
            container,
            canvas,
            frame_callback: None,
        }
    }

    fn event_target(&self, target: ListenerTarget) -> EventTarget {
        match target {
            ListenerTarget::Canvas => self.canvas.clone().into(),
            ListenerTarget::Container => self.container.clone().into(),
            ListenerTarget::Document => self.document.clone().into(),
        }
    }

    /// Watch the container's size; fires once on observe and on every change after.
    fn observe_resize(&self) -> Result<ListenerHandle, HostError> {
        let viewer = self.viewer.clone();
        let container = self.container.clone();
        let closure = Closure::<dyn FnMut(JsValue)>::new(move |_entries: JsValue| {
            let (width, height) = container_size(&container);
            with_viewer(&viewer, |viewer| viewer.handle_input(InputEvent::Resize { width, height }));
        });

        let listen_error = |e: JsValue| HostError::Listen {
            kind: InputKind::Resize.event_name(),
            reason: crate::describe(&e),
        };
        let observer = ResizeObserver::new(closure.as_ref().unchecked_ref()).map_err(listen_error)?;
        observer.observe(&self.container);

        Ok(ListenerHandle::Observer {
            observer,
            _closure: closure,
        })
    }
}

/// Run `f` on the viewer if it is still alive and not already borrowed.
fn with_viewer(viewer: &Weak<RefCell<WebViewer>>, f: impl FnOnce(&mut WebViewer)) {
    let Some(viewer) = viewer.upgrade() else {
        return;
    };
    match viewer.try_borrow_mut() {
        Ok(mut viewer) => f(&mut viewer),
        Err(_) => log::warn!("viewer busy, dropping callback"),
    };
}

fn container_size(container: &HtmlElement) -> (u32, u32) {
    (container.client_width().max(0) as u32, container.client_height().max(0) as u32)
}

/// Convert a DOM event into viewer input.
fn translate(kind: InputKind, event: &Event, container: &HtmlElement) -> Option<InputEvent> {
    match kind {
        InputKind::PointerDown => {
            let mouse = event.dyn_ref::<MouseEvent>()?;
            // Primary button only.
            if mouse.button() != 0 {
                return None;
            }
            event.prevent_default();
            Some(InputEvent::PointerDown {
                x: mouse.client_x() as f32,
                y: mouse.client_y() as f32,
            })
        }
        InputKind::PointerMove => {
            let mouse = event.dyn_ref::<MouseEvent>()?;
            Some(InputEvent::PointerMove {
                x: mouse.client_x() as f32,
                y: mouse.client_y() as f32,
            })
        }
        InputKind::PointerUp => Some(InputEvent::PointerUp),
        InputKind::Wheel => {
            let wheel = event.dyn_ref::<WheelEvent>()?;
            event.prevent_default();
            Some(InputEvent::Wheel {
                delta_y: wheel.delta_y() as f32,
            })
        }
        InputKind::Resize => {
            let (width, height) = container_size(container);
            Some(InputEvent::Resize { width, height })
        }
    }
}

impl Host for WebHost {
    type Listener = ListenerHandle;
    type Frame = i32;

    fn listen(&mut self, target: ListenerTarget, kind: InputKind) -> Result<ListenerHandle, HostError> {
        if (target, kind) == (ListenerTarget::Container, InputKind::Resize) {
            return self.observe_resize();
        }

        let event_target = self.event_target(target);
        let viewer = self.viewer.clone();
        let container = self.container.clone();

        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Some(input) = translate(kind, &event, &container) {
                with_viewer(&viewer, |viewer| viewer.handle_input(input));
            }
        });

        event_target
            .add_event_listener_with_callback(kind.event_name(), closure.as_ref().unchecked_ref())
            .map_err(|e| HostError::Listen {
                kind: kind.event_name(),
                reason: crate::describe(&e),
            })?;

        Ok(ListenerHandle::Event {
            target: event_target,
            event: kind.event_name(),
            closure,
        })
    }

    fn unlisten(&mut self, listener: ListenerHandle) {
        match listener {
            ListenerHandle::Event { target, event, closure } => {
                if let Err(e) = target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
                    log::warn!("failed to remove {event} listener: {}", crate::describe(&e));
                }
            }
            ListenerHandle::Observer { observer, .. } => observer.disconnect(),
        }
    }

    fn request_frame(&mut self) -> Result<i32, HostError> {
        let viewer = self.viewer.clone();
        let callback = self
            .frame_callback
            .get_or_insert_with(|| Closure::<dyn FnMut()>::new(move || with_viewer(&viewer, |viewer| viewer.frame())));

        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| HostError::Frame(crate::describe(&e)))
    }

    fn cancel_frame(&mut self, frame: i32) {
        if let Err(e) = self.window.cancel_animation_frame(frame) {
            log::warn!("failed to cancel frame: {}", crate::describe(&e));
        }
    }

    fn start_fetch(&mut self, ticket: LoadTicket) {
        let viewer = self.viewer.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let completion = fetch_completion(&GlooFetcher, ticket).await;
            with_viewer(&viewer, |viewer| {
                viewer.finish_load(completion);
            });
        });
    }

    fn surface_size(&self) -> (u32, u32) {
        container_size(&self.container)
    }

    fn pixel_ratio(&self) -> f32 {
        self.window.device_pixel_ratio() as f32
    }
}
