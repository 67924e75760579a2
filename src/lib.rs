#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod interaction;
pub mod mesh;
pub mod options;
pub mod parse;
pub mod render;
pub mod spatial;
pub mod view;
pub mod viewer;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlCanvasElement, PointerEvent};

use options::ViewerOptions;
use parse::{MeshPayload, SoilMapPayload};
use render::CanvasSurface;
use view::PixelPoint;
use viewer::{HillId, Viewer};

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

type PointerListener = Closure<dyn FnMut(PointerEvent)>;

/// Set by a viewer hover observer, drained once the viewer borrow is released.
#[derive(Debug, Clone, Default)]
struct HoverSignal(Rc<Cell<bool>>);

impl HoverSignal {
    fn attach(viewer: &mut Viewer) -> Self {
        let signal = Self::default();
        let flag = Rc::clone(&signal.0);
        viewer.on_hover_change(move |_hover| flag.set(true));
        signal
    }

    fn take(&self) -> bool {
        self.0.replace(false)
    }
}

/// State shared between the façade and its DOM event listeners.
struct Shared {
    viewer: RefCell<Viewer>,
    hover_changed: HoverSignal,
    callbacks: RefCell<Vec<js_sys::Function>>,
    pending_frame: Cell<Option<i32>>,
    on_frame: Closure<dyn FnMut(f64)>,
}

impl Shared {
    fn new(mut viewer: Viewer) -> Rc<Self> {
        let hover_changed = HoverSignal::attach(&mut viewer);
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            Self {
                viewer: RefCell::new(viewer),
                hover_changed,
                callbacks: RefCell::new(Vec::new()),
                pending_frame: Cell::new(None),
                on_frame: Closure::new(move |_timestamp: f64| {
                    if let Some(shared) = weak.upgrade() {
                        shared.flush_frame();
                    }
                }),
            }
        })
    }

    /// Runs `f` on the viewer and tells JS listeners if its observers fired.
    ///
    /// Callbacks run after the viewer borrow is released, so they may call
    /// back into the façade.
    fn update<R>(&self, f: impl FnOnce(&mut Viewer) -> R) -> R {
        let result = f(&mut self.viewer.borrow_mut());
        if self.hover_changed.take() {
            self.dispatch_hover();
        }
        result
    }

    fn dispatch_hover(&self) {
        let value = {
            let viewer = self.viewer.borrow();
            to_js(&viewer.hover()).unwrap_or(JsValue::NULL)
        };
        let callbacks = self.callbacks.borrow().clone();
        for callback in callbacks {
            if let Err(err) = callback.call1(&JsValue::NULL, &value) {
                log::warn!("hover callback failed: {err:?}");
            }
        }
    }

    fn pointer_move(&self, pixel: PixelPoint) {
        let coalesce = self.viewer.borrow().options().coalesce_pointer_events;
        if coalesce {
            if self.viewer.borrow_mut().queue_pointer_move(pixel) {
                self.schedule_frame();
            }
        } else {
            self.update(|viewer| viewer.pointer_move(pixel));
        }
    }

    fn pointer_leave(&self) {
        self.update(Viewer::pointer_leave);
    }

    fn schedule_frame(&self) {
        if self.pending_frame.get().is_some() {
            return;
        }
        let requested = web_sys::window()
            .ok_or_else(|| JsValue::from_str("no window"))
            .and_then(|window| {
                window.request_animation_frame(self.on_frame.as_ref().unchecked_ref())
            });
        match requested {
            Ok(id) => self.pending_frame.set(Some(id)),
            Err(err) => {
                log::warn!("requestAnimationFrame failed, querying now: {err:?}");
                self.flush_frame();
            }
        }
    }

    fn flush_frame(&self) {
        self.pending_frame.set(None);
        self.update(Viewer::flush_pointer);
    }

    fn cancel_frame(&self) {
        let Some(id) = self.pending_frame.take() else {
            return;
        };
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(id);
        }
    }
}

/// Hillslope viewer bound to one canvas.
#[wasm_bindgen]
pub struct HillViewer {
    shared: Rc<Shared>,
    canvas: HtmlCanvasElement,
    surface: CanvasSurface,
    listeners: Vec<(&'static str, PointerListener)>,
}

#[wasm_bindgen]
impl HillViewer {
    /// `options` is a plain object with `ViewerOptions` fields; `undefined` uses the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, options: JsValue) -> Result<HillViewer, JsValue> {
        let options: ViewerOptions = if options.is_undefined() || options.is_null() {
            ViewerOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options).map_err(to_js_error)?
        };
        let viewer = Viewer::new(options).map_err(to_js_error)?;
        let pixel_ratio = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let surface = CanvasSurface::new(canvas.clone(), pixel_ratio)?;

        Ok(HillViewer {
            shared: Shared::new(viewer),
            canvas,
            surface,
            listeners: Vec::new(),
        })
    }

    /// Marks `hill_id` as the hill the user wants; loads for other hills are dropped.
    #[wasm_bindgen]
    pub fn select_hill(&self, hill_id: HillId) {
        self.shared.viewer.borrow_mut().select_hill(hill_id);
    }

    /// Loads mesh and soil map payloads. Returns `false` when the load was
    /// stale; throws when a payload is invalid, keeping the previous hill.
    #[wasm_bindgen]
    pub fn load(&self, hill_id: HillId, mesh: JsValue, soil_map: JsValue) -> Result<bool, JsValue> {
        let mesh: MeshPayload = serde_wasm_bindgen::from_value(mesh).map_err(to_js_error)?;
        let soil_map: SoilMapPayload =
            serde_wasm_bindgen::from_value(soil_map).map_err(to_js_error)?;
        let outcome = self
            .shared
            .update(|viewer| viewer.load_payloads(hill_id, &mesh, &soil_map))
            .map_err(to_js_error)?;
        Ok(outcome.is_applied())
    }

    /// Sizes the canvas to `container` and repaints. Returns render diagnostics.
    #[wasm_bindgen]
    pub fn render(&mut self, container: &Element) -> Result<JsValue, JsValue> {
        let rect = container.get_bounding_client_rect();
        let surface = &mut self.surface;
        let diagnostics = self.shared.update(|viewer| {
            viewer.set_viewport(rect.width(), rect.height());
            viewer.render(surface)
        })?;
        to_js(&diagnostics)
    }

    /// `callback` receives the hover state object, or `null` when the hover clears.
    #[wasm_bindgen]
    pub fn on_hover_change(&self, callback: js_sys::Function) {
        self.shared.callbacks.borrow_mut().push(callback);
    }

    /// Listens to `pointermove` / `pointerleave` on the canvas until dropped.
    #[wasm_bindgen]
    pub fn attach_pointer_events(&mut self) -> Result<(), JsValue> {
        if !self.listeners.is_empty() {
            return Ok(());
        }

        let shared = Rc::clone(&self.shared);
        let on_move = PointerListener::new(move |event: PointerEvent| {
            shared.pointer_move(PixelPoint::new(
                f64::from(event.offset_x()),
                f64::from(event.offset_y()),
            ));
        });
        let shared = Rc::clone(&self.shared);
        let on_leave = PointerListener::new(move |_event: PointerEvent| {
            shared.pointer_leave();
        });

        for (name, listener) in [("pointermove", on_move), ("pointerleave", on_leave)] {
            self.canvas
                .add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())?;
            self.listeners.push((name, listener));
        }
        Ok(())
    }

    /// Pointer position in canvas CSS pixels, for hosts that route events themselves.
    #[wasm_bindgen]
    pub fn pointer_move(&self, x: f64, y: f64) {
        self.shared.pointer_move(PixelPoint::new(x, y));
    }

    #[wasm_bindgen]
    pub fn pointer_leave(&self) {
        self.shared.pointer_leave();
    }

    #[wasm_bindgen]
    pub fn hover(&self) -> Result<JsValue, JsValue> {
        to_js(&self.shared.viewer.borrow().hover())
    }

    /// Tooltip fields for the hovered node, or `null`.
    #[wasm_bindgen]
    pub fn inspector(&self) -> Result<JsValue, JsValue> {
        let viewer = self.shared.viewer.borrow();
        to_js(&viewer.inspector().map(|inspector| inspector.fields()))
    }

    /// Display list of the last layout, or `null` before a hill is loaded.
    #[wasm_bindgen]
    pub fn frame(&self) -> Result<JsValue, JsValue> {
        to_js(&self.shared.viewer.borrow().frame())
    }
}

impl Drop for HillViewer {
    fn drop(&mut self) {
        for (name, listener) in self.listeners.drain(..) {
            let _ = self
                .canvas
                .remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref());
        }
        self.shared.cancel_frame();
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(to_js_error)
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen::JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::HoverSignal;
    use crate::options::ViewerOptions;
    use crate::parse::{MeshPayload, SoilMapPayload};
    use crate::view::PixelPoint;
    use crate::viewer::Viewer;

    fn loaded_viewer() -> Viewer {
        let mut viewer = Viewer::new(ViewerOptions::default()).unwrap();
        viewer.set_viewport(400.0, 400.0);
        let mesh = MeshPayload {
            x_coords: vec![vec![0.0, 1.0, 2.0]; 3],
            z_coords: vec![vec![0.0; 3], vec![1.0; 3], vec![2.0; 3]],
            ..MeshPayload::default()
        };
        let soil = SoilMapPayload {
            matrix: vec![vec![0, 1], vec![1, 0]],
            ..SoilMapPayload::default()
        };
        viewer.load_payloads(1, &mesh, &soil).unwrap();
        viewer
    }

    #[test]
    fn hover_signal_follows_viewer_observers() {
        let mut viewer = loaded_viewer();
        let signal = HoverSignal::attach(&mut viewer);
        assert!(!signal.take());

        let origin = viewer.transform().unwrap().to_pixel(0.0, 0.0);
        assert!(viewer.pointer_move(origin));
        assert!(signal.take());
        assert!(!signal.take());

        // Same node, only the distance changes.
        viewer.pointer_move(PixelPoint::new(origin.x + 1.0, origin.y));
        assert!(!signal.take());

        viewer.set_viewport(300.0, 300.0);
        assert!(signal.take());
        assert!(viewer.hover().is_none());

        assert!(!viewer.pointer_leave());
        assert!(!signal.take());
    }
}
