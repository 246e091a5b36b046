use crate::dom;
use crate::gesture::{wheel_steps, DragMode, DragTracker};
use anyhow::anyhow;
use backdrop_core::{MountedScene, PointerInput};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// DOM event listener that is removed again when dropped.
pub struct Listener {
    target: web::EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

impl Listener {
    pub fn add(
        target: &web::EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(web::Event) + 'static,
    ) -> anyhow::Result<Self> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        let options = web::AddEventListenerOptions::new();
        options.set_passive(passive);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                closure.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(|e| anyhow!("{kind} listener: {e:?}"))?;
        Ok(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref())
            .ok();
    }
}

fn forward(scene: &Weak<MountedScene>, input: Option<PointerInput>) {
    if let (Some(scene), Some(input)) = (scene.upgrade(), input) {
        scene.input(input);
    }
}

/// Wire pointer, wheel and resize handling for a mounted scene. Handlers
/// hold weak references, so dropping the returned listeners is all the
/// cleanup needed.
pub fn wire(
    window: &web::Window,
    canvas: &web::HtmlCanvasElement,
    scene: &Rc<MountedScene>,
    zoom_enabled: bool,
) -> anyhow::Result<Vec<Listener>> {
    let tracker = Rc::new(RefCell::new(DragTracker::default()));
    let mut listeners = Vec::with_capacity(6);

    // pointerdown
    {
        let scene = Rc::downgrade(scene);
        let tracker = tracker.clone();
        let canvas_target = canvas.clone();
        listeners.push(Listener::add(canvas, "pointerdown", true, move |ev| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            let mode = DragMode::from_button(ev.button(), ev.shift_key());
            let input = tracker.borrow_mut().begin(
                ev.pointer_id(),
                mode,
                ev.client_x() as f32,
                ev.client_y() as f32,
            );
            if tracker.borrow().is_active() {
                canvas_target.set_pointer_capture(ev.pointer_id()).ok();
            }
            forward(&scene, input);
        })?);
    }

    // pointermove
    {
        let scene = Rc::downgrade(scene);
        let tracker = tracker.clone();
        let canvas_move = canvas.clone();
        listeners.push(Listener::add(window, "pointermove", true, move |ev| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            if !tracker.borrow().is_active() {
                return;
            }
            let viewport_height = canvas_move.get_bounding_client_rect().height() as f32;
            let input = tracker.borrow_mut().move_to(
                ev.pointer_id(),
                ev.client_x() as f32,
                ev.client_y() as f32,
                viewport_height,
            );
            forward(&scene, input);
        })?);
    }

    // pointerup / pointercancel
    for kind in ["pointerup", "pointercancel"] {
        let scene = Rc::downgrade(scene);
        let tracker = tracker.clone();
        listeners.push(Listener::add(window, kind, true, move |ev| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            let input = tracker.borrow_mut().end(ev.pointer_id());
            forward(&scene, input);
        })?);
    }

    // wheel; page scrolling stays untouched unless zoom is on
    {
        let scene = Rc::downgrade(scene);
        listeners.push(Listener::add(canvas, "wheel", !zoom_enabled, move |ev| {
            let Some(wheel) = ev.dyn_ref::<web::WheelEvent>() else {
                return;
            };
            if zoom_enabled {
                ev.prevent_default();
            }
            let steps = wheel_steps(wheel.delta_y());
            if steps != 0.0 {
                forward(&scene, Some(PointerInput::Wheel { steps }));
            }
        })?);
    }

    // resize
    {
        let scene = Rc::downgrade(scene);
        let canvas_resize = canvas.clone();
        listeners.push(Listener::add(window, "resize", true, move |_| {
            let (w, h) = dom::sync_canvas_backing_size(&canvas_resize);
            if let Some(scene) = scene.upgrade() {
                scene.resize(w, h);
            }
        })?);
    }

    log::info!("[input] {} listeners attached", listeners.len());
    Ok(listeners)
}
