#![cfg(target_arch = "wasm32")]
mod dom;
mod driver;
mod gesture;
mod input;
mod render;

use anyhow::anyhow;
use backdrop_core::{MountedScene, SceneConfig};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys as web;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("backdrop-web loaded");
    Ok(())
}

/// Live backdrop returned to JS by [`mount`].
#[wasm_bindgen]
pub struct BackdropHandle {
    scene: Option<Rc<MountedScene>>,
    listeners: Vec<input::Listener>,
}

#[wasm_bindgen]
impl BackdropHandle {
    /// Stop the frame loop, detach listeners and free GPU resources. Safe to
    /// call more than once.
    pub fn unmount(&mut self) {
        self.listeners.clear();
        if let Some(scene) = self.scene.take() {
            match Rc::try_unwrap(scene) {
                Ok(scene) => scene.unmount(),
                Err(_) => log::warn!("[backdrop] scene still shared at unmount"),
            }
        }
    }

    #[wasm_bindgen(getter)]
    pub fn mounted(&self) -> bool {
        self.scene.as_ref().is_some_and(|s| s.is_mounted())
    }
}

impl Drop for BackdropHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Mount the backdrop on `<canvas id=canvas_id>`. Resolves to `null` (with
/// the canvas hidden) when WebGPU or the page layout is unavailable.
#[wasm_bindgen]
pub async fn mount(canvas_id: String) -> Option<BackdropHandle> {
    match try_mount(&canvas_id).await {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::error!("[backdrop] disabled: {e:#}");
            if let Some(canvas) =
                dom::window_document().and_then(|d| dom::canvas_by_id(&d, &canvas_id).ok())
            {
                dom::hide_canvas(&canvas);
            }
            None
        }
    }
}

async fn try_mount(canvas_id: &str) -> anyhow::Result<BackdropHandle> {
    let window = web::window().ok_or_else(|| anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow!("no document"))?;
    let canvas = dom::canvas_by_id(&document, canvas_id)?;
    dom::apply_background_layer(&canvas);
    let (width, height) = dom::sync_canvas_backing_size(&canvas);

    let renderer = render::WebRenderer::new(canvas.clone()).await?;
    let config = SceneConfig::default();
    let zoom_enabled = config.camera.enable_zoom;
    let driver = driver::AnimationFrameDriver::new(window.clone());
    let scene = Rc::new(backdrop_core::mount(config, renderer, driver)?);
    scene.resize(width, height);

    let listeners = input::wire(&window, &canvas, &scene, zoom_enabled)?;
    log::info!("[backdrop] mounted on #{canvas_id} at {width}x{height}");
    Ok(BackdropHandle {
        scene: Some(scene),
        listeners,
    })
}
