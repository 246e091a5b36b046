use crate::gesture::backing_size;
use anyhow::anyhow;
use backdrop_core::MAX_DEVICE_PIXEL_RATIO;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn canvas_by_id(document: &web::Document, id: &str) -> anyhow::Result<web::HtmlCanvasElement> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("missing #{id}"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|_| anyhow!("#{id} is not a canvas"))
}

/// Match the canvas backing store to its CSS box; returns the new size.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> (u32, u32) {
    let dpr = web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
    let rect = canvas.get_bounding_client_rect();
    let (w, h) = backing_size(rect.width(), rect.height(), dpr, MAX_DEVICE_PIXEL_RATIO);
    if canvas.width() != w {
        canvas.set_width(w);
    }
    if canvas.height() != h {
        canvas.set_height(h);
    }
    (w, h)
}

/// Full-bleed layer behind the page content that still receives pointer input.
pub fn apply_background_layer(canvas: &web::HtmlCanvasElement) {
    let style = canvas.style();
    for (key, value) in [
        ("position", "absolute"),
        ("inset", "0"),
        ("width", "100%"),
        ("height", "100%"),
        ("z-index", "0"),
        ("pointer-events", "auto"),
        ("display", "block"),
        ("touch-action", "pan-y"),
    ] {
        if let Err(e) = style.set_property(key, value) {
            log::warn!("[dom] could not set {key}: {e:?}");
        }
    }
}

pub fn hide_canvas(canvas: &web::HtmlCanvasElement) {
    canvas.style().set_property("display", "none").ok();
}
