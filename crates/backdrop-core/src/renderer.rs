use crate::scene::{Frame, SceneAssets};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("graphics context unavailable: {0}")]
    Context(String),
    #[error("surface lost or outdated")]
    SurfaceLost,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("render failed: {0}")]
    Other(String),
}

/// Host renderer the scene draws through.
///
/// `upload` is called once at mount with every static buffer; `draw` once
/// per frame; `release` exactly once when the scene goes away (including a
/// failed mount).
pub trait SceneRenderer {
    fn upload(&mut self, assets: &SceneAssets) -> Result<(), RenderError>;
    fn draw(&mut self, frame: &Frame) -> Result<(), RenderError>;
    fn resize(&mut self, _width: u32, _height: u32) {}
    fn release(&mut self);
}
