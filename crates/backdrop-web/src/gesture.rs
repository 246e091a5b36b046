use backdrop_core::PointerInput;

/// Primary button rotates, secondary (or primary with shift) pans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMode {
    Rotate,
    Pan,
}

impl DragMode {
    pub fn from_button(button: i16, shift: bool) -> Self {
        if button == 2 || (button == 0 && shift) {
            DragMode::Pan
        } else {
            DragMode::Rotate
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ActiveDrag {
    pointer_id: i32,
    mode: DragMode,
    last: [f32; 2],
}

/// Turns raw pointer events into controller input, tracking one pointer at
/// a time.
#[derive(Debug, Default)]
pub struct DragTracker {
    active: Option<ActiveDrag>,
}

impl DragTracker {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Start a drag; a second pointer while one is held is ignored.
    pub fn begin(&mut self, pointer_id: i32, mode: DragMode, x: f32, y: f32) -> Option<PointerInput> {
        if self.active.is_some() {
            return None;
        }
        self.active = Some(ActiveDrag {
            pointer_id,
            mode,
            last: [x, y],
        });
        match mode {
            DragMode::Rotate => Some(PointerInput::DragStart),
            DragMode::Pan => None,
        }
    }

    pub fn move_to(
        &mut self,
        pointer_id: i32,
        x: f32,
        y: f32,
        viewport_height: f32,
    ) -> Option<PointerInput> {
        let drag = self.active.as_mut().filter(|d| d.pointer_id == pointer_id)?;
        let dx = x - drag.last[0];
        let dy = y - drag.last[1];
        drag.last = [x, y];
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        Some(match drag.mode {
            DragMode::Rotate => PointerInput::DragMove {
                dx,
                dy,
                viewport_height,
            },
            DragMode::Pan => PointerInput::Pan {
                dx,
                dy,
                viewport_height,
            },
        })
    }

    pub fn end(&mut self, pointer_id: i32) -> Option<PointerInput> {
        match self.active {
            Some(drag) if drag.pointer_id == pointer_id => {
                self.active = None;
                match drag.mode {
                    DragMode::Rotate => Some(PointerInput::DragEnd),
                    DragMode::Pan => None,
                }
            }
            _ => None,
        }
    }
}

/// One zoom step per wheel event; scrolling down moves away.
pub fn wheel_steps(delta_y: f64) -> f32 {
    if delta_y > 0.0 {
        -1.0
    } else if delta_y < 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Backing-store size for a CSS box, with the pixel ratio clamped to
/// `[1, max_ratio]`.
pub fn backing_size(css_width: f64, css_height: f64, device_pixel_ratio: f64, max_ratio: f64) -> (u32, u32) {
    let ratio = if device_pixel_ratio.is_finite() {
        device_pixel_ratio.clamp(1.0, max_ratio.max(1.0))
    } else {
        1.0
    };
    let w = (css_width.max(0.0) * ratio) as u32;
    let h = (css_height.max(0.0) * ratio) as u32;
    (w.max(1), h.max(1))
}
