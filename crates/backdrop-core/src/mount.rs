//! Mount/unmount lifecycle for the backdrop.
//!
//! `mount` acquires in order: scene, renderer upload, frame subscription.
//! Whatever has been acquired is released again if a later step fails, and
//! `unmount` (or dropping the handle) releases everything exactly once.

use crate::clock::FrameTime;
use crate::renderer::{RenderError, SceneRenderer};
use crate::scene::{Scene, SceneConfig};
use crate::scheduler::{FrameScheduler, RefreshDriver, SchedulerError, Subscription};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MountError {
    #[error("renderer setup failed: {0}")]
    Render(#[from] RenderError),
    #[error("frame scheduling failed: {0}")]
    Scheduler(#[from] SchedulerError),
}

/// Pointer and wheel input routed to the orbit controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    DragStart,
    DragMove {
        dx: f32,
        dy: f32,
        viewport_height: f32,
    },
    DragEnd,
    Wheel {
        steps: f32,
    },
    Pan {
        dx: f32,
        dy: f32,
        viewport_height: f32,
    },
}

struct SceneState {
    scene: Option<Scene>,
    renderer: Box<dyn SceneRenderer>,
    frames_drawn: u64,
}

impl SceneState {
    fn frame(&mut self, time: FrameTime) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let frame = scene.compose(time);
        match self.renderer.draw(&frame) {
            Ok(()) => self.frames_drawn += 1,
            Err(e) => log::error!("render error: {e}"),
        }
    }

    fn release(&mut self) {
        if self.scene.take().is_some() {
            self.renderer.release();
            log::info!("[mount] released after {} frames", self.frames_drawn);
        }
    }
}

/// Releases the scene state unless disarmed; covers early returns in `mount`.
struct ReleaseOnError<'a> {
    state: &'a RefCell<SceneState>,
    armed: bool,
}

impl Drop for ReleaseOnError<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.borrow_mut().release();
        }
    }
}

/// Handle for a live backdrop.
pub struct MountedScene {
    subscription: Option<Subscription>,
    state: Rc<RefCell<SceneState>>,
}

pub fn mount<R, D>(config: SceneConfig, renderer: R, driver: D) -> Result<MountedScene, MountError>
where
    R: SceneRenderer + 'static,
    D: RefreshDriver + 'static,
{
    let state = Rc::new(RefCell::new(SceneState {
        scene: Some(Scene::new(config)),
        renderer: Box::new(renderer),
        frames_drawn: 0,
    }));
    let mut guard = ReleaseOnError {
        state: &state,
        armed: true,
    };

    {
        let mut s = state.borrow_mut();
        let SceneState {
            scene, renderer, ..
        } = &mut *s;
        if let Some(scene) = scene.as_ref() {
            renderer.upload(scene.assets())?;
        }
    }

    let weak: Weak<RefCell<SceneState>> = Rc::downgrade(&state);
    let subscription = FrameScheduler::activate(driver, move |time| {
        if let Some(state) = weak.upgrade() {
            state.borrow_mut().frame(time);
        }
    })?;

    guard.armed = false;
    drop(guard);
    log::info!("[mount] backdrop mounted");
    Ok(MountedScene {
        subscription: Some(subscription),
        state,
    })
}

impl MountedScene {
    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Frame callbacks delivered so far.
    pub fn invocations(&self) -> u64 {
        self.subscription
            .as_ref()
            .map(Subscription::invocations)
            .unwrap_or(0)
    }

    pub fn frames_drawn(&self) -> u64 {
        self.state.borrow().frames_drawn
    }

    pub fn input(&self, input: PointerInput) {
        let mut state = self.state.borrow_mut();
        let Some(scene) = state.scene.as_mut() else {
            return;
        };
        let controller = scene.controller_mut();
        match input {
            PointerInput::DragStart => controller.begin_drag(),
            PointerInput::DragMove {
                dx,
                dy,
                viewport_height,
            } => controller.drag(dx, dy, viewport_height),
            PointerInput::DragEnd => controller.end_drag(),
            PointerInput::Wheel { steps } => controller.zoom(steps),
            PointerInput::Pan {
                dx,
                dy,
                viewport_height,
            } => controller.pan(dx, dy, viewport_height),
        }
    }

    pub fn resize(&self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let mut state = self.state.borrow_mut();
        let SceneState {
            scene, renderer, ..
        } = &mut *state;
        if let Some(scene) = scene.as_mut() {
            scene
                .controller_mut()
                .set_aspect(width as f32 / height as f32);
            renderer.resize(width, height);
        }
    }

    /// Read-only access to the live scene, `None` after unmount.
    pub fn with_scene<T>(&self, f: impl FnOnce(&Scene) -> T) -> Option<T> {
        self.state.borrow().scene.as_ref().map(f)
    }

    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.deactivate();
            self.state.borrow_mut().release();
            log::info!("[mount] backdrop unmounted");
        }
    }
}

impl Drop for MountedScene {
    fn drop(&mut self) {
        self.teardown();
    }
}
