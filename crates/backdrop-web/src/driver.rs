//! `requestAnimationFrame` refresh driver.
//!
//! Each scheduled callback gets its own self-rescheduling closure that runs
//! until `cancel` drops it.

use backdrop_core::{DriverToken, FrameCallback, RefreshDriver, SchedulerError};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type Tick = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

struct Loop {
    callback: FrameCallback,
    handle: Option<i32>,
    cancelled: bool,
}

pub struct AnimationFrameDriver {
    window: web::Window,
    next_token: u64,
    loops: Vec<(DriverToken, Rc<RefCell<Loop>>, Tick)>,
}

impl AnimationFrameDriver {
    pub fn new(window: web::Window) -> Self {
        Self {
            window,
            next_token: 0,
            loops: Vec::new(),
        }
    }
}

fn request(window: &web::Window, tick: &Tick) -> Result<i32, SchedulerError> {
    let tick = tick.borrow();
    let closure = tick
        .as_ref()
        .ok_or_else(|| SchedulerError::Refused("frame loop already torn down".into()))?;
    window
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .map_err(|e| SchedulerError::Refused(format!("{e:?}")))
}

impl RefreshDriver for AnimationFrameDriver {
    fn schedule(&mut self, callback: FrameCallback) -> Result<DriverToken, SchedulerError> {
        let state = Rc::new(RefCell::new(Loop {
            callback,
            handle: None,
            cancelled: false,
        }));
        let tick: Tick = Rc::new(RefCell::new(None));

        let tick_clone = tick.clone();
        let state_tick = state.clone();
        let window = self.window.clone();
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            {
                let mut s = state_tick.borrow_mut();
                s.handle = None;
                if s.cancelled {
                    return;
                }
                let now_sec = instant::now() / 1000.0;
                (s.callback)(now_sec);
            }
            match request(&window, &tick_clone) {
                Ok(handle) => state_tick.borrow_mut().handle = Some(handle),
                Err(e) => log::error!("[driver] {e}"),
            }
        }) as Box<dyn FnMut()>));

        let handle = request(&self.window, &tick)?;
        state.borrow_mut().handle = Some(handle);
        let token = DriverToken(self.next_token);
        self.next_token += 1;
        self.loops.push((token, state, tick));
        Ok(token)
    }

    fn cancel(&mut self, token: DriverToken) {
        let Some(index) = self.loops.iter().position(|(t, _, _)| *t == token) else {
            return;
        };
        let (_, state, tick) = self.loops.swap_remove(index);
        let mut s = state.borrow_mut();
        s.cancelled = true;
        if let Some(handle) = s.handle.take() {
            self.window.cancel_animation_frame(handle).ok();
        }
        // Breaks the closure <-> tick cycle.
        tick.borrow_mut().take();
    }
}
