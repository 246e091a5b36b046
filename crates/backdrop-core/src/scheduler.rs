//! Frame scheduling on top of a host refresh driver.
//!
//! [`FrameScheduler::activate`] hands a callback to the driver and returns a
//! [`Subscription`]. Dropping or deactivating the subscription cancels the
//! driver registration and flips a liveness flag checked on every tick, so a
//! stale tick delivered after deactivation does nothing.

use crate::clock::{FrameClock, FrameTime};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use thiserror::Error;

/// Invoked by the driver once per display refresh with a host timestamp in
/// seconds.
pub type FrameCallback = Box<dyn FnMut(f64)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DriverToken(pub u64);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("refresh driver refused registration: {0}")]
    Refused(String),
}

/// Source of display-refresh ticks.
pub trait RefreshDriver {
    fn schedule(&mut self, callback: FrameCallback) -> Result<DriverToken, SchedulerError>;
    fn cancel(&mut self, token: DriverToken);
}

pub struct FrameScheduler;

impl FrameScheduler {
    pub fn activate<D, F>(mut driver: D, mut on_frame: F) -> Result<Subscription, SchedulerError>
    where
        D: RefreshDriver + 'static,
        F: FnMut(FrameTime) + 'static,
    {
        let live = Rc::new(Cell::new(true));
        let invocations = Rc::new(Cell::new(0_u64));
        let mut clock = FrameClock::new();
        let live_tick = live.clone();
        let count_tick = invocations.clone();
        let token = driver.schedule(Box::new(move |now_sec| {
            if !live_tick.get() {
                return;
            }
            let time = clock.tick(now_sec);
            count_tick.set(count_tick.get() + 1);
            on_frame(time);
        }))?;
        log::debug!("[scheduler] activated token={}", token.0);
        Ok(Subscription {
            driver: Box::new(driver),
            token: Some(token),
            live,
            invocations,
        })
    }
}

/// Scoped registration with a refresh driver.
pub struct Subscription {
    driver: Box<dyn RefreshDriver>,
    token: Option<DriverToken>,
    live: Rc<Cell<bool>>,
    invocations: Rc<Cell<u64>>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.token.is_some()
    }

    /// Number of frame callbacks that reached the consumer.
    pub fn invocations(&self) -> u64 {
        self.invocations.get()
    }

    pub fn deactivate(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(token) = self.token.take() {
            self.live.set(false);
            self.driver.cancel(token);
            log::debug!(
                "[scheduler] deactivated token={} after {} frames",
                token.0,
                self.invocations.get()
            );
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[derive(Default)]
struct ManualInner {
    next_token: u64,
    callbacks: Vec<(DriverToken, FrameCallback)>,
    cancelled: Vec<DriverToken>,
    refuse: Option<String>,
}

/// Driver for hosts that pump frames themselves.
///
/// Clones share state, so one clone can be handed to the scheduler while
/// another calls [`ManualDriver::pump`].
#[derive(Clone, Default)]
pub struct ManualDriver {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A driver whose `schedule` always fails.
    pub fn refusing(reason: &str) -> Self {
        let d = Self::default();
        d.inner.borrow_mut().refuse = Some(reason.to_string());
        d
    }

    pub fn scheduled(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }

    /// Deliver one refresh tick to every registered callback; returns how
    /// many callbacks were called.
    pub fn pump(&self, now_sec: f64) -> usize {
        let mut running = std::mem::take(&mut self.inner.borrow_mut().callbacks);
        for (_, callback) in running.iter_mut() {
            callback(now_sec);
        }
        let called = running.len();
        let mut inner = self.inner.borrow_mut();
        let cancelled = std::mem::take(&mut inner.cancelled);
        running.retain(|(token, _)| !cancelled.contains(token));
        running.append(&mut inner.callbacks);
        inner.callbacks = running;
        called
    }
}

impl RefreshDriver for ManualDriver {
    fn schedule(&mut self, callback: FrameCallback) -> Result<DriverToken, SchedulerError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(reason) = &inner.refuse {
            return Err(SchedulerError::Refused(reason.clone()));
        }
        let token = DriverToken(inner.next_token);
        inner.next_token += 1;
        inner.callbacks.push((token, callback));
        Ok(token)
    }

    fn cancel(&mut self, token: DriverToken) {
        let mut inner = self.inner.borrow_mut();
        let before = inner.callbacks.len();
        inner.callbacks.retain(|(t, _)| *t != token);
        if inner.callbacks.len() == before {
            // Possibly mid-pump; `pump` drops it when it puts callbacks back.
            inner.cancelled.push(token);
        }
    }
}
