/// Elapsed/delta pair handed to every per-frame consumer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the first tick after activation.
    pub elapsed: f32,
    /// Seconds since the previous tick (0 on the first).
    pub delta: f32,
    /// Number of ticks before this one.
    pub frame: u64,
}

/// Monotonic scene clock fed with host timestamps.
///
/// The first tick defines time zero. Timestamps that go backwards (or are
/// not finite) never move elapsed time back; they yield a zero delta.
#[derive(Debug, Default)]
pub struct FrameClock {
    origin: Option<f64>,
    elapsed: f64,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, now_sec: f64) -> FrameTime {
        let previous = self.elapsed;
        if now_sec.is_finite() {
            let origin = *self.origin.get_or_insert(now_sec);
            self.elapsed = (now_sec - origin).max(previous);
        }
        let frame = self.frames;
        self.frames += 1;
        FrameTime {
            elapsed: self.elapsed as f32,
            delta: (self.elapsed - previous) as f32,
            frame,
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_time_zero() {
        let mut clock = FrameClock::new();
        let t = clock.tick(1234.5);
        assert_eq!(t.elapsed, 0.0);
        assert_eq!(t.delta, 0.0);
        assert_eq!(t.frame, 0);
    }

    #[test]
    fn measures_elapsed_and_delta() {
        let mut clock = FrameClock::new();
        clock.tick(10.0);
        clock.tick(10.016);
        let t = clock.tick(10.05);
        assert!((t.elapsed - 0.05).abs() < 1e-6);
        assert!((t.delta - 0.034).abs() < 1e-6);
        assert_eq!(t.frame, 2);
    }

    #[test]
    fn never_runs_backwards() {
        let mut clock = FrameClock::new();
        clock.tick(5.0);
        clock.tick(6.0);
        let t = clock.tick(5.5);
        assert_eq!(t.elapsed, 1.0);
        assert_eq!(t.delta, 0.0);
        let t = clock.tick(f64::NAN);
        assert_eq!(t.elapsed, 1.0);
        assert_eq!(clock.frames(), 4);
    }
}
