use std::{cell::Cell, rc::Rc};

/// Monotonic milliseconds since an arbitrary origin.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall clock, safe on wasm32.
#[derive(Clone, Copy, Debug)]
pub struct InstantClock {
    origin: instant::Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            origin: instant::Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for InstantClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Rc<Cell<f64>>);

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self(Rc::new(Cell::new(start_ms)))
    }

    pub fn set(&self, now_ms: f64) {
        self.0.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.0.set(self.0.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.0.get()
    }
}

/// Measures the time between consecutive frames.
///
/// The delta is not clamped: after a long pause (a hidden tab, a breakpoint)
/// the next frame sees the whole gap at once.
#[derive(Debug)]
pub struct FrameTimer<C> {
    clock: C,
    last_ms: f64,
}

impl<C: Clock> FrameTimer<C> {
    pub fn new(clock: C) -> Self {
        let last_ms = clock.now_ms();
        Self { clock, last_ms }
    }

    pub fn delta_ms(&mut self) -> f64 {
        let now = self.clock.now_ms();
        let delta = now - self.last_ms;
        self.last_ms = now;
        delta
    }
}
