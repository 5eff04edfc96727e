use std::{cell::Cell, rc::Rc, time::Instant};

/// Millisecond time source, the equivalent of `performance.now()`.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin. Never decreases.
    fn now_ms(&self) -> f64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

/// Wall-clock source measured from its construction.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Manually advanced clock. Clones share the same time, so a host can drive the clock it handed
/// to an animation loop.
#[derive(Clone, Debug, Default)]
pub struct VirtualClock {
    now: Rc<Cell<f64>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(ms)),
        }
    }

    /// Move time forward by `ms`. Negative or non-finite steps are ignored.
    pub fn advance(&self, ms: f64) {
        if ms.is_finite() && ms > 0.0 {
            self.now.set(self.now.get() + ms);
        }
    }

    /// Jump to `ms` if it is not in the past.
    pub fn set(&self, ms: f64) {
        if ms.is_finite() && ms >= self.now.get() {
            self.now.set(ms);
        }
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}
