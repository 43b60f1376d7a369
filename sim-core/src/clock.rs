/// Accumulates host time between two growth iterations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthClock {
    elapsed: f32,
    interval: f32,
}

impl GrowthClock {
    /// `interval` must be positive; [`crate::config::GrowthConfig::validate`]
    /// guarantees it for configured clocks.
    pub fn new(interval: f32) -> Self {
        Self {
            elapsed: 0.0,
            interval,
        }
    }

    /// Adds `dt` seconds. Returns `true` and restarts from zero once the
    /// accumulated time exceeds the interval.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt.max(0.0);
        if self.elapsed > self.interval {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }

    /// Restarts the interval without firing.
    #[inline]
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Fraction of the interval elapsed since the last iteration, in `[0, 1]`.
    #[inline]
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.interval).clamp(0.0, 1.0)
    }
}
