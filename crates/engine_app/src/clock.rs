//! Per-frame timing.

use std::time::{Duration, Instant};

/// Measures the time between consecutive frames.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<Instant>,
    elapsed: Duration,
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick; zero on the first.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// [`FrameClock::tick`] with an explicit timestamp.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = self
            .last
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last = Some(now);
        self.elapsed += delta;
        delta.as_secs_f32()
    }

    /// Total time across all ticks.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
