//! Frame timing for the tick loop.

use web_time::{Duration, Instant};

/// Time elapsed between two ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTiming {
    /// Wall-clock time since the previous sample
    pub raw_dt: Duration,
    /// `raw_dt` clamped to the maximum step, used for physics
    pub dt: Duration,
}

/// Measures frame deltas from timestamps supplied by the caller.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    max_dt: Duration,
}

impl FrameClock {
    /// Creates a clock whose physics step never exceeds `max_dt`.
    pub fn new(max_dt: Duration) -> Self {
        Self { last: None, max_dt }
    }

    /// Records `now` and returns the time since the previous sample.
    ///
    /// The first sample, and any sample that goes backwards, yields zero.
    pub fn sample(&mut self, now: Instant) -> FrameTiming {
        let raw_dt = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last = Some(now);

        FrameTiming {
            raw_dt,
            dt: raw_dt.min(self.max_dt),
        }
    }

    /// Forgets the previous sample, so the next one yields zero.
    pub fn restart(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_is_zero() {
        let mut clock = FrameClock::new(Duration::from_millis(50));
        assert_eq!(clock.sample(Instant::now()), FrameTiming::default());
    }

    #[test]
    fn samples_measure_the_gap_and_clamp_dt() {
        let start = Instant::now();
        let mut clock = FrameClock::new(Duration::from_millis(50));
        clock.sample(start);

        let timing = clock.sample(start + Duration::from_millis(16));
        assert_eq!(timing.raw_dt, Duration::from_millis(16));
        assert_eq!(timing.dt, Duration::from_millis(16));

        let timing = clock.sample(start + Duration::from_millis(216));
        assert_eq!(timing.raw_dt, Duration::from_millis(200));
        assert_eq!(timing.dt, Duration::from_millis(50));
    }

    #[test]
    fn restart_drops_the_previous_sample() {
        let start = Instant::now();
        let mut clock = FrameClock::new(Duration::from_millis(50));
        clock.sample(start);
        clock.restart();
        assert_eq!(clock.sample(start + Duration::from_secs(5)).raw_dt, Duration::ZERO);
    }
}
