use web_time::Instant;

/// Elapsed and delta time for one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the clock was started.
    pub elapsed: f32,
    /// Seconds since the previous tick.
    pub delta: f32,
}

/// Monotonic frame clock, ticked exactly once per loop iteration.
///
/// The elapsed time drives light and helicopter animation. The delta
/// scales camera movement so it is frame-rate independent.
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Start a clock at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Start a clock at a given instant.
    #[must_use]
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            frame_index: 0,
        }
    }

    /// Advance to the current instant.
    pub fn tick(&mut self) -> FrameTime {
        self.advance_to(Instant::now())
    }

    /// Advance to `now`. Instants earlier than the previous tick yield a
    /// zero delta rather than a negative one.
    pub fn advance_to(&mut self, now: Instant) -> FrameTime {
        let delta = now.saturating_duration_since(self.last);
        self.last = now.max(self.last);
        self.frame_index += 1;
        FrameTime {
            elapsed: self.last.duration_since(self.start).as_secs_f32(),
            delta: delta.as_secs_f32(),
        }
    }

    /// Number of ticks so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

/// Exponential moving average of the frame rate, fed with
/// [`FrameTime::delta`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsMeter {
    smoothed: f32,
    // weight of the newest sample, 0..=1
    smoothing: f32,
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self {
            smoothed: 60.0,
            smoothing: 0.05,
        }
    }
}

impl FpsMeter {
    /// Fold one frame into the average. Zero deltas (the first tick, or a
    /// clock that did not advance) are skipped.
    pub fn record(&mut self, time: FrameTime) {
        if time.delta > 0.0 {
            let instant = 1.0 / time.delta;
            self.smoothed = self.smoothed.mul_add(
                1.0 - self.smoothing,
                instant * self.smoothing,
            );
        }
    }

    /// Smoothed frames per second.
    pub fn fps(&self) -> f32 {
        self.smoothed
    }
}

#[cfg(test)]
mod tests {
    use web_time::Duration;

    use super::*;

    #[test]
    fn clock_reports_delta_and_elapsed() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);

        let first = clock.advance_to(start + Duration::from_millis(16));
        let second = clock.advance_to(start + Duration::from_millis(48));

        assert!((first.delta - 0.016).abs() < 1e-6);
        assert!((second.delta - 0.032).abs() < 1e-6);
        assert!((second.elapsed - 0.048).abs() < 1e-6);
        assert_eq!(clock.frame_index(), 2);
    }

    #[test]
    fn clock_never_runs_backwards() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::starting_at(start);
        let _ = clock.advance_to(start + Duration::from_millis(100));

        let stale = clock.advance_to(start + Duration::from_millis(50));

        assert_eq!(stale.delta, 0.0);
        assert!((stale.elapsed - 0.1).abs() < 1e-6);
    }

    #[test]
    fn fps_average_moves_toward_frame_rate() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let mut meter = FpsMeter::default();
        for frame in 1..=200 {
            meter.record(
                clock.advance_to(start + Duration::from_millis(frame * 33)),
            );
        }
        assert!((meter.fps() - 1000.0 / 33.0).abs() < 0.5);
    }

    #[test]
    fn stalled_clock_leaves_fps_unchanged() {
        let mut meter = FpsMeter::default();
        meter.record(FrameTime {
            elapsed: 1.0,
            delta: 0.0,
        });
        assert_eq!(meter.fps(), FpsMeter::default().fps());
    }
}
