//! Fixed-timestep clock using an accumulator pattern.
//!
//! `draw_web()` calls at ~60fps with variable delta. FrameClock converts
//! this into a fixed number of discrete ticks per second, so the settle
//! delay and the shake animation are deterministic and fully testable.

/// Clock resolution used throughout the app (50ms per tick).
pub const TICKS_PER_SEC: u32 = 20;

pub struct FrameClock {
    /// Milliseconds per tick
    ms_per_tick: f64,
    /// Accumulated milliseconds not yet consumed as ticks
    accumulator: f64,
    /// Total elapsed ticks since creation
    pub total_ticks: u64,
    /// Timestamp of the last update (ms), None if first frame
    last_timestamp: Option<f64>,
}

impl FrameClock {
    /// `ticks_per_sec`: how many ticks per real-time second.
    pub fn new(ticks_per_sec: u32) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec as f64,
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed wall-clock timestamp (from `performance.now()`).
    /// Returns the number of discrete ticks to process this frame.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => {
                // Clamp to avoid spiral-of-death if tab was backgrounded
                (now_ms - prev).clamp(0.0, 500.0)
            }
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(TICKS_PER_SEC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_returns_zero_ticks() {
        let mut clock = FrameClock::new(20);
        assert_eq!(clock.update(1234.0), 0);
    }

    #[test]
    fn one_tick_at_50ms() {
        let mut clock = FrameClock::new(20);
        clock.update(0.0);
        assert_eq!(clock.update(50.0), 1);
        assert_eq!(clock.total_ticks, 1);
    }

    #[test]
    fn remainder_carried_over() {
        let mut clock = FrameClock::new(20);
        clock.update(0.0);
        assert_eq!(clock.update(75.0), 1); // 25ms left over
        assert_eq!(clock.update(100.0), 1); // 25 + 25 = 50ms
        assert_eq!(clock.total_ticks, 2);
    }

    #[test]
    fn backgrounded_tab_is_clamped() {
        let mut clock = FrameClock::new(20);
        clock.update(0.0);
        // 10s gap → clamped to 500ms = 10 ticks
        assert_eq!(clock.update(10_000.0), 10);
    }

    #[test]
    fn clock_going_backwards_yields_nothing() {
        let mut clock = FrameClock::new(20);
        clock.update(500.0);
        assert_eq!(clock.update(100.0), 0);
        assert_eq!(clock.update(150.0), 1);
    }

    #[test]
    fn steady_60fps() {
        let mut clock = FrameClock::default();
        clock.update(0.0);
        let total: u32 = (1..=60).map(|i| clock.update(i as f64 * 16.667)).sum();
        assert!((19..=21).contains(&total), "expected ~20 ticks, got {total}");
    }
}
