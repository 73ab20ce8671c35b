use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frames averaged by [`FrameClock::fps`].
const FPS_WINDOW: usize = 10;

/// One tick of a [`FrameClock`].
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,
    pub now: Instant,
    pub frame_index: u64,
}

/// Per-loop frame timer.
///
/// `dt` is clamped so a stalled or minimized window does not produce a huge
/// step. The FPS estimate averages the unclamped intervals of the last few
/// frames.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
    recent: VecDeque<Duration>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
            recent: VecDeque::with_capacity(FPS_WINDOW),
        }
    }

    /// Restarts timing, e.g. after the window was hidden.
    pub fn reset(&mut self) {
        self.last = Instant::now();
        self.recent.clear();
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// [`tick`](Self::tick) with an explicit timestamp.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;

        if self.recent.len() == FPS_WINDOW {
            self.recent.pop_front();
        }
        self.recent.push_back(elapsed);

        let ft = FrameTime {
            dt: elapsed.clamp(self.dt_min, self.dt_max).as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }

    /// Frames per second over the last few ticks; `0.0` before the first tick.
    pub fn fps(&self) -> f32 {
        let total: Duration = self.recent.iter().sum();
        if total.is_zero() {
            return 0.0;
        }
        self.recent.len() as f32 / total.as_secs_f32()
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_averages_recent_frames() {
        let mut clock = FrameClock::new();
        let mut now = clock.last;
        for _ in 0..20 {
            now += Duration::from_millis(20);
            clock.tick_at(now);
        }
        assert!((clock.fps() - 50.0).abs() < 0.5, "{}", clock.fps());
        assert_eq!(clock.frame_index(), 20);
    }

    #[test]
    fn no_ticks_means_no_fps() {
        assert_eq!(FrameClock::new().fps(), 0.0);
    }

    #[test]
    fn dt_is_clamped() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(1), Duration::from_millis(100));
        let start = clock.last;
        let ft = clock.tick_at(start + Duration::from_secs(5));
        assert!((ft.dt - 0.1).abs() < 1e-6);
        assert_eq!(ft.frame_index, 0);
    }
}
