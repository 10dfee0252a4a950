use std::time::{Duration, Instant};

pub const REVEAL_DURATION: Duration = Duration::from_millis(1200);

/// Share of the reveal after which forecast markers start to appear.
const FORECAST_LAG: f32 = 0.7;

pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Remaps linear progress so forecast markers trail the main reveal.
pub fn forecast_progress(linear: f32) -> f32 {
    ((linear - FORECAST_LAG) / (1.0 - FORECAST_LAG)).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Eased fraction of each polyline's on-screen length.
    pub line: f32,
    pub forecast: f32,
}

impl Progress {
    pub const START: Progress = Progress {
        line: 0.0,
        forecast: 0.0,
    };
    pub const COMPLETE: Progress = Progress {
        line: 1.0,
        forecast: 1.0,
    };

    pub fn at(linear: f32) -> Self {
        Progress {
            line: ease_out_cubic(linear),
            forecast: forecast_progress(linear),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.line >= 1.0 && self.forecast >= 1.0
    }
}

impl Default for Progress {
    fn default() -> Self {
        Progress::COMPLETE
    }
}

/// A running reveal. Dropping it cancels the animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reveal {
    started: Instant,
    duration: Duration,
}

impl Reveal {
    pub fn new(started: Instant, duration: Duration) -> Self {
        Reveal { started, duration }
    }

    pub fn linear_progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Animation {
    #[default]
    Idle,
    Running(Reveal),
}

impl Animation {
    /// Replaces whatever was running with a fresh reveal.
    pub fn start(&mut self, now: Instant) -> Progress {
        *self = Animation::Running(Reveal::new(now, REVEAL_DURATION));
        Progress::START
    }

    pub fn cancel(&mut self) {
        *self = Animation::Idle;
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Animation::Running(_))
    }

    /// Advances to `now`. Falls back to idle once the reveal is done.
    pub fn tick(&mut self, now: Instant) -> Option<Progress> {
        let Animation::Running(reveal) = self else {
            return None;
        };

        let linear = reveal.linear_progress(now);
        if linear >= 1.0 {
            *self = Animation::Idle;
            return Some(Progress::COMPLETE);
        }

        Some(Progress::at(linear))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_hits_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn forecast_lags_behind_line() {
        assert_eq!(forecast_progress(0.5), 0.0);
        assert_eq!(forecast_progress(0.7), 0.0);
        assert!((forecast_progress(0.85) - 0.5).abs() < 1e-5);
        assert_eq!(forecast_progress(1.0), 1.0);
    }

    #[test]
    fn progress_is_monotonic_and_completes() {
        let start = Instant::now();
        let mut animation = Animation::Idle;
        assert_eq!(animation.start(start), Progress::START);

        let mut last = 0.0;
        for ms in (0..=1200).step_by(50) {
            let progress = animation
                .tick(start + Duration::from_millis(ms))
                .unwrap();
            assert!(progress.line >= last);
            last = progress.line;
        }

        assert_eq!(last, 1.0);
        assert!(!animation.is_running());
        assert_eq!(animation.tick(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn restart_replaces_running_reveal() {
        let start = Instant::now();
        let mut animation = Animation::Idle;
        animation.start(start);

        let later = start + Duration::from_millis(900);
        animation.start(later);

        let progress = animation.tick(later + Duration::from_millis(10)).unwrap();
        assert!(progress.line < 0.1);
    }

    #[test]
    fn cancel_goes_idle() {
        let mut animation = Animation::Idle;
        animation.start(Instant::now());
        animation.cancel();
        assert!(!animation.is_running());
    }
}
