//! L3 Molecular Layer: Time-based animation driver
//!
//! Combines easing functions and timing utilities to move a value (the page
//! scroll offset) toward a target over a fixed duration, one frame at a time.

use super::easing::EasingType;
use super::timing::{clamped_elapsed, Millis};

/// A single run from `start_value` to `target_value`
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationRun {
    pub start_value: f64,
    pub target_value: f64,
    /// Timestamp of the first frame; captured lazily so scheduling latency
    /// between the call and the first frame does not eat into the curve
    pub start_time: Option<Millis>,
    pub duration_ms: Millis,
    pub easing: EasingType,
}

impl AnimationRun {
    pub fn new(start_value: f64, target_value: f64, duration_ms: Millis, easing: EasingType) -> Self {
        Self {
            start_value,
            target_value,
            start_time: None,
            duration_ms,
            easing,
        }
    }

    /// Advance to `now`, returning the value to apply and whether this was
    /// the final frame
    pub fn sample(&mut self, now: Millis) -> (f64, bool) {
        let start = *self.start_time.get_or_insert(now);
        let elapsed = clamped_elapsed(start, now, self.duration_ms);

        if elapsed >= self.duration_ms {
            // Final frame lands exactly on target, never past it
            return (self.target_value, true);
        }

        let delta = self.target_value - self.start_value;
        let value = self
            .easing
            .ease(elapsed, self.start_value, delta, self.duration_ms);
        (value, false)
    }
}

/// Scroll animation driver
///
/// Call `animate_to()` to begin a run, then `frame()` once per display frame
/// with the frame timestamp to get the scroll position to apply. Starting a
/// new run while one is active replaces it (cancel-on-restart).
#[derive(Debug, Clone, Default)]
pub struct ScrollDriver {
    run: Option<AnimationRun>,
    runs_started: u64,
}

impl ScrollDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run from `current` to `target`
    ///
    /// Returns true if an in-flight run was cancelled by this call.
    pub fn animate_to(
        &mut self,
        current: f64,
        target: f64,
        duration_ms: Millis,
        easing: EasingType,
    ) -> bool {
        let replaced = self.run.is_some();
        self.run = Some(AnimationRun::new(current, target, duration_ms, easing));
        self.runs_started += 1;
        replaced
    }

    /// Advance the active run; `None` when idle
    pub fn frame(&mut self, now: Millis) -> Option<f64> {
        let run = self.run.as_mut()?;
        let (value, done) = run.sample(now);
        if done {
            self.run = None;
        }
        Some(value)
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.run.is_some()
    }

    /// Target of the active run, if any
    pub fn target(&self) -> Option<f64> {
        self.run.as_ref().map(|r| r.target_value)
    }

    pub fn active_run(&self) -> Option<&AnimationRun> {
        self.run.as_ref()
    }

    /// Total runs started since creation
    pub fn runs_started(&self) -> u64 {
        self.runs_started
    }

    /// Stop at the current position
    pub fn cancel(&mut self) {
        self.run = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive a run to completion with the given frame intervals, returning
    /// every applied value
    fn drive(driver: &mut ScrollDriver, start: Millis, intervals: &[Millis]) -> Vec<f64> {
        let mut now = start;
        let mut applied = Vec::new();
        let mut i = 0;
        while let Some(v) = driver.frame(now) {
            applied.push(v);
            now += intervals[i % intervals.len()];
            i += 1;
        }
        applied
    }

    #[test]
    fn test_lands_exactly_on_target_with_jitter() {
        for intervals in [
            vec![16.7],
            vec![16.0, 17.0, 33.0],
            vec![7.3, 41.9, 16.6, 3.1],
            vec![333.0],
            vec![999.0, 2.0],
        ] {
            let mut driver = ScrollDriver::new();
            driver.animate_to(0.0, 1000.0, 1000.0, EasingType::CubicInOut);
            let applied = drive(&mut driver, 5000.0, &intervals);
            assert_eq!(*applied.last().unwrap(), 1000.0);
            assert!(applied.iter().all(|v| *v <= 1000.0), "overshoot with {:?}", intervals);
            assert!(!driver.is_animating());
        }
    }

    #[test]
    fn test_start_time_captured_on_first_frame() {
        let mut driver = ScrollDriver::new();
        driver.animate_to(200.0, 800.0, 500.0, EasingType::Linear);
        // First frame arrives late; curve still starts from the beginning
        assert_eq!(driver.frame(10_000.0), Some(200.0));
        let mid = driver.frame(10_250.0).unwrap();
        assert!((mid - 500.0).abs() < 1e-9);
        assert_eq!(driver.frame(10_500.0), Some(800.0));
        assert_eq!(driver.frame(10_516.0), None);
    }

    #[test]
    fn test_restart_cancels_previous_run() {
        let mut driver = ScrollDriver::new();
        assert!(!driver.animate_to(0.0, 1000.0, 1000.0, EasingType::CubicInOut));
        driver.frame(0.0);
        driver.frame(100.0);
        assert!(driver.animate_to(40.0, 300.0, 1000.0, EasingType::CubicInOut));
        assert_eq!(driver.target(), Some(300.0));
        assert_eq!(driver.runs_started(), 2);

        let applied = drive(&mut driver, 116.0, &[16.0]);
        assert_eq!(applied[0], 40.0);
        assert_eq!(*applied.last().unwrap(), 300.0);
    }

    #[test]
    fn test_zero_duration_jumps() {
        let mut driver = ScrollDriver::new();
        driver.animate_to(0.0, 640.0, 0.0, EasingType::CubicInOut);
        assert_eq!(driver.frame(1.0), Some(640.0));
        assert!(!driver.is_animating());
    }

    #[test]
    fn test_scroll_up() {
        let mut driver = ScrollDriver::new();
        driver.animate_to(1200.0, 100.0, 300.0, EasingType::CubicInOut);
        let applied = drive(&mut driver, 0.0, &[16.0]);
        assert!(applied.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(*applied.last().unwrap(), 100.0);
    }
}
