//! L4 Atomic Layer: Pure easing functions for page animations
//!
//! Provides mathematical easing functions that map progress [0, 1] to output
//! [0, 1], plus the classic four-argument `(t, b, c, d)` form used by the
//! scroll driver.

use serde::{Deserialize, Serialize};

/// Easing curve selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Jump to the end on the last frame
    None,
    Linear,
    /// Symmetric cubic ease-in-out
    #[default]
    CubicInOut,
    /// Cubic ease-out
    Cubic,
    /// Quintic ease-out
    Quintic,
    /// Exponential ease-out
    EaseOut,
}

impl EasingType {
    pub const ALL: [EasingType; 6] = [
        EasingType::None,
        EasingType::Linear,
        EasingType::CubicInOut,
        EasingType::Cubic,
        EasingType::Quintic,
        EasingType::EaseOut,
    ];

    /// Apply the easing function to a progress value
    ///
    /// # Arguments
    /// * `t` - Progress value in range [0, 1]
    ///
    /// # Returns
    /// Eased value in range [0, 1]; `apply(1.0)` is exactly 1.0 for every curve
    #[inline]
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::None => if t < 1.0 { 0.0 } else { 1.0 },
            EasingType::Linear => t,
            EasingType::CubicInOut => cubic_in_out(t),
            EasingType::Cubic => cubic_ease_out(t),
            EasingType::Quintic => quintic_ease_out(t),
            EasingType::EaseOut => exponential_ease_out(t),
        }
    }

    /// Evaluate the curve in `(t, b, c, d)` form: elapsed time, start value,
    /// change in value, duration
    #[inline]
    pub fn ease(&self, t: f64, b: f64, c: f64, d: f64) -> f64 {
        if d <= 0.0 || t >= d {
            return b + c;
        }
        b + c * self.apply(t / d)
    }

    pub fn name(&self) -> &'static str {
        match self {
            EasingType::None => "none",
            EasingType::Linear => "linear",
            EasingType::CubicInOut => "cubic_in_out",
            EasingType::Cubic => "cubic",
            EasingType::Quintic => "quintic",
            EasingType::EaseOut => "ease_out",
        }
    }
}

impl std::str::FromStr for EasingType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        EasingType::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| crate::Error::Config(format!("unknown easing '{}'", s)))
    }
}

/// Symmetric cubic ease-in-out in `(t, b, c, d)` form
///
/// The first half accelerates with cubic growth from `b`, the second half
/// decelerates symmetrically to `b + c`. `t` is clamped to `[0, d]`.
#[inline]
pub fn ease_in_out_cubic(t: f64, b: f64, c: f64, d: f64) -> f64 {
    if d <= 0.0 {
        return b + c;
    }
    let t = t.clamp(0.0, d);
    if t >= d {
        return b + c;
    }
    let t = t / (d / 2.0);
    if t < 1.0 {
        c / 2.0 * t * t * t + b
    } else {
        let t = t - 2.0;
        c / 2.0 * (t * t * t + 2.0) + b
    }
}

/// Cubic in-out on normalized progress
#[inline]
fn cubic_in_out(t: f64) -> f64 {
    ease_in_out_cubic(t, 0.0, 1.0, 1.0)
}

/// Cubic ease-out: f(t) = 1 - (1-t)³
#[inline]
fn cubic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

/// Quintic ease-out: f(t) = 1 - (1-t)⁵
#[inline]
fn quintic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv * inv * inv
}

/// Exponential ease-out: f(t) = 1 - 2^(-10t)
#[inline]
fn exponential_ease_out(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2.0_f64.powf(-10.0 * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cubic_endpoints_exact() {
        for (b, c, d) in [(0.0, 1000.0, 1000.0), (250.0, -250.0, 600.0), (37.5, 12.25, 16.0)] {
            assert_eq!(ease_in_out_cubic(0.0, b, c, d), b);
            assert_eq!(ease_in_out_cubic(d, b, c, d), b + c);
        }
    }

    #[test]
    fn test_cubic_continuous_at_midpoint() {
        let (b, c, d) = (100.0, 800.0, 1000.0);
        let mid = ease_in_out_cubic(d / 2.0, b, c, d);
        assert!((mid - (b + c / 2.0)).abs() < 1e-9);

        let eps = 1e-6;
        let left = ease_in_out_cubic(d / 2.0 - eps, b, c, d);
        let right = ease_in_out_cubic(d / 2.0 + eps, b, c, d);
        assert!((left - mid).abs() < 1e-3);
        assert!((right - mid).abs() < 1e-3);
    }

    #[test]
    fn test_cubic_monotonic_both_directions() {
        for c in [900.0, -900.0] {
            let mut prev = ease_in_out_cubic(0.0, 0.0, c, 1000.0);
            for i in 1..=1000 {
                let v = ease_in_out_cubic(i as f64, 0.0, c, 1000.0);
                if c > 0.0 {
                    assert!(v >= prev, "not increasing at t={}", i);
                } else {
                    assert!(v <= prev, "not decreasing at t={}", i);
                }
                prev = v;
            }
        }
    }

    #[test]
    fn test_cubic_clamps_outside_range() {
        assert_eq!(ease_in_out_cubic(-50.0, 10.0, 90.0, 100.0), 10.0);
        assert_eq!(ease_in_out_cubic(250.0, 10.0, 90.0, 100.0), 100.0);
        assert_eq!(ease_in_out_cubic(5.0, 10.0, 90.0, 0.0), 100.0);
    }

    #[test]
    fn test_easing_boundaries() {
        for easing in EasingType::ALL {
            if easing != EasingType::None {
                assert!(easing.apply(0.0).abs() < 0.001, "{:?} at t=0", easing);
            }
            assert_eq!(easing.apply(1.0), 1.0, "{:?} at t=1", easing);
        }
    }

    #[test]
    fn test_easing_monotonic() {
        for easing in EasingType::ALL {
            let mut prev = 0.0;
            for i in 0..=20 {
                let t = i as f64 / 20.0;
                let v = easing.apply(t);
                assert!(v >= prev, "{:?} not monotonic at t={}", easing, t);
                prev = v;
            }
        }
    }

    #[test]
    fn test_four_arg_form_matches_cubic() {
        let e = EasingType::CubicInOut;
        for t in [0.0, 120.0, 499.0, 500.0, 731.0, 1000.0] {
            let a = e.ease(t, 0.0, 1000.0, 1000.0);
            let b = ease_in_out_cubic(t, 0.0, 1000.0, 1000.0);
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_parse_names() {
        for easing in EasingType::ALL {
            assert_eq!(easing.name().parse::<EasingType>().unwrap(), easing);
        }
        assert!("bounce".parse::<EasingType>().is_err());
    }
}
