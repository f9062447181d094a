//! Inline style helpers: number formatting and transform parsing

use std::sync::OnceLock;

use regex::Regex;

pub const TRANSFORM: &str = "transform";
pub const OPACITY: &str = "opacity";
pub const TRANSITION: &str = "transition";
pub const Z_INDEX: &str = "z-index";
pub const OVERFLOW: &str = "overflow";
pub const FILTER: &str = "filter";
pub const BOX_SHADOW: &str = "box-shadow";
pub const TOP: &str = "top";
pub const TRANSFORM_STYLE: &str = "transform-style";
pub const ANIMATION_PLAY_STATE: &str = "animation-play-state";

fn rotate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"rotate\([^)]+\)").expect("static regex"))
}

fn translate_y_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"translateY\(\s*(-?[\d.]+)(px|%)?\s*\)").expect("static regex")
    })
}

/// Format a number the way a browser serializes it in a style string:
/// integers without a fraction, otherwise at most three decimals
pub fn fmt_num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded.fract() == 0.0 {
        return format!("{}", rounded as i64);
    }
    let s = format!("{:.3}", rounded);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn px(value: f64) -> String {
    format!("{}px", fmt_num(value))
}

pub fn deg(value: f64) -> String {
    format!("{}deg", fmt_num(value))
}

pub fn translate_y(value: f64) -> String {
    format!("translateY({})", px(value))
}

/// The first `rotate(...)` component of a transform, if any
pub fn rotate_component(transform: &str) -> Option<&str> {
    rotate_regex().find(transform).map(|m| m.as_str())
}

/// Vertical translation in pixels from a `translateY(...)` component
///
/// Percentages resolve against `height`.
pub fn translate_y_px(transform: &str, height: f64) -> Option<f64> {
    let caps = translate_y_regex().captures(transform)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    match caps.get(2).map(|m| m.as_str()) {
        Some("%") => Some(value / 100.0 * height),
        _ => Some(value),
    }
}

/// Parse an opacity value, defaulting to fully opaque
pub fn opacity_value(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map(|v| v.clamp(0.0, 1.0))
        .unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(0.0), "0");
        assert_eq!(fmt_num(-0.0), "0");
        assert_eq!(fmt_num(50.0), "50");
        assert_eq!(fmt_num(12.5), "12.5");
        assert_eq!(fmt_num(33.333333), "33.333");
        assert_eq!(fmt_num(-7.25), "-7.25");
        assert_eq!(fmt_num(f64::NAN), "0");
    }

    #[test]
    fn test_rotate_component() {
        assert_eq!(
            rotate_component("translateY(12px) rotate(-2deg)"),
            Some("rotate(-2deg)")
        );
        assert_eq!(rotate_component("translateY(12px)"), None);
    }

    #[test]
    fn test_translate_y_px() {
        assert_eq!(translate_y_px("translateY(50px) rotate(5deg)", 80.0), Some(50.0));
        assert_eq!(translate_y_px("translateY(-100%)", 80.0), Some(-80.0));
        assert_eq!(translate_y_px("translateY(0)", 80.0), Some(0.0));
        assert_eq!(translate_y_px("scale(1.1)", 80.0), None);
    }

    #[test]
    fn test_opacity_value() {
        assert_eq!(opacity_value(None), 1.0);
        assert_eq!(opacity_value(Some("0")), 0.0);
        assert_eq!(opacity_value(Some("junk")), 1.0);
    }
}
