//! Host input events fed to `Choreographer::dispatch`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::motion::Millis;
use crate::page::ElementId;

/// A keyboard key, named the way `KeyboardEvent.key` reports it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    Enter,
    Tab,
    Char(char),
    Other(String),
}

impl Key {
    /// Letter keys compare case-insensitively, like `keyCode`
    pub fn normalized(&self) -> Key {
        match self {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other.clone(),
        }
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "" => return Err("empty key name".to_string()),
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            "Escape" | "Esc" => Key::Escape,
            "Enter" => Key::Enter,
            "Tab" => Key::Tab,
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other(s.to_string()),
                }
            }
        };
        Ok(key)
    }
}

impl TryFrom<String> for Key {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::ArrowUp => write!(f, "ArrowUp"),
            Key::ArrowDown => write!(f, "ArrowDown"),
            Key::ArrowLeft => write!(f, "ArrowLeft"),
            Key::ArrowRight => write!(f, "ArrowRight"),
            Key::Escape => write!(f, "Escape"),
            Key::Enter => write!(f, "Enter"),
            Key::Tab => write!(f, "Tab"),
            Key::Char(c) => write!(f, "{}", c),
            Key::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Everything a host can report to the engine
///
/// Pointer coordinates are viewport-relative (`clientX`/`clientY`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Scroll,
    Click { target: ElementId },
    MouseEnter { target: ElementId },
    MouseMove { target: ElementId, x: f64, y: f64 },
    MouseLeave { target: ElementId },
    TouchStart { target: ElementId },
    TouchEnd { target: ElementId },
    KeyDown { key: Key },
    Resize,
    VisibilityChange { hidden: bool },
    /// Window load; `load_ms` is the navigation's load duration if known
    Load { load_ms: Option<Millis> },
    Focus { target: ElementId },
    Blur { target: ElementId },
    /// A preload requested through `Page::preload_image` finished
    ImageLoaded { target: ElementId },
}

impl InputEvent {
    pub fn name(&self) -> &'static str {
        match self {
            InputEvent::Scroll => "scroll",
            InputEvent::Click { .. } => "click",
            InputEvent::MouseEnter { .. } => "mouseenter",
            InputEvent::MouseMove { .. } => "mousemove",
            InputEvent::MouseLeave { .. } => "mouseleave",
            InputEvent::TouchStart { .. } => "touchstart",
            InputEvent::TouchEnd { .. } => "touchend",
            InputEvent::KeyDown { .. } => "keydown",
            InputEvent::Resize => "resize",
            InputEvent::VisibilityChange { .. } => "visibilitychange",
            InputEvent::Load { .. } => "load",
            InputEvent::Focus { .. } => "focus",
            InputEvent::Blur { .. } => "blur",
            InputEvent::ImageLoaded { .. } => "imageload",
        }
    }

    pub fn target(&self) -> Option<ElementId> {
        match self {
            InputEvent::Click { target }
            | InputEvent::MouseEnter { target }
            | InputEvent::MouseMove { target, .. }
            | InputEvent::MouseLeave { target }
            | InputEvent::TouchStart { target }
            | InputEvent::TouchEnd { target }
            | InputEvent::Focus { target }
            | InputEvent::Blur { target }
            | InputEvent::ImageLoaded { target } => Some(*target),
            _ => None,
        }
    }
}

/// What the host should do with the native event after dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl Outcome {
    pub fn merge(&mut self, other: Outcome) {
        self.prevent_default |= other.prevent_default;
        self.stop_propagation |= other.stop_propagation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parse() {
        assert_eq!("ArrowUp".parse::<Key>().unwrap(), Key::ArrowUp);
        assert_eq!("Esc".parse::<Key>().unwrap(), Key::Escape);
        assert_eq!("b".parse::<Key>().unwrap(), Key::Char('b'));
        assert_eq!("F5".parse::<Key>().unwrap(), Key::Other("F5".to_string()));
        assert!("".parse::<Key>().is_err());
    }

    #[test]
    fn test_key_normalized() {
        assert_eq!(Key::Char('B').normalized(), Key::Char('b'));
        assert_eq!(Key::ArrowLeft.normalized(), Key::ArrowLeft);
    }

    #[test]
    fn test_event_json_shape() {
        let event = InputEvent::KeyDown { key: Key::ArrowDown };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"key_down","key":"ArrowDown"}"#);

        let parsed: InputEvent =
            serde_json::from_str(r#"{"type":"click","target":3}"#).unwrap();
        assert_eq!(parsed, InputEvent::Click { target: ElementId(3) });
        assert_eq!(parsed.target(), Some(ElementId(3)));
    }

    #[test]
    fn test_outcome_merge() {
        let mut outcome = Outcome::default();
        outcome.merge(Outcome {
            prevent_default: true,
            stop_propagation: false,
        });
        assert!(outcome.prevent_default);
        assert!(!outcome.stop_propagation);
    }
}
