use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use glint_core::Key;

use crate::app::{App, Mode};

/// Input action that can be performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    ScrollDown,
    ScrollUp,
    HalfPageDown,
    HalfPageUp,
    JumpToTop,
    JumpToBottom,
    NextLink,         // Tab: select the next scroll link
    ClickLink,        // Enter: click the selected link
    ToggleMenu,       // 'm': click the mobile menu toggle
    ClickLogo,        // 'o': click the logo
    HoverTilt,        // 't': hover the next tilt card
    ToggleHelp,
    /// Delivered to the page as a keydown
    ForwardKey(Key),
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App) -> Action {
    if app.mode == Mode::Help {
        // Any key exits help
        return Action::ToggleHelp;
    }

    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        // Scrolling
        (KeyCode::Char('j'), KeyModifiers::NONE) => Action::ScrollDown,
        (KeyCode::Char('k'), KeyModifiers::NONE) => Action::ScrollUp,
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => Action::HalfPageDown,
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => Action::HalfPageUp,
        (KeyCode::PageDown, _) => Action::HalfPageDown,
        (KeyCode::PageUp, _) => Action::HalfPageUp,
        (KeyCode::Char('g'), KeyModifiers::NONE) => Action::JumpToTop,
        (KeyCode::Char('G'), _) => Action::JumpToBottom,

        // Page interaction
        (KeyCode::Tab, KeyModifiers::NONE) => Action::NextLink,
        (KeyCode::Enter, KeyModifiers::NONE) => Action::ClickLink,
        (KeyCode::Char('m'), KeyModifiers::NONE) => Action::ToggleMenu,
        (KeyCode::Char('o'), KeyModifiers::NONE) => Action::ClickLogo,
        (KeyCode::Char('t'), KeyModifiers::NONE) => Action::HoverTilt,
        (KeyCode::Char('?'), _) => Action::ToggleHelp,

        // Everything else reaches the page
        (KeyCode::Esc, _) => Action::ForwardKey(Key::Escape),
        (KeyCode::Up, _) => Action::ForwardKey(Key::ArrowUp),
        (KeyCode::Down, _) => Action::ForwardKey(Key::ArrowDown),
        (KeyCode::Left, _) => Action::ForwardKey(Key::ArrowLeft),
        (KeyCode::Right, _) => Action::ForwardKey(Key::ArrowRight),
        (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
            Action::ForwardKey(Key::Char(c))
        }

        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::{GlintConfig, VirtualPage};

    fn app() -> App {
        App::new(GlintConfig::default(), VirtualPage::sample().unwrap()).unwrap()
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_navigation_keys() {
        let app = app();
        assert_eq!(handle_key_event(press(KeyCode::Char('j'), KeyModifiers::NONE), &app), Action::ScrollDown);
        assert_eq!(handle_key_event(press(KeyCode::Char('d'), KeyModifiers::CONTROL), &app), Action::HalfPageDown);
        assert_eq!(handle_key_event(press(KeyCode::Char('G'), KeyModifiers::SHIFT), &app), Action::JumpToBottom);
        assert_eq!(handle_key_event(press(KeyCode::Tab, KeyModifiers::NONE), &app), Action::NextLink);
    }

    #[test]
    fn test_unbound_keys_are_forwarded() {
        let app = app();
        assert_eq!(
            handle_key_event(press(KeyCode::Up, KeyModifiers::NONE), &app),
            Action::ForwardKey(Key::ArrowUp)
        );
        assert_eq!(
            handle_key_event(press(KeyCode::Char('b'), KeyModifiers::NONE), &app),
            Action::ForwardKey(Key::Char('b'))
        );
        assert_eq!(
            handle_key_event(press(KeyCode::Esc, KeyModifiers::NONE), &app),
            Action::ForwardKey(Key::Escape)
        );
        assert_eq!(handle_key_event(press(KeyCode::F(5), KeyModifiers::NONE), &app), Action::None);
    }

    #[test]
    fn test_any_key_leaves_help() {
        let mut app = app();
        app.mode = Mode::Help;
        assert_eq!(handle_key_event(press(KeyCode::Char('q'), KeyModifiers::NONE), &app), Action::ToggleHelp);
    }
}
