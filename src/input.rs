//! Translation of winit input into outbound events.
//!
//! [`InputTracker`] holds the little state the translation needs (cursor
//! position, held modifiers, last reported cell) and is independent of winit
//! so it can be driven directly in tests. The free functions map winit's
//! key and button types onto wire names.

use gridwin_render::CellMetrics;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::{Key, ModifiersState, NamedKey};

use crate::events::{KeyState, Modifiers, MouseButtonName, OutboundEvent};

/// Wire name for a logical key.
///
/// Printable keys use their lowercase text; a fixed table covers the named
/// keys the controller understands; everything else is `unknown`.
pub fn key_name(key: &Key) -> String {
    match key {
        Key::Character(text) => text.to_lowercase(),
        Key::Named(named) => named_key(*named).unwrap_or("unknown").to_string(),
        _ => "unknown".to_string(),
    }
}

fn named_key(key: NamedKey) -> Option<&'static str> {
    let name = match key {
        NamedKey::Control => "ctrl",
        NamedKey::Shift => "shift",
        NamedKey::Alt => "alt",
        NamedKey::Super | NamedKey::Meta => "super",
        NamedKey::Tab => "tab",
        NamedKey::Enter => "enter",
        NamedKey::Space => "space",
        NamedKey::Backspace => "backspace",
        NamedKey::Escape => "escape",
        NamedKey::ArrowLeft => "left",
        NamedKey::ArrowRight => "right",
        NamedKey::ArrowUp => "up",
        NamedKey::ArrowDown => "down",
        NamedKey::CapsLock => "capsLock",
        NamedKey::Delete => "delete",
        NamedKey::Insert => "insert",
        NamedKey::Home => "home",
        NamedKey::PageUp => "pageUp",
        NamedKey::PageDown => "pageDown",
        NamedKey::End => "end",
        NamedKey::NumLock => "numLock",
        NamedKey::F1 => "f1",
        NamedKey::F2 => "f2",
        NamedKey::F3 => "f3",
        NamedKey::F4 => "f4",
        NamedKey::F5 => "f5",
        NamedKey::F6 => "f6",
        NamedKey::F7 => "f7",
        NamedKey::F8 => "f8",
        NamedKey::F9 => "f9",
        NamedKey::F10 => "f10",
        NamedKey::F11 => "f11",
        NamedKey::F12 => "f12",
        NamedKey::F13 => "f13",
        NamedKey::F14 => "f14",
        NamedKey::F15 => "f15",
        NamedKey::F16 => "f16",
        NamedKey::F17 => "f17",
        NamedKey::F18 => "f18",
        NamedKey::F19 => "f19",
        NamedKey::F20 => "f20",
        NamedKey::F21 => "f21",
        NamedKey::F22 => "f22",
        NamedKey::F23 => "f23",
        NamedKey::F24 => "f24",
        NamedKey::F25 => "f25",
        _ => return None,
    };
    Some(name)
}

pub fn key_state(state: ElementState) -> KeyState {
    match state {
        ElementState::Pressed => KeyState::Press,
        ElementState::Released => KeyState::Release,
    }
}

/// Buttons other than left/middle/right are not reported.
pub fn mouse_button(button: MouseButton) -> Option<MouseButtonName> {
    match button {
        MouseButton::Left => Some(MouseButtonName::Left),
        MouseButton::Middle => Some(MouseButtonName::Middle),
        MouseButton::Right => Some(MouseButtonName::Right),
        _ => None,
    }
}

pub fn modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        ctrl: state.control_key(),
        shift: state.shift_key(),
        alt: state.alt_key(),
        logo: state.super_key(),
    }
}

/// `char` events for committed text. Control characters (enter, tab,
/// backspace, ctrl chords) are reported only as `key` events.
pub fn text_events(text: &str) -> impl Iterator<Item = OutboundEvent> + '_ {
    text.chars()
        .filter(|ch| !ch.is_control())
        .map(|ch| OutboundEvent::Char {
            text: ch.to_string(),
        })
}

#[derive(Debug, Clone)]
pub struct InputTracker {
    metrics: CellMetrics,
    cursor: (f64, f64),
    modifiers: Modifiers,
    /// Cell of the last `mouseMove`; `None` until the first move
    mouse_cell: Option<(i32, i32)>,
}

impl InputTracker {
    pub fn new(metrics: CellMetrics) -> Self {
        Self {
            metrics,
            cursor: (0.0, 0.0),
            modifiers: Modifiers::default(),
            mouse_cell: None,
        }
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// A key transition. Auto-repeat is not a transition and yields nothing.
    pub fn key(&self, key: &Key, state: ElementState, repeat: bool) -> Option<OutboundEvent> {
        if repeat {
            return None;
        }
        Some(OutboundEvent::Key {
            key: key_name(key),
            state: key_state(state),
            modifiers: self.modifiers,
        })
    }

    /// Cursor moved to pixel `(x, y)`. Reports only when the cell changes.
    pub fn cursor_moved(&mut self, x: f64, y: f64) -> Option<OutboundEvent> {
        self.cursor = (x, y);
        let cell = self.metrics.cell_at(x, y);
        if self.mouse_cell == Some(cell) {
            return None;
        }
        self.mouse_cell = Some(cell);
        Some(OutboundEvent::MouseMove {
            col: cell.0,
            row: cell.1,
        })
    }

    /// A button transition at the last known cursor position.
    pub fn mouse_click(&self, button: MouseButton, state: ElementState) -> Option<OutboundEvent> {
        let button = mouse_button(button)?;
        let (col, row) = self.metrics.cell_at(self.cursor.0, self.cursor.1);
        Some(OutboundEvent::MouseClick {
            button,
            state: key_state(state),
            col,
            row,
            modifiers: self.modifiers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::SmolStr;

    #[test]
    fn test_key_names() {
        assert_eq!(key_name(&Key::Character(SmolStr::new("A"))), "a");
        assert_eq!(key_name(&Key::Named(NamedKey::ArrowUp)), "up");
        assert_eq!(key_name(&Key::Named(NamedKey::CapsLock)), "capsLock");
        assert_eq!(key_name(&Key::Named(NamedKey::F25)), "f25");
        assert_eq!(key_name(&Key::Named(NamedKey::F30)), "unknown");
        assert_eq!(key_name(&Key::Named(NamedKey::MediaPlay)), "unknown");
    }

    #[test]
    fn test_repeat_is_not_reported() {
        let tracker = InputTracker::new(CellMetrics::new(12, 24));
        let key = Key::Named(NamedKey::Enter);
        assert!(tracker.key(&key, ElementState::Pressed, true).is_none());
        assert!(tracker.key(&key, ElementState::Pressed, false).is_some());
    }

    #[test]
    fn test_text_events_skip_control() {
        let events: Vec<_> = text_events("a\r\tb").collect();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            OutboundEvent::Char {
                text: "b".to_string()
            }
        );
    }

    #[test]
    fn test_mouse_move_dedups_by_cell() {
        let mut tracker = InputTracker::new(CellMetrics::new(10, 20));
        assert_eq!(
            tracker.cursor_moved(5.0, 5.0),
            Some(OutboundEvent::MouseMove { col: 0, row: 0 })
        );
        assert_eq!(tracker.cursor_moved(9.0, 19.0), None);
        assert_eq!(
            tracker.cursor_moved(10.0, 19.0),
            Some(OutboundEvent::MouseMove { col: 1, row: 0 })
        );
    }

    #[test]
    fn test_click_uses_cursor_cell_and_modifiers() {
        let mut tracker = InputTracker::new(CellMetrics::new(10, 20));
        tracker.cursor_moved(35.0, 45.0);
        tracker.set_modifiers(Modifiers {
            shift: true,
            ..Modifiers::default()
        });

        let event = tracker
            .mouse_click(MouseButton::Right, ElementState::Pressed)
            .unwrap();
        assert_eq!(
            event,
            OutboundEvent::MouseClick {
                button: MouseButtonName::Right,
                state: KeyState::Press,
                col: 3,
                row: 2,
                modifiers: Modifiers {
                    shift: true,
                    ..Modifiers::default()
                },
            }
        );
        assert!(tracker.mouse_click(MouseButton::Back, ElementState::Pressed).is_none());
    }
}
