//! Outbound event records and the emitter that writes them.
//!
//! Every event is a single JSON object on its own line, discriminated by a
//! `type` field. The emitter is shared by the frame loop, the window event
//! handler and the stdin reader thread.

use std::fmt::Display;
use std::io::{self, Write};

use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyState {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButtonName {
    Left,
    Middle,
    Right,
}

/// Modifier keys held during a key or mouse transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    #[serde(rename = "super")]
    pub logo: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutboundEvent {
    Size {
        rows: usize,
        cols: usize,
        col_width: u32,
        row_height: u32,
    },
    Char {
        #[serde(rename = "char")]
        text: String,
    },
    Key {
        key: String,
        state: KeyState,
        #[serde(flatten)]
        modifiers: Modifiers,
    },
    MouseClick {
        button: MouseButtonName,
        state: KeyState,
        col: i32,
        row: i32,
        #[serde(flatten)]
        modifiers: Modifiers,
    },
    MouseMove {
        col: i32,
        row: i32,
    },
    Error {
        error: String,
    },
}

impl OutboundEvent {
    pub fn error(message: impl Display) -> Self {
        OutboundEvent::Error {
            error: message.to_string(),
        }
    }
}

/// Serializes events onto a line-oriented sink.
pub struct EventEmitter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl EventEmitter {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    /// Emitter writing to the process's stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Write one event line and flush.
    ///
    /// A broken sink is logged and otherwise ignored: losing the controller
    /// is noticed through stdin reaching end-of-stream.
    pub fn emit(&self, event: &OutboundEvent) {
        let mut line = match serde_json::to_vec(event) {
            Ok(line) => line,
            Err(e) => {
                log::error!("Failed to serialize event {:?}: {}", event, e);
                return;
            }
        };
        line.push(b'\n');

        let mut out = self.out.lock();
        if let Err(e) = out.write_all(&line).and_then(|()| out.flush()) {
            log::warn!("Failed to write event: {}", e);
        }
    }

    /// Emit an `error` event.
    pub fn error(&self, message: impl Display) {
        let event = OutboundEvent::error(message);
        log::debug!("Reporting error to controller: {:?}", event);
        self.emit(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_value(event: &OutboundEvent) -> serde_json::Value {
        serde_json::to_value(event).unwrap()
    }

    #[test]
    fn test_size_shape() {
        let event = OutboundEvent::Size {
            rows: 20,
            cols: 53,
            col_width: 12,
            row_height: 24,
        };
        assert_eq!(
            to_value(&event),
            json!({"type": "size", "rows": 20, "cols": 53, "colWidth": 12, "rowHeight": 24})
        );
    }

    #[test]
    fn test_key_shape_flattens_modifiers() {
        let event = OutboundEvent::Key {
            key: "a".to_string(),
            state: KeyState::Press,
            modifiers: Modifiers {
                ctrl: true,
                logo: true,
                ..Modifiers::default()
            },
        };
        assert_eq!(
            to_value(&event),
            json!({
                "type": "key", "key": "a", "state": "press",
                "ctrl": true, "shift": false, "alt": false, "super": true
            })
        );
    }

    #[test]
    fn test_mouse_and_char_shapes() {
        let click = OutboundEvent::MouseClick {
            button: MouseButtonName::Middle,
            state: KeyState::Release,
            col: 3,
            row: 4,
            modifiers: Modifiers::default(),
        };
        assert_eq!(to_value(&click)["type"], "mouseClick");
        assert_eq!(to_value(&click)["button"], "middle");
        assert_eq!(to_value(&click)["state"], "release");

        let moved = OutboundEvent::MouseMove { col: -1, row: 0 };
        assert_eq!(to_value(&moved), json!({"type": "mouseMove", "col": -1, "row": 0}));

        let ch = OutboundEvent::Char {
            text: "é".to_string(),
        };
        assert_eq!(to_value(&ch), json!({"type": "char", "char": "é"}));
    }
}
