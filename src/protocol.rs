//! Inbound wire protocol: one JSON object per line, decoded into a
//! [`DrawCommand`].
//!
//! Decoding is a pure function of the line. Fields are checked in a fixed
//! order so that a line with several problems always reports the same one.

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose;
use gridwin_fonts::FontStyle;
use gridwin_render::{Rgba, RgbaImage};
use serde::Deserialize;
use serde::de::{self, Deserializer, Visitor};
use thiserror::Error;

/// A validated draw command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SetChar {
        col: i32,
        row: i32,
        ch: char,
        fg: Rgba,
        bg: Rgba,
        style: FontStyle,
    },
    /// An image of any size, tiled across cells starting at `(col, row)`.
    SetImage {
        col: i32,
        row: i32,
        image: Arc<RgbaImage>,
    },
    Clear,
    SetTitle {
        title: String,
    },
    Close,
}

impl DrawCommand {
    /// Wire name of the command.
    pub fn kind(&self) -> &'static str {
        match self {
            DrawCommand::SetChar { .. } => "char",
            DrawCommand::SetImage { .. } => "image",
            DrawCommand::Clear => "clear",
            DrawCommand::SetTitle { .. } => "title",
            DrawCommand::Close => "close",
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("could not parse request: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request is missing \"type\" field")]
    MissingDiscriminant,

    #[error("unknown request type {0:?}")]
    UnknownCommandType(String),

    #[error("{command} request is missing {field:?} field")]
    MissingField {
        command: &'static str,
        field: &'static str,
    },

    #[error("char request was sent with empty char")]
    EmptyChar,

    #[error("char request was sent with invalid utf8")]
    InvalidUtf8,

    #[error("char request must contain exactly one character, got {0}")]
    TooManyChars(usize),

    #[error("char request got invalid style: {0:?}")]
    InvalidStyle(String),

    #[error("could not decode image: {0}")]
    ImageDecodeFailed(String),
}

/// Decode one line (without its terminator).
pub fn decode_line(line: &[u8]) -> Result<DrawCommand, DecodeError> {
    let envelope: Envelope = serde_json::from_slice(line)?;
    let kind = envelope.kind.ok_or(DecodeError::MissingDiscriminant)?;

    match kind.as_str() {
        "char" => decode_char(serde_json::from_slice(line)?),
        "image" => decode_image(serde_json::from_slice(line)?),
        "clear" => Ok(DrawCommand::Clear),
        "title" => {
            let request: TitleRequest = serde_json::from_slice(line)?;
            let title = request.title.ok_or(missing("title", "title"))?;
            Ok(DrawCommand::SetTitle { title })
        }
        "close" => Ok(DrawCommand::Close),
        _ => Err(DecodeError::UnknownCommandType(kind)),
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct CharRequest {
    #[serde(rename = "char")]
    text: Option<RawText>,
    col: Option<i32>,
    row: Option<i32>,
    color: Option<WireColor>,
    background: Option<WireColor>,
    style: Option<String>,
}

#[derive(Deserialize)]
struct ImageRequest {
    image: Option<String>,
    col: Option<i32>,
    row: Option<i32>,
}

#[derive(Deserialize)]
struct TitleRequest {
    title: Option<String>,
}

/// `{r, g, b}`; missing channels are 0 and any alpha is ignored.
#[derive(Deserialize, Default)]
#[serde(default)]
struct WireColor {
    r: u8,
    g: u8,
    b: u8,
}

impl From<WireColor> for Rgba {
    fn from(color: WireColor) -> Self {
        Rgba::opaque(color.r, color.g, color.b)
    }
}

/// A JSON string's raw bytes, before UTF-8 validation.
struct RawText(Vec<u8>);

impl<'de> Deserialize<'de> for RawText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawTextVisitor;

        impl Visitor<'_> for RawTextVisitor {
            type Value = RawText;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string")
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<RawText, E> {
                Ok(RawText(v.to_vec()))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RawText, E> {
                Ok(RawText(v.as_bytes().to_vec()))
            }
        }

        deserializer.deserialize_bytes(RawTextVisitor)
    }
}

fn missing(command: &'static str, field: &'static str) -> DecodeError {
    DecodeError::MissingField { command, field }
}

fn decode_char(request: CharRequest) -> Result<DrawCommand, DecodeError> {
    let RawText(bytes) = request.text.ok_or(missing("char", "char"))?;
    let ch = single_char(&bytes)?;
    let col = request.col.ok_or(missing("char", "col"))?;
    let row = request.row.ok_or(missing("char", "row"))?;

    let style = match request.style {
        Some(name) => FontStyle::from_name(&name).ok_or(DecodeError::InvalidStyle(name))?,
        None => FontStyle::Normal,
    };

    Ok(DrawCommand::SetChar {
        col,
        row,
        ch,
        fg: request.color.map_or(Rgba::WHITE, Rgba::from),
        bg: request.background.map_or(Rgba::BLACK, Rgba::from),
        style,
    })
}

fn single_char(bytes: &[u8]) -> Result<char, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyChar);
    }
    let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(DecodeError::TooManyChars(text.chars().count())),
    }
}

fn decode_image(request: ImageRequest) -> Result<DrawCommand, DecodeError> {
    let col = request.col.ok_or(missing("image", "col"))?;
    let row = request.row.ok_or(missing("image", "row"))?;
    let encoded = request.image.ok_or(missing("image", "image"))?;

    let bytes = general_purpose::STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| DecodeError::ImageDecodeFailed(e.to_string()))?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| DecodeError::ImageDecodeFailed(e.to_string()))?
        .to_rgba8();

    Ok(DrawCommand::SetImage {
        col,
        row,
        image: Arc::new(image),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_defaults() {
        let cmd = decode_line(br#"{"type":"char","char":"a","col":1,"row":2}"#).unwrap();
        assert_eq!(
            cmd,
            DrawCommand::SetChar {
                col: 1,
                row: 2,
                ch: 'a',
                fg: Rgba::WHITE,
                bg: Rgba::BLACK,
                style: FontStyle::Normal,
            }
        );
    }

    #[test]
    fn test_char_checks_char_before_position() {
        let err = decode_line(br#"{"type":"char","char":""}"#).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyChar));

        let err = decode_line(br#"{"type":"char","col":1,"row":2}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { field: "char", .. }));
    }

    #[test]
    fn test_escaped_char_is_decoded() {
        let cmd = decode_line(br#"{"type":"char","char":"\u00e9","col":0,"row":0}"#).unwrap();
        assert!(matches!(cmd, DrawCommand::SetChar { ch: 'é', .. }));
    }

    #[test]
    fn test_error_messages() {
        let err = decode_line(br#"{"type":"char","char":"x","col":0}"#).unwrap_err();
        assert_eq!(err.to_string(), "char request is missing \"row\" field");

        let err = decode_line(br#"{"type":"spin"}"#).unwrap_err();
        assert_eq!(err.to_string(), "unknown request type \"spin\"");
    }
}
