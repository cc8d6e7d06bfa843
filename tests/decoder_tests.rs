//! Decoder behaviour on whole request lines.

mod common;

use common::png_base64;
use gridwin::protocol::{DecodeError, DrawCommand, decode_line};
use gridwin_render::{FontStyle, Rgba, RgbaImage};

#[test]
fn test_char_with_colors_and_style() {
    let line = br#"{"type":"char","char":"Q","col":3,"row":-1,"color":{"r":10,"g":20},"background":{"r":1,"g":2,"b":3,"a":0},"style":"bold"}"#;
    let cmd = decode_line(line).unwrap();
    assert_eq!(
        cmd,
        DrawCommand::SetChar {
            col: 3,
            row: -1,
            ch: 'Q',
            fg: Rgba::opaque(10, 20, 0),
            bg: Rgba::opaque(1, 2, 3),
            style: FontStyle::Bold,
        }
    );
}

#[test]
fn test_unknown_type() {
    let err = decode_line(br#"{"type":"flash","col":0,"row":0}"#).unwrap_err();
    assert!(matches!(err, DecodeError::UnknownCommandType(ref t) if t == "flash"));
}

#[test]
fn test_missing_discriminant() {
    let err = decode_line(br#"{"col":0,"row":0}"#).unwrap_err();
    assert!(matches!(err, DecodeError::MissingDiscriminant));
}

#[test]
fn test_malformed_json() {
    let err = decode_line(br#"{"type":"char","#).unwrap_err();
    assert!(matches!(err, DecodeError::Json(_)));
    assert!(err.to_string().starts_with("could not parse request"));
}

#[test]
fn test_empty_char() {
    let err = decode_line(br#"{"type":"char","char":"","col":0,"row":0}"#).unwrap_err();
    assert!(matches!(err, DecodeError::EmptyChar));
}

#[test]
fn test_invalid_utf8_char() {
    let line = b"{\"type\":\"char\",\"char\":\"\xFF\",\"col\":0,\"row\":0}";
    let err = decode_line(line).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidUtf8));
}

#[test]
fn test_more_than_one_code_point() {
    let err = decode_line(br#"{"type":"char","char":"ab","col":0,"row":0}"#).unwrap_err();
    assert!(matches!(err, DecodeError::TooManyChars(2)));
}

#[test]
fn test_missing_fields_are_named() {
    let err = decode_line(br#"{"type":"char","char":"a","row":0}"#).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::MissingField {
            command: "char",
            field: "col"
        }
    ));

    let err = decode_line(br#"{"type":"image","col":0,"row":0}"#).unwrap_err();
    assert!(matches!(err, DecodeError::MissingField { field: "image", .. }));

    let err = decode_line(br#"{"type":"title"}"#).unwrap_err();
    assert_eq!(err.to_string(), "title request is missing \"title\" field");
}

#[test]
fn test_invalid_style() {
    let err = decode_line(br#"{"type":"char","char":"a","col":0,"row":0,"style":"italic"}"#)
        .unwrap_err();
    assert!(matches!(err, DecodeError::InvalidStyle(ref s) if s == "italic"));
}

#[test]
fn test_image_payload_is_decoded() {
    let source = RgbaImage::from_fn(5, 3, |x, y| image::Rgba([x as u8 * 40, y as u8 * 80, 7, 200]));
    let line = format!(
        r#"{{"type":"image","col":2,"row":1,"image":"{}"}}"#,
        png_base64(&source)
    );

    match decode_line(line.as_bytes()).unwrap() {
        DrawCommand::SetImage { col, row, image } => {
            assert_eq!((col, row), (2, 1));
            assert_eq!(*image, source);
        }
        other => panic!("expected an image command, got {other:?}"),
    }
}

#[test]
fn test_bad_image_payloads() {
    let err = decode_line(br#"{"type":"image","col":0,"row":0,"image":"not base64!"}"#)
        .unwrap_err();
    assert!(matches!(err, DecodeError::ImageDecodeFailed(_)));

    // Valid base64, not an image.
    let err = decode_line(br#"{"type":"image","col":0,"row":0,"image":"aGVsbG8="}"#)
        .unwrap_err();
    assert!(matches!(err, DecodeError::ImageDecodeFailed(_)));
}

#[test]
fn test_simple_commands() {
    assert_eq!(decode_line(br#"{"type":"clear"}"#).unwrap(), DrawCommand::Clear);
    assert_eq!(decode_line(br#"{"type":"close"}"#).unwrap(), DrawCommand::Close);
    assert_eq!(
        decode_line(br#"{"type":"title","title":"hello"}"#).unwrap(),
        DrawCommand::SetTitle {
            title: "hello".to_string()
        }
    );
}
