//! Purpose: JSON boundary for container decoding.
//! Exports: `JsonCursor`, `decode_str`, `decode_value`, and the `parse` helpers.
//! Role: Adapts parsed JSON documents to the token cursor the decoder consumes.
//! Invariants: Parse failures are reported as `ErrorKind::Syntax` with a categorized hint.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

mod container;
pub mod cursor;
pub mod parse;

use serde_json::Value;

use crate::core::container::TextContainer;
use crate::core::decode::Decoder;
use crate::core::error::Error;

pub use cursor::JsonCursor;

pub fn decode_value(value: &Value) -> Result<TextContainer, Error> {
    Decoder::default().decode(&mut JsonCursor::new(value))
}

pub fn decode_str(input: &str) -> Result<TextContainer, Error> {
    Decoder::default().decode(&mut JsonCursor::parse(input)?)
}
