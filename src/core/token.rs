// Forward-only token cursor capability consumed by the container decoder.
use crate::core::error::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenKind {
    String,
    Number,
    Bool,
    Null,
    FieldName,
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    End,
}

impl TokenKind {
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Bool => "boolean",
            TokenKind::Null => "null",
            TokenKind::FieldName => "field name",
            TokenKind::StartObject => "start of object",
            TokenKind::EndObject => "end of object",
            TokenKind::StartArray => "start of array",
            TokenKind::EndArray => "end of array",
            TokenKind::End => "end of input",
        }
    }
}

/// Pull-based reader over a hierarchical document.
///
/// Implementations expose the current token and move strictly forward. The
/// decoder borrows a cursor for the duration of one value and leaves it on
/// the token after that value.
pub trait TokenCursor {
    fn kind(&self) -> TokenKind;

    /// Text of the current string, field name, number, or boolean token.
    fn text(&self) -> Option<&str>;

    /// Fails only when the underlying input is malformed.
    fn advance(&mut self) -> Result<(), Error>;

    fn location(&self) -> Option<String> {
        None
    }
}
