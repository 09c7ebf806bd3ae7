// Token cursor over a parsed JSON document; every token remembers its JSON pointer.
use serde_json::Value;

use crate::core::error::{Error, ErrorKind};
use crate::core::token::{TokenCursor, TokenKind};
use crate::json::parse;

#[derive(Debug)]
struct Token {
    kind: TokenKind,
    text: Option<String>,
    pointer: String,
}

#[derive(Debug)]
pub struct JsonCursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl JsonCursor {
    pub fn new(value: &Value) -> Self {
        let mut tokens = Vec::new();
        flatten(value, String::new(), &mut tokens);
        Self { tokens, pos: 0 }
    }

    /// Parse `input` as a JSON document and position the cursor on its first token.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let value: Value = parse::from_str(input).map_err(|err| {
            Error::new(ErrorKind::Syntax)
                .with_message("invalid JSON document")
                .with_hint(parse::hint_for_error(&err, "document"))
                .with_source(err)
        })?;
        Ok(Self::new(&value))
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

impl TokenCursor for JsonCursor {
    fn kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::End)
    }

    fn text(&self) -> Option<&str> {
        self.tokens
            .get(self.pos)
            .and_then(|token| token.text.as_deref())
    }

    fn advance(&mut self) -> Result<(), Error> {
        if self.is_exhausted() {
            return Err(Error::new(ErrorKind::Syntax)
                .with_message("cursor advanced past end of input"));
        }
        self.pos += 1;
        Ok(())
    }

    fn location(&self) -> Option<String> {
        let location = match self.tokens.get(self.pos) {
            Some(token) if token.pointer.is_empty() => "(root)".to_string(),
            Some(token) => token.pointer.clone(),
            None => "(end of input)".to_string(),
        };
        Some(location)
    }
}

fn flatten(value: &Value, pointer: String, out: &mut Vec<Token>) {
    match value {
        Value::Null => out.push(scalar(TokenKind::Null, None, pointer)),
        Value::Bool(b) => out.push(scalar(TokenKind::Bool, Some(b.to_string()), pointer)),
        Value::Number(n) => out.push(scalar(TokenKind::Number, Some(n.to_string()), pointer)),
        Value::String(s) => out.push(scalar(TokenKind::String, Some(s.clone()), pointer)),
        Value::Array(items) => {
            out.push(scalar(TokenKind::StartArray, None, pointer.clone()));
            for (idx, item) in items.iter().enumerate() {
                flatten(item, format!("{pointer}/{idx}"), out);
            }
            out.push(scalar(TokenKind::EndArray, None, pointer));
        }
        Value::Object(map) => {
            out.push(scalar(TokenKind::StartObject, None, pointer.clone()));
            for (key, item) in map {
                let child = format!("{pointer}/{}", escape_pointer_segment(key));
                out.push(scalar(TokenKind::FieldName, Some(key.clone()), child.clone()));
                flatten(item, child, out);
            }
            out.push(scalar(TokenKind::EndObject, None, pointer));
        }
    }
}

fn scalar(kind: TokenKind, text: Option<String>, pointer: String) -> Token {
    Token {
        kind,
        text,
        pointer,
    }
}

fn escape_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
