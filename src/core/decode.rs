//! Purpose: Decode one configuration node into a `TextContainer` by walking a token cursor.
//! Exports: `Decoder`, `decode`.
//! Role: Shape-driven state machine; `"op": "text"` and `"op": {"with": .., "vars": {..}}` share one keyword.
//! Invariants: The cursor ends on the token right after the decoded value; no partial container escapes.
//! Invariants: Operation names are aliased only in template-variable position, never at the top level.
//! Invariants: Only the first template record of a sequence is used; the rest are skipped.

use std::collections::BTreeMap;

use crate::core::alias::AliasTable;
use crate::core::container::TextContainer;
use crate::core::error::{Error, ErrorKind};
use crate::core::token::{TokenCursor, TokenKind};

const WITH_FIELD: &str = "with";
const VARS_FIELD: &str = "vars";

#[derive(Clone, Debug)]
pub struct Decoder {
    aliases: AliasTable,
}

enum State {
    ExpectValueOrObject,
    ExpectFieldName,
    ExpectOperationValue(String),
    ExpectTemplateObject(String),
    ExpectEndObject(TextContainer),
}

struct TemplateRecord {
    with: String,
    vars: BTreeMap<String, TextContainer>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(AliasTable::standard())
    }
}

/// Decode with the standard alias table.
pub fn decode<C: TokenCursor + ?Sized>(cursor: &mut C) -> Result<TextContainer, Error> {
    Decoder::default().decode(cursor)
}

impl Decoder {
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    pub fn decode<C: TokenCursor + ?Sized>(&self, cursor: &mut C) -> Result<TextContainer, Error> {
        let mut state = State::ExpectValueOrObject;
        loop {
            state = match state {
                State::ExpectValueOrObject => match cursor.kind() {
                    TokenKind::String => {
                        let text = trimmed_text(cursor)?;
                        cursor.advance()?;
                        return Ok(TextContainer::raw(text));
                    }
                    TokenKind::StartObject => {
                        cursor.advance()?;
                        State::ExpectFieldName
                    }
                    other => {
                        return Err(malformed(
                            cursor,
                            format!("expected a string or an object, found {}", other.describe()),
                        ));
                    }
                },
                State::ExpectFieldName => {
                    if cursor.kind() != TokenKind::FieldName {
                        return Err(malformed(
                            cursor,
                            format!(
                                "expected an operation name, found {}",
                                cursor.kind().describe()
                            ),
                        ));
                    }
                    let operation = trimmed_text(cursor)?;
                    cursor.advance()?;
                    State::ExpectOperationValue(operation)
                }
                State::ExpectOperationValue(operation) => match cursor.kind() {
                    TokenKind::String => {
                        let text = trimmed_text(cursor)?;
                        cursor.advance()?;
                        State::ExpectEndObject(TextContainer::operation(operation, text))
                    }
                    TokenKind::StartObject | TokenKind::StartArray
                        if TextContainer::is_for_template(&operation) =>
                    {
                        State::ExpectTemplateObject(operation)
                    }
                    other => {
                        return Err(unsupported(
                            cursor,
                            format!(
                                "operation `{operation}` does not accept a {}",
                                other.describe()
                            ),
                        ));
                    }
                },
                State::ExpectTemplateObject(operation) => {
                    let record = self.first_template_record(cursor)?;
                    let vars: BTreeMap<_, _> = record
                        .vars
                        .into_iter()
                        .map(|(name, container)| (name, self.aliases.normalize(container)))
                        .collect();
                    tracing::debug!(operation = %operation, vars = vars.len(), "decoded template");
                    State::ExpectEndObject(TextContainer::template(operation, record.with, vars))
                }
                State::ExpectEndObject(container) => match cursor.kind() {
                    TokenKind::EndObject => {
                        cursor.advance()?;
                        return Ok(container);
                    }
                    TokenKind::FieldName => {
                        return Err(malformed(cursor, "a container declares exactly one operation")
                            .with_hint("Move additional operations into template vars."));
                    }
                    other => {
                        return Err(malformed(
                            cursor,
                            format!("expected end of object, found {}", other.describe()),
                        ));
                    }
                },
            };
        }
    }

    fn first_template_record<C: TokenCursor + ?Sized>(
        &self,
        cursor: &mut C,
    ) -> Result<TemplateRecord, Error> {
        if cursor.kind() == TokenKind::StartObject {
            return self.template_record(cursor);
        }

        cursor.advance()?;
        if cursor.kind() == TokenKind::EndArray {
            return Err(malformed(cursor, "template record sequence is empty"));
        }
        let first = self.template_record(cursor)?;
        let mut discarded = 0usize;
        while cursor.kind() != TokenKind::EndArray {
            skip_value(cursor)?;
            discarded += 1;
        }
        cursor.advance()?;
        if discarded > 0 {
            tracing::debug!(discarded, "ignored template records after the first");
        }
        Ok(first)
    }

    fn template_record<C: TokenCursor + ?Sized>(
        &self,
        cursor: &mut C,
    ) -> Result<TemplateRecord, Error> {
        if cursor.kind() != TokenKind::StartObject {
            return Err(unsupported(
                cursor,
                format!("template record must be an object, found {}", cursor.kind().describe()),
            ));
        }
        cursor.advance()?;

        let mut with = None;
        let mut vars = BTreeMap::new();
        loop {
            match cursor.kind() {
                TokenKind::FieldName => {
                    let field = current_text(cursor)?.to_string();
                    cursor.advance()?;
                    match field.as_str() {
                        WITH_FIELD => {
                            if cursor.kind() != TokenKind::String {
                                return Err(unsupported(
                                    cursor,
                                    format!(
                                        "template `with` must be a string, found {}",
                                        cursor.kind().describe()
                                    ),
                                ));
                            }
                            with = Some(current_text(cursor)?.to_string());
                            cursor.advance()?;
                        }
                        VARS_FIELD => vars = self.template_vars(cursor)?,
                        _ => {
                            return Err(malformed(
                                cursor,
                                format!("unknown template field `{field}`"),
                            )
                            .with_hint("Template records accept only `with` and `vars`."));
                        }
                    }
                }
                TokenKind::EndObject => {
                    cursor.advance()?;
                    break;
                }
                other => {
                    return Err(malformed(
                        cursor,
                        format!("expected a template field, found {}", other.describe()),
                    ));
                }
            }
        }

        let Some(with) = with else {
            return Err(malformed(cursor, "template record is missing `with`"));
        };
        Ok(TemplateRecord { with, vars })
    }

    fn template_vars<C: TokenCursor + ?Sized>(
        &self,
        cursor: &mut C,
    ) -> Result<BTreeMap<String, TextContainer>, Error> {
        if cursor.kind() != TokenKind::StartObject {
            return Err(unsupported(
                cursor,
                format!("template `vars` must be an object, found {}", cursor.kind().describe()),
            ));
        }
        cursor.advance()?;

        let mut vars = BTreeMap::new();
        loop {
            match cursor.kind() {
                TokenKind::FieldName => {
                    let name = trimmed_text(cursor)?;
                    cursor.advance()?;
                    let container = self.decode(cursor)?;
                    vars.insert(name, container);
                }
                TokenKind::EndObject => {
                    cursor.advance()?;
                    return Ok(vars);
                }
                other => {
                    return Err(malformed(
                        cursor,
                        format!("expected a variable name, found {}", other.describe()),
                    ));
                }
            }
        }
    }
}

/// Step over one complete value (scalar, object, or array).
fn skip_value<C: TokenCursor + ?Sized>(cursor: &mut C) -> Result<(), Error> {
    let mut depth = 0usize;
    loop {
        match cursor.kind() {
            TokenKind::StartObject | TokenKind::StartArray => depth += 1,
            TokenKind::EndObject | TokenKind::EndArray => {
                if depth == 0 {
                    return Err(malformed(cursor, "expected a value"));
                }
                depth -= 1;
            }
            TokenKind::FieldName if depth == 0 => {
                return Err(malformed(cursor, "expected a value, found field name"));
            }
            TokenKind::End => {
                return Err(annotate(
                    Error::new(ErrorKind::Syntax).with_message("unexpected end of input"),
                    cursor,
                ));
            }
            _ => {}
        }
        cursor.advance()?;
        if depth == 0 {
            return Ok(());
        }
    }
}

fn current_text<C: TokenCursor + ?Sized>(cursor: &C) -> Result<&str, Error> {
    cursor.text().ok_or_else(|| {
        annotate(
            Error::new(ErrorKind::Internal).with_message(format!(
                "cursor returned no text for {}",
                cursor.kind().describe()
            )),
            cursor,
        )
    })
}

fn trimmed_text<C: TokenCursor + ?Sized>(cursor: &C) -> Result<String, Error> {
    current_text(cursor).map(|text| text.trim().to_string())
}

fn malformed<C: TokenCursor + ?Sized>(cursor: &C, message: impl Into<String>) -> Error {
    annotate(
        Error::new(ErrorKind::MalformedContainer).with_message(message),
        cursor,
    )
}

fn unsupported<C: TokenCursor + ?Sized>(cursor: &C, message: impl Into<String>) -> Error {
    annotate(
        Error::new(ErrorKind::UnsupportedShape).with_message(message),
        cursor,
    )
}

fn annotate<C: TokenCursor + ?Sized>(err: Error, cursor: &C) -> Error {
    match cursor.location() {
        Some(location) => err.with_location(location),
        None => err,
    }
}

#[cfg(test)]
mod tests {
    use super::{Decoder, decode};
    use crate::core::alias::AliasTable;
    use crate::core::container::TextContainer;
    use crate::core::error::{Error, ErrorKind};
    use crate::core::token::{TokenCursor, TokenKind};
    use std::collections::BTreeMap;

    struct FakeCursor {
        tokens: Vec<(TokenKind, Option<&'static str>)>,
        pos: usize,
    }

    impl FakeCursor {
        fn new(tokens: Vec<(TokenKind, Option<&'static str>)>) -> Self {
            Self { tokens, pos: 0 }
        }
    }

    impl TokenCursor for FakeCursor {
        fn kind(&self) -> TokenKind {
            self.tokens
                .get(self.pos)
                .map(|(kind, _)| *kind)
                .unwrap_or(TokenKind::End)
        }

        fn text(&self) -> Option<&str> {
            self.tokens.get(self.pos).and_then(|(_, text)| *text)
        }

        fn advance(&mut self) -> Result<(), Error> {
            if self.pos >= self.tokens.len() {
                return Err(Error::new(ErrorKind::Syntax).with_message("advanced past end"));
            }
            self.pos += 1;
            Ok(())
        }
    }

    fn s(text: &'static str) -> (TokenKind, Option<&'static str>) {
        (TokenKind::String, Some(text))
    }

    fn f(name: &'static str) -> (TokenKind, Option<&'static str>) {
        (TokenKind::FieldName, Some(name))
    }

    fn n(text: &'static str) -> (TokenKind, Option<&'static str>) {
        (TokenKind::Number, Some(text))
    }

    const SO: (TokenKind, Option<&str>) = (TokenKind::StartObject, None);
    const EO: (TokenKind, Option<&str>) = (TokenKind::EndObject, None);
    const SA: (TokenKind, Option<&str>) = (TokenKind::StartArray, None);
    const EA: (TokenKind, Option<&str>) = (TokenKind::EndArray, None);

    fn decode_tokens(
        tokens: Vec<(TokenKind, Option<&'static str>)>,
    ) -> Result<TextContainer, Error> {
        let mut cursor = FakeCursor::new(tokens);
        decode(&mut cursor)
    }

    #[test]
    fn scalar_decodes_to_trimmed_raw_text() {
        let mut cursor = FakeCursor::new(vec![s("  hello ")]);
        let container = decode(&mut cursor).expect("decode");
        assert_eq!(container, TextContainer::raw("hello"));
        assert_eq!(container.operation_name(), None);
        assert!(container.vars().is_none());
        assert_eq!(cursor.kind(), TokenKind::End);
    }

    #[test]
    fn short_form_operation_keeps_text() {
        let container =
            decode_tokens(vec![SO, f("template"), s("Hi ${name}"), EO]).expect("decode");
        assert_eq!(container, TextContainer::operation("template", "Hi ${name}"));
        assert!(!container.has_vars());
    }

    #[test]
    fn operation_name_and_text_are_trimmed() {
        let container =
            decode_tokens(vec![SO, f(" file "), s(" body.json\n"), EO]).expect("decode");
        assert_eq!(container, TextContainer::operation("file", "body.json"));
    }

    #[test]
    fn unknown_operation_names_are_passed_through() {
        let container = decode_tokens(vec![SO, f("custom_op"), s("x"), EO]).expect("decode");
        assert_eq!(container.operation_name(), Some("custom_op"));
    }

    #[test]
    fn rich_template_decodes_vars() {
        let container = decode_tokens(vec![
            SO,
            f("template"),
            SO,
            f("with"),
            s("Hi ${name}"),
            f("vars"),
            SO,
            f("name"),
            s("World"),
            EO,
            EO,
            EO,
        ])
        .expect("decode");

        let mut vars = BTreeMap::new();
        vars.insert("name".to_string(), TextContainer::raw("World"));
        assert_eq!(
            container,
            TextContainer::template("template", "Hi ${name}", vars)
        );
    }

    #[test]
    fn template_fields_may_come_in_any_order_and_vars_are_optional() {
        let reordered = decode_tokens(vec![
            SO,
            f("template"),
            SO,
            f("vars"),
            SO,
            f("a"),
            s("1"),
            EO,
            f("with"),
            s("${a}"),
            EO,
            EO,
        ])
        .expect("decode");
        assert_eq!(reordered.text(), "${a}");
        assert_eq!(reordered.var("a"), Some(&TextContainer::raw("1")));

        let bare = decode_tokens(vec![SO, f("template"), SO, f("with"), s("plain"), EO, EO])
            .expect("decode");
        assert_eq!(bare, TextContainer::operation("template", "plain"));
    }

    #[test]
    fn template_vars_are_aliased() {
        let container = decode_tokens(vec![
            SO,
            f("template"),
            SO,
            f("with"),
            s("${id} ${other}"),
            f("vars"),
            SO,
            f("id"),
            SO,
            f("json_paths"),
            s("$.id"),
            EO,
            f("other"),
            SO,
            f("custom_op"),
            s("payload"),
            EO,
            EO,
            EO,
            EO,
        ])
        .expect("decode");

        assert_eq!(
            container.var("id"),
            Some(&TextContainer::operation("jsonPaths", "$.id"))
        );
        assert_eq!(
            container.var("other"),
            Some(&TextContainer::operation("custom_op", "payload"))
        );
    }

    #[test]
    fn top_level_operation_is_never_aliased() {
        let container = decode_tokens(vec![SO, f("json_paths"), s("$.id"), EO]).expect("decode");
        assert_eq!(container.operation_name(), Some("json_paths"));
    }

    #[test]
    fn nested_templates_alias_each_level_once() {
        let container = decode_tokens(vec![
            SO,
            f("template"),
            SO,
            f("with"),
            s("${greeting}"),
            f("vars"),
            SO,
            f("greeting"),
            SO,
            f("template"),
            SO,
            f("with"),
            s("Hi ${id}"),
            f("vars"),
            SO,
            f("id"),
            SO,
            f("json_paths"),
            s("$.id"),
            EO,
            EO,
            EO,
            EO,
            EO,
            EO,
            EO,
        ])
        .expect("decode");

        let greeting = container.var("greeting").expect("greeting var");
        assert_eq!(greeting.operation_name(), Some("template"));
        assert_eq!(
            greeting.var("id"),
            Some(&TextContainer::operation("jsonPaths", "$.id"))
        );
    }

    #[test]
    fn injected_alias_table_is_used_for_vars() {
        let decoder = Decoder::new(AliasTable::empty().with_alias("file_path", "file"));
        let mut cursor = FakeCursor::new(vec![
            SO,
            f("template"),
            SO,
            f("with"),
            s("${a}${b}"),
            f("vars"),
            SO,
            f("a"),
            SO,
            f("file_path"),
            s("a.txt"),
            EO,
            f("b"),
            SO,
            f("json_paths"),
            s("$.b"),
            EO,
            EO,
            EO,
            EO,
        ]);
        let container = decoder.decode(&mut cursor).expect("decode");
        assert_eq!(container.var("a").and_then(|c| c.operation_name()), Some("file"));
        assert_eq!(
            container.var("b").and_then(|c| c.operation_name()),
            Some("json_paths")
        );
    }

    #[test]
    fn only_first_template_record_is_used() {
        let mut cursor = FakeCursor::new(vec![
            SO,
            f("template"),
            SA,
            SO,
            f("with"),
            s("A"),
            f("vars"),
            SO,
            EO,
            EO,
            SO,
            f("with"),
            s("B"),
            f("vars"),
            SO,
            EO,
            EO,
            EA,
            EO,
        ]);
        let container = decode(&mut cursor).expect("decode");
        assert_eq!(container, TextContainer::operation("template", "A"));
        assert_eq!(cursor.kind(), TokenKind::End);
    }

    #[test]
    fn discarded_records_are_not_interpreted() {
        let container = decode_tokens(vec![
            SO,
            f("template"),
            SA,
            SO,
            f("with"),
            s("A"),
            EO,
            n("42"),
            SO,
            f("unknown"),
            SA,
            EA,
            EO,
            EA,
            EO,
        ])
        .expect("decode");
        assert_eq!(container.text(), "A");
    }

    #[test]
    fn cursor_is_left_after_decoded_value() {
        let mut cursor = FakeCursor::new(vec![
            SA,
            s("first"),
            SO,
            f("template"),
            s("second"),
            EO,
            EA,
        ]);
        cursor.advance().expect("enter array");

        let first = decode(&mut cursor).expect("first");
        assert_eq!(first, TextContainer::raw("first"));
        assert_eq!(cursor.kind(), TokenKind::StartObject);

        let second = decode(&mut cursor).expect("second");
        assert_eq!(second, TextContainer::operation("template", "second"));
        assert_eq!(cursor.kind(), TokenKind::EndArray);
    }

    #[test]
    fn empty_object_is_malformed() {
        let err = decode_tokens(vec![SO, EO]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedContainer);
    }

    #[test]
    fn non_string_scalar_for_template_is_unsupported() {
        let err = decode_tokens(vec![SO, f("template"), n("42"), EO]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedShape);
    }

    #[test]
    fn object_value_for_plain_operation_is_unsupported() {
        let err = decode_tokens(vec![SO, f("file"), SO, f("with"), s("x"), EO, EO]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedShape);
    }

    #[test]
    fn top_level_number_is_malformed() {
        let err = decode_tokens(vec![n("7")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedContainer);
    }

    #[test]
    fn second_operation_field_is_malformed() {
        let err =
            decode_tokens(vec![SO, f("file"), s("a"), f("template"), s("b"), EO]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedContainer);
        assert!(err.hint().is_some());
    }

    #[test]
    fn template_record_shape_errors() {
        let missing_with =
            decode_tokens(vec![SO, f("template"), SO, f("vars"), SO, EO, EO, EO]).unwrap_err();
        assert_eq!(missing_with.kind(), ErrorKind::MalformedContainer);

        let unknown_field =
            decode_tokens(vec![SO, f("template"), SO, f("using"), s("x"), EO, EO]).unwrap_err();
        assert_eq!(unknown_field.kind(), ErrorKind::MalformedContainer);

        let numeric_with =
            decode_tokens(vec![SO, f("template"), SO, f("with"), n("1"), EO, EO]).unwrap_err();
        assert_eq!(numeric_with.kind(), ErrorKind::UnsupportedShape);

        let vars_array = decode_tokens(vec![
            SO,
            f("template"),
            SO,
            f("with"),
            s("x"),
            f("vars"),
            SA,
            EA,
            EO,
            EO,
        ])
        .unwrap_err();
        assert_eq!(vars_array.kind(), ErrorKind::UnsupportedShape);

        let empty_sequence = decode_tokens(vec![SO, f("template"), SA, EA, EO]).unwrap_err();
        assert_eq!(empty_sequence.kind(), ErrorKind::MalformedContainer);
    }

    #[test]
    fn invalid_variable_aborts_whole_decode() {
        let err = decode_tokens(vec![
            SO,
            f("template"),
            SO,
            f("with"),
            s("${a}"),
            f("vars"),
            SO,
            f("a"),
            SO,
            EO,
            EO,
            EO,
            EO,
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedContainer);
    }

    #[test]
    fn truncated_input_surfaces_cursor_error() {
        let err = decode_tokens(vec![SO, f("template"), s("x")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedContainer);

        let err = decode_tokens(vec![SO, f("template"), SA, SO, f("with"), s("A"), EO, SO])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn template_text_is_verbatim_while_var_names_are_trimmed() {
        let container = decode_tokens(vec![
            SO,
            f("template"),
            SO,
            f("with"),
            s("  Hi ${a} "),
            f("vars"),
            SO,
            f(" a "),
            s(" x "),
            EO,
            EO,
            EO,
        ])
        .expect("decode");

        assert_eq!(container.text(), "  Hi ${a} ");
        assert_eq!(container.var("a"), Some(&TextContainer::raw("x")));
        assert_eq!(container.var(" a "), None);
    }

    #[test]
    fn template_record_field_names_must_match_exactly() {
        let err = decode_tokens(vec![
            SO,
            f("template"),
            SO,
            f(" with "),
            s("x"),
            f(" vars "),
            SO,
            f("a"),
            s("y"),
            EO,
            EO,
            EO,
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedContainer);

        let err =
            decode_tokens(vec![SO, f("template"), SO, f("With"), s("x"), EO, EO]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedContainer);
    }
}
