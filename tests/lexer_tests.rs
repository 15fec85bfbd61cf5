use trellis::syntax::{tokenize, TokenKind, TokenValue};
use trellis::ErrorType;

fn kinds(src: &str) -> Vec<TokenKind> {
    tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
}

#[test]
fn tokenizes_a_chained_call_with_block() {
    use TokenKind::*;
    assert_eq!(
        kinds("vstack(spacing: 4) do\n  text(\"Hi\").bg(:blue)\nend"),
        vec![
            Identifier, LParen, Identifier, Colon, Number, RParen, Do, Identifier, LParen, String,
            RParen, Dot, Identifier, LParen, Symbol, RParen, End, Eof
        ]
    );
}

#[test]
fn empty_and_comment_only_input() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
    assert_eq!(kinds("  # just a comment\n\t"), vec![TokenKind::Eof]);
}

#[test]
fn string_escapes() {
    let tokens = tokenize(r#""a\"b\n\tc\\" 'it\'s'"#).unwrap();
    assert_eq!(tokens[0].value, TokenValue::Text("a\"b\n\tc\\".to_string()));
    assert_eq!(tokens[1].value, TokenValue::Text("it's".to_string()));
}

#[test]
fn numbers() {
    let tokens = tokenize("42 -3 4.5 -0.25").unwrap();
    let values: Vec<_> = tokens.iter().map(|t| t.value.clone()).collect();
    assert_eq!(
        values,
        vec![
            TokenValue::Integer(42),
            TokenValue::Integer(-3),
            TokenValue::Float(4.5),
            TokenValue::Float(-0.25),
            TokenValue::None,
        ]
    );
}

#[test]
fn identifiers_may_end_in_predicate_or_bang() {
    let tokens = tokenize("valid? save!").unwrap();
    assert_eq!(tokens[0].text(), Some("valid?"));
    assert_eq!(tokens[1].text(), Some("save!"));
}

#[test]
fn keywords_and_literal_words() {
    use TokenKind::*;
    // `true`/`false`/`nil` stay identifiers; only `do` and `end` are reserved.
    assert_eq!(kinds("do end true nil"), vec![Do, End, Identifier, Identifier, Eof]);
    assert_eq!(kinds("done ending"), vec![Identifier, Identifier, Eof]);
}

#[test]
fn unexpected_character_reports_position() {
    let err = tokenize("text(\"a\")\n  @oops").unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Lex);
    assert_eq!(err.message(), "Unexpected character '@' at line 2, column 3");
    assert_eq!(err.user_message(), "Syntax Error: Unexpected character '@' at line 2, column 3");
}

#[test]
fn unterminated_string_reports_start() {
    let err = tokenize("text(\n  \"never closed)").unwrap_err();
    assert_eq!(err.message(), "Unterminated string literal starting at line 2, column 3");
}

#[test]
fn spans_cover_token_text() {
    let src = "button(\"Save\")";
    let tokens = tokenize(src).unwrap();
    let string = &tokens[2];
    assert_eq!(&src[string.span.start..string.span.end], "\"Save\"");
    assert_eq!(string.span.column, 8);
}

#[test]
fn unknown_escape_is_rejected() {
    let err = tokenize(r#"text("\u00e9")"#).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Lex);
    assert_eq!(err.message(), "Unknown escape sequence '\\u' at line 1, column 7");
    assert!(!err.is_incomplete_input());
}
