mod common;

use common::{parse, parse_with};
use trellis::ast::{LiteralValue, Node};
use trellis::methods::{HelperSpec, MethodRegistry};
use trellis::ErrorType;

fn first(src: &str) -> Node {
    parse(src).unwrap().statements.remove(0)
}

#[test]
fn chains_are_left_associative() {
    let node = first("text(\"Hi\").padding(4).bg(\"red\")");
    let outer = node.as_call().unwrap();
    assert_eq!(outer.method, "bg");
    let middle = outer.receiver.as_ref().unwrap().as_call().unwrap();
    assert_eq!(middle.method, "padding");
    let inner = middle.receiver.as_ref().unwrap().as_call().unwrap();
    assert_eq!(inner.method, "text");
    assert!(inner.receiver.is_none());
}

#[test]
fn bare_arguments_bind_to_the_call() {
    assert_eq!(first("text \"Hi\"").pretty(), "text(\"Hi\")");
    assert_eq!(first("text \"Hi\".bg(\"red\")").pretty(), "text(\"Hi\").bg(\"red\")");
    assert_eq!(
        first("button \"Go\", type: \"submit\"").pretty(),
        "button(\"Go\", type: \"submit\")"
    );
}

#[test]
fn identifier_never_starts_bare_arguments() {
    let program = parse("spacer\ntext(\"a\")").unwrap();
    assert_eq!(program.statements.len(), 2);
}

#[test]
fn both_block_forms() {
    let a = first("vstack do text(\"a\") end");
    let b = first("vstack { text(\"a\") }");
    assert_eq!(a.pretty(), b.pretty());
    let block = a.as_call().unwrap().block.as_ref().unwrap();
    assert_eq!(block.statements.len(), 1);
}

#[test]
fn literal_words_become_literals() {
    let call = first("button(\"x\", disabled: true, value: nil)");
    let call = call.as_call().unwrap();
    match &call.args[1] {
        Node::NamedArg(arg) => match arg.value.as_ref() {
            Node::Literal(lit) => assert_eq!(lit.value, LiteralValue::Bool(true)),
            other => panic!("unexpected {other:?}"),
        },
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn hash_rocket_named_arguments() {
    let call = first("div.data(\"controller\" => \"counter\", :action => \"click->counter#add\")");
    let keys: Vec<_> = call
        .as_call()
        .unwrap()
        .args
        .iter()
        .filter_map(|a| match a {
            Node::NamedArg(arg) => Some(arg.key.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(keys, vec!["controller", "action"]);
}

#[test]
fn trailing_comma_and_parenthesized_expression() {
    assert!(parse("text(\"a\",)").is_ok());
    assert_eq!(first("(text(\"a\")).bg(\"red\")").pretty(), "text(\"a\").bg(\"red\")");
}

#[test]
fn unknown_method_is_a_security_error_with_position() {
    let err = parse("vstack do\n  eval(\"x\")\nend").unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Security);
    assert_eq!(err.message(), "'eval' is not an allowed method (line 2, column 3)");
}

#[test]
fn whitelist_is_checked_for_chained_names_inside_arguments() {
    let err = parse("text(\"a\", class: text(\"b\").instance_variable_get(\"@x\"))").unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Security);
}

#[test]
fn missing_end_reports_opening_position() {
    let err = parse("vstack do\n  text(\"a\")\n").unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Parse);
    assert!(err.message().starts_with("missing 'end' to close the block opened at line 1, column 8"));
    assert!(parse("hstack {").unwrap_err().message().starts_with("missing '}'"));
}

#[test]
fn unexpected_token_names_expected_and_found() {
    let err = parse("text(\"a\" \"b\")").unwrap_err();
    assert_eq!(
        err.message(),
        "expected ',' or ')' but found string \"b\" at line 1, column 10"
    );
    let err = parse("text(\"a\").").unwrap_err();
    assert!(err.message().starts_with("expected a method name after '.' but found end of input"));
}

#[test]
fn stray_closers_are_rejected() {
    assert_eq!(parse("end").unwrap_err().error_type(), ErrorType::Parse);
    assert_eq!(parse(")").unwrap_err().error_type(), ErrorType::Parse);
}

#[test]
fn registry_controls_what_parses() {
    let mut registry = MethodRegistry::standard();
    registry.disable("image");
    assert_eq!(
        parse_with("image(\"a.png\")", &registry).unwrap_err().error_type(),
        ErrorType::Security
    );

    registry.register_helper(HelperSpec {
        name: "badge",
        params: &[],
        summary: "",
    });
    assert!(parse_with("badge", &registry).is_ok());
}

#[test]
fn empty_program() {
    assert!(parse("").unwrap().is_empty());
    assert!(parse("# nothing\n").unwrap().is_empty());
}

#[test]
fn literal_round_trip() {
    for src in ["text(\"a\\\"b\")", "text(42)", "text(-7)", "text(4.5)", "text(:sym)", "text(nil)", "text(true)"] {
        assert_eq!(first(src).pretty(), src);
    }
}

#[test]
fn node_count_covers_receivers_and_arguments() {
    assert_eq!(first("text(\"a\").bg(\"red\")").node_count(), 4);
    assert_eq!(first("vstack do text(\"a\") end").node_count(), 4);
}
