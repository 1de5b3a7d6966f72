use templfmt::{ParseError, Position, parse_string};

fn parse_err(source: &str) -> ParseError {
    match parse_string(source) {
        Ok(document) => panic!("expected a parse error, got {document:#?}"),
        Err(err) => err,
    }
}

#[test]
fn missing_package_when_another_directive_comes_first() {
    let err = parse_err("\n{% import \"strings\" %}\n{% package test %}");
    assert!(matches!(err, ParseError::MissingPackage { .. }));
    assert_eq!(err.position().line, 2);
    assert_eq!(err.position().offset, 1);
}

#[test]
fn missing_package_when_there_are_no_directives() {
    let err = parse_err("<p>just markup</p>\n");
    assert!(matches!(err, ParseError::MissingPackage { .. }));
    assert_eq!(
        parse_err(""),
        ParseError::MissingPackage {
            position: Position {
                offset: 0,
                line: 1,
                column: 1
            }
        }
    );
}

#[test]
fn duplicate_package_points_at_both_declarations() {
    let err = parse_err("{% package a %}\n{% package b %}");
    match err {
        ParseError::DuplicatePackage { position, first } => {
            assert_eq!(first.line, 1);
            assert_eq!(position.line, 2);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unterminated_directive_carries_its_start() {
    let err = parse_err("{% package a %}\n\n  {% import \"x\" ");
    assert!(matches!(err, ParseError::UnterminatedDirective { .. }));
    assert_eq!(err.position().line, 3);
    assert_eq!(err.position().column, 3);
}

#[test]
fn nested_templ_is_rejected() {
    let err = parse_err("{% package a %}\n{% templ outer() %}\n{% templ inner() %}\n{% endtempl %}");
    match err {
        ParseError::NestedTempl { outer, position } => {
            assert_eq!(outer, "outer");
            assert_eq!(position.line, 3);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unterminated_templ_points_at_its_header() {
    let err = parse_err("{% package a %}\n{% templ page() %}\n<p>x</p>\n");
    match err {
        ParseError::UnterminatedTempl { name, position } => {
            assert_eq!(name, "page");
            assert_eq!(position.line, 2);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn mismatched_tag_names_both_tags() {
    let err = parse_err("{% package a %}\n{% templ page() %}\n<div><p></div></p>\n{% endtempl %}");
    match &err {
        ParseError::MismatchedTag { open, close, .. } => {
            assert_eq!(open, "p");
            assert_eq!(close, "div");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(err.position().line, 3);
    assert_eq!(err.position().column, 9);
    assert_eq!(
        err.to_string(),
        "3:9: mismatched closing tag `</div>`, expected `</p>`"
    );
}

#[test]
fn unclosed_element_at_endtempl() {
    let err = parse_err("{% package a %}\n{% templ page() %}\n  <section>\n{% endtempl %}");
    match err {
        ParseError::UnclosedElement { tag, position } => {
            assert_eq!(tag, "section");
            assert_eq!(position.line, 3);
            assert_eq!(position.column, 3);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn closing_tag_without_opening_tag() {
    let err = parse_err("{% package a %}{% templ page() %}</p>{% endtempl %}");
    assert!(matches!(err, ParseError::UnexpectedClosingTag { ref tag, .. } if tag == "p"));
}

#[test]
fn tag_cut_off_by_a_directive() {
    let err = parse_err("{% package a %}{% templ page() %}<div class=\"x\"{% endtempl %}");
    assert!(matches!(err, ParseError::UnterminatedTag { ref tag, .. } if tag == "div"));
}

#[test]
fn malformed_headers() {
    for source in [
        "{% package %}",
        "{% package a %}{% import %}",
        "{% package a %}{% templ page %}{% endtempl %}",
        "{% package a %}{% templ () %}{% endtempl %}",
    ] {
        let err = parse_err(source);
        assert!(
            matches!(err, ParseError::MalformedDirective { .. }),
            "{source}: {err:?}"
        );
    }
}

#[test]
fn misplaced_directives_are_unexpected() {
    for source in [
        "{% package a %}{% endtempl %}",
        "{% package a %}{% if x %}",
        "{% package a %}{% templ page() %}{% import \"x\" %}{% endtempl %}",
        "{% package a %}{% templ page() %}{% package b %}{% endtempl %}",
    ] {
        let err = parse_err(source);
        assert!(
            matches!(err, ParseError::UnexpectedDirective { .. }),
            "{source}: {err:?}"
        );
    }
}

#[test]
fn error_messages_include_the_position() {
    let err = parse_err("{% package a %}\n{% package b %}");
    assert_eq!(
        err.to_string(),
        "2:1: duplicate package declaration, first declared at 1:1"
    );
}
