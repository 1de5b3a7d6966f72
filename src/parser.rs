//! Template parser
//!
//! Turns the scanner's segments into a [`Document`]. Top-level directives
//! become [`Node`]s in source order, literal gaps between them become
//! [`Trivia`], and each `templ` body is handed to the markup parser.
//!
//! # Example
//!
//! ```rust
//! use templfmt::parser::parse_string;
//!
//! let source = r#"{% package views %}
//! {% import "strings" %}
//! {% templ hello(name string) %}<p>Hello</p>{% endtempl %}"#;
//!
//! let document = parse_string(source).unwrap();
//! assert_eq!(document.package().unwrap().name, "views");
//! assert_eq!(document.imports().count(), 1);
//! assert_eq!(document.templates().next().unwrap().name, "hello");
//! ```

use crate::ast::{Document, Import, Node, Package, TemplBlock, Trivia, Warning};
use crate::error::ParseError;
use crate::markup::MarkupParser;
use crate::scanner::{Scanner, SegmentKind};
use crate::source::{LineIndex, Position};
use std::str::FromStr;
use tracing::debug;

const PACKAGE: &str = "package";
const IMPORT: &str = "import";
const TEMPL: &str = "templ";
const END_TEMPL: &str = "endtempl";

/// Parse template source into a [`Document`]
///
/// The whole source must be well formed: the first error aborts the parse
/// and no partial document is returned.
///
/// # Errors
///
/// Any [`ParseError`]: an unterminated `{%`, a missing or repeated package
/// declaration, a malformed or misplaced directive, nested or unterminated
/// `templ` blocks, and unbalanced markup inside a block.
pub fn parse_string(source: &str) -> Result<Document, ParseError> {
    let document = Parser::new(source).parse()?;
    debug!(
        nodes = document.nodes().len(),
        warnings = document.warnings().len(),
        "parsed template"
    );
    Ok(document)
}

impl FromStr for Document {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        parse_string(source)
    }
}

/// A directive split into its keyword and the text after it
struct Directive<'a> {
    text: &'a str,
    keyword: &'a str,
    rest: &'a str,
    position: Position,
}

impl<'a> Directive<'a> {
    fn new(text: &'a str, position: Position) -> Self {
        let (keyword, rest) = text
            .split_once(char::is_whitespace)
            .map_or((text, ""), |(keyword, rest)| (keyword, rest.trim()));
        Self {
            text,
            keyword,
            rest,
            position,
        }
    }

    fn malformed(&self, expected: &'static str) -> ParseError {
        ParseError::MalformedDirective {
            keyword: self.keyword.to_string(),
            expected,
            position: self.position,
        }
    }

    fn unexpected(&self) -> ParseError {
        ParseError::UnexpectedDirective {
            directive: self.text.to_string(),
            position: self.position,
        }
    }
}

struct Parser<'a> {
    index: LineIndex<'a>,
    segments: Scanner<'a>,
    nodes: Vec<Node>,
    warnings: Vec<Warning>,
    pending: Trivia,
    package_at: Option<Position>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            index: LineIndex::new(source),
            segments: Scanner::new(source),
            nodes: Vec::new(),
            warnings: Vec::new(),
            pending: Trivia::default(),
            package_at: None,
        }
    }

    fn parse(mut self) -> Result<Document, ParseError> {
        while let Some(segment) = self.segments.next() {
            let segment = segment?;
            match segment.kind {
                SegmentKind::Literal => absorb_gap(&mut self.pending, segment.text),
                SegmentKind::Directive => {
                    let directive =
                        Directive::new(segment.text, self.index.position(segment.offset));
                    self.directive(directive)?;
                }
            }
        }

        if self.package_at.is_none() {
            return Err(ParseError::MissingPackage {
                position: self.index.position(usize::MAX),
            });
        }
        let trailing = std::mem::take(&mut self.pending).comment;
        Ok(Document::new(self.nodes, trailing, self.warnings))
    }

    fn directive(&mut self, directive: Directive<'_>) -> Result<(), ParseError> {
        let Some(first) = self.package_at else {
            if directive.keyword != PACKAGE {
                return Err(ParseError::MissingPackage {
                    position: directive.position,
                });
            }
            return self.package(directive);
        };

        let keyword = directive.keyword;
        let node = match keyword {
            PACKAGE => {
                return Err(ParseError::DuplicatePackage {
                    position: directive.position,
                    first,
                });
            }
            IMPORT => {
                if directive.rest.is_empty() {
                    return Err(directive.malformed("import \"<path>\""));
                }
                Node::Import(Import {
                    path: directive.rest.to_string(),
                    trivia: self.take_trivia(),
                    position: directive.position,
                })
            }
            TEMPL => Node::Templ(self.templ(directive)?),
            _ => return Err(directive.unexpected()),
        };
        self.nodes.push(node);
        Ok(())
    }

    fn package(&mut self, directive: Directive<'_>) -> Result<(), ParseError> {
        if directive.rest.is_empty() || directive.rest.contains(char::is_whitespace) {
            return Err(directive.malformed("package <name>"));
        }
        self.package_at = Some(directive.position);
        let trivia = self.take_trivia();
        self.nodes.push(Node::Package(Package {
            name: directive.rest.to_string(),
            trivia,
            position: directive.position,
        }));
        Ok(())
    }

    /// Parse a block from its header through `{% endtempl %}`.
    fn templ(&mut self, header: Directive<'_>) -> Result<TemplBlock, ParseError> {
        let (name, params) =
            split_signature(header.rest).ok_or_else(|| header.malformed("templ <name>(<params>)"))?;
        let trivia = self.take_trivia();

        let mut markup = MarkupParser::new(&self.index);
        loop {
            let Some(segment) = self.segments.next() else {
                return Err(ParseError::UnterminatedTempl {
                    name: name.to_string(),
                    position: header.position,
                });
            };
            let segment = segment?;
            if segment.kind == SegmentKind::Literal {
                markup.feed(segment.text, segment.offset)?;
                continue;
            }
            let directive = Directive::new(segment.text, self.index.position(segment.offset));
            match directive.keyword {
                END_TEMPL if directive.rest.is_empty() => break,
                TEMPL => {
                    return Err(ParseError::NestedTempl {
                        outer: name.to_string(),
                        position: directive.position,
                    });
                }
                _ => return Err(directive.unexpected()),
            }
        }

        let (body, warnings) = markup.finish()?;
        self.warnings.extend(warnings);
        Ok(TemplBlock {
            name: name.to_string(),
            params: params.to_string(),
            body,
            trivia,
            position: header.position,
        })
    }

    fn take_trivia(&mut self) -> Trivia {
        std::mem::take(&mut self.pending)
    }
}

/// Record a literal gap between top-level directives.
fn absorb_gap(trivia: &mut Trivia, text: &str) {
    let content = text.trim();
    if content.is_empty() {
        trivia.blank_lines += text.matches('\n').count().saturating_sub(1);
        return;
    }
    let leading = &text[..text.len() - text.trim_start().len()];
    trivia.blank_lines += leading.matches('\n').count().saturating_sub(1);
    match &mut trivia.comment {
        Some(comment) => {
            comment.push('\n');
            comment.push_str(content);
        }
        None => trivia.comment = Some(content.to_string()),
    }
}

/// Split `name(params)` into its name and the trimmed text between the first
/// `(` and the last `)`.
fn split_signature(signature: &str) -> Option<(&str, &str)> {
    let open = signature.find('(')?;
    let close = signature.rfind(')')?;
    let name = signature[..open].trim();
    if close < open || !signature[close + 1..].trim().is_empty() {
        return None;
    }
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name, signature[open + 1..close].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::MarkupNode;

    #[test]
    fn nodes_keep_source_order() {
        let doc = parse_string(
            "{% package p %}\n{% templ a() %}{% endtempl %}\n{% import \"x\" %}\n",
        )
        .unwrap();
        let kinds: Vec<_> = doc
            .nodes()
            .iter()
            .map(|node| match node {
                Node::Package(_) => "package",
                Node::Import(_) => "import",
                Node::Templ(_) => "templ",
            })
            .collect();
        assert_eq!(kinds, vec!["package", "templ", "import"]);
    }

    #[test]
    fn duplicate_imports_are_kept() {
        let doc = parse_string("{% package p %}{% import \"a\" %}{% import \"a\" %}").unwrap();
        let paths: Vec<_> = doc.imports().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["\"a\"", "\"a\""]);
    }

    #[test]
    fn blank_lines_are_recorded_as_trivia() {
        let doc =
            parse_string("{% package p %}\n{% import \"a\" %}\n\n\n{% import \"b\" %}").unwrap();
        let blanks: Vec<_> = doc.imports().map(|i| i.trivia.blank_lines).collect();
        assert_eq!(blanks, vec![0, 2]);
    }

    #[test]
    fn free_text_attaches_to_the_next_node() {
        let doc = parse_string("// views\n{% package p %}\n  note  \n{% import \"a\" %}\nend\n")
            .unwrap();
        assert_eq!(
            doc.package().unwrap().trivia.comment.as_deref(),
            Some("// views")
        );
        assert_eq!(
            doc.imports().next().unwrap().trivia.comment.as_deref(),
            Some("note")
        );
        assert_eq!(doc.trailing(), Some("end"));
    }

    #[test]
    fn templ_header_is_split_into_name_and_params() {
        let doc = parse_string(
            "{% package p %}{% templ  input(value, validation string)  %}{% endtempl %}",
        )
        .unwrap();
        let templ = doc.templates().next().unwrap();
        assert_eq!(templ.name, "input");
        assert_eq!(templ.params, "value, validation string");
        assert!(templ.body.is_empty());
    }

    #[test]
    fn params_may_contain_parentheses() {
        assert_eq!(
            split_signature("list(f func(int) string)"),
            Some(("list", "f func(int) string"))
        );
        assert_eq!(split_signature("broken"), None);
        assert_eq!(split_signature("(x)"), None);
        assert_eq!(split_signature("a(x) trailing"), None);
    }

    #[test]
    fn body_markup_is_parsed() {
        let doc =
            parse_string("{% package p %}{% templ a() %}\n<p>hi</p>\n{% endtempl %}").unwrap();
        let body = &doc.templates().next().unwrap().body;
        assert_eq!(body.len(), 3);
        assert!(matches!(&body[1], MarkupNode::Element(e) if e.name == "p"));
    }

    #[test]
    fn element_positions_are_absolute() {
        let doc = parse_string("{% package p %}\n{% templ a() %}\n  <p>hi</p>\n{% endtempl %}")
            .unwrap();
        let body = &doc.templates().next().unwrap().body;
        let MarkupNode::Element(p) = &body[1] else {
            panic!("expected element");
        };
        assert_eq!(p.position.line, 3);
        assert_eq!(p.position.column, 3);
    }

    #[test]
    fn void_warnings_reach_the_document() {
        let doc =
            parse_string("{% package p %}{% templ a() %}<hr>x</hr>{% endtempl %}").unwrap();
        assert_eq!(doc.warnings().len(), 1);
    }

    #[test]
    fn endtempl_with_arguments_is_unexpected() {
        let err =
            parse_string("{% package p %}{% templ a() %}{% endtempl a %}").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedDirective { .. }));
    }

    #[test]
    fn package_name_must_be_one_word() {
        let err = parse_string("{% package a b %}").unwrap_err();
        assert!(matches!(err, ParseError::MalformedDirective { .. }));
    }
}
