//! Canonical writer for parsed templates
//!
//! The layout is fixed and depends only on the [`Document`]:
//!
//! - the package line, then one blank line;
//! - every import, in source order, with no blank lines between them, then
//!   one blank line;
//! - each `templ` block with its markup indented one tab per level, then one
//!   blank line.
//!
//! Void elements (and elements the source already self-closed) are written
//! as `<name/>`. Markup is broken into lines only where the source has
//! whitespace between nodes; nodes that touch are written together, verbatim.
//! `pre` and `textarea` content is never touched. Formatting already
//! formatted output changes nothing.
//!
//! # Example
//!
//! ```rust
//! use templfmt::formatter::format_source;
//!
//! let source = "{% package test %}\n{% import \"strings\" %}";
//! let formatted = format_source(source).unwrap();
//! assert_eq!(formatted, "{% package test %}\n\n{% import \"strings\" %}\n\n");
//! ```

use crate::ast::{Document, Element, MarkupNode, Node, Trivia};
use crate::error::ParseError;
use crate::parser::parse_string;
use std::fmt;
use std::io;

const INDENT: &str = "\t";

/// Parse `input` and return its canonical formatting
///
/// # Errors
///
/// Returns the [`ParseError`] if `input` is not a well formed template.
pub fn format_source(input: &str) -> Result<String, ParseError> {
    let document = parse_string(input)?;
    Ok(document.to_string())
}

impl Document {
    /// Write the canonical formatting of this document to `sink`.
    ///
    /// The text is rendered in full before anything is written, so the only
    /// possible failure is the sink's own I/O error.
    pub fn write<W: io::Write + ?Sized>(&self, sink: &mut W) -> io::Result<()> {
        sink.write_all(render(self).as_bytes())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}

#[derive(Debug, Default)]
struct FormatterState {
    output: String,
    indent_level: usize,
}

impl FormatterState {
    fn write_line(&mut self, text: &str) {
        for _ in 0..self.indent_level {
            self.output.push_str(INDENT);
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn blank_line(&mut self) {
        self.output.push('\n');
    }

    /// Free text kept from the source, on its own lines above a node.
    fn write_comment(&mut self, comment: Option<&str>) {
        if let Some(comment) = comment {
            self.write_line(comment);
        }
    }

    fn write_trivia(&mut self, trivia: &Trivia) {
        self.write_comment(trivia.comment.as_deref());
    }
}

fn render(document: &Document) -> String {
    let mut state = FormatterState::default();

    if let Some(package) = document.package() {
        state.write_trivia(&package.trivia);
        state.write_line(&format!("{{% package {} %}}", package.name));
        state.blank_line();
    }

    let mut imports = document.imports().peekable();
    if imports.peek().is_some() {
        for import in imports {
            state.write_trivia(&import.trivia);
            state.write_line(&format!("{{% import {} %}}", import.path));
        }
        state.blank_line();
    }

    for node in document.nodes() {
        let Node::Templ(templ) = node else {
            continue;
        };
        state.write_trivia(&templ.trivia);
        state.write_line(&format!("{{% templ {}({}) %}}", templ.name, templ.params));
        state.indent_level += 1;
        format_children(&mut state, &templ.body);
        state.indent_level -= 1;
        state.write_line("{% endtempl %}");
        state.blank_line();
    }

    if let Some(trailing) = document.trailing() {
        state.write_comment(Some(trailing));
        state.blank_line();
    }

    state.output
}

/// Elements whose content is written exactly as parsed.
const PREFORMATTED: [&str; 2] = ["pre", "textarea"];

/// One unit of a markup line.
enum Piece<'d> {
    Text(&'d str),
    Element(&'d Element),
}

/// Split `children` into lines.
///
/// A line ends wherever the source has whitespace between two nodes. Nodes
/// that touch stay on one line, so only whitespace the source already had is
/// turned into a line break and indentation.
fn split_lines(children: &[MarkupNode]) -> Vec<Vec<Piece<'_>>> {
    fn flush<'d>(lines: &mut Vec<Vec<Piece<'d>>>, line: &mut Vec<Piece<'d>>) {
        if !line.is_empty() {
            lines.push(std::mem::take(line));
        }
    }

    let mut lines = Vec::new();
    let mut line = Vec::new();
    for child in children {
        match child {
            MarkupNode::Element(element) => line.push(Piece::Element(element)),
            MarkupNode::Text(text) => {
                let core = text.trim();
                if core.is_empty() {
                    flush(&mut lines, &mut line);
                    continue;
                }
                if text.starts_with(char::is_whitespace) {
                    flush(&mut lines, &mut line);
                }
                line.push(Piece::Text(core));
                if text.ends_with(char::is_whitespace) {
                    flush(&mut lines, &mut line);
                }
            }
        }
    }
    flush(&mut lines, &mut line);
    lines
}

/// Write the lines of a block context at the current indent level.
fn format_children(state: &mut FormatterState, children: &[MarkupNode]) {
    for line in split_lines(children) {
        if let [Piece::Element(element)] = line.as_slice()
            && is_block(element)
        {
            format_block(state, element);
            continue;
        }
        let mut text = String::new();
        for piece in line {
            match piece {
                Piece::Text(core) => text.push_str(core),
                Piece::Element(element) => write_inline(&mut text, element),
            }
        }
        state.write_line(&text);
    }
}

/// Block layout puts the content on its own indented lines, which is only
/// possible when the source has whitespace right inside both tags.
fn is_block(element: &Element) -> bool {
    if element.self_closed || element.is_void() || is_preformatted(element) {
        return false;
    }
    let has_elements = element
        .children
        .iter()
        .any(|child| matches!(child, MarkupNode::Element(_)));
    let opens_with_space = matches!(
        element.children.first(),
        Some(MarkupNode::Text(text)) if text.starts_with(char::is_whitespace)
    );
    let closes_with_space = matches!(
        element.children.last(),
        Some(MarkupNode::Text(text)) if text.ends_with(char::is_whitespace)
    );
    has_elements && opens_with_space && closes_with_space
}

fn is_preformatted(element: &Element) -> bool {
    PREFORMATTED
        .iter()
        .any(|tag| element.name.eq_ignore_ascii_case(tag))
}

fn open_tag(element: &Element) -> String {
    let mut open = format!("<{}", element.name);
    if !element.attrs.is_empty() {
        open.push(' ');
        open.push_str(&element.attrs);
    }
    open
}

fn format_block(state: &mut FormatterState, element: &Element) {
    state.write_line(&format!("{}>", open_tag(element)));
    state.indent_level += 1;
    format_children(state, &element.children);
    state.indent_level -= 1;
    state.write_line(&format!("</{}>", element.name));
}

/// Append `element` to `out` on the current line. Text is copied verbatim.
fn write_inline(out: &mut String, element: &Element) {
    out.push_str(&open_tag(element));
    if element.self_closed || element.is_void() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &element.children {
        match child {
            MarkupNode::Text(text) => out.push_str(text),
            MarkupNode::Element(child) => write_inline(out, child),
        }
    }
    out.push_str(&format!("</{}>", element.name));
}
