//! Markup parsing for `templ` bodies
//!
//! Tags are matched with an explicit stack of open frames instead of
//! recursion: an opening tag pushes a frame, its closing tag pops it and hands
//! the finished [`Element`] to the frame below. Text between tags goes to the
//! innermost open frame.
//!
//! Void elements may be left open (`<br>`, `<img src="a.png">`). When a close
//! tag or the end of the block finds a void frame on top, that frame is closed
//! as an empty element and whatever it collected moves up to its parent.

use crate::ast::{Element, MarkupNode, Warning};
use crate::elements::is_void;
use crate::error::ParseError;
use crate::source::{LineIndex, Position};
use tracing::warn;

#[derive(Debug)]
struct Frame {
    name: String,
    attrs: String,
    children: Vec<MarkupNode>,
    position: Position,
}

enum Tag<'t> {
    Open {
        name: &'t str,
        attrs: &'t str,
        self_closed: bool,
    },
    Close {
        name: &'t str,
    },
}

/// Incremental markup parser for one block body
pub(crate) struct MarkupParser<'s, 'i> {
    index: &'i LineIndex<'s>,
    root: Vec<MarkupNode>,
    stack: Vec<Frame>,
    warnings: Vec<Warning>,
}

impl<'s, 'i> MarkupParser<'s, 'i> {
    pub(crate) fn new(index: &'i LineIndex<'s>) -> Self {
        Self {
            index,
            root: Vec::new(),
            stack: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Parse `text`, which starts at byte `base` of the source.
    pub(crate) fn feed(&mut self, text: &str, base: usize) -> Result<(), ParseError> {
        let bytes = text.as_bytes();
        let mut text_start = 0;
        let mut i = 0;
        while let Some(rel) = text[i..].find('<') {
            let lt = i + rel;
            let is_tag = match bytes.get(lt + 1) {
                Some(b'/') => bytes.get(lt + 2).is_some_and(u8::is_ascii_alphabetic),
                Some(b) => b.is_ascii_alphabetic(),
                None => false,
            };
            if !is_tag {
                i = lt + 1;
                continue;
            }

            self.push_text(&text[text_start..lt]);
            let position = self.index.position(base + lt);
            let (tag, end) = read_tag(text, lt, position)?;
            match tag {
                Tag::Open {
                    name,
                    attrs,
                    self_closed: true,
                } => self.push_node(MarkupNode::Element(Element {
                    name: name.to_string(),
                    attrs: attrs.to_string(),
                    children: Vec::new(),
                    self_closed: true,
                    position,
                })),
                Tag::Open { name, attrs, .. } => self.stack.push(Frame {
                    name: name.to_string(),
                    attrs: attrs.to_string(),
                    children: Vec::new(),
                    position,
                }),
                Tag::Close { name } => self.close(name, position)?,
            }
            i = end;
            text_start = end;
        }
        self.push_text(&text[text_start..]);
        Ok(())
    }

    /// Close every remaining void frame and return the body.
    pub(crate) fn finish(mut self) -> Result<(Vec<MarkupNode>, Vec<Warning>), ParseError> {
        while let Some(frame) = self.stack.pop() {
            if !is_void(&frame.name) {
                return Err(ParseError::UnclosedElement {
                    tag: frame.name,
                    position: frame.position,
                });
            }
            self.close_implicitly(frame);
        }
        Ok((self.root, self.warnings))
    }

    fn close(&mut self, name: &str, position: Position) -> Result<(), ParseError> {
        loop {
            let Some(top) = self.stack.last() else {
                return Err(ParseError::UnexpectedClosingTag {
                    tag: name.to_string(),
                    position,
                });
            };
            if top.name.eq_ignore_ascii_case(name) {
                break;
            }
            if !is_void(&top.name) {
                return Err(ParseError::MismatchedTag {
                    open: top.name.clone(),
                    close: name.to_string(),
                    position,
                });
            }
            if let Some(frame) = self.stack.pop() {
                self.close_implicitly(frame);
            }
        }

        let Some(frame) = self.stack.pop() else {
            return Ok(());
        };
        if is_void(&frame.name) && frame.children.iter().any(|child| !child.is_blank()) {
            warn!(
                tag = %frame.name,
                line = frame.position.line,
                column = frame.position.column,
                "void element has content; the content is dropped"
            );
            self.warnings.push(Warning::VoidElementContent {
                tag: frame.name.clone(),
                position: frame.position,
            });
        }
        self.push_node(MarkupNode::Element(Element {
            name: frame.name,
            attrs: frame.attrs,
            children: frame.children,
            self_closed: false,
            position: frame.position,
        }));
        Ok(())
    }

    fn close_implicitly(&mut self, frame: Frame) {
        self.push_node(MarkupNode::Element(Element {
            name: frame.name,
            attrs: frame.attrs,
            children: Vec::new(),
            self_closed: false,
            position: frame.position,
        }));
        for child in frame.children {
            self.push_node(child);
        }
    }

    fn push_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.push_node(MarkupNode::Text(text.to_string()));
        }
    }

    fn push_node(&mut self, node: MarkupNode) {
        let children = match self.stack.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.root,
        };
        match (children.last_mut(), node) {
            (Some(MarkupNode::Text(prev)), MarkupNode::Text(text)) => prev.push_str(&text),
            (_, node) => children.push(node),
        }
    }
}

fn is_tag_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

/// Read the tag starting at `text[lt] == '<'`. Returns the tag and the offset
/// just past its `>`.
fn read_tag(text: &str, lt: usize, position: Position) -> Result<(Tag<'_>, usize), ParseError> {
    let closing = text[lt + 1..].starts_with('/');
    let name_start = if closing { lt + 2 } else { lt + 1 };
    let name_end = text[name_start..]
        .find(|c: char| !is_tag_name_char(c))
        .map_or(text.len(), |rel| name_start + rel);
    let name = &text[name_start..name_end];

    let Some(gt) = find_tag_end(text, name_end) else {
        return Err(ParseError::UnterminatedTag {
            tag: name.to_string(),
            position,
        });
    };
    let end = gt + 1;
    if closing {
        return Ok((Tag::Close { name }, end));
    }

    let rest = text[name_end..gt].trim_end();
    let (attrs, self_closed) = match rest.strip_suffix('/') {
        Some(attrs) => (attrs, true),
        None => (rest, false),
    };
    Ok((
        Tag::Open {
            name,
            attrs: attrs.trim(),
            self_closed,
        },
        end,
    ))
}

/// Offset of the `>` ending a tag, skipping quoted attribute values.
fn find_tag_end(text: &str, from: usize) -> Option<usize> {
    let mut quote = None;
    for (idx, c) in text[from..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(from + idx),
            (None, _) => {}
        }
    }
    None
}
