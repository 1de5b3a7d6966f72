//! Document model produced by the parser
//!
//! A [`Document`] keeps its top-level nodes in source order. Regrouping
//! (package first, then imports, then blocks) is the formatter's job; the
//! model only records what was written and where.

use crate::elements;
use crate::source::Position;
use std::fmt;

/// A parsed template file
///
/// Only [`parse_string`](crate::parser::parse_string) builds documents, and a
/// document cannot be changed afterwards. The first node is always the one
/// [`Package`].
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
    trailing: Option<String>,
    warnings: Vec<Warning>,
}

impl Document {
    pub(crate) fn new(nodes: Vec<Node>, trailing: Option<String>, warnings: Vec<Warning>) -> Self {
        Self {
            nodes,
            trailing,
            warnings,
        }
    }

    /// Top-level nodes in source order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn package(&self) -> Option<&Package> {
        self.nodes.iter().find_map(|node| match node {
            Node::Package(package) => Some(package),
            _ => None,
        })
    }

    /// Imports in encounter order, duplicates included.
    pub fn imports(&self) -> impl Iterator<Item = &Import> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            Node::Import(import) => Some(import),
            _ => None,
        })
    }

    pub fn templates(&self) -> impl Iterator<Item = &TemplBlock> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            Node::Templ(templ) => Some(templ),
            _ => None,
        })
    }

    /// Free text after the last node, trimmed.
    pub fn trailing(&self) -> Option<&str> {
        self.trailing.as_deref()
    }

    /// Non-fatal findings from parsing.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Package(Package),
    Import(Import),
    Templ(TemplBlock),
}

impl Node {
    pub fn trivia(&self) -> &Trivia {
        match self {
            Node::Package(package) => &package.trivia,
            Node::Import(import) => &import.trivia,
            Node::Templ(templ) => &templ.trivia,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Node::Package(package) => package.position,
            Node::Import(import) => import.position,
            Node::Templ(templ) => templ.position,
        }
    }
}

/// What the source had between the previous node and this one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trivia {
    /// Blank lines directly before the node. The formatter ignores these.
    pub blank_lines: usize,
    /// Non-blank free text before the node, trimmed.
    pub comment: Option<String>,
}

/// `{% package <name> %}`
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub name: String,
    pub trivia: Trivia,
    pub position: Position,
}

/// `{% import <path> %}`
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    /// The path as written, quotes included.
    pub path: String,
    pub trivia: Trivia,
    pub position: Position,
}

/// `{% templ <name>(<params>) %}` ... `{% endtempl %}`
#[derive(Debug, Clone, PartialEq)]
pub struct TemplBlock {
    pub name: String,
    /// Parameter list, not interpreted.
    pub params: String,
    pub body: Vec<MarkupNode>,
    pub trivia: Trivia,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Element(Element),
    Text(String),
}

impl MarkupNode {
    /// Text made only of whitespace.
    pub fn is_blank(&self) -> bool {
        matches!(self, MarkupNode::Text(text) if text.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Tag name as written.
    pub name: String,
    /// Attribute text as written, trimmed.
    pub attrs: String,
    pub children: Vec<MarkupNode>,
    /// The source used `<name/>`.
    pub self_closed: bool,
    pub position: Position,
}

impl Element {
    pub fn is_void(&self) -> bool {
        elements::is_void(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A void element had content between explicit open and close tags. The
    /// content stays in the model but is not written.
    VoidElementContent { tag: String, position: Position },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::VoidElementContent { tag, position } => write!(
                f,
                "{position}: void element `<{tag}>` has content, which is dropped when formatted as `<{tag}/>`"
            ),
        }
    }
}
