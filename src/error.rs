//! Parse errors
//!
//! A template either parses completely or not at all. The first malformation
//! found aborts the parse with one of these errors.

use crate::source::Position;
use thiserror::Error;

/// Errors reported by [`parse_string`](crate::parser::parse_string).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `{%` with no matching `%}`.
    #[error("{position}: unterminated directive, expected `%}}`")]
    UnterminatedDirective { position: Position },

    /// The first directive is not `{% package <name> %}`, or there is none.
    #[error("{position}: expected `{{% package <name> %}}` as the first directive")]
    MissingPackage { position: Position },

    /// A second package declaration.
    #[error("{position}: duplicate package declaration, first declared at {first}")]
    DuplicatePackage {
        position: Position,
        first: Position,
    },

    /// A directive whose keyword is known but whose shape is not.
    #[error("{position}: malformed `{keyword}` directive, expected `{{% {expected} %}}`")]
    MalformedDirective {
        keyword: String,
        expected: &'static str,
        position: Position,
    },

    /// A directive that is not valid where it appears.
    #[error("{position}: unexpected directive `{{% {directive} %}}`")]
    UnexpectedDirective {
        directive: String,
        position: Position,
    },

    /// `templ` opened while another block is still open.
    #[error("{position}: `templ` blocks cannot be nested, `{outer}` is still open")]
    NestedTempl { outer: String, position: Position },

    /// End of input inside a `templ` block.
    #[error("{position}: `templ {name}` is missing `{{% endtempl %}}`")]
    UnterminatedTempl { name: String, position: Position },

    /// A closing tag that does not match the innermost open element.
    #[error("{position}: mismatched closing tag `</{close}>`, expected `</{open}>`")]
    MismatchedTag {
        open: String,
        close: String,
        position: Position,
    },

    /// A closing tag with no open element at all.
    #[error("{position}: closing tag `</{tag}>` has no matching opening tag")]
    UnexpectedClosingTag { tag: String, position: Position },

    /// An element still open when its block ends.
    #[error("{position}: element `<{tag}>` is never closed")]
    UnclosedElement { tag: String, position: Position },

    /// A `<tag` with no terminating `>`.
    #[error("{position}: tag `<{tag}` is missing its closing `>`")]
    UnterminatedTag { tag: String, position: Position },
}

impl ParseError {
    /// Where the error was detected.
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnterminatedDirective { position }
            | ParseError::MissingPackage { position }
            | ParseError::DuplicatePackage { position, .. }
            | ParseError::MalformedDirective { position, .. }
            | ParseError::UnexpectedDirective { position, .. }
            | ParseError::NestedTempl { position, .. }
            | ParseError::UnterminatedTempl { position, .. }
            | ParseError::MismatchedTag { position, .. }
            | ParseError::UnexpectedClosingTag { position, .. }
            | ParseError::UnclosedElement { position, .. }
            | ParseError::UnterminatedTag { position, .. } => *position,
        }
    }
}
