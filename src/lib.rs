//! # templfmt - Canonical templ Formatter
//!
//! templfmt formats templ template files: HTML-like markup mixed with
//! `{% ... %}` directives (`package`, `import`, `templ` / `endtempl`). A file
//! is parsed into a [`Document`] and written back in one deterministic
//! layout, however the source was spaced.
//!
//! ## Usage
//!
//! ### As a Library
//!
//! ```rust
//! use templfmt::parse_string;
//!
//! let source = r#"{% package views %}
//!
//!
//! {% import "strings" %}
//! {% templ icon() %}<img src="logo.png"></img>{% endtempl %}"#;
//!
//! let document = parse_string(source).unwrap();
//! let mut out = Vec::new();
//! document.write(&mut out).unwrap();
//!
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "{% package views %}\n\n{% import \"strings\" %}\n\n{% templ icon() %}\n\t<img src=\"logo.png\"/>\n{% endtempl %}\n\n"
//! );
//! ```
//!
//! ### As a CLI Tool
//!
//! The `templfmt` binary formats `.templ` files and directories; see
//! `templfmt fmt --help`.
//!
//! ## Modules
//!
//! - [`scanner`] - splits source into directive and literal segments
//! - [`elements`] - the void element table
//! - [`parser`] - builds the [`Document`]
//! - [`formatter`] - canonical output and the public formatting API
//!
//! ## Guarantees
//!
//! - Formatting is idempotent: formatting formatted output changes nothing.
//! - Markup text is never rewritten. Whitespace between nodes may become a
//!   line break and indentation, but it is never added where the source had
//!   none, nor removed where it had some.
//! - Parsing is all or nothing; a malformed file yields a [`ParseError`] with
//!   its position and no partial document.

/// Document model
pub mod ast;

/// HTML void element classification
pub mod elements;

/// Parse errors
pub mod error;

/// Canonical writer and public formatting API
pub mod formatter;

/// Directive and block parser
pub mod parser;

/// Directive/literal scanner
pub mod scanner;

/// Byte offsets to line and column
pub mod source;

mod markup;

pub use ast::{Document, Element, Import, MarkupNode, Node, Package, TemplBlock, Trivia, Warning};
pub use error::ParseError;
pub use formatter::format_source;
pub use parser::parse_string;
pub use source::Position;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_can_be_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Document>();
        assert_send_sync::<ParseError>();
    }
}
