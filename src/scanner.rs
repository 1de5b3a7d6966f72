//! Directive/literal scanner
//!
//! Splits template source into [`Segment`]s: directive spans delimited by
//! `{%` and `%}`, and the literal runs between them. The scanner only finds
//! boundaries; what a directive means is decided by the parser.
//!
//! # Example
//!
//! ```rust
//! use templfmt::scanner::{Scanner, SegmentKind};
//!
//! let segments: Vec<_> = Scanner::new("{% package test %}\n<p>hi</p>")
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(segments[0].kind, SegmentKind::Directive);
//! assert_eq!(segments[0].text, "package test");
//! assert_eq!(segments[1].text, "\n<p>hi</p>");
//! ```

use crate::error::ParseError;
use crate::source::LineIndex;

const DIRECTIVE_OPEN: &str = "{%";
const DIRECTIVE_CLOSE: &str = "%}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Text between `{%` and `%}`, trimmed
    Directive,
    /// Everything else, verbatim
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
    /// Byte offset of the segment start; for directives this is the `{%`.
    pub offset: usize,
}

/// Lazy segment iterator over a source string
///
/// Cloning a scanner snapshots its position, so a consumer can restart
/// scanning from any earlier point.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            failed: false,
        }
    }

    /// Byte offset of the next segment.
    pub fn offset(&self) -> usize {
        self.pos
    }

    fn scan_directive(&mut self, open: usize) -> Result<Segment<'a>, ParseError> {
        let body_start = open + DIRECTIVE_OPEN.len();
        match self.source[body_start..].find(DIRECTIVE_CLOSE) {
            Some(rel) => {
                let body_end = body_start + rel;
                self.pos = body_end + DIRECTIVE_CLOSE.len();
                Ok(Segment {
                    kind: SegmentKind::Directive,
                    text: self.source[body_start..body_end].trim(),
                    offset: open,
                })
            }
            None => {
                self.failed = true;
                Err(ParseError::UnterminatedDirective {
                    position: LineIndex::new(self.source).position(open),
                })
            }
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Segment<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.source.len() {
            return None;
        }
        let start = self.pos;
        match self.source[start..].find(DIRECTIVE_OPEN) {
            Some(0) => Some(self.scan_directive(start)),
            Some(rel) => {
                self.pos = start + rel;
                Some(Ok(Segment {
                    kind: SegmentKind::Literal,
                    text: &self.source[start..self.pos],
                    offset: start,
                }))
            }
            None => {
                self.pos = self.source.len();
                Some(Ok(Segment {
                    kind: SegmentKind::Literal,
                    text: &self.source[start..],
                    offset: start,
                }))
            }
        }
    }
}

impl std::iter::FusedIterator for Scanner<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<Segment<'_>> {
        Scanner::new(source)
            .collect::<Result<_, _>>()
            .expect("scan failed")
    }

    #[test]
    fn splits_directives_and_literals() {
        let segments = scan("a{% package x %}b\n{%import \"y\"%}");
        let kinds: Vec<_> = segments.iter().map(|s| (s.kind, s.text)).collect();
        assert_eq!(
            kinds,
            vec![
                (SegmentKind::Literal, "a"),
                (SegmentKind::Directive, "package x"),
                (SegmentKind::Literal, "b\n"),
                (SegmentKind::Directive, "import \"y\""),
            ]
        );
    }

    #[test]
    fn records_segment_offsets() {
        let segments = scan("  {% templ a() %}<p></p>");
        assert_eq!(segments[0].offset, 0);
        assert_eq!(segments[1].offset, 2);
        assert_eq!(segments[2].offset, 17);
    }

    #[test]
    fn literal_text_is_verbatim() {
        let segments = scan("\n\n  <br>\t\n");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "\n\n  <br>\t\n");
    }

    #[test]
    fn empty_source_yields_nothing() {
        assert!(scan("").is_empty());
    }

    #[test]
    fn unterminated_directive_reports_its_start_and_stops() {
        let mut scanner = Scanner::new("{% package x %}\n{% import \"y\"");
        assert!(scanner.next().unwrap().is_ok());
        assert!(scanner.next().unwrap().is_ok());
        match scanner.next() {
            Some(Err(ParseError::UnterminatedDirective { position })) => {
                assert_eq!(position.offset, 16);
                assert_eq!(position.line, 2);
            }
            other => panic!("expected unterminated directive, got {other:?}"),
        }
        assert!(scanner.next().is_none());
    }

    #[test]
    fn clones_restart_from_the_same_point() {
        let mut scanner = Scanner::new("{% a %}x{% b %}");
        scanner.next();
        let snapshot = scanner.clone();
        let rest: Vec<_> = scanner.map(|s| s.unwrap().text).collect();
        let again: Vec<_> = snapshot.map(|s| s.unwrap().text).collect();
        assert_eq!(rest, vec!["x", "b"]);
        assert_eq!(rest, again);
    }
}
