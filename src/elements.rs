//! HTML void element table
//!
//! Void elements cannot have children, so the formatter always writes them in
//! self-closing form.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Lower-case names of the void elements
pub static VOID_ELEMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
        "meta", "param", "source", "track", "wbr",
    ]
    .into_iter()
    .collect()
});

/// Whether `tag` names a void element, ignoring ASCII case.
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(tag.to_ascii_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_entry_is_void() {
        for tag in VOID_ELEMENTS.iter() {
            assert!(is_void(tag), "{tag}");
        }
        assert_eq!(VOID_ELEMENTS.len(), 16);
    }

    #[test]
    fn lookup_ignores_case() {
        assert!(is_void("BR"));
        assert!(is_void("Img"));
    }

    #[test]
    fn ordinary_and_partial_names_are_not_void() {
        for tag in ["div", "p", "span", "b", "brr", "im", "", "input-group"] {
            assert!(!is_void(tag), "{tag}");
        }
    }
}
