//! Turning raw template output into finished source.
//!
//! ```text
//! raw text → reconcile_imports → format_source → header comments reattached
//! ```

mod format;
mod imports;

pub use format::format_source;
pub use imports::{KNOWN_IMPORTS, RETAINED_TRAITS, reconcile_imports};

use crate::Result;

/// Reconcile imports and format `raw`.
///
/// Plain `//` comments at the top of `raw` survive as a preamble. Comments
/// anywhere else are dropped by the round trip through the syntax tree;
/// doc comments are kept.
pub fn normalize(raw: &str) -> Result<String> {
    let preamble = preamble(raw);
    let reconciled = reconcile_imports(raw)?;
    let formatted = format_source(&reconciled)?;

    Ok(match (preamble.is_empty(), formatted.is_empty()) {
        (true, _) => formatted,
        (false, true) => format!("{preamble}\n"),
        (false, false) => format!("{preamble}\n\n{formatted}"),
    })
}

/// Leading lines that are plain line comments.
fn preamble(raw: &str) -> String {
    raw.lines()
        .take_while(|line| {
            let line = line.trim_start();
            line.starts_with("//") && !line.starts_with("///") && !line.starts_with("//!")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preamble_stops_at_code() {
        let raw = "// one\n// two\n\n// later\nfn a() {}\n";
        assert_eq!(preamble(raw), "// one\n// two");
    }

    #[test]
    fn test_preamble_excludes_doc_comments() {
        assert_eq!(preamble("//! crate docs\nfn a() {}\n"), "");
        assert_eq!(preamble("/// item docs\nfn a() {}\n"), "");
    }

    #[test]
    fn test_normalize_keeps_header() {
        let out = normalize("// Code generated. DO NOT EDIT.\n\nfn   a( ) {}\n").unwrap();
        assert_eq!(out, "// Code generated. DO NOT EDIT.\n\nfn a() {}\n");
    }

    #[test]
    fn test_normalize_without_header() {
        assert_eq!(normalize("struct  S ;").unwrap(), "struct S;\n");
    }

    #[test]
    fn test_normalize_only_comments() {
        assert_eq!(normalize("// nothing here\n").unwrap(), "// nothing here\n");
    }
}
