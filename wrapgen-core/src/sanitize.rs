//! Identifier sanitizing.

use unicode_ident::{is_xid_continue, is_xid_start};

/// Identifier used when sanitizing leaves nothing meaningful.
pub const FALLBACK_IDENT: &str = "x";

/// Strict and reserved Rust keywords.
pub const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "gen", "macro",
    "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Check if a name is a Rust keyword.
pub fn is_rust_keyword(name: &str) -> bool {
    RUST_KEYWORDS.contains(&name)
}

/// Turn an arbitrary string into a valid Rust identifier.
///
/// The first character must be `XID_Start` or `_`, the rest `XID_Continue`;
/// anything else becomes `_`. A result of nothing or a lone
/// `_` is replaced by [`FALLBACK_IDENT`], and keywords get a trailing `_`.
///
/// ```
/// use wrapgen_core::sanitize_ident;
///
/// assert_eq!(sanitize_ident("a-b.c"), "a_b_c");
/// assert_eq!(sanitize_ident("123"), "_23");
/// assert_eq!(sanitize_ident(""), "x");
/// ```
pub fn sanitize_ident(raw: &str) -> String {
    let mut ident = String::with_capacity(raw.len());
    for c in raw.chars() {
        let valid = if ident.is_empty() {
            is_xid_start(c) || c == '_'
        } else {
            is_xid_continue(c)
        };
        ident.push(if valid { c } else { '_' });
    }

    if ident.is_empty() || ident == "_" {
        return FALLBACK_IDENT.to_string();
    }
    if is_rust_keyword(&ident) {
        ident.push('_');
    }
    ident
}
