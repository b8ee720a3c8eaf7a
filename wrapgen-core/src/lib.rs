//! Core utilities for the wrapgen code generator.
//!
//! This crate provides identifier handling and file helpers shared by the
//! engine and the command line.

mod file;
mod sanitize;
mod utils;

// File operations
pub use file::{OutputFile, WriteResult};
// Identifiers
pub use sanitize::{FALLBACK_IDENT, RUST_KEYWORDS, is_rust_keyword, sanitize_ident};
// String utilities
pub use utils::{to_pascal_case, to_snake_case};
