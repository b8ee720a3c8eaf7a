use crate::{Error, Result};

/// Parse `src` as a Rust file and print it in canonical layout.
pub fn format_source(src: &str) -> Result<String> {
    let file = syn::parse_file(src).map_err(|e| Error::format(src, e))?;
    Ok(prettyplease::unparse(&file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_layout() {
        let out = format_source("pub mod svc{pub struct A{x:u8}}").unwrap();
        insta::assert_snapshot!(out, @r"
        pub mod svc {
            pub struct A {
                x: u8,
            }
        }
        ");
    }

    #[test]
    fn test_format_is_idempotent() {
        let once = format_source("fn f(a:u8,b:u8)->u8{a+b}").unwrap();
        assert_eq!(format_source(&once).unwrap(), once);
    }

    #[test]
    fn test_format_rejects_invalid_source() {
        let err = format_source("fn f( {").unwrap_err();
        assert!(matches!(*err, Error::Format { .. }));
        assert_eq!(err.raw_source(), Some("fn f( {"));
    }
}
