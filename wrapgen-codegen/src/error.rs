use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Result type for generation (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("no package to generate from")]
    #[diagnostic(
        code(wrapgen::missing_package),
        help("pass a package with `GenerateOptions::with_package`")
    )]
    MissingPackage,

    #[error("no template to render")]
    #[diagnostic(
        code(wrapgen::missing_template),
        help("pass a template with `GenerateOptions::with_template`")
    )]
    MissingTemplate,

    #[error("failed to read template")]
    #[diagnostic(code(wrapgen::template_read))]
    TemplateRead {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to compile template")]
    #[diagnostic(code(wrapgen::template_compile))]
    TemplateCompile {
        #[source]
        source: minijinja::Error,
    },

    #[error("failed to render template for interface '{interface}'")]
    #[diagnostic(code(wrapgen::template_render))]
    TemplateRender {
        interface: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("failed to reconcile imports: {source}")]
    #[diagnostic(
        code(wrapgen::imports),
        help("the template produced source that does not parse as Rust")
    )]
    Imports {
        #[source_code]
        raw: String,
        #[label("does not parse")]
        span: Option<SourceSpan>,
        source: syn::Error,
    },

    #[error("failed to format generated source: {source}")]
    #[diagnostic(code(wrapgen::format))]
    Format {
        #[source_code]
        raw: String,
        #[label("does not parse")]
        span: Option<SourceSpan>,
        source: syn::Error,
    },
}

impl Error {
    /// Create an import reconciliation error carrying the offending text.
    pub fn imports(raw: &str, source: syn::Error) -> Box<Self> {
        Box::new(Error::Imports {
            span: span_of(&source, raw),
            raw: raw.to_string(),
            source,
        })
    }

    /// Create a formatting error carrying the offending text.
    pub fn format(raw: &str, source: syn::Error) -> Box<Self> {
        Box::new(Error::Format {
            span: span_of(&source, raw),
            raw: raw.to_string(),
            source,
        })
    }

    /// The unformatted text a normalization error was raised on.
    pub fn raw_source(&self) -> Option<&str> {
        match self {
            Error::Imports { raw, .. } | Error::Format { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Byte span of a parse error inside `src`.
fn span_of(err: &syn::Error, src: &str) -> Option<SourceSpan> {
    let start = err.span().start();
    if start.line == 0 {
        return None;
    }

    let mut lines = src.split_inclusive('\n');
    let offset: usize = lines.by_ref().take(start.line - 1).map(str::len).sum();
    let line = lines.next().unwrap_or_default();
    let column = line
        .char_indices()
        .nth(start.column)
        .map_or(line.len(), |(i, _)| i);

    let at = offset + column;
    let len = usize::from(at < src.len());
    Some(SourceSpan::from((at.min(src.len()), len)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_points_at_parse_error() {
        let src = "fn ok() {}\nfn broken() -> {}\n";
        let err = syn::parse_file(src).unwrap_err();
        let span = span_of(&err, src).expect("span");
        assert!(span.offset() >= "fn ok() {}\n".len());
        assert!(span.offset() <= src.len());
    }

    #[test]
    fn test_raw_source_is_attached() {
        let err = syn::parse_file("struct").unwrap_err();
        let err = Error::format("struct", err);
        assert_eq!(err.raw_source(), Some("struct"));
        assert!(err.to_string().starts_with("failed to format generated source"));
    }

    #[test]
    fn test_raw_source_absent_for_input_errors() {
        assert_eq!(Error::MissingPackage.raw_source(), None);
        assert_eq!(Error::MissingTemplate.to_string(), "no template to render");
    }
}
