//! Line-oriented text buffer for the generated file.

/// One level of indentation.
const INDENT: &str = "    ";

/// Buffer that writes indented lines and raw template output.
///
/// ```
/// use wrapgen_codegen::CodeBuilder;
///
/// let mut builder = CodeBuilder::new();
/// builder
///     .push_line("pub mod svc {")
///     .push_indent()
///     .push_line("use std::sync::Arc;")
///     .push_dedent()
///     .push_line("}");
///
/// assert_eq!(builder.build(), "pub mod svc {\n    use std::sync::Arc;\n}\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CodeBuilder {
    indent_level: usize,
    buffer: String,
}

impl CodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line with current indentation.
    pub fn push_line(&mut self, s: &str) -> &mut Self {
        for _ in 0..self.indent_level {
            self.buffer.push_str(INDENT);
        }
        self.buffer.push_str(s);
        self.buffer.push('\n');
        self
    }

    pub fn push_blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    /// Add text verbatim, without indentation or newline.
    pub fn push_raw(&mut self, s: &str) -> &mut Self {
        self.buffer.push_str(s);
        self
    }

    pub fn push_indent(&mut self) -> &mut Self {
        self.indent_level += 1;
        self
    }

    pub fn push_dedent(&mut self) -> &mut Self {
        self.indent_level = self.indent_level.saturating_sub(1);
        self
    }

    /// Consume the builder and return the text.
    pub fn build(self) -> String {
        self.buffer
    }
}
