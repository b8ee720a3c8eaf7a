//! Loading the model file.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::Deserialize;
use thiserror::Error;
use wrapgen_ir::{Import, Package};

/// Result type for model loading (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(help("pass the model file with --model <path>"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model file")]
    #[diagnostic(code(wrapgen::model_parse))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of a model file.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelFile {
    /// Label for the header comment.
    #[serde(default)]
    pub source: Option<String>,
    pub package: Package,
    #[serde(default)]
    pub imports: Vec<Import>,
    #[serde(default)]
    pub meta: IndexMap<String, String>,
}

impl ModelFile {
    pub fn open(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source,
            })
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    pub fn parse(content: &str, filename: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| {
            Box::new(Error::Parse {
                src: NamedSource::new(filename, content.to_string()),
                span: source.span().map(SourceSpan::from),
                source,
            })
        })
    }
}
