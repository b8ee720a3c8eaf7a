use std::io::Read;

use indexmap::IndexMap;
use minijinja::Value;
use wrapgen_ir::{Import, Package};

use crate::{Error, FunctionRegistry, Result};

/// Everything one generation run needs.
///
/// ```
/// use wrapgen_codegen::GenerateOptions;
/// use wrapgen_ir::Package;
///
/// let package = Package::new("svc");
/// let opts = GenerateOptions::new("svc.rs")
///     .with_package(&package)
///     .with_template("{{ name }}")
///     .with_interfaces(["Fetcher"]);
/// assert_eq!(opts.interfaces, vec!["Fetcher".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions<'a> {
    /// Label written into the header comment.
    pub source: String,
    pub package: Option<&'a Package>,
    /// Interfaces to render. Empty renders all of them.
    pub interfaces: Vec<String>,
    pub template: Option<String>,
    /// Module name used instead of the package's own.
    pub override_package: Option<String>,
    pub imports: Vec<Import>,
    /// Strings templates read through `meta(key)`.
    pub meta: IndexMap<String, String>,
    /// Extension functions. Same-named built-ins are replaced.
    pub functions: FunctionRegistry,
}

impl<'a> GenerateOptions<'a> {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_package(mut self, package: &'a Package) -> Self {
        self.package = Some(package);
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Read the template text from `reader`.
    pub fn template_from_reader(mut self, mut reader: impl Read) -> Result<Self> {
        let mut template = String::new();
        reader
            .read_to_string(&mut template)
            .map_err(|source| Box::new(Error::TemplateRead { source }))?;
        self.template = Some(template);
        Ok(self)
    }

    pub fn with_interfaces<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interfaces = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_override_package(mut self, name: impl Into<String>) -> Self {
        self.override_package = Some(name.into());
        self
    }

    pub fn with_import(mut self, import: Import) -> Self {
        self.imports.push(import);
        self
    }

    pub fn with_imports(mut self, imports: impl IntoIterator<Item = Import>) -> Self {
        self.imports.extend(imports);
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Register an extension function.
    pub fn with_function(mut self, name: impl Into<String>, function: Value) -> Self {
        self.functions = self.functions.with(name, function);
        self
    }

    /// Check if an interface passes the allow-list.
    pub fn selects(&self, interface: &str) -> bool {
        self.interfaces.is_empty() || self.interfaces.iter().any(|name| name == interface)
    }
}
