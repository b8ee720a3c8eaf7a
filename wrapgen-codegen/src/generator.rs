//! The generation pipeline.
//!
//! ```text
//! validate → header → module + imports → bind template → render interfaces → normalize
//! ```

use std::collections::BTreeSet;

use tracing::{debug, info};
use wrapgen_core::sanitize_ident;
use wrapgen_ir::Package;

use crate::normalize::KNOWN_IMPORTS;
use crate::{
    Binder, CodeBuilder, Error, FunctionRegistry, GenerateOptions, ImportCollector, Result,
    normalize,
};

/// Tool name written into the header comment.
pub const GENERATOR_NAME: &str = "wrapgen";

/// The generated module sees its parent's items through `use super::*`.
const PARENT_MODULE: &str = "super";

/// Generate formatted wrapper source.
pub fn generate(opts: &GenerateOptions<'_>) -> Result<String> {
    let raw = generate_raw(opts)?;
    normalize(&raw)
}

/// Generate wrapper source without reconciling imports or formatting.
pub fn generate_raw(opts: &GenerateOptions<'_>) -> Result<String> {
    let package = opts.package.ok_or_else(|| Box::new(Error::MissingPackage))?;
    let template = opts
        .template
        .as_deref()
        .ok_or_else(|| Box::new(Error::MissingTemplate))?;

    let mut generator = Generator::new(opts, package);
    generator.header();
    generator.module_open();
    let rendered = generator.interfaces(template)?;
    generator.module_close();

    let Generator { name, builder, .. } = generator;
    let raw = builder.build();
    info!(package = %name, interfaces = rendered, bytes = raw.len(), "generated wrappers");
    Ok(raw)
}

struct Generator<'o, 'a> {
    opts: &'o GenerateOptions<'a>,
    package: &'a Package,
    /// Effective module name.
    name: String,
    builder: CodeBuilder,
}

impl<'o, 'a> Generator<'o, 'a> {
    fn new(opts: &'o GenerateOptions<'a>, package: &'a Package) -> Self {
        let name = match &opts.override_package {
            Some(name) => {
                debug!(package = %package.name, name = %name, "overriding package name");
                name.clone()
            }
            None => sanitize_ident(&package.name),
        };
        Self {
            opts,
            package,
            name,
            builder: CodeBuilder::new(),
        }
    }

    fn header(&mut self) {
        self.builder
            .push_line(&format!("// Code generated by {GENERATOR_NAME}. DO NOT EDIT."))
            .push_line(&format!("// Source: {}", self.opts.source))
            .push_blank();
    }

    fn module_open(&mut self) {
        let imports = self.imports();
        self.builder
            .push_line(&format!("pub mod {} {{", self.name))
            .push_indent();
        for line in imports.render() {
            self.builder.push_line(&line);
        }
        self.builder.push_blank().push_dedent();
    }

    /// The parent glob, explicit parent imports for names a well-known std
    /// import would shadow, then the caller's imports.
    fn imports(&self) -> ImportCollector {
        let mut imports = ImportCollector::new();
        imports.add(PARENT_MODULE, "*");
        for name in self.shadowed_names() {
            imports.add(PARENT_MODULE, name);
        }
        for import in &self.opts.imports {
            if import.path == self.name {
                debug!(path = %import.path, "skipping import of the generated module");
                continue;
            }
            imports.add_import(import);
        }
        imports
    }

    /// Parent items named by the selected interfaces that share a name with
    /// an entry of [`KNOWN_IMPORTS`].
    fn shadowed_names(&self) -> BTreeSet<&str> {
        let known = |name: &str| KNOWN_IMPORTS.iter().any(|(std_name, _)| *std_name == name);
        let mut names = BTreeSet::new();
        for interface in &self.package.interfaces {
            if !self.opts.selects(&interface.name) {
                continue;
            }
            if known(interface.name.as_str()) {
                names.insert(interface.name.as_str());
            }
            for method in &interface.methods {
                for param in method.inputs.iter().chain(&method.outputs) {
                    names.extend(
                        param
                            .ty
                            .local_names(&self.name)
                            .into_iter()
                            .filter(|name| known(*name)),
                    );
                }
            }
        }
        names
    }

    /// Render every selected interface. Returns how many were rendered.
    fn interfaces(&mut self, template: &str) -> Result<usize> {
        let registry =
            FunctionRegistry::builtin(&self.name, &self.opts.meta).merge(&self.opts.functions);
        let binder = Binder::bind(template, &registry)?;

        for name in &self.opts.interfaces {
            if self.package.find(name).is_none() {
                debug!(interface = %name, "selected interface not found in package");
            }
        }

        let mut rendered = 0;
        for interface in &self.package.interfaces {
            if !self.opts.selects(&interface.name) {
                debug!(interface = %interface.name, "skipping unselected interface");
                continue;
            }
            debug!(interface = %interface.name, "rendering interface");
            let text = binder.render(interface, &self.name).map_err(|source| {
                Box::new(Error::TemplateRender {
                    interface: interface.name.clone(),
                    source,
                })
            })?;
            self.builder.push_raw(&text).push_blank();
            rendered += 1;
        }
        Ok(rendered)
    }

    fn module_close(&mut self) {
        self.builder.push_line("}");
    }
}

#[cfg(test)]
mod tests {
    use wrapgen_ir::{Import, Interface, Method};

    use super::*;

    fn package() -> Package {
        Package::new("svc").interface(
            Interface::new("Fetcher").method(
                Method::new("get")
                    .input("id", "&str".parse().unwrap())
                    .output("v", "String".parse().unwrap())
                    .output("err", "svc::Error".parse().unwrap()),
            ),
        )
    }

    #[test]
    fn test_raw_layout() {
        let package = package();
        let opts = GenerateOptions::new("svc.rs")
            .with_package(&package)
            .with_template("// {{ name }}\n")
            .with_imports([
                Import::from_path("std::sync::Arc"),
                Import::from_path("std::sync::Mutex"),
                Import::new("svc", "svc"),
            ]);

        insta::assert_snapshot!(generate_raw(&opts).unwrap(), @r"
        // Code generated by wrapgen. DO NOT EDIT.
        // Source: svc.rs

        pub mod svc {
            use super::*;
            use std::sync::{Arc, Mutex};

        // Fetcher

        }
        ");
    }

    #[test]
    fn test_parent_names_shadowing_std_are_imported() {
        let package = Package::new("svc").interface(
            Interface::new("Timer").method(
                Method::new("wait")
                    .input("d", "svc::Duration".parse().unwrap())
                    .output("err", "svc::Error".parse().unwrap()),
            ),
        );
        let opts = GenerateOptions::new("svc.rs")
            .with_package(&package)
            .with_template("");

        let raw = generate_raw(&opts).unwrap();
        assert!(raw.contains("    use super::{*, Duration};\n"));
    }

    #[test]
    fn test_missing_package() {
        let opts = GenerateOptions::new("svc.rs").with_template("");
        let err = generate(&opts).unwrap_err();
        assert!(matches!(*err, Error::MissingPackage));
    }

    #[test]
    fn test_missing_template() {
        let package = package();
        let opts = GenerateOptions::new("svc.rs").with_package(&package);
        let err = generate(&opts).unwrap_err();
        assert!(matches!(*err, Error::MissingTemplate));
    }

    #[test]
    fn test_package_name_is_sanitized() {
        let package = Package::new("my-service");
        let opts = GenerateOptions::new("x.rs")
            .with_package(&package)
            .with_template("");
        assert!(generate_raw(&opts).unwrap().contains("pub mod my_service {"));
    }

    #[test]
    fn test_override_package_changes_stripping() {
        let package = package();
        let opts = GenerateOptions::new("svc.rs")
            .with_package(&package)
            .with_override_package("api")
            .with_template("{% for m in methods %}{{ output_parameters(m) }}{% endfor %}");

        let raw = generate_raw(&opts).unwrap();
        assert!(raw.contains("pub mod api {"));
        assert!(raw.contains("-> (String, svc::Error)"));
    }

    #[test]
    fn test_render_error_names_interface() {
        let package = package();
        let opts = GenerateOptions::new("svc.rs")
            .with_package(&package)
            .with_template("{{ methods[0].nope }}");

        let err = generate_raw(&opts).unwrap_err();
        match *err {
            Error::TemplateRender { interface, .. } => assert_eq!(interface, "Fetcher"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
