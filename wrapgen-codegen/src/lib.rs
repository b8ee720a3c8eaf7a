//! Template-driven wrapper generation for Rust traits.
//!
//! Given a [`Package`](wrapgen_ir::Package) of traits and a minijinja
//! template, [`generate`] renders the template once per selected trait into
//! a `pub mod` named after the package, then reconciles imports and formats
//! the result.
//!
//! # Module Organization
//!
//! - [`registry`] - Built-in template functions and the registry type
//! - [`Binder`] - Compiles a template against a registry
//! - [`normalize`] - Import reconciliation and formatting
//!
//! # Example
//!
//! ```
//! use wrapgen_codegen::{GenerateOptions, generate};
//! use wrapgen_ir::{Interface, Method, Package};
//!
//! let package = Package::new("svc").interface(
//!     Interface::new("Fetcher").method(Method::new("ping")),
//! );
//! let template = "{% for m in methods %}pub fn {{ m.name }}() {}\n{% endfor %}";
//!
//! let out = generate(
//!     &GenerateOptions::new("svc.rs")
//!         .with_package(&package)
//!         .with_template(template),
//! )
//! .unwrap();
//! assert!(out.contains("pub fn ping() {}"));
//! ```

mod binder;
mod code_builder;
mod error;
mod generator;
mod imports;
pub mod normalize;
mod options;
pub mod registry;

pub use binder::{Binder, CONTEXT_KEYS, TEMPLATE_NAME};
pub use code_builder::CodeBuilder;
pub use error::{Error, Result};
pub use generator::{GENERATOR_NAME, generate, generate_raw};
pub use imports::ImportCollector;
pub use normalize::{format_source, normalize, reconcile_imports};
pub use options::GenerateOptions;
pub use registry::{BUILTIN_FUNCTIONS, FunctionRegistry};
