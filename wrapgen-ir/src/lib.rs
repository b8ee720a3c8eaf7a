//! Interface model for the wrapgen code generator.
//!
//! This crate provides the read-only description of the traits a template is
//! rendered against. The model is produced by a collaborator (a parser, a
//! model file, a test) and consumed by `wrapgen-codegen`.
//!
//! # Architecture
//!
//! ```text
//! model.toml → Package (this crate) → template + registry (codegen) → formatted source
//! ```
//!
//! Types are structured rather than stringly typed: a [`TypeRef`] knows which
//! module qualifies it, so rendering a type from inside that module can drop
//! the qualifier with a plain comparison.

mod model;
mod parse;
mod types;
mod verbatim;

pub use model::{Import, Interface, Method, Package, Parameter, Receiver};
pub use parse::ParseTypeError;
pub use types::{GenericArg, TraitKind, TypeRef, VARIADIC_PREFIX};
