//! Structured type references.
//!
//! A [`TypeRef`] is the type descriptor of a [`Parameter`](crate::Parameter).
//! It renders itself in two notations:
//!
//! - **model notation** (`Display`): fully qualified, variadic parameters
//!   written as `...T`. This is what model files contain and what serde
//!   round-trips.
//! - **Rust notation** ([`TypeRef::render`]): valid Rust type syntax, with
//!   the qualifier of the target module removed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::verbatim;

/// Prefix of a rendered variadic parameter type.
pub const VARIADIC_PREFIX: &str = "impl IntoIterator<Item = ";

/// A type reference as declared on a trait method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// A path type (`String`, `svc::Request`, `Vec<u8>`).
    Path {
        /// Module path before the last segment (`svc`, `std::io`, `::core::fmt`).
        qualifier: Option<String>,
        /// Last path segment.
        name: String,
        /// Generic arguments of the last segment.
        args: Vec<GenericArg>,
    },
    /// A reference (`&T`, `&'a mut T`).
    Reference {
        lifetime: Option<String>,
        mutable: bool,
        inner: Box<TypeRef>,
    },
    /// A slice (`[T]`).
    Slice(Box<TypeRef>),
    /// A fixed size array (`[T; N]`).
    Array { elem: Box<TypeRef>, len: String },
    /// A tuple, including the unit type.
    Tuple(Vec<TypeRef>),
    /// `dyn A + B` or `impl A + B`.
    TraitObject {
        kind: TraitKind,
        bounds: Vec<TypeRef>,
    },
    /// A variable-length trailing argument list of `T`.
    Variadic(Box<TypeRef>),
    /// Any other type (`fn(A) -> B`, `Fn(A)` bounds, `<T as Trait>::X`), in
    /// canonical spacing.
    Verbatim(String),
}

/// Keyword introducing a trait object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraitKind {
    Dyn,
    Impl,
}

impl TraitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraitKind::Dyn => "dyn",
            TraitKind::Impl => "impl",
        }
    }
}

/// A generic argument of a path type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenericArg {
    /// A type argument (`T` in `Vec<T>`).
    Type(TypeRef),
    /// An associated type binding (`Item = T`).
    Binding { name: String, ty: TypeRef },
    /// A lifetime argument, including the leading apostrophe.
    Lifetime(String),
    /// A const argument, as written.
    Const(String),
}

#[derive(Clone, Copy)]
enum Notation<'a> {
    Model,
    Rust { target: &'a str },
}

impl TypeRef {
    /// Create an unqualified path type without generic arguments.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Path {
            qualifier: None,
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a path type qualified by a module path.
    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Path {
            qualifier: Some(qualifier.into()),
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a generic path type (`Vec<T>`, `HashMap<K, V>`).
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self::Path {
            qualifier: None,
            name: name.into(),
            args: args.into_iter().map(GenericArg::Type).collect(),
        }
    }

    /// Create a shared reference.
    pub fn ref_(inner: TypeRef) -> Self {
        Self::Reference {
            lifetime: None,
            mutable: false,
            inner: Box::new(inner),
        }
    }

    /// Create a mutable reference.
    pub fn ref_mut(inner: TypeRef) -> Self {
        Self::Reference {
            lifetime: None,
            mutable: true,
            inner: Box::new(inner),
        }
    }

    /// Create a slice type.
    pub fn slice(elem: TypeRef) -> Self {
        Self::Slice(Box::new(elem))
    }

    /// Create a variadic parameter type of `elem`.
    pub fn variadic(elem: TypeRef) -> Self {
        Self::Variadic(Box::new(elem))
    }

    /// Check if this is a variadic parameter type.
    pub fn is_variadic(&self) -> bool {
        matches!(self, Self::Variadic(_))
    }

    /// The module qualifier of a path type.
    pub fn qualifier(&self) -> Option<&str> {
        match self {
            Self::Path { qualifier, .. } => qualifier.as_deref(),
            _ => None,
        }
    }

    /// Names of the path types qualified by exactly `target`, at any depth.
    /// Verbatim types are not searched.
    pub fn local_names(&self, target: &str) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_local_names(target, &mut names);
        names
    }

    fn collect_local_names<'s>(&'s self, target: &str, names: &mut Vec<&'s str>) {
        match self {
            Self::Path {
                qualifier,
                name,
                args,
            } => {
                if qualifier.as_deref() == Some(target) {
                    names.push(name.as_str());
                }
                for arg in args {
                    if let GenericArg::Type(ty) | GenericArg::Binding { ty, .. } = arg {
                        ty.collect_local_names(target, names);
                    }
                }
            }
            Self::Reference { inner, .. }
            | Self::Slice(inner)
            | Self::Array { elem: inner, .. }
            | Self::Variadic(inner) => inner.collect_local_names(target, names),
            Self::Tuple(elems) | Self::TraitObject { bounds: elems, .. } => {
                for elem in elems {
                    elem.collect_local_names(target, names);
                }
            }
            Self::Verbatim(_) => {}
        }
    }

    /// Render as Rust type syntax from inside the module `target`.
    ///
    /// Every path qualified by exactly `target` loses its qualifier, at any
    /// nesting depth. Other qualifiers, including longer paths that merely end
    /// in `target` (`crate::svc` for target `svc`), are kept.
    pub fn render(&self, target: &str) -> String {
        let mut out = String::new();
        self.write(&mut out, Notation::Rust { target });
        out
    }

    fn write(&self, out: &mut String, notation: Notation<'_>) {
        match self {
            Self::Path {
                qualifier,
                name,
                args,
            } => {
                if let Some(qualifier) = qualifier {
                    let strip = match notation {
                        Notation::Rust { target } => qualifier == target,
                        Notation::Model => false,
                    };
                    if !strip {
                        out.push_str(qualifier);
                        out.push_str("::");
                    }
                }
                out.push_str(name);
                if !args.is_empty() {
                    out.push('<');
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        arg.write(out, notation);
                    }
                    out.push('>');
                }
            }
            Self::Reference {
                lifetime,
                mutable,
                inner,
            } => {
                out.push('&');
                if let Some(lifetime) = lifetime {
                    out.push_str(lifetime);
                    out.push(' ');
                }
                if *mutable {
                    out.push_str("mut ");
                }
                inner.write(out, notation);
            }
            Self::Slice(elem) => {
                out.push('[');
                elem.write(out, notation);
                out.push(']');
            }
            Self::Array { elem, len } => {
                out.push('[');
                elem.write(out, notation);
                out.push_str("; ");
                out.push_str(len);
                out.push(']');
            }
            Self::Tuple(elems) => {
                out.push('(');
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    elem.write(out, notation);
                }
                if elems.len() == 1 {
                    out.push(',');
                }
                out.push(')');
            }
            Self::TraitObject { kind, bounds } => {
                out.push_str(kind.as_str());
                out.push(' ');
                for (i, bound) in bounds.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" + ");
                    }
                    bound.write(out, notation);
                }
            }
            Self::Variadic(elem) => match notation {
                Notation::Model => {
                    out.push_str("...");
                    elem.write(out, notation);
                }
                Notation::Rust { .. } => {
                    out.push_str(VARIADIC_PREFIX);
                    elem.write(out, notation);
                    out.push('>');
                }
            },
            Self::Verbatim(text) => match notation {
                Notation::Model => out.push_str(text),
                Notation::Rust { target } => out.push_str(&verbatim::render(text, target)),
            },
        }
    }
}

impl GenericArg {
    fn write(&self, out: &mut String, notation: Notation<'_>) {
        match self {
            GenericArg::Type(ty) => ty.write(out, notation),
            GenericArg::Binding { name, ty } => {
                out.push_str(name);
                out.push_str(" = ");
                ty.write(out, notation);
            }
            GenericArg::Lifetime(text) | GenericArg::Const(text) => out.push_str(text),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write(&mut out, Notation::Model);
        f.write_str(&out)
    }
}

impl From<TypeRef> for String {
    fn from(ty: TypeRef) -> Self {
        ty.to_string()
    }
}
