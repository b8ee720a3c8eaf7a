//! Interface model.
//!
//! ```text
//! Package → Interface (trait) → Method → Parameter (name + TypeRef)
//! ```
//!
//! Ordering of interfaces and methods is significant: generators emit them
//! in declaration order.

use serde::{Deserialize, Serialize};

use crate::TypeRef;

/// A module and the traits declared in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Module name. May need sanitizing before use as an identifier.
    pub name: String,
    /// Traits in declaration order.
    #[serde(default)]
    pub interfaces: Vec<Interface>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interfaces: Vec::new(),
        }
    }

    /// Add an interface.
    pub fn interface(mut self, interface: Interface) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Look up an interface by name.
    pub fn find(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

/// A trait: a named, ordered set of method signatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    /// Doc comment text, without the `///` markers.
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub methods: Vec<Method>,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            methods: Vec::new(),
        }
    }

    /// Add a method.
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }
}

/// How a trait method takes `self`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Receiver {
    /// `&self`
    #[default]
    Ref,
    /// `&mut self`
    RefMut,
    /// `self`
    Value,
    /// Associated function without a receiver.
    None,
}

impl Receiver {
    /// Rust syntax of the receiver, empty for associated functions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Receiver::Ref => "&self",
            Receiver::RefMut => "&mut self",
            Receiver::Value => "self",
            Receiver::None => "",
        }
    }
}

/// A trait method signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    #[serde(default)]
    pub receiver: Receiver,
    #[serde(default)]
    pub is_async: bool,
    /// Inputs in declaration order, excluding the receiver.
    #[serde(default)]
    pub inputs: Vec<Parameter>,
    /// Named results in declaration order.
    #[serde(default)]
    pub outputs: Vec<Parameter>,
    #[serde(default)]
    pub doc: Option<String>,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            receiver: Receiver::default(),
            is_async: false,
            inputs: Vec::new(),
            outputs: Vec::new(),
            doc: None,
        }
    }

    /// Add an input parameter.
    pub fn input(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.inputs.push(Parameter::new(name, ty));
        self
    }

    /// Add an output parameter.
    pub fn output(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.outputs.push(Parameter::new(name, ty));
        self
    }

    /// Set the receiver.
    pub fn with_receiver(mut self, receiver: Receiver) -> Self {
        self.receiver = receiver;
        self
    }

    /// Mark the method `async`.
    pub fn asynchronous(mut self) -> Self {
        self.is_async = true;
        self
    }

    /// Check if the method returns anything.
    pub fn has_outputs(&self) -> bool {
        !self.outputs.is_empty()
    }
}

/// A named, typed parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Render the parameter type as seen from inside module `target`.
    pub fn render_type(&self, target: &str) -> String {
        self.ty.render(target)
    }

    pub fn is_variadic(&self) -> bool {
        self.ty.is_variadic()
    }
}

/// A module brought into scope by the generated file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Import {
    /// Full path (`std::sync::Arc`, `crate::svc`).
    pub path: String,
    /// Local name the generated code uses. `*` imports everything from `path`.
    pub name: String,
}

impl Import {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Import a path under its own last segment.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit("::").next().unwrap_or_default().to_string();
        Self { path, name }
    }

    /// Last segment of the path.
    pub fn leaf(&self) -> &str {
        self.path.rsplit("::").next().unwrap_or(&self.path)
    }

    /// Path without its last segment, if any.
    pub fn parent(&self) -> Option<&str> {
        self.path.rsplit_once("::").map(|(parent, _)| parent)
    }

    /// Check if the import is a glob import.
    pub fn is_glob(&self) -> bool {
        self.name == "*"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_builder() {
        let method = Method::new("get")
            .input("id", TypeRef::ref_(TypeRef::named("str")))
            .output("v", TypeRef::named("String"));

        assert_eq!(method.receiver, Receiver::Ref);
        assert!(method.has_outputs());
        assert_eq!(method.inputs[0].render_type("svc"), "&str");
    }

    #[test]
    fn test_receiver_syntax() {
        assert_eq!(Receiver::Ref.as_str(), "&self");
        assert_eq!(Receiver::RefMut.as_str(), "&mut self");
        assert_eq!(Receiver::Value.as_str(), "self");
        assert_eq!(Receiver::None.as_str(), "");
    }

    #[test]
    fn test_import_parts() {
        let import = Import::from_path("std::sync::Arc");
        assert_eq!(import.name, "Arc");
        assert_eq!(import.leaf(), "Arc");
        assert_eq!(import.parent(), Some("std::sync"));

        let import = Import::new("serde", "serde");
        assert_eq!(import.parent(), None);
        assert!(!import.is_glob());
    }

    #[test]
    fn test_package_from_toml() {
        let package: Package = toml::from_str(
            r#"
            name = "svc"

            [[interfaces]]
            name = "Fetcher"

            [[interfaces.methods]]
            name = "get"
            inputs = [{ name = "id", ty = "&str" }]
            outputs = [{ name = "v", ty = "String" }, { name = "err", ty = "svc::Error" }]

            [[interfaces.methods]]
            name = "reset"
            receiver = "ref_mut"
            is_async = true
            "#,
        )
        .unwrap();

        let fetcher = package.find("Fetcher").unwrap();
        assert_eq!(fetcher.methods.len(), 2);
        assert_eq!(fetcher.methods[0].outputs[1].render_type("svc"), "Error");
        assert_eq!(fetcher.methods[1].receiver, Receiver::RefMut);
        assert!(fetcher.methods[1].is_async);
    }

    #[test]
    fn test_invalid_type_in_model_is_rejected() {
        let result: Result<Parameter, _> = toml::from_str(
            r#"
            name = "x"
            ty = "Vec<"
            "#,
        );
        assert!(result.is_err());
    }
}
