//! Functions templates call to introspect methods and parameters.
//!
//! Every built-in is a plain function over the model, so the rendering rules
//! can be tested without a template engine. [`FunctionRegistry::builtin`]
//! wraps them as template callables bound to one target module.

use std::sync::Arc;

use indexmap::IndexMap;
use minijinja::Value;
use minijinja::value::ViaDeserialize;
use tracing::debug;
use wrapgen_ir::{Method, Parameter};

/// Rendered type that marks an output as the method's error.
pub const ERROR_TYPE: &str = "Error";

/// Appended to a variadic argument at a call site.
pub const EXPANSION_SUFFIX: &str = ".into_iter()";

/// Built-in template functions and what they return.
pub const BUILTIN_FUNCTIONS: &[(&str, &str)] = &[
    ("input_parameters", "inputs as `name: Type` pairs, comma separated"),
    ("input_calls", "input names for a call site, variadics expanded"),
    ("input_var_type", "name of the first input of the given type"),
    ("output_parameters", "return clause, `-> T` or empty"),
    ("output_vars", "all output names, error output included"),
    ("output_var_type", "name of the first output of the given type"),
    ("output_var_error", "name of the first output of type `Error`"),
    ("return", "`return` if the method has outputs"),
    ("receiver", "`&self`, `&mut self`, `self` or empty"),
    ("asyncness", "`async` for async methods"),
    ("dot_await", "`.await` for async methods"),
    ("parameter", "a parameter's type as seen from the target module"),
    ("meta", "a user-supplied string, or the default"),
];

/// Inputs as `name: Type` pairs.
pub fn input_parameters(method: &Method, target: &str) -> String {
    method
        .inputs
        .iter()
        .map(|p| format!("{}: {}", p.name, p.render_type(target)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Input names as call arguments. Variadic inputs are expanded.
pub fn input_calls(method: &Method) -> String {
    method
        .inputs
        .iter()
        .map(|p| {
            if p.is_variadic() {
                format!("{}{EXPANSION_SUFFIX}", p.name)
            } else {
                p.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Name of the first input whose rendered type is `ty`, or empty.
pub fn input_var_type(method: &Method, target: &str, ty: &str) -> String {
    first_of_type(&method.inputs, target, ty)
}

/// Return clause for the method's outputs.
///
/// An output of type [`ERROR_TYPE`] turns the clause into a `Result` whose
/// success side carries the remaining outputs: `()`, the single type, or a
/// tuple. Without an error output the clause is the single type or a tuple.
pub fn output_parameters(method: &Method, target: &str) -> String {
    if method.outputs.is_empty() {
        return String::new();
    }

    let mut types: Vec<String> = method.outputs.iter().map(|p| p.render_type(target)).collect();
    match types.iter().position(|ty| ty == ERROR_TYPE) {
        Some(index) => {
            let error = types.remove(index);
            format!("-> Result<{}, {error}>", tuple(&types))
        }
        None => format!("-> {}", tuple(&types)),
    }
}

/// Output names, comma separated.
///
/// Every output is listed, including the error output that
/// [`output_parameters`] folds into `Result`. A template destructuring a
/// `Result` call binds the success side itself and uses
/// [`output_var_error`] for the error name.
pub fn output_vars(method: &Method) -> String {
    method
        .outputs
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Name of the first output whose rendered type is `ty`, or empty.
pub fn output_var_type(method: &Method, target: &str, ty: &str) -> String {
    first_of_type(&method.outputs, target, ty)
}

/// Name of the first error output, or empty.
pub fn output_var_error(method: &Method, target: &str) -> String {
    output_var_type(method, target, ERROR_TYPE)
}

/// The `return` keyword when the method has outputs.
pub fn return_keyword(method: &Method) -> &'static str {
    if method.has_outputs() { "return" } else { "" }
}

pub fn receiver(method: &Method) -> &'static str {
    method.receiver.as_str()
}

pub fn asyncness(method: &Method) -> &'static str {
    if method.is_async { "async" } else { "" }
}

pub fn dot_await(method: &Method) -> &'static str {
    if method.is_async { ".await" } else { "" }
}

fn first_of_type(params: &[Parameter], target: &str, ty: &str) -> String {
    params
        .iter()
        .find(|p| p.render_type(target) == ty)
        .map(|p| p.name.clone())
        .unwrap_or_default()
}

fn tuple(types: &[String]) -> String {
    match types {
        [] => "()".to_string(),
        [single] => single.clone(),
        many => format!("({})", many.join(", ")),
    }
}

/// Named template functions.
///
/// Registries are assembled up front and not modified once generation
/// starts; [`FunctionRegistry::merge`] produces a new one.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: IndexMap<String, Value>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in functions, bound to `target` and `meta`.
    pub fn builtin(target: &str, meta: &IndexMap<String, String>) -> Self {
        let target: Arc<str> = Arc::from(target);
        let meta = Arc::new(meta.clone());

        Self::new()
            .with("input_parameters", method_fn(&target, input_parameters))
            .with("input_calls", method_fn(&target, |m, _| input_calls(m)))
            .with("input_var_type", typed_fn(&target, input_var_type))
            .with("output_parameters", method_fn(&target, output_parameters))
            .with("output_vars", method_fn(&target, |m, _| output_vars(m)))
            .with("output_var_type", typed_fn(&target, output_var_type))
            .with("output_var_error", method_fn(&target, output_var_error))
            .with("return", method_fn(&target, |m, _| return_keyword(m).to_string()))
            .with("receiver", method_fn(&target, |m, _| receiver(m).to_string()))
            .with("asyncness", method_fn(&target, |m, _| asyncness(m).to_string()))
            .with("dot_await", method_fn(&target, |m, _| dot_await(m).to_string()))
            .with("parameter", {
                let target = Arc::clone(&target);
                Value::from_function(move |param: ViaDeserialize<Parameter>| -> String {
                    param.0.render_type(&target)
                })
            })
            .with(
                "meta",
                Value::from_function(move |key: String, default: Option<String>| -> String {
                    meta.get(&key).cloned().or(default).unwrap_or_default()
                }),
            )
    }

    /// Add a function, replacing any function of the same name.
    pub fn with(mut self, name: impl Into<String>, function: Value) -> Self {
        self.functions.insert(name.into(), function);
        self
    }

    /// Combine `self` with `extensions`. Extensions win on name clashes.
    pub fn merge(&self, extensions: &FunctionRegistry) -> FunctionRegistry {
        let mut functions = self.functions.clone();
        for (name, function) in &extensions.functions {
            if functions.insert(name.clone(), function.clone()).is_some() {
                debug!(function = %name, "extension overrides built-in function");
            }
        }
        FunctionRegistry { functions }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Iterate over functions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.functions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

fn method_fn<F>(target: &Arc<str>, f: F) -> Value
where
    F: Fn(&Method, &str) -> String + Send + Sync + 'static,
{
    let target = Arc::clone(target);
    Value::from_function(move |method: ViaDeserialize<Method>| -> String { f(&method.0, &target) })
}

fn typed_fn<F>(target: &Arc<str>, f: F) -> Value
where
    F: Fn(&Method, &str, &str) -> String + Send + Sync + 'static,
{
    let target = Arc::clone(target);
    Value::from_function(move |method: ViaDeserialize<Method>, ty: String| -> String {
        f(&method.0, &target, &ty)
    })
}
