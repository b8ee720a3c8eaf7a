//! Binding a template to a function registry.

use std::collections::BTreeSet;

use minijinja::machinery::{self, Instruction};
use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use serde::Serialize;
use wrapgen_core::{to_pascal_case, to_snake_case};
use wrapgen_ir::Interface;

use crate::{Error, FunctionRegistry, Result};

/// Name the template is registered under in the environment.
pub const TEMPLATE_NAME: &str = "template";

/// Variables available at the root of the render context.
pub const CONTEXT_KEYS: &[&str] = &["name", "doc", "methods", "package"];

/// Names the template engine resolves on its own.
const ENGINE_NAMES: &[&str] = &[
    "range", "dict", "debug", "namespace", "lipsum", "cycler", "joiner", "loop", "self", "super",
    "caller", "varargs", "kwargs",
];

/// Root object a template is rendered against: the interface plus the
/// effective package name.
#[derive(Serialize)]
struct RenderContext<'a> {
    #[serde(flatten)]
    interface: &'a Interface,
    package: &'a str,
}

/// A compiled template whose function references are all resolvable.
pub struct Binder<'source> {
    env: Environment<'source>,
}

impl<'source> Binder<'source> {
    /// Compile `source` with the functions in `registry` in scope.
    ///
    /// Fails if the template does not parse or refers to a name that is
    /// neither a registered function nor part of the render context.
    pub fn bind(source: &'source str, registry: &FunctionRegistry) -> Result<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_filter("snake_case", |s: String| to_snake_case(&s));
        env.add_filter("pascal_case", |s: String| to_pascal_case(&s));
        for (name, function) in registry.iter() {
            env.add_global(name.to_string(), function.clone());
        }

        env.add_template(TEMPLATE_NAME, source).map_err(compile_error)?;
        let binder = Self { env };
        binder.check_names(registry)?;
        binder.check_filters_and_tests()?;
        Ok(binder)
    }

    fn check_names(&self, registry: &FunctionRegistry) -> Result<()> {
        let template = self.env.get_template(TEMPLATE_NAME).map_err(compile_error)?;
        let mut unknown: Vec<String> = template
            .undeclared_variables(false)
            .into_iter()
            .filter(|name| {
                !registry.contains(name)
                    && !CONTEXT_KEYS.contains(&name.as_str())
                    && !ENGINE_NAMES.contains(&name.as_str())
            })
            .collect();
        unknown.sort();

        match unknown.first() {
            Some(name) => Err(compile_error(minijinja::Error::new(
                ErrorKind::UnknownFunction,
                format!("`{name}` is not a registered function or template variable"),
            ))),
            None => Ok(()),
        }
    }

    /// Filters and tests are resolved when applied, so an unknown one in a
    /// branch that never runs would otherwise go unnoticed.
    fn check_filters_and_tests(&self) -> Result<()> {
        let template = self.env.get_template(TEMPLATE_NAME).map_err(compile_error)?;
        let compiled = machinery::get_compiled_template(&template);

        let mut filters = BTreeSet::new();
        let mut tests = BTreeSet::new();
        for instructions in std::iter::once(&compiled.instructions).chain(compiled.blocks.values()) {
            for index in 0..instructions.len() {
                let Some(instruction) = index.try_into().ok().and_then(|i| instructions.get(i))
                else {
                    continue;
                };
                match instruction {
                    Instruction::ApplyFilter(name, ..) => {
                        filters.insert(*name);
                    }
                    Instruction::PerformTest(name, ..) => {
                        tests.insert(*name);
                    }
                    _ => {}
                }
            }
        }

        for name in filters {
            let probe = format!("{{{{ none | {name} }}}}");
            if self.missing(&probe, ErrorKind::UnknownFilter) {
                return Err(compile_error(minijinja::Error::new(
                    ErrorKind::UnknownFilter,
                    format!("`{name}` is not a known filter"),
                )));
            }
        }
        for name in tests {
            let probe = format!("{{{{ none is {name} }}}}");
            if self.missing(&probe, ErrorKind::UnknownTest) {
                return Err(compile_error(minijinja::Error::new(
                    ErrorKind::UnknownTest,
                    format!("`{name}` is not a known test"),
                )));
            }
        }
        Ok(())
    }

    /// Whether rendering `source` alone fails with `kind`.
    fn missing(&self, source: &str, kind: ErrorKind) -> bool {
        matches!(self.env.render_str(source, ()), Err(err) if err.kind() == kind)
    }

    /// Render the template for one interface.
    pub fn render(
        &self,
        interface: &Interface,
        package: &str,
    ) -> std::result::Result<String, minijinja::Error> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        template.render(RenderContext { interface, package })
    }
}

fn compile_error(source: minijinja::Error) -> Box<Error> {
    Box::new(Error::TemplateCompile { source })
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use minijinja::Value;
    use wrapgen_ir::Method;

    use super::*;

    fn fetcher() -> Interface {
        Interface::new("Fetcher").method(
            Method::new("get")
                .input("id", "&str".parse().unwrap())
                .output("v", "String".parse().unwrap())
                .output("err", "svc::Error".parse().unwrap()),
        )
    }

    fn builtin() -> FunctionRegistry {
        FunctionRegistry::builtin("svc", &IndexMap::new())
    }

    #[test]
    fn test_render_with_builtins() {
        let source = "{% for m in methods %}fn {{ m.name }}({{ receiver(m) }}, {{ input_parameters(m) }}) {{ output_parameters(m) }}\n{% endfor %}";
        let binder = Binder::bind(source, &builtin()).unwrap();
        let out = binder.render(&fetcher(), "svc").unwrap();
        assert_eq!(out, "fn get(&self, id: &str) -> Result<String, Error>\n");
    }

    #[test]
    fn test_context_exposes_name_and_package() {
        let binder = Binder::bind("{{ package }}::{{ name | snake_case }}", &builtin()).unwrap();
        assert_eq!(binder.render(&fetcher(), "svc").unwrap(), "svc::fetcher");
    }

    #[test]
    fn test_unknown_function_fails_at_bind() {
        let err = Binder::bind("{{ frobnicate(m) }}", &builtin()).err().unwrap();
        assert!(matches!(*err, Error::TemplateCompile { .. }));
    }

    #[test]
    fn test_unknown_filter_fails_at_bind() {
        let err = Binder::bind("{% if doc %}{{ name | frobnicate }}{% endif %}", &builtin())
            .err()
            .unwrap();
        match *err {
            Error::TemplateCompile { source } => {
                assert_eq!(source.kind(), ErrorKind::UnknownFilter)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_test_fails_at_bind() {
        let err = Binder::bind("{% if name is shouty %}x{% endif %}", &builtin())
            .err()
            .unwrap();
        assert!(matches!(*err, Error::TemplateCompile { .. }));
    }

    #[test]
    fn test_builtin_filters_and_tests_bind() {
        let source = "{{ name | snake_case | upper }}{% if methods is defined %}!{% endif %}";
        let binder = Binder::bind(source, &builtin()).unwrap();
        assert_eq!(binder.render(&fetcher(), "svc").unwrap(), "FETCHER!");
    }

    #[test]
    fn test_syntax_error_fails_at_bind() {
        let err = Binder::bind("{% for m in methods %}", &builtin()).err().unwrap();
        assert!(matches!(*err, Error::TemplateCompile { .. }));
    }

    #[test]
    fn test_extension_is_callable() {
        let registry = builtin().merge(
            &FunctionRegistry::new().with("shout", Value::from_function(|s: String| s.to_uppercase())),
        );
        let binder = Binder::bind("{{ shout(name) }}", &registry).unwrap();
        assert_eq!(binder.render(&fetcher(), "svc").unwrap(), "FETCHER");
    }

    #[test]
    fn test_meta_defaults() {
        let mut meta = IndexMap::new();
        meta.insert("field".to_string(), "inner".to_string());
        let registry = FunctionRegistry::builtin("svc", &meta);

        let binder =
            Binder::bind(r#"{{ meta("field") }}/{{ meta("missing", "x") }}/{{ meta("none") }}"#, &registry)
                .unwrap();
        assert_eq!(binder.render(&fetcher(), "svc").unwrap(), "inner/x/");
    }

    #[test]
    fn test_parameter_type_and_missing_doc() {
        let source = "{% if doc %}/// {{ doc }}\n{% endif %}{{ parameter(methods[0].outputs[1]) }}";
        let binder = Binder::bind(source, &builtin()).unwrap();
        assert_eq!(binder.render(&fetcher(), "svc").unwrap(), "Error");
    }

    #[test]
    fn test_output_is_not_escaped() {
        let binder = Binder::bind("{{ output_parameters(methods[0]) }}", &builtin()).unwrap();
        assert_eq!(
            binder.render(&fetcher(), "svc").unwrap(),
            "-> Result<String, Error>"
        );
    }
}
