use clap::Args;
use eyre::Result;
use wrapgen_codegen::BUILTIN_FUNCTIONS;

/// Filters registered alongside the functions.
const FILTERS: &[(&str, &str)] = &[
    ("snake_case", "convert a string to snake_case"),
    ("pascal_case", "convert a string to PascalCase"),
];

#[derive(Args)]
pub struct FunctionsCommand {}

impl FunctionsCommand {
    pub fn run(&self) -> Result<()> {
        print!("{}", listing());
        Ok(())
    }
}

fn listing() -> String {
    let width = BUILTIN_FUNCTIONS
        .iter()
        .chain(FILTERS)
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or_default();

    let mut out = String::from("Functions:\n");
    for (name, description) in BUILTIN_FUNCTIONS {
        out.push_str(&format!("  {name:<width$}  {description}\n"));
    }
    out.push_str("\nFilters:\n");
    for (name, description) in FILTERS {
        out.push_str(&format!("  {name:<width$}  {description}\n"));
    }
    out
}
