use std::{fs::File, path::PathBuf};

use clap::Args;
use eyre::{Context, Result};
use tracing::debug;
use wrapgen_codegen::{GenerateOptions, generate, generate_raw};
use wrapgen_core::{OutputFile, WriteResult};

use super::UnwrapOrExit;
use crate::model::ModelFile;

#[derive(Args)]
pub struct GenerateCommand {
    /// Path to the model file (defaults to ./wrapgen.toml)
    #[arg(short, long, default_value = "wrapgen.toml")]
    pub model: PathBuf,

    /// Path to the template
    #[arg(short, long)]
    pub template: PathBuf,

    /// Output file (prints to stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only render this interface (repeatable)
    #[arg(short, long = "interface")]
    pub interfaces: Vec<String>,

    /// Module name to generate instead of the package name
    #[arg(short, long)]
    pub package: Option<String>,

    /// Template metadata as KEY=VALUE (repeatable, overrides the model file)
    #[arg(long, value_parser = parse_key_value)]
    pub meta: Vec<(String, String)>,

    /// Source label for the header comment
    #[arg(long)]
    pub source: Option<String>,

    /// Skip import reconciliation and formatting
    #[arg(long)]
    pub raw: bool,
}

impl GenerateCommand {
    /// Run the generate command
    pub fn run(&self) -> Result<()> {
        let model = ModelFile::open(&self.model).unwrap_or_exit();
        let template = File::open(&self.template)
            .wrap_err_with(|| format!("failed to open template '{}'", self.template.display()))?;

        let opts = self
            .options(&model)
            .template_from_reader(template)
            .unwrap_or_exit();
        let generated = if self.raw {
            generate_raw(&opts)
        } else {
            generate(&opts)
        };
        let output = generated.unwrap_or_exit();

        match &self.output {
            Some(path) => {
                let file = OutputFile::new(path, output);
                match file.write()? {
                    WriteResult::Written => eprintln!("Generated: {}", file.path().display()),
                    WriteResult::Unchanged => eprintln!("Unchanged: {}", file.path().display()),
                }
            }
            None => print!("{output}"),
        }
        Ok(())
    }

    /// Options for `model`, without the template.
    fn options<'m>(&self, model: &'m ModelFile) -> GenerateOptions<'m> {
        let source = self
            .source
            .clone()
            .or_else(|| model.source.clone())
            .unwrap_or_else(|| self.model.display().to_string());

        let mut opts = GenerateOptions::new(source)
            .with_package(&model.package)
            .with_interfaces(self.interfaces.iter().cloned())
            .with_imports(model.imports.iter().cloned());
        for (key, value) in model.meta.iter().chain(self.meta.iter().map(|(k, v)| (k, v))) {
            opts = opts.with_meta(key.as_str(), value.as_str());
        }
        if let Some(package) = &self.package {
            opts = opts.with_override_package(package.as_str());
        }
        debug!(source = %opts.source, meta = opts.meta.len(), "prepared generation options");
        opts
    }
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
