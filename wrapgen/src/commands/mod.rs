mod functions;
mod generate;

use clap::{Parser, Subcommand};
use eyre::Result;
use functions::FunctionsCommand;
use generate::GenerateCommand;

/// Extension trait for exiting on library errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

fn exit_with(report: miette::Report) -> ! {
    eprintln!("{report:?}");
    std::process::exit(1);
}

impl<T> UnwrapOrExit<T> for crate::model::Result<T> {
    fn unwrap_or_exit(self) -> T {
        self.unwrap_or_else(|e| exit_with(miette::Report::new(*e)))
    }
}

impl<T> UnwrapOrExit<T> for wrapgen_codegen::Result<T> {
    fn unwrap_or_exit(self) -> T {
        self.unwrap_or_else(|e| exit_with(miette::Report::new(*e)))
    }
}

#[derive(Parser)]
#[command(name = "wrapgen")]
#[command(version)]
#[command(about = "Generate wrappers for Rust traits from templates")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Generate(cmd) => cmd.run(),
            Commands::Functions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template for each trait in a model file
    Generate(GenerateCommand),

    /// List the functions available to templates
    Functions(FunctionsCommand),
}
