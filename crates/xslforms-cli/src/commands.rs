mod build;
mod paths;
mod select;

use anyhow::Context;
use anyhow::Result;
use clap::Subcommand;
use xslforms::Form;
use xslforms_conf::Settings;

use crate::args::Args;
use crate::args::InputArgs;
use crate::exit::Exit;
use crate::input::parse_fields;

pub trait Command {
    fn execute(&self, args: &Args, settings: &Settings) -> Result<Exit>;
}

#[derive(Debug, Subcommand)]
pub enum XslformsCommand {
    /// Build documents from a form submission and print them as XML
    Build(self::build::Build),
    /// Resolve the selector fields of a form submission
    Select(self::select::Select),
    /// Print the field name of every element of a document
    Paths(self::paths::Paths),
}

impl Command for XslformsCommand {
    fn execute(&self, args: &Args, settings: &Settings) -> Result<Exit> {
        match self {
            Self::Build(command) => command.execute(args, settings),
            Self::Select(command) => command.execute(args, settings),
            Self::Paths(command) => command.execute(args, settings),
        }
    }
}

/// Read the submission named by `input` and build its documents.
fn submitted_form(input: &InputArgs, settings: &Settings) -> Result<Form> {
    let processor = settings.processor().context("Invalid settings")?;
    let body = input.read()?;
    let fields = parse_fields(&body);
    tracing::debug!(fields = fields.len(), "parsed submission");

    let mut form = Form::new(processor);
    form.set_parameters(fields)
        .context("Failed to build documents")?;
    Ok(form)
}
