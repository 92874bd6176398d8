use anyhow::Result;
use clap::Parser;
use xslforms::output::path_to_node;
use xslforms::output::PathReference;
use xslforms::NodeRef;
use xslforms_conf::Settings;

use crate::args::Args;
use crate::args::InputArgs;
use crate::commands::submitted_form;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Select {
    #[command(flatten)]
    input: InputArgs,

    /// Create missing elements along selector paths.
    #[arg(long)]
    create: bool,
}

impl Command for Select {
    fn execute(&self, _args: &Args, settings: &Settings) -> Result<Exit> {
        let mut form = submitted_form(&self.input, settings)?;
        let selectors = form.selectors(self.create || settings.create_selectors)?;

        for (name, selections) in &selectors {
            if selections.is_empty() {
                tracing::info!(selector = %name, "selector matched nothing");
            }
            for selection in selections {
                let Some(document) = form.document(&selection.model) else {
                    continue;
                };
                let reference = match &selection.node {
                    NodeRef::Element(_) => PathReference::Element,
                    NodeRef::Attribute { name: attribute, .. } => {
                        PathReference::Attribute(Some(attribute.as_str()))
                    }
                };
                println!(
                    "{name}\t{}",
                    path_to_node(document, &selection.node, reference)
                );
            }
        }
        Ok(Exit::success())
    }
}
