use anyhow::Result;
use clap::Parser;
use clap::ValueEnum;
use serde_json::json;
use serde_json::Value;
use xslforms::xml::to_xml;
use xslforms::Document;
use xslforms::NodeId;
use xslforms::Slot;
use xslforms_conf::Settings;

use crate::args::Args;
use crate::args::InputArgs;
use crate::commands::submitted_form;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Xml,
    Json,
}

#[derive(Debug, Parser)]
pub struct Build {
    #[command(flatten)]
    input: InputArgs,

    /// Only print the document for this model.
    #[arg(long)]
    model: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Xml)]
    format: Format,
}

impl Command for Build {
    fn execute(&self, _args: &Args, settings: &Settings) -> Result<Exit> {
        let form = submitted_form(&self.input, settings)?;

        let selected: Vec<(&String, &Document)> = form
            .documents()
            .iter()
            .filter(|(model, _)| self.model.as_ref().is_none_or(|wanted| wanted == *model))
            .collect();

        if let Some(model) = &self.model {
            if selected.is_empty() {
                return Ok(Exit::error().with_message(format!("No document named '{model}'")));
            }
        }

        for (_, document) in selected {
            match self.format {
                Format::Xml => println!("{}", to_xml(document)?),
                Format::Json => println!("{}", serde_json::to_string_pretty(&to_json(document))?),
            }
        }
        Ok(Exit::success())
    }
}

/// Nested JSON for `document`; vacant slots are `null`.
fn to_json(document: &Document) -> Value {
    fn element(document: &Document, id: NodeId) -> Value {
        let children: Vec<Value> = document
            .children(id)
            .iter()
            .map(|slot| match slot {
                Slot::Vacant => Value::Null,
                Slot::Element(child) => element(document, *child),
            })
            .collect();
        json!({
            "name": document.name(id),
            "attributes": document.element(id).attributes(),
            "children": children,
        })
    }

    element(document, document.root())
}
