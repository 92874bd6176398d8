use anyhow::Context;
use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use xslforms::output::path_to_node;
use xslforms::output::PathReference;
use xslforms::xml::from_xml;
use xslforms::Document;
use xslforms::Documents;
use xslforms::NodeRef;
use xslforms_conf::Settings;

use crate::args::Args;
use crate::args::InputArgs;
use crate::commands::submitted_form;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Paths {
    #[command(flatten)]
    input: InputArgs,

    /// Read the document from an XML file instead of a submission.
    #[arg(long, conflicts_with = "input")]
    xml: Option<Utf8PathBuf>,

    /// Also print the field name and value of every attribute.
    #[arg(long)]
    attributes: bool,
}

impl Command for Paths {
    fn execute(&self, _args: &Args, settings: &Settings) -> Result<Exit> {
        let documents = match &self.xml {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {path}"))?;
                let document =
                    from_xml(&text).with_context(|| format!("Failed to parse {path}"))?;
                let mut documents = Documents::new();
                documents.insert(document.name(document.root()).to_string(), document);
                documents
            }
            None => submitted_form(&self.input, settings)?.documents().clone(),
        };

        for (_, document) in &documents {
            self.print_document(document);
        }
        Ok(Exit::success())
    }
}

impl Paths {
    fn print_document(&self, document: &Document) {
        for id in document.descendants() {
            let node = NodeRef::Element(id);
            println!("{}", path_to_node(document, &node, PathReference::Element));

            if self.attributes {
                for (name, value) in document.element(id).attributes() {
                    let reference = PathReference::Attribute(Some(name.as_str()));
                    let path = path_to_node(document, &node, reference);
                    println!("{path}\t{value}");
                }
            }
        }
    }
}
