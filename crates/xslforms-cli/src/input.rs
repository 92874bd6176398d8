use std::io::Read as _;

use anyhow::Context;
use anyhow::Result;
use percent_encoding::percent_decode;
use rustc_hash::FxHashMap;
use xslforms::Field;
use xslforms::FieldValue;
use xslforms::RawValue;

use crate::args::InputArgs;

impl InputArgs {
    /// The raw body, from the named file or stdin.
    pub fn read(&self) -> Result<Vec<u8>> {
        match &self.input {
            Some(path) => std::fs::read(path).with_context(|| format!("Failed to read {path}")),
            None => {
                let mut body = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut body)
                    .context("Failed to read stdin")?;
                Ok(body)
            }
        }
    }
}

/// Split an `application/x-www-form-urlencoded` body into fields.
///
/// Values stay undecoded bytes so the configured encoding applies to them.
/// A name given more than once becomes a single field holding every value,
/// at the position of its first occurrence.
pub fn parse_fields(body: &[u8]) -> Vec<Field> {
    let body = body.trim_ascii_end();
    let mut fields: Vec<Field> = Vec::new();
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();

    for pair in body.split(|byte| *byte == b'&') {
        if pair.is_empty() {
            continue;
        }

        let (name, value) = match pair.iter().position(|byte| *byte == b'=') {
            Some(index) => (&pair[..index], &pair[index + 1..]),
            None => (pair, &[][..]),
        };

        let name = String::from_utf8_lossy(&decode(name)).into_owned();
        let value = RawValue::Bytes(decode(value));

        match seen.get(&name) {
            Some(&index) => fields[index].value.push(value),
            None => {
                seen.insert(name.clone(), fields.len());
                fields.push(Field {
                    name,
                    value: FieldValue::Single(value),
                });
            }
        }
    }

    fields
}

fn decode(component: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = component
        .iter()
        .map(|byte| if *byte == b'+' { b' ' } else { *byte })
        .collect();
    percent_decode(&spaced).collect()
}
