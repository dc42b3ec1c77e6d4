// src/extract/xml.rs
use super::Dataset;
use crate::table::{Record, Table, Value};
use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Read one XML file by walking every record element under the document
/// root (the tag comes from the dataset) and pulling the text of each
/// named sub-element. Every record element contributes a row; declared
/// columns with no matching sub-element come back null.
pub fn from_xml(dataset: &Dataset, path: &Path) -> Result<Table> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    let mut table = dataset.empty_table();
    let mut in_record = false;
    let mut field: Option<String> = None;
    let mut fields: HashMap<String, String> = HashMap::new();

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("parsing {}", path.display()))?;
        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == dataset.xml_record {
                    in_record = true;
                    fields.clear();
                } else if in_record {
                    field = Some(name);
                }
            }
            Event::Text(t) => {
                if let Some(name) = &field {
                    let text = t
                        .unescape()
                        .with_context(|| format!("parsing {}", path.display()))?;
                    fields.insert(name.clone(), text.trim().to_string());
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == dataset.xml_record.as_bytes() {
                    in_record = false;
                    let row: Record = dataset
                        .columns
                        .iter()
                        .map(|col| match fields.get(*col) {
                            Some(s) => Value::Str(s.clone()),
                            None => Value::Null,
                        })
                        .collect();
                    table.push(row)?;
                } else {
                    field = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(table)
}
