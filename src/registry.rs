//! Caller-owned registry of named definitions, plus stream helpers.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use crate::decoder::Decoder;
use crate::definition::Definition;
use crate::error::{Result, SchemaError};
use crate::generator::Generator;
use crate::value::Record;

/// Named definitions. Create one at startup and pass it where needed.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    definitions: HashMap<String, Definition>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `definition` under `name`, replacing any previous entry.
    pub fn define(&mut self, name: impl Into<String>, definition: Definition) -> &Definition {
        let name = name.into();
        self.definitions.insert(name.clone(), definition);
        &self.definitions[&name]
    }

    pub fn get(&self, name: &str) -> Result<&Definition> {
        self.definitions
            .get(name)
            .ok_or_else(|| SchemaError::UnknownDefinition(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn generate(&self, name: &str, data: &Record) -> Result<String> {
        Generator::new(self.get(name)?).generate(data)
    }

    /// Generate and write to `writer`.
    pub fn write<W: Write>(&self, mut writer: W, name: &str, data: &Record) -> Result<()> {
        let text = self.generate(name, data)?;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    pub fn parse<S: AsRef<str>>(&self, name: &str, lines: &[S]) -> Result<Record> {
        Decoder::new(self.get(name)?).parse(lines)
    }

    /// Read every line from `reader` and decode it.
    pub fn read<R: BufRead>(&self, reader: R, name: &str) -> Result<Record> {
        let definition = self.get(name)?;
        let lines = read_lines(reader)?;
        Decoder::new(definition).parse(&lines)
    }
}

/// Read all lines, stripping `\n` and `\r\n` terminators.
pub fn read_lines<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let mut line = line?;
        if line.ends_with('\r') {
            line.pop();
        }
        lines.push(line);
    }
    Ok(lines)
}
