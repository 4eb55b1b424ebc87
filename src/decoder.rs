//! Decoder: fixed-width lines to nested data.

use tracing::debug;

use crate::definition::Definition;
use crate::error::Result;
use crate::section::Cursor;
use crate::value::Record;

/// Runs every top-level section, in order, over one shared cursor.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    definition: &'a Definition,
}

impl<'a> Decoder<'a> {
    pub fn new(definition: &'a Definition) -> Self {
        Self { definition }
    }

    /// Decode lines (terminators already stripped) into a record keyed by
    /// section name.
    ///
    /// Empty input returns an empty record without checking required
    /// sections. Lines left over after the last section are ignored.
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Result<Record> {
        let mut output = Record::new();
        if lines.is_empty() {
            return Ok(output);
        }

        let mut cursor = Cursor::new(lines);
        for section in self.definition.sections() {
            section.decode(&mut cursor, &mut output)?;
        }
        if !cursor.is_empty() {
            debug!(
                line = cursor.line_number(),
                remaining = cursor.remaining().len(),
                "unmatched trailing lines ignored"
            );
        }
        Ok(output)
    }
}
