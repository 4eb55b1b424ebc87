//! Sections: logical records that may span several physical lines.
//!
//! A section owns the line schema for its first line plus an ordered list of
//! child sections. Decoding is greedy and never backtracks: a section keeps
//! consuming lines while its first line matches, and after each first line
//! every child gets a chance to absorb the lines that follow it.

use tracing::{debug, trace};

use crate::column::ColumnOptions;
use crate::error::{Result, SchemaError};
use crate::line::{LineSchema, Templates};
use crate::trap::Trap;
use crate::value::{Record, Value};

/// Separator between ancestor names in a qualified section name.
pub const PATH_SEPARATOR: &str = "::";

/// Read position over the input lines for one decode call.
#[derive(Debug)]
pub struct Cursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new<S: AsRef<str>>(lines: &'a [S]) -> Self {
        Self {
            lines: lines.iter().map(|line| line.as_ref()).collect(),
            pos: 0,
        }
    }

    /// The front line, or `None` at end of input.
    pub fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    pub fn advance(&mut self) -> Option<&'a str> {
        let line = self.peek()?;
        self.pos += 1;
        Some(line)
    }

    /// Lines not yet consumed.
    pub fn remaining(&self) -> &[&'a str] {
        &self.lines[self.pos..]
    }

    /// 1-based number of the front line.
    pub fn line_number(&self) -> usize {
        self.pos + 1
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.lines.len()
    }
}

/// Section-level options. Column defaults in `columns` flow down into every
/// column of the first line and into child sections.
#[derive(Debug, Clone, Default)]
pub struct SectionOptions {
    pub columns: ColumnOptions,
    pub optional: bool,
    pub singular: bool,
    pub trap: Option<Trap>,
}

impl SectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: ColumnOptions) -> Self {
        self.columns = columns;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn singular(mut self) -> Self {
        self.singular = true;
        self
    }

    pub fn trap(mut self, trap: Trap) -> Self {
        self.trap = Some(trap);
        self
    }
}

/// A node in the section tree.
#[derive(Debug, Clone)]
pub struct Section {
    name: String,
    path: Vec<String>,
    first_line: LineSchema,
    children: Vec<Section>,
    optional: bool,
    singular: bool,
}

impl Section {
    /// A top-level section with an empty first line.
    pub fn new(name: impl Into<String>, options: SectionOptions) -> Self {
        Self::with_path(name.into(), Vec::new(), options)
    }

    fn with_path(name: String, path: Vec<String>, options: SectionOptions) -> Self {
        let qualified = qualify(&path, &name);
        let mut first_line = LineSchema::new(qualified, options.columns);
        if let Some(trap) = options.trap {
            first_line.set_trap(trap);
        }
        Self {
            name,
            path,
            first_line,
            children: Vec::new(),
            optional: options.optional,
            singular: options.singular,
        }
    }

    /// The name this section's data is stored under in its parent record.
    pub fn short_name(&self) -> &str {
        &self.name
    }

    /// Ancestor-qualified name, e.g. `body::address_record`.
    pub fn name(&self) -> String {
        qualify(&self.path, &self.name)
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn first_line(&self) -> &LineSchema {
        &self.first_line
    }

    pub fn first_line_mut(&mut self) -> &mut LineSchema {
        &mut self.first_line
    }

    pub fn children(&self) -> &[Section] {
        &self.children
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_singular(&self) -> bool {
        self.singular
    }

    /// Create and attach a child section, returning it for further setup.
    ///
    /// The child inherits this section's column defaults.
    pub fn add_child(
        &mut self,
        name: impl Into<String>,
        options: SectionOptions,
    ) -> Result<&mut Section> {
        let name = name.into();
        if self.children.iter().any(|c| c.name == name) {
            return Err(SchemaError::DuplicateSectionName(qualify(
                &self.child_path(),
                &name,
            )));
        }
        self.first_line.reserve_key(&name)?;
        let options = SectionOptions {
            columns: options.columns.merge(self.first_line.options()),
            ..options
        };
        let child = Section::with_path(name, self.child_path(), options);
        self.children.push(child);
        let last = self.children.len() - 1;
        Ok(&mut self.children[last])
    }

    fn child_path(&self) -> Vec<String> {
        let mut path = self.path.clone();
        path.push(self.name.clone());
        path
    }

    /// Encode one logical record: the first line, then each present child.
    ///
    /// `Value::Null` yields no lines. Child data may be a single record or a
    /// list of records.
    pub fn encode(&self, data: &Value) -> Result<Vec<String>> {
        let record = match data {
            Value::Null => return Ok(Vec::new()),
            Value::Map(record) => record,
            other => {
                return Err(SchemaError::UnexpectedValue {
                    section: self.name(),
                    found: other.kind().to_string(),
                });
            }
        };

        let mut lines = vec![self.first_line.encode(record)?];
        for child in &self.children {
            match record.get(child.short_name()) {
                None | Some(Value::Null) => {}
                Some(Value::List(items)) => {
                    for item in items {
                        lines.extend(child.encode(item)?);
                    }
                }
                Some(single) => lines.extend(child.encode(single)?),
            }
        }
        Ok(lines)
    }

    /// Consume every consecutive record this section matches at the cursor
    /// and store the result in `output` under the short name.
    ///
    /// Returns the number of records decoded. Fails if the section is
    /// required and nothing is stored.
    pub fn decode(&self, cursor: &mut Cursor<'_>, output: &mut Record) -> Result<usize> {
        let mut rows = Vec::new();
        while let Some(row) = self.process_record(cursor)? {
            rows.push(Value::Map(row));
        }
        let count = rows.len();

        if count > 0 {
            let value = if self.singular {
                rows.pop().unwrap_or_default()
            } else {
                Value::List(rows)
            };
            output.insert(self.name.clone(), value);
        }

        if !self.optional && output.get(&self.name).is_none_or(Value::is_empty) {
            return Err(SchemaError::RequiredSectionNotFound(self.name()));
        }
        debug!(section = %self.name(), records = count, "decoded section");
        Ok(count)
    }

    /// Decode one first line plus whatever its children absorb.
    fn process_record(&self, cursor: &mut Cursor<'_>) -> Result<Option<Record>> {
        if !self.first_line.matches(cursor.peek()) {
            return Ok(None);
        }
        let line_number = cursor.line_number();
        let Some(line) = cursor.advance() else {
            return Ok(None);
        };
        trace!(section = %self.name(), line = line_number, "matched line");

        let mut record = self.first_line.decode(line)?;
        for child in &self.children {
            child.decode(cursor, &mut record)?;
        }
        Ok(Some(record))
    }
}

fn qualify(path: &[String], name: &str) -> String {
    if path.is_empty() {
        return name.to_string();
    }
    let mut qualified = path.join(PATH_SEPARATOR);
    qualified.push_str(PATH_SEPARATOR);
    qualified.push_str(name);
    qualified
}

/// Mutable view used while declaring a section and its children.
pub struct SectionBuilder<'a> {
    section: &'a mut Section,
    templates: &'a Templates,
}

impl<'a> SectionBuilder<'a> {
    pub fn new(section: &'a mut Section, templates: &'a Templates) -> Self {
        Self { section, templates }
    }

    pub fn column(
        &mut self,
        name: impl Into<String>,
        length: usize,
        options: ColumnOptions,
    ) -> Result<&mut Self> {
        self.section.first_line.add_column(name, length, options)?;
        Ok(self)
    }

    pub fn spacer(&mut self, length: usize) -> Result<&mut Self> {
        self.section.first_line.add_spacer(length, None)?;
        Ok(self)
    }

    pub fn spacer_with(&mut self, length: usize, padding: char) -> Result<&mut Self> {
        self.section.first_line.add_spacer(length, Some(padding))?;
        Ok(self)
    }

    /// Splice a registered template into the first line.
    pub fn template(&mut self, name: &str) -> Result<&mut Self> {
        self.section.first_line.add_template(name, self.templates)?;
        Ok(self)
    }

    pub fn trap(&mut self, trap: Trap) -> &mut Self {
        self.section.first_line.set_trap(trap);
        self
    }

    pub fn optional(&mut self, optional: bool) -> &mut Self {
        self.section.optional = optional;
        self
    }

    pub fn singular(&mut self, singular: bool) -> &mut Self {
        self.section.singular = singular;
        self
    }

    /// Declare a child line (a nested section) of this section.
    pub fn line<F>(&mut self, name: &str, options: SectionOptions, build: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut SectionBuilder<'_>) -> Result<()>,
    {
        let child = self.section.add_child(name, options)?;
        build(&mut SectionBuilder::new(child, self.templates))?;
        Ok(self)
    }
}
