//! Line schema: an ordered list of columns covering one physical line.

use std::collections::BTreeMap;

use tracing::trace;

use crate::column::{Column, ColumnOptions, SPACER};
use crate::error::{Result, SchemaError};
use crate::trap::Trap;
use crate::value::{Record, Value};

/// Ordered columns plus the trap that claims raw lines for them.
#[derive(Debug, Clone)]
pub struct LineSchema {
    name: String,
    columns: Vec<Column>,
    options: ColumnOptions,
    trap: Trap,
    /// Record keys owned by child sections.
    reserved: Vec<String>,
}

impl LineSchema {
    /// Create an empty line. `options` are the defaults for every column
    /// added afterwards.
    pub fn new(name: impl Into<String>, options: ColumnOptions) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            options,
            trap: Trap::Always,
            reserved: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn options(&self) -> &ColumnOptions {
        &self.options
    }

    pub fn trap(&self) -> &Trap {
        &self.trap
    }

    pub fn set_trap(&mut self, trap: Trap) {
        self.trap = trap;
    }

    /// Total character width of the line.
    pub fn width(&self) -> usize {
        self.columns.iter().map(Column::length).sum()
    }

    /// Append a column. Unset `options` inherit from the line's options.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        length: usize,
        options: ColumnOptions,
    ) -> Result<&Column> {
        let column = Column::new(name, length, options.merge(&self.options));
        self.push(column)
    }

    /// Append a padding-only column, optionally with its own fill character.
    pub fn add_spacer(&mut self, length: usize, padding: Option<char>) -> Result<&Column> {
        let mut options = ColumnOptions::new();
        options.padding = padding;
        self.add_column(SPACER, length, options)
    }

    /// Splice the named template's columns onto the end of this line.
    ///
    /// Options already set on this line win over the template's. On a name
    /// collision the line is left unchanged.
    pub fn add_template(&mut self, name: &str, templates: &Templates) -> Result<()> {
        let template = templates.get(name)?;
        let start = self.columns.len();
        for column in template.columns() {
            if let Err(e) = self.push(column.clone()) {
                self.columns.truncate(start);
                return Err(e);
            }
        }
        self.options = self.options.clone().merge(template.options());
        Ok(())
    }

    /// Claim `key` in decoded records for a child section, so no column or
    /// group of this line can take it.
    pub fn reserve_key(&mut self, key: &str) -> Result<()> {
        let taken = self
            .named_columns()
            .any(|c| c.group().is_none() && c.name() == key)
            || self.group_names().any(|g| g == key);
        if taken {
            return Err(SchemaError::DuplicateGroupName {
                name: key.to_string(),
            });
        }
        self.reserved.push(key.to_string());
        Ok(())
    }

    fn push(&mut self, column: Column) -> Result<&Column> {
        self.check_names(&column)?;
        self.columns.push(column);
        Ok(&self.columns[self.columns.len() - 1])
    }

    fn check_names(&self, column: &Column) -> Result<()> {
        if column.is_spacer() {
            return Ok(());
        }
        let name = column.name();
        let group = column.group();
        let top_level_key = group.unwrap_or(name);
        if self.reserved.iter().any(|k| k == top_level_key) {
            return Err(SchemaError::DuplicateGroupName {
                name: top_level_key.to_string(),
            });
        }
        if self
            .named_columns()
            .any(|c| c.name() == name && c.group() == group)
        {
            return Err(SchemaError::DuplicateColumnName {
                name: name.to_string(),
                group: group.map(str::to_string),
            });
        }
        if let Some(group) = group
            && self
                .named_columns()
                .any(|c| c.group().is_none() && c.name() == group)
        {
            return Err(SchemaError::DuplicateGroupName {
                name: group.to_string(),
            });
        }
        if self.group_names().any(|g| g == name) {
            return Err(SchemaError::DuplicateGroupName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn named_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.is_spacer())
    }

    fn group_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().filter_map(Column::group)
    }

    /// Does the raw line belong to this schema? `None` is end of input.
    pub fn matches(&self, raw_line: Option<&str>) -> bool {
        raw_line.is_some_and(|line| self.trap.matches(line))
    }

    /// Split a raw line into column slices and decode each one.
    ///
    /// Grouped columns land in a nested record under their group name;
    /// spacers are dropped.
    pub fn decode(&self, raw_line: &str) -> Result<Record> {
        let expected = self.width();
        let found = raw_line.chars().count();
        if found < expected {
            return Err(SchemaError::ColumnMismatch {
                section: self.name.clone(),
                expected,
                found,
            });
        }

        let mut row = Record::new();
        let mut groups: BTreeMap<&str, Record> =
            self.group_names().map(|g| (g, Record::new())).collect();

        let mut rest = raw_line;
        for column in &self.columns {
            let split = rest
                .char_indices()
                .nth(column.length())
                .map_or(rest.len(), |(i, _)| i);
            let (slice, tail) = rest.split_at(split);
            rest = tail;

            if column.is_spacer() {
                continue;
            }
            let value = column.decode(slice)?;
            match column.group().and_then(|g| groups.get_mut(g)) {
                Some(group) => {
                    group.insert(column.name().to_string(), value);
                }
                None => {
                    row.insert(column.name().to_string(), value);
                }
            }
        }

        for (group, record) in groups {
            row.insert(group.to_string(), Value::Map(record));
        }
        trace!(line = %self.name, columns = self.columns.len(), "decoded line");
        Ok(row)
    }

    /// Encode one record as a single line, columns concatenated in order.
    ///
    /// Missing keys (or a missing group) encode as `Value::Null`.
    pub fn encode(&self, record: &Record) -> Result<String> {
        let mut line = String::with_capacity(self.width());
        for column in &self.columns {
            let source = match column.group() {
                Some(group) => record.get(group).and_then(Value::as_map),
                None => Some(record),
            };
            let value = source
                .and_then(|r| r.get(column.name()))
                .unwrap_or(&Value::Null);
            line.push_str(&column.encode(value)?);
        }
        Ok(line)
    }
}

/// Reusable named line schemas that can be spliced into sections.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    templates: BTreeMap<String, LineSchema>,
}

impl Templates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `line` under its own name, replacing any previous template.
    pub fn insert(&mut self, line: LineSchema) {
        self.templates.insert(line.name().to_string(), line);
    }

    pub fn get(&self, name: &str) -> Result<&LineSchema> {
        self.templates
            .get(name)
            .ok_or_else(|| SchemaError::UnknownTemplate(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Mutable view used while declaring a template or a section's first line.
pub struct LineBuilder<'a> {
    line: &'a mut LineSchema,
    templates: &'a Templates,
}

impl<'a> LineBuilder<'a> {
    pub fn new(line: &'a mut LineSchema, templates: &'a Templates) -> Self {
        Self { line, templates }
    }

    pub fn column(
        &mut self,
        name: impl Into<String>,
        length: usize,
        options: ColumnOptions,
    ) -> Result<&mut Self> {
        self.line.add_column(name, length, options)?;
        Ok(self)
    }

    pub fn spacer(&mut self, length: usize) -> Result<&mut Self> {
        self.line.add_spacer(length, None)?;
        Ok(self)
    }

    pub fn spacer_with(&mut self, length: usize, padding: char) -> Result<&mut Self> {
        self.line.add_spacer(length, Some(padding))?;
        Ok(self)
    }

    pub fn template(&mut self, name: &str) -> Result<&mut Self> {
        self.line.add_template(name, self.templates)?;
        Ok(self)
    }

    pub fn trap(&mut self, trap: Trap) -> &mut Self {
        self.line.set_trap(trap);
        self
    }
}
