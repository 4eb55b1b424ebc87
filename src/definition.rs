//! Schema definition: ordered top-level sections plus a template library.

use crate::column::{Alignment, ColumnOptions};
use crate::error::{Result, SchemaError};
use crate::line::{LineBuilder, LineSchema, Templates};
use crate::section::{Section, SectionBuilder, SectionOptions};

/// A complete file layout.
///
/// Built once, then shared read-only by any number of
/// [`Generator`](crate::Generator) and [`Decoder`](crate::Decoder) calls.
#[derive(Debug, Clone)]
pub struct Definition {
    sections: Vec<Section>,
    templates: Templates,
    options: ColumnOptions,
}

impl Default for Definition {
    fn default() -> Self {
        Self::new(ColumnOptions::new())
    }
}

impl Definition {
    /// `options` are the column defaults for every section and template;
    /// alignment defaults to right when unset.
    pub fn new(options: ColumnOptions) -> Self {
        let defaults = ColumnOptions::new().align(Alignment::Right);
        Self {
            sections: Vec::new(),
            templates: Templates::new(),
            options: options.merge(&defaults),
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_named(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.short_name() == name)
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn options(&self) -> &ColumnOptions {
        &self.options
    }

    /// Declare a top-level section. Sections decode and encode in
    /// declaration order.
    pub fn section<F>(&mut self, name: &str, options: SectionOptions, build: F) -> Result<&Section>
    where
        F: FnOnce(&mut SectionBuilder<'_>) -> Result<()>,
    {
        if self.section_named(name).is_some() {
            return Err(SchemaError::DuplicateSectionName(name.to_string()));
        }
        let options = SectionOptions {
            columns: options.columns.merge(&self.options),
            ..options
        };
        let mut section = Section::new(name, options);
        build(&mut SectionBuilder::new(&mut section, &self.templates))?;
        self.sections.push(section);
        Ok(&self.sections[self.sections.len() - 1])
    }

    /// Add an already-built section.
    pub fn add_section(&mut self, section: Section) -> Result<()> {
        if self.section_named(section.short_name()).is_some() {
            return Err(SchemaError::DuplicateSectionName(
                section.short_name().to_string(),
            ));
        }
        self.sections.push(section);
        Ok(())
    }

    /// Declare a reusable template. Re-declaring a name replaces it.
    pub fn template<F>(&mut self, name: &str, options: ColumnOptions, build: F) -> Result<()>
    where
        F: FnOnce(&mut LineBuilder<'_>) -> Result<()>,
    {
        let mut line = LineSchema::new(name, options.merge(&self.options));
        build(&mut LineBuilder::new(&mut line, &self.templates))?;
        self.templates.insert(line);
        Ok(())
    }
}
