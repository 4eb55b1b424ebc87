//! Generator: nested data to fixed-width text.

use tracing::debug;

use crate::definition::Definition;
use crate::error::{Result, SchemaError};
use crate::value::{Record, Value};

pub const DEFAULT_RECORD_SEPARATOR: &str = "\n";

/// Serializes data section by section in declaration order.
#[derive(Debug, Clone)]
pub struct Generator<'a> {
    definition: &'a Definition,
    record_separator: String,
}

impl<'a> Generator<'a> {
    pub fn new(definition: &'a Definition) -> Self {
        Self {
            definition,
            record_separator: DEFAULT_RECORD_SEPARATOR.to_string(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.record_separator = separator.into();
        self
    }

    pub fn record_separator(&self) -> &str {
        &self.record_separator
    }

    /// Encode `data` keyed by top-level section name.
    ///
    /// Each section's value may be a single record or a list of records.
    /// Every line, including the last, is followed by the record separator.
    pub fn generate(&self, data: &Record) -> Result<String> {
        let lines = self.lines(data)?;
        let mut output = String::new();
        for line in &lines {
            output.push_str(line);
            output.push_str(&self.record_separator);
        }
        Ok(output)
    }

    /// Encode `data` into lines without joining them.
    pub fn lines(&self, data: &Record) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for section in self.definition.sections() {
            let content = data.get(section.short_name()).unwrap_or(&Value::Null);
            if content.is_empty() && !section.is_optional() {
                return Err(SchemaError::RequiredSectionEmpty(section.name()));
            }
            let before = lines.len();
            match content {
                Value::List(rows) => {
                    for row in rows {
                        lines.extend(section.encode(row)?);
                    }
                }
                single => lines.extend(section.encode(single)?),
            }
            debug!(section = %section.name(), lines = lines.len() - before, "encoded section");
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnOptions;
    use crate::record;
    use crate::section::SectionOptions;

    fn definition() -> Definition {
        let mut definition = Definition::default();
        definition
            .section("header", SectionOptions::new(), |s| {
                s.column("kind", 4, ColumnOptions::new())?;
                Ok(())
            })
            .unwrap();
        definition
            .section("body", SectionOptions::new().optional(), |s| {
                s.column("id", 3, ColumnOptions::new().padding('0'))?;
                Ok(())
            })
            .unwrap();
        definition
    }

    #[test]
    fn test_required_section_empty() {
        let definition = definition();
        let generator = Generator::new(&definition);
        for data in [
            record! { "body" => vec![Value::from(record! { "id" => 1 })] },
            record! { "header" => Value::Null },
            record! { "header" => Vec::<Value>::new() },
        ] {
            let err = generator.generate(&data).unwrap_err();
            assert!(matches!(err, SchemaError::RequiredSectionEmpty(ref n) if n == "header"));
        }
    }

    #[test]
    fn test_trailing_separator() {
        let definition = definition();
        let data = record! {
            "header" => vec![Value::from(record! { "kind" => "HEAD" })],
            "body" => vec![
                Value::from(record! { "id" => 1 }),
                Value::from(record! { "id" => 22 }),
            ],
        };
        let text = Generator::new(&definition).generate(&data).unwrap();
        assert_eq!(text, "HEAD\n001\n022\n");
    }

    #[test]
    fn test_single_record_is_accepted() {
        let definition = definition();
        let data = record! { "header" => record! { "kind" => "HEAD" } };
        let text = Generator::new(&definition).generate(&data).unwrap();
        assert_eq!(text, "HEAD\n");
    }

    #[test]
    fn test_custom_separator() {
        let definition = definition();
        let data = record! {
            "header" => record! { "kind" => "HEAD" },
            "body" => record! { "id" => 7 },
        };
        let text = Generator::new(&definition)
            .with_separator("\r\n")
            .generate(&data)
            .unwrap();
        assert_eq!(text, "HEAD\r\n007\r\n");
    }
}
