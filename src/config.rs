//! JSON schema description files.
//!
//! ```json
//! {
//!   "defaults": { "align": "right" },
//!   "templates": {
//!     "boundary": { "columns": [ { "name": "record_type", "length": 4 } ] }
//!   },
//!   "sections": [
//!     { "name": "header", "trap": { "prefix": "HEAD" },
//!       "columns": [ { "template": "boundary" }, { "spacer": 2 } ] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::column::{Alignment, ColumnOptions, ColumnType};
use crate::definition::Definition;
use crate::error::{Result, SchemaError};
use crate::line::LineBuilder;
use crate::section::{SectionBuilder, SectionOptions};
use crate::trap::Trap;

/// Column defaults shared by the definition, templates, and sections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsConfig {
    pub align: Option<Alignment>,
    pub padding: Option<char>,
    pub truncate: Option<bool>,
}

impl OptionsConfig {
    fn to_options(&self) -> ColumnOptions {
        ColumnOptions {
            align: self.align,
            padding: self.padding,
            truncate: self.truncate,
            ..ColumnOptions::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeConfig {
    String,
    Integer,
    Float,
    Date,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    pub name: String,
    pub length: usize,
    pub align: Option<Alignment>,
    pub padding: Option<char>,
    pub truncate: Option<bool>,
    pub group: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TypeConfig>,
    pub date_format: Option<String>,
    pub float_precision: Option<usize>,
    pub nil_blank: Option<bool>,
}

impl ColumnSpec {
    fn to_options(&self) -> Result<ColumnOptions> {
        let kind = match (self.kind, &self.date_format, self.float_precision) {
            (None | Some(TypeConfig::String), None, None) => None,
            (None | Some(TypeConfig::String), _, _) => {
                return Err(SchemaError::Config(format!(
                    "column '{}': date_format/float_precision need a date/float type",
                    self.name
                )));
            }
            (Some(TypeConfig::Integer), None, None) => Some(ColumnType::Integer),
            (Some(TypeConfig::Float), None, precision) => Some(ColumnType::Float { precision }),
            (Some(TypeConfig::Date), format, None) => Some(ColumnType::Date {
                format: format.clone(),
            }),
            _ => {
                return Err(SchemaError::Config(format!(
                    "column '{}': conflicting type options",
                    self.name
                )));
            }
        };
        Ok(ColumnOptions {
            group: self.group.clone(),
            kind,
            nil_blank: self.nil_blank,
            ..options_of(self.align, self.padding, self.truncate)
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateRef {
    pub template: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpacerSpec {
    pub spacer: usize,
    pub padding: Option<char>,
}

/// One entry in a `columns` list. Unknown keys match no variant and are
/// rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ColumnConfig {
    Template(TemplateRef),
    Spacer(SpacerSpec),
    Column(ColumnSpec),
}

impl ColumnConfig {
    fn template_name(&self) -> Option<&str> {
        match self {
            ColumnConfig::Template(reference) => Some(&reference.template),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapConfig {
    #[default]
    Always,
    Prefix(String),
    NotPrefixes(Vec<String>),
    Regex(String),
}

impl TrapConfig {
    fn to_trap(&self) -> Result<Trap> {
        Ok(match self {
            TrapConfig::Always => Trap::Always,
            TrapConfig::Prefix(prefix) => Trap::prefix(prefix.as_str()),
            TrapConfig::NotPrefixes(prefixes) => Trap::not_prefixes(prefixes.iter().cloned()),
            TrapConfig::Regex(pattern) => Trap::regex(pattern)
                .map_err(|e| SchemaError::Config(format!("invalid trap regex: {e}")))?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    pub align: Option<Alignment>,
    pub padding: Option<char>,
    pub truncate: Option<bool>,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

impl TemplateConfig {
    fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().filter_map(ColumnConfig::template_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionConfig {
    pub name: String,
    #[serde(default)]
    pub trap: TrapConfig,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub singular: bool,
    pub align: Option<Alignment>,
    pub padding: Option<char>,
    pub truncate: Option<bool>,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
    /// Child sections.
    #[serde(default)]
    pub lines: Vec<SectionConfig>,
}

impl SectionConfig {
    fn to_options(&self) -> Result<SectionOptions> {
        Ok(SectionOptions {
            columns: options_of(self.align, self.padding, self.truncate),
            optional: self.optional,
            singular: self.singular,
            trap: Some(self.trap.to_trap()?),
        })
    }

    fn build(&self, builder: &mut SectionBuilder<'_>) -> Result<()> {
        apply_columns(builder, &self.columns)?;
        for child in &self.lines {
            builder.line(&child.name, child.to_options()?, |line| child.build(line))?;
        }
        Ok(())
    }
}

/// Top-level schema description.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    #[serde(default)]
    pub defaults: OptionsConfig,
    /// Templates may use each other in any order, as long as there is no
    /// cycle.
    #[serde(default)]
    pub templates: BTreeMap<String, TemplateConfig>,
    pub sections: Vec<SectionConfig>,
}

impl SchemaConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Build the definition, raising the same errors as the programmatic
    /// builder (duplicate names, unknown templates).
    pub fn into_definition(self) -> Result<Definition> {
        let mut definition = Definition::new(self.defaults.to_options());
        self.declare_templates(&mut definition)?;
        for section in &self.sections {
            definition.section(&section.name, section.to_options()?, |builder| {
                section.build(builder)
            })?;
        }
        Ok(definition)
    }

    /// Declare templates so each one is built after the templates it uses.
    fn declare_templates(&self, definition: &mut Definition) -> Result<()> {
        let mut pending: Vec<(&String, &TemplateConfig)> = self.templates.iter().collect();
        while !pending.is_empty() {
            let before = pending.len();
            let mut waiting = Vec::new();
            for (name, template) in pending {
                if !template
                    .dependencies()
                    .all(|dep| definition.templates().contains(dep))
                {
                    waiting.push((name, template));
                    continue;
                }
                let options = options_of(template.align, template.padding, template.truncate);
                definition.template(name, options, |line| {
                    apply_columns(line, &template.columns)
                })?;
            }
            if waiting.len() == before {
                let missing = waiting
                    .iter()
                    .flat_map(|&(_, template)| template.dependencies())
                    .find(|dep| !self.templates.contains_key(*dep));
                return Err(match missing {
                    Some(dep) => SchemaError::UnknownTemplate(dep.to_string()),
                    None => {
                        let names: Vec<&str> = waiting.iter().map(|(n, _)| n.as_str()).collect();
                        SchemaError::Config(format!(
                            "templates use each other in a cycle: {}",
                            names.join(", ")
                        ))
                    }
                });
            }
            pending = waiting;
        }
        Ok(())
    }
}

fn options_of(
    align: Option<Alignment>,
    padding: Option<char>,
    truncate: Option<bool>,
) -> ColumnOptions {
    OptionsConfig {
        align,
        padding,
        truncate,
    }
    .to_options()
}

/// Common surface of the two builders a `columns` list can feed.
trait ColumnTarget {
    fn add_template(&mut self, name: &str) -> Result<()>;
    fn add_spacer(&mut self, length: usize, padding: Option<char>) -> Result<()>;
    fn add_column(&mut self, name: &str, length: usize, options: ColumnOptions) -> Result<()>;
}

impl ColumnTarget for LineBuilder<'_> {
    fn add_template(&mut self, name: &str) -> Result<()> {
        self.template(name).map(|_| ())
    }

    fn add_spacer(&mut self, length: usize, padding: Option<char>) -> Result<()> {
        match padding {
            Some(padding) => self.spacer_with(length, padding).map(|_| ()),
            None => self.spacer(length).map(|_| ()),
        }
    }

    fn add_column(&mut self, name: &str, length: usize, options: ColumnOptions) -> Result<()> {
        self.column(name, length, options).map(|_| ())
    }
}

impl ColumnTarget for SectionBuilder<'_> {
    fn add_template(&mut self, name: &str) -> Result<()> {
        self.template(name).map(|_| ())
    }

    fn add_spacer(&mut self, length: usize, padding: Option<char>) -> Result<()> {
        match padding {
            Some(padding) => self.spacer_with(length, padding).map(|_| ()),
            None => self.spacer(length).map(|_| ()),
        }
    }

    fn add_column(&mut self, name: &str, length: usize, options: ColumnOptions) -> Result<()> {
        self.column(name, length, options).map(|_| ())
    }
}

fn apply_columns<T: ColumnTarget>(target: &mut T, columns: &[ColumnConfig]) -> Result<()> {
    for column in columns {
        match column {
            ColumnConfig::Template(reference) => target.add_template(&reference.template)?,
            ColumnConfig::Spacer(spacer) => target.add_spacer(spacer.spacer, spacer.padding)?,
            ColumnConfig::Column(spec) => {
                target.add_column(&spec.name, spec.length, spec.to_options()?)?
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use crate::{Decoder, Generator};

    const SCHEMA: &str = r#"{
        "templates": {
            "boundary": {
                "columns": [
                    { "name": "record_type", "length": 4 },
                    { "name": "company_id", "length": 12 }
                ]
            }
        },
        "sections": [
            {
                "name": "header",
                "align": "left",
                "trap": { "prefix": "HEAD" },
                "singular": true,
                "columns": [ { "template": "boundary" } ]
            },
            {
                "name": "body",
                "trap": { "not_prefixes": ["HEAD", "FOOT"] },
                "columns": [
                    { "name": "id", "length": 4, "type": "integer", "padding": "0" },
                    { "spacer": 1, "padding": "|" },
                    { "name": "paid", "length": 8, "type": "date", "date_format": "%Y%m%d", "nil_blank": true }
                ]
            },
            {
                "name": "footer",
                "trap": { "regex": "^FOOT" },
                "columns": [
                    { "template": "boundary" },
                    { "name": "count", "length": 3, "type": "integer" }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_builds_definition() {
        let definition = SchemaConfig::from_json(SCHEMA)
            .unwrap()
            .into_definition()
            .unwrap();
        let names: Vec<&str> = definition
            .sections()
            .iter()
            .map(|s| s.short_name())
            .collect();
        assert_eq!(names, ["header", "body", "footer"]);

        let header = definition.section_named("header").unwrap();
        assert!(header.is_singular());
        assert_eq!(header.first_line().width(), 16);
        assert_eq!(definition.section_named("footer").unwrap().first_line().width(), 19);
    }

    #[test]
    fn test_round_trip_through_config() {
        let definition = SchemaConfig::from_json(SCHEMA)
            .unwrap()
            .into_definition()
            .unwrap();
        let lines = [
            "HEAD        ACME",
            "0012|20240131",
            "0013|        ",
            "FOOT        ACME  2",
        ];
        let parsed = Decoder::new(&definition).parse(&lines).unwrap();
        assert_eq!(parsed["header"].get("company_id"), Some(&Value::from("ACME")));
        let body = parsed["body"].as_list().unwrap();
        assert_eq!(body[0].get("id"), Some(&Value::Int(12)));
        assert_eq!(body[1].get("paid"), Some(&Value::Null));
        assert_eq!(parsed["footer"].as_list().unwrap()[0].get("count"), Some(&Value::Int(2)));

        let text = Generator::new(&definition).generate(&parsed).unwrap();
        assert_eq!(text, lines.join("\n") + "\n");
    }

    #[test]
    fn test_unknown_template() {
        let json = r#"{ "sections": [ { "name": "a", "columns": [ { "template": "nope" } ] } ] }"#;
        let err = SchemaConfig::from_json(json)
            .unwrap()
            .into_definition()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownTemplate(_)));
    }

    #[test]
    fn test_template_may_use_a_later_template() {
        let json = r#"{
            "templates": {
                "a_outer": { "columns": [ { "template": "b_inner" }, { "name": "code", "length": 2 } ] },
                "b_inner": { "columns": [ { "name": "kind", "length": 4 } ] }
            },
            "sections": [ { "name": "rows", "columns": [ { "template": "a_outer" } ] } ]
        }"#;
        let definition = SchemaConfig::from_json(json)
            .unwrap()
            .into_definition()
            .unwrap();
        let outer = definition.templates().get("a_outer").unwrap();
        let names: Vec<&str> = outer.columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, ["kind", "code"]);
        assert_eq!(definition.section_named("rows").unwrap().first_line().width(), 6);
    }

    #[test]
    fn test_template_using_unknown_template() {
        let json = r#"{
            "templates": { "a": { "columns": [ { "template": "ghost" } ] } },
            "sections": []
        }"#;
        let err = SchemaConfig::from_json(json)
            .unwrap()
            .into_definition()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownTemplate(ref n) if n == "ghost"));
    }

    #[test]
    fn test_template_cycle_is_config_error() {
        let json = r#"{
            "templates": {
                "a": { "columns": [ { "template": "b" } ] },
                "b": { "columns": [ { "template": "a" } ] }
            },
            "sections": []
        }"#;
        let err = SchemaConfig::from_json(json)
            .unwrap()
            .into_definition()
            .unwrap_err();
        assert!(matches!(err, SchemaError::Config(ref m) if m.contains("a, b")));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let column_typo = r#"{ "sections": [ { "name": "a", "columns": [
            { "name": "x", "length": 3, "aling": "left" }
        ] } ] }"#;
        assert!(matches!(
            SchemaConfig::from_json(column_typo),
            Err(SchemaError::Json(_))
        ));

        let section_typo = r#"{ "sections": [ { "name": "a", "singluar": true } ] }"#;
        assert!(matches!(
            SchemaConfig::from_json(section_typo),
            Err(SchemaError::Json(_))
        ));

        let spacer_typo = r#"{ "sections": [ { "name": "a", "columns": [
            { "spacer": 2, "pading": "." }
        ] } ] }"#;
        assert!(matches!(
            SchemaConfig::from_json(spacer_typo),
            Err(SchemaError::Json(_))
        ));
    }

    #[test]
    fn test_invalid_alignment_is_rejected() {
        let json = r#"{ "defaults": { "align": "center" }, "sections": [] }"#;
        assert!(matches!(
            SchemaConfig::from_json(json),
            Err(SchemaError::Json(_))
        ));
    }

    #[test]
    fn test_invalid_regex_is_config_error() {
        let json = r#"{ "sections": [ { "name": "a", "trap": { "regex": "(" } } ] }"#;
        let err = SchemaConfig::from_json(json)
            .unwrap()
            .into_definition()
            .unwrap_err();
        assert!(matches!(err, SchemaError::Config(_)));
    }

    #[test]
    fn test_conflicting_type_options() {
        let json = r#"{ "sections": [ { "name": "a", "columns": [
            { "name": "x", "length": 3, "type": "integer", "date_format": "%Y" }
        ] } ] }"#;
        let err = SchemaConfig::from_json(json)
            .unwrap()
            .into_definition()
            .unwrap_err();
        assert!(matches!(err, SchemaError::Config(_)));
    }

    #[test]
    fn test_nested_lines() {
        let json = r#"{ "sections": [ {
            "name": "body",
            "columns": [ { "name": "id", "length": 2 } ],
            "trap": { "prefix": "1" },
            "lines": [ {
                "name": "address",
                "optional": true,
                "trap": { "prefix": "A" },
                "columns": [ { "spacer": 1, "padding": "A" }, { "name": "city", "length": 4 } ]
            } ]
        } ] }"#;
        let definition = SchemaConfig::from_json(json)
            .unwrap()
            .into_definition()
            .unwrap();
        let body = definition.section_named("body").unwrap();
        assert_eq!(body.children()[0].name(), "body::address");
        assert!(body.children()[0].is_optional());
    }
}
