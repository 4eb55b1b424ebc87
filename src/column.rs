//! Column codec: one fixed-width field.
//!
//! A column turns a [`Value`] into exactly `length` characters (format,
//! validate width, pad) and turns an exact-width slice back into a value
//! (strip padding, convert).

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

pub use crate::error::BoxError;
use crate::error::{Result, SchemaError};
use crate::value::Value;

/// Reserved column name for padding-only columns.
///
/// Spacers are skipped when decoding and may repeat within a line.
pub const SPACER: &str = "spacer";

pub const DEFAULT_PADDING: char = ' ';
pub const DEFAULT_ALIGNMENT: Alignment = Alignment::Right;
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Converts a raw column slice into a value.
pub type ParseFn = Arc<dyn Fn(&str) -> std::result::Result<Value, BoxError> + Send + Sync>;

/// Converts a value into text prior to width validation and padding.
pub type FormatFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Which side of the field the value hugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Right,
}

/// Built-in conversions applied when no custom parser/formatter is given.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnType {
    /// Text with padding stripped according to alignment.
    #[default]
    String,
    Integer,
    /// `precision` fixes the number of decimals written; `None` writes the
    /// shortest representation that round-trips.
    Float { precision: Option<usize> },
    /// `format` is a chrono format string, `%Y-%m-%d` when unset.
    Date { format: Option<String> },
}

impl ColumnType {
    fn parse(&self, raw: &str, alignment: Alignment) -> std::result::Result<Value, BoxError> {
        match self {
            ColumnType::String => Ok(Value::Str(strip_padding(raw, alignment).to_string())),
            ColumnType::Integer => Ok(Value::Int(raw.trim().parse()?)),
            ColumnType::Float { .. } => Ok(Value::Float(raw.trim().parse()?)),
            ColumnType::Date { format } => {
                let format = format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT);
                Ok(Value::Date(NaiveDate::parse_from_str(raw.trim(), format)?))
            }
        }
    }

    fn format(&self, value: &Value) -> String {
        match (self, value) {
            (ColumnType::Float { precision: Some(p) }, Value::Float(x)) => {
                format!("{x:.prec$}", prec = *p)
            }
            (ColumnType::Float { precision: Some(p) }, Value::Int(n)) => {
                format!("{:.prec$}", *n as f64, prec = *p)
            }
            (ColumnType::Date { format }, Value::Date(d)) => {
                d.format(format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT))
                    .to_string()
            }
            // Dates round-tripped through JSON arrive as ISO strings.
            (ColumnType::Date { format: Some(format) }, Value::Str(s)) => {
                match NaiveDate::parse_from_str(s, DEFAULT_DATE_FORMAT) {
                    Ok(d) => d.format(format).to_string(),
                    Err(_) => s.clone(),
                }
            }
            _ => value.to_string(),
        }
    }
}

/// Trims the padding side: leading for right-aligned, trailing for left-aligned.
fn strip_padding(raw: &str, alignment: Alignment) -> &str {
    match alignment {
        Alignment::Right => raw.trim_start(),
        Alignment::Left => raw.trim_end(),
    }
}

/// Per-column options. Unset fields inherit from the enclosing line and
/// definition; see [`ColumnOptions::merge`].
#[derive(Clone, Default)]
pub struct ColumnOptions {
    pub align: Option<Alignment>,
    pub padding: Option<char>,
    pub truncate: Option<bool>,
    pub group: Option<String>,
    pub kind: Option<ColumnType>,
    pub parser: Option<ParseFn>,
    pub formatter: Option<FormatFn>,
    pub nil_blank: Option<bool>,
}

impl ColumnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.align = Some(align);
        self
    }

    pub fn left(self) -> Self {
        self.align(Alignment::Left)
    }

    pub fn right(self) -> Self {
        self.align(Alignment::Right)
    }

    pub fn padding(mut self, padding: char) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = Some(truncate);
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn kind(mut self, kind: ColumnType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.parser = Some(Arc::new(parser));
        self
    }

    pub fn formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    /// Decode an all-whitespace slice as `Value::Null` without calling the parser.
    pub fn nil_blank(mut self, nil_blank: bool) -> Self {
        self.nil_blank = Some(nil_blank);
        self
    }

    /// Fill every unset field from `base`. Fields already set on `self` win.
    pub fn merge(mut self, base: &ColumnOptions) -> Self {
        if self.align.is_none() {
            self.align = base.align;
        }
        if self.padding.is_none() {
            self.padding = base.padding;
        }
        if self.truncate.is_none() {
            self.truncate = base.truncate;
        }
        if self.group.is_none() {
            self.group.clone_from(&base.group);
        }
        if self.kind.is_none() {
            self.kind.clone_from(&base.kind);
        }
        if self.parser.is_none() {
            self.parser.clone_from(&base.parser);
        }
        if self.formatter.is_none() {
            self.formatter.clone_from(&base.formatter);
        }
        if self.nil_blank.is_none() {
            self.nil_blank = base.nil_blank;
        }
        self
    }
}

impl fmt::Debug for ColumnOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnOptions")
            .field("align", &self.align)
            .field("padding", &self.padding)
            .field("truncate", &self.truncate)
            .field("group", &self.group)
            .field("kind", &self.kind)
            .field("parser", &self.parser.as_ref().map(|_| "<fn>"))
            .field("formatter", &self.formatter.as_ref().map(|_| "<fn>"))
            .field("nil_blank", &self.nil_blank)
            .finish()
    }
}

/// An immutable, fully resolved column descriptor.
#[derive(Clone)]
pub struct Column {
    name: String,
    length: usize,
    alignment: Alignment,
    padding: char,
    truncate: bool,
    group: Option<String>,
    kind: ColumnType,
    parser: Option<ParseFn>,
    formatter: Option<FormatFn>,
    nil_blank: bool,
}

impl Column {
    /// Resolve `options` into a column. Unset options take the defaults
    /// (right aligned, space padded, no truncation, string type).
    pub fn new(name: impl Into<String>, length: usize, options: ColumnOptions) -> Self {
        Self {
            name: name.into(),
            length,
            alignment: options.align.unwrap_or(DEFAULT_ALIGNMENT),
            padding: options.padding.unwrap_or(DEFAULT_PADDING),
            truncate: options.truncate.unwrap_or(false),
            group: options.group,
            kind: options.kind.unwrap_or_default(),
            parser: options.parser,
            formatter: options.formatter,
            nil_blank: options.nil_blank.unwrap_or(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn padding(&self) -> char {
        self.padding
    }

    pub fn truncate(&self) -> bool {
        self.truncate
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn kind(&self) -> &ColumnType {
        &self.kind
    }

    pub fn is_spacer(&self) -> bool {
        self.name == SPACER
    }

    /// Decode an exact-width slice.
    pub fn decode(&self, raw: &str) -> Result<Value> {
        if self.nil_blank && raw.trim().is_empty() {
            return Ok(Value::Null);
        }
        let parsed = match &self.parser {
            Some(parser) => parser(raw),
            None => self.kind.parse(raw, self.alignment),
        };
        parsed.map_err(|e| SchemaError::Parse {
            column: self.name.clone(),
            value: raw.to_string(),
            source: e,
        })
    }

    /// Encode a value to exactly `length` characters.
    pub fn encode(&self, value: &Value) -> Result<String> {
        let formatted = match &self.formatter {
            Some(formatter) => formatter(value),
            None => self.kind.format(value),
        };
        let sized = self.validate_size(formatted)?;
        Ok(self.pad(&sized))
    }

    fn validate_size(&self, formatted: String) -> Result<String> {
        let width = formatted.chars().count();
        if width <= self.length {
            return Ok(formatted);
        }
        if !self.truncate {
            return Err(SchemaError::FormattedValueTooLong {
                column: self.name.clone(),
                value: formatted,
                length: self.length,
            });
        }
        Ok(match self.alignment {
            Alignment::Right => formatted.chars().skip(width - self.length).collect(),
            Alignment::Left => formatted.chars().take(self.length).collect(),
        })
    }

    fn pad(&self, value: &str) -> String {
        let fill: String = std::iter::repeat_n(self.padding, self.length - value.chars().count())
            .collect();
        match self.alignment {
            Alignment::Left => format!("{value}{fill}"),
            Alignment::Right => format!("{fill}{value}"),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("length", &self.length)
            .field("alignment", &self.alignment)
            .field("padding", &self.padding)
            .field("truncate", &self.truncate)
            .field("group", &self.group)
            .field("kind", &self.kind)
            .field("nil_blank", &self.nil_blank)
            .finish_non_exhaustive()
    }
}
