//! # fixed-width-rs
//!
//! Define, write, and read multi-section fixed-width (positional) text files.
//!
//! Fixed-width files pack each record into a line where every field occupies
//! a known run of characters, padded to size. Real-world files mix several
//! record types: a header, many body rows, a footer, and sometimes sub-lines
//! that belong to the preceding body row (an address, a bank account).
//!
//! ## Overview
//!
//! - **[`Column`]**: one padded field with alignment, truncation, and
//!   pluggable parse/format functions
//! - **[`LineSchema`]**: ordered columns for one physical line, with a
//!   [`Trap`] deciding which raw lines it claims
//! - **[`Section`]**: a logical record: a first line plus nested child
//!   sections that may repeat, be optional, or be singular
//! - **[`Definition`]**: ordered top-level sections and reusable templates
//! - **[`Generator`]** / **[`Decoder`]**: data to text and back
//!
//! ## Example
//!
//! ```
//! use fixed_width_rs::{
//!     ColumnOptions, Decoder, Definition, Generator, SectionOptions, Trap, Value,
//! };
//!
//! let mut definition = Definition::default();
//! definition.section("header", SectionOptions::new(), |s| {
//!     s.trap(Trap::prefix("HEAD"))
//!         .column("kind", 4, ColumnOptions::new())?
//!         .column("doc", 10, ColumnOptions::new())?;
//!     Ok(())
//! })?;
//! definition.section("body", SectionOptions::new(), |s| {
//!     s.trap(Trap::not_prefixes(["HEAD", "FOOT"]))
//!         .column("id", 10, ColumnOptions::new())?
//!         .column("first", 10, ColumnOptions::new().left().group("name"))?
//!         .column("last", 10, ColumnOptions::new().left().group("name"))?;
//!     Ok(())
//! })?;
//!
//! let lines = ["HEAD      doc1", "     id123Ryan      Wood      "];
//! let data = Decoder::new(&definition).parse(&lines)?;
//! let body = data["body"].as_list().unwrap();
//! assert_eq!(body[0].get("id"), Some(&Value::from("id123")));
//!
//! let text = Generator::new(&definition).generate(&data)?;
//! assert_eq!(text, lines.join("\n") + "\n");
//! # Ok::<(), fixed_width_rs::SchemaError>(())
//! ```

pub mod column;
pub mod config;
pub mod decoder;
pub mod definition;
pub mod error;
pub mod generator;
pub mod line;
pub mod registry;
pub mod section;
pub mod trap;
pub mod value;

pub use column::{
    Alignment, BoxError, Column, ColumnOptions, ColumnType, FormatFn, ParseFn, SPACER,
};
pub use config::SchemaConfig;
pub use decoder::Decoder;
pub use definition::Definition;
pub use error::{Result, SchemaError};
pub use generator::{DEFAULT_RECORD_SEPARATOR, Generator};
pub use line::{LineBuilder, LineSchema, Templates};
pub use registry::{Registry, read_lines};
pub use section::{Cursor, Section, SectionBuilder, SectionOptions};
pub use trap::Trap;
pub use value::{Record, Value};
