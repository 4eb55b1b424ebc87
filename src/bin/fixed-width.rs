//! CLI tool to decode and encode fixed-width files with a JSON schema description.
//!
//! Usage:
//!   fixed-width decode --schema <schema.json> <input.txt> [-o output.json]
//!   fixed-width encode --schema <schema.json> <data.json> [-o output.txt]
//!
//! If no output file is specified, writes to stdout.

use clap::{Parser, Subcommand};
use fixed_width_rs::{Decoder, Generator, Record, SchemaConfig, SchemaError, Value, read_lines};
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Decode and encode multi-section fixed-width text files.
#[derive(Parser)]
#[command(name = "fixed-width")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log schema, section, and record details on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a fixed-width file into JSON
    Decode {
        /// Schema description file (.json)
        #[arg(short, long)]
        schema: PathBuf,

        /// Fixed-width input file (or /dev/stdin)
        input: PathBuf,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Encode JSON data into a fixed-width file
    Encode {
        /// Schema description file (.json)
        #[arg(short, long)]
        schema: PathBuf,

        /// JSON data keyed by section name
        input: PathBuf,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Record separator written after every line
        #[arg(long, default_value = "\n")]
        separator: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(command: Command) -> Result<(), SchemaError> {
    match command {
        Command::Decode {
            schema,
            input,
            output,
        } => {
            let definition = SchemaConfig::from_path(&schema)?.into_definition()?;
            let lines = read_lines(BufReader::new(File::open(&input)?))?;
            info!(schema = %schema.display(), input = %input.display(), lines = lines.len(), "decoding");

            let data = Decoder::new(&definition).parse(&lines)?;
            let mut text = serde_json::to_string_pretty(&Value::Map(data))?;
            text.push('\n');
            emit(output.as_deref(), &text)
        }
        Command::Encode {
            schema,
            input,
            output,
            separator,
        } => {
            let definition = SchemaConfig::from_path(&schema)?.into_definition()?;
            let data: Record = serde_json::from_str(&fs::read_to_string(&input)?)?;
            info!(schema = %schema.display(), input = %input.display(), sections = data.len(), "encoding");

            let text = Generator::new(&definition)
                .with_separator(separator)
                .generate(&data)?;
            emit(output.as_deref(), &text)
        }
    }
}

fn emit(output: Option<&Path>, text: &str) -> Result<(), SchemaError> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, text)?;
            info!(output = %path.display(), bytes = text.len(), "wrote output");
        }
        None => io::stdout().write_all(text.as_bytes())?,
    }
    Ok(())
}
