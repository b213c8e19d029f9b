//! refgraph: normalize and denormalize JSON against a declared schema
//!
//! The schema file is a JSON object mapping properties to declarations:
//! `"id"` (direct key), `["id"]` (array), `["alias", "id"]` (aliased) or a
//! nested object (nested schema).
//!
//! Usage:
//!   # Normalize a file
//!   refgraph --schema movie.json normalize movies.json
//!
//!   # Collect entities from NDJSON on stdin
//!   cat movies.jsonl | refgraph --schema movie.json entities --ndjson
//!
//!   # Rebuild nested records from a stored entity table
//!   refgraph --schema movie.json denormalize --entities table.json normalized.json

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use refgraph::{read_values, ArrayNaming, Entities, Schema, SchemaBuilder, SchemaConfig};
use serde_json::Value;
use std::fs::File;
use std::io::{stdin, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "refgraph")]
#[command(about = "Normalize and denormalize JSON against a declared schema", long_about = None)]
struct Args {
    /// Schema declaration (JSON object)
    #[arg(long, short = 's', value_name = "FILE")]
    schema: PathBuf,

    /// Pluralize entity names of unaliased array keys
    #[arg(long)]
    pluralize_arrays: bool,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Process newline-delimited JSON (one JSON value per line)
    #[arg(long)]
    ndjson: bool,

    /// Compact output (no pretty-printing)
    #[arg(long)]
    compact: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace nested entities with their references
    Normalize(InputArgs),
    /// Print the entity table of all input values
    Entities(InputArgs),
    /// Replace references with entities from a table
    Denormalize {
        /// Entity table produced by `entities`
        #[arg(long, short = 'e', value_name = "FILE")]
        entities: PathBuf,

        #[command(flatten)]
        io: InputArgs,
    },
}

impl Command {
    fn input(&self) -> &InputArgs {
        match self {
            Command::Normalize(io) | Command::Entities(io) => io,
            Command::Denormalize { io, .. } => io,
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json_file(path: &Path) -> Result<Value> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file)).with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_schema(path: &Path, pluralize_arrays: bool) -> Result<Schema> {
    let declaration = read_json_file(path)?;

    let config = SchemaConfig {
        array_naming: if pluralize_arrays {
            ArrayNaming::Pluralized
        } else {
            ArrayNaming::Property
        },
        ..SchemaConfig::default()
    };

    let schema = SchemaBuilder::from_json(&declaration, config)
        .and_then(SchemaBuilder::build)
        .with_context(|| format!("Invalid schema in {}", path.display()))?;
    Ok(schema)
}

fn print(value: &Value, compact: bool) -> Result<()> {
    let output = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };

    println!("{}", output);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let schema = load_schema(&args.schema, args.pluralize_arrays)?;
    let io = args.command.input();

    // Create reader based on input source
    let reader: Box<dyn BufRead> = if let Some(path) = &io.input {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Box::new(BufReader::new(file))
    } else {
        Box::new(BufReader::new(stdin()))
    };

    let values = read_values(reader, io.ndjson)?;
    if values.is_empty() {
        tracing::warn!("no JSON values found in input");
    }
    tracing::info!(count = values.len(), "read input values");

    match &args.command {
        Command::Normalize(io) => {
            for value in &values {
                print(&schema.normalize(value), io.compact)?;
            }
        }
        Command::Entities(io) => {
            let entities = schema.entities_all(&values);
            print(&entities.to_value(), io.compact)?;
        }
        Command::Denormalize { entities, io } => {
            let table = Entities::from_value(read_json_file(entities)?)
                .with_context(|| format!("Invalid entity table in {}", entities.display()))?;

            for value in &values {
                print(&schema.denormalize(value, &table), io.compact)?;
            }
        }
    }

    Ok(())
}
