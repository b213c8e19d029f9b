//! # refgraph - Schema-driven JSON normalization
//!
//! Flattens nested JSON object graphs into reference-based records plus a
//! lookup table of entities, and rebuilds the nested form from them.
//!
//! ## Modules
//!
//! - **key**: key declarations and their resolution
//! - **entity**: per-property extractors, retrievers and descriptors
//! - **transform**: normalize, denormalize and entity collection
//! - **schema**: the [`Schema`] facade, its builder and the `linear` cloner
//!
//! ## Quick Start
//!
//! ```rust
//! use refgraph::{Declaration, Schema};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let movies = Schema::builder()
//!     .key("director", Declaration::func(|d| d["id"].clone()))
//!     .build()?;
//!
//! let movie = json!({ "id": 1, "director": { "id": "t1", "name": "X" } });
//!
//! let normalized = movies.normalize(&movie);
//! assert_eq!(normalized, json!({ "id": 1, "director": "t1" }));
//!
//! let entities = movies.entities(&movie);
//! assert_eq!(entities.to_value(), json!({ "directors": { "t1": { "id": "t1", "name": "X" } } }));
//!
//! assert_eq!(movies.denormalize(&normalized, &entities), movie);
//! # Ok(())
//! # }
//! ```
//!
//! Array properties wrap their key in a one-element sequence:
//!
//! ```rust
//! use refgraph::{Declaration, Schema};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let directors = Schema::builder()
//!     .key("movies", Declaration::seq([Declaration::func(|m| m["id"].clone())]))
//!     .build()?;
//!
//! let director = json!({ "movies": [{ "id": 1 }, { "id": 2 }] });
//! assert_eq!(directors.normalize(&director), json!({ "movies": [1, 2] }));
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result as AnyResult};
use serde_json::Value;
use std::io::BufRead;

pub mod entity;
pub mod error;
pub mod key;
pub mod pluralize;
pub mod schema;
pub mod transform;
pub mod types;

// Re-export commonly used types for convenience
pub use entity::EntityDescriptor;
pub use error::{Result, SchemaError};
pub use key::{resolve, Declaration, Key, KeyDescriptor};
pub use pluralize::pluralize;
pub use schema::{linear, Schema, SchemaBuilder};
pub use types::{
    default_clone, reference_key, shallow_merge, ArrayNaming, Cloner, Entities, KeyFn, Merger, SchemaConfig,
};

/// Read JSON input: one value, or one value per non-empty line when
/// `ndjson` is set
pub fn read_values<R: BufRead>(mut reader: R, ndjson: bool) -> AnyResult<Vec<Value>> {
    if !ndjson {
        let value: Value = serde_json::from_reader(&mut reader).context("Failed to parse JSON")?;
        return Ok(vec![value]);
    }

    let mut values = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(line)
            .with_context(|| format!("Failed to parse JSON on line {}", number + 1))?;
        values.push(value);
    }

    Ok(values)
}
