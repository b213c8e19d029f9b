//! Schema construction
//!
//! Declarations are collected first and resolved only once, in
//! [`SchemaBuilder::build`], so every call on the built schema reuses the
//! same descriptors.

use crate::entity::entities_for;
use crate::error::{Result, SchemaError};
use crate::key::{resolve, Declaration};
use crate::schema::Schema;
use crate::types::{ArrayNaming, Cloner, Merger, SchemaConfig};
use serde_json::Value;
use std::sync::Arc;

/// Accumulates property declarations and settings for a [`Schema`]
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    // Declaration order is the descriptor order
    declarations: Vec<(String, Declaration)>,
    config: SchemaConfig,
}

impl SchemaBuilder {
    /// Create a new empty schema builder
    pub fn new() -> Self {
        SchemaBuilder::default()
    }

    /// Start from a JSON object mapping properties to declarations.
    ///
    /// ```rust
    /// use refgraph::{SchemaBuilder, SchemaConfig};
    /// use serde_json::json;
    ///
    /// # fn main() -> refgraph::Result<()> {
    /// let schema = SchemaBuilder::from_json(
    ///     &json!({ "director": "id", "movies": ["id"], "goose": ["geese", "id"] }),
    ///     SchemaConfig::default(),
    /// )?
    /// .build()?;
    ///
    /// let mut names: Vec<&str> = schema.descriptors().iter().map(|d| d.name()).collect();
    /// names.sort();
    /// assert_eq!(names, vec!["directors", "geese", "movies"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_json(declaration: &Value, config: SchemaConfig) -> Result<Self> {
        let Value::Object(fields) = declaration else {
            return Err(SchemaError::UnsupportedJson(format!(
                "a schema declaration must be an object, found `{}`",
                declaration
            )));
        };

        let mut builder = SchemaBuilder::new().config(config);
        for (prop, value) in fields {
            let parsed = Declaration::from_json(value, &builder.config).map_err(|err| SchemaError::at(prop, err))?;
            builder = builder.key(prop.as_str(), parsed);
        }

        Ok(builder)
    }

    /// Declare a property. Declaring the same property again replaces the
    /// earlier declaration but keeps its position.
    pub fn key(mut self, prop: impl Into<String>, declaration: impl Into<Declaration>) -> Self {
        let prop = prop.into();
        let declaration = declaration.into();

        match self.declarations.iter_mut().find(|(existing, _)| *existing == prop) {
            Some(slot) => slot.1 = declaration,
            None => self.declarations.push((prop, declaration)),
        }

        self
    }

    /// Replace all settings at once
    pub fn config(mut self, config: SchemaConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cloner(mut self, cloner: Cloner) -> Self {
        self.config.cloner = Some(cloner);
        self
    }

    pub fn default_merge(mut self, merger: Merger) -> Self {
        self.config.default_merge = merger;
        self
    }

    /// Convenience for [`SchemaBuilder::default_merge`] with a closure
    pub fn default_merge_with<F>(self, merger: F) -> Self
    where
        F: Fn(Value, &Value) -> Value + Send + Sync + 'static,
    {
        self.default_merge(Arc::new(merger))
    }

    pub fn array_naming(mut self, naming: ArrayNaming) -> Self {
        self.config.array_naming = naming;
        self
    }

    /// Resolve every declaration and build the schema
    pub fn build(self) -> Result<Schema> {
        let keys = self
            .declarations
            .into_iter()
            .map(|(prop, declaration)| match resolve(declaration) {
                Ok(descriptor) => Ok((prop, descriptor)),
                Err(err) => Err(SchemaError::at(prop, err)),
            })
            .collect::<Result<Vec<_>>>()?;

        let descriptors = entities_for(keys, &self.config);

        tracing::debug!(
            descriptors = descriptors.len(),
            names = ?descriptors.iter().map(|d| d.name()).collect::<Vec<_>>(),
            "built schema"
        );

        Ok(Schema::from_parts(descriptors, self.config.cloner))
    }
}
