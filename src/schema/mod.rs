//! The schema facade
//!
//! A [`Schema`] binds the entity descriptors built from one declaration and
//! exposes `normalize`, `denormalize` and `entities` over single items or
//! arrays of items.

pub mod builder;
pub mod linear;

pub use builder::SchemaBuilder;
pub use linear::linear;

use crate::entity::EntityDescriptor;
use crate::transform::{self, collect};
use crate::types::{Cloner, Entities};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A reusable, shareable schema. Cloning is cheap.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

struct SchemaInner {
    descriptors: Vec<EntityDescriptor>,
    cloner: Option<Cloner>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Build a schema from a JSON declaration with default settings
    pub fn from_json(declaration: &Value) -> crate::Result<Self> {
        SchemaBuilder::from_json(declaration, Default::default())?.build()
    }

    pub(crate) fn from_parts(descriptors: Vec<EntityDescriptor>, cloner: Option<Cloner>) -> Self {
        Schema {
            inner: Arc::new(SchemaInner { descriptors, cloner }),
        }
    }

    pub fn descriptors(&self) -> &[EntityDescriptor] {
        &self.inner.descriptors
    }

    /// Switch nested values for their references, e.g.
    /// `{ "child": { "id": 1 } }` => `{ "child": 1 }`.
    ///
    /// Arrays are normalized element-wise. Undeclared properties are kept.
    pub fn normalize(&self, data: &Value) -> Value {
        match data {
            Value::Array(items) => Value::Array(items.iter().map(|item| self.normalize_one(item)).collect()),
            item => self.normalize_one(item),
        }
    }

    /// Restore normalized data from an entity table.
    ///
    /// A reference with no matching entity is kept, e.g. `{ "child": 1 }`.
    pub fn denormalize(&self, data: &Value, entities: &Entities) -> Value {
        match data {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.denormalize_one(item, entities))
                    .collect(),
            ),
            item => self.denormalize_one(item, entities),
        }
    }

    /// Collect the entities referenced by an item or an array of items.
    ///
    /// Tables are named after the (pluralized or aliased) properties and
    /// keyed by stringified reference. A property declared with a nested
    /// schema has no table of its own: its value is the nested schema's
    /// normalized form, and the entities under it are collected into the
    /// same table.
    pub fn entities(&self, data: &Value) -> Entities {
        self.entities_all([data])
    }

    /// Collect the entities of several inputs into one table. Each input is
    /// an item or an array of items, as for [`Schema::entities`].
    pub fn entities_all<'a, I>(&self, inputs: I) -> Entities
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let inner = &self.inner;
        let items = inputs.into_iter().flat_map(items_of);
        let entities = collect::entities_in(items, &inner.descriptors, inner.cloner.as_ref());

        tracing::trace!(tables = ?entities.names().collect::<Vec<_>>(), "collected entities");
        entities
    }

    /// Merge the entities of `data` into an existing table
    pub(crate) fn collect_into(&self, entities: &mut Entities, data: &Value) {
        for item in items_of(data) {
            collect::set_entities(entities, item, &self.inner.descriptors, self.inner.cloner.as_ref());
        }
    }

    fn normalize_one(&self, item: &Value) -> Value {
        transform::normalize(item, &self.inner.descriptors, self.inner.cloner.as_ref())
    }

    fn denormalize_one(&self, item: &Value, entities: &Entities) -> Value {
        transform::denormalize(item, &self.inner.descriptors, entities, self.inner.cloner.as_ref())
    }
}

fn items_of(data: &Value) -> &[Value] {
    match data {
        Value::Array(items) => items,
        item => std::slice::from_ref(item),
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("descriptors", &self.inner.descriptors)
            .finish_non_exhaustive()
    }
}
