use crate::entity::extractor::{extractor_for, Extract};
use crate::entity::retriever::{retriever_for, Retrieve};
use crate::key::KeyDescriptor;
use crate::pluralize::pluralize;
use crate::schema::Schema;
use crate::types::{ArrayNaming, Entities, Merger, SchemaConfig};
use serde_json::Value;
use std::fmt;

/// Everything needed to normalize, denormalize and collect one property
pub struct EntityDescriptor {
    name: String,
    prop: String,
    is_array: bool,
    merge: Merger,
    extract: Extract,
    retrieve: Retrieve,
    nested: Option<Schema>,
}

impl EntityDescriptor {
    /// Entity table name the property's entities are stored under
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prop(&self) -> &str {
        &self.prop
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn merge(&self, existing: Value, incoming: &Value) -> Value {
        (self.merge)(existing, incoming)
    }

    pub fn extract(&self, item: &Value) -> Option<Value> {
        (self.extract)(item)
    }

    pub fn retrieve(&self, item: &Value, entities: &Entities) -> Option<Value> {
        (self.retrieve)(item, entities)
    }

    /// Nested schema of the property, if it was declared with one
    pub fn nested(&self) -> Option<&Schema> {
        self.nested.as_ref()
    }
}

impl fmt::Debug for EntityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("name", &self.name)
            .field("prop", &self.prop)
            .field("is_array", &self.is_array)
            .field("nested", &self.nested.is_some())
            .finish_non_exhaustive()
    }
}

/// Entity name: alias, else the property (array keys) or its plural
fn entity_name(prop: &str, descriptor: &KeyDescriptor, naming: ArrayNaming) -> String {
    if let Some(alias) = &descriptor.alias {
        return alias.clone();
    }

    match (descriptor.is_array, naming) {
        (true, ArrayNaming::Property) => prop.to_string(),
        _ => pluralize(prop),
    }
}

/// Build one descriptor per declared property, in declaration order
pub fn entities_for(keys: Vec<(String, KeyDescriptor)>, config: &SchemaConfig) -> Vec<EntityDescriptor> {
    keys.into_iter()
        .map(|(prop, descriptor)| {
            let name = entity_name(&prop, &descriptor, config.array_naming);

            EntityDescriptor {
                extract: extractor_for(&prop, &descriptor.key, descriptor.is_array),
                retrieve: retriever_for(&prop, &descriptor.key, &name, descriptor.is_array),
                merge: descriptor.merger.unwrap_or_else(|| config.default_merge.clone()),
                nested: descriptor.key.nested().cloned(),
                is_array: descriptor.is_array,
                name,
                prop,
            }
        })
        .collect()
}
