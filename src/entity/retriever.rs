use crate::entity::accessor::Accessor;
use crate::key::Key;
use crate::types::{reference_key, Entities};
use serde_json::Value;

/// Denormalize-direction function of one property
pub type Retrieve = Box<dyn Fn(&Value, &Entities) -> Option<Value> + Send + Sync>;

/// Build the retriever resolving `item[prop]` against an entity table.
///
/// References are looked up under `name`; a reference with no entry is
/// returned unchanged.
pub fn retriever_for(prop: &str, key: &Key, name: &str, is_array: bool) -> Retrieve {
    let accessor = Accessor::new(prop, is_array);

    match key {
        Key::Schema(schema) => {
            let schema = schema.clone();
            Box::new(move |item: &Value, entities: &Entities| {
                accessor.apply(item, |value| schema.denormalize(value, entities))
            })
        }
        Key::Prop(_) | Key::Func(_) => {
            let name = name.to_string();
            Box::new(move |item: &Value, entities: &Entities| {
                accessor.apply(item, |reference| lookup(entities, &name, reference))
            })
        }
    }
}

fn lookup(entities: &Entities, name: &str, reference: &Value) -> Value {
    entities
        .get(name, &reference_key(reference))
        .cloned()
        .unwrap_or_else(|| reference.clone())
}
