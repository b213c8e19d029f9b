use crate::entity::accessor::accessor_for;
use crate::key::Key;
use serde_json::Value;

/// Normalize-direction function of one property
pub type Extract = Box<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

type ValueFn = Box<dyn Fn(&Value) -> Value + Send + Sync>;

/// Build the extractor deriving the reference form of `item[prop]`
pub fn extractor_for(prop: &str, key: &Key, is_array: bool) -> Extract {
    Box::new(accessor_for(prop, is_array, extractor(key)))
}

fn extractor(key: &Key) -> ValueFn {
    match key.clone() {
        Key::Prop(name) => thru(move |value| value.get(&name).cloned().unwrap_or(Value::Null)),
        Key::Func(f) => thru(move |value| f(value)),
        Key::Schema(schema) => thru(move |value| schema.normalize(value)),
    }
}

/// Only objects are extracted; anything else is already a reference
fn thru<F>(f: F) -> ValueFn
where
    F: Fn(&Value) -> Value + Send + Sync + 'static,
{
    Box::new(move |value: &Value| if value.is_object() { f(value) } else { value.clone() })
}
