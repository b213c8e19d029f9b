use crate::entity::EntityDescriptor;
use crate::types::{Cloner, Entities};
use serde_json::{Map, Value};

/// Copy `item` and overwrite each descriptor's property with the result of
/// `transform`. A `None` result leaves the property untouched.
///
/// Without a cloner only the undeclared fields are copied; declared ones are
/// rebuilt by `transform`. Non-object items are returned as a plain copy.
pub fn process<F>(item: &Value, descriptors: &[EntityDescriptor], cloner: Option<&Cloner>, mut transform: F) -> Value
where
    F: FnMut(&EntityDescriptor) -> Option<Value>,
{
    let Value::Object(fields) = item else {
        return item.clone();
    };

    let mut clone = match cloner {
        Some(cloner) => cloner(item),
        None => Value::Object(undeclared(fields, descriptors)),
    };

    if let Value::Object(copy) = &mut clone {
        for descriptor in descriptors {
            let prop = descriptor.prop();
            match transform(descriptor) {
                Some(value) => {
                    copy.insert(prop.to_string(), value);
                }
                None if cloner.is_none() => {
                    if let Some(value) = fields.get(prop) {
                        copy.insert(prop.to_string(), value.clone());
                    }
                }
                None => {}
            }
        }
    }

    clone
}

fn undeclared(fields: &Map<String, Value>, descriptors: &[EntityDescriptor]) -> Map<String, Value> {
    fields
        .iter()
        .filter(|(field, _)| !descriptors.iter().any(|descriptor| descriptor.prop() == field.as_str()))
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect()
}

/// Replace every declared property with its reference form
pub fn normalize(item: &Value, descriptors: &[EntityDescriptor], cloner: Option<&Cloner>) -> Value {
    process(item, descriptors, cloner, |descriptor| descriptor.extract(item))
}

/// Replace every declared reference with its entity from `entities`.
/// References without an entry are kept.
pub fn denormalize(
    item: &Value,
    descriptors: &[EntityDescriptor],
    entities: &Entities,
    cloner: Option<&Cloner>,
) -> Value {
    process(item, descriptors, cloner, |descriptor| descriptor.retrieve(item, entities))
}
