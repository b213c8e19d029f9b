use crate::entity::EntityDescriptor;
use crate::types::{is_falsy, reference_key, Cloner, Entities};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Collect all entities referenced by `items` into a fresh table.
///
/// Entities are merged into the table item by item instead of building a
/// table per item and merging those afterwards, which would loop over every
/// entity name and key again for each item:
///
/// ```text
/// item1 => { clients: { 1: { id: 1, name: "abc" } } }
/// item2 => { clients: { 1: { id: 1, name: "xyz" } } }
/// table => { clients: { 1: { id: 1, name: "xyz" } } }
/// ```
pub fn entities_in<'a, I>(items: I, descriptors: &[EntityDescriptor], cloner: Option<&Cloner>) -> Entities
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut entities = Entities::new();

    for item in items {
        set_entities(&mut entities, item, descriptors, cloner);
    }

    entities
}

/// Merge the entities of one item into `entities`.
///
/// Items are read in place unless a cloner is given. A nested-schema
/// property adds no entry of its own; the entities of its schema are
/// collected into the same table instead.
pub(crate) fn set_entities(
    entities: &mut Entities,
    item: &Value,
    descriptors: &[EntityDescriptor],
    cloner: Option<&Cloner>,
) {
    let item = match cloner {
        Some(cloner) => Cow::Owned(cloner(item)),
        None => Cow::Borrowed(item),
    };

    for descriptor in descriptors {
        let Some(raw) = item.get(descriptor.prop()) else {
            continue;
        };

        if is_falsy(raw) {
            continue;
        }

        if let Some(nested) = descriptor.nested() {
            nested.collect_into(entities, raw);
            continue;
        }

        let references = descriptor.extract(&item).unwrap_or(Value::Null);
        let table = entities.ensure_table(descriptor.name());

        match (raw, &references) {
            (Value::Array(values), Value::Array(keys)) => {
                for (value, key) in values.iter().zip(keys) {
                    if !is_falsy(value) {
                        set_entity(table, reference_key(key), value, descriptor);
                    }
                }
            }
            _ => set_entity(table, reference_key(&references), raw, descriptor),
        }
    }
}

fn set_entity(table: &mut BTreeMap<String, Value>, key: String, incoming: &Value, descriptor: &EntityDescriptor) {
    let existing = table
        .remove(&key)
        .unwrap_or_else(|| Value::Object(Map::new()));

    table.insert(key, descriptor.merge(existing, incoming));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::entities_for;
    use crate::key::{Declaration, Key, KeyDescriptor};
    use crate::schema::Schema;
    use crate::types::SchemaConfig;
    use serde_json::json;

    fn descriptors(keys: Vec<(&str, KeyDescriptor)>) -> Vec<EntityDescriptor> {
        let keys = keys.into_iter().map(|(prop, key)| (prop.to_string(), key)).collect();
        entities_for(keys, &SchemaConfig::default())
    }

    #[test]
    fn test_single_item() {
        let descriptors = descriptors(vec![("director", KeyDescriptor::new(Key::func(|d| d["id"].clone())))]);

        let item = json!({"id": 1, "director": {"id": "t1", "name": "X"}});
        let entities = entities_in([&item], &descriptors, None);

        assert_eq!(entities.to_value(), json!({"directors": {"t1": {"id": "t1", "name": "X"}}}));
    }

    #[test]
    fn test_last_merged_wins_across_items() {
        let descriptors = descriptors(vec![("client", KeyDescriptor::new(Key::prop("id")))]);

        let items = vec![
            json!({"client": {"id": 1, "name": "abc", "vip": true}}),
            json!({"client": {"id": 1, "name": "xyz"}}),
        ];
        let entities = entities_in(&items, &descriptors, None);

        assert_eq!(entities.get("clients", "1"), Some(&json!({"id": 1, "name": "xyz", "vip": true})));
    }

    #[test]
    fn test_custom_merger_controls_collisions() {
        let descriptors = descriptors(vec![("client", KeyDescriptor::new(Key::prop("id")).merged_with(|a, b| {
            if a.as_object().map_or(true, |fields| fields.is_empty()) {
                b.clone()
            } else {
                a
            }
        }))]);

        let items = vec![
            json!({"client": {"id": 1, "name": "abc"}}),
            json!({"client": {"id": 1, "name": "xyz"}}),
        ];
        let entities = entities_in(&items, &descriptors, None);

        assert_eq!(entities.get("clients", "1"), Some(&json!({"id": 1, "name": "abc"})));
    }

    #[test]
    fn test_array_values_pair_with_their_keys() {
        let descriptors = descriptors(vec![("movies", KeyDescriptor::new(Key::prop("id")).array())]);

        let item = json!({"movies": [{"id": 1, "title": "A"}, {"id": 2, "title": "B"}]});
        let entities = entities_in([&item], &descriptors, None);

        assert_eq!(
            entities.to_value(),
            json!({"movies": {"1": {"id": 1, "title": "A"}, "2": {"id": 2, "title": "B"}}})
        );
    }

    #[test]
    fn test_falsy_values_are_skipped() {
        let descriptors = descriptors(vec![
            ("director", KeyDescriptor::new(Key::prop("id"))),
            ("producer", KeyDescriptor::new(Key::prop("id"))),
        ]);

        let items = vec![
            json!({"id": 5, "title": "Directorless"}),
            json!({"id": 6, "director": null, "producer": ""}),
        ];
        let entities = entities_in(&items, &descriptors, None);

        assert!(entities.is_empty());
    }

    #[test]
    fn test_falsy_array_elements_are_skipped() {
        let descriptors = descriptors(vec![("movies", KeyDescriptor::new(Key::prop("id")).array())]);

        let item = json!({"movies": [{"id": 1}, null, 0]});
        let entities = entities_in([&item], &descriptors, None);

        assert_eq!(entities.to_value(), json!({"movies": {"1": {"id": 1}}}));
    }

    #[test]
    fn test_nested_schema_adds_no_owner_entry() {
        let director = Schema::builder()
            .key("movies", Declaration::seq([Declaration::prop("id")]))
            .build()
            .unwrap();
        let descriptors = descriptors(vec![("director", KeyDescriptor::new(Key::Schema(director)))]);

        let item = json!({"id": 1, "director": {"id": "t1", "movies": [{"id": 1}, {"id": 2}]}});
        let entities = entities_in([&item], &descriptors, None);

        assert_eq!(entities.to_value(), json!({"movies": {"1": {"id": 1}, "2": {"id": 2}}}));
    }

    #[test]
    fn test_cloner_runs_before_collection() {
        let cloner: Cloner = std::sync::Arc::new(|item: &Value| {
            let mut copy = item.clone();
            copy["client"]["seen"] = json!(true);
            copy
        });
        let descriptors = descriptors(vec![("client", KeyDescriptor::new(Key::prop("id")))]);

        let item = json!({"client": {"id": 1}});
        let entities = entities_in([&item], &descriptors, Some(&cloner));

        assert_eq!(entities.get("clients", "1"), Some(&json!({"id": 1, "seen": true})));
    }

    #[test]
    fn test_empty_array_creates_empty_table() {
        let descriptors = descriptors(vec![("movies", KeyDescriptor::new(Key::prop("id")).array())]);

        let item = json!({"movies": []});
        let entities = entities_in([&item], &descriptors, None);

        assert!(entities.contains("movies"));
        assert!(entities.table("movies").unwrap().is_empty());
    }
}
