use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

// 2^53; f64 holds every integer below it
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Maps a nested value to the reference that stands in for it
pub type KeyFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Combines an existing entity with an incoming occurrence of it
pub type Merger = Arc<dyn Fn(Value, &Value) -> Value + Send + Sync>;

/// Copies an item before it is processed or scanned
pub type Cloner = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Lookup table of entities found in one or more items.
///
/// The outer map is keyed by entity name (pluralized property or alias),
/// the inner map by stringified reference key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entities {
    tables: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Entities {
    pub fn new() -> Self {
        Entities::default()
    }

    /// Load a table previously produced by [`Entities::to_value`] or any
    /// `{ name: { key: entity } }` JSON object
    pub fn from_value(value: Value) -> crate::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Value {
        let tables = self
            .tables
            .iter()
            .map(|(name, table)| {
                let entries: Map<String, Value> = table
                    .iter()
                    .map(|(key, entity)| (key.clone(), entity.clone()))
                    .collect();
                (name.clone(), Value::Object(entries))
            })
            .collect();
        Value::Object(tables)
    }

    pub fn get(&self, name: &str, key: &str) -> Option<&Value> {
        self.tables.get(name).and_then(|table| table.get(key))
    }

    pub fn table(&self, name: &str) -> Option<&BTreeMap<String, Value>> {
        self.tables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Insert an entity, replacing whatever was stored under the same key
    pub fn insert(&mut self, name: impl Into<String>, key: impl Into<String>, entity: Value) {
        self.tables
            .entry(name.into())
            .or_default()
            .insert(key.into(), entity);
    }

    pub(crate) fn ensure_table(&mut self, name: &str) -> &mut BTreeMap<String, Value> {
        self.tables.entry(name.to_string()).or_default()
    }
}

/// How entity names are derived for array-shaped keys declared without alias
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrayNaming {
    /// Use the property name as-is (`movies` stays `movies`)
    #[default]
    Property,
    /// Pluralize the property name like single keys
    Pluralized,
}

/// Defaults applied while building a schema
#[derive(Clone)]
pub struct SchemaConfig {
    /// Copies items before normalize, denormalize and collection. `None`
    /// copies only the fields no descriptor overwrites, and collection reads
    /// items in place.
    pub cloner: Option<Cloner>,

    /// Merge used by properties declared without their own merger
    pub default_merge: Merger,

    /// Naming rule for unaliased array keys
    pub array_naming: ArrayNaming,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        SchemaConfig {
            cloner: None,
            default_merge: Arc::new(shallow_merge),
            array_naming: ArrayNaming::default(),
        }
    }
}

impl fmt::Debug for SchemaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaConfig")
            .field("array_naming", &self.array_naming)
            .finish_non_exhaustive()
    }
}

/// Plain copy of an item
pub fn default_clone(item: &Value) -> Value {
    item.clone()
}

/// Right-biased shallow merge: fields of `incoming` overwrite `existing`.
///
/// A non-object on either side yields a copy of `incoming`.
pub fn shallow_merge(existing: Value, incoming: &Value) -> Value {
    match (existing, incoming) {
        (Value::Object(mut merged), Value::Object(fields)) => {
            for (field, value) in fields {
                merged.insert(field.clone(), value.clone());
            }
            Value::Object(merged)
        }
        (_, other) => other.clone(),
    }
}

/// Stringify a reference the way it is keyed in [`Entities`].
///
/// Strings are used verbatim, numbers and booleans in their literal form,
/// arrays as their comma-joined elements and objects as compact JSON.
pub fn reference_key(reference: &Value) -> String {
    match reference {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_key(n),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::from("null"),
        Value::Array(items) => items
            .iter()
            .map(reference_key)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => reference.to_string(),
    }
}

// Integral floats key like integers, so `1.0` and `1` share an entry
fn number_key(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

/// `null`, `false`, zero and the empty string contribute no entity
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shallow_merge_is_right_biased() {
        let merged = shallow_merge(json!({"id": 1, "name": "a", "x": true}), &json!({"id": 1, "name": "b"}));
        assert_eq!(merged, json!({"id": 1, "name": "b", "x": true}));
    }

    #[test]
    fn test_shallow_merge_into_placeholder() {
        let merged = shallow_merge(json!({}), &json!({"id": "t1"}));
        assert_eq!(merged, json!({"id": "t1"}));

        assert_eq!(shallow_merge(json!({"id": 1}), &json!(7)), json!(7));
    }

    #[test]
    fn test_reference_keys_are_strings() {
        assert_eq!(reference_key(&json!("t1")), "t1");
        assert_eq!(reference_key(&json!(42)), "42");
        assert_eq!(reference_key(&json!(false)), "false");
        assert_eq!(reference_key(&json!(null)), "null");
        assert_eq!(reference_key(&json!([1, "a"])), "1,a");
        assert_eq!(reference_key(&json!({"id": 1})), r#"{"id":1}"#);
    }

    #[test]
    fn test_integral_floats_key_like_integers() {
        assert_eq!(reference_key(&json!(1.0)), "1");
        assert_eq!(reference_key(&json!(-3.0)), "-3");
        assert_eq!(reference_key(&json!(1.5)), "1.5");
        assert_eq!(reference_key(&json!(u64::MAX)), u64::MAX.to_string());
    }

    #[test]
    fn test_falsy_values() {
        assert!(is_falsy(&json!(null)));
        assert!(is_falsy(&json!(false)));
        assert!(is_falsy(&json!(0)));
        assert!(is_falsy(&json!(0.0)));
        assert!(is_falsy(&json!("")));
        assert!(!is_falsy(&json!([])));
        assert!(!is_falsy(&json!({})));
        assert!(!is_falsy(&json!(1)));
    }

    #[test]
    fn test_entities_value_round_trip() {
        let mut entities = Entities::new();
        entities.insert("directors", "t1", json!({"id": "t1"}));
        entities.insert("movies", "1", json!({"id": 1}));

        let value = entities.to_value();
        assert_eq!(value, json!({"directors": {"t1": {"id": "t1"}}, "movies": {"1": {"id": 1}}}));
        assert_eq!(serde_json::to_value(&entities).unwrap(), value);

        let loaded = Entities::from_value(value).unwrap();
        assert_eq!(loaded, entities);
        assert_eq!(loaded.names().collect::<Vec<_>>(), vec!["directors", "movies"]);
    }

    #[test]
    fn test_entities_from_malformed_value() {
        assert!(Entities::from_value(json!({"directors": 3})).is_err());
    }
}
