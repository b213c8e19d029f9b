use crate::error::{Result, SchemaError};
use crate::key::resolve::{Key, KeyDescriptor};
use crate::schema::{Schema, SchemaBuilder};
use crate::types::{KeyFn, Merger, SchemaConfig};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A raw key declaration for one schema property.
///
/// The sequence forms are resolved by [`resolve`](crate::key::resolve):
///
/// | shape                       | meaning                          |
/// |-----------------------------|----------------------------------|
/// | `key`                       | direct key                       |
/// | `[key]`                     | array of entities                |
/// | `[[key], merge]`            | array with merger                |
/// | `[alias, [key], merge?]`    | aliased array                    |
/// | `[alias, key, merge?]`      | aliased direct key               |
/// | `[key, merge]`              | direct key with merger           |
#[derive(Clone)]
pub enum Declaration {
    Prop(String),
    Func(KeyFn),
    Schema(Schema),
    Merge(Merger),
    Seq(Vec<Declaration>),
}

impl Declaration {
    pub fn prop(name: impl Into<String>) -> Self {
        Declaration::Prop(name.into())
    }

    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Declaration::Func(Arc::new(f))
    }

    pub fn schema(schema: &Schema) -> Self {
        Declaration::Schema(schema.clone())
    }

    pub fn merge<F>(f: F) -> Self
    where
        F: Fn(Value, &Value) -> Value + Send + Sync + 'static,
    {
        Declaration::Merge(Arc::new(f))
    }

    pub fn seq(items: impl IntoIterator<Item = Declaration>) -> Self {
        Declaration::Seq(items.into_iter().collect())
    }

    /// Read a function-free declaration from JSON.
    ///
    /// Strings are property keys, arrays are sequences and objects declare a
    /// nested schema built with `config`.
    pub fn from_json(value: &Value, config: &SchemaConfig) -> Result<Self> {
        match value {
            Value::String(name) => Ok(Declaration::Prop(name.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| Declaration::from_json(item, config))
                .collect::<Result<Vec<_>>>()
                .map(Declaration::Seq),
            Value::Object(_) => {
                let nested = SchemaBuilder::from_json(value, config.clone())?.build()?;
                Ok(Declaration::Schema(nested))
            }
            other => Err(SchemaError::UnsupportedJson(format!(
                "expected a string, array or object, found `{}`",
                other
            ))),
        }
    }

    /// Compact shape used in error messages, e.g. `[key, [fn], merge]`
    pub fn shape(&self) -> String {
        match self {
            Declaration::Prop(_) => String::from("key"),
            Declaration::Func(_) => String::from("fn"),
            Declaration::Schema(_) => String::from("schema"),
            Declaration::Merge(_) => String::from("merge"),
            Declaration::Seq(items) => format!(
                "[{}]",
                items.iter().map(Declaration::shape).collect::<Vec<_>>().join(", ")
            ),
        }
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Prop(name) => f.debug_tuple("Prop").field(name).finish(),
            Declaration::Func(_) => f.write_str("Func(..)"),
            Declaration::Schema(schema) => f.debug_tuple("Schema").field(schema).finish(),
            Declaration::Merge(_) => f.write_str("Merge(..)"),
            Declaration::Seq(items) => f.debug_tuple("Seq").field(items).finish(),
        }
    }
}

impl From<&str> for Declaration {
    fn from(name: &str) -> Self {
        Declaration::Prop(name.to_string())
    }
}

impl From<String> for Declaration {
    fn from(name: String) -> Self {
        Declaration::Prop(name)
    }
}

impl From<Schema> for Declaration {
    fn from(schema: Schema) -> Self {
        Declaration::Schema(schema)
    }
}

impl From<&Schema> for Declaration {
    fn from(schema: &Schema) -> Self {
        Declaration::Schema(schema.clone())
    }
}

impl From<Vec<Declaration>> for Declaration {
    fn from(items: Vec<Declaration>) -> Self {
        Declaration::Seq(items)
    }
}

impl From<Key> for Declaration {
    fn from(key: Key) -> Self {
        match key {
            Key::Prop(name) => Declaration::Prop(name),
            Key::Func(f) => Declaration::Func(f),
            Key::Schema(schema) => Declaration::Schema(schema),
        }
    }
}

/// Canonical declaration of an already resolved descriptor
impl From<KeyDescriptor> for Declaration {
    fn from(descriptor: KeyDescriptor) -> Self {
        let KeyDescriptor {
            key,
            is_array,
            alias,
            merger,
        } = descriptor;

        let key = Declaration::from(key);
        let key = if is_array { Declaration::Seq(vec![key]) } else { key };

        match (alias, merger) {
            (None, None) => key,
            (None, Some(merger)) => Declaration::Seq(vec![key, Declaration::Merge(merger)]),
            (Some(alias), merger) => {
                let mut items = vec![Declaration::Prop(alias), key];
                items.extend(merger.map(Declaration::Merge));
                Declaration::Seq(items)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shape() {
        let declaration = Declaration::seq([
            Declaration::prop("films"),
            Declaration::seq([Declaration::func(|m| m["id"].clone())]),
            Declaration::merge(|_, b| b.clone()),
        ]);
        assert_eq!(declaration.shape(), "[key, [fn], merge]");
    }

    #[test]
    fn test_from_json_strings_and_arrays() {
        let config = SchemaConfig::default();

        let declaration = Declaration::from_json(&json!(["producers", "id"]), &config).unwrap();
        assert_eq!(declaration.shape(), "[key, key]");

        let declaration = Declaration::from_json(&json!([["id"]]), &config).unwrap();
        assert_eq!(declaration.shape(), "[[key]]");
    }

    #[test]
    fn test_from_json_object_is_nested_schema() {
        let config = SchemaConfig::default();
        let declaration = Declaration::from_json(&json!({"director": "id"}), &config).unwrap();

        match declaration {
            Declaration::Schema(schema) => {
                assert_eq!(schema.descriptors().len(), 1);
                assert_eq!(schema.descriptors()[0].name(), "directors");
            }
            other => panic!("Expected nested schema, got: {:?}", other),
        }
    }

    #[test]
    fn test_from_json_rejects_scalars() {
        let config = SchemaConfig::default();
        let err = Declaration::from_json(&json!(3), &config).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedJson(_)));
    }
}
