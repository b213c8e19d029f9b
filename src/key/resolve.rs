//! Resolution of raw declarations into canonical key descriptors

use crate::error::{Result, SchemaError};
use crate::key::declaration::Declaration;
use crate::schema::Schema;
use crate::types::{KeyFn, Merger};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// How the reference of a nested value is obtained
#[derive(Clone)]
pub enum Key {
    /// Property of the nested value holding its id
    Prop(String),
    /// Function computing the reference
    Func(KeyFn),
    /// Nested schema the value is normalized with
    Schema(Schema),
}

impl Key {
    pub fn prop(name: impl Into<String>) -> Self {
        Key::Prop(name.into())
    }

    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Key::Func(Arc::new(f))
    }

    pub fn nested(&self) -> Option<&Schema> {
        match self {
            Key::Schema(schema) => Some(schema),
            _ => None,
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Prop(name) => f.debug_tuple("Prop").field(name).finish(),
            Key::Func(_) => f.write_str("Func(..)"),
            Key::Schema(schema) => f.debug_tuple("Schema").field(schema).finish(),
        }
    }
}

/// Canonical form of a key declaration
#[derive(Clone)]
pub struct KeyDescriptor {
    pub key: Key,
    pub is_array: bool,
    pub alias: Option<String>,
    pub merger: Option<Merger>,
}

impl KeyDescriptor {
    pub fn new(key: Key) -> Self {
        KeyDescriptor {
            key,
            is_array: false,
            alias: None,
            merger: None,
        }
    }

    /// Mark the property as holding an array of entities
    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn merged_with<F>(mut self, merger: F) -> Self
    where
        F: Fn(Value, &Value) -> Value + Send + Sync + 'static,
    {
        self.merger = Some(Arc::new(merger));
        self
    }
}

impl fmt::Debug for KeyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDescriptor")
            .field("key", &self.key)
            .field("is_array", &self.is_array)
            .field("alias", &self.alias)
            .field("merger", &self.merger.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Resolve a raw declaration. Sequence forms are checked in this order,
/// first match wins:
///
/// 1. not a sequence: direct key
/// 2. `[key]`: array key
/// 3. `[[key], merge?]`: array key with merger
/// 4. `[alias, [key], merge?]`: aliased array key
/// 5. `[alias, key, merge?]`: aliased direct key
/// 6. `[key, merge]`: direct key with merger
pub fn resolve(declaration: Declaration) -> Result<KeyDescriptor> {
    let items = match declaration {
        Declaration::Seq(items) => items,
        other => return direct(other).map(KeyDescriptor::new),
    };

    let shape = Declaration::Seq(items.clone()).shape();
    let mut items = items.into_iter();

    let (first, second) = match (items.next(), items.next()) {
        (None, _) => return Err(SchemaError::EmptyDeclaration),
        (Some(only), None) => return direct(only).map(|key| KeyDescriptor::new(key).array()),
        (Some(first), Some(second)) => (first, second),
    };

    match (first, second) {
        (Declaration::Seq(inner), Declaration::Merge(merger)) => {
            no_trailing(items, &shape)?;
            Ok(KeyDescriptor {
                merger: Some(merger),
                ..array_key(inner)?
            })
        }
        (Declaration::Seq(_), _) => Err(SchemaError::UnrecognizedShape(shape)),
        (Declaration::Prop(alias), Declaration::Seq(inner)) => Ok(KeyDescriptor {
            alias: Some(alias),
            merger: trailing_merger(items, &shape)?,
            ..array_key(inner)?
        }),
        (Declaration::Prop(alias), second @ (Declaration::Prop(_) | Declaration::Func(_) | Declaration::Schema(_))) => {
            Ok(KeyDescriptor {
                alias: Some(alias),
                merger: trailing_merger(items, &shape)?,
                ..KeyDescriptor::new(direct(second)?)
            })
        }
        (first, Declaration::Merge(merger)) => {
            no_trailing(items, &shape)?;
            Ok(KeyDescriptor {
                merger: Some(merger),
                ..KeyDescriptor::new(direct(first)?)
            })
        }
        _ => Err(SchemaError::UnrecognizedShape(shape)),
    }
}

fn direct(declaration: Declaration) -> Result<Key> {
    match declaration {
        Declaration::Prop(name) => Ok(Key::Prop(name)),
        Declaration::Func(f) => Ok(Key::Func(f)),
        Declaration::Schema(schema) => Ok(Key::Schema(schema)),
        Declaration::Merge(_) => Err(SchemaError::MergerAsKey),
        Declaration::Seq(_) => Err(SchemaError::UnexpectedSequence),
    }
}

fn array_key(inner: Vec<Declaration>) -> Result<KeyDescriptor> {
    let len = inner.len();
    let mut inner = inner.into_iter();

    match (inner.next(), inner.next()) {
        (Some(only), None) => Ok(KeyDescriptor::new(direct(only)?).array()),
        _ => Err(SchemaError::ArrayArity(len)),
    }
}

fn trailing_merger(mut rest: impl Iterator<Item = Declaration>, shape: &str) -> Result<Option<Merger>> {
    match (rest.next(), rest.next()) {
        (None, _) => Ok(None),
        (Some(Declaration::Merge(merger)), None) => Ok(Some(merger)),
        _ => Err(SchemaError::UnrecognizedShape(shape.to_string())),
    }
}

fn no_trailing(mut rest: impl Iterator<Item = Declaration>, shape: &str) -> Result<()> {
    match rest.next() {
        None => Ok(()),
        Some(_) => Err(SchemaError::UnrecognizedShape(shape.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keep_first() -> Declaration {
        Declaration::merge(|a, _| a)
    }

    fn id_fn() -> Declaration {
        Declaration::func(|v| v["id"].clone())
    }

    fn prop_name(descriptor: &KeyDescriptor) -> Option<&str> {
        match &descriptor.key {
            Key::Prop(name) => Some(name),
            _ => None,
        }
    }

    #[test]
    fn test_direct_key() {
        let descriptor = resolve(Declaration::prop("id")).unwrap();
        assert_eq!(prop_name(&descriptor), Some("id"));
        assert!(!descriptor.is_array);
        assert!(descriptor.alias.is_none());
        assert!(descriptor.merger.is_none());

        let descriptor = resolve(id_fn()).unwrap();
        assert!(matches!(descriptor.key, Key::Func(_)));
    }

    #[test]
    fn test_array_key() {
        let descriptor = resolve(Declaration::seq([Declaration::prop("id")])).unwrap();
        assert_eq!(prop_name(&descriptor), Some("id"));
        assert!(descriptor.is_array);
        assert!(descriptor.merger.is_none());
    }

    #[test]
    fn test_array_key_with_merger() {
        let descriptor = resolve(Declaration::seq([Declaration::seq([id_fn()]), keep_first()])).unwrap();
        assert!(descriptor.is_array);
        assert!(descriptor.alias.is_none());

        let merger = descriptor.merger.unwrap();
        assert_eq!(merger(json!({"a": 1}), &json!({"a": 2})), json!({"a": 1}));
    }

    #[test]
    fn test_aliased_array_key() {
        let descriptor = resolve(Declaration::seq([
            Declaration::prop("films"),
            Declaration::seq([id_fn()]),
        ]))
        .unwrap();
        assert!(descriptor.is_array);
        assert_eq!(descriptor.alias.as_deref(), Some("films"));
        assert!(descriptor.merger.is_none());

        let descriptor = resolve(Declaration::seq([
            Declaration::prop("films"),
            Declaration::seq([id_fn()]),
            keep_first(),
        ]))
        .unwrap();
        assert!(descriptor.merger.is_some());
    }

    #[test]
    fn test_aliased_direct_key() {
        let descriptor = resolve(Declaration::seq([Declaration::prop("producers"), id_fn()])).unwrap();
        assert!(!descriptor.is_array);
        assert_eq!(descriptor.alias.as_deref(), Some("producers"));
        assert!(matches!(descriptor.key, Key::Func(_)));

        // a single-character alias is still an alias
        let descriptor = resolve(Declaration::seq([Declaration::prop("x"), Declaration::prop("id")])).unwrap();
        assert_eq!(descriptor.alias.as_deref(), Some("x"));
        assert_eq!(prop_name(&descriptor), Some("id"));
    }

    #[test]
    fn test_key_with_merger() {
        let descriptor = resolve(Declaration::seq([Declaration::prop("id"), keep_first()])).unwrap();
        assert_eq!(prop_name(&descriptor), Some("id"));
        assert!(descriptor.alias.is_none());
        assert!(descriptor.merger.is_some());

        let descriptor = resolve(Declaration::seq([id_fn(), keep_first()])).unwrap();
        assert!(matches!(descriptor.key, Key::Func(_)));
        assert!(!descriptor.is_array);
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(matches!(resolve(Declaration::Seq(Vec::new())), Err(SchemaError::EmptyDeclaration)));
        assert!(matches!(resolve(keep_first()), Err(SchemaError::MergerAsKey)));
        assert!(matches!(
            resolve(Declaration::seq([Declaration::seq([id_fn(), id_fn()]), keep_first()])),
            Err(SchemaError::ArrayArity(2))
        ));
        assert!(matches!(
            resolve(Declaration::seq([id_fn(), id_fn()])),
            Err(SchemaError::UnrecognizedShape(shape)) if shape == "[fn, fn]"
        ));
        assert!(matches!(
            resolve(Declaration::seq([Declaration::prop("id"), keep_first(), keep_first()])),
            Err(SchemaError::UnrecognizedShape(_))
        ));
    }

    #[test]
    fn test_descriptor_declaration_round_trip() {
        let built = KeyDescriptor::new(Key::prop("id"))
            .array()
            .aliased("films")
            .merged_with(|_, b| b.clone());

        let resolved = resolve(Declaration::from(built)).unwrap();
        assert_eq!(prop_name(&resolved), Some("id"));
        assert!(resolved.is_array);
        assert_eq!(resolved.alias.as_deref(), Some("films"));
        assert!(resolved.merger.is_some());

        let built = KeyDescriptor::new(Key::prop("id")).merged_with(|a, _| a);
        let resolved = resolve(Declaration::from(built)).unwrap();
        assert!(!resolved.is_array);
        assert!(resolved.alias.is_none());
        assert!(resolved.merger.is_some());
    }
}
