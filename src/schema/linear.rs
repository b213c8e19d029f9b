use crate::schema::Schema;
use crate::types::{default_clone, Cloner};
use serde_json::Value;
use std::sync::Arc;

/// Build a [`Cloner`] that normalizes the given properties with their
/// schemas, cutting self-referencing graphs down before entities are
/// collected from them.
///
/// Properties absent from an item are left absent.
///
/// ```rust
/// use refgraph::{linear, Declaration, Schema};
/// use serde_json::json;
///
/// # fn main() -> refgraph::Result<()> {
/// let director = Schema::builder()
///     .key("movies", Declaration::seq([Declaration::prop("id")]))
///     .build()?;
///
/// let movie = Schema::builder()
///     .key("director", "id")
///     .cloner(linear([("director", director)]))
///     .build()?;
///
/// let entities = movie.entities(&json!({
///     "id": 1,
///     "director": { "id": "t1", "movies": [{ "id": 1 }, { "id": 2 }] }
/// }));
/// assert_eq!(entities.get("directors", "t1"), Some(&json!({ "id": "t1", "movies": [1, 2] })));
/// # Ok(())
/// # }
/// ```
pub fn linear<I, K>(properties: I) -> Cloner
where
    I: IntoIterator<Item = (K, Schema)>,
    K: Into<String>,
{
    let properties: Vec<(String, Schema)> = properties
        .into_iter()
        .map(|(prop, schema)| (prop.into(), schema))
        .collect();

    Arc::new(move |item: &Value| {
        let mut clone = default_clone(item);

        if let Value::Object(fields) = &mut clone {
            for (prop, schema) in &properties {
                if let Some(value) = fields.get_mut(prop) {
                    *value = schema.normalize(value);
                }
            }
        }

        clone
    })
}
