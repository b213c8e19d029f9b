use serde_json::Value;

/// Reads one property of a container, optionally as an array of values
#[derive(Debug, Clone)]
pub struct Accessor {
    prop: String,
    is_array: bool,
}

impl Accessor {
    pub fn new(prop: impl Into<String>, is_array: bool) -> Self {
        Accessor {
            prop: prop.into(),
            is_array,
        }
    }

    /// Apply `f` to the property value.
    ///
    /// Single keys yield `None` when the property is absent. Array keys read
    /// an absent or `null` property as `[]` and map `f` over each element; a
    /// lone non-array value goes through `f` as-is.
    pub fn apply<F>(&self, container: &Value, mut f: F) -> Option<Value>
    where
        F: FnMut(&Value) -> Value,
    {
        let value = container.get(&self.prop);

        if !self.is_array {
            return value.map(f);
        }

        match value {
            None | Some(Value::Null) => Some(Value::Array(Vec::new())),
            Some(Value::Array(items)) => Some(Value::Array(items.iter().map(f).collect())),
            Some(other) => Some(f(other)),
        }
    }
}

/// Build a reader that runs `value_fn` over `container[prop]`
pub fn accessor_for<F>(prop: &str, is_array: bool, value_fn: F) -> impl Fn(&Value) -> Option<Value> + Send + Sync
where
    F: Fn(&Value) -> Value + Send + Sync,
{
    let accessor = Accessor::new(prop, is_array);
    move |container: &Value| accessor.apply(container, &value_fn)
}
