use serde_json::Value;

/// Deep-merge `incoming` into `target`.
///
/// Objects merge key-wise; primitives and arrays are replaced wholesale by
/// the incoming value. Keys absent from `incoming` are left untouched.
pub fn deep_merge(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(target), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match target.get_mut(&key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (slot, incoming) => *slot = incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sibling_fields_survive_a_partial_merge() {
        let mut target = json!({"a": {"x": 1, "y": 2}});
        deep_merge(&mut target, json!({"a": {"y": 3}}));
        assert_eq!(target, json!({"a": {"x": 1, "y": 3}}));
    }

    #[test]
    fn new_keys_are_inserted() {
        let mut target = json!({"a": 1});
        deep_merge(&mut target, json!({"b": {"c": 2}}));
        assert_eq!(target, json!({"a": 1, "b": {"c": 2}}));
    }

    #[test]
    fn arrays_are_replaced_not_concatenated() {
        let mut target = json!({"tags": ["a", "b"], "n": 1});
        deep_merge(&mut target, json!({"tags": ["c"]}));
        assert_eq!(target, json!({"tags": ["c"], "n": 1}));
    }

    #[test]
    fn scalars_replace_objects_and_vice_versa() {
        let mut target = json!({"a": {"x": 1}});
        deep_merge(&mut target, json!({"a": 5}));
        assert_eq!(target, json!({"a": 5}));

        let mut target = json!({"a": 5});
        deep_merge(&mut target, json!({"a": {"x": 1}}));
        assert_eq!(target, json!({"a": {"x": 1}}));
    }

    #[test]
    fn null_replaces_the_existing_value() {
        let mut target = json!({"a": {"x": 1}});
        deep_merge(&mut target, json!({"a": null}));
        assert_eq!(target, json!({"a": null}));
    }
}
