use serde_json::{Map, Value};

/// Merge `overlay` into `target`. Nested objects merge key by key; any other
/// value in `overlay` replaces the one in `target`, arrays included.
pub fn deep_merge(target: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Append names from `incoming` that `target` does not hold yet, keeping order.
pub fn union_ordered(target: &mut Vec<String>, incoming: &[String]) {
    for name in incoming {
        if !target.contains(name) {
            target.push(name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn nested_objects_merge() {
        let mut target = obj(json!({
            "ecmaVersion": 2018,
            "ecmaFeatures": { "jsx": false, "globalReturn": true },
        }));
        let overlay = obj(json!({
            "ecmaVersion": 2020,
            "ecmaFeatures": { "jsx": true },
        }));
        deep_merge(&mut target, &overlay);
        assert_eq!(
            Value::Object(target),
            json!({
                "ecmaVersion": 2020,
                "ecmaFeatures": { "jsx": true, "globalReturn": true },
            })
        );
    }

    #[test]
    fn arrays_and_scalars_replace() {
        let mut target = obj(json!({ "extensions": [".js"], "resolver": { "node": true } }));
        let overlay = obj(json!({ "extensions": [".ts"], "resolver": "typescript" }));
        deep_merge(&mut target, &overlay);
        assert_eq!(target["extensions"], json!([".ts"]));
        assert_eq!(target["resolver"], json!("typescript"));
    }

    #[test]
    fn union_keeps_first_occurrence_order() {
        let mut plugins = vec!["react".to_string(), "import".to_string()];
        union_ordered(
            &mut plugins,
            &["prettier".to_string(), "react".to_string()],
        );
        assert_eq!(plugins, vec!["react", "import", "prettier"]);
    }
}
