/*!
   Helpers for reading and mutating dynamic JSON documents through
   dotted paths such as `app_state.gov.params.min_deposit.0.denom`.

   Genesis files have no stable schema across SDK versions, so the
   framework edits them as dynamic [`serde_json::Value`] trees instead
   of deserializing into typed structs.
*/

use serde_json::Value;

use crate::error::Error;

/// Set the value at a dotted path, creating intermediate objects for
/// path segments that do not exist yet. Numeric segments index into
/// arrays and must be in bounds.
pub fn set_json_path(root: &mut Value, path: &str, new_value: Value) -> Result<(), Error> {
    let mut current = root;

    let segments: Vec<&str> = path.split('.').collect();
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| Error::invalid_config("empty json path".to_string()))?;

    for segment in parents {
        current = descend(current, segment, path)?;
    }

    match current {
        Value::Object(map) => {
            map.insert((*last).to_string(), new_value);
            Ok(())
        }
        Value::Array(arr) => {
            let idx = parse_index(last, path)?;
            if idx >= arr.len() {
                return Err(Error::invalid_config(format!(
                    "array index {idx} out of bounds at json path {path}"
                )));
            }
            arr[idx] = new_value;
            Ok(())
        }
        _ => Err(Error::invalid_config(format!(
            "cannot set {last} on non-container value at json path {path}"
        ))),
    }
}

/// Read the value at a dotted path, if present.
pub fn get_json_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn descend<'a>(value: &'a mut Value, segment: &str, path: &str) -> Result<&'a mut Value, Error> {
    match value {
        Value::Object(map) => Ok(map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Default::default()))),
        Value::Array(arr) => {
            let idx = parse_index(segment, path)?;
            arr.get_mut(idx).ok_or_else(|| {
                Error::invalid_config(format!(
                    "array index {idx} out of bounds at json path {path}"
                ))
            })
        }
        _ => Err(Error::invalid_config(format!(
            "cannot descend into scalar at segment {segment} of json path {path}"
        ))),
    }
}

fn parse_index(segment: &str, path: &str) -> Result<usize, Error> {
    segment.parse::<usize>().map_err(|_| {
        Error::invalid_config(format!(
            "expected array index at segment {segment} of json path {path}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn sets_nested_object_value() {
        let mut genesis = json!({
            "app_state": { "gov": { "params": { "voting_period": "172800s" } } }
        });

        set_json_path(
            &mut genesis,
            "app_state.gov.params.voting_period",
            json!("15s"),
        )
        .unwrap();

        assert_eq!(
            get_json_path(&genesis, "app_state.gov.params.voting_period"),
            Some(&json!("15s"))
        );
    }

    #[test]
    fn creates_missing_intermediate_objects() {
        let mut genesis = json!({ "app_state": {} });

        set_json_path(&mut genesis, "app_state.ccvconsumer.params", json!({})).unwrap();

        assert!(get_json_path(&genesis, "app_state.ccvconsumer.params").is_some());
    }

    #[test]
    fn indexes_into_arrays() {
        let mut genesis = json!({
            "app_state": { "gov": { "params": { "min_deposit": [
                { "denom": "stake", "amount": "10000000" }
            ]}}}
        });

        set_json_path(
            &mut genesis,
            "app_state.gov.params.min_deposit.0.denom",
            json!("ujuno"),
        )
        .unwrap();

        assert_eq!(
            get_json_path(&genesis, "app_state.gov.params.min_deposit.0.denom"),
            Some(&json!("ujuno"))
        );
    }

    #[test]
    fn rejects_out_of_bounds_index() {
        let mut genesis = json!({ "validators": [] });

        assert!(set_json_path(&mut genesis, "validators.3", json!({})).is_err());
    }
}
