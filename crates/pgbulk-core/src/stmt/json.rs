use super::Value;

use std::collections::BTreeMap;

impl From<serde_json::Value> for Value {
    /// Converts a dynamic JSON value.
    ///
    /// Arrays become lists and objects stay JSON documents; column types then
    /// decide the final representation (array, hstore, range or json).
    fn from(src: serde_json::Value) -> Value {
        use serde_json::Value as Json;

        match src {
            Json::Null => Value::Null,
            Json::Bool(v) => Value::Bool(v),
            Json::Number(n) => match n.as_i64() {
                Some(v) => Value::I64(v),
                None => match n.as_f64() {
                    Some(v) => Value::F64(v),
                    None => Value::Json(Json::Number(n)),
                },
            },
            Json::String(v) => Value::String(v),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            obj @ Json::Object(_) => Value::Json(obj),
        }
    }
}

impl Value {
    /// Renders the value as a JSON document.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(v) => Json::Bool(*v),
            Value::I16(v) => Json::from(*v),
            Value::I32(v) => Json::from(*v),
            Value::I64(v) => Json::from(*v),
            Value::F64(v) => Json::from(*v),
            Value::Decimal(v) => Json::String(v.to_string()),
            Value::String(v) => Json::String(v.clone()),
            Value::Bytes(v) => Json::Array(v.iter().map(|b| Json::from(*b)).collect()),
            Value::Uuid(v) => Json::String(v.to_string()),
            Value::Date(v) => Json::String(v.to_string()),
            Value::Time(v) => Json::String(v.to_string()),
            Value::Timestamp(v) => Json::String(v.to_string()),
            Value::TimestampTz(v) => Json::String(v.to_rfc3339()),
            Value::Json(v) => v.clone(),
            Value::HStore(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.clone().map(Json::String).unwrap_or(Json::Null)))
                    .collect(),
            ),
            Value::Range(v) => Json::String(v.to_string()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
        }
    }

    /// Interprets a JSON object as an hstore map.
    pub(crate) fn json_to_hstore(
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> BTreeMap<String, Option<String>> {
        object
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                };
                (k.clone(), v)
            })
            .collect()
    }
}
