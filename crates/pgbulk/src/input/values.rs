use pgbulk_core::{
    stmt::{Expr, Key, Value, ValueRecord},
    Error, Result,
};

use indexmap::IndexMap;

/// Input records of a bulk operation.
///
/// Every record must write the same set of fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    /// Key tuple to the fields written for that key. A single key value
    /// stands for a one element tuple.
    Keyed(Vec<(Key, ValueRecord)>),

    /// Records holding every key field next to the written fields.
    Records(Vec<ValueRecord>),
}

impl Values {
    /// ```
    /// # use pgbulk::Values;
    /// let values = Values::keyed([(1, [("name", "a")]), (2, [("name", "b")])]);
    /// assert_eq!(values.len(), 2);
    /// ```
    pub fn keyed<K, R, N, V>(entries: impl IntoIterator<Item = (K, R)>) -> Values
    where
        K: Into<Key>,
        R: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Expr>,
    {
        Values::Keyed(
            entries
                .into_iter()
                .map(|(key, record)| (key.into(), collect_record(record)))
                .collect(),
        )
    }

    /// ```
    /// # use pgbulk::Values;
    /// let values = Values::records([[("id", "1"), ("name", "a")]]);
    /// assert_eq!(values.len(), 1);
    /// ```
    pub fn records<R, N, V>(records: impl IntoIterator<Item = R>) -> Values
    where
        R: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Expr>,
    {
        Values::Records(records.into_iter().map(collect_record).collect())
    }

    /// Reads records from a JSON document: an object mapping keys to
    /// objects of fields, or an array of objects.
    ///
    /// Object keys are strings; they are converted to the key field's type
    /// when the operation runs. JSON objects nested in a record are
    /// documents for `json`/`jsonb`/`hstore` fields.
    pub fn from_json(json: serde_json::Value) -> Result<Values> {
        use serde_json::Value as Json;

        match json {
            Json::Object(entries) => entries
                .into_iter()
                .map(|(key, record)| Ok((Key::from(key), json_record(record)?)))
                .collect::<Result<Vec<_>>>()
                .map(Values::Keyed),
            Json::Array(records) => records
                .into_iter()
                .map(json_record)
                .collect::<Result<Vec<_>>>()
                .map(Values::Records),
            other => Err(Error::invalid_argument(format!(
                "values must be an object or an array of objects, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Values::Keyed(entries) => entries.len(),
            Values::Records(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn collect_record<N: Into<String>, V: Into<Expr>>(
    fields: impl IntoIterator<Item = (N, V)>,
) -> ValueRecord {
    fields
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect()
}

fn json_record(json: serde_json::Value) -> Result<ValueRecord> {
    match json {
        serde_json::Value::Object(fields) => Ok(fields
            .into_iter()
            .map(|(name, value)| (name, Expr::Value(Value::from(value))))
            .collect()),
        other => Err(Error::invalid_argument(format!(
            "every record must be an object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl From<Vec<(Key, ValueRecord)>> for Values {
    fn from(value: Vec<(Key, ValueRecord)>) -> Self {
        Values::Keyed(value)
    }
}

impl From<IndexMap<Key, ValueRecord>> for Values {
    fn from(value: IndexMap<Key, ValueRecord>) -> Self {
        Values::Keyed(value.into_iter().collect())
    }
}

impl From<Vec<ValueRecord>> for Values {
    fn from(value: Vec<ValueRecord>) -> Self {
        Values::Records(value)
    }
}
