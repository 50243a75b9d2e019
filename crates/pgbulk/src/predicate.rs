use crate::{FieldNames, KeyOps};

use pgbulk_core::{
    stmt::{Expr, Key, Value},
    Error, Result,
};
use pgbulk_sql::ClauseOperator;

use indexmap::IndexMap;

/// Key values of one entry given to [`membership_predicate`]: a tuple in key
/// field order, or values by key field name.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyEntry {
    Tuple(Vec<Value>),
    Named(IndexMap<String, Value>),
}

impl From<Key> for KeyEntry {
    fn from(value: Key) -> Self {
        KeyEntry::Tuple(value.into_values())
    }
}

impl From<&Key> for KeyEntry {
    fn from(value: &Key) -> Self {
        KeyEntry::Tuple(value.values().to_vec())
    }
}

impl From<Vec<Value>> for KeyEntry {
    fn from(value: Vec<Value>) -> Self {
        KeyEntry::Tuple(value)
    }
}

impl From<IndexMap<String, Value>> for KeyEntry {
    fn from(value: IndexMap<String, Value>) -> Self {
        KeyEntry::Named(value)
    }
}

/// Builds a predicate matching the rows whose key fields match any one of
/// `entries`:
///
/// ```sql
/// ("a" = x AND "b" = y) OR ("a" = x1 AND "b" = y1) OR ...
/// ```
///
/// No entry gives a predicate matching no row. Each key field compares with
/// its operator from `key_ops`, `eq` by default.
pub fn membership_predicate(
    key_fields: impl Into<FieldNames>,
    entries: impl IntoIterator<Item = impl Into<KeyEntry>>,
    key_ops: impl Into<KeyOps>,
) -> Result<Expr> {
    let key_fields = key_fields.into();
    let operators = key_ops.into().resolve(key_fields.as_slice())?;

    let entries = entries.into_iter().map(Into::into);
    predicate(key_fields.as_slice(), &operators, entries)
}

pub(crate) fn predicate(
    key_fields: &[String],
    operators: &[ClauseOperator],
    entries: impl IntoIterator<Item = KeyEntry>,
) -> Result<Expr> {
    let mut any = vec![];

    for entry in entries {
        let values = match entry {
            KeyEntry::Tuple(values) => values,
            KeyEntry::Named(mut values) => {
                let ordered = key_fields
                    .iter()
                    .map(|name| {
                        values.shift_remove(name).ok_or_else(|| {
                            Error::invalid_argument(format!("key entry has no value for '{name}'"))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                if let Some(extra) = values.keys().next() {
                    return Err(Error::invalid_argument(format!(
                        "key entry has a value for '{extra}', which is not a key field"
                    )));
                }
                ordered
            }
        };

        if values.len() != key_fields.len() {
            return Err(Error::invalid_argument(format!(
                "key entry has {} values for {} key fields",
                values.len(),
                key_fields.len()
            )));
        }

        let all = key_fields
            .iter()
            .zip(operators)
            .zip(values)
            .map(|((name, op), value)| op.predicate(Expr::col(name.as_str()), value))
            .collect::<Result<Vec<_>>>()?;

        any.push(Expr::and_from_vec(all));
    }

    Ok(Expr::or_from_vec(any))
}
