use pgbulk_core::{Error, Result};
use pgbulk_sql::ClauseOperator;

use indexmap::IndexMap;

/// A clause operator, given by name (`"in"`, `">="`, ...) or directly.
#[derive(Debug, Clone, PartialEq)]
pub enum OpSpec {
    Name(String),
    Op(ClauseOperator),
}

impl OpSpec {
    pub fn resolve(&self) -> Result<ClauseOperator> {
        match self {
            OpSpec::Name(name) => ClauseOperator::from_name(name),
            OpSpec::Op(op) => Ok(*op),
        }
    }
}

impl From<&str> for OpSpec {
    fn from(value: &str) -> Self {
        OpSpec::Name(value.to_string())
    }
}

impl From<String> for OpSpec {
    fn from(value: String) -> Self {
        OpSpec::Name(value)
    }
}

impl From<ClauseOperator> for OpSpec {
    fn from(value: ClauseOperator) -> Self {
        OpSpec::Op(value)
    }
}

/// Operators comparing the key fields with the key values.
///
/// Either positional, in key field order, or by key field name. Key fields
/// without an operator compare with `eq`.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOps {
    Positional(Vec<OpSpec>),
    Named(IndexMap<String, OpSpec>),
}

impl KeyOps {
    pub fn positional(ops: impl IntoIterator<Item = impl Into<OpSpec>>) -> KeyOps {
        KeyOps::Positional(ops.into_iter().map(Into::into).collect())
    }

    pub fn named(
        ops: impl IntoIterator<Item = (impl Into<String>, impl Into<OpSpec>)>,
    ) -> KeyOps {
        KeyOps::Named(
            ops.into_iter()
                .map(|(name, op)| (name.into(), op.into()))
                .collect(),
        )
    }

    /// Resolves one operator per key field.
    pub fn resolve<S: AsRef<str>>(&self, key_fields: &[S]) -> Result<Vec<ClauseOperator>> {
        match self {
            KeyOps::Positional(ops) => {
                if ops.len() > key_fields.len() {
                    return Err(Error::invalid_argument(format!(
                        "{} key operators given for {} key fields",
                        ops.len(),
                        key_fields.len()
                    )));
                }

                let mut resolved = ops.iter().map(OpSpec::resolve).collect::<Result<Vec<_>>>()?;
                resolved.resize(key_fields.len(), ClauseOperator::Eq);
                Ok(resolved)
            }
            KeyOps::Named(ops) => {
                if let Some(name) = ops
                    .keys()
                    .find(|name| !key_fields.iter().any(|f| f.as_ref() == name.as_str()))
                {
                    return Err(Error::invalid_argument(format!(
                        "key operator given for '{name}', which is not a key field"
                    )));
                }

                key_fields
                    .iter()
                    .map(|name| match ops.get(name.as_ref()) {
                        Some(op) => op.resolve(),
                        None => Ok(ClauseOperator::Eq),
                    })
                    .collect()
            }
        }
    }
}

impl Default for KeyOps {
    fn default() -> Self {
        KeyOps::Positional(vec![])
    }
}

impl From<Vec<OpSpec>> for KeyOps {
    fn from(value: Vec<OpSpec>) -> Self {
        KeyOps::Positional(value)
    }
}

impl From<Vec<&str>> for KeyOps {
    fn from(value: Vec<&str>) -> Self {
        KeyOps::positional(value)
    }
}

impl<const N: usize> From<[&str; N]> for KeyOps {
    fn from(value: [&str; N]) -> Self {
        KeyOps::positional(value)
    }
}

impl<const N: usize> From<[ClauseOperator; N]> for KeyOps {
    fn from(value: [ClauseOperator; N]) -> Self {
        KeyOps::positional(value)
    }
}

impl From<IndexMap<String, OpSpec>> for KeyOps {
    fn from(value: IndexMap<String, OpSpec>) -> Self {
        KeyOps::Named(value)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for KeyOps {
    fn from(value: [(&str, &str); N]) -> Self {
        KeyOps::named(value)
    }
}

impl<const N: usize> From<[(&str, ClauseOperator); N]> for KeyOps {
    fn from(value: [(&str, ClauseOperator); N]) -> Self {
        KeyOps::named(value)
    }
}
