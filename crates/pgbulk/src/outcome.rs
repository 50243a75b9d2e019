use pgbulk_core::{driver::Rows, stmt::Value, Result};

/// Result of a bulk call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Number of rows written
    Count(u64),

    /// The requested fields of every written row
    Rows(RowSet),
}

impl Outcome {
    /// An outcome with nothing written yet. `returning` names the fields of
    /// the rows to collect, if any were requested.
    pub(crate) fn empty(returning: Option<Vec<String>>) -> Outcome {
        match returning {
            Some(fields) => Outcome::Rows(RowSet::new(fields)),
            None => Outcome::Count(0),
        }
    }

    /// Adds the result of one statement.
    pub(crate) fn merge(&mut self, rows: Rows) -> Result<()> {
        match self {
            Outcome::Count(count) => *count += rows.affected(),
            Outcome::Rows(set) => set.rows.extend(rows.into_values()?),
        }
        Ok(())
    }

    /// Number of rows written.
    pub fn count(&self) -> u64 {
        match self {
            Outcome::Count(count) => *count,
            Outcome::Rows(set) => set.len() as u64,
        }
    }

    pub fn rows(&self) -> Option<&RowSet> {
        match self {
            Outcome::Rows(set) => Some(set),
            Outcome::Count(_) => None,
        }
    }

    pub fn into_rows(self) -> Option<RowSet> {
        match self {
            Outcome::Rows(set) => Some(set),
            Outcome::Count(_) => None,
        }
    }
}

/// Rows returned by a bulk call, holding the requested fields in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    fields: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new(fields: Vec<String>) -> RowSet {
        RowSet {
            fields,
            rows: vec![],
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|values| Row {
            fields: &self.fields,
            values,
        })
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(|values| Row {
            fields: &self.fields,
            values,
        })
    }

    /// Values of `field` across all rows.
    pub fn column(&self, field: &str) -> Option<Vec<&Value>> {
        let index = self.fields.iter().position(|f| f == field)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Rows as an array of JSON objects.
    pub fn to_json(&self) -> serde_json::Value {
        self.iter().map(|row| row.to_json()).collect()
    }

    pub fn into_rows(self) -> Vec<Vec<Value>> {
        self.rows
    }
}

/// One row of a [`RowSet`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    fields: &'a [String],
    values: &'a [Value],
}

impl<'a> Row<'a> {
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        let index = self.fields.iter().position(|f| f == field)?;
        self.values.get(index)
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.fields
            .iter()
            .zip(self.values)
            .map(|(field, value)| (field.clone(), value.to_json()))
            .collect::<serde_json::Map<_, _>>()
            .into()
    }
}
