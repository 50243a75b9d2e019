use crate::{ClauseOperator, CombineFunction};

use pgbulk_core::{
    schema::{Column, Type},
    Error, Result, Table,
};

use std::fmt;

/// Role of a field in a statement. The role decides the name of the field's
/// column in the VALUES table, so a field used both as key and as update
/// target gets two distinct columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// The `n`th key field
    Key(usize),

    Update,

    Default,

    /// The `n`th returned field
    Returning(usize),
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::Key(i) => write!(f, "key_{i}"),
            Prefix::Update => f.write_str("upd"),
            Prefix::Default => f.write_str("def"),
            Prefix::Returning(i) => write!(f, "ret_{i}"),
        }
    }
}

/// A field bound to its role and to the operator or function applied to it.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    column: Column,
    prefix: Prefix,
    operator: ClauseOperator,
    function: CombineFunction,
    prefixed_name: String,
}

impl FieldDescriptor {
    fn new(
        column: &Column,
        prefix: Prefix,
        operator: ClauseOperator,
        function: CombineFunction,
    ) -> FieldDescriptor {
        FieldDescriptor {
            prefixed_name: format!("{prefix}__{}", column.name),
            column: column.clone(),
            prefix,
            operator,
            function,
        }
    }

    /// The `index`th key field, compared with `operator`.
    pub fn key(column: &Column, index: usize, operator: ClauseOperator) -> FieldDescriptor {
        FieldDescriptor::new(
            column,
            Prefix::Key(index),
            operator,
            CombineFunction::default(),
        )
    }

    /// A field written with `function`. The function must support the
    /// field's type.
    pub fn update(column: &Column, function: CombineFunction) -> Result<FieldDescriptor> {
        function.check(column)?;
        Ok(FieldDescriptor::new(
            column,
            Prefix::Update,
            ClauseOperator::default(),
            function,
        ))
    }

    /// A field absent from the input, created with its column default.
    pub fn default(column: &Column) -> FieldDescriptor {
        FieldDescriptor::new(
            column,
            Prefix::Default,
            ClauseOperator::default(),
            CombineFunction::default(),
        )
    }

    pub fn returning(column: &Column, index: usize) -> FieldDescriptor {
        FieldDescriptor::new(
            column,
            Prefix::Returning(index),
            ClauseOperator::default(),
            CombineFunction::default(),
        )
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.column.name
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn prefix(&self) -> Prefix {
        self.prefix
    }

    pub fn operator(&self) -> ClauseOperator {
        self.operator
    }

    pub fn function(&self) -> CombineFunction {
        self.function
    }

    /// Name of the field's column in the VALUES table, e.g. `key_0__id`.
    pub fn prefixed_name(&self) -> &str {
        &self.prefixed_name
    }

    /// Type of the value stored for this field in the VALUES table.
    pub fn value_type(&self) -> Type {
        match self.prefix {
            Prefix::Key(_) => self.operator.operand_type(&self.column.ty),
            Prefix::Update => self.function.operand_type(&self.column.ty),
            Prefix::Default | Prefix::Returning(_) => self.column.ty.clone(),
        }
    }

    /// Whether each input record carries a value for this field.
    pub fn needs_value(&self) -> bool {
        match self.prefix {
            Prefix::Key(_) => true,
            Prefix::Update => self.function.needs_value(),
            Prefix::Default => self.is_mutable_default(),
            Prefix::Returning(_) => false,
        }
    }

    /// A default evaluated again for every row.
    pub fn is_mutable_default(&self) -> bool {
        self.column
            .default
            .as_ref()
            .is_some_and(|default| default.is_mutable())
    }
}

/// Every field taking part in one statement, grouped by role.
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    pub key: Vec<FieldDescriptor>,
    pub update: Vec<FieldDescriptor>,
    pub default: Vec<FieldDescriptor>,
    pub returning: Vec<FieldDescriptor>,
}

impl FieldSet {
    /// Groups the fields and derives the default fields: concrete columns
    /// of `table` that are neither keys nor updated, are not generated by
    /// the database and have a default.
    pub fn new(
        table: &Table,
        key: Vec<FieldDescriptor>,
        update: Vec<FieldDescriptor>,
        returning: Vec<FieldDescriptor>,
    ) -> FieldSet {
        let default = table
            .concrete_columns()
            .filter(|column| {
                !key.iter().chain(&update).any(|fd| fd.name() == column.name)
                    && !column.auto_increment
                    && column.has_default()
            })
            .map(FieldDescriptor::default)
            .collect();

        FieldSet {
            key,
            update,
            default,
            returning,
        }
    }

    /// Resolves returned field names against `table`, expanding `*` to every
    /// concrete column.
    pub fn returning_fields<'a>(
        table: &Table,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<FieldDescriptor>> {
        let mut columns = vec![];
        for name in names {
            if name == "*" {
                columns.extend(table.concrete_columns());
                continue;
            }

            let column = table
                .field(name)
                .ok_or_else(|| Error::invalid_argument(format!("returning field '{name}' doesn't exist")))?;
            if !column.concrete {
                return Err(Error::invalid_argument(format!(
                    "returning field '{name}' is not stored in the table"
                )));
            }
            columns.push(column);
        }

        Ok(columns
            .into_iter()
            .enumerate()
            .map(|(i, column)| FieldDescriptor::returning(column, i))
            .collect())
    }

    /// Update fields carrying a value in every input record.
    pub fn update_with_values(&self) -> impl Iterator<Item = &FieldDescriptor> + '_ {
        self.update.iter().filter(|fd| fd.needs_value())
    }

    pub fn mutable_defaults(&self) -> impl Iterator<Item = &FieldDescriptor> + '_ {
        self.default.iter().filter(|fd| fd.is_mutable_default())
    }

    pub fn immutable_defaults(&self) -> impl Iterator<Item = &FieldDescriptor> + '_ {
        self.default.iter().filter(|fd| !fd.is_mutable_default())
    }

    /// Whether `name` is one of the key fields.
    pub fn is_key(&self, name: &str) -> bool {
        self.key.iter().any(|fd| fd.name() == name)
    }
}
