use super::Column;

/// A table the bulk operations write to.
#[derive(Debug, Clone)]
pub struct Table {
    /// Name of the table in the database
    pub name: String,

    /// The table's columns, in declaration order
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Table {
        Table {
            name: name.into(),
            columns: vec![],
        }
    }

    pub fn column(mut self, column: Column) -> Table {
        self.columns.push(column);
        self
    }

    /// Looks up a column by its logical field name.
    pub fn field(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Looks up a column by either its field name or its storage name.
    pub fn resolve(&self, name: &str) -> Option<&Column> {
        self.field(name)
            .or_else(|| self.columns.iter().find(|column| column.column == name))
    }

    pub fn concrete_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().filter(|column| column.concrete)
    }

    pub fn primary_key(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().filter(|column| column.primary_key)
    }
}
