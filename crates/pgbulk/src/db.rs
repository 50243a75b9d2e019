mod builder;
mod connect;

pub use builder::Builder;
pub use connect::connect;

use crate::{BulkCreate, BulkUpdate, BulkUpsert, Values};

use pgbulk_core::{driver::Driver, schema::Table, Error, Result};
use pgbulk_sql::NullDefaults;

use indexmap::IndexMap;
use std::{fmt, sync::Arc};

/// Alias of the connection used when a call names none.
pub const DEFAULT_ALIAS: &str = "default";

/// Shared state between all `Db` clones.
pub(crate) struct Shared {
    /// Drivers by connection alias
    drivers: IndexMap<String, Arc<dyn Driver>>,

    /// Values combined with NULL columns by `incr`, `concat` and `union`
    null_defaults: NullDefaults,
}

/// Entry point for bulk operations.
///
/// Cloning is cheap; clones share the registered connections.
#[derive(Clone)]
pub struct Db {
    shared: Arc<Shared>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Updates the rows matched by each record's key.
    pub fn bulk_update<'a>(&'a self, table: &'a Table, values: impl Into<Values>) -> BulkUpdate<'a> {
        BulkUpdate::new(self, table, values.into())
    }

    /// Updates the rows matched by each record's key and creates the missing
    /// ones.
    pub fn bulk_upsert<'a>(&'a self, table: &'a Table, values: impl Into<Values>) -> BulkUpsert<'a> {
        BulkUpsert::new(self, table, values.into())
    }

    /// Creates one row per record.
    pub fn bulk_create<'a>(&'a self, table: &'a Table, values: impl Into<Values>) -> BulkCreate<'a> {
        BulkCreate::new(self, table, values.into())
    }

    /// Returns the driver registered under `alias`, or the default one.
    pub fn driver(&self, alias: Option<&str>) -> Result<&Arc<dyn Driver>> {
        let alias = alias.unwrap_or(DEFAULT_ALIAS);
        self.shared.drivers.get(alias).ok_or_else(|| {
            Error::precondition(format!("no connection is registered as '{alias}'"))
        })
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> + '_ {
        self.shared.drivers.keys().map(String::as_str)
    }

    pub fn null_defaults(&self) -> &NullDefaults {
        &self.shared.null_defaults
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("drivers", &self.shared.drivers)
            .field("null_defaults", &self.shared.null_defaults)
            .finish()
    }
}
