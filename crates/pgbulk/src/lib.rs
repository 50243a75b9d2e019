//! Bulk UPDATE, UPSERT and CREATE for PostgreSQL tables.
//!
//! A batch of records is compiled into a single statement that joins the
//! table against a `VALUES` list, instead of running one statement per
//! record.
//!
//! ```no_run
//! # async fn example(db: pgbulk::Db, table: pgbulk::Table) -> pgbulk::Result<()> {
//! use pgbulk::Values;
//!
//! let updated = db
//!     .bulk_update(&table, Values::keyed([(1, [("counter", 10)]), (2, [("counter", 5)])]))
//!     .combine("counter", "incr")
//!     .exec()
//!     .await?;
//!
//! assert_eq!(updated.count(), 2);
//! # Ok(())
//! # }
//! ```

mod bulk;
pub use bulk::{BulkCreate, BulkUpdate, BulkUpsert};

pub mod db;
pub use db::Db;

mod filter;

mod input;
pub use input::{FieldNames, FuncSpec, KeyOps, OpSpec, Returning, Values};

mod outcome;
pub use outcome::{Outcome, Row, RowSet};

mod plan;

mod predicate;
pub use predicate::{membership_predicate, KeyEntry};

pub use pgbulk_core::{
    driver::{self, Driver},
    schema::{Column, ColumnDefault, Table, Type},
    stmt::{Expr, Key, Value, ValueRange, ValueRecord},
    Error, Result,
};

pub use pgbulk_sql::{migration, ClauseOperator, CombineFunction, NullDefaults};
