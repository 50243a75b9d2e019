//! The field catalog consumed by the bulk statement compiler.
//!
//! A [`Table`] describes one target relation: its name and the ordered list of
//! [`Column`]s, each mapping a logical field name to a storage column, a
//! [`Type`], nullability and an optional [`ColumnDefault`].

mod column;
pub use column::Column;

mod default;
pub use default::ColumnDefault;

mod table;
pub use table::Table;

mod ty;
pub use ty::Type;
