#[macro_use]
mod serializer;
pub use serializer::{Params, Placeholder};

mod batch;
pub use batch::Batch;

mod compiler;
pub use compiler::Compiler;

mod descriptor;
pub use descriptor::{FieldDescriptor, FieldSet, Prefix};

mod dialect;
pub use dialect::Dialect;

mod function;
pub use function::CombineFunction;

pub mod migration;

mod null_defaults;
pub use null_defaults::NullDefaults;

mod operator;
pub use operator::ClauseOperator;

pub use pgbulk_core::driver::operation::QuerySql;
