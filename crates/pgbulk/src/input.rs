//! Argument types accepted by the bulk builders.

mod func_spec;
pub use func_spec::FuncSpec;

mod key_ops;
pub use key_ops::{KeyOps, OpSpec};

mod names;
pub use names::{FieldNames, Returning};

mod values;
pub use values::Values;
