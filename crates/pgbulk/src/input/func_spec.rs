use pgbulk_core::Result;
use pgbulk_sql::CombineFunction;

/// A combine function, given by name (`"incr"`, `"||"`, ...) or directly.
#[derive(Debug, Clone, PartialEq)]
pub enum FuncSpec {
    Name(String),
    Func(CombineFunction),
}

impl FuncSpec {
    /// Resolves the name. Unknown names fail before anything is executed.
    pub fn resolve(&self) -> Result<CombineFunction> {
        match self {
            FuncSpec::Name(name) => CombineFunction::from_name(name),
            FuncSpec::Func(func) => Ok(*func),
        }
    }
}

impl From<&str> for FuncSpec {
    fn from(value: &str) -> Self {
        FuncSpec::Name(value.to_string())
    }
}

impl From<String> for FuncSpec {
    fn from(value: String) -> Self {
        FuncSpec::Name(value)
    }
}

impl From<CombineFunction> for FuncSpec {
    fn from(value: CombineFunction) -> Self {
        FuncSpec::Func(value)
    }
}
