use super::Error;

/// Error when an operator or combine function is referenced by a name that is
/// not registered.
#[derive(Debug)]
pub(super) struct UnknownName {
    what: &'static str,
    name: Box<str>,
}

impl std::error::Error for UnknownName {}

impl core::fmt::Display for UnknownName {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{} with name '{}' doesn't exist", self.what, self.name)
    }
}

impl Error {
    /// Creates an error for an unregistered clause operator name.
    pub fn unknown_operator(name: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnknownName(UnknownName {
            what: "operator",
            name: name.into().into(),
        }))
    }

    /// Creates an error for an unregistered combine function name.
    pub fn unknown_function(name: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnknownName(UnknownName {
            what: "function",
            name: name.into().into(),
        }))
    }

    /// Returns `true` if this error is an unknown operator or function error.
    pub fn is_unknown_name(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnknownName(_))
    }
}
