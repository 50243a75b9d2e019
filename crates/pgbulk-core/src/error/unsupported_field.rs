use super::Error;

/// Error when a combine function or clause operator is applied to a field whose
/// type it cannot handle, e.g. `incr` on a text column.
#[derive(Debug)]
pub(super) struct UnsupportedField {
    function: Box<str>,
    field: Box<str>,
}

impl std::error::Error for UnsupportedField {}

impl core::fmt::Display for UnsupportedField {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "'{}' doesn't support '{}' field", self.function, self.field)
    }
}

impl Error {
    /// Creates an unsupported field error.
    pub fn unsupported_field(function: impl Into<String>, field: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnsupportedField(UnsupportedField {
            function: function.into().into(),
            field: field.into().into(),
        }))
    }

    /// Returns `true` if this error is an unsupported field error.
    pub fn is_unsupported_field(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnsupportedField(_))
    }
}
