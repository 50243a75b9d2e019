use super::Error;

/// Error when a caller-supplied argument is malformed.
///
/// This occurs when:
/// - `key_fields` or `returning` is empty where a name is required, or names a
///   field twice
/// - `values` has neither the keyed nor the record shape
/// - records in one call update different sets of fields
/// - a key tuple has a different length than `key_fields`
/// - `batch_size` is zero
///
/// These errors are always raised before any statement reaches the database.
#[derive(Debug)]
pub(super) struct InvalidArgument {
    message: Box<str>,
}

impl std::error::Error for InvalidArgument {}

impl core::fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid argument: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidArgument(InvalidArgument {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid argument error.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidArgument(_))
    }
}
