use super::Error;

/// Error when the environment a call runs in cannot serve it, e.g. an unknown
/// connection alias or a `returning` request against a driver that can't
/// return rows.
#[derive(Debug)]
pub(super) struct Precondition {
    message: Box<str>,
}

impl std::error::Error for Precondition {}

impl core::fmt::Display for Precondition {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "precondition failed: {}", self.message)
    }
}

impl Error {
    /// Creates a precondition error.
    pub fn precondition(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Precondition(Precondition {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a precondition error.
    pub fn is_precondition(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Precondition(_))
    }
}
