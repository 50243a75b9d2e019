use crate::{Error, Result};

use std::{fmt, str::FromStr};

/// A database server version, ordered by `(major, minor, patch)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> ServerVersion {
        ServerVersion {
            major,
            minor,
            patch,
        }
    }

    /// Decodes the `server_version_num` setting, e.g. `90424` or `160002`.
    ///
    /// Servers from 10 onwards encode `major * 10000 + minor`; older ones
    /// encode `major * 10000 + minor * 100 + patch`.
    pub fn from_version_num(num: u32) -> ServerVersion {
        if num >= 100_000 {
            ServerVersion::new(num / 10_000, num % 10_000, 0)
        } else {
            ServerVersion::new(num / 10_000, (num / 100) % 100, num % 100)
        }
    }
}

impl FromStr for ServerVersion {
    type Err = Error;

    /// Parses the `server_version` setting, e.g. `9.4.26` or
    /// `16.2 (Debian 16.2-1.pgdg120+2)`.
    fn from_str(s: &str) -> Result<ServerVersion> {
        let number = s
            .split_whitespace()
            .next()
            .ok_or_else(|| Error::invalid_result(format!("empty server version `{s}`")))?;

        let mut parts = number.split('.').map(|part| {
            // Development builds append a suffix: `17beta1`
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse::<u32>()
        });

        let mut next = || -> Result<u32> {
            match parts.next() {
                Some(part) => part
                    .map_err(|_| Error::invalid_result(format!("invalid server version `{s}`"))),
                None => Ok(0),
            }
        };

        Ok(ServerVersion::new(next()?, next()?, next()?))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
