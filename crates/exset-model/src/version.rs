//! Library/format version carried in written documents.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Version of this library as written into metadata documents.
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A `major.minor.patch` version. Suffixes such as `-SNAPSHOT` are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version string '{0}'")]
pub struct VersionParseError(pub String);

impl FormatVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Version of this library, `0.0.0` when the package version does not parse.
    pub fn current() -> Self {
        LIBRARY_VERSION.parse().unwrap_or_default()
    }

    pub fn is_at_least(&self, other: &FormatVersion) -> bool {
        self >= other
    }
}

impl FromStr for FormatVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VersionParseError(s.to_string());
        let mut parts = s.trim().splitn(3, '.');
        let major = parts.next().ok_or_else(err)?;
        let minor = parts.next().ok_or_else(err)?;
        let patch = parts.next().ok_or_else(err)?;
        // "0-BETA" -> "0"
        let patch = patch.split('-').next().unwrap_or(patch);
        Ok(Self {
            major: major.parse().map_err(|_| err())?,
            minor: minor.parse().map_err(|_| err())?,
            patch: patch.parse().map_err(|_| err())?,
        })
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_suffix() {
        let version: FormatVersion = "9.10.2-SNAPSHOT".parse().unwrap();
        assert_eq!(version, FormatVersion::new(9, 10, 2));
        assert_eq!(version.to_string(), "9.10.2");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("9.10".parse::<FormatVersion>().is_err());
        assert!("a.b.c".parse::<FormatVersion>().is_err());
    }

    #[test]
    fn test_is_at_least() {
        let v = FormatVersion::new(9, 8, 0);
        assert!(v.is_at_least(&FormatVersion::new(9, 7, 5)));
        assert!(v.is_at_least(&FormatVersion::new(9, 8, 0)));
        assert!(!v.is_at_least(&FormatVersion::new(10, 0, 0)));
    }

    #[test]
    fn test_current_matches_package() {
        assert_eq!(FormatVersion::current().to_string(), LIBRARY_VERSION);
    }
}
