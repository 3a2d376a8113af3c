//! PDF version numbers
//!
//! Versions are totally ordered so that feature gates ("this field needs at
//! least PDF 1.4") can be checked and the document header upgraded when a
//! newer feature is written.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A PDF specification version such as 1.4 or 2.0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PdfVersion {
    major: u8,
    minor: u8,
}

impl PdfVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    pub fn major(&self) -> u8 {
        self.major
    }

    pub fn minor(&self) -> u8 {
        self.minor
    }
}

impl Default for PdfVersion {
    /// The version assumed when a document does not declare one
    fn default() -> Self {
        PdfVersion::new(1, 4)
    }
}

impl fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for PdfVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| Error::generic(format!("Invalid PDF version: {}", s)))?;
        let major = major
            .parse::<u8>()
            .map_err(|_| Error::generic(format!("Invalid PDF version: {}", s)))?;
        let minor = minor
            .parse::<u8>()
            .map_err(|_| Error::generic(format!("Invalid PDF version: {}", s)))?;
        Ok(PdfVersion::new(major, minor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ordering() {
        assert!(PdfVersion::new(1, 2) < PdfVersion::new(1, 5));
        assert!(PdfVersion::new(1, 7) < PdfVersion::new(2, 0));
        assert_eq!(PdfVersion::new(1, 4), PdfVersion::new(1, 4));
    }

    #[test]
    fn test_version_parse() {
        let v: PdfVersion = "1.5".parse().unwrap();
        assert_eq!(v, PdfVersion::new(1, 5));
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!("15".parse::<PdfVersion>().is_err());
        assert!("a.b".parse::<PdfVersion>().is_err());
        assert!("".parse::<PdfVersion>().is_err());
    }

    #[test]
    fn test_version_display() {
        assert_eq!(PdfVersion::new(1, 7).to_string(), "1.7");
    }

    #[test]
    fn test_version_default() {
        assert_eq!(PdfVersion::default(), PdfVersion::new(1, 4));
    }
}
