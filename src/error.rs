//! Error handling for pdfcore

use std::io;
use thiserror::Error;

/// The main error type for pdfcore operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Generic(String),
    #[error("System error: {0}")]
    System(#[from] io::Error),
    #[error("Type mismatch for /{field}: expected one of {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
    #[error("Required field /{0} is missing")]
    MissingRequiredField(String),
    #[error("Reference {num} {gen} R cannot be resolved")]
    UnresolvableReference { num: u32, gen: u16 },
    #[error("{filter} filter error: {reason}")]
    Filter { filter: String, reason: String },
    #[error("Field /{field} needs PDF {needed} but document version is pinned to {current}")]
    VersionConflict {
        field: String,
        needed: String,
        current: String,
    },
}

impl Error {
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    pub fn type_mismatch<F, E, G>(field: F, expected: E, found: G) -> Self
    where
        F: Into<String>,
        E: Into<String>,
        G: Into<String>,
    {
        Error::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn missing_field<S: Into<String>>(field: S) -> Self {
        Error::MissingRequiredField(field.into())
    }

    pub fn filter<F: Into<String>, R: Into<String>>(filter: F, reason: R) -> Self {
        Error::Filter {
            filter: filter.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_generic() {
        let e = Error::generic("test error");
        assert!(matches!(e, Error::Generic(_)));
        assert_eq!(format!("{}", e), "test error");
    }

    #[test]
    fn test_error_type_mismatch() {
        let e = Error::type_mismatch("Kids", "Array", "Integer");
        assert!(matches!(e, Error::TypeMismatch { .. }));
        let msg = format!("{}", e);
        assert!(msg.contains("/Kids"));
        assert!(msg.contains("Array"));
        assert!(msg.contains("Integer"));
    }

    #[test]
    fn test_error_missing_field() {
        let e = Error::missing_field("Pages");
        assert!(matches!(e, Error::MissingRequiredField(_)));
        assert!(format!("{}", e).contains("/Pages"));
    }

    #[test]
    fn test_error_unresolvable_reference() {
        let e = Error::UnresolvableReference { num: 12, gen: 0 };
        assert!(format!("{}", e).contains("12 0 R"));
    }

    #[test]
    fn test_error_filter() {
        let e = Error::filter("FlateDecode", "corrupt stream");
        assert!(format!("{}", e).contains("FlateDecode"));
        assert!(format!("{}", e).contains("corrupt stream"));
    }

    #[test]
    fn test_error_version_conflict() {
        let e = Error::VersionConflict {
            field: "Metadata".into(),
            needed: "1.4".into(),
            current: "1.3".into(),
        };
        let msg = format!("{}", e);
        assert!(msg.contains("/Metadata"));
        assert!(msg.contains("1.4"));
        assert!(msg.contains("1.3"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::System(_)));
    }

    #[test]
    fn test_result_type() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_ok().unwrap(), 42);
    }
}
