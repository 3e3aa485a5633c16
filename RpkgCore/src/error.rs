//! Error types for `RpkgCore`

use std::path::PathBuf;

use thiserror::Error;

/// Broad failure classes shared by every `RpkgCore` error.
///
/// Front ends report on the kind; the concrete variant carries the detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A hash, file, or converter entry point does not exist.
    NotFound,
    /// A hash list or resource payload is malformed.
    ParseFailure,
    /// No converter is attached, or the converter reported a failure.
    ConverterUnavailable,
    /// An operation was attempted against state that cannot serve it.
    InvalidState,
    /// Underlying I/O failure.
    Io,
}

/// The error type for `RpkgCore` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A file that an operation needs does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    FileUnreadable {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    // ==================== Hash List Errors ====================
    /// No hash list was found at the requested (or default) location.
    #[error("hash list not found: {path}")]
    HashListNotFound {
        /// The location that was tried.
        path: PathBuf,
    },

    /// A hash list line could not be parsed.
    #[error("hash list parse error on line {line}: {message}")]
    HashListParse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// A hash string is not a valid 64-bit hex hash.
    #[error("invalid hash '{0}'")]
    InvalidHash(String),

    /// The hash is not present in the loaded hash list.
    #[error("hash {0} not found in hash list")]
    HashNotFound(String),

    /// The registry has not been populated yet.
    #[error("hash list is not loaded")]
    HashListNotLoaded,

    // ==================== Converter Errors ====================
    /// No converter is attached, or its module could not be loaded.
    #[error("resource converter unavailable: {reason}")]
    ConverterUnavailable {
        /// Why the converter cannot be used.
        reason: String,
    },

    /// The converter module is loaded but lacks a required export or entry point.
    #[error("resource converter entry point missing: {symbol}")]
    ConverterEntryPointMissing {
        /// The export or table field that is missing.
        symbol: String,
    },

    /// The converter was called and reported failure.
    #[error("resource conversion failed: {message}")]
    ConversionFailed {
        /// Description of the failed call.
        message: String,
    },

    /// The converter returned text that is not valid UTF-8.
    #[error("converter returned invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A path cannot be passed across the converter boundary.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    // ==================== Parsing Errors ====================
    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Classify this error into the shared failure taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) | Error::FileUnreadable { .. } => ErrorKind::Io,
            Error::FileNotFound { .. }
            | Error::HashListNotFound { .. }
            | Error::HashNotFound(_)
            | Error::ConverterEntryPointMissing { .. } => ErrorKind::NotFound,
            Error::HashListParse { .. }
            | Error::InvalidHash(_)
            | Error::InvalidUtf8(_)
            | Error::InvalidPath(_)
            | Error::JsonError(_) => ErrorKind::ParseFailure,
            Error::ConverterUnavailable { .. } | Error::ConversionFailed { .. } => {
                ErrorKind::ConverterUnavailable
            }
            Error::HashListNotLoaded => ErrorKind::InvalidState,
        }
    }

    pub(crate) fn unavailable(reason: impl Into<String>) -> Self {
        Error::ConverterUnavailable {
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for `RpkgCore` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::HashListNotLoaded.kind(), ErrorKind::InvalidState);
        assert_eq!(
            Error::HashListParse {
                line: 3,
                message: "missing comma".into()
            }
            .kind(),
            ErrorKind::ParseFailure
        );
        assert_eq!(
            Error::unavailable("no module").kind(),
            ErrorKind::ConverterUnavailable
        );
        assert_eq!(
            Error::FileNotFound {
                path: PathBuf::from("x")
            }
            .kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_display() {
        let err = Error::HashListParse {
            line: 12,
            message: "missing comma".into(),
        };
        assert_eq!(
            err.to_string(),
            "hash list parse error on line 12: missing comma"
        );
    }
}
