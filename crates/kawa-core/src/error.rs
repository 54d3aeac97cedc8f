//! Error types for manifest building, transport and module installation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `KawaError`.
pub type Result<T> = std::result::Result<T, KawaError>;

/// Errors that can occur while building, serving or installing modules.
///
/// Archive validation failures are not errors: they are reported through
/// [`Validation::Invalid`](crate::manifest::Validation::Invalid) and skipped.
#[derive(Error, Debug)]
pub enum KawaError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive file is missing or is not a readable archive.
    #[error("cannot open archive {path}: {reason}")]
    ArchiveOpen {
        /// Path of the archive.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// Archive is corrupt at a specific entry.
    #[error("cannot read entry '{entry}' of {archive}: {reason}")]
    EntryRead {
        /// Path of the archive.
        archive: PathBuf,
        /// In-archive name of the failing entry.
        entry: String,
        /// Underlying reason.
        reason: String,
    },

    /// An archive entry resolves outside the destination root.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending in-archive path.
        path: PathBuf,
    },

    /// Writing an archive entry to disk failed.
    #[error("failed to extract '{entry}': {source}")]
    Extraction {
        /// In-archive name of the failing entry.
        entry: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A manifest document does not match its schema.
    #[error("invalid {document} document: {reason}")]
    Schema {
        /// Which document failed (`index`, `detail`, ...).
        document: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The server has no such document or archive.
    #[error("not found: {url} (status {status})")]
    NotFound {
        /// Requested URL.
        url: String,
        /// HTTP status returned by the server.
        status: u16,
    },

    /// The request could not be completed at the transport level.
    #[error("request to {url} failed: {reason}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying reason.
        reason: String,
    },

    /// A module name is not usable as a single path component.
    #[error("invalid module name: {name:?}")]
    InvalidModuleName {
        /// The rejected name.
        name: String,
    },

    /// A downloaded file does not match its published digest.
    #[error("digest mismatch for {filename}: expected {expected}, got {actual}")]
    DigestMismatch {
        /// Base name of the file.
        filename: String,
        /// Digest from the detail document.
        expected: String,
        /// Digest of the downloaded bytes.
        actual: String,
    },

    /// Walking the module root failed.
    #[error("cannot walk {path}: {reason}")]
    Walk {
        /// Path being walked when the failure happened.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },
}

impl KawaError {
    /// Returns `true` if this error was raised to protect the local system
    /// from an untrusted archive or name.
    ///
    /// # Examples
    ///
    /// ```
    /// use kawa_core::KawaError;
    /// use std::path::PathBuf;
    ///
    /// let err = KawaError::PathTraversal {
    ///     path: PathBuf::from("../etc/passwd"),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = KawaError::Schema {
    ///     document: "index".into(),
    ///     reason: "missing field".into(),
    /// };
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal { .. } | Self::InvalidModuleName { .. } | Self::DigestMismatch { .. }
        )
    }

    /// Returns `true` if the server reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn schema(document: &str, reason: impl Into<String>) -> Self {
        Self::Schema {
            document: document.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_traversal_error() {
        let err = KawaError::PathTraversal {
            path: PathBuf::from("../etc/passwd"),
        };
        assert!(err.to_string().contains("path traversal"));
        assert!(err.to_string().contains("../etc/passwd"));
        assert!(err.is_security_violation());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: KawaError = io_err.into();
        assert!(matches!(err, KawaError::Io(_)));
        assert!(!err.is_security_violation());
    }

    #[test]
    fn test_extraction_error_names_entry() {
        let err = KawaError::Extraction {
            entry: "widget/widget.lua".into(),
            source: std::io::Error::other("disk full"),
        };
        let display = err.to_string();
        assert!(display.contains("widget/widget.lua"));
        assert!(display.contains("disk full"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_not_found() {
        let err = KawaError::NotFound {
            url: "http://localhost:2209/.manifests/nope.json".into(),
            status: 404,
        };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("404"));
        assert!(!err.is_security_violation());
    }

    #[test]
    fn test_digest_mismatch_is_security_violation() {
        let err = KawaError::DigestMismatch {
            filename: "widget.lua".into(),
            expected: "a".repeat(64),
            actual: "b".repeat(64),
        };
        assert!(err.is_security_violation());
        assert!(err.to_string().contains("widget.lua"));
    }

    #[test]
    fn test_schema_error_names_document() {
        let err = KawaError::schema("index", "missing field `modules`");
        assert!(err.to_string().contains("invalid index document"));
        assert!(err.to_string().contains("missing field `modules`"));
    }
}
