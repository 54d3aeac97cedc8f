//! Error conversion utilities for CLI.
//!
//! Converts kawa-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use kawa_core::KawaError;
use std::fmt;

/// A user-facing error message with an optional hint.
///
/// The hint is kept out of `Display` so the message stays on one line; the
/// binary prints it separately.
#[derive(Debug)]
pub struct UserError {
    message: String,
    hint: Option<&'static str>,
}

impl UserError {
    fn new(message: impl Into<String>, hint: Option<&'static str>) -> anyhow::Error {
        anyhow::Error::new(Self {
            message: message.into(),
            hint,
        })
    }
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for UserError {}

/// Returns the hint attached anywhere in the error chain.
pub fn hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<UserError>())
        .and_then(|user| user.hint)
}

/// Renders the single stderr line for a failed command, with the hint (if
/// any) appended.
pub fn diagnostic(err: &anyhow::Error) -> String {
    match hint(err) {
        Some(hint) => format!("error: {err:#} (HINT: {hint})"),
        None => format!("error: {err:#}"),
    }
}

/// Converts `KawaError` to user-friendly anyhow error with context.
///
/// `subject` names what the command was working on: a module name, a root
/// directory or a server URL.
pub fn convert_error(err: KawaError, subject: &str) -> anyhow::Error {
    match err {
        KawaError::PathTraversal { path } => UserError::new(
            format!(
                "Security violation: '{subject}' attempted path traversal with '{}'",
                path.display()
            ),
            Some("This archive may be malicious. Do not install modules from untrusted servers."),
        ),
        KawaError::InvalidModuleName { name } => UserError::new(
            format!("Invalid module name {name:?}"),
            Some("Module names are a single path component and cannot be 'manifest'."),
        ),
        KawaError::DigestMismatch {
            filename,
            expected,
            actual,
        } => UserError::new(
            format!(
                "Integrity check failed for '{filename}' in '{subject}': expected {}, got {}",
                display_digest(&expected),
                display_digest(&actual)
            ),
            Some("The archive does not match its published manifest. Rebuild the manifest on the server."),
        ),
        KawaError::NotFound { url, status } => UserError::new(
            format!("'{subject}' not found on server ({url} returned {status})"),
            Some("Run `kawa list` to see published modules."),
        ),
        KawaError::Transport { url, reason } => UserError::new(
            format!("Cannot reach module server at {url}: {reason}"),
            Some("Check that the server is running and that --server points at it."),
        ),
        KawaError::Schema { document, reason } => UserError::new(
            format!("Server returned an invalid {document} document: {reason}"),
            Some("Rebuild the manifest on the server with `kawa build`."),
        ),
        KawaError::ArchiveOpen { path, reason } => UserError::new(
            format!("Cannot open archive '{}': {reason}", path.display()),
            Some("The archive may be corrupted. Replace it and run the command again."),
        ),
        KawaError::EntryRead {
            archive,
            entry,
            reason,
        } => UserError::new(
            format!(
                "Archive '{}' is corrupted at '{entry}': {reason}",
                archive.display()
            ),
            None,
        ),
        KawaError::Extraction { entry, source } => UserError::new(
            format!("Failed to extract '{entry}' from '{subject}': {source}"),
            Some("Check available disk space and permissions on the install directory."),
        ),
        KawaError::Walk { path, reason } => UserError::new(
            format!("Cannot scan '{}': {reason}", path.display()),
            None,
        ),
        KawaError::Io(e) => UserError::new(format!("I/O error while processing '{subject}': {e}"), None),
    }
}

fn display_digest(digest: &str) -> &str {
    if digest.is_empty() { "<missing>" } else { digest }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_path_traversal_has_hint() {
        let err = convert_error(
            KawaError::PathTraversal {
                path: PathBuf::from("../etc/passwd"),
            },
            "widget",
        );
        let msg = format!("{err:#}");
        assert!(msg.contains("Security violation"));
        assert!(msg.contains("../etc/passwd"));
        assert!(!msg.contains('\n'));
        assert!(hint(&err).unwrap().contains("malicious"));
    }

    #[test]
    fn test_diagnostic_is_one_line() {
        let err = convert_error(
            KawaError::NotFound {
                url: "http://localhost:2209/gadget.json".into(),
                status: 404,
            },
            "gadget",
        )
        .context("info failed");
        let line = diagnostic(&err);
        assert!(line.starts_with("error: info failed: 'gadget' not found"));
        assert!(line.ends_with("(HINT: Run `kawa list` to see published modules.)"));
        assert!(!line.contains('\n'));

        let plain = anyhow::anyhow!("disk full");
        assert_eq!(diagnostic(&plain), "error: disk full");
    }

    #[test]
    fn test_not_found_names_module() {
        let err = convert_error(
            KawaError::NotFound {
                url: "http://localhost:2209/gadget.zip".into(),
                status: 404,
            },
            "gadget",
        );
        let msg = err.to_string();
        assert!(msg.contains("'gadget' not found"));
        assert!(msg.contains("404"));
        assert!(hint(&err).unwrap().contains("kawa list"));
    }

    #[test]
    fn test_missing_digest_is_labelled() {
        let err = convert_error(
            KawaError::DigestMismatch {
                filename: "extra.txt".into(),
                expected: String::new(),
                actual: "ab".repeat(32),
            },
            "widget",
        );
        assert!(err.to_string().contains("expected <missing>"));
    }

    #[test]
    fn test_hint_survives_context() {
        let err = convert_error(
            KawaError::Transport {
                url: "http://localhost:2209/.manifests/manifest.json".into(),
                reason: "connection refused".into(),
            },
            "http://localhost:2209",
        )
        .context("list failed");
        assert!(hint(&err).is_some());
        assert!(format!("{err:#}").starts_with("list failed: Cannot reach module server"));
    }

    #[test]
    fn test_io_error_without_hint() {
        let err = convert_error(KawaError::Io(std::io::Error::other("disk full")), "widget");
        assert!(err.to_string().contains("disk full"));
        assert!(hint(&err).is_none());
    }

    #[test]
    fn test_foreign_errors_have_no_hint() {
        let err = anyhow::anyhow!("plain failure");
        assert!(hint(&err).is_none());
    }
}
