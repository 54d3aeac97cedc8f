//! Canonical root directory for containment checks.

use crate::KawaError;
use crate::Result;
use std::io;
use std::path::Path;
use std::path::PathBuf;

/// An existing directory, stored in canonical form, that untrusted relative
/// paths are resolved against.
///
/// The install directory and the served module root are both `DestDir`s.
/// Symlinks in the root itself are resolved once here; every
/// [`SafePath`](super::SafePath) is then checked against this form.
///
/// # Examples
///
/// ```no_run
/// use kawa_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = DestDir::create("app/modules")?;
/// assert!(root.as_path().is_absolute());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Canonicalizes an existing directory.
    ///
    /// # Errors
    ///
    /// Returns [`KawaError::Io`] naming `path` if it is missing, is not a
    /// directory, or cannot be resolved.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let canonical = path.canonicalize().map_err(|e| root_error(path, &e))?;
        if !canonical.is_dir() {
            return Err(root_error(
                path,
                &io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            ));
        }
        Ok(Self(canonical))
    }

    /// Like [`DestDir::new`], creating the directory and its parents first.
    ///
    /// # Errors
    ///
    /// Returns [`KawaError::Io`] if creation fails or `path` exists as a
    /// file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path).map_err(|e| root_error(path, &e))?;
        Self::new(path)
    }

    /// Returns the canonical path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Resolves a validated relative path under this root.
    #[inline]
    #[must_use]
    pub fn join(&self, safe_path: &super::SafePath) -> PathBuf {
        self.0.join(safe_path.as_path())
    }
}

fn root_error(path: &Path, err: &io::Error) -> KawaError {
    KawaError::Io(io::Error::new(
        err.kind(),
        format!("{}: {err}", path.display()),
    ))
}
