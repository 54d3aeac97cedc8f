//! Validated safe path type and the path containment predicate.

use crate::KawaError;
use crate::Result;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use super::DestDir;

/// A path that resolves inside a [`DestDir`].
///
/// `SafePath` holds the lexically normalized, relative form of an
/// untrusted path (archive entry name, request path) after it has been
/// checked to stay inside the destination root. This is the only
/// containment check in the crate: the extractor, the module server and
/// module removal all go through [`SafePath::validate`].
///
/// # Security Properties
///
/// - Can ONLY be constructed through validation
/// - NO `From<PathBuf>` implementation
/// - Always resolves within the destination directory, including through
///   symlinks that already exist under it
///
/// # Examples
///
/// ```no_run
/// use kawa_core::types::DestDir;
/// use kawa_core::types::SafePath;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("app/modules")?;
///
/// let safe = SafePath::validate(Path::new("widget/widget.lua"), &dest)?;
/// assert!(dest.join(&safe).starts_with(dest.as_path()));
///
/// assert!(SafePath::validate(Path::new("../escape.txt"), &dest).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Validates `path` against `dest` and constructs a `SafePath`.
    ///
    /// # Validation Steps
    ///
    /// 1. Reject empty paths and paths containing NUL bytes
    /// 2. Reject absolute paths (root or prefix components)
    /// 3. Resolve `.` and `..` lexically; a `..` that would climb above the
    ///    root is rejected
    /// 4. Canonicalize the deepest existing ancestor of the resolved path
    ///    and require it to stay under the canonical root
    /// 5. Reject dangling symlinks met on the way up, since creating a file
    ///    through one writes wherever it points
    ///
    /// # Errors
    ///
    /// Returns [`KawaError::PathTraversal`] for any path that does not stay
    /// inside `dest`, and [`KawaError::Io`] if canonicalizing an existing
    /// ancestor fails for a reason other than it not existing.
    pub fn validate(path: &Path, dest: &DestDir) -> Result<Self> {
        let traversal = || KawaError::PathTraversal {
            path: path.to_path_buf(),
        };

        if path.as_os_str().is_empty() || has_null_bytes(path) {
            return Err(traversal());
        }

        let mut normalized = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(traversal());
                    }
                }
                Component::RootDir | Component::Prefix(_) => return Err(traversal()),
            }
        }

        let resolved = dest.as_path().join(&normalized);
        let mut ancestor = resolved.as_path();
        loop {
            match ancestor.canonicalize() {
                Ok(canonical) => {
                    if !canonical.starts_with(dest.as_path()) {
                        return Err(traversal());
                    }
                    break;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    // Present but unresolvable: a dangling symlink that a
                    // later create would follow.
                    if ancestor.symlink_metadata().is_ok() {
                        return Err(traversal());
                    }
                    match ancestor.parent() {
                        Some(parent) => ancestor = parent,
                        None => break,
                    }
                }
                Err(e) => {
                    return Err(KawaError::Io(std::io::Error::new(
                        e.kind(),
                        format!("failed to canonicalize {}: {e}", ancestor.display()),
                    )));
                }
            }
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized relative path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Returns whether this path resolves to the root itself.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

/// Checks if a path contains null bytes.
#[cfg(unix)]
fn has_null_bytes(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().contains(&b'\0')
}

/// Checks if a path contains null bytes.
#[cfg(not(unix))]
fn has_null_bytes(path: &Path) -> bool {
    path.to_str().is_none_or(|s| s.contains('\0'))
}
