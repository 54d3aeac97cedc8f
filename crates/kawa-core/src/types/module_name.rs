//! Validated module name type.

use std::fmt;
use std::path::Component;
use std::path::Path;

use crate::KawaError;
use crate::Result;

/// Name reserved for the index document in the manifest store.
const RESERVED_INDEX_NAME: &str = "manifest";

/// A module name that is safe to use as a file name and URL segment.
///
/// Module names end up in `<store>/<name>.json`, in `/<name>.zip` and in
/// `<install_dir>/<name>`, so a name must be exactly one normal path
/// component and must not collide with the index document.
///
/// # Examples
///
/// ```
/// use kawa_core::types::ModuleName;
///
/// assert!(ModuleName::parse("widget").is_ok());
/// assert!(ModuleName::parse("../widget").is_err());
/// assert!(ModuleName::parse("manifest").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleName(String);

impl ModuleName {
    /// Validates `name` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`KawaError::InvalidModuleName`] if the name is empty,
    /// contains a path separator or NUL byte, is `.`/`..`, or is the
    /// reserved index name.
    pub fn parse(name: &str) -> Result<Self> {
        if is_valid(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(KawaError::InvalidModuleName {
                name: name.to_string(),
            })
        }
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the file name of this module's detail document.
    #[must_use]
    pub fn detail_file_name(&self) -> String {
        format!("{}.json", self.0)
    }

    /// Returns the file name of this module's archive on the server.
    #[must_use]
    pub fn archive_file_name(&self) -> String {
        format!("{}.zip", self.0)
    }
}

fn is_valid(name: &str) -> bool {
    if name.is_empty()
        || name.contains(['/', '\\', '\0'])
        || name.eq_ignore_ascii_case(RESERVED_INDEX_NAME)
    {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModuleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
