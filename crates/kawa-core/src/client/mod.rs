//! Client side of module distribution.
//!
//! [`ModuleSource`] is the seam between the client operations and the
//! network: [`HttpTransport`] talks to a module server, tests substitute an
//! in-memory source.

mod http;
mod install;

use std::path::Path;

pub use http::HttpTransport;
pub use install::InstallReport;
pub use install::RemoveOutcome;
pub use install::install;
pub use install::remove;

use crate::Result;
use crate::manifest::ManifestIndex;
use crate::manifest::ModuleDetail;
use crate::types::ModuleName;

/// Server path of the index document.
pub const INDEX_PATH: &str = "/.manifests/manifest.json";

/// Returns the server path of `name`'s detail document.
#[must_use]
pub fn detail_path(name: &ModuleName) -> String {
    format!("/.manifests/{}", name.detail_file_name())
}

/// Returns the server path of `name`'s archive.
#[must_use]
pub fn archive_path(name: &ModuleName) -> String {
    format!("/{}", name.archive_file_name())
}

/// A place modules are published from.
pub trait ModuleSource {
    /// Fetches and checks the index document.
    ///
    /// # Errors
    ///
    /// Returns a transport, not-found or schema error.
    fn fetch_index(&self) -> Result<ManifestIndex>;

    /// Fetches and checks `name`'s detail document.
    ///
    /// # Errors
    ///
    /// Returns a transport, not-found or schema error.
    fn fetch_detail(&self, name: &ModuleName) -> Result<ModuleDetail>;

    /// Downloads `name`'s archive to `dest`, returning the byte count.
    ///
    /// # Errors
    ///
    /// Returns a transport or not-found error, or an I/O error writing
    /// `dest`.
    fn download_archive(&self, name: &ModuleName, dest: &Path) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_paths() {
        let name = ModuleName::parse("widget").unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(detail_path(&name), "/.manifests/widget.json");
        assert_eq!(archive_path(&name), "/widget.zip");
        assert_eq!(INDEX_PATH, "/.manifests/manifest.json");
    }
}
