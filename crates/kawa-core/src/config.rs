//! Configuration for building, serving and installing modules.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Name of the reserved descriptor file every module archive must contain.
pub const DESCRIPTOR_NAME: &str = "mura-module.json";

/// Name of the manifest store directory under the module root.
pub const STORE_DIR_NAME: &str = ".manifests";

/// Port used by the module server and expected by the client by default.
pub const DEFAULT_PORT: u16 = 2209;

/// Configuration for a manifest build.
///
/// # Examples
///
/// ```
/// use kawa_core::BuildConfig;
///
/// let config = BuildConfig {
///     root: "modules".into(),
///     ..Default::default()
/// };
/// assert_eq!(config.store_dir(), std::path::Path::new("modules/.manifests"));
/// ```
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory scanned recursively for module archives.
    pub root: PathBuf,

    /// Name of the store subdirectory created under `root`.
    pub store_dir_name: String,

    /// File extension marking a file as a module archive (no leading dot).
    pub archive_extension: String,

    /// Base name of the descriptor entry inside each archive.
    pub descriptor_name: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            store_dir_name: STORE_DIR_NAME.to_string(),
            archive_extension: "zip".to_string(),
            descriptor_name: DESCRIPTOR_NAME.to_string(),
        }
    }
}

impl BuildConfig {
    /// Returns the path of the manifest store directory.
    #[must_use]
    pub fn store_dir(&self) -> PathBuf {
        self.root.join(&self.store_dir_name)
    }

    /// Returns whether `extension` marks an archive. Case-insensitive.
    #[must_use]
    pub fn is_archive_extension(&self, extension: &str) -> bool {
        self.archive_extension.eq_ignore_ascii_case(extension)
    }
}

/// Transport settings for talking to a module server.
///
/// Constructed once per command and passed by reference to every request.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL of the module server, without trailing slash.
    pub base_url: String,

    /// Global timeout applied to each request.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    /// Defaults to `http://localhost:2209` with a one second timeout.
    fn default() -> Self {
        Self {
            base_url: format!("http://localhost:{DEFAULT_PORT}"),
            timeout: Duration::from_secs(1),
        }
    }
}

impl TransportConfig {
    /// Joins a server-relative path onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Local layout and policy for installing modules.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    /// Directory modules are extracted into.
    pub install_dir: PathBuf,

    /// Directory the archive is downloaded to before extraction.
    pub download_dir: PathBuf,

    /// Check downloaded file digests against the detail document before
    /// extracting.
    pub verify_digests: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            install_dir: PathBuf::from("app/modules"),
            download_dir: PathBuf::from("."),
            verify_digests: false,
        }
    }
}

/// Settings for the module file server.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Directory served as the document root.
    pub root: PathBuf,

    /// Address to listen on.
    pub addr: SocketAddr,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_build_config() {
        let config = BuildConfig::default();
        assert_eq!(config.descriptor_name, "mura-module.json");
        assert_eq!(config.store_dir(), PathBuf::from("./.manifests"));
        assert!(config.is_archive_extension("zip"));
        assert!(config.is_archive_extension("ZIP"));
        assert!(!config.is_archive_extension("tar"));
    }

    #[test]
    fn test_transport_url_joining() {
        let config = TransportConfig {
            base_url: "http://example.test:2209/".into(),
            ..Default::default()
        };
        assert_eq!(
            config.url("/.manifests/manifest.json"),
            "http://example.test:2209/.manifests/manifest.json"
        );
        assert_eq!(config.url("widget.zip"), "http://example.test:2209/widget.zip");
    }

    #[test]
    fn test_default_transport_is_short() {
        let config = TransportConfig::default();
        assert_eq!(config.base_url, "http://localhost:2209");
        assert_eq!(config.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_default_install_and_serve() {
        let install = InstallConfig::default();
        assert_eq!(install.install_dir, PathBuf::from("app/modules"));
        assert!(!install.verify_digests);

        let serve = ServeConfig::default();
        assert_eq!(serve.addr.port(), 2209);
    }
}
