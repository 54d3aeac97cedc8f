//! Installing and removing modules.

use std::path::Path;
use std::path::PathBuf;

use tracing::info;
use tracing::warn;

use super::ModuleSource;
use crate::InstallConfig;
use crate::KawaError;
use crate::Result;
use crate::extraction::extract_archive;
use crate::report::ExtractionReport;
use crate::types::DestDir;
use crate::types::ModuleName;
use crate::types::SafePath;
use crate::verify::verify_archive;

/// Report of a completed install.
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// Installed module.
    pub module: ModuleName,
    /// Size of the downloaded archive.
    pub archive_bytes: u64,
    /// Whether file digests were checked before extraction.
    pub verified: bool,
    /// Extraction statistics.
    pub extraction: ExtractionReport,
}

/// Result of removing a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The module's directory was deleted.
    Removed(PathBuf),
    /// Nothing was installed at this path.
    NotInstalled(PathBuf),
}

/// Downloads `name` from `source` and extracts it into the install
/// directory.
///
/// The archive is saved as `<download_dir>/<name>.zip` and deleted once
/// extraction finishes, whether or not it succeeded. With
/// [`InstallConfig::verify_digests`] the detail document is fetched first
/// and the download must match it before anything is extracted.
///
/// # Errors
///
/// Returns [`KawaError::InvalidModuleName`] before any network access if
/// the name is unsafe, otherwise the first transport, verification or
/// extraction error.
pub fn install<S: ModuleSource + ?Sized>(
    source: &S,
    name: &str,
    config: &InstallConfig,
) -> Result<InstallReport> {
    let module = ModuleName::parse(name)?;
    let detail = if config.verify_digests {
        Some(source.fetch_detail(&module)?)
    } else {
        None
    };

    std::fs::create_dir_all(&config.download_dir)?;
    let archive = config.download_dir.join(module.archive_file_name());
    let archive_bytes = match source.download_archive(&module, &archive) {
        Ok(bytes) => bytes,
        Err(e) => {
            discard_download(&archive);
            return Err(e);
        }
    };

    let result = detail
        .as_ref()
        .map_or(Ok(()), |detail| verify_archive(&archive, detail))
        .and_then(|()| extract_archive(&archive, &config.install_dir));
    discard_download(&archive);
    let extraction = result?;

    info!(
        module = %module,
        files = extraction.files_extracted,
        bytes = extraction.bytes_written,
        "installed module"
    );
    Ok(InstallReport {
        module,
        archive_bytes,
        verified: detail.is_some(),
        extraction,
    })
}

/// Deletes `<install_dir>/<name>` and everything below it.
///
/// A module that is not installed is reported, not treated as an error.
///
/// # Errors
///
/// Returns [`KawaError::InvalidModuleName`] for an unsafe name,
/// [`KawaError::PathTraversal`] if the module path resolves outside the
/// install directory, or [`KawaError::Io`] if deletion fails.
pub fn remove(name: &str, config: &InstallConfig) -> Result<RemoveOutcome> {
    let module = ModuleName::parse(name)?;
    let target = config.install_dir.join(module.as_str());

    if !config.install_dir.is_dir() {
        warn!(module = %module, path = %target.display(), "module is not installed");
        return Ok(RemoveOutcome::NotInstalled(target));
    }
    let dest = DestDir::new(&config.install_dir)?;
    let safe = SafePath::validate(Path::new(module.as_str()), &dest)?;
    let resolved = dest.join(&safe);

    match std::fs::symlink_metadata(&resolved) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(&resolved)?,
        Ok(_) => std::fs::remove_file(&resolved)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(module = %module, path = %target.display(), "module is not installed");
            return Ok(RemoveOutcome::NotInstalled(target));
        }
        Err(e) => return Err(KawaError::Io(e)),
    }

    info!(module = %module, path = %target.display(), "removed module");
    Ok(RemoveOutcome::Removed(target))
}

fn discard_download(archive: &Path) {
    match std::fs::remove_file(archive) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
            warn!(path = %archive.display(), error = %e, "could not delete downloaded archive");
        }
        _ => {}
    }
}
