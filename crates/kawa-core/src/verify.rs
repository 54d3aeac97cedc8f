//! Integrity verification of downloaded module archives.

use std::path::Path;

use tracing::debug;

use crate::KawaError;
use crate::Result;
use crate::archive::ModuleArchive;
use crate::archive::entry_read_error;
use crate::copy::CopyBuffer;
use crate::digest::digest_reader;
use crate::manifest::FileDigest;
use crate::manifest::ModuleDetail;

/// Digests every non-directory entry of `archive`, in archive order.
///
/// This is the `files` list the manifest builder publishes for the
/// archive.
///
/// # Errors
///
/// Returns [`KawaError::EntryRead`] if an entry cannot be read.
pub fn file_digests(archive: &mut ModuleArchive) -> Result<Vec<FileDigest>> {
    let archive_path = archive.path().to_path_buf();
    let mut buffer = CopyBuffer::new();
    let mut files = Vec::new();

    archive.for_each_entry(|meta, reader| {
        if meta.is_dir {
            return Ok(());
        }
        let digest = digest_reader(reader, &mut buffer)
            .map_err(|e| entry_read_error(&archive_path, &meta.name, &e.to_string()))?;
        files.push(FileDigest {
            filename: meta.base_name().to_string(),
            digest,
        });
        Ok(())
    })?;

    Ok(files)
}

/// Checks the archive at `archive_path` against a published detail
/// document.
///
/// Files are compared pairwise in order. A file present on only one side
/// is reported with an empty digest on the other.
///
/// # Errors
///
/// Returns [`KawaError::DigestMismatch`] for the first difference, or the
/// archive's open/read error.
///
/// # Examples
///
/// ```no_run
/// use kawa_core::manifest::ManifestStore;
/// use kawa_core::types::ModuleName;
/// use kawa_core::verify_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = ManifestStore::new(".manifests");
/// let detail = store.load_detail(&ModuleName::parse("widget")?)?;
/// verify_archive("widget.zip", &detail)?;
/// # Ok(())
/// # }
/// ```
pub fn verify_archive(archive_path: impl AsRef<Path>, detail: &ModuleDetail) -> Result<()> {
    let mut archive = ModuleArchive::open(archive_path)?;
    let actual = file_digests(&mut archive)?;
    debug!(
        module = %detail.name,
        expected = detail.files.len(),
        actual = actual.len(),
        "verifying archive"
    );

    let len = actual.len().max(detail.files.len());
    for i in 0..len {
        match (detail.files.get(i), actual.get(i)) {
            (Some(expected), Some(found)) => {
                if expected.filename != found.filename {
                    return Err(mismatch(&expected.filename, &expected.digest, ""));
                }
                if expected.digest != found.digest {
                    return Err(mismatch(&expected.filename, &expected.digest, &found.digest));
                }
            }
            (Some(expected), None) => {
                return Err(mismatch(&expected.filename, &expected.digest, ""));
            }
            (None, Some(found)) => return Err(mismatch(&found.filename, "", &found.digest)),
            (None, None) => break,
        }
    }
    Ok(())
}

fn mismatch(filename: &str, expected: &str, actual: &str) -> KawaError {
    KawaError::DigestMismatch {
        filename: filename.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}
