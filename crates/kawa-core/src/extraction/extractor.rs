//! Archive extractor.
//!
//! Every entry path is checked with [`SafePath::validate`] before anything
//! is written. A single escaping entry aborts the whole extraction; entries
//! already written stay on disk.

use std::fs::File;
use std::fs::create_dir_all;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use tracing::debug;
use tracing::warn;

use crate::KawaError;
use crate::Result;
use crate::archive::EntryMeta;
use crate::archive::ModuleArchive;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::report::ExtractionReport;
use crate::types::DestDir;
use crate::types::SafePath;

/// Extracts the archive at `archive_path` into `install_dir`, creating the
/// directory if needed.
///
/// # Errors
///
/// See [`extract`]. Also returns [`KawaError::Io`] if `install_dir` cannot
/// be created.
///
/// # Examples
///
/// ```no_run
/// use kawa_core::extract_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = extract_archive("widget.zip", "app/modules")?;
/// println!("extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    install_dir: Q,
) -> Result<ExtractionReport> {
    let dest = DestDir::create(install_dir.as_ref())?;
    let mut archive = ModuleArchive::open(archive_path)?;
    extract(&mut archive, &dest)
}

/// Writes every entry of `archive` under `dest`.
///
/// Directory entries are created recursively. File entries get their
/// parent directories created and are written with truncation, so existing
/// files are overwritten. On Unix the declared mode is applied after
/// sanitizing.
///
/// # Errors
///
/// - [`KawaError::PathTraversal`] if any entry resolves outside `dest`
/// - [`KawaError::EntryRead`] if an entry header cannot be opened
/// - [`KawaError::Extraction`] if reading an entry's data fails (including
///   a checksum mismatch) or writing it fails
pub fn extract(archive: &mut ModuleArchive, dest: &DestDir) -> Result<ExtractionReport> {
    let start = Instant::now();
    let mut report = ExtractionReport::new();
    let mut buffer = CopyBuffer::new();

    debug!(
        archive = %archive.path().display(),
        dest = %dest.as_path().display(),
        entries = archive.len(),
        "extracting"
    );

    archive.for_each_entry(|meta, reader| {
        let safe_path = SafePath::validate(Path::new(&meta.name), dest).inspect_err(|e| {
            if e.is_security_violation() {
                warn!(entry = %meta.name, "rejecting entry outside destination");
            }
        })?;

        if meta.is_dir {
            create_directory(meta, &safe_path, dest)?;
            report.directories_created += 1;
        } else {
            if safe_path.is_root() {
                return Err(KawaError::PathTraversal {
                    path: meta.name.clone().into(),
                });
            }
            let bytes = extract_file(reader, meta, &safe_path, dest, &mut buffer)?;
            report.files_extracted += 1;
            report.bytes_written += bytes;
            report.written.push(safe_path.into_path_buf());
        }
        Ok(())
    })?;

    report.duration = start.elapsed();
    Ok(report)
}

fn create_directory(meta: &EntryMeta, safe_path: &SafePath, dest: &DestDir) -> Result<()> {
    create_dir_all(dest.join(safe_path)).map_err(|e| extraction_error(meta, e))
}

fn extract_file(
    reader: &mut dyn Read,
    meta: &EntryMeta,
    safe_path: &SafePath,
    dest: &DestDir,
    buffer: &mut CopyBuffer,
) -> Result<u64> {
    write_file(reader, meta, &dest.join(safe_path), buffer).map_err(|e| extraction_error(meta, e))
}

fn write_file(
    reader: &mut dyn Read,
    meta: &EntryMeta,
    output_path: &Path,
    buffer: &mut CopyBuffer,
) -> std::io::Result<u64> {
    if let Some(parent) = output_path.parent() {
        create_dir_all(parent)?;
    }
    let mut writer = BufWriter::with_capacity(64 * 1024, File::create(output_path)?);
    let bytes = copy_with_buffer(reader, &mut writer, buffer)?;
    writer.flush()?;

    #[cfg(unix)]
    if let Some(mode) = meta.unix_mode {
        use std::os::unix::fs::PermissionsExt;
        let mode = crate::security::sanitize_permissions(mode);
        std::fs::set_permissions(output_path, std::fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = meta;

    Ok(bytes)
}

fn extraction_error(meta: &EntryMeta, source: std::io::Error) -> KawaError {
    KawaError::Extraction {
        entry: meta.name.clone(),
        source,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::ZipTestBuilder;
    use tempfile::TempDir;

    fn extract_zip(builder: ZipTestBuilder, dest: &Path) -> Result<ExtractionReport> {
        let temp = TempDir::new().unwrap();
        let path = builder.write_to(temp.path(), "m.zip");
        extract_archive(&path, dest)
    }

    #[test]
    fn test_extract_files_and_directories() {
        let out = TempDir::new().unwrap();
        let report = extract_zip(
            ZipTestBuilder::new()
                .add_directory("widget/")
                .add_directory("widget/empty/")
                .add_file("widget/lib/widget.lua", b"return {}")
                .add_file("widget/mura-module.json", b"{}"),
            out.path(),
        )
        .unwrap();

        assert_eq!(report.files_extracted, 2);
        assert_eq!(report.directories_created, 2);
        assert_eq!(report.bytes_written, 11);
        assert!(out.path().join("widget/empty").is_dir());
        assert_eq!(
            std::fs::read(out.path().join("widget/lib/widget.lua")).unwrap(),
            b"return {}"
        );
        assert_eq!(report.written[0], Path::new("widget/lib/widget.lua"));
    }

    #[test]
    fn test_creates_missing_install_dir() {
        let out = TempDir::new().unwrap();
        let install_dir = out.path().join("app").join("modules");
        extract_zip(ZipTestBuilder::new().add_file("a.txt", b"a"), &install_dir).unwrap();
        assert!(install_dir.join("a.txt").is_file());
    }

    #[test]
    fn test_overwrites_existing_files() {
        let out = TempDir::new().unwrap();
        std::fs::write(out.path().join("a.txt"), b"old content that is longer").unwrap();
        extract_zip(ZipTestBuilder::new().add_file("a.txt", b"new"), out.path()).unwrap();
        assert_eq!(std::fs::read(out.path().join("a.txt")).unwrap(), b"new");
    }

    #[test]
    fn test_traversal_aborts_extraction() {
        let root = TempDir::new().unwrap();
        let dest = root.path().join("dest");
        let err = extract_zip(
            ZipTestBuilder::new()
                .add_file("good.txt", b"ok")
                .add_file("../escape.txt", b"bad")
                .add_file("after.txt", b"never"),
            &dest,
        )
        .unwrap_err();

        assert!(matches!(err, KawaError::PathTraversal { .. }));
        assert!(!root.path().join("escape.txt").exists());
        assert!(dest.join("good.txt").is_file());
        assert!(!dest.join("after.txt").exists());
    }

    #[test]
    fn test_corrupt_entry_data_is_extraction_error() {
        let temp = TempDir::new().unwrap();
        let lua = b"return { corrupted = false }";
        let path = ZipTestBuilder::new()
            .add_stored_file("widget.lua", lua)
            .write_to(temp.path(), "m.zip");
        crate::test_utils::corrupt_stored_data(&path, lua);

        let err = extract_archive(&path, temp.path().join("modules")).unwrap_err();
        let KawaError::Extraction { entry, .. } = err else {
            panic!("expected Extraction, got {err:?}");
        };
        assert_eq!(entry, "widget.lua");
    }

    #[test]
    #[cfg(unix)]
    fn test_absolute_entry_rejected() {
        let out = TempDir::new().unwrap();
        let err = extract_zip(
            ZipTestBuilder::new().add_file("/tmp/kawa-absolute.txt", b"bad"),
            out.path(),
        )
        .unwrap_err();
        assert!(matches!(err, KawaError::PathTraversal { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn test_permissions_are_sanitized() {
        use std::os::unix::fs::PermissionsExt;

        let out = TempDir::new().unwrap();
        extract_zip(
            ZipTestBuilder::new()
                .add_file_with_mode("run.sh", b"#!/bin/sh\n", 0o4755)
                .add_file_with_mode("data.txt", b"x", 0o640),
            out.path(),
        )
        .unwrap();

        let mode = |name: &str| {
            std::fs::metadata(out.path().join(name))
                .unwrap()
                .permissions()
                .mode()
                & 0o7777
        };
        assert_eq!(mode("run.sh"), 0o755);
        assert_eq!(mode("data.txt"), 0o640);
    }

    #[test]
    fn test_write_failure_names_entry() {
        let out = TempDir::new().unwrap();
        std::fs::write(out.path().join("blocker"), b"file, not dir").unwrap();
        let err = extract_zip(ZipTestBuilder::new().add_directory("blocker/"), out.path())
            .unwrap_err();
        let KawaError::Extraction { entry, .. } = err else {
            panic!("expected extraction error, got {err:?}");
        };
        assert_eq!(entry, "blocker/");
    }
}
