//! Manifest builder.
//!
//! Discovers module archives under the build root, validates them, digests
//! every file they contain and publishes the result to the manifest store.
//! All archives are read before the store is touched, so a fatal error
//! leaves the previous store in place.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use tracing::debug;
use tracing::info;
use tracing::warn;
use walkdir::WalkDir;

use super::model::Descriptor;
use super::model::FileDigest;
use super::model::ManifestIndex;
use super::model::ModuleDetail;
use super::store::ManifestStore;
use super::validator::InvalidReason;
use super::validator::ModuleIdentity;
use super::validator::Validation;
use super::validator::validate;
use crate::BuildConfig;
use crate::KawaError;
use crate::Result;
use crate::archive::ModuleArchive;
use crate::archive::entry_read_error;
use crate::copy::CopyBuffer;
use crate::digest::digest;
use crate::digest::digest_reader;
use crate::report::BuildReport;
use crate::report::SkippedArchive;

/// Builds the manifest store for `config.root`.
///
/// The previous store is removed and rewritten from scratch. Archives that
/// fail validation are skipped and listed in the report; when two archives
/// declare the same name, the first one in walk order wins.
///
/// # Errors
///
/// Returns an error if the root cannot be walked, an archive cannot be
/// opened or is corrupt, or the store cannot be written.
///
/// # Examples
///
/// ```no_run
/// use kawa_core::BuildConfig;
/// use kawa_core::build_manifest;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = build_manifest(&BuildConfig::default())?;
/// println!("indexed {} modules", report.modules_indexed());
/// # Ok(())
/// # }
/// ```
pub fn build_manifest(config: &BuildConfig) -> Result<BuildReport> {
    let start = Instant::now();
    let archives = discover_archives(config)?;
    info!(root = %config.root.display(), archives = archives.len(), "building manifest");

    let mut report = BuildReport {
        store_dir: config.store_dir(),
        archives_scanned: archives.len(),
        ..Default::default()
    };
    let mut details = Vec::new();
    let mut published = HashSet::new();
    let mut buffer = CopyBuffer::new();

    for path in archives {
        let mut archive = ModuleArchive::open(&path)?;
        let identity = match validate(&mut archive, &config.descriptor_name)? {
            Validation::Valid(identity) => identity,
            Validation::Invalid(reason) => {
                warn!(archive = %path.display(), %reason, "skipping archive");
                report.skipped.push(SkippedArchive { path, reason });
                continue;
            }
        };

        if !published.insert(identity.name.clone()) {
            let reason = InvalidReason::DuplicateName(identity.name.to_string());
            warn!(archive = %path.display(), %reason, "skipping archive");
            report.skipped.push(SkippedArchive { path, reason });
            continue;
        }

        let detail = digest_module(&mut archive, identity, &config.descriptor_name, &mut buffer)?;
        info!(
            module = %detail.name,
            version = %detail.version,
            files = detail.files.len(),
            "indexed module"
        );
        details.push(detail);
    }

    let store = ManifestStore::new(&report.store_dir);
    store.reset()?;
    for detail in &details {
        store.save_detail(detail)?;
    }
    let index = ManifestIndex {
        modules: details.iter().map(ModuleDetail::index_entry).collect(),
    };
    store.save_index(&index)?;

    report.modules = index.modules;
    report.duration = start.elapsed();
    Ok(report)
}

/// Lists candidate archives under `config.root` in deterministic order.
///
/// The walk is sorted by file name at each level and never descends into
/// the store directory.
///
/// # Errors
///
/// Returns [`KawaError::Walk`] if the root or any directory below it
/// cannot be read.
pub fn discover_archives(config: &BuildConfig) -> Result<Vec<PathBuf>> {
    let store_name = config.store_dir_name.as_str();
    let mut archives = Vec::new();

    let walker = WalkDir::new(&config.root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.depth() == 1 && entry.file_type().is_dir() && entry.file_name() == store_name)
        });

    for entry in walker {
        let entry = entry.map_err(|e| KawaError::Walk {
            path: e
                .path()
                .map_or_else(|| config.root.clone(), Path::to_path_buf),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_archive = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| config.is_archive_extension(ext));
        if is_archive {
            debug!(path = %entry.path().display(), "found archive");
            archives.push(entry.into_path());
        }
    }
    Ok(archives)
}

/// Digests every non-directory entry of a validated archive.
///
/// Metadata starts from the validated descriptor. Every descriptor-named
/// entry met during the pass is overlaid on top, so a later descriptor
/// overrides earlier values. Name and version stay as validated.
fn digest_module(
    archive: &mut ModuleArchive,
    identity: ModuleIdentity,
    descriptor_name: &str,
    buffer: &mut CopyBuffer,
) -> Result<ModuleDetail> {
    let mut detail = ModuleDetail {
        name: identity.name.to_string(),
        version: identity.version,
        description: String::new(),
        author: String::new(),
        repository: String::new(),
        files: Vec::new(),
    };
    identity.descriptor.overlay_metadata(&mut detail);
    let archive_path = archive.path().to_path_buf();

    archive.for_each_entry(|meta, reader| {
        if meta.is_dir {
            return Ok(());
        }
        let read_error = |e: std::io::Error| entry_read_error(&archive_path, &meta.name, &e.to_string());

        let hash = if meta.base_name() == descriptor_name {
            let mut content = Vec::new();
            reader.read_to_end(&mut content).map_err(read_error)?;
            match Descriptor::parse(&content) {
                Ok(descriptor) => {
                    if descriptor.name.as_deref().is_some_and(|n| n != detail.name) {
                        debug!(entry = %meta.name, "ignoring name of additional descriptor");
                    }
                    descriptor.overlay_metadata(&mut detail);
                }
                Err(reason) => debug!(entry = %meta.name, %reason, "unreadable descriptor copy"),
            }
            digest(&content)
        } else {
            digest_reader(reader, &mut *buffer).map_err(read_error)?
        };

        detail.files.push(FileDigest {
            filename: meta.base_name().to_string(),
            digest: hash,
        });
        Ok(())
    })?;

    Ok(detail)
}
