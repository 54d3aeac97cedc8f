//! On-disk manifest store.
//!
//! The store is a flat directory holding `manifest.json` and one
//! `<name>.json` per module. Documents are written to a temporary file in
//! the same directory and renamed into place, so a reader never observes a
//! partially written document.

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::debug;

use super::model::ManifestIndex;
use super::model::ModuleDetail;
use crate::KawaError;
use crate::Result;
use crate::types::ModuleName;

/// File name of the index document inside the store.
pub const INDEX_FILE_NAME: &str = "manifest.json";

/// A manifest store rooted at a directory.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    dir: PathBuf,
}

impl ManifestStore {
    /// Creates a handle for the store at `dir`. Nothing is touched on disk.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the index document.
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE_NAME)
    }

    /// Returns the path of `name`'s detail document.
    #[must_use]
    pub fn detail_path(&self, name: &ModuleName) -> PathBuf {
        self.dir.join(name.detail_file_name())
    }

    /// Removes every document and recreates an empty store directory.
    ///
    /// # Errors
    ///
    /// Returns [`KawaError::Io`] if the directory cannot be removed or
    /// created.
    pub fn reset(&self) -> Result<()> {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!(store = %self.dir.display(), "removed previous store"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Writes `detail` as `<name>.json`.
    ///
    /// # Errors
    ///
    /// Returns [`KawaError::InvalidModuleName`] if the detail names an
    /// unsafe module, or [`KawaError::Io`] if writing fails.
    pub fn save_detail(&self, detail: &ModuleDetail) -> Result<PathBuf> {
        let name = ModuleName::parse(&detail.name)?;
        let path = self.detail_path(&name);
        write_atomic(&path, &to_document_bytes(detail)?)?;
        Ok(path)
    }

    /// Writes the index document.
    ///
    /// # Errors
    ///
    /// Returns [`KawaError::Io`] if writing fails.
    pub fn save_index(&self, index: &ManifestIndex) -> Result<PathBuf> {
        let path = self.index_path();
        write_atomic(&path, &to_document_bytes(index)?)?;
        Ok(path)
    }

    /// Reads and checks the index document.
    ///
    /// # Errors
    ///
    /// Returns [`KawaError::Io`] if the file cannot be read, or
    /// [`KawaError::Schema`] if it does not match the index schema.
    pub fn load_index(&self) -> Result<ManifestIndex> {
        parse_index(&std::fs::read(self.index_path())?)
    }

    /// Reads and checks `name`'s detail document.
    ///
    /// # Errors
    ///
    /// Returns [`KawaError::Io`] if the file cannot be read, or
    /// [`KawaError::Schema`] if it does not match the detail schema.
    pub fn load_detail(&self, name: &ModuleName) -> Result<ModuleDetail> {
        parse_detail(&std::fs::read(self.detail_path(name))?)
    }
}

/// Serializes a document as UTF-8 JSON indented with four spaces.
///
/// # Errors
///
/// Returns [`KawaError::Io`] if serialization fails.
pub fn to_document_bytes<T: Serialize + ?Sized>(document: &T) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    document
        .serialize(&mut serializer)
        .map_err(std::io::Error::from)?;
    out.push(b'\n');
    Ok(out)
}

/// Decodes and checks an index document.
///
/// # Errors
///
/// Returns [`KawaError::Schema`] if the bytes are not a valid index.
pub fn parse_index(bytes: &[u8]) -> Result<ManifestIndex> {
    let index: ManifestIndex = decode("index", bytes)?;
    index.check_schema()?;
    Ok(index)
}

/// Decodes and checks a detail document.
///
/// # Errors
///
/// Returns [`KawaError::Schema`] if the bytes are not a valid detail
/// document.
pub fn parse_detail(bytes: &[u8]) -> Result<ModuleDetail> {
    let detail: ModuleDetail = decode("detail", bytes)?;
    detail.check_schema()?;
    Ok(detail)
}

fn decode<T: DeserializeOwned>(document: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| KawaError::schema(document, e.to_string()))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote document");
    Ok(())
}
