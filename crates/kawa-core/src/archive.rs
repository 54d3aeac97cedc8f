//! Module archive reader.
//!
//! Thin wrapper over [`zip::ZipArchive`] that exposes entries in central
//! directory order and maps every failure onto [`KawaError`]. The
//! underlying file handle is owned by the [`ModuleArchive`] and released
//! when it is dropped, on every exit path.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use crate::KawaError;
use crate::Result;

/// Metadata for one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMeta {
    /// Position in the central directory.
    pub index: usize,
    /// Raw in-archive path, exactly as stored.
    pub name: String,
    /// Whether the entry is a directory marker.
    pub is_dir: bool,
    /// Declared Unix permission bits, if the archive records them.
    pub unix_mode: Option<u32>,
}

impl EntryMeta {
    /// Returns the last component of the in-archive path.
    ///
    /// # Examples
    ///
    /// ```
    /// use kawa_core::archive::EntryMeta;
    ///
    /// let meta = EntryMeta {
    ///     index: 0,
    ///     name: "widget/src/widget.lua".into(),
    ///     is_dir: false,
    ///     unix_mode: None,
    /// };
    /// assert_eq!(meta.base_name(), "widget.lua");
    /// ```
    #[must_use]
    pub fn base_name(&self) -> &str {
        base_name(&self.name)
    }
}

/// Returns the last `/`-separated component of an in-archive path.
pub(crate) fn base_name(name: &str) -> &str {
    let trimmed = name.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// An opened module archive.
pub struct ModuleArchive {
    path: PathBuf,
    inner: zip::ZipArchive<BufReader<File>>,
}

impl std::fmt::Debug for ModuleArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleArchive")
            .field("path", &self.path)
            .field("entries", &self.inner.len())
            .finish()
    }
}

impl ModuleArchive {
    /// Opens the archive at `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns [`KawaError::ArchiveOpen`] if the file does not exist or is
    /// not a valid zip archive.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| KawaError::ArchiveOpen {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let inner = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| {
            KawaError::ArchiveOpen {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self { path, inner })
    }

    /// Returns the path the archive was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of entries in the central directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns whether the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    /// Lists entry metadata in central directory order without
    /// decompressing anything.
    ///
    /// # Errors
    ///
    /// Returns [`KawaError::EntryRead`] if an entry header is corrupt.
    pub fn entries(&mut self) -> Result<Vec<EntryMeta>> {
        (0..self.inner.len())
            .map(|index| {
                let file = self
                    .inner
                    .by_index_raw(index)
                    .map_err(|e| entry_read_error(&self.path, &format!("#{index}"), &e.to_string()))?;
                Ok(EntryMeta {
                    index,
                    name: file.name().to_string(),
                    is_dir: file.is_dir(),
                    unix_mode: file.unix_mode(),
                })
            })
            .collect()
    }

    /// Reads the full decompressed content of one entry.
    ///
    /// # Errors
    ///
    /// Returns [`KawaError::EntryRead`] if the entry cannot be opened or its
    /// content fails to decompress.
    pub fn read_entry(&mut self, meta: &EntryMeta) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        let mut file = self
            .inner
            .by_index(meta.index)
            .map_err(|e| entry_read_error(&self.path, &meta.name, &e.to_string()))?;
        file.read_to_end(&mut content)
            .map_err(|e| entry_read_error(&self.path, &meta.name, &e.to_string()))?;
        Ok(content)
    }

    /// Visits every entry in order with its metadata and content stream.
    ///
    /// Stops at the first error returned by `visit`. Failures to open an
    /// entry surface as [`KawaError::EntryRead`]; the visitor decides how
    /// read failures inside the stream are reported.
    ///
    /// # Errors
    ///
    /// Returns the first error from opening an entry or from `visit`.
    pub fn for_each_entry<F>(&mut self, mut visit: F) -> Result<()>
    where
        F: FnMut(&EntryMeta, &mut dyn Read) -> Result<()>,
    {
        for index in 0..self.inner.len() {
            let mut file = self
                .inner
                .by_index(index)
                .map_err(|e| entry_read_error(&self.path, &format!("#{index}"), &e.to_string()))?;
            let meta = EntryMeta {
                index,
                name: file.name().to_string(),
                is_dir: file.is_dir(),
                unix_mode: file.unix_mode(),
            };
            visit(&meta, &mut file)?;
        }
        Ok(())
    }
}

/// Builds a [`KawaError::EntryRead`] for `entry` of the archive at `archive`.
pub(crate) fn entry_read_error(archive: &Path, entry: &str, reason: &str) -> KawaError {
    KawaError::EntryRead {
        archive: archive.to_path_buf(),
        entry: entry.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::test_utils::ZipTestBuilder;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_archive() {
        let temp = TempDir::new().unwrap();
        let err = ModuleArchive::open(temp.path().join("missing.zip")).unwrap_err();
        assert!(matches!(err, KawaError::ArchiveOpen { .. }));
    }

    #[test]
    fn test_open_not_an_archive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fake.zip");
        std::fs::write(&path, b"definitely not a zip").unwrap();
        let err = ModuleArchive::open(&path).unwrap_err();
        assert!(matches!(err, KawaError::ArchiveOpen { .. }));
    }

    #[test]
    fn test_entries_preserve_order() {
        let temp = TempDir::new().unwrap();
        let path = ZipTestBuilder::new()
            .add_directory("widget/")
            .add_file("widget/b.lua", b"b")
            .add_file("widget/a.lua", b"a")
            .write_to(temp.path(), "widget.zip");

        let mut archive = ModuleArchive::open(&path).unwrap();
        assert_eq!(archive.len(), 3);
        let entries = archive.entries().unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["widget/", "widget/b.lua", "widget/a.lua"]);
        assert!(entries[0].is_dir);
        assert!(!entries[1].is_dir);
    }

    #[test]
    fn test_read_entry_content() {
        let temp = TempDir::new().unwrap();
        let path = ZipTestBuilder::new()
            .add_file("widget.lua", b"return {}")
            .write_to(temp.path(), "widget.zip");

        let mut archive = ModuleArchive::open(&path).unwrap();
        let entries = archive.entries().unwrap();
        assert_eq!(archive.read_entry(&entries[0]).unwrap(), b"return {}");
    }

    #[test]
    fn test_for_each_entry_streams_content() {
        let temp = TempDir::new().unwrap();
        let path = ZipTestBuilder::new()
            .add_file("one.txt", b"1")
            .add_file("two.txt", b"22")
            .write_to(temp.path(), "m.zip");

        let mut archive = ModuleArchive::open(&path).unwrap();
        let mut seen = Vec::new();
        archive
            .for_each_entry(|meta, reader| {
                let mut content = String::new();
                reader.read_to_string(&mut content)?;
                seen.push((meta.name.clone(), content));
                Ok(())
            })
            .unwrap();
        assert_eq!(
            seen,
            [
                ("one.txt".to_string(), "1".to_string()),
                ("two.txt".to_string(), "22".to_string())
            ]
        );
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("mura-module.json"), "mura-module.json");
        assert_eq!(base_name("widget/mura-module.json"), "mura-module.json");
        assert_eq!(base_name("widget/lib/"), "lib");
    }
}
