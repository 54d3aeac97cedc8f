//! Test utilities for building module archives.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use zip::write::SimpleFileOptions;
use zip::write::ZipWriter;

/// Returns a descriptor document declaring `name` and `version`.
#[must_use]
pub fn descriptor(name: &str, version: &str) -> Vec<u8> {
    format!(r#"{{"name":"{name}","version":"{version}"}}"#).into_bytes()
}

/// Builder for ZIP test archives with files, directories and custom modes.
///
/// # Examples
///
/// ```
/// use kawa_core::test_utils::ZipTestBuilder;
///
/// let zip_data = ZipTestBuilder::new()
///     .add_directory("widget/")
///     .add_file("widget/widget.lua", b"return {}")
///     .build();
/// assert!(!zip_data.is_empty());
/// ```
pub struct ZipTestBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipTestBuilder {
    /// Creates a new, empty archive builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Adds a regular file with mode 0o644.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    /// Adds a regular file with a custom Unix mode.
    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(mode);
        self.writer.start_file(path, options).unwrap();
        self.writer.write_all(data).unwrap();
        self
    }

    /// Adds a regular file without compression, so `data` appears verbatim
    /// in the archive bytes.
    #[must_use]
    pub fn add_stored_file(mut self, path: &str, data: &[u8]) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .unix_permissions(0o644);
        self.writer.start_file(path, options).unwrap();
        self.writer.write_all(data).unwrap();
        self
    }

    /// Adds a directory marker.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        let options = SimpleFileOptions::default().unix_permissions(0o755);
        self.writer.add_directory(path, options).unwrap();
        self
    }

    /// Finishes the archive and returns its bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.writer.finish().unwrap().into_inner()
    }

    /// Finishes the archive and writes it to `dir/file_name`.
    pub fn write_to(self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

impl Default for ZipTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes a valid module archive named `<file_stem>.zip` under `dir`.
///
/// The archive holds the descriptor followed by `files`, in order.
pub fn write_module(
    dir: &Path,
    file_stem: &str,
    name: &str,
    version: &str,
    files: &[(&str, &[u8])],
) -> PathBuf {
    files
        .iter()
        .fold(
            ZipTestBuilder::new().add_file("mura-module.json", &descriptor(name, version)),
            |builder, (path, data)| builder.add_file(path, data),
        )
        .write_to(dir, &format!("{file_stem}.zip"))
}

/// Flips one bit in the first copy of `stored` inside the archive at
/// `path`, leaving headers intact so the damage only shows as a checksum
/// failure when the entry is read.
pub fn corrupt_stored_data(path: &Path, stored: &[u8]) {
    let mut bytes = std::fs::read(path).unwrap();
    let offset = bytes
        .windows(stored.len())
        .position(|window| window == stored)
        .unwrap();
    bytes[offset] ^= 0x20;
    std::fs::write(path, bytes).unwrap();
}
