//! Operation reporting.

use std::path::PathBuf;
use std::time::Duration;

use crate::manifest::InvalidReason;
use crate::manifest::ModuleIndexEntry;

/// An archive that was found but not published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedArchive {
    /// Path of the archive.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: InvalidReason,
}

/// Report of a manifest build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Published modules, in index order.
    pub modules: Vec<ModuleIndexEntry>,

    /// Archives that failed validation.
    pub skipped: Vec<SkippedArchive>,

    /// Store directory that was written.
    pub store_dir: PathBuf,

    /// Number of candidate archives found by the walk.
    pub archives_scanned: usize,

    /// Duration of the build.
    pub duration: Duration,
}

impl BuildReport {
    /// Returns the number of published modules.
    #[must_use]
    pub fn modules_indexed(&self) -> usize {
        self.modules.len()
    }

    /// Returns whether any archive was skipped.
    #[must_use]
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Report of extracting a module archive.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Number of files written.
    pub files_extracted: usize,

    /// Number of directory entries created.
    pub directories_created: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Files written, relative to the destination root, in archive order.
    pub written: Vec<PathBuf>,

    /// Duration of the extraction.
    pub duration: Duration,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_report_counts() {
        let mut report = BuildReport::default();
        assert_eq!(report.modules_indexed(), 0);
        assert!(!report.has_skipped());

        report.skipped.push(SkippedArchive {
            path: PathBuf::from("broken.zip"),
            reason: InvalidReason::MissingDescriptor,
        });
        assert!(report.has_skipped());
    }
}
