//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use kawa_core::BuildReport;
use kawa_core::client::InstallReport;
use kawa_core::client::RemoveOutcome;
use kawa_core::manifest::ManifestIndex;
use kawa_core::manifest::ModuleDetail;
use kawa_core::manifest::ModuleIndexEntry;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::net::SocketAddr;
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct BuildOutput<'a> {
    store_dir: String,
    modules: &'a [ModuleIndexEntry],
    skipped: Vec<SkippedOutput>,
    archives_scanned: usize,
    duration_ms: u128,
}

#[derive(Serialize)]
struct SkippedOutput {
    path: String,
    reason: String,
}

impl<'a> BuildOutput<'a> {
    fn from_report(report: &'a BuildReport) -> Self {
        Self {
            store_dir: report.store_dir.display().to_string(),
            modules: &report.modules,
            skipped: report
                .skipped
                .iter()
                .map(|s| SkippedOutput {
                    path: s.path.display().to_string(),
                    reason: s.reason.to_string(),
                })
                .collect(),
            archives_scanned: report.archives_scanned,
            duration_ms: report.duration.as_millis(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_build_result(&self, report: &BuildReport) -> Result<()> {
        let warnings = report
            .skipped
            .iter()
            .map(|s| format!("{} is not a valid module: {}", s.path.display(), s.reason))
            .collect();
        let output = JsonOutput::success("build", BuildOutput::from_report(report)).with_warnings(warnings);
        Self::output(&output)
    }

    fn format_module_list(&self, index: &ManifestIndex) -> Result<()> {
        Self::output(&JsonOutput::success("list", index))
    }

    fn format_module_detail(&self, detail: &ModuleDetail) -> Result<()> {
        Self::output(&JsonOutput::success("info", detail))
    }

    fn format_install_result(&self, report: &InstallReport, install_dir: &Path) -> Result<()> {
        #[derive(Serialize)]
        struct InstallOutput {
            module: String,
            install_dir: String,
            verified: bool,
            archive_bytes: u64,
            files_extracted: usize,
            directories_created: usize,
            bytes_written: u64,
            files: Vec<String>,
            duration_ms: u128,
        }

        let data = InstallOutput {
            module: report.module.to_string(),
            install_dir: install_dir.display().to_string(),
            verified: report.verified,
            archive_bytes: report.archive_bytes,
            files_extracted: report.extraction.files_extracted,
            directories_created: report.extraction.directories_created,
            bytes_written: report.extraction.bytes_written,
            files: report
                .extraction
                .written
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            duration_ms: report.extraction.duration.as_millis(),
        };

        Self::output(&JsonOutput::success("install", data))
    }

    fn format_remove_result(&self, module: &str, outcome: &RemoveOutcome) -> Result<()> {
        #[derive(Serialize)]
        struct RemoveOutput {
            module: String,
            path: String,
            removed: bool,
        }

        let (path, removed) = match outcome {
            RemoveOutcome::Removed(path) => (path, true),
            RemoveOutcome::NotInstalled(path) => (path, false),
        };
        let data = RemoveOutput {
            module: module.to_string(),
            path: path.display().to_string(),
            removed,
        };

        let mut output = JsonOutput::success("remove", data);
        if !removed {
            output = output.with_warnings(vec![format!("{module} is not installed")]);
        }
        Self::output(&output)
    }

    fn format_serving(&self, addr: SocketAddr, root: &Path) -> Result<()> {
        #[derive(Serialize)]
        struct ServeOutput {
            addr: String,
            root: String,
        }

        let data = ServeOutput {
            addr: addr.to_string(),
            root: root.display().to_string(),
        };
        Self::output(&JsonOutput::success("serve", data))
    }
}
