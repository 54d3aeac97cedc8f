//! Output formatter trait for CLI results.

use anyhow::Result;
use kawa_core::BuildReport;
use kawa_core::client::InstallReport;
use kawa_core::client::RemoveOutcome;
use kawa_core::manifest::ManifestIndex;
use kawa_core::manifest::ModuleDetail;
use serde::Serialize;
use std::net::SocketAddr;
use std::path::Path;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format manifest build result, including skipped archives
    fn format_build_result(&self, report: &BuildReport) -> Result<()>;

    /// Format the published module index
    fn format_module_list(&self, index: &ManifestIndex) -> Result<()>;

    /// Format a module's detail document
    fn format_module_detail(&self, detail: &ModuleDetail) -> Result<()>;

    /// Format install result
    fn format_install_result(&self, report: &InstallReport, install_dir: &Path) -> Result<()>;

    /// Format remove result
    fn format_remove_result(&self, module: &str, outcome: &RemoveOutcome) -> Result<()>;

    /// Announce that the server is listening
    fn format_serving(&self, addr: SocketAddr, root: &Path) -> Result<()>;
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Warning,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            warnings: None,
        }
    }

    /// Marks the output as a warning when `warnings` is non-empty.
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        if !warnings.is_empty() {
            self.status = Status::Warning;
            self.warnings = Some(warnings);
        }
        self
    }
}
