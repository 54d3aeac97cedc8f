//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use kawa_core::BuildReport;
use kawa_core::client::InstallReport;
use kawa_core::client::RemoveOutcome;
use kawa_core::manifest::ManifestIndex;
use kawa_core::manifest::ModuleDetail;
use std::net::SocketAddr;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn or_dash(value: &str) -> &str {
        if value.is_empty() { "-" } else { value }
    }

    /// Renders the module table; the name column is at least as wide as its
    /// header.
    fn module_table(index: &ManifestIndex) -> Vec<String> {
        let width = index
            .modules
            .iter()
            .map(|m| m.name.len())
            .max()
            .unwrap_or(0)
            .max("NAME".len());

        let mut lines = Vec::with_capacity(index.modules.len() + 1);
        lines.push(format!("{:<width$}  VERSION", "NAME"));
        for module in &index.modules {
            lines.push(format!("{:<width$}  {}", module.name, module.version));
        }
        lines
    }

    fn success(&self, message: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }

    fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_build_result(&self, report: &BuildReport) -> Result<()> {
        for skipped in &report.skipped {
            self.warning(&format!(
                "{} is not a valid module: {}",
                skipped.path.display(),
                skipped.reason
            ));
        }

        if self.quiet {
            return Ok(());
        }

        self.success(&format!("Manifest built: {}", report.store_dir.display()));
        let _ = self
            .term
            .write_line(&format!("  Modules indexed:  {}", report.modules_indexed()));
        let _ = self
            .term
            .write_line(&format!("  Archives scanned: {}", report.archives_scanned));
        if report.has_skipped() {
            let _ = self
                .term
                .write_line(&format!("  Skipped:          {}", report.skipped.len()));
        }

        if self.verbose {
            for module in &report.modules {
                let _ = self
                    .term
                    .write_line(&format!("  - {} {}", module.name, module.version));
            }
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        Ok(())
    }

    fn format_module_list(&self, index: &ManifestIndex) -> Result<()> {
        if self.quiet {
            for module in &index.modules {
                let _ = self.term.write_line(&module.name);
            }
            return Ok(());
        }

        if index.modules.is_empty() {
            let _ = self.term.write_line("No modules published");
            return Ok(());
        }

        let mut lines = Self::module_table(index).into_iter();
        if let Some(header) = lines.next() {
            if self.use_colors {
                let _ = self.term.write_line(&style(header).bold().to_string());
            } else {
                let _ = self.term.write_line(&header);
            }
        }
        for line in lines {
            let _ = self.term.write_line(&line);
        }

        Ok(())
    }

    fn format_module_detail(&self, detail: &ModuleDetail) -> Result<()> {
        if self.use_colors {
            let _ = self.term.write_line(&format!(
                "{} {}",
                style(&detail.name).bold(),
                detail.version
            ));
        } else {
            let _ = self
                .term
                .write_line(&format!("{} {}", detail.name, detail.version));
        }

        if self.quiet {
            return Ok(());
        }

        let _ = self.term.write_line(&format!(
            "  Description: {}",
            Self::or_dash(&detail.description)
        ));
        let _ = self
            .term
            .write_line(&format!("  Author:      {}", Self::or_dash(&detail.author)));
        let _ = self.term.write_line(&format!(
            "  Repository:  {}",
            Self::or_dash(&detail.repository)
        ));
        let _ = self
            .term
            .write_line(&format!("  Files:       {}", detail.files.len()));

        if self.verbose && !detail.files.is_empty() {
            let _ = self.term.write_line("");
            for file in &detail.files {
                let _ = self
                    .term
                    .write_line(&format!("  {}  {}", file.digest, file.filename));
            }
        }

        Ok(())
    }

    fn format_install_result(&self, report: &InstallReport, install_dir: &Path) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.success(&format!(
            "Installed {} into {}",
            report.module,
            install_dir.display()
        ));
        let _ = self.term.write_line(&format!(
            "  Files extracted: {}",
            report.extraction.files_extracted
        ));
        let _ = self.term.write_line(&format!(
            "  Directories:     {}",
            report.extraction.directories_created
        ));
        let _ = self.term.write_line(&format!(
            "  Total size:      {}",
            Self::format_size(report.extraction.bytes_written)
        ));
        if report.verified {
            let _ = self.term.write_line("  Digests:         verified");
        }

        if self.verbose {
            let _ = self.term.write_line(&format!(
                "  Download size:   {}",
                Self::format_size(report.archive_bytes)
            ));
            for path in &report.extraction.written {
                let _ = self.term.write_line(&format!("  + {}", path.display()));
            }
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.extraction.duration));
        }

        Ok(())
    }

    fn format_remove_result(&self, module: &str, outcome: &RemoveOutcome) -> Result<()> {
        match outcome {
            RemoveOutcome::Removed(path) => {
                if !self.quiet {
                    self.success(&format!("Removed {module} ({})", path.display()));
                }
            }
            RemoveOutcome::NotInstalled(path) => {
                self.warning(&format!(
                    "{module} is not installed (nothing at {})",
                    path.display()
                ));
            }
        }
        Ok(())
    }

    fn format_serving(&self, addr: SocketAddr, root: &Path) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.success(&format!("Serving {} on http://{addr}", root.display()));
        let _ = self.term.write_line("  Press Ctrl-C to stop");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use kawa_core::manifest::ModuleIndexEntry;

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(HumanFormatter::format_size(0), "0 B");
        assert_eq!(HumanFormatter::format_size(1023), "1023 B");
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(HumanFormatter::format_size(1536), "1.5 KB");
        assert_eq!(HumanFormatter::format_size(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(HumanFormatter::format_size(1024 * 1024 * 1024), "1.0 GB");
    }

    #[test]
    fn test_module_table_alignment() {
        let index = ManifestIndex {
            modules: vec![
                ModuleIndexEntry {
                    name: "widget".into(),
                    version: "1.0.0".into(),
                },
                ModuleIndexEntry {
                    name: "ui".into(),
                    version: "0.2".into(),
                },
            ],
        };
        let lines = HumanFormatter::module_table(&index);
        assert_eq!(lines, ["NAME    VERSION", "widget  1.0.0", "ui      0.2"]);
    }

    #[test]
    fn test_module_table_short_names() {
        let index = ManifestIndex {
            modules: vec![ModuleIndexEntry {
                name: "a".into(),
                version: "1".into(),
            }],
        };
        assert_eq!(HumanFormatter::module_table(&index), ["NAME  VERSION", "a     1"]);
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(HumanFormatter::or_dash(""), "-");
        assert_eq!(HumanFormatter::or_dash("Jane"), "Jane");
    }
}
