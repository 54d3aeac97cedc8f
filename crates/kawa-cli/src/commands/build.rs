//! Build command implementation

use crate::cli::BuildArgs;
use crate::error::convert_error;
use crate::output::OutputFormatter;
use anyhow::Result;
use kawa_core::BuildConfig;
use kawa_core::build_manifest;

pub fn execute(args: &BuildArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = BuildConfig {
        root: args.root.clone(),
        ..Default::default()
    };

    let report = build_manifest(&config)
        .map_err(|e| convert_error(e, &config.root.display().to_string()))?;

    formatter.format_build_result(&report)
}
